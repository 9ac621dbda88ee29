use std::{io, path::PathBuf, process::ExitStatus};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("line {line}: could not parse timestamp {value:?}")]
    MalformedTimestamp { line: u64, value: String },
    #[error("line {line}: could not parse {field} from {value:?}")]
    MalformedRecord {
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: color index {color_index} is outside the {palette_len} color palette")]
    InvalidColorIndex {
        line: u64,
        color_index: u32,
        palette_len: usize,
    },
    #[error("could not read dataset: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{event_count} events is fewer than the frame budget of {frame_budget}")]
    InsufficientEvents {
        event_count: usize,
        frame_budget: u32,
    },
    #[error("frame budget must be at least 1")]
    ZeroFrameBudget,
    #[error("event {position}: color index {color_index} is outside the {palette_len} color palette")]
    InvalidColorIndex {
        position: usize,
        color_index: u8,
        palette_len: usize,
    },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("could not prepare frames directory {}: {source}", .path.display())]
    Prepare { path: PathBuf, source: io::Error },
    #[error("refusing to clear {}: {reason}", .path.display())]
    UnsafeDirectory { path: PathBuf, reason: &'static str },
    #[error("could not write frame {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    #[error("ffmpeg is required to encode the video, but was not found on PATH")]
    NotFound,
    #[error("frames directory {} does not exist", .0.display())]
    MissingFrames(PathBuf),
    #[error("no numbered frames found in {}", .0.display())]
    NoFrames(PathBuf),
    #[error("could not list frames in {}: {source}", .path.display())]
    ListFrames { path: PathBuf, source: io::Error },
    #[error("could not create output directory {}: {source}", .path.display())]
    OutputDir { path: PathBuf, source: io::Error },
    #[error("could not spawn ffmpeg: {0}")]
    Spawn(#[source] io::Error),
    #[error("ffmpeg exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// Any failure while loading and rendering. Every variant aborts the whole job.
#[derive(Debug, thiserror::Error)]
pub enum TimelapseError {
    #[error("loading failed: {0}")]
    Load(#[from] LoadError),
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_the_offending_line() {
        let err = LoadError::MalformedTimestamp {
            line: 42,
            value: "yesterday".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "line 42: could not parse timestamp \"yesterday\""
        );
    }

    #[test]
    fn timelapse_error_prefixes_stage() {
        let err: TimelapseError = RenderError::InsufficientEvents {
            event_count: 500,
            frame_budget: 1000,
        }
        .into();

        assert_eq!(
            err.to_string(),
            "rendering failed: 500 events is fewer than the frame budget of 1000"
        );
    }

    #[test]
    fn sink_error_displays_path() {
        let err = SinkError::Prepare {
            path: PathBuf::from("frames"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.to_string().contains("frames"));
        assert!(err.to_string().contains("denied"));
    }
}
