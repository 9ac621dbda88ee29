use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use log::info;

use crate::{constants::FRAME_EXTENSION, errors::EncoderError, sink::frame_pattern};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeConfig {
    pub framerate: u32,
    pub codec: String,
    pub pixel_format: String,
    pub overwrite: bool,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            framerate: 60,
            codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            overwrite: true,
        }
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Label width of the frame set in `frames_dir`, taken from its lowest numbered `.png`.
pub fn detect_label_width(frames_dir: &Path) -> Result<usize, EncoderError> {
    if !frames_dir.is_dir() {
        return Err(EncoderError::MissingFrames(frames_dir.to_path_buf()));
    }

    let list_error = |source| EncoderError::ListFrames {
        path: frames_dir.to_path_buf(),
        source,
    };

    let mut lowest: Option<String> = None;
    for entry in fs::read_dir(frames_dir).map_err(list_error)? {
        let path = entry.map_err(list_error)?.path();
        if path.extension() != Some(OsStr::new(FRAME_EXTENSION)) {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(OsStr::to_str) else {
            continue;
        };
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }

        if lowest.as_deref().map_or(true, |current| stem < current) {
            lowest = Some(stem.to_string());
        }
    }

    lowest
        .map(|stem| stem.len())
        .ok_or_else(|| EncoderError::NoFrames(frames_dir.to_path_buf()))
}

/// Turns a numbered frame set into a video with the system `ffmpeg` binary.
pub struct FfmpegEncoder {
    config: EncodeConfig,
}

impl FfmpegEncoder {
    pub fn new(config: EncodeConfig) -> Self {
        Self { config }
    }

    fn command(&self, frames_dir: &Path, label_width: usize, out_path: &Path) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());

        if self.config.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.arg("-framerate")
            .arg(self.config.framerate.to_string())
            .arg("-i")
            .arg(frames_dir.join(frame_pattern(label_width)))
            .arg("-c:v")
            .arg(&self.config.codec)
            .arg("-pix_fmt")
            .arg(&self.config.pixel_format)
            .arg(out_path);

        cmd
    }

    pub fn encode(
        &self,
        frames_dir: &Path,
        label_width: usize,
        out_path: &Path,
    ) -> Result<(), EncoderError> {
        if !frames_dir.is_dir() {
            return Err(EncoderError::MissingFrames(frames_dir.to_path_buf()));
        }

        ensure_parent_dir(out_path)?;

        if !is_ffmpeg_on_path() {
            return Err(EncoderError::NotFound);
        }

        info!("Rendering video to {}", out_path.display());

        let output = self
            .command(frames_dir, label_width, out_path)
            .output()
            .map_err(EncoderError::Spawn)?;

        if !output.status.success() {
            return Err(EncoderError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), EncoderError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| EncoderError::OutputDir {
                path: PathBuf::from(parent),
                source,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use structures::{CanvasConfig, Event};
    use tempfile::tempdir;

    use super::*;
    use crate::{rasterize, PngDirectorySink};

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn default_command_matches_reference_invocation() {
        let encoder = FfmpegEncoder::new(EncodeConfig::default());
        let cmd = encoder.command(Path::new("frames"), 3, Path::new("place.mp4"));

        assert_eq!(cmd.get_program(), OsStr::new("ffmpeg"));
        assert_eq!(
            args(&cmd),
            vec![
                "-y",
                "-framerate",
                "60",
                "-i",
                Path::new("frames").join("%03d.png").to_str().unwrap(),
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "place.mp4",
            ]
        );
    }

    #[test]
    fn command_follows_config() {
        let encoder = FfmpegEncoder::new(EncodeConfig {
            framerate: 30,
            overwrite: false,
            ..Default::default()
        });
        let cmd = encoder.command(Path::new("out/frames"), 4, Path::new("out/place.mp4"));
        let args = args(&cmd);

        assert_eq!(args[0], "-n");
        assert_eq!(args[2], "30");
        assert!(args[4].ends_with("%04d.png"));
    }

    #[test]
    fn missing_frames_dir_is_reported_before_spawning() {
        let root = tempdir().unwrap();
        let encoder = FfmpegEncoder::new(EncodeConfig::default());

        let err = encoder
            .encode(
                &root.path().join("nope"),
                3,
                &root.path().join("place.mp4"),
            )
            .unwrap_err();

        assert!(matches!(err, EncoderError::MissingFrames(_)));
    }

    #[test]
    fn label_width_comes_from_lowest_frame() {
        let root = tempdir().unwrap();
        for name in ["0000.png", "0001.png", "1000.png", "notes.txt", "cover.png"] {
            fs::write(root.path().join(name), b"").unwrap();
        }

        assert_eq!(detect_label_width(root.path()).unwrap(), 4);
    }

    #[test]
    fn label_width_matches_rendered_frame_set() {
        // An exact multiple of a 1000 frame budget writes 1001 frames, 0000.png to 1000.png
        let config = CanvasConfig {
            width: 2,
            height: 2,
            frame_budget: 1000,
            ..Default::default()
        };
        let placed_at = NaiveDate::from_ymd_opt(2017, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let events: Vec<Event> = (0..1000u32)
            .map(|i| Event::new(i % 2, 0, (i % 16) as u8, placed_at))
            .collect();
        let root = tempdir().unwrap();
        let mut sink = PngDirectorySink::create(root.path().join("frames")).unwrap();

        let summary = rasterize(events, &config, &mut sink).unwrap();

        assert_eq!(summary.label_width, 4);
        assert_eq!(detect_label_width(sink.dir()).unwrap(), 4);
    }

    #[test]
    fn label_width_needs_frames() {
        let root = tempdir().unwrap();

        assert!(matches!(
            detect_label_width(root.path()),
            Err(EncoderError::NoFrames(_))
        ));
        assert!(matches!(
            detect_label_width(&root.path().join("nope")),
            Err(EncoderError::MissingFrames(_))
        ));
    }

    #[test]
    fn output_parent_is_created() {
        let root = tempdir().unwrap();
        let out = root.path().join("videos").join("place.mp4");

        ensure_parent_dir(&out).unwrap();

        assert!(root.path().join("videos").is_dir());
        ensure_parent_dir(Path::new("place.mp4")).unwrap();
    }
}
