use std::{
    env,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use image::{ImageFormat, RgbaImage};

use crate::{constants::FRAME_EXTENSION, errors::SinkError};

/// A snapshot of the canvas at a sampled point in the replay.
pub struct Frame<'a> {
    pub index: u32,
    pub label_width: usize,
    pub image: &'a RgbaImage,
}

impl Frame<'_> {
    /// Zero-padded index, so lexicographic order matches numeric order.
    pub fn label(&self) -> String {
        format!("{:0width$}", self.index, width = self.label_width)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.label(), FRAME_EXTENSION)
    }
}

/// printf-style pattern matching the file names of a frame set, e.g. `%03d.png`.
pub fn frame_pattern(label_width: usize) -> String {
    format!("%0{}d.{}", label_width, FRAME_EXTENSION)
}

pub trait FrameSink {
    /// Persists one frame. Writing the same index twice replaces the earlier frame.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError>;
}

/// Writes each frame as a numbered PNG in a directory.
pub struct PngDirectorySink {
    dir: PathBuf,
}

impl PngDirectorySink {
    /// Empties (or creates) `dir` so no frames from an earlier run are left behind.
    ///
    /// Only an existing directory holding nothing but `.png` files is cleared; the current
    /// directory and the filesystem root are always refused.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        let prepare_error = |source| SinkError::Prepare {
            path: dir.clone(),
            source,
        };

        if dir.exists() {
            for frame_path in stale_frames(&dir)? {
                fs::remove_file(&frame_path).map_err(prepare_error)?;
            }
        }

        fs::create_dir_all(&dir).map_err(prepare_error)?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Lists the `.png` files in `dir`, refusing directories that are not plainly a frame set.
fn stale_frames(dir: &Path) -> Result<Vec<PathBuf>, SinkError> {
    let prepare_error = |source| SinkError::Prepare {
        path: dir.to_path_buf(),
        source,
    };
    let refuse = |reason| SinkError::UnsafeDirectory {
        path: dir.to_path_buf(),
        reason,
    };

    let canonical = dir.canonicalize().map_err(prepare_error)?;
    if canonical.parent().is_none() {
        return Err(refuse("it is the filesystem root"));
    }

    let cwd = env::current_dir().and_then(|cwd| cwd.canonicalize());
    if matches!(cwd, Ok(cwd) if cwd == canonical) {
        return Err(refuse("it is the current directory"));
    }

    let mut frames = Vec::new();
    for entry in fs::read_dir(dir).map_err(prepare_error)? {
        let entry = entry.map_err(prepare_error)?;
        let path = entry.path();
        let is_file = entry.file_type().map_err(prepare_error)?.is_file();

        if !is_file || path.extension() != Some(OsStr::new(FRAME_EXTENSION)) {
            return Err(refuse("it contains files other than frames"));
        }

        frames.push(path);
    }

    Ok(frames)
}

impl FrameSink for PngDirectorySink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let path = self.dir.join(frame.file_name());

        frame
            .image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| SinkError::Write { path, source })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub index: u32,
    pub label: String,
    pub image: RgbaImage,
}

/// Keeps copies of every frame in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub frames: Vec<CapturedFrame>,
}

impl FrameSink for CollectingSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let captured = CapturedFrame {
            index: frame.index,
            label: frame.label(),
            image: frame.image.clone(),
        };

        match self.frames.iter_mut().find(|f| f.index == frame.index) {
            Some(existing) => *existing = captured,
            None => self.frames.push(captured),
        }

        Ok(())
    }
}
