mod constants;
mod encoder;
mod errors;
mod loader;
mod rasterizer;
mod sequencer;
mod sink;

use std::io::Read;

use structures::CanvasConfig;

pub use crate::encoder::{detect_label_width, is_ffmpeg_on_path, EncodeConfig, FfmpegEncoder};
pub use crate::errors::{EncoderError, LoadError, RenderError, SinkError, TimelapseError};
pub use crate::loader::{load_events, parse_timestamp, LoadOptions};
pub use crate::rasterizer::{rasterize, FramePlan, Rasterizer, RenderSummary};
pub use crate::sequencer::{is_sequenced, sequence};
pub use crate::sink::{
    frame_pattern, CapturedFrame, CollectingSink, Frame, FrameSink, PngDirectorySink,
};

/// Loads a placement dataset, orders it and replays it into `sink`.
pub fn render_timelapse<R: Read, S: FrameSink>(
    input: R,
    config: &CanvasConfig,
    options: LoadOptions,
    sink: &mut S,
) -> Result<RenderSummary, TimelapseError> {
    let mut events = load_events(input, &config.palette, options)?;
    sequence(&mut events);

    Ok(rasterize(events, config, sink)?)
}
