use image::RgbaImage;
use log::{debug, info};
use structures::{CanvasConfig, Event, Palette};

use crate::{
    constants::MIN_LABEL_WIDTH,
    errors::RenderError,
    sink::{Frame, FrameSink},
};

/// Which replay positions get snapshotted.
///
/// Aims for `frame_budget` evenly spaced frames by event count. When the event count is not a
/// multiple of the budget, the budget drops by one before the integer division, so the actual
/// frame count only approximates the budget (2500 events sample every 2nd event, 1250 frames).
/// One terminal frame always follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    event_count: usize,
    interval: usize,
}

impl FramePlan {
    pub fn new(event_count: usize, frame_budget: u32) -> Result<Self, RenderError> {
        if frame_budget == 0 {
            return Err(RenderError::ZeroFrameBudget);
        }

        if event_count < frame_budget as usize {
            return Err(RenderError::InsufficientEvents {
                event_count,
                frame_budget,
            });
        }

        let mut total_frames = frame_budget as usize;
        if event_count % total_frames != 0 {
            total_frames -= 1;
        }

        // budget - 1 is only 0 when the budget is 1, and 1 divides everything
        let interval = event_count / total_frames;

        Ok(Self {
            event_count,
            interval,
        })
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }

    /// Events between consecutive sampled frames.
    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn is_sample_point(&self, position: usize) -> bool {
        position % self.interval == 0
    }

    /// Frames taken at sample points, not counting the terminal frame.
    pub fn sampled_frames(&self) -> u32 {
        ((self.event_count + self.interval - 1) / self.interval) as u32
    }

    pub fn total_frames(&self) -> u32 {
        self.sampled_frames() + 1
    }

    /// Digits needed for every frame label, the terminal frame's included.
    pub fn label_width(&self) -> usize {
        let last_index = self.sampled_frames();
        let digits = last_index.checked_ilog10().unwrap_or(0) as usize + 1;

        digits.max(MIN_LABEL_WIDTH)
    }
}

/// The canvas being replayed onto. Cells nobody has placed on stay transparent black.
pub struct Rasterizer {
    canvas: RgbaImage,
    palette: Palette,
}

impl Rasterizer {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            canvas: RgbaImage::new(config.width, config.height),
            palette: config.palette.clone(),
        }
    }

    /// Paints one event. Placements outside the canvas are ignored.
    pub fn apply(&mut self, position: usize, event: &Event) -> Result<(), RenderError> {
        let color = self
            .palette
            .get(event.color_index as usize)
            .ok_or(RenderError::InvalidColorIndex {
                position,
                color_index: event.color_index,
                palette_len: self.palette.len(),
            })?;

        if event.x >= self.canvas.width() || event.y >= self.canvas.height() {
            debug!(
                "Ignoring event {} at ({}, {}) outside the canvas",
                position, event.x, event.y
            );
            return Ok(());
        }

        self.canvas.put_pixel(event.x, event.y, color);

        Ok(())
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub event_count: usize,
    pub frame_interval: usize,
    pub frames_written: u32,
    pub label_width: usize,
}

/// Replays time-ordered events onto a fresh canvas, handing sampled snapshots and a terminal
/// snapshot to `sink`.
pub fn rasterize<S: FrameSink>(
    events: Vec<Event>,
    config: &CanvasConfig,
    sink: &mut S,
) -> Result<RenderSummary, RenderError> {
    let plan = FramePlan::new(events.len(), config.frame_budget)?;
    let label_width = plan.label_width();

    info!(
        "Rendering {} actions, one frame every {} actions...",
        plan.event_count(),
        plan.interval()
    );

    let mut rasterizer = Rasterizer::new(config);
    let mut current_frame: u32 = 0;

    for (index, event) in events.into_iter().enumerate() {
        rasterizer.apply(index, &event)?;

        if plan.is_sample_point(index) {
            debug!("Rendering frame {}", current_frame);

            sink.write_frame(&Frame {
                index: current_frame,
                label_width,
                image: rasterizer.canvas(),
            })?;

            current_frame += 1;
        }
    }

    info!("Rendering last frame");
    sink.write_frame(&Frame {
        index: current_frame,
        label_width,
        image: rasterizer.canvas(),
    })?;

    Ok(RenderSummary {
        event_count: plan.event_count(),
        frame_interval: plan.interval(),
        frames_written: current_frame + 1,
        label_width,
    })
}
