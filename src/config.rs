use crate::error::{Result, StreamgenError};

pub const FRAMES_PER_SECOND: u32 = 30;
pub const DURATION_SECONDS: u32 = 60 * 60 * 2;
pub const TOTAL_FRAMES: u32 = FRAMES_PER_SECOND * DURATION_SECONDS;

/// Heights the generator knows a 16:9 width for.
pub const SUPPORTED_HEIGHTS: [u32; 3] = [480, 720, 1080];

/// Immutable per-run configuration, derived from the requested height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub grid_size: u32,
    pub frames_per_second: u32,
    pub total_frames: u32,
}

impl RenderConfig {
    pub fn from_height(height: u32) -> Result<Self> {
        let width = match height {
            480 => 854,
            720 => 1280,
            1080 => 1920,
            other => return Err(StreamgenError::UnsupportedHeight(other)),
        };
        Ok(Self {
            width,
            height,
            grid_size: height / 9,
            frames_per_second: FRAMES_PER_SECOND,
            total_frames: TOTAL_FRAMES,
        })
    }

    /// Angular width of every hand slice, in degrees.
    pub fn arm_thickness(&self) -> i32 {
        (self.height / 90) as i32
    }

    /// Pen width of the dial outlines.
    pub fn stroke(&self) -> i32 {
        (self.height / 120) as i32
    }

    /// Side of the three small dials.
    pub fn small_dial(&self) -> i32 {
        (self.height / 5) as i32
    }

    pub fn frame_count(&self) -> u64 {
        self.total_frames as u64 + 1
    }
}

/// Wall-clock position of a frame, recomputed for every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTime {
    pub frame: u32,
    pub elapsed_seconds: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frame_in_second: u32,
}

impl FrameTime {
    pub fn new(frame: u32, frames_per_second: u32) -> Self {
        let elapsed_seconds = frame / frames_per_second;
        Self {
            frame,
            elapsed_seconds,
            hours: elapsed_seconds / 3600,
            minutes: elapsed_seconds % 3600 / 60,
            seconds: elapsed_seconds % 60,
            frame_in_second: frame % frames_per_second,
        }
    }

    pub fn timecode(&self) -> String {
        format!(
            "HH:{:02} MM:{:02} SS:{:02} F:{:02}",
            self.hours, self.minutes, self.seconds, self.frame_in_second
        )
    }
}
