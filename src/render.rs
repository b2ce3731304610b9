use image::{Rgb, RgbImage};

use crate::config::{FrameTime, RenderConfig};
use crate::error::{Result, StreamgenError};
use crate::raster::{self, Dial, BACKGROUND, BLUE, GRAY, GREEN, RED, WHITE, YELLOW};
use crate::text::{TextSize, Typeface};

/// Degrees per tick on the 60-tick dials.
const TICK_DEGREES: u32 = 360 / 60;

/// Anything that can paint frame `index` of a fixed-length run into a buffer.
pub trait FrameSource {
    fn last_frame(&self) -> u32;

    fn blank(&self) -> RgbImage;

    fn render_into(&self, index: u32, img: &mut RgbImage) -> Result<()>;
}

/// One of the four dials and the hand sweeping inside it.
struct Hand {
    dial: Dial,
    ticks: u32,
    color: Rgb<u8>,
    label: String,
}

/// Paints the diagnostic clock pattern. Output depends only on the
/// configuration and the frame index.
pub struct FrameRenderer {
    config: RenderConfig,
    typeface: Typeface,
}

impl FrameRenderer {
    pub fn new(config: RenderConfig, typeface: Typeface) -> Self {
        Self { config, typeface }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render(&self, index: u32) -> Result<RgbImage> {
        let mut img = self.blank();
        self.render_into(index, &mut img)?;
        Ok(img)
    }

    fn draw_grid(&self, img: &mut RgbImage) {
        let RenderConfig {
            width,
            height,
            grid_size,
            ..
        } = self.config;
        for x in (0..width).step_by(grid_size as usize) {
            raster::vertical_line(img, x as i32, WHITE);
        }
        raster::vertical_line(img, width as i32 - 1, WHITE);
        for y in (0..height).step_by(grid_size as usize) {
            raster::horizontal_line(img, y as i32, WHITE);
        }
        raster::horizontal_line(img, height as i32 - 1, WHITE);
    }

    fn hands(&self, time: &FrameTime) -> [Hand; 4] {
        let w = self.config.width as i32;
        let h = self.config.height as i32;
        let s = self.config.stroke();
        let small = self.config.small_dial();
        let frame = time.frame;
        let fps = self.config.frames_per_second;

        let left = w / 2 - h / 2 + s;
        let middle = h / 2 - small / 2;
        [
            Hand {
                dial: Dial::new(left, s, h - s * 2),
                ticks: seconds_ticks(frame, fps),
                color: RED,
                label: format!("S:{}", time.seconds),
            },
            Hand {
                dial: Dial::new(left, middle, small),
                ticks: frame_ticks(frame),
                color: GREEN,
                label: format!("F:{}", frame),
            },
            Hand {
                dial: Dial::new(left + (h - s * 2) - small, middle, small),
                ticks: minute_ticks(frame, fps),
                color: BLUE,
                label: format!("M:{}", time.minutes),
            },
            Hand {
                dial: Dial::new(w / 2 - small / 2, h / 2 + small / 2, small),
                ticks: hour_ticks(frame, fps),
                color: YELLOW,
                label: format!("H:{}", time.hours),
            },
        ]
    }

    fn draw_hand(&self, img: &mut RgbImage, hand: &Hand) {
        let thickness = self.config.arm_thickness();
        // Slice centred on twelve o'clock, swept clockwise by the tick count.
        let start = 90 - thickness / 2 - hand.ticks as i32;

        raster::stroke_ring(img, hand.dial, self.config.stroke(), WHITE);
        raster::fill_pie(img, hand.dial, start as f64, thickness as f64, hand.color);

        let (cx, cy) = hand.dial.label_anchor();
        self.typeface
            .draw_centered(img, &hand.label, TextSize::Label, cx, cy, GRAY);
    }

    fn draw_progress(&self, img: &mut RgbImage, frame: u32) {
        let grid = self.config.grid_size as i32;
        let h = self.config.height as i32;
        raster::fill_rect(
            img,
            0,
            h - 3 * grid / 4,
            progress_width(&self.config, frame) as i32,
            grid / 2,
            GREEN,
        );
    }

    /// Baselines of the timecode and of the resolution label, in that order.
    /// The label sits one of its own lines above the timecode.
    fn caption_baselines(&self) -> (i32, i32) {
        let middle = self.config.height as i32 / 2;
        let timecode = middle - self.typeface.line_height(TextSize::Timecode) * 4;
        let resolution = timecode - self.typeface.line_height(TextSize::Resolution);
        (timecode, resolution)
    }

    fn draw_captions(&self, img: &mut RgbImage, time: &FrameTime) {
        let center = self.config.width as i32 / 2;
        let (timecode_baseline, resolution_baseline) = self.caption_baselines();

        self.typeface.draw_centered(
            img,
            &time.timecode(),
            TextSize::Timecode,
            center,
            timecode_baseline,
            WHITE,
        );

        self.typeface.draw_centered(
            img,
            &resolution_label(&self.config),
            TextSize::Resolution,
            center,
            resolution_baseline,
            WHITE,
        );
    }
}

impl FrameSource for FrameRenderer {
    fn last_frame(&self) -> u32 {
        self.config.total_frames
    }

    fn blank(&self) -> RgbImage {
        RgbImage::new(self.config.width, self.config.height)
    }

    fn render_into(&self, index: u32, img: &mut RgbImage) -> Result<()> {
        if index > self.config.total_frames {
            return Err(StreamgenError::FrameOutOfRange {
                index,
                total: self.config.total_frames,
            });
        }
        if img.dimensions() != (self.config.width, self.config.height) {
            *img = self.blank();
        }
        let time = FrameTime::new(index, self.config.frames_per_second);

        raster::fill(img, BACKGROUND);
        self.draw_grid(img);
        for hand in self.hands(&time) {
            self.draw_hand(img, &hand);
        }
        self.draw_progress(img, index);
        self.draw_captions(img, &time);
        Ok(())
    }
}

/// Whole seconds elapsed, one tick each; the hand jumps once per second.
pub fn seconds_ticks(frame: u32, fps: u32) -> u32 {
    (frame / fps * TICK_DEGREES) % 360
}

pub fn frame_ticks(frame: u32) -> u32 {
    frame % 360
}

pub fn minute_ticks(frame: u32, fps: u32) -> u32 {
    (frame / (fps * 60) * TICK_DEGREES) % 360
}

pub fn hour_ticks(frame: u32, fps: u32) -> u32 {
    (frame / (fps * 3600) * TICK_DEGREES) % 360
}

/// `floor(width * frame / total_frames)`, in exact integer arithmetic.
pub fn progress_width(config: &RenderConfig, frame: u32) -> u32 {
    (config.width as u64 * frame as u64 / config.total_frames as u64) as u32
}

pub fn resolution_label(config: &RenderConfig) -> String {
    format!("{} x {}", config.width, config.height)
}
