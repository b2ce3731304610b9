use std::io::Write;

use image::codecs::bmp::BmpEncoder;
use image::{ExtendedColorType, ImageError, RgbImage};

use crate::error::{Result, StreamgenError};

/// Ordered, append-only consumer of rendered frames.
pub trait FrameSink {
    fn write_frame(&mut self, index: u32, frame: &RgbImage) -> Result<()>;
}

/// Writes every frame as a standalone uncompressed 24-bit BMP, back to back
/// on one byte stream. Consumers split the stream on the BMP headers.
pub struct BmpSink<W: Write> {
    writer: W,
    frames_written: u64,
}

impl<W: Write> BmpSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn encode(&mut self, frame: &RgbImage) -> std::result::Result<(), ImageError> {
        BmpEncoder::new(&mut self.writer).encode(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> FrameSink for BmpSink<W> {
    fn write_frame(&mut self, index: u32, frame: &RgbImage) -> Result<()> {
        self.encode(frame)
            .map_err(|source| StreamgenError::Output { index, source })?;
        self.frames_written += 1;
        Ok(())
    }
}
