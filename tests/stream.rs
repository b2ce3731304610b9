use std::path::Path;

use image::RgbImage;
use indicatif::ProgressBar;
use streamgen::text::{Typeface, DEFAULT_FONT};
use streamgen::{BmpSink, FrameRenderer, FrameSequencer, FrameSource, RenderConfig, Result};

/// Only the first few frames of a real run.
struct Opening<'a> {
    renderer: &'a FrameRenderer,
    last: u32,
}

impl FrameSource for Opening<'_> {
    fn last_frame(&self) -> u32 {
        self.last
    }

    fn blank(&self) -> RgbImage {
        self.renderer.blank()
    }

    fn render_into(&self, index: u32, img: &mut RgbImage) -> Result<()> {
        self.renderer.render_into(index, img)
    }
}

fn renderer(height: u32) -> FrameRenderer {
    let font = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_FONT);
    let typeface = Typeface::load(&font).unwrap();
    FrameRenderer::new(RenderConfig::from_height(height).unwrap(), typeface)
}

/// Splits a stream of concatenated bitmaps using the size in each file header.
fn split_bitmaps(mut bytes: &[u8]) -> Vec<&[u8]> {
    let mut frames = Vec::new();
    while !bytes.is_empty() {
        assert_eq!(&bytes[..2], b"BM");
        let len = u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]) as usize;
        let (frame, rest) = bytes.split_at(len);
        frames.push(frame);
        bytes = rest;
    }
    frames
}

#[test]
fn stream_decodes_back_to_rendered_frames() {
    let renderer = renderer(480);
    let source = Opening {
        renderer: &renderer,
        last: 3,
    };
    let mut sink = BmpSink::new(Vec::new());
    let written = FrameSequencer::new(ProgressBar::hidden())
        .run(&source, &mut sink)
        .unwrap();
    assert_eq!(written, 4);

    let bytes = sink.into_inner();
    let frames = split_bitmaps(&bytes);
    assert_eq!(frames.len(), 4);
    for (index, frame) in frames.into_iter().enumerate() {
        let decoded = image::load_from_memory_with_format(frame, image::ImageFormat::Bmp)
            .unwrap()
            .to_rgb8();
        assert_eq!(decoded.dimensions(), (854, 480));
        assert_eq!(decoded, renderer.render(index as u32).unwrap(), "frame {index}");
    }
}

#[test]
fn consecutive_frames_differ() {
    let renderer = renderer(720);
    let a = renderer.render(0).unwrap();
    let b = renderer.render(1).unwrap();
    assert_ne!(a, b);
}

#[test]
fn last_frame_renders_and_past_end_is_rejected() {
    let renderer = renderer(1080);
    assert_eq!(renderer.last_frame(), 216_000);
    assert_eq!(renderer.config().frame_count(), 216_001);
    assert!(renderer.render(216_000).is_ok());
    assert!(renderer.render(216_001).is_err());
}
