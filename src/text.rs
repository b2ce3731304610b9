use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings, Metrics};
use image::{Rgb, RgbImage};
use tracing::debug;

use crate::error::{Result, StreamgenError};
use crate::raster::blend;

/// Where the bundled face lives in the source tree.
pub const DEFAULT_FONT: &str = "assets/fonts/DejaVuSans-Bold.ttf";

static BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// The three text sizes drawn on a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextSize {
    /// Dial labels.
    Label,
    Timecode,
    Resolution,
}

impl TextSize {
    pub const ALL: [TextSize; 3] = [TextSize::Label, TextSize::Timecode, TextSize::Resolution];

    pub fn px(self) -> f32 {
        match self {
            TextSize::Label => 14.0,
            TextSize::Timecode => 24.0,
            TextSize::Resolution => 36.0,
        }
    }
}

#[derive(Clone)]
struct Glyph {
    metrics: Metrics,
    coverage: Vec<u8>,
}

/// A TrueType face with its printable ASCII glyphs rasterized up front, so
/// drawing a frame never mutates it.
pub struct Typeface {
    font: Font,
    glyphs: HashMap<(char, TextSize), Glyph>,
    line_heights: HashMap<TextSize, i32>,
}

impl Typeface {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| StreamgenError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let typeface = Self::from_bytes(path, bytes)?;
        debug!("Loaded font {} ({} glyphs cached)", path.display(), typeface.glyphs.len());
        Ok(typeface)
    }

    /// The face compiled into the binary, usable from any working directory.
    pub fn bundled() -> Result<Self> {
        Self::from_bytes(Path::new(DEFAULT_FONT), BUNDLED_FONT.to_vec())
    }

    pub fn from_bytes(origin: &Path, bytes: Vec<u8>) -> Result<Self> {
        let font_error = |reason: String| StreamgenError::Font {
            path: PathBuf::from(origin),
            reason,
        };
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| font_error(e.to_string()))?;

        let mut line_heights = HashMap::new();
        for size in TextSize::ALL {
            let metrics = font
                .horizontal_line_metrics(size.px())
                .ok_or_else(|| font_error("font has no horizontal line metrics".to_string()))?;
            line_heights.insert(size, metrics.new_line_size.ceil() as i32);
        }

        let mut glyphs = HashMap::new();
        for size in TextSize::ALL {
            for ch in ' '..='~' {
                let (metrics, coverage) = font.rasterize(ch, size.px());
                glyphs.insert((ch, size), Glyph { metrics, coverage });
            }
        }

        Ok(Self {
            font,
            glyphs,
            line_heights,
        })
    }

    /// Ascent + descent + line gap, rounded up to whole pixels.
    pub fn line_height(&self, size: TextSize) -> i32 {
        self.line_heights[&size]
    }

    /// Width of the glyph run, as the sum of advance widths.
    pub fn measure(&self, text: &str, size: TextSize) -> f32 {
        text.chars()
            .map(|ch| self.glyph(ch, size).metrics.advance_width)
            .sum()
    }

    /// Draws `text` with its left edge at `x` and its baseline at `baseline`.
    pub fn draw(
        &self,
        img: &mut RgbImage,
        text: &str,
        size: TextSize,
        x: i32,
        baseline: i32,
        color: Rgb<u8>,
    ) {
        let mut pen = x as f32;
        for ch in text.chars() {
            let glyph = self.glyph(ch, size);
            let m = glyph.metrics;
            let left = pen.round() as i32 + m.xmin;
            let top = baseline - m.height as i32 - m.ymin;
            for row in 0..m.height {
                for col in 0..m.width {
                    let coverage = glyph.coverage[row * m.width + col];
                    blend(img, left + col as i32, top + row as i32, color, coverage);
                }
            }
            pen += m.advance_width;
        }
    }

    /// Draws `text` horizontally centred on `center_x`.
    pub fn draw_centered(
        &self,
        img: &mut RgbImage,
        text: &str,
        size: TextSize,
        center_x: i32,
        baseline: i32,
        color: Rgb<u8>,
    ) {
        let x = center_x - (self.measure(text, size) / 2.0) as i32;
        self.draw(img, text, size, x, baseline, color);
    }

    fn glyph(&self, ch: char, size: TextSize) -> Cow<'_, Glyph> {
        match self.glyphs.get(&(ch, size)) {
            Some(glyph) => Cow::Borrowed(glyph),
            None => {
                let (metrics, coverage) = self.font.rasterize(ch, size.px());
                Cow::Owned(Glyph { metrics, coverage })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn bundled() -> Typeface {
        Typeface::bundled().unwrap()
    }

    fn inked_columns(img: &RgbImage) -> Option<(u32, u32)> {
        let cols: Vec<u32> = (0..img.width())
            .filter(|&x| (0..img.height()).any(|y| img.get_pixel(x, y).0[0] > 0))
            .collect();
        Some((*cols.first()?, *cols.last()?))
    }

    #[test]
    fn missing_font_is_a_resource_error() {
        let err = match Typeface::load(Path::new("no/such/font.ttf")) {
            Err(e) => e,
            Ok(_) => panic!("missing font loaded"),
        };
        assert!(matches!(err, StreamgenError::Font { .. }));
    }

    #[test]
    fn bundled_face_matches_the_asset_on_disk() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_FONT);
        let from_disk = Typeface::load(&path).unwrap();
        let embedded = bundled();
        for size in TextSize::ALL {
            assert_eq!(embedded.line_height(size), from_disk.line_height(size));
            assert_eq!(embedded.measure("HH:00", size), from_disk.measure("HH:00", size));
        }
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let result = Typeface::from_bytes(Path::new("garbage.ttf"), vec![0u8; 64]);
        assert!(matches!(result, Err(StreamgenError::Font { .. })));
    }

    #[test]
    fn larger_sizes_measure_wider_and_taller() {
        let face = bundled();
        let small = face.measure("1280 x 720", TextSize::Label);
        let large = face.measure("1280 x 720", TextSize::Resolution);
        assert!(small > 0.0);
        assert!(large > small * 2.0);
        assert!(face.line_height(TextSize::Resolution) > face.line_height(TextSize::Label));
        assert!(face.measure("F:100", TextSize::Label) > face.measure("F:1", TextSize::Label));
    }

    #[test]
    fn centred_text_is_balanced_around_the_centre() {
        let face = bundled();
        let mut img = RgbImage::new(400, 60);
        let white = Rgb([255, 255, 255]);
        face.draw_centered(&mut img, "HH:00 MM:01", TextSize::Timecode, 200, 40, white);
        let (left, right) = inked_columns(&img).unwrap();
        let middle = (left + right) as i32 / 2;
        assert!((middle - 200).abs() <= 3, "ink spans {left}..{right}");
    }

    #[test]
    fn glyphs_sit_on_the_baseline() {
        let face = bundled();
        let mut img = RgbImage::new(100, 60);
        face.draw(&mut img, "H", TextSize::Resolution, 10, 40, Rgb([255, 255, 255]));
        let below = (41..60).any(|y| (0..100).any(|x| img.get_pixel(x, y).0[0] > 128));
        let above = (0..40).any(|y| (0..100).any(|x| img.get_pixel(x, y).0[0] > 128));
        assert!(above);
        assert!(!below);
    }
}
