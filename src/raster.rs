use image::{Rgb, RgbImage};

pub const BACKGROUND: Rgb<u8> = Rgb([64, 64, 64]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const GRAY: Rgb<u8> = Rgb([128, 128, 128]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);

/// Square bounding box of a circular dial, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dial {
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

impl Dial {
    pub fn new(x: i32, y: i32, size: i32) -> Self {
        Self { x, y, size }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.size as f64 / 2.0,
            self.y as f64 + self.size as f64 / 2.0,
        )
    }

    pub fn radius(&self) -> f64 {
        self.size as f64 / 2.0
    }

    /// Integer centre used to anchor labels.
    pub fn label_anchor(&self) -> (i32, i32) {
        (self.x + self.size / 2, self.y + self.size / 2)
    }
}

pub fn fill(img: &mut RgbImage, color: Rgb<u8>) {
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
}

pub fn vertical_line(img: &mut RgbImage, x: i32, color: Rgb<u8>) {
    if x < 0 || x >= img.width() as i32 {
        return;
    }
    for y in 0..img.height() {
        img.put_pixel(x as u32, y, color);
    }
}

pub fn horizontal_line(img: &mut RgbImage, y: i32, color: Rgb<u8>) {
    if y < 0 || y >= img.height() as i32 {
        return;
    }
    for x in 0..img.width() {
        img.put_pixel(x, y as u32, color);
    }
}

/// Fills `[x, x + w) × [y, y + h)`, clipped to the image.
pub fn fill_rect(img: &mut RgbImage, x: i32, y: i32, w: i32, h: i32, color: Rgb<u8>) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(img.width() as i32);
    let y1 = (y + h).min(img.height() as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px as u32, py as u32, color);
        }
    }
}

/// Circle outline of the given pen width, centred on the dial's edge.
pub fn stroke_ring(img: &mut RgbImage, dial: Dial, stroke: i32, color: Rgb<u8>) {
    let (cx, cy) = dial.center();
    let radius = dial.radius();
    let half = stroke.max(1) as f64 / 2.0;
    let reach = stroke.max(1);
    for_each_in_box(img, dial, reach, |img, px, py| {
        let dist = distance(px, py, cx, cy);
        if (dist - radius).abs() <= half {
            img.put_pixel(px, py, color);
        }
    });
}

/// Filled pie slice covering `[start, start + extent]` degrees, with 0° at
/// three o'clock and angles growing counter-clockwise.
pub fn fill_pie(img: &mut RgbImage, dial: Dial, start: f64, extent: f64, color: Rgb<u8>) {
    let (cx, cy) = dial.center();
    let radius = dial.radius();
    for_each_in_box(img, dial, 0, |img, px, py| {
        if distance(px, py, cx, cy) > radius {
            return;
        }
        let angle = angle_of(px, py, cx, cy);
        if (angle - start).rem_euclid(360.0) <= extent {
            img.put_pixel(px, py, color);
        }
    });
}

/// Blends `color` over the pixel at `(x, y)` with the given 0-255 coverage.
pub fn blend(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: u8) {
    if coverage == 0 || x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let alpha = coverage as u32;
    let dst = img.get_pixel_mut(x as u32, y as u32);
    for (d, s) in dst.0.iter_mut().zip(color.0) {
        *d = ((s as u32 * alpha + *d as u32 * (255 - alpha) + 127) / 255) as u8;
    }
}

fn for_each_in_box(
    img: &mut RgbImage,
    dial: Dial,
    margin: i32,
    mut f: impl FnMut(&mut RgbImage, u32, u32),
) {
    let x0 = (dial.x - margin).max(0);
    let y0 = (dial.y - margin).max(0);
    let x1 = (dial.x + dial.size + margin + 1).min(img.width() as i32);
    let y1 = (dial.y + dial.size + margin + 1).min(img.height() as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            f(img, px as u32, py as u32);
        }
    }
}

// Pixel centres are sampled, so (px, py) covers (px + 0.5, py + 0.5).
fn distance(px: u32, py: u32, cx: f64, cy: f64) -> f64 {
    let dx = px as f64 + 0.5 - cx;
    let dy = py as f64 + 0.5 - cy;
    (dx * dx + dy * dy).sqrt()
}

fn angle_of(px: u32, py: u32, cx: f64, cy: f64) -> f64 {
    let dx = px as f64 + 0.5 - cx;
    let dy = cy - (py as f64 + 0.5);
    dy.atan2(dx).to_degrees().rem_euclid(360.0)
}
