use std::path::Path;

use colors_transform::{Color, Hsl as CssHsl};
use image::{ImageResult, RgbaImage};
use nalgebra::Point2;

use crate::settings::Bounds;

/// Particle fill. `lightness` is kept exactly as computed, even outside 0..=100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub fn to_pixel(&self) -> image::Rgba<u8> {
        let rgb = CssHsl::from(
            self.hue.rem_euclid(360.0) as f32,
            self.saturation.clamp(0.0, 100.0) as f32,
            self.lightness.clamp(0.0, 100.0) as f32,
        )
        .to_rgb();
        image::Rgba([
            rgb.get_red().round() as u8,
            rgb.get_green().round() as u8,
            rgb.get_blue().round() as u8,
            u8::MAX,
        ])
    }
}

/// Line colour with a fractional alpha in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f64,
}

impl Rgba {
    pub fn white(alpha: f64) -> Self {
        Rgba {
            red: 255,
            green: 255,
            blue: 255,
            alpha,
        }
    }
}

/// Receives the draw commands of one frame: a clear, every link, then every particle.
pub trait RenderSink {
    fn clear(&mut self, bounds: Bounds);
    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>, stroke_width: f64, color: Rgba);
    fn draw_disc(&mut self, center: Point2<f64>, radius: f64, fill: Hsl);
}

/// Rasterises frames into an in-memory RGBA image.
pub struct ImageSink {
    image: RgbaImage,
    background: image::Rgba<u8>,
}

impl ImageSink {
    pub fn new(background: image::Rgba<u8>) -> Self {
        ImageSink {
            image: RgbaImage::new(0, 0),
            background,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.image.save(path)
    }

    /// Calls `paint` for every pixel whose centre lies in the given box, clipped to the image.
    fn for_each_pixel_in(
        &mut self,
        min: Point2<f64>,
        max: Point2<f64>,
        mut paint: impl FnMut(Point2<f64>, &mut image::Rgba<u8>),
    ) {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(width - 1);
        let y1 = (max.y.ceil().max(0.0) as u32).min(height - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let centre = Point2::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                paint(centre, self.image.get_pixel_mut(x, y));
            }
        }
    }
}

impl Default for ImageSink {
    fn default() -> Self {
        ImageSink::new(image::Rgba([0, 0, 0, 255]))
    }
}

impl RenderSink for ImageSink {
    fn clear(&mut self, bounds: Bounds) {
        if self.image.dimensions() == (bounds.width(), bounds.height()) {
            for pixel in self.image.pixels_mut() {
                *pixel = self.background;
            }
        } else {
            self.image = RgbaImage::from_pixel(bounds.width(), bounds.height(), self.background);
        }
    }

    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>, stroke_width: f64, color: Rgba) {
        // Thinner strokes still cover a hairline.
        let half = (stroke_width / 2.0).max(0.5);
        let min = Point2::new(from.x.min(to.x) - half, from.y.min(to.y) - half);
        let max = Point2::new(from.x.max(to.x) + half, from.y.max(to.y) + half);
        let source = image::Rgba([color.red, color.green, color.blue, u8::MAX]);
        let alpha = color.alpha.clamp(0.0, 1.0);
        self.for_each_pixel_in(min, max, |centre, pixel| {
            if distance_to_segment(centre, from, to) <= half {
                blend(pixel, source, alpha);
            }
        });
    }

    fn draw_disc(&mut self, center: Point2<f64>, radius: f64, fill: Hsl) {
        let min = Point2::new(center.x - radius, center.y - radius);
        let max = Point2::new(center.x + radius, center.y + radius);
        let source = fill.to_pixel();
        self.for_each_pixel_in(min, max, |centre, pixel| {
            if nalgebra::distance(&centre, &center) <= radius {
                *pixel = source;
            }
        });
    }
}

fn distance_to_segment(point: Point2<f64>, from: Point2<f64>, to: Point2<f64>) -> f64 {
    let segment = to - from;
    let length_squared = segment.norm_squared();
    if length_squared == 0.0 {
        return nalgebra::distance(&point, &from);
    }
    let t = ((point - from).dot(&segment) / length_squared).clamp(0.0, 1.0);
    nalgebra::distance(&point, &(from + segment * t))
}

// Source-over compositing.
fn blend(pixel: &mut image::Rgba<u8>, source: image::Rgba<u8>, alpha: f64) {
    let image::Rgba([r, g, b, a]) = *pixel;
    let mix = |dst: u8, src: u8| (f64::from(src) * alpha + f64::from(dst) * (1.0 - alpha)).round() as u8;
    let out_alpha = alpha + f64::from(a) / 255.0 * (1.0 - alpha);
    *pixel = image::Rgba([
        mix(r, source[0]),
        mix(g, source[1]),
        mix(b, source[2]),
        (out_alpha * 255.0).round() as u8,
    ]);
}
