//! CPU rasterizer implementing [`Surface`] on an RGBA image.
//!
//! Draws are turned into device-space coverage masks (see [`fill`]), then
//! composited source-over with straight alpha. Blur and shadows operate on
//! the masks.

pub mod fill;
pub mod fonts;

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use instavid_project_model::{Color, TextAlign, CANVAS_WIDTH};

use kurbo::BezPath;

use crate::geometry::{scale_factor, Affine, Point, Shape, StrokeStyle};
use crate::recording::RECORDED_ADVANCE;
use crate::surface::{aligned_left, DrawState, FontSpec, LinearGradient, Paint, Surface};

pub use fill::Mask;
pub use fonts::{FontBook, FontFace};

/// Curve approximation tolerance in device pixels.
const TOLERANCE_PX: f64 = 0.2;

pub struct RasterSurface {
    image: RgbaImage,
    /// Canvas units to device pixels.
    root: Affine,
    logical_width: f64,
    logical_height: f64,
    state: DrawState,
    stack: Vec<DrawState>,
    fonts: Arc<FontBook>,
    warned_missing_fonts: bool,
}

impl RasterSurface {
    /// Surface of `width × height` pixels showing the 1080-unit-wide canvas.
    pub fn new(width: u32, height: u32, fonts: Arc<FontBook>) -> Self {
        let scale = width.max(1) as f64 / CANVAS_WIDTH;
        Self {
            image: RgbaImage::new(width, height),
            root: Affine::scale(scale),
            logical_width: CANVAS_WIDTH,
            logical_height: height as f64 / scale,
            state: DrawState::default(),
            stack: Vec::new(),
            fonts,
            warned_missing_fonts: false,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn root_scale(&self) -> f64 {
        self.root.as_coeffs()[0]
    }

    fn device(&self) -> Affine {
        self.root * self.state.transform
    }

    /// Fill a local-space path under the current transform.
    fn fill_local(&mut self, mut path: BezPath, paint: &Paint) {
        if path.is_empty() {
            return;
        }
        let device = self.device();
        path.apply_affine(device);
        let (w, h) = self.image.dimensions();
        let Some(mut mask) = fill::rasterize(&path, w, h) else {
            return;
        };
        if self.state.blur > 0.0 {
            mask = mask.blurred(self.state.blur * scale_factor(&device));
        }
        let alpha = self.state.alpha as f32;
        if alpha <= 0.0 {
            return;
        }

        if let Some(shadow) = self.state.shadow {
            let k = self.root_scale();
            let shadow_mask = mask
                .offset((shadow.offset_x * k).round() as i64, (shadow.offset_y * k).round() as i64)
                .blurred(shadow.blur / 2.0 * k);
            composite(&mut self.image, &shadow_mask, &Sampler::Solid(shadow.color), alpha);
        }

        let sampler = Sampler::new(paint, &device);
        composite(&mut self.image, &mask, &sampler, alpha);
    }

    fn tolerance(&self) -> f64 {
        TOLERANCE_PX / scale_factor(&self.device()).max(1e-6)
    }

    /// Glyph outlines for `text`, or `None` with a one-time warning when no
    /// font is available.
    fn text_shape(&mut self, text: &str, x: f64, y: f64, font: &FontSpec, align: TextAlign) -> Option<Shape> {
        let Some(face) = self.fonts.lookup(font) else {
            if !self.warned_missing_fonts {
                tracing::warn!(family = %font.family, "No fonts loaded, skipping text");
                self.warned_missing_fonts = true;
            }
            return None;
        };
        let width = face.measure(text, font.size);
        let left = aligned_left(x, width, align);
        let baseline = y + face.baseline_offset(font.size, font.baseline);
        let run = face.layout(text, left, baseline, font.size);
        Some(Shape::Path(run.path))
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> f64 {
        self.logical_width
    }

    fn height(&self) -> f64 {
        self.logical_height
    }

    fn state(&self) -> &DrawState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DrawState {
        &mut self.state
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn clear(&mut self, paint: &Paint) {
        let sampler = Sampler::new(paint, &self.root);
        for (x, y, px) in self.image.enumerate_pixels_mut() {
            let c = sampler.at(x as f64 + 0.5, y as f64 + 0.5);
            *px = Rgba(c.to_rgba8());
        }
    }

    fn fill(&mut self, shape: &Shape, paint: &Paint) {
        let path = shape.to_path(self.tolerance());
        self.fill_local(path, paint);
    }

    fn stroke(&mut self, shape: &Shape, style: &StrokeStyle, paint: &Paint) {
        let path = shape.stroke_path(style, self.tolerance());
        self.fill_local(path, paint);
    }

    fn measure_text(&mut self, text: &str, font: &FontSpec) -> f64 {
        match self.fonts.lookup(font) {
            Some(face) => face.measure(text, font.size),
            None => text.chars().count() as f64 * font.size * RECORDED_ADVANCE,
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &FontSpec, align: TextAlign, paint: &Paint) {
        if let Some(shape) = self.text_shape(text, x, y, font, align) {
            self.fill(&shape, paint);
        }
    }

    fn stroke_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: &FontSpec,
        align: TextAlign,
        style: &StrokeStyle,
        paint: &Paint,
    ) {
        if let Some(shape) = self.text_shape(text, x, y, font, align) {
            self.stroke(&shape, style, paint);
        }
    }
}

/// Per-pixel paint lookup in device space.
enum Sampler<'a> {
    Solid(Color),
    Linear {
        gradient: &'a LinearGradient,
        inverse: Affine,
    },
}

impl<'a> Sampler<'a> {
    fn new(paint: &'a Paint, device: &Affine) -> Self {
        match paint {
            Paint::Solid { color } => Sampler::Solid(*color),
            Paint::Linear(gradient) if device.determinant().abs() > 1e-12 => Sampler::Linear {
                gradient,
                inverse: device.inverse(),
            },
            Paint::Linear(gradient) => Sampler::Solid(gradient.color_at(0.0)),
        }
    }

    fn at(&self, x: f64, y: f64) -> Color {
        match self {
            Sampler::Solid(c) => *c,
            Sampler::Linear { gradient, inverse } => {
                let local = *inverse * Point::new(x, y);
                gradient.color_at(gradient.parameter(local))
            }
        }
    }
}

fn composite(image: &mut RgbaImage, mask: &Mask, sampler: &Sampler<'_>, alpha: f32) {
    let (w, h) = image.dimensions();
    for row in 0..mask.height {
        let y = mask.y + row as i64;
        if y < 0 || y >= h as i64 {
            continue;
        }
        for col in 0..mask.width {
            let x = mask.x + col as i64;
            if x < 0 || x >= w as i64 {
                continue;
            }
            let coverage = mask.coverage(col, row) * alpha;
            if coverage <= 0.0 {
                continue;
            }
            let src = sampler.at(x as f64 + 0.5, y as f64 + 0.5);
            let dst = image.get_pixel_mut(x as u32, y as u32);
            *dst = blend(*dst, src, coverage);
        }
    }
}

/// Source-over with straight alpha.
pub fn blend(dst: Rgba<u8>, src: Color, coverage: f32) -> Rgba<u8> {
    let sa = (src.a * coverage).clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| -> u8 {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src.r, dst.0[0]),
        channel(src.g, dst.0[1]),
        channel(src.b, dst.0[2]),
        (out_a * 255.0).round() as u8,
    ])
}
