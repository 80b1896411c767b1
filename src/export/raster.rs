//! Page rasterization.
//!
//! Paints a laid-out page into an oversampled RGB bitmap with tiny-skia.
//! Text is drawn from real TrueType outlines when the font context carries
//! a registered face; with only the built-in metric tables, lines are
//! greeked as toned bars of the correct width, so layout stays inspectable
//! even without a font file.

use tiny_skia::{
    FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, StrokeDash,
    Transform,
};
use tracing::warn;

use crate::error::PlatenError;
use crate::font::{FontContext, FontWeight, ASCENT_RATIO};
use crate::image_loader::load_image;
use crate::layout::{DrawCommand, LaidOutPage, LayoutElement, TextLine};
use crate::style::{Border, Color};

/// Device pixels per logical unit in the exported raster.
pub const OVERSAMPLE: u32 = 3;

/// An opaque RGB bitmap of the rendered page.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// width * height * 3 bytes.
    pub rgb: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

/// Turns a laid-out page into pixels. The export pipeline is generic over
/// this so tests can substitute a cheap stub.
pub trait PageRasterizer {
    fn rasterize(
        &self,
        page: &LaidOutPage,
        fonts: &FontContext,
    ) -> Result<RasterImage, PlatenError>;
}

/// The default tiny-skia backed rasterizer.
pub struct SkiaRasterizer {
    oversample: u32,
}

impl Default for SkiaRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkiaRasterizer {
    pub fn new() -> Self {
        Self {
            oversample: OVERSAMPLE,
        }
    }

    pub fn with_oversample(oversample: u32) -> Self {
        Self {
            oversample: oversample.max(1),
        }
    }
}

impl PageRasterizer for SkiaRasterizer {
    fn rasterize(
        &self,
        page: &LaidOutPage,
        fonts: &FontContext,
    ) -> Result<RasterImage, PlatenError> {
        let s = self.oversample as f32;
        let width_px = (page.width as f32 * s).round() as u32;
        let height_px = (page.height as f32 * s).round() as u32;

        let mut pixmap = Pixmap::new(width_px, height_px)
            .ok_or_else(|| PlatenError::Raster("invalid raster dimensions".to_string()))?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let mut painter = Painter {
            pixmap: &mut pixmap,
            fonts,
            scale: s,
        };
        for element in &page.elements {
            painter.paint(element);
        }

        // The page background is opaque, so the premultiplied RGBA buffer
        // is alpha-255 throughout and the RGB bytes read out directly.
        let rgb = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        Ok(RasterImage {
            rgb,
            width_px,
            height_px,
        })
    }
}

struct Painter<'a> {
    pixmap: &'a mut Pixmap,
    fonts: &'a FontContext,
    scale: f32,
}

impl Painter<'_> {
    fn paint(&mut self, element: &LayoutElement) {
        match &element.draw {
            DrawCommand::None => {}
            DrawCommand::Rect {
                background,
                border,
                border_top,
                border_bottom,
            } => {
                if let Some(bg) = background {
                    self.fill_rect(element.x, element.y, element.width, element.height, *bg);
                }
                if let Some(b) = border_top {
                    self.edge(element.x, element.y, element.width, b);
                }
                if let Some(b) = border_bottom {
                    self.edge(element.x, element.y + element.height - b.width, element.width, b);
                }
                if let Some(b) = border {
                    self.outline(element, b);
                }
            }
            DrawCommand::Text {
                lines,
                color,
                font_size,
                bold,
                letter_spacing,
                ..
            } => {
                let weight = if *bold {
                    FontWeight::Bold
                } else {
                    FontWeight::Regular
                };
                for line in lines {
                    self.text_line(line, weight, *font_size, *letter_spacing, *color);
                }
            }
            DrawCommand::Image { src } => self.image(element, src),
        }
        for child in &element.children {
            self.paint(child);
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        let s = self.scale;
        if let Some(rect) =
            Rect::from_xywh(x as f32 * s, y as f32 * s, w as f32 * s, h as f32 * s)
        {
            let paint = solid_paint(color);
            self.pixmap
                .fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    /// A horizontal border edge, solid or dashed.
    fn edge(&mut self, x: f64, y: f64, w: f64, border: &Border) {
        if !border.dashed {
            self.fill_rect(x, y, w, border.width, border.color);
            return;
        }
        self.stroke_line(x, y, x + w, y, border);
    }

    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, border: &Border) {
        let s = self.scale;
        let mut pb = PathBuilder::new();
        pb.move_to(x0 as f32 * s, y0 as f32 * s);
        pb.line_to(x1 as f32 * s, y1 as f32 * s);
        let Some(path) = pb.finish() else { return };

        let paint = solid_paint(border.color);
        let stroke = Stroke {
            width: border.width as f32 * s,
            dash: if border.dashed {
                StrokeDash::new(vec![4.0 * s, 3.0 * s], 0.0)
            } else {
                None
            },
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Full box outline (the empty-signature placeholder).
    fn outline(&mut self, element: &LayoutElement, border: &Border) {
        let (x, y, w, h) = (element.x, element.y, element.width, element.height);
        self.stroke_line(x, y, x + w, y, border);
        self.stroke_line(x + w, y, x + w, y + h, border);
        self.stroke_line(x + w, y + h, x, y + h, border);
        self.stroke_line(x, y + h, x, y, border);
    }

    fn text_line(
        &mut self,
        line: &TextLine,
        weight: FontWeight,
        font_size: f64,
        letter_spacing: f64,
        color: Color,
    ) {
        if line.text.is_empty() {
            return;
        }
        let baseline = line.y + font_size * ASCENT_RATIO;
        match self.fonts.face_data(weight) {
            Some(data) => {
                self.glyph_line(line, data, weight, font_size, letter_spacing, baseline, color)
            }
            None => {
                // Greek the line: a toned bar of the measured width keeps
                // the layout inspectable without a registered font.
                let bar_height = font_size * 0.52;
                let faded = Color {
                    a: color.a * 0.35,
                    ..color
                };
                self.fill_rect(line.x, baseline - bar_height, line.width, bar_height, faded);
            }
        }
    }

    fn glyph_line(
        &mut self,
        line: &TextLine,
        face_data: &[u8],
        weight: FontWeight,
        font_size: f64,
        letter_spacing: f64,
        baseline: f64,
        color: Color,
    ) {
        let Ok(face) = ttf_parser::Face::parse(face_data, 0) else {
            return;
        };
        let s = self.scale;
        let units_scale = (font_size as f32 * s) / face.units_per_em() as f32;
        let paint = solid_paint(color);

        let mut pen_x = line.x as f32 * s;
        let baseline_px = baseline as f32 * s;
        for ch in line.text.chars() {
            if let Some(glyph_id) = face.glyph_index(ch) {
                let mut builder = GlyphOutline {
                    pb: PathBuilder::new(),
                    scale: units_scale,
                    x: pen_x,
                    baseline: baseline_px,
                };
                if face.outline_glyph(glyph_id, &mut builder).is_some() {
                    if let Some(path) = builder.pb.finish() {
                        self.pixmap.fill_path(
                            &path,
                            &paint,
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                }
            }
            pen_x += (self.fonts.char_width(ch, weight, font_size) + letter_spacing) as f32 * s;
        }
    }

    fn image(&mut self, element: &LayoutElement, src: &str) {
        let loaded = match load_image(src) {
            Ok(img) => img,
            Err(e) => {
                warn!(error = %e, "signature image failed to load, leaving box empty");
                return;
            }
        };

        let Some(size) = IntSize::from_wh(loaded.width_px, loaded.height_px) else {
            return;
        };
        // tiny-skia wants premultiplied RGBA.
        let premultiplied: Vec<u8> = loaded
            .rgba
            .chunks_exact(4)
            .flat_map(|px| {
                let a = px[3] as u16;
                [
                    (px[0] as u16 * a / 255) as u8,
                    (px[1] as u16 * a / 255) as u8,
                    (px[2] as u16 * a / 255) as u8,
                    px[3],
                ]
            })
            .collect();
        let Some(source) = Pixmap::from_vec(premultiplied, size) else {
            return;
        };

        // Contain-fit into the element box, centered.
        let s = self.scale as f64;
        let box_w = element.width * s;
        let box_h = element.height * s;
        let fit = (box_w / loaded.width_px as f64).min(box_h / loaded.height_px as f64);
        let draw_w = loaded.width_px as f64 * fit;
        let draw_h = loaded.height_px as f64 * fit;
        let tx = element.x * s + (box_w - draw_w) / 2.0;
        let ty = element.y * s + (box_h - draw_h) / 2.0;

        let transform = Transform::from_row(fit as f32, 0.0, 0.0, fit as f32, tx as f32, ty as f32);
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &PixmapPaint::default(), transform, None);
    }
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(
        (color.r * 255.0).round() as u8,
        (color.g * 255.0).round() as u8,
        (color.b * 255.0).round() as u8,
        (color.a * 255.0).round() as u8,
    );
    paint.anti_alias = true;
    paint
}

/// Maps ttf-parser glyph outlines (y-up font units) into the pixmap's
/// y-down pixel space.
struct GlyphOutline {
    pb: PathBuilder,
    scale: f32,
    x: f32,
    baseline: f32,
}

impl GlyphOutline {
    fn map(&self, gx: f32, gy: f32) -> (f32, f32) {
        (self.x + gx * self.scale, self.baseline - gy * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let (px, py) = self.map(x, y);
        self.pb.move_to(px, py);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (px, py) = self.map(x, y);
        self.pb.line_to(px, py);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (cx, cy) = self.map(x1, y1);
        let (px, py) = self.map(x, y);
        self.pb.quad_to(cx, cy, px, py);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1x, c1y) = self.map(x1, y1);
        let (c2x, c2y) = self.map(x2, y2);
        let (px, py) = self.map(x, y);
        self.pb.cubic_to(c1x, c1y, c2x, c2y, px, py);
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_page(color: Color) -> LaidOutPage {
        LaidOutPage {
            width: 100.0,
            height: 50.0,
            elements: vec![LayoutElement {
                x: 10.0,
                y: 10.0,
                width: 20.0,
                height: 20.0,
                draw: DrawCommand::Rect {
                    background: Some(color),
                    border: None,
                    border_top: None,
                    border_bottom: None,
                },
                children: vec![],
            }],
        }
    }

    fn pixel(img: &RasterImage, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * img.width_px + x) * 3) as usize;
        [img.rgb[i], img.rgb[i + 1], img.rgb[i + 2]]
    }

    #[test]
    fn test_raster_dimensions_follow_oversample() {
        let fonts = FontContext::new();
        let page = rect_page(Color::BLACK);
        let img = SkiaRasterizer::with_oversample(2)
            .rasterize(&page, &fonts)
            .unwrap();
        assert_eq!(img.width_px, 200);
        assert_eq!(img.height_px, 100);
        assert_eq!(img.rgb.len(), 200 * 100 * 3);
    }

    #[test]
    fn test_background_white_and_rect_painted() {
        let fonts = FontContext::new();
        let page = rect_page(Color::rgb(1.0, 0.0, 0.0));
        let img = SkiaRasterizer::with_oversample(1)
            .rasterize(&page, &fonts)
            .unwrap();
        assert_eq!(pixel(&img, 0, 0), [255, 255, 255]);
        assert_eq!(pixel(&img, 15, 15), [255, 0, 0]);
    }

    #[test]
    fn test_greeked_text_marks_pixels() {
        let fonts = FontContext::new();
        let page = LaidOutPage {
            width: 100.0,
            height: 50.0,
            elements: vec![LayoutElement {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 20.0,
                draw: DrawCommand::Text {
                    lines: vec![TextLine {
                        text: "hello".to_string(),
                        x: 5.0,
                        y: 5.0,
                        width: 40.0,
                    }],
                    color: Color::BLACK,
                    font_size: 12.0,
                    bold: false,
                    letter_spacing: 0.0,
                    line_height: 1.4,
                },
                children: vec![],
            }],
        };
        let img = SkiaRasterizer::with_oversample(1)
            .rasterize(&page, &fonts)
            .unwrap();
        // Somewhere inside the greeked bar the pixels are darker than white.
        let p = pixel(&img, 10, 11);
        assert!(p[0] < 255);
    }
}
