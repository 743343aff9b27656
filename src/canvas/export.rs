//! Rasterizes a scene to PNG for the download and send paths.
//!
//! The scene is first written out as SVG through [`SvgSurface`] using the same
//! renderer the live canvas uses, then rasterized with resvg.

use std::fmt::Write as _;
use std::io::Cursor;
use std::path::{Path as FsPath, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use tracing::{debug, info};

use crate::error::ExportError;
use crate::model::{Figure, Point, Rgba, Shape, Size};

use super::geometry::Viewport;
use super::render::{draw_background, render_shapes};
use super::surface::{Font, Path, Stroke, Surface};

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// What part of the scene ends up in the exported image and at which density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportFrame {
    pub viewport: Viewport,
    /// Logical size of the canvas region.
    pub canvas: Size,
    pub pixels_per_point: f32,
    pub show_grid: bool,
}

impl ExportFrame {
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = self.pixels_per_point.max(0.0);
        let w = (self.canvas.width * scale).ceil();
        let h = (self.canvas.height * scale).ceil();
        if !w.is_finite() || !h.is_finite() || w < 1.0 || h < 1.0 {
            return (0, 0);
        }
        (w.min(u32::MAX as f32) as u32, h.min(u32::MAX as f32) as u32)
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn rgba_to_svg_rgb(rgba: Rgba) -> (String, f32) {
    let opacity = (rgba.a as f32) / 255.0;
    (format!("rgb({},{},{})", rgba.r, rgba.g, rgba.b), opacity)
}

fn points_attr(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:.3},{:.3}", p.x, p.y);
    }
    out
}

/// [`Surface`] that accumulates SVG elements in world coordinates.
#[derive(Default)]
pub struct SvgSurface {
    body: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the collected elements in a document of `frame.canvas` size with
    /// the viewport transform applied.
    pub fn finish(self, frame: &ExportFrame) -> String {
        let Size { width, height } = frame.canvas;
        let view = frame.viewport;
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        out.push('\n');
        out.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {:.3} {:.3}" width="{:.3}" height="{:.3}">"#,
            width, height, width, height
        ));
        out.push('\n');
        out.push_str(&format!(
            r#"<g transform="translate({:.3} {:.3}) scale({:.5})">"#,
            view.pan.x, view.pan.y, view.zoom
        ));
        out.push('\n');
        out.push_str(&self.body);
        out.push_str("</g>\n</svg>\n");
        out
    }
}

impl Surface for SvgSurface {
    fn fill_path(&mut self, path: &Path, color: Rgba) {
        if !path.is_drawable() {
            return;
        }
        let (rgb, opacity) = rgba_to_svg_rgb(color);
        self.body.push_str(&format!(
            r#"<polygon points="{}" fill="{}" fill-opacity="{:.3}" stroke="none" />"#,
            points_attr(&path.points),
            rgb,
            opacity
        ));
        self.body.push('\n');
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke<'_>) {
        if !path.is_drawable() {
            return;
        }
        let (rgb, opacity) = rgba_to_svg_rgb(stroke.color);
        let tag = if path.closed { "polygon" } else { "polyline" };
        let mut attrs = format!(
            r#"stroke="{}" stroke-opacity="{:.3}" stroke-width="{:.3}" fill="none""#,
            rgb, opacity, stroke.width
        );
        if !stroke.dash.is_empty() {
            let dash: Vec<String> = stroke.dash.iter().map(|d| format!("{d:.3}")).collect();
            let _ = write!(attrs, r#" stroke-dasharray="{}""#, dash.join(" "));
        }
        self.body.push_str(&format!(
            r#"<{} points="{}" {} />"#,
            tag,
            points_attr(&path.points),
            attrs
        ));
        self.body.push('\n');
    }

    fn draw_text(&mut self, pos: Point, text: &str, font: Font, color: Rgba) {
        let (rgb, opacity) = rgba_to_svg_rgb(color);
        let weight = if font.bold { "bold" } else { "normal" };
        // SVG anchors text at the baseline; shift down by the ascent.
        let baseline = pos.y + font.size * 0.8;
        self.body.push_str(&format!(
            r#"<text x="{:.3}" y="{:.3}" font-family="sans-serif" font-size="{:.3}" font-weight="{}" fill="{}" fill-opacity="{:.3}">{}</text>"#,
            pos.x,
            baseline,
            font.size,
            weight,
            rgb,
            opacity,
            escape_xml(text)
        ));
        self.body.push('\n');
    }

    fn measure_text(&self, text: &str, font: Font) -> f32 {
        text.chars().count() as f32 * font.size * 0.6
    }
}

/// SVG for the visible part of the scene, without any selection highlight.
pub fn scene_to_svg(shapes: &[Shape], frame: &ExportFrame) -> String {
    let mut surface = SvgSurface::new();
    draw_background(
        &mut surface,
        frame.viewport.visible_world(frame.canvas),
        frame.show_grid,
    );
    render_shapes(&mut surface, shapes, None);
    surface.finish(frame)
}

/// PNG bytes of the scene at `frame.pixels_per_point` density.
pub fn export_png(shapes: &[Shape], frame: &ExportFrame) -> Result<Vec<u8>, ExportError> {
    if shapes.is_empty() {
        return Err(ExportError::EmptyScene);
    }
    let (width, height) = frame.pixel_size();
    if width == 0 || height == 0 {
        return Err(ExportError::ZeroSizedSurface { width, height });
    }

    let svg = scene_to_svg(shapes, frame);
    let mut opt = usvg::Options::default();
    opt.font_family = "sans-serif".to_string();
    if shapes
        .iter()
        .any(|s| matches!(s.figure, Figure::Text { .. }))
    {
        opt.fontdb_mut().load_system_fonts();
    }
    let tree = usvg::Tree::from_str(&svg, &opt)?;

    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Pixmap { width, height })?;
    let scale = frame.pixels_per_point;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    let mut rgba = Vec::with_capacity(pixmap.pixels().len() * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let image = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or(ExportError::Pixmap { width, height })?;
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    debug!(width, height, bytes = png.len(), "encoded PNG");
    Ok(png)
}

pub fn png_data_uri(png: &[u8]) -> String {
    let mut uri = String::from(DATA_URI_PREFIX);
    base64::engine::general_purpose::STANDARD.encode_string(png, &mut uri);
    uri
}

/// `diagram-<unix millis>.png`
pub fn export_file_name(at: SystemTime) -> String {
    let millis = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("diagram-{millis}.png")
}

/// Writes `png` to `path`, creating parent directories as needed.
pub fn write_png(path: &FsPath, png: &[u8]) -> Result<PathBuf, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, png)?;
    info!(path = %path.display(), bytes = png.len(), "wrote diagram PNG");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Outline, RectF, ShapeId, Style};
    use std::time::Duration;

    fn frame(width: f32, height: f32, ppp: f32) -> ExportFrame {
        ExportFrame {
            viewport: Viewport::default(),
            canvas: Size::new(width, height),
            pixels_per_point: ppp,
            show_grid: true,
        }
    }

    fn rect_shape() -> Shape {
        let mut s = Shape::new(
            Figure::Outline {
                outline: Outline::Rectangle,
                rect: RectF::from_origin_size(Point::new(50.0, 50.0), Size::new(100.0, 80.0)),
            },
            Style::default(),
        );
        s.id = ShapeId(1);
        s
    }

    #[test]
    fn empty_scene_is_rejected() {
        let err = export_png(&[], &frame(200.0, 200.0, 1.0)).unwrap_err();
        assert!(matches!(err, ExportError::EmptyScene));
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        let err = export_png(&[rect_shape()], &frame(0.0, 200.0, 1.0)).unwrap_err();
        assert!(matches!(err, ExportError::ZeroSizedSurface { .. }));
    }

    #[test]
    fn svg_escapes_labels_and_applies_viewport() {
        let text = Shape::new(
            Figure::Text {
                pos: Point::new(10.0, 10.0),
                label: "a<b & c".to_string(),
            },
            Style::default(),
        );
        let mut f = frame(100.0, 100.0, 1.0);
        f.viewport.zoom = 2.0;
        let svg = scene_to_svg(&[text], &f);
        assert!(svg.contains("a&lt;b &amp; c"));
        assert!(svg.contains("scale(2.00000)"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn dashed_strokes_carry_dasharray() {
        let mut shape = rect_shape();
        shape.style.dash = Some(vec![10.0, 5.0]);
        let svg = scene_to_svg(&[shape], &frame(200.0, 200.0, 1.0));
        assert!(svg.contains(r#"stroke-dasharray="10.000 5.000""#));
    }

    #[test]
    fn png_matches_canvas_and_density() {
        let png = export_png(&[rect_shape()], &frame(200.0, 160.0, 2.0)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (400, 320));
        let inside = decoded.get_pixel(200, 180);
        assert_eq!(inside.0, [0x25, 0x63, 0xEB, 255]);
        let outside = decoded.get_pixel(10, 10);
        assert_eq!(outside.0, [0xFA, 0xFA, 0xFA, 255]);
    }

    #[test]
    fn data_uri_has_png_prefix() {
        let uri = png_data_uri(&[0x89, b'P', b'N', b'G']);
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn file_name_uses_unix_millis() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(export_file_name(at), "diagram-1700000000123.png");
    }

    #[test]
    fn write_png_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports").join("diagram-1.png");
        let written = write_png(&target, b"png").unwrap();
        assert_eq!(written, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"png");
    }
}
