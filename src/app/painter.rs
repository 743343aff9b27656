use eframe::egui;

use crate::canvas::Viewport;
use crate::canvas::surface::{Font, Path, Stroke, Surface, dash_runs};
use crate::model::{Point, Rgba};

pub(super) fn to_color32(rgba: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(rgba.r, rgba.g, rgba.b, rgba.a)
}

/// Draws world-space paths onto an egui painter through the session viewport.
pub(super) struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    viewport: Viewport,
}

impl<'a> EguiSurface<'a> {
    pub(super) fn new(painter: &'a egui::Painter, origin: egui::Pos2, viewport: Viewport) -> Self {
        Self {
            painter,
            origin,
            viewport,
        }
    }

    fn screen(&self, world: Point) -> egui::Pos2 {
        let local = self.viewport.to_screen(world);
        self.origin + egui::vec2(local.x, local.y)
    }

    fn screen_points(&self, points: &[Point]) -> Vec<egui::Pos2> {
        points.iter().map(|p| self.screen(*p)).collect()
    }
}

impl Surface for EguiSurface<'_> {
    fn fill_path(&mut self, path: &Path, color: Rgba) {
        if !path.closed || path.points.len() < 3 {
            return;
        }
        self.painter.add(egui::Shape::convex_polygon(
            self.screen_points(&path.points),
            to_color32(color),
            egui::Stroke::NONE,
        ));
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke<'_>) {
        if !path.is_drawable() {
            return;
        }
        let line = egui::Stroke::new(stroke.width * self.viewport.zoom, to_color32(stroke.color));
        if stroke.dash.is_empty() {
            let pts = self.screen_points(&path.points);
            if path.closed {
                self.painter.add(egui::Shape::closed_line(pts, line));
            } else {
                self.painter.add(egui::Shape::line(pts, line));
            }
            return;
        }
        // egui has no dashed paths with custom patterns; split in world units.
        for run in dash_runs(&path.points, path.closed, stroke.dash) {
            self.painter
                .add(egui::Shape::line(self.screen_points(&run), line));
        }
    }

    fn draw_text(&mut self, pos: Point, text: &str, font: Font, color: Rgba) {
        let font_id = egui::FontId::proportional(font.size * self.viewport.zoom);
        let color = to_color32(color);
        let anchor = self.screen(pos);
        self.painter
            .text(anchor, egui::Align2::LEFT_TOP, text, font_id.clone(), color);
        if font.bold {
            self.painter.text(
                anchor + egui::vec2(0.6 * self.viewport.zoom, 0.0),
                egui::Align2::LEFT_TOP,
                text,
                font_id,
                color,
            );
        }
    }

    fn measure_text(&self, text: &str, font: Font) -> f32 {
        let galley = self.painter.layout_no_wrap(
            text.to_string(),
            egui::FontId::proportional(font.size),
            egui::Color32::PLACEHOLDER,
        );
        let extra = if font.bold { 0.6 } else { 0.0 };
        galley.size().x + extra
    }
}
