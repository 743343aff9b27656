use std::collections::HashMap;

use crate::model::{Figure, Point, RectF, Shape, ShapeId, Size};
use serde::{Deserialize, Serialize};

pub const GRID_SIZE: f32 = 20.0;
/// Pick distance for arrows, in world units.
pub const HIT_TOLERANCE: f32 = 10.0;
pub const ZOOM_STEP: f32 = 1.2;
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;

pub const TEXT_FONT_SIZE: f32 = 16.0;
pub const TEXT_LINE_HEIGHT: f32 = 20.0;
pub const TEXT_PADDING: f32 = 6.0;

/// Pan and zoom applied when mapping world coordinates onto the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan: Point,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn to_world(&self, screen: Point) -> Point {
        to_world_coords(screen, self.pan, self.zoom)
    }

    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.zoom + self.pan.x,
            world.y * self.zoom + self.pan.y,
        )
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan = self.pan.offset(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    /// World-space rectangle visible through a canvas of `canvas` logical size.
    pub fn visible_world(&self, canvas: Size) -> RectF {
        RectF::from_corners(
            self.to_world(Point::ZERO),
            self.to_world(Point::new(canvas.width, canvas.height)),
        )
    }
}

/// `world = (screen - pan) / zoom`
pub fn to_world_coords(screen: Point, pan: Point, zoom: f32) -> Point {
    Point::new((screen.x - pan.x) / zoom, (screen.y - pan.y) / zoom)
}

pub fn snap(value: f32, grid_size: f32, enabled: bool) -> f32 {
    if !enabled || grid_size <= f32::EPSILON {
        return value;
    }
    (value / grid_size).round() * grid_size
}

pub fn snap_point(p: Point, enabled: bool) -> Point {
    Point::new(snap(p.x, GRID_SIZE, enabled), snap(p.y, GRID_SIZE, enabled))
}

pub fn distance_point_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len2 = abx * abx + aby * aby;
    let (cx, cy) = if len2 <= f32::EPSILON {
        (a.x, a.y)
    } else {
        let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0.0, 1.0);
        (a.x + abx * t, a.y + aby * t)
    };
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

/// Estimated extent of a text label when no surface is around to measure it.
pub fn estimated_text_width(label: &str) -> f32 {
    label.chars().count() as f32 * TEXT_FONT_SIZE * 0.6
}

/// Label widths as last measured by the surface that drew them, in world units.
/// Labels that were never drawn fall back to [`estimated_text_width`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextMetrics {
    widths: HashMap<String, f32>,
}

impl TextMetrics {
    pub fn width(&self, label: &str) -> f32 {
        self.widths
            .get(label)
            .copied()
            .unwrap_or_else(|| estimated_text_width(label))
    }

    pub fn insert(&mut self, label: impl Into<String>, width: f32) {
        self.widths.insert(label.into(), width);
    }

    pub fn clear(&mut self) {
        self.widths.clear();
    }
}

/// Plate drawn behind a text label of the given measured width.
pub fn text_plate(pos: Point, text_width: f32) -> RectF {
    RectF::from_origin_size(
        pos.offset(-TEXT_PADDING, -TEXT_PADDING),
        Size::new(
            text_width + TEXT_PADDING * 2.0,
            TEXT_LINE_HEIGHT + TEXT_PADDING * 2.0,
        ),
    )
}

/// Text plates take their width from `metrics`.
pub fn hit_test(shape: &Shape, world: Point, metrics: &TextMetrics) -> bool {
    match &shape.figure {
        Figure::Outline { rect, .. } => rect.contains(world),
        Figure::Arrow { start, end } => {
            distance_point_to_segment(world, *start, *end) < HIT_TOLERANCE
        }
        Figure::Text { pos, label } => {
            !label.is_empty() && text_plate(*pos, metrics.width(label)).contains(world)
        }
    }
}

/// Topmost shape under `world`, scanning in reverse z-order.
pub fn topmost_hit(shapes: &[Shape], world: Point) -> Option<ShapeId> {
    topmost_hit_measured(shapes, world, &TextMetrics::default())
}

pub fn topmost_hit_measured(
    shapes: &[Shape],
    world: Point,
    metrics: &TextMetrics,
) -> Option<ShapeId> {
    shapes
        .iter()
        .rev()
        .find(|s| hit_test(s, world, metrics))
        .map(|s| s.id)
}
