//! The drawing capability shapes are rendered onto.
//!
//! Everything is expressed in world coordinates; a surface owns whatever
//! transform maps those onto its pixels (pan, zoom, device pixel ratio).

use crate::model::{Point, RectF, Rgba};

const ELLIPSE_STEPS: usize = 48;

/// One polyline or polygon. Curves are flattened before they get here.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Path {
    pub fn polygon(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn polyline(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn segment(a: Point, b: Point) -> Self {
        Self::polyline(vec![a, b])
    }

    pub fn rect(rect: RectF) -> Self {
        Self::polygon(vec![
            rect.min,
            Point::new(rect.max.x, rect.min.y),
            rect.max,
            Point::new(rect.min.x, rect.max.y),
        ])
    }

    pub fn ellipse(center: Point, rx: f32, ry: f32) -> Self {
        let mut path = Self::arc(center, rx, ry, 0.0, std::f32::consts::TAU);
        path.points.pop();
        path.closed = true;
        path
    }

    pub fn circle(center: Point, r: f32) -> Self {
        Self::ellipse(center, r, r)
    }

    /// Open elliptical arc from `start` to `end` radians, y pointing down.
    pub fn arc(center: Point, rx: f32, ry: f32, start: f32, end: f32) -> Self {
        let sweep = end - start;
        let steps = ((ELLIPSE_STEPS as f32) * (sweep.abs() / std::f32::consts::TAU))
            .ceil()
            .max(1.0) as usize;
        let points = (0..=steps)
            .map(|i| {
                let t = start + sweep * (i as f32) / (steps as f32);
                Point::new(center.x + t.cos() * rx, center.y + t.sin() * ry)
            })
            .collect();
        Self::polyline(points)
    }

    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke<'a> {
    pub color: Rgba,
    pub width: f32,
    /// Alternating on/off lengths; empty means solid.
    pub dash: &'a [f32],
}

impl Stroke<'_> {
    pub fn solid(color: Rgba, width: f32) -> Stroke<'static> {
        Stroke {
            color,
            width,
            dash: &[],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    pub size: f32,
    pub bold: bool,
}

pub trait Surface {
    fn fill_path(&mut self, path: &Path, color: Rgba);

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke<'_>);

    /// Draws `text` with its top-left corner at `pos`.
    fn draw_text(&mut self, pos: Point, text: &str, font: Font, color: Rgba);

    fn measure_text(&self, text: &str, font: Font) -> f32;
}

/// Splits a polyline into its dashed "on" runs.
pub fn dash_runs(points: &[Point], closed: bool, pattern: &[f32]) -> Vec<Vec<Point>> {
    let mut pts = points.to_vec();
    if closed {
        if let Some(first) = points.first() {
            pts.push(*first);
        }
    }
    if pattern.is_empty() || pattern.iter().all(|d| *d <= f32::EPSILON) {
        return vec![pts];
    }
    let mut runs = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut idx = 0;
    let mut left = pattern[0];
    let mut on = true;
    for pair in pts.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
        if len <= f32::EPSILON {
            continue;
        }
        let mut pos = 0.0;
        while pos < len {
            let step = left.min(len - pos);
            let from = lerp(a, b, pos / len);
            let to = lerp(a, b, (pos + step) / len);
            if on {
                if current.is_empty() {
                    current.push(from);
                }
                current.push(to);
            }
            pos += step;
            left -= step;
            if left <= f32::EPSILON {
                if on && current.len() >= 2 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
                on = !on;
                idx = (idx + 1) % pattern.len();
                left = pattern[idx];
            }
        }
    }
    if on && current.len() >= 2 {
        runs.push(current);
    }
    runs
}

fn lerp(a: Point, b: Point, t: f32) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}
