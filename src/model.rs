use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest width/height a bounded shape may be committed with.
pub const MIN_SHAPE_SIZE: f32 = 10.0;
/// Smallest horizontal or vertical extent of a committed arrow.
pub const MIN_ARROW_EXTENT: f32 = 5.0;
/// On/off lengths used when a shape is drawn with the dashed line style.
pub const DASHED_PATTERN: [f32; 2] = [10.0, 5.0];
pub const DEFAULT_STROKE_WIDTH: u32 = 2;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RectF {
    pub min: Point,
    pub max: Point,
}

impl RectF {
    /// Normalized rectangle spanned by two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::from_corners(
            origin,
            Point::new(origin.x + size.width, origin.y + size.height),
        )
    }

    pub fn origin(self) -> Point {
        self.min
    }

    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn is_valid(self) -> bool {
        self.max.x > self.min.x && self.max.y > self.min.y
    }

    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            min: self.min.offset(dx, dy),
            max: self.max.offset(dx, dy),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

impl LineStyle {
    pub fn dash_pattern(self) -> Option<Vec<f32>> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some(DASHED_PATTERN.to_vec()),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LineStyle::Solid => LineStyle::Dashed,
            LineStyle::Dashed => LineStyle::Solid,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Style {
    pub color: Rgba,
    pub stroke_width: u32,
    #[serde(default)]
    pub dash: Option<Vec<f32>>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Rgba::rgb(0x25, 0x63, 0xEB),
            stroke_width: DEFAULT_STROKE_WIDTH,
            dash: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outline variants that occupy an axis-aligned box.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Outline {
    Rectangle,
    Ellipse,
    Diamond,
    Hexagon,
    Triangle,
    Database,
    Cloud,
    Server,
    Actor,
}

impl Outline {
    pub const ALL: [Outline; 9] = [
        Outline::Rectangle,
        Outline::Ellipse,
        Outline::Diamond,
        Outline::Hexagon,
        Outline::Triangle,
        Outline::Database,
        Outline::Cloud,
        Outline::Server,
        Outline::Actor,
    ];
}

/// Flat tag over every shape variant.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Outline(Outline),
    Arrow,
    Text,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Figure {
    Outline { outline: Outline, rect: RectF },
    Arrow { start: Point, end: Point },
    Text { pos: Point, label: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub figure: Figure,
    pub style: Style,
    #[serde(default)]
    pub locked: bool,
}

impl Shape {
    pub fn new(figure: Figure, style: Style) -> Self {
        Self {
            id: ShapeId::default(),
            figure,
            style,
            locked: false,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match &self.figure {
            Figure::Outline { outline, .. } => ShapeKind::Outline(*outline),
            Figure::Arrow { .. } => ShapeKind::Arrow,
            Figure::Text { .. } => ShapeKind::Text,
        }
    }

    /// Top-left anchor for bounded shapes and text, start point for arrows.
    pub fn origin(&self) -> Point {
        match &self.figure {
            Figure::Outline { rect, .. } => rect.origin(),
            Figure::Arrow { start, .. } => *start,
            Figure::Text { pos, .. } => *pos,
        }
    }

    /// Box size; zero for arrows and text.
    pub fn size(&self) -> Size {
        match &self.figure {
            Figure::Outline { rect, .. } => rect.size(),
            Figure::Arrow { .. } | Figure::Text { .. } => Size::ZERO,
        }
    }

    pub fn endpoint(&self) -> Option<Point> {
        match &self.figure {
            Figure::Arrow { end, .. } => Some(*end),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.figure {
            Figure::Text { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Whether the shape clears the minimum-size thresholds and may enter a scene.
    pub fn is_committable(&self) -> bool {
        match &self.figure {
            Figure::Outline { rect, .. } => {
                rect.width() >= MIN_SHAPE_SIZE && rect.height() >= MIN_SHAPE_SIZE
            }
            Figure::Arrow { start, end } => {
                (end.x - start.x).abs() >= MIN_ARROW_EXTENT
                    || (end.y - start.y).abs() >= MIN_ARROW_EXTENT
            }
            Figure::Text { label, .. } => !label.trim().is_empty(),
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        match &mut self.figure {
            Figure::Outline { rect, .. } => *rect = rect.translate(dx, dy),
            Figure::Arrow { start, end } => {
                *start = start.offset(dx, dy);
                *end = end.offset(dx, dy);
            }
            Figure::Text { pos, .. } => *pos = pos.offset(dx, dy),
        }
    }
}
