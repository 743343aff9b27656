use crate::model::{Figure, Outline, Point, RectF, Rgba, Shape, ShapeId, Size};

use super::geometry::{GRID_SIZE, TEXT_FONT_SIZE, TextMetrics, text_plate};
use super::surface::{Font, Path, Stroke, Surface};

pub const BACKGROUND: Rgba = Rgba::rgb(0xFA, 0xFA, 0xFA);
pub const GRID_LINE: Rgba = Rgba::rgb(0xE5, 0xE7, 0xEB);
pub const OUTLINE: Rgba = Rgba::rgb(0x1E, 0x29, 0x3B);
pub const HIGHLIGHT: Rgba = Rgba::rgb(0xDC, 0x26, 0x26);
pub const GLOW: Rgba = Rgba::rgba(0xDC, 0x26, 0x26, 77);
pub const TEXT_COLOR: Rgba = Rgba::rgb(0x0F, 0x17, 0x2A);
pub const TEXT_PLATE: Rgba = Rgba::rgba(255, 255, 255, 242);
pub const PREVIEW_ALPHA: u8 = 0x66;

const ARROW_HEAD: f32 = 12.0;
const GLOW_SPREAD: [f32; 2] = [8.0, 4.0];

const TEXT_FONT: Font = Font {
    size: TEXT_FONT_SIZE,
    bold: true,
};

/// One sub-drawing of a shape and which paint operations apply to it.
struct Piece {
    path: Path,
    fill: bool,
    stroke: bool,
}

impl Piece {
    fn filled(path: Path) -> Self {
        Self {
            path,
            fill: true,
            stroke: true,
        }
    }

    fn line(path: Path) -> Self {
        Self {
            path,
            fill: false,
            stroke: true,
        }
    }
}

fn outline_pieces(outline: Outline, rect: RectF) -> Vec<Piece> {
    let (x, y) = (rect.min.x, rect.min.y);
    let (w, h) = (rect.width(), rect.height());
    let cx = x + w / 2.0;
    let cy = y + h / 2.0;
    match outline {
        Outline::Rectangle => vec![Piece::filled(Path::rect(rect))],
        Outline::Ellipse => vec![Piece::filled(Path::ellipse(
            rect.center(),
            w / 2.0,
            h / 2.0,
        ))],
        Outline::Diamond => vec![Piece::filled(Path::polygon(vec![
            Point::new(cx, y),
            Point::new(x + w, cy),
            Point::new(cx, y + h),
            Point::new(x, cy),
        ]))],
        Outline::Hexagon => {
            let inset = w / 4.0;
            vec![Piece::filled(Path::polygon(vec![
                Point::new(x + inset, y),
                Point::new(x + w - inset, y),
                Point::new(x + w, cy),
                Point::new(x + w - inset, y + h),
                Point::new(x + inset, y + h),
                Point::new(x, cy),
            ]))]
        }
        Outline::Triangle => vec![Piece::filled(Path::polygon(vec![
            Point::new(cx, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]))],
        Outline::Database | Outline::Server => {
            let cap = h * 0.15;
            let body = RectF::from_origin_size(Point::new(x, y + cap / 2.0), Size::new(w, h - cap));
            let bottom_center = Point::new(cx, y + h - cap / 2.0);
            let bottom = if outline == Outline::Database {
                Piece::filled(Path::ellipse(bottom_center, w / 2.0, cap / 2.0))
            } else {
                Piece::line(Path::arc(
                    bottom_center,
                    w / 2.0,
                    cap / 2.0,
                    std::f32::consts::PI,
                    std::f32::consts::TAU,
                ))
            };
            vec![
                Piece::filled(Path::ellipse(Point::new(cx, y + cap / 2.0), w / 2.0, cap / 2.0)),
                Piece::filled(Path::rect(body)),
                bottom,
            ]
        }
        Outline::Cloud => {
            let r = w / 6.0;
            vec![
                Piece::filled(Path::circle(Point::new(x + r * 2.0, cy), r * 1.2)),
                Piece::filled(Path::circle(Point::new(cx, y + r), r * 1.5)),
                Piece::filled(Path::circle(Point::new(x + w - r * 2.0, cy), r * 1.2)),
                Piece::filled(Path::circle(Point::new(cx, y + h - r), r)),
            ]
        }
        Outline::Actor => {
            let head = h / 5.0;
            let hip = Point::new(cx, y + h * 0.6);
            vec![
                Piece::filled(Path::circle(Point::new(cx, y + head), head)),
                Piece::line(Path::segment(Point::new(cx, y + head * 2.0), hip)),
                Piece::line(Path::segment(
                    Point::new(x + w * 0.1, y + h * 0.4),
                    Point::new(x + w * 0.9, y + h * 0.4),
                )),
                Piece::line(Path::polyline(vec![
                    Point::new(x + w * 0.2, y + h),
                    hip,
                    Point::new(x + w * 0.8, y + h),
                ])),
            ]
        }
    }
}

/// Filled head at `end`, pointing along `start -> end`.
pub fn arrow_head(start: Point, end: Point) -> Path {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let wing = std::f32::consts::PI / 6.0;
    Path::polygon(vec![
        end,
        Point::new(
            end.x - ARROW_HEAD * (angle - wing).cos(),
            end.y - ARROW_HEAD * (angle - wing).sin(),
        ),
        Point::new(
            end.x - ARROW_HEAD * (angle + wing).cos(),
            end.y - ARROW_HEAD * (angle + wing).sin(),
        ),
    ])
}

fn draw_glow(surface: &mut dyn Surface, pieces: &[Piece], width: f32) {
    for spread in GLOW_SPREAD {
        let glow = Stroke::solid(GLOW, width + spread);
        for piece in pieces.iter().filter(|p| p.stroke && p.path.is_drawable()) {
            surface.stroke_path(&piece.path, &glow);
        }
    }
}

struct Paint {
    fill: Rgba,
    outline: Rgba,
}

fn paint_pieces(
    surface: &mut dyn Surface,
    pieces: &[Piece],
    paint: &Paint,
    width: f32,
    dash: &[f32],
) {
    let stroke = Stroke {
        color: paint.outline,
        width,
        dash,
    };
    for piece in pieces.iter().filter(|p| p.path.is_drawable()) {
        if piece.fill && piece.path.closed {
            surface.fill_path(&piece.path, paint.fill);
        }
        if piece.stroke {
            surface.stroke_path(&piece.path, &stroke);
        }
    }
}

fn draw_text_label(surface: &mut dyn Surface, pos: Point, label: &str, highlight: bool) {
    if label.is_empty() {
        return;
    }
    let width = surface.measure_text(label, TEXT_FONT);
    let plate = Path::rect(text_plate(pos, width));
    if highlight {
        surface.stroke_path(&plate, &Stroke::solid(GLOW, 6.0));
    }
    surface.fill_path(&plate, TEXT_PLATE);
    if highlight {
        surface.stroke_path(&plate, &Stroke::solid(HIGHLIGHT, 1.0));
    }
    surface.draw_text(pos, label, TEXT_FONT, TEXT_COLOR);
}

fn draw_figure(surface: &mut dyn Surface, shape: &Shape, paint: &Paint, glow: bool) {
    let width = shape.style.stroke_width.max(1) as f32;
    let dash = shape.style.dash.as_deref().unwrap_or(&[]);
    match &shape.figure {
        Figure::Outline { outline, rect } => {
            if !rect.is_valid() {
                return;
            }
            let pieces = outline_pieces(*outline, *rect);
            if glow {
                draw_glow(surface, &pieces, width);
            }
            paint_pieces(surface, &pieces, paint, width, dash);
        }
        Figure::Arrow { start, end } => {
            if start == end {
                return;
            }
            let shaft = Path::segment(*start, *end);
            let head = arrow_head(*start, *end);
            if glow {
                for spread in GLOW_SPREAD {
                    surface.stroke_path(&shaft, &Stroke::solid(GLOW, width + spread));
                }
            }
            let stroke = Stroke {
                color: paint.outline,
                width,
                dash,
            };
            surface.stroke_path(&shaft, &stroke);
            surface.fill_path(&head, paint.outline);
        }
        Figure::Text { pos, label } => draw_text_label(surface, *pos, label, glow),
    }
}

/// Draws one committed shape. Pure with respect to everything but the surface.
pub fn render(surface: &mut dyn Surface, shape: &Shape, is_selected: bool) {
    let outline = match (&shape.figure, is_selected) {
        (_, true) => HIGHLIGHT,
        (Figure::Arrow { .. }, false) => shape.style.color,
        _ => OUTLINE,
    };
    let paint = Paint {
        fill: shape.style.color,
        outline,
    };
    draw_figure(surface, shape, &paint, is_selected);
}

/// Draws an uncommitted candidate shape on top of the scene.
pub fn render_preview(surface: &mut dyn Surface, shape: &Shape) {
    let paint = Paint {
        fill: shape.style.color.with_alpha(PREVIEW_ALPHA),
        outline: match shape.figure {
            Figure::Arrow { .. } => shape.style.color,
            _ => OUTLINE,
        },
    };
    draw_figure(surface, shape, &paint, false);
}

/// Every shape in z-order, the selected one highlighted.
pub fn render_shapes(
    surface: &mut dyn Surface,
    shapes: &[Shape],
    selected: Option<ShapeId>,
) {
    for shape in shapes {
        render(surface, shape, selected == Some(shape.id));
    }
}

/// Refills `metrics` with the plate widths `surface` gives the current labels.
pub fn measure_labels(surface: &dyn Surface, shapes: &[Shape], metrics: &mut TextMetrics) {
    metrics.clear();
    for shape in shapes {
        if let Figure::Text { label, .. } = &shape.figure {
            if !label.is_empty() {
                metrics.insert(label.as_str(), surface.measure_text(label, TEXT_FONT));
            }
        }
    }
}

pub fn draw_background(surface: &mut dyn Surface, visible: RectF, show_grid: bool) {
    surface.fill_path(&Path::rect(visible), BACKGROUND);
    if !show_grid {
        return;
    }
    let line = Stroke::solid(GRID_LINE, 0.5);
    let start_x = (visible.min.x / GRID_SIZE).floor() * GRID_SIZE;
    let start_y = (visible.min.y / GRID_SIZE).floor() * GRID_SIZE;
    let end_x = visible.max.x + GRID_SIZE;
    let end_y = visible.max.y + GRID_SIZE;
    let mut x = start_x;
    while x < end_x {
        surface.stroke_path(
            &Path::segment(Point::new(x, start_y), Point::new(x, end_y)),
            &line,
        );
        x += GRID_SIZE;
    }
    let mut y = start_y;
    while y < end_y {
        surface.stroke_path(
            &Path::segment(Point::new(start_x, y), Point::new(end_x, y)),
            &line,
        );
        y += GRID_SIZE;
    }
}
