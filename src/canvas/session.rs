//! Per-overlay editing session: tool state machine, style state and modal prompts.

use std::path::{Path as FsPath, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::error::ExportError;
use crate::model::{Figure, LineStyle, Outline, Point, RectF, Rgba, Shape, Size, Style};
use crate::settings::{EditorSettings, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};

use super::export::{ExportFrame, export_file_name, export_png, png_data_uri, write_png};
use super::geometry::{Viewport, snap_point};
use super::scene::{Clipboard, Scene};
use super::surface::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tool {
    Select,
    Shape(Outline),
    Line,
    Text,
}

impl Tool {
    pub const ALL: [Tool; 12] = [
        Tool::Select,
        Tool::Shape(Outline::Rectangle),
        Tool::Shape(Outline::Ellipse),
        Tool::Shape(Outline::Diamond),
        Tool::Shape(Outline::Hexagon),
        Tool::Shape(Outline::Triangle),
        Tool::Shape(Outline::Database),
        Tool::Shape(Outline::Cloud),
        Tool::Shape(Outline::Server),
        Tool::Shape(Outline::Actor),
        Tool::Line,
        Tool::Text,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Shape(Outline::Rectangle) => "Rectangle",
            Tool::Shape(Outline::Ellipse) => "Ellipse",
            Tool::Shape(Outline::Diamond) => "Diamond",
            Tool::Shape(Outline::Hexagon) => "Hexagon",
            Tool::Shape(Outline::Triangle) => "Triangle",
            Tool::Shape(Outline::Database) => "Database",
            Tool::Shape(Outline::Cloud) => "Cloud",
            Tool::Shape(Outline::Server) => "Server",
            Tool::Shape(Outline::Actor) => "Actor",
            Tool::Line => "Arrow",
            Tool::Text => "Text",
        }
    }

    fn draws(self) -> bool {
        matches!(self, Tool::Shape(_) | Tool::Line)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub command: bool,
    pub shift: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Copy,
    Paste,
    Delete,
    Deselect,
    SelectTopmost,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Drawing { start: Point, current: Point },
    Panning { last: Point },
}

/// A question the host must put to the user before editing continues.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingPrompt {
    /// Label for a text shape anchored at `at` (world coordinates).
    TextLabel { at: Point },
    ConfirmClear,
    Alert { message: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum PromptAnswer {
    Text(String),
    Confirm(bool),
    Dismiss,
}

pub struct EditorSession {
    target: String,
    scene: Scene,
    clipboard: Clipboard,
    tool: Tool,
    color: Rgba,
    stroke_width: u32,
    line_style: LineStyle,
    snap_to_grid: bool,
    show_grid: bool,
    gesture: Gesture,
    prompt: Option<PendingPrompt>,
    canvas_size: Size,
    pixels_per_point: f32,
}

impl EditorSession {
    /// Fresh, empty session addressed to `target` (the conversation label).
    pub fn open(target: impl Into<String>, settings: &EditorSettings) -> Self {
        let target = target.into();
        debug!(conversation = %target, "opening editor session");
        Self {
            target,
            scene: Scene::default(),
            clipboard: Clipboard::default(),
            tool: Tool::Select,
            color: settings.color(),
            stroke_width: settings.stroke_width(),
            line_style: settings.line_style,
            snap_to_grid: settings.snap_to_grid,
            show_grid: settings.show_grid,
            gesture: Gesture::Idle,
            prompt: None,
            canvas_size: Size::ZERO,
            pixels_per_point: 1.0,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.scene.viewport
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.prompt.is_some() {
            return;
        }
        if self.tool != tool {
            debug!(tool = tool.label(), "tool changed");
        }
        self.tool = tool;
        if matches!(self.gesture, Gesture::Drawing { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    pub fn stroke_width(&self) -> u32 {
        self.stroke_width
    }

    pub fn set_stroke_width(&mut self, width: u32) {
        self.stroke_width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
    }

    pub fn line_style(&self) -> LineStyle {
        self.line_style
    }

    pub fn toggle_line_style(&mut self) {
        self.line_style = self.line_style.toggled();
    }

    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.snap_to_grid = enabled;
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn set_show_grid(&mut self, visible: bool) {
        self.show_grid = visible;
    }

    /// Writes the current style toggles back into `settings`.
    pub fn store_style(&self, settings: &mut EditorSettings) {
        settings.default_color = self.color.to_hex();
        settings.stroke_width = self.stroke_width;
        settings.line_style = self.line_style;
        settings.snap_to_grid = self.snap_to_grid;
        settings.show_grid = self.show_grid;
    }

    pub fn current_style(&self) -> Style {
        Style {
            color: self.color,
            stroke_width: self.stroke_width,
            dash: self.line_style.dash_pattern(),
        }
    }

    pub fn prompt(&self) -> Option<&PendingPrompt> {
        self.prompt.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.gesture, Gesture::Drawing { .. })
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    /// Logical canvas size and device pixel ratio, refreshed by the host every frame.
    pub fn set_canvas(&mut self, size: Size, pixels_per_point: f32) {
        self.canvas_size = size;
        self.pixels_per_point = pixels_per_point;
    }

    /// Lets picking use the label widths of the surface the scene is shown on.
    pub fn measure_labels(&mut self, surface: &dyn Surface) {
        self.scene.measure_labels(surface);
    }

    pub fn zoom_in(&mut self) {
        if self.prompt.is_none() {
            self.scene.viewport.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if self.prompt.is_none() {
            self.scene.viewport.zoom_out();
        }
    }

    pub fn reset_zoom(&mut self) {
        if self.prompt.is_none() {
            self.scene.viewport.reset_zoom();
        }
    }

    fn candidate(&self, start: Point, end: Point) -> Option<Shape> {
        let figure = match self.tool {
            Tool::Shape(outline) => Figure::Outline {
                outline,
                rect: RectF::from_corners(start, end),
            },
            Tool::Line => Figure::Arrow { start, end },
            Tool::Select | Tool::Text => return None,
        };
        Some(Shape::new(figure, self.current_style()))
    }

    /// Uncommitted shape under construction, if a drawing drag is in progress.
    pub fn preview(&self) -> Option<Shape> {
        match self.gesture {
            Gesture::Drawing { start, current } => self.candidate(start, current),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, mods: Modifiers) {
        if self.prompt.is_some() {
            return;
        }
        let pan = button == PointerButton::Middle || (button == PointerButton::Primary && mods.alt);
        if pan {
            self.gesture = Gesture::Panning { last: screen };
            return;
        }
        if button != PointerButton::Primary {
            return;
        }
        let world = self.scene.viewport.to_world(screen);
        match self.tool {
            Tool::Select => {
                let hit = self.scene.select_at(world);
                debug!(?hit, "select");
            }
            Tool::Text => {
                self.prompt = Some(PendingPrompt::TextLabel {
                    at: snap_point(world, self.snap_to_grid),
                });
            }
            Tool::Shape(_) | Tool::Line => {
                let start = snap_point(world, self.snap_to_grid);
                self.gesture = Gesture::Drawing {
                    start,
                    current: start,
                };
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        match &mut self.gesture {
            Gesture::Panning { last } => {
                let (dx, dy) = (screen.x - last.x, screen.y - last.y);
                *last = screen;
                self.scene.viewport.pan_by(dx, dy);
            }
            Gesture::Drawing { current, .. } => {
                let world = self.scene.viewport.to_world(screen);
                *current = snap_point(world, self.snap_to_grid);
            }
            Gesture::Idle => {}
        }
    }

    pub fn pointer_up(&mut self, screen: Point) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Drawing { start, .. } if self.tool.draws() => {
                let world = self.scene.viewport.to_world(screen);
                let end = snap_point(world, self.snap_to_grid);
                if let Some(shape) = self.candidate(start, end) {
                    self.scene.commit(shape);
                }
            }
            _ => {}
        }
    }

    /// Applies a keyboard shortcut. Returns `false` when a prompt swallowed it.
    pub fn handle_shortcut(&mut self, shortcut: Shortcut) -> bool {
        if self.prompt.is_some() {
            return false;
        }
        match shortcut {
            Shortcut::Undo => self.scene.undo(),
            Shortcut::Redo => self.scene.redo(),
            Shortcut::Copy => self.copy_selected(),
            Shortcut::Paste => {
                self.scene.paste(&self.clipboard);
            }
            Shortcut::Delete => self.delete_selected(),
            Shortcut::Deselect => self.scene.select(None),
            Shortcut::SelectTopmost => self.scene.select_topmost(),
        }
        true
    }

    pub fn undo(&mut self) {
        self.handle_shortcut(Shortcut::Undo);
    }

    pub fn redo(&mut self) {
        self.handle_shortcut(Shortcut::Redo);
    }

    pub fn copy_selected(&mut self) {
        if self.prompt.is_some() {
            return;
        }
        if let Some(id) = self.scene.selected() {
            self.clipboard.copy(&self.scene, id);
            debug!(%id, "copied shape");
        }
    }

    pub fn can_paste(&self) -> bool {
        !self.clipboard.is_empty()
    }

    pub fn delete_selected(&mut self) {
        if self.prompt.is_some() {
            return;
        }
        if let Some(id) = self.scene.selected() {
            self.scene.remove(id);
        }
    }

    pub fn toggle_lock_selected(&mut self) {
        if self.prompt.is_some() {
            return;
        }
        if let Some(id) = self.scene.selected() {
            self.scene.toggle_lock(id);
        }
    }

    /// Asks for confirmation before the scene is wiped.
    pub fn request_clear(&mut self) {
        if self.prompt.is_none() {
            self.prompt = Some(PendingPrompt::ConfirmClear);
        }
    }

    pub fn resolve_prompt(&mut self, answer: PromptAnswer) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        match (prompt, answer) {
            (PendingPrompt::TextLabel { at }, PromptAnswer::Text(label)) => {
                let shape = Shape::new(Figure::Text { pos: at, label }, self.current_style());
                self.scene.commit(shape);
            }
            (PendingPrompt::ConfirmClear, PromptAnswer::Confirm(true)) => self.scene.clear(),
            (prompt, answer) => debug!(?prompt, ?answer, "prompt dismissed"),
        }
    }

    pub fn can_export(&self) -> bool {
        !self.scene.is_empty()
    }

    pub fn export_frame(&self) -> ExportFrame {
        ExportFrame {
            viewport: self.scene.viewport,
            canvas: self.canvas_size,
            pixels_per_point: self.pixels_per_point,
            show_grid: self.show_grid,
        }
    }

    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        export_png(self.scene.shapes(), &self.export_frame())
    }

    fn alert(&mut self, action: &str, err: &ExportError) {
        warn!(action, error = %err, "export failed");
        self.prompt = Some(PendingPrompt::Alert {
            message: format!("{action} failed: {err}"),
        });
    }

    /// PNG data URI for the composer, or `None` after raising an alert.
    pub fn send(&mut self) -> Option<String> {
        if self.prompt.is_some() {
            return None;
        }
        match self.export_png() {
            Ok(png) => {
                info!(conversation = %self.target, bytes = png.len(), "sending diagram");
                Some(png_data_uri(&png))
            }
            Err(err) => {
                self.alert("Send", &err);
                None
            }
        }
    }

    pub fn default_download_name(&self) -> String {
        export_file_name(SystemTime::now())
    }

    /// Writes the PNG to `path`; failures raise an alert instead.
    pub fn download_to(&mut self, path: &FsPath) -> Option<PathBuf> {
        if self.prompt.is_some() {
            return None;
        }
        match self.export_png().and_then(|png| write_png(path, &png)) {
            Ok(path) => Some(path),
            Err(err) => {
                self.alert("Download", &err);
                None
            }
        }
    }

    pub fn status_line(&self) -> String {
        format!(
            "{} objects · {:.0}%",
            self.scene.len(),
            self.scene.viewport.zoom * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;

    const NO_MODS: Modifiers = Modifiers {
        alt: false,
        command: false,
        shift: false,
    };

    fn session() -> EditorSession {
        let mut s = EditorSession::open("alice", &EditorSettings::default());
        s.set_canvas(Size::new(400.0, 300.0), 1.0);
        s
    }

    fn drag(s: &mut EditorSession, from: (f32, f32), to: (f32, f32)) {
        s.pointer_down(Point::new(from.0, from.1), PointerButton::Primary, NO_MODS);
        s.pointer_move(Point::new(to.0, to.1));
        s.pointer_up(Point::new(to.0, to.1));
    }

    #[test]
    fn drawing_commits_snapped_rectangle() {
        let mut s = session();
        s.set_tool(Tool::Shape(Outline::Rectangle));
        s.pointer_down(Point::new(52.0, 49.0), PointerButton::Primary, NO_MODS);
        s.pointer_move(Point::new(148.0, 128.0));
        let preview = s.preview().unwrap();
        assert_eq!(preview.origin(), Point::new(60.0, 40.0));
        assert!(s.scene().is_empty());
        s.pointer_up(Point::new(148.0, 128.0));
        let shapes = s.scene().shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].origin(), Point::new(60.0, 40.0));
        assert_eq!(shapes[0].size(), Size::new(80.0, 80.0));
        assert!(s.preview().is_none());
    }

    #[test]
    fn tiny_drags_are_discarded() {
        let mut s = session();
        s.set_snap_to_grid(false);
        s.set_tool(Tool::Shape(Outline::Ellipse));
        drag(&mut s, (10.0, 10.0), (18.0, 60.0));
        s.set_tool(Tool::Line);
        drag(&mut s, (10.0, 10.0), (13.0, 14.0));
        assert!(s.scene().is_empty());
        assert_eq!(s.scene().undo_len(), 0);
    }

    #[test]
    fn line_keeps_its_start_point() {
        let mut s = session();
        s.set_tool(Tool::Line);
        drag(&mut s, (200.0, 100.0), (40.0, 100.0));
        let arrow = &s.scene().shapes()[0];
        assert_eq!(arrow.kind(), ShapeKind::Arrow);
        assert_eq!(arrow.origin(), Point::new(200.0, 100.0));
        assert_eq!(arrow.endpoint(), Some(Point::new(40.0, 100.0)));
    }

    #[test]
    fn new_shapes_take_current_style() {
        let mut s = session();
        s.set_color(Rgba::rgb(0xDC, 0x26, 0x26));
        s.set_stroke_width(20);
        s.toggle_line_style();
        s.set_tool(Tool::Shape(Outline::Diamond));
        drag(&mut s, (0.0, 0.0), (60.0, 60.0));
        let style = &s.scene().shapes()[0].style;
        assert_eq!(style.color, Rgba::rgb(0xDC, 0x26, 0x26));
        assert_eq!(style.stroke_width, MAX_STROKE_WIDTH);
        assert_eq!(style.dash.as_deref(), Some(&[10.0, 5.0][..]));
    }

    #[test]
    fn select_tool_hits_topmost() {
        let mut s = session();
        s.set_tool(Tool::Shape(Outline::Rectangle));
        drag(&mut s, (40.0, 40.0), (140.0, 140.0));
        s.set_tool(Tool::Select);
        s.pointer_down(Point::new(90.0, 90.0), PointerButton::Primary, NO_MODS);
        s.pointer_up(Point::new(90.0, 90.0));
        assert!(s.scene().selected().is_some());
        s.pointer_down(Point::new(300.0, 250.0), PointerButton::Primary, NO_MODS);
        assert_eq!(s.scene().selected(), None);
    }

    #[test]
    fn middle_and_alt_drag_pan_without_drawing() {
        let mut s = session();
        s.set_tool(Tool::Shape(Outline::Rectangle));
        s.pointer_down(Point::new(100.0, 100.0), PointerButton::Middle, NO_MODS);
        s.pointer_move(Point::new(130.0, 90.0));
        s.pointer_up(Point::new(130.0, 90.0));
        assert_eq!(s.viewport().pan, Point::new(30.0, -10.0));

        let alt = Modifiers {
            alt: true,
            ..NO_MODS
        };
        s.pointer_down(Point::new(0.0, 0.0), PointerButton::Primary, alt);
        assert!(s.is_panning());
        s.pointer_move(Point::new(10.0, 10.0));
        s.pointer_up(Point::new(10.0, 10.0));
        assert_eq!(s.viewport().pan, Point::new(40.0, 0.0));
        assert!(s.scene().is_empty());
        assert_eq!(s.scene().undo_len(), 0);
    }

    #[test]
    fn drawing_accounts_for_pan_and_zoom() {
        let mut s = session();
        s.set_snap_to_grid(false);
        s.zoom_in();
        s.zoom_out();
        s.pointer_down(Point::new(0.0, 0.0), PointerButton::Middle, NO_MODS);
        s.pointer_move(Point::new(20.0, 20.0));
        s.pointer_up(Point::new(20.0, 20.0));
        s.set_tool(Tool::Shape(Outline::Rectangle));
        drag(&mut s, (40.0, 40.0), (80.0, 80.0));
        let shape = &s.scene().shapes()[0];
        let origin = shape.origin();
        assert!((origin.x - 20.0).abs() < 1e-3 && (origin.y - 20.0).abs() < 1e-3);
    }

    #[test]
    fn text_tool_goes_through_prompt() {
        let mut s = session();
        s.set_tool(Tool::Text);
        s.pointer_down(Point::new(41.0, 59.0), PointerButton::Primary, NO_MODS);
        assert_eq!(
            s.prompt(),
            Some(&PendingPrompt::TextLabel {
                at: Point::new(40.0, 60.0)
            })
        );
        s.resolve_prompt(PromptAnswer::Text("gateway".to_string()));
        assert_eq!(s.prompt(), None);
        assert_eq!(s.scene().shapes()[0].label(), Some("gateway"));

        s.pointer_down(Point::new(100.0, 100.0), PointerButton::Primary, NO_MODS);
        s.resolve_prompt(PromptAnswer::Text(String::new()));
        s.pointer_down(Point::new(100.0, 100.0), PointerButton::Primary, NO_MODS);
        s.resolve_prompt(PromptAnswer::Dismiss);
        assert_eq!(s.scene().len(), 1);
    }

    #[test]
    fn pending_prompt_blocks_input() {
        let mut s = session();
        s.set_tool(Tool::Shape(Outline::Rectangle));
        drag(&mut s, (0.0, 0.0), (100.0, 100.0));
        s.request_clear();
        assert!(!s.handle_shortcut(Shortcut::Undo));
        drag(&mut s, (200.0, 0.0), (300.0, 100.0));
        assert_eq!(s.scene().len(), 1);
        s.resolve_prompt(PromptAnswer::Confirm(false));
        assert_eq!(s.scene().len(), 1);
        assert!(s.handle_shortcut(Shortcut::Undo));
        assert!(s.scene().is_empty());
    }

    #[test]
    fn pending_prompt_freezes_toolbar_commands() {
        let mut s = session();
        s.set_tool(Tool::Shape(Outline::Rectangle));
        drag(&mut s, (0.0, 0.0), (100.0, 100.0));
        s.handle_shortcut(Shortcut::SelectTopmost);
        s.request_clear();

        s.delete_selected();
        s.toggle_lock_selected();
        s.copy_selected();
        s.zoom_in();
        s.set_tool(Tool::Line);
        assert_eq!(s.scene().len(), 1);
        assert!(!s.scene().shapes()[0].locked);
        assert!(!s.can_paste());
        assert_eq!(s.viewport().zoom, 1.0);
        assert_eq!(s.tool(), Tool::Shape(Outline::Rectangle));
        assert_eq!(s.scene().undo_len(), 1);

        s.resolve_prompt(PromptAnswer::Confirm(false));
        s.zoom_in();
        s.toggle_lock_selected();
        assert!(s.viewport().zoom > 1.0);
        assert!(s.scene().shapes()[0].locked);
    }

    #[test]
    fn confirmed_clear_is_undoable() {
        let mut s = session();
        s.set_tool(Tool::Shape(Outline::Rectangle));
        drag(&mut s, (0.0, 0.0), (100.0, 100.0));
        s.request_clear();
        s.resolve_prompt(PromptAnswer::Confirm(true));
        assert!(s.scene().is_empty());
        s.undo();
        assert_eq!(s.scene().len(), 1);
    }

    #[test]
    fn delete_without_selection_is_noop() {
        let mut s = session();
        s.set_tool(Tool::Shape(Outline::Rectangle));
        drag(&mut s, (0.0, 0.0), (100.0, 100.0));
        let before = s.scene().shapes().to_vec();
        s.handle_shortcut(Shortcut::Delete);
        assert_eq!(s.scene().shapes(), before.as_slice());
        assert_eq!(s.scene().selected(), None);
        assert_eq!(s.scene().undo_len(), 1);
    }

    #[test]
    fn copy_paste_through_shortcuts() {
        let mut s = session();
        s.handle_shortcut(Shortcut::Paste);
        assert!(s.scene().is_empty());
        s.set_tool(Tool::Shape(Outline::Hexagon));
        drag(&mut s, (0.0, 0.0), (100.0, 60.0));
        s.handle_shortcut(Shortcut::SelectTopmost);
        s.handle_shortcut(Shortcut::Copy);
        assert!(s.can_paste());
        s.handle_shortcut(Shortcut::Paste);
        let shapes = s.scene().shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[1].origin(), Point::new(20.0, 20.0));
        assert_eq!(s.scene().selected(), Some(shapes[1].id));
        s.handle_shortcut(Shortcut::Deselect);
        assert_eq!(s.scene().selected(), None);
    }

    #[test]
    fn locked_selection_resists_delete() {
        let mut s = session();
        s.set_tool(Tool::Shape(Outline::Rectangle));
        drag(&mut s, (0.0, 0.0), (100.0, 100.0));
        s.handle_shortcut(Shortcut::SelectTopmost);
        s.toggle_lock_selected();
        s.delete_selected();
        assert_eq!(s.scene().len(), 1);
        s.toggle_lock_selected();
        s.delete_selected();
        assert!(s.scene().is_empty());
    }

    #[test]
    fn sending_empty_scene_raises_alert() {
        let mut s = session();
        assert!(!s.can_export());
        assert_eq!(s.send(), None);
        assert!(matches!(s.prompt(), Some(PendingPrompt::Alert { .. })));
        s.resolve_prompt(PromptAnswer::Dismiss);
        assert_eq!(s.prompt(), None);
    }

    #[test]
    fn send_produces_png_data_uri() {
        let mut s = session();
        s.set_tool(Tool::Shape(Outline::Rectangle));
        drag(&mut s, (40.0, 40.0), (140.0, 120.0));
        let uri = s.send().unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(s.prompt(), None);
    }

    #[test]
    fn download_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        s.set_tool(Tool::Line);
        drag(&mut s, (20.0, 20.0), (200.0, 120.0));
        let target = dir.path().join(s.default_download_name());
        let written = s.download_to(&target).unwrap();
        let bytes = std::fs::read(written).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn style_is_written_back_to_settings() {
        let mut s = session();
        s.set_show_grid(false);
        s.toggle_line_style();
        let mut settings = EditorSettings::default();
        s.store_style(&mut settings);
        assert!(!settings.show_grid);
        assert_eq!(settings.line_style, LineStyle::Dashed);
        assert_eq!(s.status_line(), "0 objects · 100%");
    }
}
