use crate::model::{Point, Shape, ShapeId};
use tracing::debug;

use super::geometry::{TextMetrics, Viewport, topmost_hit_measured};
use super::render;
use super::surface::Surface;

/// Offset applied to a pasted shape relative to the copied one.
pub const PASTE_OFFSET: f32 = 20.0;

/// Full editable state of one diagram: shapes in z-order, selection, history
/// and the viewport. History holds whole-scene snapshots.
#[derive(Clone, Debug)]
pub struct Scene {
    shapes: Vec<Shape>,
    selected: Option<ShapeId>,
    undo_stack: Vec<Vec<Shape>>,
    redo_stack: Vec<Vec<Shape>>,
    next_id: u64,
    text_metrics: TextMetrics,
    pub viewport: Viewport,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            selected: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_id: 1,
            text_metrics: TextMetrics::default(),
            viewport: Viewport::default(),
        }
    }
}

impl Scene {
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn allocate_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_undo(&mut self) {
        self.undo_stack.push(self.shapes.clone());
        self.redo_stack.clear();
    }

    /// Appends `shape` on top with a fresh id. Shapes below the minimum size
    /// are dropped and leave the scene untouched.
    pub fn commit(&mut self, mut shape: Shape) -> Option<ShapeId> {
        if !shape.is_committable() {
            debug!(kind = ?shape.kind(), "discarding degenerate shape");
            return None;
        }
        self.push_undo();
        shape.id = self.allocate_id();
        let id = shape.id;
        debug!(%id, kind = ?shape.kind(), "commit shape");
        self.shapes.push(shape);
        Some(id)
    }

    /// Removes an unlocked shape. Returns whether anything changed.
    pub fn remove(&mut self, id: ShapeId) -> bool {
        let Some(idx) = self.shapes.iter().position(|s| s.id == id) else {
            return false;
        };
        if self.shapes[idx].locked {
            debug!(%id, "shape is locked, not removing");
            return false;
        }
        self.push_undo();
        self.shapes.remove(idx);
        if self.selected == Some(id) {
            self.selected = None;
        }
        debug!(%id, "removed shape");
        true
    }

    pub fn toggle_lock(&mut self, id: ShapeId) -> bool {
        let Some(idx) = self.shapes.iter().position(|s| s.id == id) else {
            return false;
        };
        self.push_undo();
        let shape = &mut self.shapes[idx];
        shape.locked = !shape.locked;
        debug!(%id, locked = shape.locked, "toggled lock");
        true
    }

    pub fn clear(&mut self) {
        self.push_undo();
        self.shapes.clear();
        self.selected = None;
        debug!("cleared scene");
    }

    pub fn undo(&mut self) {
        let Some(prev) = self.undo_stack.pop() else {
            return;
        };
        let current = std::mem::replace(&mut self.shapes, prev);
        self.redo_stack.push(current);
        self.selected = None;
        debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "undo");
    }

    pub fn redo(&mut self) {
        let Some(next) = self.redo_stack.pop() else {
            return;
        };
        let current = std::mem::replace(&mut self.shapes, next);
        self.undo_stack.push(current);
        self.selected = None;
        debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "redo");
    }

    /// Sets the selection; an id that is not in the scene clears it.
    pub fn select(&mut self, id: Option<ShapeId>) {
        self.selected = id.filter(|id| self.get(*id).is_some());
    }

    pub fn select_at(&mut self, world: Point) -> Option<ShapeId> {
        let hit = topmost_hit_measured(&self.shapes, world, &self.text_metrics);
        self.select(hit);
        hit
    }

    /// Records how wide `surface` draws each text label so picking matches
    /// the visible plates. Hosts call this whenever they paint the scene.
    pub fn measure_labels(&mut self, surface: &dyn Surface) {
        render::measure_labels(surface, &self.shapes, &mut self.text_metrics);
    }

    pub fn select_topmost(&mut self) {
        self.selected = self.shapes.last().map(|s| s.id);
    }

    /// Commits a copy of the clipboard slot shifted by [`PASTE_OFFSET`] and
    /// selects it.
    pub fn paste(&mut self, clipboard: &Clipboard) -> Option<ShapeId> {
        let mut shape = clipboard.slot.clone()?;
        shape.translate(PASTE_OFFSET, PASTE_OFFSET);
        shape.locked = false;
        let id = self.commit(shape)?;
        self.selected = Some(id);
        Some(id)
    }
}

/// Single-slot clipboard living outside any scene.
#[derive(Clone, Debug, Default)]
pub struct Clipboard {
    slot: Option<Shape>,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn copy(&mut self, scene: &Scene, id: ShapeId) -> bool {
        let Some(shape) = scene.get(id) else {
            return false;
        };
        self.slot = Some(shape.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Figure, Outline, RectF, Size, Style};

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Shape {
        outline(Outline::Rectangle, x, y, w, h)
    }

    fn outline(kind: Outline, x: f32, y: f32, w: f32, h: f32) -> Shape {
        Shape::new(
            Figure::Outline {
                outline: kind,
                rect: RectF::from_origin_size(Point::new(x, y), Size::new(w, h)),
            },
            Style::default(),
        )
    }

    #[test]
    fn commit_undo_redo_scenario() {
        let mut scene = Scene::default();
        let r = scene.commit(rect(50.0, 50.0, 100.0, 80.0)).unwrap();
        let e = scene
            .commit(outline(Outline::Ellipse, 200.0, 50.0, 80.0, 80.0))
            .unwrap();
        let ids: Vec<_> = scene.shapes().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![r, e]);

        let before_undo = scene.shapes().to_vec();
        scene.undo();
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.shapes()[0].id, r);
        scene.redo();
        assert_eq!(scene.shapes(), before_undo.as_slice());
    }

    #[test]
    fn degenerate_commit_is_ignored() {
        let mut scene = Scene::default();
        assert_eq!(scene.commit(rect(0.0, 0.0, 9.0, 50.0)), None);
        assert!(scene.is_empty());
        assert_eq!(scene.undo_len(), 0);
    }

    #[test]
    fn ids_stay_unique_across_undo() {
        let mut scene = Scene::default();
        let first = scene.commit(rect(0.0, 0.0, 20.0, 20.0)).unwrap();
        scene.undo();
        let second = scene.commit(rect(0.0, 0.0, 20.0, 20.0)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut scene = Scene::default();
        scene.undo();
        scene.redo();
        assert!(scene.is_empty());
        assert_eq!(scene.redo_len(), 0);
    }

    #[test]
    fn remove_clears_matching_selection() {
        let mut scene = Scene::default();
        let a = scene.commit(rect(0.0, 0.0, 20.0, 20.0)).unwrap();
        scene.select(Some(a));
        assert!(scene.remove(a));
        assert_eq!(scene.selected(), None);
        assert!(!scene.remove(a));
        assert_eq!(scene.undo_len(), 2);
    }

    #[test]
    fn locked_shapes_survive_remove() {
        let mut scene = Scene::default();
        let a = scene.commit(rect(0.0, 0.0, 20.0, 20.0)).unwrap();
        assert!(scene.toggle_lock(a));
        let history = scene.undo_len();
        assert!(!scene.remove(a));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.undo_len(), history);
        scene.undo();
        assert!(!scene.get(a).unwrap().locked);
    }

    #[test]
    fn new_edits_invalidate_redo() {
        let mut scene = Scene::default();
        let a = scene.commit(rect(0.0, 0.0, 20.0, 20.0)).unwrap();
        scene.commit(rect(40.0, 0.0, 20.0, 20.0));
        scene.undo();
        assert_eq!(scene.redo_len(), 1);
        scene.remove(a);
        assert_eq!(scene.redo_len(), 0);

        scene.undo();
        assert_eq!(scene.redo_len(), 1);
        scene.clear();
        assert_eq!(scene.redo_len(), 0);
        assert!(scene.is_empty());
    }

    #[test]
    fn clear_is_one_undo_step() {
        let mut scene = Scene::default();
        scene.commit(rect(0.0, 0.0, 20.0, 20.0));
        scene.commit(rect(40.0, 0.0, 20.0, 20.0));
        let before = scene.shapes().to_vec();
        scene.clear();
        scene.undo();
        assert_eq!(scene.shapes(), before.as_slice());
    }

    #[test]
    fn undo_drops_selection() {
        let mut scene = Scene::default();
        let a = scene.commit(rect(0.0, 0.0, 20.0, 20.0)).unwrap();
        scene.commit(rect(40.0, 0.0, 20.0, 20.0));
        scene.select(Some(a));
        scene.undo();
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn selecting_unknown_id_clears() {
        let mut scene = Scene::default();
        let a = scene.commit(rect(0.0, 0.0, 20.0, 20.0)).unwrap();
        scene.select(Some(a));
        scene.select(Some(ShapeId(999)));
        assert_eq!(scene.selected(), None);
        assert_eq!(scene.undo_len(), 1);
    }

    #[test]
    fn copy_paste_offsets_clone() {
        let mut scene = Scene::default();
        let mut clipboard = Clipboard::default();
        assert_eq!(scene.paste(&clipboard), None);

        let a = scene.commit(rect(40.0, 60.0, 30.0, 30.0)).unwrap();
        assert!(clipboard.copy(&scene, a));
        let b = scene.paste(&clipboard).unwrap();
        let (src, copy) = (scene.get(a).unwrap(), scene.get(b).unwrap());
        assert_ne!(a, b);
        assert_eq!(copy.kind(), src.kind());
        assert_eq!(copy.size(), src.size());
        assert_eq!(copy.style.color, src.style.color);
        assert_eq!(copy.origin(), Point::new(60.0, 80.0));
        assert_eq!(scene.selected(), Some(b));
    }

    #[test]
    fn paste_uses_value_copy() {
        let mut scene = Scene::default();
        let mut clipboard = Clipboard::default();
        let a = scene.commit(rect(0.0, 0.0, 30.0, 30.0)).unwrap();
        clipboard.copy(&scene, a);
        scene.remove(a);
        let b = scene.paste(&clipboard).unwrap();
        assert_eq!(scene.get(b).unwrap().origin(), Point::new(20.0, 20.0));
    }

    #[test]
    fn hit_selection_prefers_top_shape() {
        let mut scene = Scene::default();
        scene.commit(rect(0.0, 0.0, 100.0, 100.0));
        let top = scene.commit(rect(50.0, 50.0, 100.0, 100.0)).unwrap();
        assert_eq!(scene.select_at(Point::new(75.0, 75.0)), Some(top));
        assert_eq!(scene.select_at(Point::new(500.0, 500.0)), None);
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn select_topmost_picks_last() {
        let mut scene = Scene::default();
        scene.select_topmost();
        assert_eq!(scene.selected(), None);
        scene.commit(rect(0.0, 0.0, 20.0, 20.0));
        let last = scene.commit(rect(40.0, 0.0, 20.0, 20.0)).unwrap();
        scene.select_topmost();
        assert_eq!(scene.selected(), Some(last));
    }

    #[test]
    fn text_picking_follows_measured_plate() {
        let mut scene = Scene::default();
        let label = scene
            .commit(Shape::new(
                Figure::Text {
                    pos: Point::new(40.0, 40.0),
                    label: "api".to_string(),
                },
                Style::default(),
            ))
            .unwrap();
        let edge = Point::new(72.0, 50.0);
        assert_eq!(scene.select_at(edge), Some(label));

        // The recording surface draws narrower labels than the estimate.
        scene.measure_labels(&crate::canvas::render::tests::Recorder::default());
        assert_eq!(scene.select_at(edge), None);
        assert_eq!(scene.select_at(Point::new(60.0, 50.0)), Some(label));
    }
}
