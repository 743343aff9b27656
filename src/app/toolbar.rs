use eframe::egui;

use crate::canvas::{EditorSession, Tool};
use crate::model::{LineStyle, Rgba};
use crate::settings::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH, PALETTE};

use super::painter::to_color32;

/// Toolbar requests that need the host rather than the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum EditorAction {
    Send,
    Cancel,
    Download,
    ToggleHelp,
    StyleChanged,
}

fn tool_button(ui: &mut egui::Ui, session: &mut EditorSession, tool: Tool) {
    let active = session.tool() == tool;
    if ui.selectable_label(active, tool.label()).clicked() {
        session.set_tool(tool);
    }
}

fn color_row(ui: &mut egui::Ui, session: &mut EditorSession) -> bool {
    let mut changed = false;
    for (name, color) in PALETTE {
        let current = session.color() == color;
        let stroke = if current {
            egui::Stroke::new(2.0, egui::Color32::from_rgb(0x1E, 0x29, 0x3B))
        } else {
            egui::Stroke::new(1.0, egui::Color32::from_gray(200))
        };
        let swatch = egui::Button::new("").fill(to_color32(color)).stroke(stroke);
        if ui.add_sized([18.0, 18.0], swatch).on_hover_text(name).clicked() {
            session.set_color(color);
            changed = true;
        }
    }
    let c = session.color();
    let mut arr = [c.r, c.g, c.b, c.a];
    if ui.color_edit_button_srgba_unmultiplied(&mut arr).changed() {
        session.set_color(Rgba::rgba(arr[0], arr[1], arr[2], arr[3]));
        changed = true;
    }
    changed
}

pub(super) fn toolbar(ui: &mut egui::Ui, session: &mut EditorSession) -> Vec<EditorAction> {
    let mut actions = Vec::new();
    // Everything except Cancel and help waits for the pending prompt.
    let idle = session.prompt().is_none();

    ui.horizontal(|ui| {
        ui.heading(format!("Session with {}", session.target()));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let can_export = idle && session.can_export();
            if ui
                .add_enabled(can_export, egui::Button::new("Send"))
                .clicked()
            {
                actions.push(EditorAction::Send);
            }
            if ui
                .add_enabled(can_export, egui::Button::new("Download"))
                .clicked()
            {
                actions.push(EditorAction::Download);
            }
            if ui.button("Cancel").clicked() {
                actions.push(EditorAction::Cancel);
            }
            if ui.button("?").on_hover_text("Shortcuts (F1)").clicked() {
                actions.push(EditorAction::ToggleHelp);
            }
        });
    });
    ui.separator();

    ui.add_enabled_ui(idle, |ui| {
        ui.horizontal_wrapped(|ui| {
            for tool in Tool::ALL {
                tool_button(ui, session, tool);
            }
        });

        ui.horizontal_wrapped(|ui| {
            let mut style_changed = color_row(ui, session);
            ui.separator();

            let mut width = session.stroke_width();
            if ui
                .add(egui::Slider::new(&mut width, MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).text("Width"))
                .changed()
            {
                session.set_stroke_width(width);
                style_changed = true;
            }
            let dashed = session.line_style() == LineStyle::Dashed;
            if ui.selectable_label(dashed, "Dashed").clicked() {
                session.toggle_line_style();
                style_changed = true;
            }
            let mut snap = session.snap_to_grid();
            if ui.checkbox(&mut snap, "Snap").changed() {
                session.set_snap_to_grid(snap);
                style_changed = true;
            }
            let mut grid = session.show_grid();
            if ui.checkbox(&mut grid, "Grid").changed() {
                session.set_show_grid(grid);
                style_changed = true;
            }
            if style_changed {
                actions.push(EditorAction::StyleChanged);
            }
        });

        ui.horizontal(|ui| {
            let scene = session.scene();
            let (can_undo, can_redo) = (scene.can_undo(), scene.can_redo());
            let selected = scene.selected_shape().map(|s| s.locked);
            let empty = scene.is_empty();

            if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                session.undo();
            }
            if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                session.redo();
            }
            if ui
                .add_enabled(selected == Some(false), egui::Button::new("Delete"))
                .clicked()
            {
                session.delete_selected();
            }
            let lock_label = if selected == Some(true) { "Unlock" } else { "Lock" };
            if ui
                .add_enabled(selected.is_some(), egui::Button::new(lock_label))
                .clicked()
            {
                session.toggle_lock_selected();
            }
            if ui.add_enabled(!empty, egui::Button::new("Clear")).clicked() {
                session.request_clear();
            }
            ui.separator();
            if ui.button("−").on_hover_text("Zoom out").clicked() {
                session.zoom_out();
            }
            if ui
                .button(format!("{:.0}%", session.viewport().zoom * 100.0))
                .on_hover_text("Reset zoom")
                .clicked()
            {
                session.reset_zoom();
            }
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                session.zoom_in();
            }
        });
    });

    actions
}

pub(super) fn status_bar(ui: &mut egui::Ui, session: &EditorSession, status: Option<&str>) {
    ui.horizontal(|ui| {
        ui.label(status.unwrap_or("Ready"));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(session.status_line());
            if let Some(shape) = session.scene().selected_shape() {
                ui.separator();
                let lock = if shape.locked { " (locked)" } else { "" };
                ui.label(format!("Selected {}{lock}", shape.id));
            }
        });
    });
}
