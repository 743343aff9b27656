use eframe::egui;
use tracing::warn;

use crate::canvas::render::{draw_background, render_preview, render_shapes};
use crate::canvas::{EditorSession, Modifiers, PointerButton, Shortcut, Tool};
use crate::model::{Point, Shape, Size};

use super::dialogs::prompt_dialog;
use super::help::draw_help_window;
use super::painter::EguiSurface;
use super::toolbar::{EditorAction, status_bar, toolbar};
use super::{ComposerSink, DiagramEditor};

fn pointer_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn local(pos: egui::Pos2, origin: egui::Pos2) -> Point {
    Point::new(pos.x - origin.x, pos.y - origin.y)
}

/// Keyboard shortcuts for this frame, plus whether F1 was pressed.
fn read_shortcuts(ctx: &egui::Context) -> (Vec<Shortcut>, bool) {
    let wants_keyboard = ctx.wants_keyboard_input();
    ctx.input_mut(|i| {
        let help = i.consume_key(egui::Modifiers::NONE, egui::Key::F1);
        let mut out = Vec::new();
        if wants_keyboard {
            return (out, help);
        }
        // Desktop backends turn Cmd+C/Cmd+V into clipboard events; Cmd+V only
        // arrives that way while the OS clipboard holds text.
        let mut copy = false;
        let mut paste = false;
        for event in &i.events {
            match event {
                egui::Event::Copy => copy = true,
                egui::Event::Paste(_) => paste = true,
                _ => {}
            }
        }
        copy |= i.consume_key(egui::Modifiers::COMMAND, egui::Key::C);
        paste |= i.consume_key(egui::Modifiers::COMMAND, egui::Key::V);
        if copy {
            out.push(Shortcut::Copy);
        }
        if paste {
            out.push(Shortcut::Paste);
        }
        if i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
            || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y)
        {
            out.push(Shortcut::Redo);
        } else if i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z) {
            out.push(Shortcut::Undo);
        }
        if i.consume_key(egui::Modifiers::COMMAND, egui::Key::A) {
            out.push(Shortcut::SelectTopmost);
        }
        if i.consume_key(egui::Modifiers::NONE, egui::Key::Delete)
            || i.consume_key(egui::Modifiers::NONE, egui::Key::Backspace)
        {
            out.push(Shortcut::Delete);
        }
        if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
            out.push(Shortcut::Deselect);
        }
        (out, help)
    })
}

/// Mirrors a copied shape onto the OS clipboard. The text itself is never
/// read back; holding text there is what makes the next Cmd+V reach egui.
fn mirror_to_os_clipboard(ctx: &egui::Context, shape: &Shape) {
    match serde_json::to_string(shape) {
        Ok(text) => ctx.copy_text(text),
        Err(e) => warn!(error = %e, "could not serialize copied shape"),
    }
}

fn canvas(ui: &mut egui::Ui, session: &mut EditorSession) {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
    let origin = rect.min;
    session.set_canvas(Size::new(rect.width(), rect.height()), ui.ctx().pixels_per_point());

    if session.prompt().is_none() {
        let events = ui.input(|i| i.events.clone());
        for event in &events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    let Some(button) = pointer_button(*button) else {
                        continue;
                    };
                    if *pressed {
                        if response.hovered() && rect.contains(*pos) {
                            let mods = Modifiers {
                                alt: modifiers.alt,
                                command: modifiers.command,
                                shift: modifiers.shift,
                            };
                            session.pointer_down(local(*pos, origin), button, mods);
                        }
                    } else {
                        session.pointer_up(local(*pos, origin));
                    }
                }
                egui::Event::PointerMoved(pos) => session.pointer_move(local(*pos, origin)),
                _ => {}
            }
        }
    }

    if session.is_panning() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if response.hovered() && session.tool() != Tool::Select {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
    }

    let painter = ui.painter_at(rect);
    let viewport = session.viewport();
    let mut surface = EguiSurface::new(&painter, origin, viewport);
    let visible = viewport.visible_world(Size::new(rect.width(), rect.height()));
    draw_background(&mut surface, visible, session.show_grid());
    session.measure_labels(&surface);
    let scene = session.scene();
    render_shapes(&mut surface, scene.shapes(), scene.selected());
    if let Some(preview) = session.preview() {
        render_preview(&mut surface, &preview);
    }
}

impl DiagramEditor {
    /// Draws the overlay and feeds it this frame's input. Does nothing while closed.
    pub fn show(&mut self, ctx: &egui::Context, sink: &mut dyn ComposerSink) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let mut actions = Vec::new();
        let mut window_open = true;
        let status = self.status.as_deref();
        egui::Window::new("Diagram")
            .id(egui::Id::new("umlsketch_editor"))
            .open(&mut window_open)
            .collapsible(false)
            .default_size([960.0, 640.0])
            .show(ctx, |ui| {
                egui::TopBottomPanel::top("editor_toolbar").show_inside(ui, |ui| {
                    actions = toolbar(ui, session);
                });
                egui::TopBottomPanel::bottom("editor_status").show_inside(ui, |ui| {
                    status_bar(ui, session, status);
                });
                egui::CentralPanel::default().show_inside(ui, |ui| canvas(ui, session));
            });
        if !window_open {
            actions.push(EditorAction::Cancel);
        }

        if let Some(prompt) = session.prompt().cloned() {
            if let Some(answer) = prompt_dialog(ctx, &prompt, &mut self.text_draft) {
                session.resolve_prompt(answer);
            }
        } else {
            let (shortcuts, help) = read_shortcuts(ctx);
            for shortcut in shortcuts {
                let copying = shortcut == Shortcut::Copy && session.scene().selected().is_some();
                if session.handle_shortcut(shortcut) && copying {
                    if let Some(shape) = session.scene().selected_shape() {
                        mirror_to_os_clipboard(ctx, shape);
                    }
                }
            }
            if help {
                actions.push(EditorAction::ToggleHelp);
            }
        }

        for action in actions {
            if self.apply_action(action, sink) {
                return;
            }
        }

        draw_help_window(ctx, &mut self.show_help);
    }

    /// Carries out one toolbar request. Returns `true` once the overlay closed.
    pub(super) fn apply_action(
        &mut self,
        action: EditorAction,
        sink: &mut dyn ComposerSink,
    ) -> bool {
        match action {
            EditorAction::Send => {
                let Some(uri) = self.session.as_mut().and_then(|s| s.send()) else {
                    return false;
                };
                sink.on_send(uri);
                self.close();
                true
            }
            EditorAction::Cancel => {
                sink.on_close();
                self.close();
                true
            }
            EditorAction::Download => {
                self.download();
                false
            }
            EditorAction::ToggleHelp => {
                self.show_help = !self.show_help;
                false
            }
            EditorAction::StyleChanged => {
                self.persist_settings();
                false
            }
        }
    }

    fn download(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.can_export() {
            return;
        }
        let mut dialog = rfd::FileDialog::new()
            .set_file_name(session.default_download_name())
            .add_filter("PNG", &["png"]);
        if let Some(dir) = &self.settings.export_dir {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.save_file() {
            if let Some(written) = session.download_to(&path) {
                self.status = Some(format!("Saved {}", written.display()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: egui::Key, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    fn shortcuts_for(events: Vec<egui::Event>) -> (Vec<Shortcut>, bool) {
        let ctx = egui::Context::default();
        let mut read = (Vec::new(), false);
        let input = egui::RawInput {
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| read = read_shortcuts(ctx));
        read
    }

    #[test]
    fn command_v_key_pastes_without_clipboard_event() {
        let (shortcuts, help) = shortcuts_for(vec![key(egui::Key::V, egui::Modifiers::COMMAND)]);
        assert_eq!(shortcuts, vec![Shortcut::Paste]);
        assert!(!help);
    }

    #[test]
    fn clipboard_event_and_key_paste_once() {
        let (shortcuts, _) = shortcuts_for(vec![
            egui::Event::Paste("{}".to_string()),
            key(egui::Key::V, egui::Modifiers::COMMAND),
        ]);
        assert_eq!(shortcuts, vec![Shortcut::Paste]);
    }

    #[test]
    fn copy_arrives_as_event_or_key() {
        let (from_event, _) = shortcuts_for(vec![egui::Event::Copy]);
        assert_eq!(from_event, vec![Shortcut::Copy]);
        let (from_key, _) = shortcuts_for(vec![key(egui::Key::C, egui::Modifiers::COMMAND)]);
        assert_eq!(from_key, vec![Shortcut::Copy]);
    }

    #[test]
    fn undo_redo_and_help_keys() {
        let (shortcuts, help) = shortcuts_for(vec![
            key(egui::Key::Z, egui::Modifiers::COMMAND | egui::Modifiers::SHIFT),
            key(egui::Key::F1, egui::Modifiers::NONE),
        ]);
        assert_eq!(shortcuts, vec![Shortcut::Redo]);
        assert!(help);

        let (shortcuts, _) = shortcuts_for(vec![key(egui::Key::Z, egui::Modifiers::COMMAND)]);
        assert_eq!(shortcuts, vec![Shortcut::Undo]);
    }
}
