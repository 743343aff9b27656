use eframe::egui;

use crate::canvas::{PendingPrompt, PromptAnswer};

fn modal(title: &str) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

/// Shows the dialog for `prompt` and returns the answer once the user gives one.
pub(super) fn prompt_dialog(
    ctx: &egui::Context,
    prompt: &PendingPrompt,
    draft: &mut String,
) -> Option<PromptAnswer> {
    let mut answer = None;
    match prompt {
        PendingPrompt::TextLabel { .. } => {
            modal("Add text").show(ctx, |ui| {
                ui.label("Label:");
                let edit = ui.text_edit_singleline(draft);
                edit.request_focus();
                let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || enter {
                        answer = Some(PromptAnswer::Text(std::mem::take(draft)));
                    }
                    if ui.button("Cancel").clicked() {
                        answer = Some(PromptAnswer::Dismiss);
                    }
                });
            });
        }
        PendingPrompt::ConfirmClear => {
            modal("Clear diagram").show(ctx, |ui| {
                ui.label("Remove every shape from the canvas?");
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        answer = Some(PromptAnswer::Confirm(true));
                    }
                    if ui.button("Keep").clicked() {
                        answer = Some(PromptAnswer::Confirm(false));
                    }
                });
            });
        }
        PendingPrompt::Alert { message } => {
            modal("Export failed").show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    answer = Some(PromptAnswer::Dismiss);
                }
            });
        }
    }
    if answer.is_none()
        && !matches!(prompt, PendingPrompt::TextLabel { .. })
        && ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape))
    {
        answer = Some(PromptAnswer::Dismiss);
    }
    if answer.is_some() {
        draft.clear();
    }
    answer
}
