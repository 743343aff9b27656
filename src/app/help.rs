use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Shortcuts")
        .open(open)
        .resizable(false)
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.heading("Keyboard");
            ui.separator();
            help_row(ui, "⌘Z", "Undo");
            help_row(ui, "⌘Y / ⌘⇧Z", "Redo");
            help_row(ui, "⌘C", "Copy selected shape");
            help_row(ui, "⌘V", "Paste copy offset by 20");
            help_row(ui, "⌘A", "Select topmost shape");
            help_row(ui, "Delete / Backspace", "Delete selected shape");
            help_row(ui, "Escape", "Clear selection");
            help_row(ui, "F1", "Toggle this window");

            ui.add_space(10.0);
            ui.heading("Pointer");
            ui.separator();
            help_row(ui, "Drag", "Draw with the active tool");
            help_row(ui, "Click", "Select (Select tool) or place text (Text tool)");
            help_row(ui, "Middle drag", "Pan");
            help_row(ui, "Alt + drag", "Pan");

            ui.add_space(10.0);
            ui.label("Locked shapes cannot be deleted until unlocked.");
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [120.0, 16.0],
            egui::Label::new(egui::RichText::new(shortcut).monospace().strong()),
        );
        ui.label(description);
    });
}
