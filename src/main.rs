use std::path::PathBuf;

use eframe::egui;
use tracing::info;
use umlsketch::canvas::export::DATA_URI_PREFIX;
use umlsketch::{ComposerSink, DiagramEditor, EditorSettings, logging, settings};

struct ChatMessage {
    to: String,
    data_uri: String,
}

/// Stand-in for the chat composer: keeps sent diagrams as messages.
#[derive(Default)]
struct Outbox {
    conversation: String,
    messages: Vec<ChatMessage>,
}

impl ComposerSink for Outbox {
    fn on_send(&mut self, data_uri: String) {
        info!(to = %self.conversation, bytes = data_uri.len(), "queued diagram message");
        self.messages.push(ChatMessage {
            to: self.conversation.clone(),
            data_uri,
        });
    }

    fn on_close(&mut self) {
        info!(to = %self.conversation, "diagram discarded");
    }
}

struct ComposerApp {
    editor: DiagramEditor,
    outbox: Outbox,
    contacts: Vec<String>,
    active: usize,
}

impl ComposerApp {
    fn new(settings: EditorSettings, settings_path: PathBuf) -> Self {
        Self {
            editor: DiagramEditor::new(settings, settings_path),
            outbox: Outbox::default(),
            contacts: vec!["alice".to_string(), "bob".to_string(), "carol".to_string()],
            active: 0,
        }
    }

    fn active_contact(&self) -> &str {
        self.contacts.get(self.active).map(String::as_str).unwrap_or("")
    }
}

impl eframe::App for ComposerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("contacts").show(ctx, |ui| {
            ui.heading("Conversations");
            ui.separator();
            for (idx, name) in self.contacts.iter().enumerate() {
                if ui.selectable_label(idx == self.active, name).clicked() {
                    self.active = idx;
                }
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let contact = self.active_contact().to_string();
            ui.heading(format!("Chat with {contact}"));
            ui.separator();
            egui::ScrollArea::vertical()
                .max_height(ui.available_height() - 40.0)
                .show(ui, |ui| {
                    for msg in self.outbox.messages.iter().filter(|m| m.to == contact) {
                        let payload = msg.data_uri.len().saturating_sub(DATA_URI_PREFIX.len());
                        ui.label(format!("diagram.png ({} bytes)", payload * 3 / 4));
                    }
                });
            ui.separator();
            if ui
                .add_enabled(!self.editor.is_open(), egui::Button::new("Draw diagram"))
                .clicked()
            {
                self.outbox.conversation = contact.clone();
                self.editor.open(contact);
            }
        });

        self.editor.show(ctx, &mut self.outbox);
    }
}

fn main() -> eframe::Result<()> {
    let settings_path = settings::config_path();
    let settings = logging::bootstrap(|| settings::load_or_default(&settings_path));
    logging::init(settings.debug_logging);
    info!(path = %settings_path.display(), "loaded settings");

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "umlsketch",
        native_options,
        Box::new(|_cc| Ok(Box::new(ComposerApp::new(settings, settings_path)))),
    )
}
