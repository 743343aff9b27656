//! egui host for the diagram editor overlay.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::canvas::EditorSession;
use crate::settings::{self, EditorSettings};

mod dialogs;
mod help;
mod painter;
mod toolbar;
mod update;

/// Receives the result of an editor overlay.
pub trait ComposerSink {
    /// Called once with a `data:image/png;base64,` payload when the user sends.
    fn on_send(&mut self, data_uri: String);

    /// Called when the user cancels the overlay.
    fn on_close(&mut self);
}

pub struct DiagramEditor {
    session: Option<EditorSession>,
    settings: EditorSettings,
    settings_path: PathBuf,
    show_help: bool,
    text_draft: String,
    status: Option<String>,
}

impl DiagramEditor {
    pub fn new(settings: EditorSettings, settings_path: PathBuf) -> Self {
        Self {
            session: None,
            settings,
            settings_path,
            show_help: false,
            text_draft: String::new(),
            status: None,
        }
    }

    /// Opens a fresh, empty diagram addressed to `target`. An already open
    /// diagram is discarded.
    pub fn open(&mut self, target: impl Into<String>) {
        self.session = Some(EditorSession::open(target, &self.settings));
        self.text_draft.clear();
        self.status = None;
    }

    /// Discards the diagram and hides the overlay.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!("editor closed");
        }
        self.show_help = false;
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditorSession> {
        self.session.as_mut()
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    fn persist_settings(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        session.store_style(&mut self.settings);
        if let Err(e) = settings::save_settings(&self.settings_path, &self.settings) {
            warn!(path = %self.settings_path.display(), error = %e, "settings save failed");
            self.status = Some(format!("Settings save failed: {e}"));
        }
    }
}
