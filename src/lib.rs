pub mod app;
pub mod canvas;
pub mod error;
pub mod logging;
pub mod model;
pub mod settings;

pub use app::{ComposerSink, DiagramEditor};
pub use canvas::EditorSession;
pub use error::{ExportError, SettingsError};
pub use settings::EditorSettings;
