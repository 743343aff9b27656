//! Toolkit-independent editor core.

pub mod export;
pub mod geometry;
pub mod render;
pub mod scene;
pub mod session;
pub mod surface;

pub use export::ExportFrame;
pub use geometry::Viewport;
pub use scene::{Clipboard, Scene};
pub use session::{
    EditorSession, Modifiers, PendingPrompt, PointerButton, PromptAnswer, Shortcut, Tool,
};
pub use surface::Surface;
