//! Shapy Core Library
//!
//! Platform-agnostic editor core for the Shapy design editor: the scene
//! object model, workspace and viewport, selection tracking, snapshot
//! history, and the command layer that ties them together.

pub mod clipboard;
pub mod config;
pub mod editor;
pub mod filters;
pub mod history;
pub mod hotkeys;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod surface;
pub mod viewport;
pub mod workspace;

pub use config::{ConfigError, EditorConfig, ToolDefaults};
pub use editor::{EXPORT_FILE_STEM, Editor, EditorError, ExportedFile, ListenerId, TextOptions};
pub use filters::ImageFilter;
pub use history::{History, ReplayState};
pub use hotkeys::{HotkeyAction, KeyboardEvent};
pub use scene::{Scene, SceneError, SceneEvent};
pub use selection::{SelectionKind, SelectionTracker};
pub use shapes::{ObjectId, SceneObject, SerializableColor};
pub use storage::DocumentChange;
pub use surface::{ExportFormat, ImageLoader, LoadedImage, RenderSurface};
pub use viewport::Viewport;
