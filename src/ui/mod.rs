// UI: egui windows declared every frame
pub mod file_browser;
pub mod panel;

pub use file_browser::{BrowserEntry, FileBrowser};
pub use panel::{draw_viewer_ui, UiAction, UiState};
