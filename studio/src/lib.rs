pub mod egui_host;
pub mod shell;

pub use egui_host::{display_title, EguiPanelHost};
pub use shell::StudioShell;
