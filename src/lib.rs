pub mod cli;
pub mod config;
pub mod editor;
pub mod events;
pub mod gizmo;
pub mod host;
pub mod id_pool;
pub mod project;
pub mod registry;
pub mod resources;
pub mod scene;
pub mod selection;
pub mod session;

pub use editor::Editor;
pub use id_pool::{IdPool, SessionId};
pub use registry::SessionRegistry;
pub use session::SceneSession;
