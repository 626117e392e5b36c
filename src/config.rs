use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_title")]
    pub title: String,
    #[serde(default = "WindowConfig::default_width")]
    pub width: u32,
    #[serde(default = "WindowConfig::default_height")]
    pub height: u32,
    #[serde(default = "WindowConfig::default_resizable")]
    pub resizable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default = "ResourceConfig::default_prefix_paths")]
    pub prefix_paths: Vec<PathBuf>,
    #[serde(default = "ResourceConfig::default_paths")]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Title given to new scene sessions.
    #[serde(default = "SessionConfig::default_scene_title")]
    pub scene_title: String,
    /// Panel the first scene session docks next to.
    #[serde(default = "SessionConfig::default_first_dock_anchor")]
    pub first_dock_anchor: String,
    /// Height reserved for the main menu bar above the dock region.
    #[serde(default = "SessionConfig::default_menu_bar_height")]
    pub menu_bar_height: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub resources: ResourceConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default = "EditorConfig::default_project")]
    pub default_project: PathBuf,
    #[serde(default = "EditorConfig::default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Default)]
pub struct EditorConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub project: Option<PathBuf>,
}

impl WindowConfig {
    fn default_title() -> String {
        "Scene Tabs".to_string()
    }

    const fn default_width() -> u32 {
        1920
    }

    const fn default_height() -> u32 {
        1080
    }

    const fn default_resizable() -> bool {
        true
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            width: Self::default_width(),
            height: Self::default_height(),
            resizable: Self::default_resizable(),
        }
    }
}

impl ResourceConfig {
    fn default_prefix_paths() -> Vec<PathBuf> {
        vec![PathBuf::from("."), PathBuf::from(".."), PathBuf::from("../share/SceneTabs/Resources")]
    }

    fn default_paths() -> Vec<PathBuf> {
        vec![PathBuf::from("CoreData"), PathBuf::from("Data"), PathBuf::from("EditorData")]
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self { prefix_paths: Self::default_prefix_paths(), paths: Self::default_paths() }
    }
}

impl SessionConfig {
    fn default_scene_title() -> String {
        "Scene".to_string()
    }

    fn default_first_dock_anchor() -> String {
        "Hierarchy".to_string()
    }

    const fn default_menu_bar_height() -> f32 {
        20.0
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scene_title: Self::default_scene_title(),
            first_dock_anchor: Self::default_first_dock_anchor(),
            menu_bar_height: Self::default_menu_bar_height(),
        }
    }
}

impl EditorConfig {
    fn default_project() -> PathBuf {
        PathBuf::from("Etc/DefaultEditorProject.project")
    }

    fn default_log_level() -> String {
        "debug".to_string()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &EditorConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(project) = &overrides.project {
            self.default_project = project.clone();
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            resources: ResourceConfig::default(),
            sessions: SessionConfig::default(),
            default_project: Self::default_project(),
            log_level: Self::default_log_level(),
        }
    }
}

impl EditorConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.project.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.width.is_some() {
            fields.push("width");
        }
        if self.height.is_some() {
            fields.push("height");
        }
        if self.project.is_some() {
            fields.push("project");
        }
        fields
    }
}
