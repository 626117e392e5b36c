//! Narrow interfaces to the docking UI library and the platform file dialogs.
//!
//! The editor core never draws anything itself. Each frame it asks a [`PanelHost`] to show panels
//! and reads back what the host observed: whether the panel is still open, visible, focused, and
//! which node the user clicked. Hosts keep their own layout memory and hand it out as an opaque
//! JSON blob for the project file.

mod headless;

pub use headless::HeadlessHost;

use crate::gizmo::{GizmoMode, GizmoSettings, GizmoSpace};
use crate::project::WindowGeometry;
use crate::session::{HierarchyRow, InspectorView};
use bevy_ecs::prelude::Entity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const HIERARCHY_PANEL: &str = "Hierarchy";
pub const INSPECTOR_PANEL: &str = "Inspector";
pub const RESOURCES_PANEL: &str = "Resources";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockSlot {
    Left,
    Right,
    Top,
    Bottom,
    Tab,
}

/// Where a panel docks the first time it is shown: next to `after`, or against the dock root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockPlacement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    pub slot: DockSlot,
}

impl DockPlacement {
    pub fn next_to(after: impl Into<String>, slot: DockSlot) -> Self {
        Self { after: Some(after.into()), slot }
    }

    pub fn root(slot: DockSlot) -> Self {
        Self { after: None, slot }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy)]
pub enum PanelBody<'a> {
    Empty,
    Viewport,
    Hierarchy(&'a [HierarchyRow]),
    Inspector(&'a InspectorView),
}

#[derive(Debug, Clone, Copy)]
pub struct PanelRequest<'a> {
    /// Unique panel key; text after `###` is an id suffix hosts should not display.
    pub key: &'a str,
    pub placement: &'a DockPlacement,
    pub closable: bool,
    pub body: PanelBody<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelInteraction {
    NodeClicked { node: Entity, additive: bool },
}

/// What the host observed for one panel this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelState {
    pub open: bool,
    pub visible: bool,
    pub focused: bool,
    pub rect: Option<PanelRect>,
    pub interaction: Option<PanelInteraction>,
}

impl PanelState {
    pub fn hidden() -> Self {
        Self { open: true, visible: false, focused: false, rect: None, interaction: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuCommand {
    SaveProject,
    SaveProjectAs,
    OpenProject,
    NewScene,
    Exit,
    SetGizmoMode(GizmoMode),
    SetGizmoSpace(GizmoSpace),
    ToggleGizmoSnap,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Toolbar {
    pub active: Option<ToolbarSession>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarSession {
    pub title: String,
    pub gizmo: GizmoSettings,
}

#[derive(Debug, Clone, Copy)]
pub struct FileFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

pub const PROJECT_FILTER: FileFilter = FileFilter { name: "Project Files", extensions: &["project"] };

pub trait PanelHost {
    fn set_dock_region(&mut self, region: PanelRect);
    fn show_panel(&mut self, request: PanelRequest<'_>) -> PanelState;
    fn main_menu(&mut self, toolbar: &Toolbar) -> Vec<MenuCommand>;
    /// Returns the resource the user opened this frame, if any.
    fn resource_browser(&mut self, placement: &DockPlacement) -> Option<PathBuf>;
    fn save_dock_layout(&self) -> serde_json::Value;
    fn load_dock_layout(&mut self, layout: &serde_json::Value);
    fn window_geometry(&self) -> WindowGeometry;
    fn set_window_geometry(&mut self, geometry: WindowGeometry);
}

/// Synchronous file pickers. `None` means the user cancelled.
pub trait FileDialogs {
    fn pick_open_file(&mut self, title: &str, filter: &FileFilter) -> Option<PathBuf>;
    fn pick_save_file(&mut self, title: &str, filter: &FileFilter) -> Option<PathBuf>;
}

/// Dialog stand-in that always cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDialogs;

impl FileDialogs for NoDialogs {
    fn pick_open_file(&mut self, _title: &str, _filter: &FileFilter) -> Option<PathBuf> {
        None
    }

    fn pick_save_file(&mut self, _title: &str, _filter: &FileFilter) -> Option<PathBuf> {
        None
    }
}
