use super::{
    DockPlacement, FileDialogs, FileFilter, MenuCommand, PanelBody, PanelHost, PanelInteraction, PanelRect,
    PanelRequest, PanelState, Toolbar,
};
use crate::project::WindowGeometry;
use crate::session::{HierarchyRow, InspectorView};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy)]
struct ScriptedPanel {
    open: bool,
    visible: bool,
    focused: bool,
}

impl Default for ScriptedPanel {
    fn default() -> Self {
        Self { open: true, visible: true, focused: false }
    }
}

/// Scripted panel host without a UI.
///
/// Every panel is open and visible unless told otherwise; focus, hiding and closing are set per
/// panel key. Menu commands, browser picks, node clicks and dialog answers are queued up front and
/// consumed by the next frame that asks for them.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    panels: BTreeMap<String, ScriptedPanel>,
    layout: BTreeMap<String, DockPlacement>,
    region: Option<PanelRect>,
    window: WindowGeometry,
    commands: Vec<MenuCommand>,
    resources: VecDeque<PathBuf>,
    clicks: BTreeMap<String, PanelInteraction>,
    open_answers: VecDeque<PathBuf>,
    save_answers: VecDeque<PathBuf>,
    shown: Vec<String>,
    toolbar: Toolbar,
    hierarchy: Vec<HierarchyRow>,
    inspector: Option<InspectorView>,
}

impl HeadlessHost {
    pub fn new(window: WindowGeometry) -> Self {
        Self { window, ..Self::default() }
    }

    pub fn focus(&mut self, key: &str) {
        self.panels.entry(key.to_string()).or_default().focused = true;
    }

    pub fn unfocus(&mut self, key: &str) {
        self.panels.entry(key.to_string()).or_default().focused = false;
    }

    pub fn set_visible(&mut self, key: &str, visible: bool) {
        self.panels.entry(key.to_string()).or_default().visible = visible;
    }

    /// The panel reports itself closed on its next frame.
    pub fn close(&mut self, key: &str) {
        self.panels.entry(key.to_string()).or_default().open = false;
    }

    pub fn queue_command(&mut self, command: MenuCommand) {
        self.commands.push(command);
    }

    pub fn queue_resource(&mut self, path: impl Into<PathBuf>) {
        self.resources.push_back(path.into());
    }

    pub fn queue_interaction(&mut self, key: &str, interaction: PanelInteraction) {
        self.clicks.insert(key.to_string(), interaction);
    }

    pub fn answer_open(&mut self, path: impl Into<PathBuf>) {
        self.open_answers.push_back(path.into());
    }

    pub fn answer_save(&mut self, path: impl Into<PathBuf>) {
        self.save_answers.push_back(path.into());
    }

    /// Panel keys shown since the dock region was last set, in call order.
    pub fn shown_panels(&self) -> &[String] {
        &self.shown
    }

    pub fn dock_region(&self) -> Option<PanelRect> {
        self.region
    }

    pub fn placement_of(&self, key: &str) -> Option<&DockPlacement> {
        self.layout.get(key)
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn last_hierarchy(&self) -> &[HierarchyRow] {
        &self.hierarchy
    }

    pub fn last_inspector(&self) -> Option<&InspectorView> {
        self.inspector.as_ref()
    }
}

impl PanelHost for HeadlessHost {
    fn set_dock_region(&mut self, region: PanelRect) {
        self.region = Some(region);
        self.shown.clear();
    }

    fn show_panel(&mut self, request: PanelRequest<'_>) -> PanelState {
        self.shown.push(request.key.to_string());
        self.layout.entry(request.key.to_string()).or_insert_with(|| request.placement.clone());
        let script = self.panels.get(request.key).copied().unwrap_or_default();
        if request.closable && !script.open {
            // a closed panel forgets its script so a later panel reusing the key starts fresh
            self.panels.remove(request.key);
            self.layout.remove(request.key);
            return PanelState { open: false, visible: false, focused: false, rect: None, interaction: None };
        }
        match request.body {
            PanelBody::Hierarchy(rows) => self.hierarchy = rows.to_vec(),
            PanelBody::Inspector(view) => self.inspector = Some(view.clone()),
            PanelBody::Empty => {
                if request.key == super::HIERARCHY_PANEL {
                    self.hierarchy.clear();
                } else if request.key == super::INSPECTOR_PANEL {
                    self.inspector = None;
                }
            }
            PanelBody::Viewport => {}
        }
        let interaction = if script.visible { self.clicks.remove(request.key) } else { None };
        let rect = script.visible.then(|| self.region.unwrap_or_default());
        PanelState {
            open: true,
            visible: script.visible,
            focused: script.visible && script.focused,
            rect,
            interaction,
        }
    }

    fn main_menu(&mut self, toolbar: &Toolbar) -> Vec<MenuCommand> {
        self.toolbar = toolbar.clone();
        std::mem::take(&mut self.commands)
    }

    fn resource_browser(&mut self, placement: &DockPlacement) -> Option<PathBuf> {
        self.shown.push(super::RESOURCES_PANEL.to_string());
        self.layout.entry(super::RESOURCES_PANEL.to_string()).or_insert_with(|| placement.clone());
        self.resources.pop_front()
    }

    fn save_dock_layout(&self) -> serde_json::Value {
        serde_json::to_value(&self.layout).unwrap_or_default()
    }

    fn load_dock_layout(&mut self, layout: &serde_json::Value) {
        if layout.is_null() {
            return;
        }
        match serde_json::from_value::<BTreeMap<String, DockPlacement>>(layout.clone()) {
            Ok(parsed) => self.layout = parsed,
            Err(err) => log::warn!("[host] Ignoring unreadable dock layout: {err}"),
        }
    }

    fn window_geometry(&self) -> WindowGeometry {
        self.window
    }

    fn set_window_geometry(&mut self, geometry: WindowGeometry) {
        self.window = geometry;
    }
}

impl FileDialogs for HeadlessHost {
    fn pick_open_file(&mut self, _title: &str, _filter: &FileFilter) -> Option<PathBuf> {
        self.open_answers.pop_front()
    }

    fn pick_save_file(&mut self, _title: &str, _filter: &FileFilter) -> Option<PathBuf> {
        self.save_answers.pop_front()
    }
}
