use egui::{Context, Id, Pos2, Rect, Vec2};
use scene_tabs::gizmo::GizmoMode;
use scene_tabs::host::{
    DockPlacement, DockSlot, FileDialogs, FileFilter, MenuCommand, PanelBody, PanelHost, PanelInteraction,
    PanelRect, PanelRequest, PanelState, Toolbar, RESOURCES_PANEL,
};
use scene_tabs::project::WindowGeometry;
use scene_tabs::resources::{ContentType, ResourceRoots};
use scene_tabs::session::{HierarchyRow, InspectorView};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

const SIDE_FRACTION: f32 = 0.2;
const BOTTOM_FRACTION: f32 = 0.25;
const BROWSER_SCAN_DEPTH: usize = 4;

/// Text shown for a panel key; everything from `###` on is an id suffix.
pub fn display_title(key: &str) -> &str {
    key.split_once("###").map_or(key, |(title, _)| title)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredPanel {
    pub open: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl StoredPanel {
    fn rect(&self) -> Rect {
        Rect::from_min_size(Pos2::new(self.x, self.y), Vec2::new(self.width, self.height))
    }

    fn from_rect(open: bool, rect: Rect) -> Self {
        Self { open, x: rect.min.x, y: rect.min.y, width: rect.width(), height: rect.height() }
    }
}

/// Layout blob stored under `docks` in the project file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredLayout {
    #[serde(default)]
    pub panels: BTreeMap<String, StoredPanel>,
}

/// Panel host backed by floating `egui::Window`s, one per panel key.
pub struct EguiPanelHost {
    ctx: Option<Context>,
    region: Rect,
    window: WindowGeometry,
    pending_window: Option<WindowGeometry>,
    rects: HashMap<String, Rect>,
    restored: BTreeMap<String, StoredPanel>,
    focused: Option<String>,
    roots: ResourceRoots,
    browser_entries: Option<Vec<PathBuf>>,
    dialogs: Box<dyn FileDialogs>,
}

impl EguiPanelHost {
    pub fn new(roots: ResourceRoots, dialogs: Box<dyn FileDialogs>) -> Self {
        Self {
            ctx: None,
            region: Rect::from_min_size(Pos2::ZERO, Vec2::new(1280.0, 720.0)),
            window: WindowGeometry::default(),
            pending_window: None,
            rects: HashMap::new(),
            restored: BTreeMap::new(),
            focused: None,
            roots,
            browser_entries: None,
            dialogs,
        }
    }

    /// Must be called before the editor runs its frame.
    pub fn begin_frame(&mut self, ctx: &Context) {
        if let Some(geometry) = self.pending_window.take() {
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(Vec2::new(
                geometry.width as f32,
                geometry.height as f32,
            )));
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(Pos2::new(
                geometry.x as f32,
                geometry.y as f32,
            )));
            self.window = geometry;
        } else {
            let (inner, outer) = ctx.input(|i| (i.viewport().inner_rect, i.viewport().outer_rect));
            if let Some(inner) = inner {
                self.window.width = inner.width().round() as u32;
                self.window.height = inner.height().round() as u32;
            }
            if let Some(outer) = outer {
                self.window.x = outer.min.x.round() as i32;
                self.window.y = outer.min.y.round() as i32;
            }
        }
        self.ctx = Some(ctx.clone());
    }

    pub fn end_frame(&mut self) {
        self.ctx = None;
    }

    pub fn rescan_resources(&mut self) {
        self.browser_entries = None;
    }

    fn default_rect(&self, placement: &DockPlacement) -> Rect {
        let anchor = placement.after.as_ref().and_then(|key| self.rects.get(key)).copied().unwrap_or(self.region);
        let side = (anchor.width() * SIDE_FRACTION).max(160.0);
        let bottom = (anchor.height() * BOTTOM_FRACTION).max(120.0);
        match placement.slot {
            DockSlot::Left => Rect::from_min_size(anchor.min, Vec2::new(side, anchor.height())),
            DockSlot::Right if placement.after.is_some() => {
                Rect::from_min_size(Pos2::new(anchor.max.x, anchor.min.y), Vec2::new(side, anchor.height()))
            }
            DockSlot::Right => {
                Rect::from_min_size(Pos2::new(anchor.max.x - side, anchor.min.y), Vec2::new(side, anchor.height()))
            }
            DockSlot::Top => Rect::from_min_size(anchor.min, Vec2::new(anchor.width(), bottom)),
            DockSlot::Bottom if placement.after.is_some() => {
                Rect::from_min_size(Pos2::new(anchor.min.x, anchor.max.y), Vec2::new(anchor.width(), bottom))
            }
            DockSlot::Bottom => Rect::from_min_size(
                Pos2::new(anchor.min.x, anchor.max.y - bottom),
                Vec2::new(anchor.width(), bottom),
            ),
            DockSlot::Tab if placement.after.is_some() => anchor.translate(Vec2::splat(24.0)),
            DockSlot::Tab => anchor.shrink2(Vec2::new(side, bottom * 0.5)),
        }
    }

    fn scan_resources(&self) -> Vec<PathBuf> {
        let mut entries = Vec::new();
        for root in self.roots.roots() {
            collect_files(root, Path::new(""), BROWSER_SCAN_DEPTH, &mut entries);
        }
        entries.sort();
        entries.dedup();
        entries
    }
}

fn collect_files(root: &Path, relative: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    let Ok(dir) = fs::read_dir(root.join(relative)) else {
        return;
    };
    for entry in dir.flatten() {
        let name = relative.join(entry.file_name());
        match entry.file_type() {
            Ok(kind) if kind.is_dir() && depth > 0 => collect_files(root, &name, depth - 1, out),
            Ok(kind) if kind.is_file() => out.push(name),
            _ => {}
        }
    }
}

impl PanelHost for EguiPanelHost {
    fn set_dock_region(&mut self, region: PanelRect) {
        self.region =
            Rect::from_min_size(Pos2::new(region.x, region.y), Vec2::new(region.width, region.height));
    }

    fn show_panel(&mut self, request: PanelRequest<'_>) -> PanelState {
        let Some(ctx) = self.ctx.clone() else {
            return PanelState::hidden();
        };
        let restored = self.restored.remove(request.key);
        if restored.is_some_and(|stored| !stored.open) && request.closable {
            return PanelState { open: false, visible: false, focused: false, rect: None, interaction: None };
        }
        let mut open = true;
        let mut window = egui::Window::new(display_title(request.key))
            .id(Id::new(request.key))
            .default_rect(self.default_rect(request.placement))
            .constrain_to(self.region);
        if let Some(stored) = restored {
            window = window.current_pos(stored.rect().min).default_size(stored.rect().size());
        }
        if request.closable {
            window = window.open(&mut open);
        }
        let mut interaction = None;
        let shown = window.show(&ctx, |ui| match request.body {
            PanelBody::Empty => {
                ui.weak("Nothing to show");
            }
            PanelBody::Viewport => {
                let size = ui.available_size();
                ui.allocate_exact_size(size, egui::Sense::click());
            }
            PanelBody::Hierarchy(rows) => interaction = hierarchy_ui(ui, rows),
            PanelBody::Inspector(view) => inspector_ui(ui, view),
        });
        let Some(inner) = shown.filter(|_| open) else {
            self.rects.remove(request.key);
            return PanelState { open, visible: false, focused: false, rect: None, interaction: None };
        };
        let rect = inner.response.rect;
        self.rects.insert(request.key.to_string(), rect);
        if ctx.input(|i| i.pointer.any_pressed()) && inner.response.contains_pointer() {
            self.focused = Some(request.key.to_string());
        }
        let visible = open && inner.inner.is_some();
        PanelState {
            open,
            visible,
            focused: visible && self.focused.as_deref() == Some(request.key),
            rect: Some(PanelRect { x: rect.min.x, y: rect.min.y, width: rect.width(), height: rect.height() }),
            interaction,
        }
    }

    fn main_menu(&mut self, toolbar: &Toolbar) -> Vec<MenuCommand> {
        let Some(ctx) = self.ctx.clone() else {
            return Vec::new();
        };
        let mut commands = Vec::new();
        egui::TopBottomPanel::top("scene_tabs_main_menu").show(&ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    for (label, command) in [
                        ("New Scene", MenuCommand::NewScene),
                        ("Open Project...", MenuCommand::OpenProject),
                        ("Save Project", MenuCommand::SaveProject),
                        ("Save Project As...", MenuCommand::SaveProjectAs),
                        ("Exit", MenuCommand::Exit),
                    ] {
                        if ui.button(label).clicked() {
                            commands.push(command);
                            ui.close();
                        }
                    }
                });
                ui.separator();
                if ui.button("Save").clicked() {
                    commands.push(MenuCommand::SaveProject);
                }
                let Some(active) = &toolbar.active else {
                    return;
                };
                ui.separator();
                for mode in GizmoMode::ALL {
                    if ui.selectable_label(active.gizmo.mode == mode, mode.label()).clicked() {
                        commands.push(MenuCommand::SetGizmoMode(mode));
                    }
                }
                let space = active.gizmo.space;
                if ui.button(space.label()).clicked() {
                    commands.push(MenuCommand::SetGizmoSpace(space.toggled()));
                }
                let snap_label = match active.gizmo.snap_increment() {
                    Some(step) => format!("Snap {step}"),
                    None => "Snap".to_string(),
                };
                if ui.selectable_label(active.gizmo.snap, snap_label).clicked() {
                    commands.push(MenuCommand::ToggleGizmoSnap);
                }
                ui.separator();
                ui.label(&active.title);
            });
        });
        commands
    }

    fn resource_browser(&mut self, placement: &DockPlacement) -> Option<PathBuf> {
        let ctx = self.ctx.clone()?;
        if self.browser_entries.is_none() {
            self.browser_entries = Some(self.scan_resources());
        }
        let entries = self.browser_entries.clone().unwrap_or_default();
        let mut picked = None;
        let mut rescan = false;
        let shown = egui::Window::new(RESOURCES_PANEL)
            .id(Id::new(RESOURCES_PANEL))
            .default_rect(self.default_rect(placement))
            .constrain_to(self.region)
            .show(&ctx, |ui| {
                if ui.button("Refresh").clicked() {
                    rescan = true;
                }
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for entry in &entries {
                        let label = entry.display().to_string();
                        let response = match ContentType::from_path(entry) {
                            ContentType::Scene | ContentType::Project => ui.selectable_label(false, label),
                            _ => ui.weak(label),
                        };
                        if response.double_clicked() {
                            picked = Some(entry.clone());
                        }
                    }
                });
            });
        if let Some(inner) = shown {
            self.rects.insert(RESOURCES_PANEL.to_string(), inner.response.rect);
        }
        if rescan {
            self.rescan_resources();
        }
        picked
    }

    fn save_dock_layout(&self) -> serde_json::Value {
        let panels = self.rects.iter().map(|(key, rect)| (key.clone(), StoredPanel::from_rect(true, *rect))).collect();
        serde_json::to_value(StoredLayout { panels }).unwrap_or_default()
    }

    fn load_dock_layout(&mut self, layout: &serde_json::Value) {
        if layout.is_null() {
            return;
        }
        match serde_json::from_value::<StoredLayout>(layout.clone()) {
            Ok(parsed) => self.restored = parsed.panels,
            Err(err) => log::warn!("[host] Ignoring unreadable dock layout: {err}"),
        }
    }

    fn window_geometry(&self) -> WindowGeometry {
        self.window
    }

    fn set_window_geometry(&mut self, geometry: WindowGeometry) {
        if geometry.width == 0 || geometry.height == 0 {
            return;
        }
        self.pending_window = Some(geometry);
    }
}

impl FileDialogs for EguiPanelHost {
    fn pick_open_file(&mut self, title: &str, filter: &FileFilter) -> Option<PathBuf> {
        self.dialogs.pick_open_file(title, filter)
    }

    fn pick_save_file(&mut self, title: &str, filter: &FileFilter) -> Option<PathBuf> {
        self.dialogs.pick_save_file(title, filter)
    }
}

fn hierarchy_ui(ui: &mut egui::Ui, rows: &[HierarchyRow]) -> Option<PanelInteraction> {
    let mut clicked = None;
    egui::ScrollArea::vertical().show(ui, |ui| {
        for row in rows {
            ui.horizontal(|ui| {
                ui.add_space(row.depth as f32 * 12.0);
                if ui.selectable_label(row.selected, &row.label).clicked() {
                    let additive = ui.input(|i| i.modifiers.command || i.modifiers.shift);
                    clicked = Some(PanelInteraction::NodeClicked { node: row.node, additive });
                }
            });
        }
    });
    clicked
}

fn inspector_ui(ui: &mut egui::Ui, view: &InspectorView) {
    if view.nodes.is_empty() {
        ui.weak("No selection");
        return;
    }
    for node in &view.nodes {
        ui.heading(&node.name);
        let t = node.transform.translation;
        let s = node.transform.scale;
        let (axis, angle) = node.transform.rotation.to_axis_angle();
        ui.label(format!("Translation {:.3} {:.3} {:.3}", t.x, t.y, t.z));
        ui.label(format!("Rotation {:.1}° about ({:.2}, {:.2}, {:.2})", angle.to_degrees(), axis.x, axis.y, axis.z));
        ui.label(format!("Scale {:.3} {:.3} {:.3}", s.x, s.y, s.z));
        ui.separator();
    }
}
