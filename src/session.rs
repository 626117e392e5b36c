use crate::events::{EditorEvent, EventBus};
use crate::gizmo::{GizmoMode, GizmoSettings, GizmoSpace};
use crate::host::{
    DockPlacement, PanelBody, PanelHost, PanelInteraction, PanelRect, PanelRequest, ToolbarSession,
};
use crate::id_pool::{IdPool, SessionId};
use crate::resources::ResourceRoots;
use crate::scene::{EditorGrid, EditorScene, QuatData, SceneError, Transform, Vec3Data};
use crate::selection::Selection;
use bevy_ecs::prelude::Entity;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SCENE_TITLE: &str = "Scene";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("scene session id {0} is already taken")]
    IdentityConflict(SessionId),
    #[error("scene session {0} has no file path to save to")]
    NoDestination(SessionId),
    #[error("scene session {session}: {source}")]
    Scene {
        session: SessionId,
        #[source]
        source: SceneError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3Data,
    pub rotation: QuatData,
    pub move_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, -10.0).into(),
            rotation: Quat::IDENTITY.into(),
            move_speed: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub visible: bool,
    pub cell_size: f32,
    pub cells: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self { visible: true, cell_size: 1.0, cells: 64 }
    }
}

/// Post-process settings of the scene viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsSettings {
    pub enabled: bool,
    pub exposure: f32,
    pub bloom: bool,
    pub bloom_intensity: f32,
    pub ambient_occlusion: bool,
}

impl Default for EffectsSettings {
    fn default() -> Self {
        Self { enabled: true, exposure: 1.0, bloom: false, bloom_intensity: 0.5, ambient_occlusion: false }
    }
}

/// Per-session editor settings stored in the project file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub camera: CameraSettings,
    pub grid: GridSettings,
    pub gizmo: GizmoSettings,
    pub effects: EffectsSettings,
}

/// Serialized form of one session inside the project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SessionId>,
    #[serde(default = "SessionBlock::default_title")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub settings: SceneSettings,
}

impl SessionBlock {
    fn default_title() -> String {
        DEFAULT_SCENE_TITLE.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyRow {
    pub node: Entity,
    pub label: String,
    pub depth: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectorNode {
    pub node: Entity,
    pub name: String,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectorView {
    pub session: SessionId,
    pub nodes: Vec<InspectorNode>,
}

/// One open scene document ("tab").
pub struct SceneSession {
    id: SessionId,
    title: String,
    unique_title: String,
    path: Option<PathBuf>,
    scene: EditorScene,
    settings: SceneSettings,
    selection: Selection,
    placement: DockPlacement,
    viewport: Option<PanelRect>,
    rendered: bool,
    active: bool,
    events: EventBus,
}

impl SceneSession {
    pub fn new(id: SessionId, title: impl Into<String>, placement: DockPlacement) -> Self {
        let title = title.into();
        let mut session = Self {
            id,
            unique_title: unique_title(&title, id),
            title,
            path: None,
            scene: EditorScene::new(),
            settings: SceneSettings::default(),
            selection: Selection::default(),
            placement,
            viewport: None,
            rendered: false,
            active: false,
            events: EventBus::default(),
        };
        session.create_empty();
        session
    }

    /// Rebuilds a session from its project block, claiming the persisted id in `pool`.
    ///
    /// Fails without side effects on `pool` when the id is already held. A missing scene file is
    /// logged and leaves the session empty, keeping the remembered path.
    pub fn restore(
        block: &SessionBlock,
        pool: &mut IdPool,
        placement: DockPlacement,
        resources: &ResourceRoots,
    ) -> Result<Self, SessionError> {
        let id = match block.id {
            Some(id) => {
                if !pool.reserve(id) {
                    return Err(SessionError::IdentityConflict(id));
                }
                id
            }
            None => pool.allocate(),
        };
        let mut session = Self::new(id, block.title.clone(), placement);
        session.settings = block.settings.clone();
        if let Some(path) = &block.path {
            // load_scene already logged the failure
            let _ = session.load_scene(path, resources);
            session.path = Some(path.clone());
        }
        session.set_title(block.title.clone());
        session.apply_settings();
        session.events.drain();
        Ok(session)
    }

    /// Empty scene plus the editor helpers.
    pub fn create_empty(&mut self) {
        self.scene = EditorScene::new();
        if self.selection.clear() {
            self.notify_selection_changed();
        }
        self.apply_settings();
    }

    pub fn load_scene(&mut self, path: &Path, resources: &ResourceRoots) -> Result<(), SessionError> {
        let resolved = resources.resolve(path).unwrap_or_else(|| path.to_path_buf());
        let scene = match EditorScene::load(&resolved) {
            Ok(scene) => scene,
            Err(source) => {
                log::error!("[session] Loading scene {} failed: {source}", resolved.display());
                return Err(SessionError::Scene { session: self.id, source });
            }
        };
        self.scene = scene;
        if self.selection.clear() {
            self.notify_selection_changed();
        }
        self.apply_settings();
        self.path = Some(path.to_path_buf());
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            self.set_title(stem);
        }
        self.events.push(EditorEvent::SceneLoaded { session: self.id, path: resolved });
        Ok(())
    }

    /// Saves to `path`, or to the last used path when `path` is `None`.
    pub fn save_scene(&mut self, path: Option<&Path>, resources: &ResourceRoots) -> Result<PathBuf, SessionError> {
        let Some(target) = path.or(self.path.as_deref()).map(Path::to_path_buf) else {
            return Err(SessionError::NoDestination(self.id));
        };
        let resolved = resources.resolve_for_write(&target);
        if let Err(source) = self.scene.save(&resolved) {
            log::error!("[session] Saving scene to {} failed: {source}", resolved.display());
            return Err(SessionError::Scene { session: self.id, source });
        }
        self.path = Some(target);
        self.events.push(EditorEvent::SceneSaved { session: self.id, path: resolved.clone() });
        Ok(resolved)
    }

    /// Shows the session panel for this frame. Returns `false` once the host reports it closed.
    pub fn render_frame<H: PanelHost + ?Sized>(&mut self, host: &mut H) -> bool {
        self.selection.prune(&self.scene);
        let state = host.show_panel(PanelRequest {
            key: &self.unique_title,
            placement: &self.placement,
            closable: true,
            body: PanelBody::Viewport,
        });
        self.rendered = state.open && state.visible;
        self.active = self.rendered && state.focused;
        if let Some(rect) = state.rect {
            self.viewport = Some(rect);
        }
        if let Some(PanelInteraction::NodeClicked { node, additive }) = state.interaction {
            self.click_node(node, additive);
        }
        state.open
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn select(&mut self, node: Entity) -> bool {
        if !self.scene.contains(node) || !self.selection.insert(node) {
            return false;
        }
        self.notify_selection_changed();
        true
    }

    pub fn unselect(&mut self, node: Entity) -> bool {
        if !self.selection.remove(node) {
            return false;
        }
        self.notify_selection_changed();
        true
    }

    pub fn toggle_selection(&mut self, node: Entity) -> bool {
        if self.is_selected(node) {
            self.unselect(node)
        } else {
            self.select(node)
        }
    }

    pub fn unselect_all(&mut self) -> bool {
        if !self.selection.clear() {
            return false;
        }
        self.notify_selection_changed();
        true
    }

    pub fn is_selected(&self, node: Entity) -> bool {
        self.selection.contains(node) && self.scene.contains(node)
    }

    /// Live selected nodes, in selection order.
    pub fn selection(&self) -> impl Iterator<Item = Entity> + '_ {
        self.selection.iter_live(&self.scene)
    }

    /// Hierarchy/viewport click: plain clicks replace the selection, additive clicks toggle.
    pub fn click_node(&mut self, node: Entity, additive: bool) {
        if additive {
            self.toggle_selection(node);
            return;
        }
        if !self.scene.contains(node) {
            self.unselect_all();
            return;
        }
        let already_only = self.selection.len() == 1 && self.selection.contains(node);
        if !already_only {
            self.selection.clear();
            self.selection.insert(node);
            self.notify_selection_changed();
        }
    }

    pub fn serialize(&self) -> SessionBlock {
        let mut settings = self.settings.clone();
        let camera = self.scene.camera_transform();
        settings.camera.position = camera.translation.into();
        settings.camera.rotation = camera.rotation.into();
        if let Some(grid) = self.scene.grid() {
            settings.grid = GridSettings { visible: grid.visible, cell_size: grid.cell_size, cells: grid.cells };
        }
        SessionBlock { id: Some(self.id), title: self.title.clone(), path: self.path.clone(), settings }
    }

    pub fn hierarchy_rows(&self) -> Vec<HierarchyRow> {
        self.scene
            .ordered_nodes()
            .into_iter()
            .map(|(node, depth)| HierarchyRow {
                node,
                label: self.scene.node_name(node).unwrap_or("<unnamed>").to_string(),
                depth,
                selected: self.selection.contains(node),
            })
            .collect()
    }

    pub fn inspector_view(&self) -> InspectorView {
        let nodes = self
            .selection()
            .map(|node| InspectorNode {
                node,
                name: self.scene.node_name(node).unwrap_or("<unnamed>").to_string(),
                transform: self.scene.transform(node).unwrap_or_default(),
            })
            .collect();
        InspectorView { session: self.id, nodes }
    }

    pub fn toolbar_session(&self) -> ToolbarSession {
        ToolbarSession { title: self.title.clone(), gizmo: self.settings.gizmo }
    }

    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) {
        self.settings.gizmo.mode = mode;
    }

    pub fn set_gizmo_space(&mut self, space: GizmoSpace) {
        self.settings.gizmo.space = space;
    }

    pub fn toggle_gizmo_snap(&mut self) {
        self.settings.gizmo.snap = !self.settings.gizmo.snap;
    }

    pub fn gizmo(&self) -> GizmoSettings {
        self.settings.gizmo
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.unique_title = unique_title(&self.title, self.id);
    }

    /// Title plus id; used as the panel key so equal titles never collide in the host.
    pub fn unique_title(&self) -> &str {
        &self.unique_title
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Forgets the scene path so the next save has to pick a destination.
    pub fn clear_cached_paths(&mut self) {
        self.path = None;
    }

    pub fn scene(&self) -> &EditorScene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut EditorScene {
        &mut self.scene
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn effects_mut(&mut self) -> &mut EffectsSettings {
        &mut self.settings.effects
    }

    pub fn placement(&self) -> &DockPlacement {
        &self.placement
    }

    pub fn viewport(&self) -> Option<PanelRect> {
        self.viewport
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain()
    }

    fn apply_settings(&mut self) {
        let camera = &self.settings.camera;
        self.scene.set_camera_transform(Transform {
            translation: camera.position.into(),
            rotation: camera.rotation.into(),
            scale: Vec3::ONE,
        });
        let grid = &self.settings.grid;
        self.scene.set_grid(EditorGrid { visible: grid.visible, cell_size: grid.cell_size, cells: grid.cells });
    }

    fn notify_selection_changed(&mut self) {
        self.events.push(EditorEvent::SelectionChanged { session: self.id });
    }
}

fn unique_title(title: &str, id: SessionId) -> String {
    format!("{title}###{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{DockSlot, HeadlessHost};
    use tempfile::tempdir;

    fn session(id: u32) -> SceneSession {
        SceneSession::new(SessionId::new(id), DEFAULT_SCENE_TITLE, DockPlacement::root(DockSlot::Tab))
    }

    fn selection_events(session: &mut SceneSession) -> usize {
        session.drain_events().iter().filter(|e| matches!(e, EditorEvent::SelectionChanged { .. })).count()
    }

    #[test]
    fn selection_is_idempotent() {
        let mut session = session(1);
        let a = session.scene_mut().spawn_node("A", None);
        let b = session.scene_mut().spawn_node("B", None);

        assert!(session.select(a));
        assert!(!session.select(a));
        assert_eq!(session.selection().collect::<Vec<_>>(), vec![a]);
        assert_eq!(selection_events(&mut session), 1, "redundant select must not notify");

        assert!(!session.unselect(b));
        assert!(session.toggle_selection(b));
        assert!(session.unselect_all());
        assert!(!session.is_selected(a));
        assert!(!session.is_selected(b));
        assert!(!session.unselect_all());
        assert_eq!(selection_events(&mut session), 2);
    }

    #[test]
    fn deleted_nodes_drop_out_of_selection() {
        let mut session = session(1);
        let a = session.scene_mut().spawn_node("A", None);
        let b = session.scene_mut().spawn_node("B", None);
        session.select(a);
        session.select(b);
        session.scene_mut().remove_node(a);
        assert!(!session.is_selected(a));
        assert_eq!(session.selection().collect::<Vec<_>>(), vec![b]);
        assert_eq!(session.inspector_view().nodes.len(), 1);
    }

    #[test]
    fn editor_helpers_cannot_be_selected() {
        let mut session = session(1);
        let camera = session.scene().camera();
        assert!(!session.select(camera));
        assert_eq!(session.selection().count(), 0);
    }

    #[test]
    fn unique_title_tracks_title_and_id() {
        let mut session = session(7);
        assert_eq!(session.unique_title(), "Scene###7");
        session.set_title("Level");
        assert_eq!(session.unique_title(), "Level###7");
    }

    #[test]
    fn save_without_destination_is_reported() {
        let mut session = session(3);
        let err = session.save_scene(None, &ResourceRoots::default()).unwrap_err();
        assert!(matches!(err, SessionError::NoDestination(id) if id.get() == 3));
    }

    #[test]
    fn failed_load_keeps_previous_scene() {
        let dir = tempdir().expect("tempdir");
        let good = dir.path().join("good.scene");
        let mut session = session(1);
        let node = session.scene_mut().spawn_node("Keep", None);
        session.select(node);
        session.save_scene(Some(&good), &ResourceRoots::default()).expect("save scene");

        let broken = dir.path().join("broken.scene");
        std::fs::write(&broken, "{ not json").expect("write broken scene");
        assert!(session.load_scene(&broken, &ResourceRoots::default()).is_err());
        assert!(session.load_scene(&dir.path().join("missing.scene"), &ResourceRoots::default()).is_err());

        assert_eq!(session.path(), Some(good.as_path()));
        assert!(session.is_selected(node));
        assert_eq!(session.scene().node_count(), 1);
    }

    #[test]
    fn load_replaces_scene_and_titles_after_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("Courtyard.scene");
        let mut source = session(1);
        source.scene_mut().spawn_node("Fountain", None);
        source.save_scene(Some(&path), &ResourceRoots::default()).expect("save scene");

        let mut session = session(2);
        session.load_scene(&path, &ResourceRoots::default()).expect("load scene");
        assert_eq!(session.title(), "Courtyard");
        assert_eq!(session.unique_title(), "Courtyard###2");
        assert_eq!(session.hierarchy_rows().len(), 1);
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, EditorEvent::SceneLoaded { session, .. } if session.get() == 2)));
    }

    #[test]
    fn render_frame_reflects_host_state() {
        let mut host = HeadlessHost::default();
        let mut session = session(4);
        assert!(session.render_frame(&mut host));
        assert!(session.is_rendered());
        assert!(!session.is_active());

        host.focus("Scene###4");
        assert!(session.render_frame(&mut host));
        assert!(session.is_active());

        host.set_visible("Scene###4", false);
        assert!(session.render_frame(&mut host));
        assert!(!session.is_rendered());
        assert!(!session.is_active(), "hidden panels are never active");

        host.close("Scene###4");
        assert!(!session.render_frame(&mut host));
    }

    #[test]
    fn restore_reserves_the_persisted_id() {
        let mut pool = IdPool::new();
        let block = SessionBlock {
            id: Some(SessionId::new(5)),
            title: "Scene".to_string(),
            path: None,
            settings: SceneSettings::default(),
        };
        let placement = DockPlacement::root(DockSlot::Tab);
        let restored = SceneSession::restore(&block, &mut pool, placement.clone(), &ResourceRoots::default())
            .expect("first restore");
        assert_eq!(restored.id().get(), 5);
        assert!(pool.is_held(SessionId::new(5)));

        let err = SceneSession::restore(&block, &mut pool, placement, &ResourceRoots::default())
            .err()
            .expect("second restore conflicts");
        assert!(matches!(err, SessionError::IdentityConflict(id) if id.get() == 5));
    }

    #[test]
    fn serialize_captures_settings() {
        let mut session = session(2);
        session.set_gizmo_mode(GizmoMode::Rotate);
        session.toggle_gizmo_snap();
        let block = session.serialize();
        assert_eq!(block.id, Some(SessionId::new(2)));
        assert_eq!(block.settings.gizmo.mode, GizmoMode::Rotate);
        assert!(block.settings.gizmo.snap);
        assert_eq!(block.settings.camera, CameraSettings::default());
    }

    #[test]
    fn effects_persist_and_default_for_older_blocks() {
        let mut session = session(3);
        session.effects_mut().bloom = true;
        session.effects_mut().exposure = 1.5;
        let block = session.serialize();
        assert!(block.settings.effects.bloom);

        let mut pool = IdPool::new();
        let placement = DockPlacement::root(DockSlot::Tab);
        let restored = SceneSession::restore(&block, &mut pool, placement, &ResourceRoots::default())
            .expect("restore");
        assert_eq!(restored.settings().effects.exposure, 1.5);

        let old: SessionBlock =
            serde_json::from_str(r#"{"id": 4, "settings": {"grid": {"visible": false}}}"#).expect("older block");
        assert_eq!(old.settings.effects, EffectsSettings::default());
        assert!(!old.settings.grid.visible);
    }
}
