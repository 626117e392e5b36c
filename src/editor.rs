use crate::config::EditorConfig;
use crate::events::{EditorEvent, EventBus};
use crate::host::{
    DockPlacement, DockSlot, FileDialogs, MenuCommand, PanelBody, PanelHost, PanelInteraction, PanelRect,
    PanelRequest, Toolbar, HIERARCHY_PANEL, INSPECTOR_PANEL, PROJECT_FILTER,
};
use crate::id_pool::SessionId;
use crate::project::{self, ProjectError, ProjectLoad, SaveOutcome, PROJECT_EXTENSION};
use crate::registry::SessionRegistry;
use crate::resources::{ContentType, ResourceRoots};
use crate::session::{InspectorView, SessionError};
use std::path::{Path, PathBuf};

/// Drives the whole editor once per UI frame.
pub struct Editor<H: PanelHost + FileDialogs> {
    config: EditorConfig,
    host: H,
    registry: SessionRegistry,
    resources: ResourceRoots,
    project_path: Option<PathBuf>,
    inspector: Option<InspectorView>,
    pending_project: Option<PathBuf>,
    events: EventBus,
    exit_requested: bool,
}

impl<H: PanelHost + FileDialogs> Editor<H> {
    pub fn new(config: EditorConfig, host: H) -> Self {
        let resources = ResourceRoots::from_config(&config);
        Self::with_resources(config, host, resources)
    }

    pub fn with_resources(config: EditorConfig, host: H, resources: ResourceRoots) -> Self {
        let registry =
            SessionRegistry::new(config.sessions.first_dock_anchor.clone(), config.sessions.scene_title.clone());
        Self {
            config,
            host,
            registry,
            resources,
            project_path: None,
            inspector: None,
            pending_project: None,
            events: EventBus::default(),
            exit_requested: false,
        }
    }

    /// Loads the configured default project. The first restored scene forgets its path so saving
    /// never overwrites the bundled example scene.
    pub fn start(&mut self) -> ProjectLoad {
        let path = self.config.default_project.clone();
        log::info!("[editor] Starting with project {}", path.display());
        let load = self.load_project(&path);
        if let Some(first) = self.registry.sessions_mut().next() {
            first.clear_cached_paths();
        }
        load
    }

    /// Final save of the project to the path it was loaded from or last saved to.
    pub fn stop(&mut self) -> Result<SaveOutcome, ProjectError> {
        log::info!("[editor] Stopping");
        self.save_project()
    }

    pub fn run_frame(&mut self) {
        let window = self.host.window_geometry();
        let menu_height = self.config.sessions.menu_bar_height.max(0.0);
        self.host.set_dock_region(PanelRect {
            x: 0.0,
            y: menu_height,
            width: window.width as f32,
            height: (window.height as f32 - menu_height).max(0.0),
        });

        let toolbar = Toolbar { active: self.registry.active_session().map(|session| session.toolbar_session()) };
        for command in self.host.main_menu(&toolbar) {
            self.handle_command(command);
        }

        self.show_hierarchy();

        let report = self.registry.run_frame(&mut self.host);
        for session in report.closed {
            log::debug!("[editor] Scene session {session} closed");
            self.events.push(EditorEvent::SessionClosed { session });
        }
        if report.active_changed {
            self.events.push(EditorEvent::ActiveSessionChanged { session: report.active });
        }
        self.collect_session_events();

        self.show_inspector();
        self.show_resource_browser();

        if let Some(path) = self.pending_project.take() {
            self.load_project(&path);
        }
    }

    pub fn handle_command(&mut self, command: MenuCommand) {
        log::debug!("[editor] Menu command {command:?}");
        match command {
            MenuCommand::SaveProject => self.save_all(false),
            MenuCommand::SaveProjectAs => self.save_all(true),
            MenuCommand::OpenProject => match self.host.pick_open_file("Open Project", &PROJECT_FILTER) {
                Some(path) => self.pending_project = Some(path),
                None => log::debug!("[editor] Open project cancelled"),
            },
            MenuCommand::NewScene => {
                self.create_session();
            }
            MenuCommand::Exit => self.exit_requested = true,
            MenuCommand::SetGizmoMode(mode) => {
                if let Some(session) = self.registry.active_session_mut() {
                    session.set_gizmo_mode(mode);
                }
            }
            MenuCommand::SetGizmoSpace(space) => {
                if let Some(session) = self.registry.active_session_mut() {
                    session.set_gizmo_space(space);
                }
            }
            MenuCommand::ToggleGizmoSnap => {
                if let Some(session) = self.registry.active_session_mut() {
                    session.toggle_gizmo_snap();
                }
            }
        }
    }

    pub fn create_session(&mut self) -> SessionId {
        let session = self.registry.create_session();
        self.events.push(EditorEvent::SessionOpened { session });
        session
    }

    /// Opens `path` in a new session. The session stays open and empty when the file can't be read.
    pub fn open_scene(&mut self, path: &Path) -> SessionId {
        let id = self.create_session();
        if let Some(session) = self.registry.get_mut(id) {
            // failure already logged; the empty session stays open
            let _ = session.load_scene(path, &self.resources);
        }
        id
    }

    /// Saves the project to the current path. Without a path nothing is written.
    pub fn save_project(&mut self) -> Result<SaveOutcome, ProjectError> {
        let path = self.project_path.clone().unwrap_or_default();
        let outcome = project::save_project(&path, &self.registry, &self.host)?;
        if let SaveOutcome::Saved(path) = &outcome {
            self.events.push(EditorEvent::ProjectSaved { path: path.clone() });
        }
        Ok(outcome)
    }

    pub fn load_project(&mut self, path: &Path) -> ProjectLoad {
        let load = project::load_project(path, &mut self.registry, &mut self.host, &self.resources);
        if let ProjectLoad::Loaded(report) = &load {
            self.project_path = Some(report.path.clone());
            for session in &report.restored {
                self.events.push(EditorEvent::SessionOpened { session: *session });
            }
            self.events.push(EditorEvent::ProjectLoaded { path: report.path.clone(), sessions: report.restored.len() });
            self.inspector = None;
        }
        load
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn set_project_path(&mut self, path: Option<PathBuf>) {
        self.project_path = path;
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn resources(&self) -> &ResourceRoots {
        &self.resources
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SessionRegistry {
        &mut self.registry
    }

    pub fn inspector(&self) -> Option<&InspectorView> {
        self.inspector.as_ref()
    }

    fn save_all(&mut self, save_as: bool) {
        if save_as {
            self.project_path = None;
        }
        if self.project_path.is_none() {
            let Some(mut path) = self.host.pick_save_file("Save Project", &PROJECT_FILTER) else {
                log::debug!("[editor] Save project cancelled");
                return;
            };
            if path.extension().is_none() {
                path.set_extension(PROJECT_EXTENSION);
            }
            self.project_path = Some(path);
        }
        // save_project logs its own failures; scenes are still saved
        let _ = self.save_project();
        for session in self.registry.sessions_mut() {
            match session.save_scene(None, &self.resources) {
                Ok(_) => {}
                Err(SessionError::NoDestination(id)) => {
                    log::debug!("[editor] Scene session {id} has no file yet; not saved");
                }
                Err(_) => {}
            }
        }
    }

    fn show_hierarchy(&mut self) {
        let rows = self.registry.active_session().map(|session| session.hierarchy_rows());
        let placement = DockPlacement::root(DockSlot::Left);
        let state = self.host.show_panel(PanelRequest {
            key: HIERARCHY_PANEL,
            placement: &placement,
            closable: false,
            body: match &rows {
                Some(rows) => PanelBody::Hierarchy(rows),
                None => PanelBody::Empty,
            },
        });
        if let Some(PanelInteraction::NodeClicked { node, additive }) = state.interaction {
            if let Some(session) = self.registry.active_session_mut() {
                session.click_node(node, additive);
            }
        }
    }

    fn show_inspector(&mut self) {
        self.inspector = self.registry.active_session().map(|session| session.inspector_view());
        let placement = match self.registry.active_session() {
            Some(session) => DockPlacement::next_to(session.unique_title(), DockSlot::Right),
            None => DockPlacement::root(DockSlot::Right),
        };
        self.host.show_panel(PanelRequest {
            key: INSPECTOR_PANEL,
            placement: &placement,
            closable: false,
            body: match &self.inspector {
                Some(view) => PanelBody::Inspector(view),
                None => PanelBody::Empty,
            },
        });
    }

    fn show_resource_browser(&mut self) {
        let placement = match self.registry.last_unique_title() {
            Some(title) => DockPlacement::next_to(title, DockSlot::Bottom),
            None => DockPlacement::root(DockSlot::Bottom),
        };
        let Some(picked) = self.host.resource_browser(&placement) else {
            return;
        };
        match ContentType::from_path(&picked) {
            ContentType::Scene => {
                self.open_scene(&picked);
            }
            ContentType::Project => self.pending_project = Some(picked),
            other => log::debug!("[editor] No editor for {other:?} resource {}", picked.display()),
        }
    }

    fn collect_session_events(&mut self) {
        for session in self.registry.sessions_mut() {
            self.events.extend(session.drain_events());
        }
    }
}
