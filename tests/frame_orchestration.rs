use scene_tabs::config::EditorConfig;
use scene_tabs::events::EditorEvent;
use scene_tabs::host::{HeadlessHost, MenuCommand, PanelInteraction, HIERARCHY_PANEL};
use scene_tabs::project::{save_project, ProjectDescriptor};
use scene_tabs::resources::ResourceRoots;
use scene_tabs::{Editor, SessionId, SessionRegistry};
use std::fs;
use tempfile::tempdir;

fn editor_with(resources: ResourceRoots) -> Editor<HeadlessHost> {
    Editor::with_resources(EditorConfig::default(), HeadlessHost::default(), resources)
}

fn editor() -> Editor<HeadlessHost> {
    editor_with(ResourceRoots::default())
}

#[test]
fn focused_session_becomes_active_and_is_reported() {
    let mut editor = editor();
    let _a = editor.create_session();
    let b = editor.create_session();
    let _c = editor.create_session();
    editor.host_mut().focus("Scene###2");
    editor.run_frame();

    assert_eq!(editor.registry().active_id(), Some(b));
    let events = editor.drain_events();
    assert!(events.contains(&EditorEvent::ActiveSessionChanged { session: Some(b) }));

    editor.run_frame();
    assert!(
        !editor.drain_events().iter().any(|e| matches!(e, EditorEvent::ActiveSessionChanged { .. })),
        "a stable frame does not re-announce the active session"
    );
}

#[test]
fn closed_session_leaves_registry_and_frees_its_id() {
    let mut editor = editor();
    let a = editor.create_session();
    let b = editor.create_session();
    editor.run_frame();
    editor.drain_events();

    editor.host_mut().close("Scene###1");
    editor.run_frame();
    assert!(editor.registry().get(a).is_none());
    assert_eq!(editor.registry().active_id(), Some(b));
    assert!(editor.drain_events().contains(&EditorEvent::SessionClosed { session: a }));

    editor.run_frame();
    assert!(!editor.host().shown_panels().iter().any(|key| key == "Scene###1"));
    assert_eq!(editor.create_session(), a);
}

#[test]
fn save_prompts_once_then_saves_project_and_scenes() {
    let dir = tempdir().expect("tempdir");
    let scene_path = dir.path().join("Level.scene");
    let mut editor = editor();
    let with_file = editor.create_session();
    let _unsaved = editor.create_session();
    {
        let session = editor.registry_mut().get_mut(with_file).expect("session");
        session.scene_mut().spawn_node("Crate", None);
        session.save_scene(Some(&scene_path), &ResourceRoots::default()).expect("initial scene save");
        session.scene_mut().spawn_node("Barrel", None);
    }
    editor.run_frame();
    editor.drain_events();

    editor.host_mut().answer_save(dir.path().join("Workspace"));
    editor.host_mut().queue_command(MenuCommand::SaveProject);
    editor.run_frame();

    let project_path = dir.path().join("Workspace.project");
    assert_eq!(editor.project_path(), Some(project_path.as_path()));
    let descriptor = ProjectDescriptor::read(&project_path).expect("project written");
    assert_eq!(descriptor.scenes.len(), 2);
    assert_eq!(descriptor.scenes[0].path.as_deref(), Some(scene_path.as_path()));
    assert_eq!(descriptor.scenes[1].path, None);

    let reloaded = scene_tabs::scene::EditorScene::load(&scene_path).expect("scene rewritten");
    assert_eq!(reloaded.node_count(), 2);
    let events = editor.drain_events();
    assert!(events.contains(&EditorEvent::ProjectSaved { path: project_path.clone() }));
    assert_eq!(events.iter().filter(|e| matches!(e, EditorEvent::SceneSaved { .. })).count(), 1);

    // known path: no dialog answer is needed
    editor.host_mut().queue_command(MenuCommand::SaveProject);
    editor.run_frame();
    assert!(editor.drain_events().contains(&EditorEvent::ProjectSaved { path: project_path.clone() }));

    // save-as forgets the path; cancelling leaves no path behind
    editor.host_mut().queue_command(MenuCommand::SaveProjectAs);
    editor.run_frame();
    assert!(editor.project_path().is_none());
}

#[test]
fn open_project_is_applied_after_the_frame() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("Other.project");
    let mut stored = SessionRegistry::new("Hierarchy", "Loaded");
    stored.create_session();
    save_project(&path, &stored, &HeadlessHost::default()).expect("save project");

    let mut editor = editor();
    editor.create_session();
    editor.create_session();
    editor.run_frame();

    editor.host_mut().answer_open(&path);
    editor.host_mut().queue_command(MenuCommand::OpenProject);
    editor.run_frame();

    let shown = editor.host().shown_panels().to_vec();
    assert!(shown.iter().any(|key| key == "Scene###1"), "old sessions still render this frame");
    assert!(!shown.iter().any(|key| key == "Loaded###1"));
    assert_eq!(editor.registry().len(), 1);
    assert_eq!(editor.registry().sessions()[0].unique_title(), "Loaded###1");
    assert_eq!(editor.project_path(), Some(path.as_path()));
    assert!(editor
        .drain_events()
        .iter()
        .any(|e| matches!(e, EditorEvent::ProjectLoaded { sessions: 1, .. })));

    editor.run_frame();
    assert!(editor.host().shown_panels().iter().any(|key| key == "Loaded###1"));
}

#[test]
fn resource_browser_opens_scene_files_in_new_sessions() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("Data");
    fs::create_dir_all(&data).expect("data dir");
    let mut source = scene_tabs::scene::EditorScene::new();
    source.spawn_node("Lamp", None);
    source.save(data.join("Street.scene")).expect("save scene");

    let mut editor = editor_with(ResourceRoots::new([data]));
    editor.host_mut().queue_resource("notes.txt");
    editor.run_frame();
    assert!(editor.registry().is_empty(), "non-scene resources open nothing");

    editor.host_mut().queue_resource("Street.scene");
    editor.run_frame();
    assert_eq!(editor.registry().len(), 1);
    let session = &editor.registry().sessions()[0];
    assert_eq!(session.title(), "Street");
    assert_eq!(session.scene().node_count(), 1);
    assert_eq!(session.path(), Some(std::path::Path::new("Street.scene")));
}

#[test]
fn hierarchy_click_selects_and_refreshes_inspector() {
    let mut editor = editor();
    let id = editor.create_session();
    let node = editor.registry_mut().get_mut(id).expect("session").scene_mut().spawn_node("Rock", None);
    editor.run_frame();
    assert!(editor.host().last_inspector().expect("inspector").nodes.is_empty());

    editor.host_mut().queue_interaction(HIERARCHY_PANEL, PanelInteraction::NodeClicked { node, additive: false });
    editor.run_frame();
    assert_eq!(editor.host().last_hierarchy().len(), 1);
    let session = editor.registry().get(id).expect("session");
    assert!(session.is_selected(node));
    let inspector = editor.host().last_inspector().expect("inspector");
    assert_eq!(inspector.session, id);
    assert_eq!(inspector.nodes.len(), 1);
    assert_eq!(inspector.nodes[0].name, "Rock");

    editor.run_frame();
    assert!(editor.host().last_hierarchy()[0].selected);
}

#[test]
fn new_scene_without_focus_becomes_the_active_session() {
    let mut editor = editor();
    editor.host_mut().queue_command(MenuCommand::NewScene);
    editor.run_frame();
    assert_eq!(editor.registry().active_id(), Some(SessionId::new(1)));
    assert!(editor.drain_events().contains(&EditorEvent::SessionOpened { session: SessionId::new(1) }));

    editor.host_mut().queue_command(MenuCommand::NewScene);
    editor.run_frame();
    assert_eq!(editor.registry().active_id(), Some(SessionId::new(2)));
    assert!(editor.drain_events().contains(&EditorEvent::ActiveSessionChanged { session: Some(SessionId::new(2)) }));

    editor.host_mut().focus("Scene###1");
    editor.run_frame();
    assert_eq!(editor.registry().active_id(), Some(SessionId::new(1)));
}

#[test]
fn inspector_drops_nodes_deleted_while_selected() {
    let mut editor = editor();
    let id = editor.create_session();
    let node = editor.registry_mut().get_mut(id).expect("session").scene_mut().spawn_node("Rock", None);
    editor.run_frame();
    editor.host_mut().queue_interaction(HIERARCHY_PANEL, PanelInteraction::NodeClicked { node, additive: false });
    editor.run_frame();
    assert_eq!(editor.host().last_inspector().expect("inspector").nodes.len(), 1);

    assert!(editor.registry_mut().get_mut(id).expect("session").scene_mut().remove_node(node));
    editor.run_frame();
    let inspector = editor.host().last_inspector().expect("inspector");
    assert!(inspector.nodes.is_empty());
    assert_eq!(editor.registry().get(id).expect("session").selection().count(), 0);
}
