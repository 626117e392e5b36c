use scene_tabs::host::{HeadlessHost, PanelHost};
use scene_tabs::project::{load_project, save_project, ProjectLoad, SaveOutcome, WindowGeometry};
use scene_tabs::resources::ResourceRoots;
use scene_tabs::session::SessionError;
use scene_tabs::{SessionId, SessionRegistry};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn empty_registry() -> SessionRegistry {
    SessionRegistry::new("Hierarchy", "Scene")
}

#[test]
fn duplicate_titles_round_trip_with_distinct_ids() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("dupes.project");
    let mut registry = empty_registry();
    let host = HeadlessHost::new(WindowGeometry { width: 1600, height: 900, x: 40, y: 30 });
    let first = registry.create_session();
    let second = registry.create_session();
    assert_eq!(registry.sessions()[0].title(), registry.sessions()[1].title());

    let outcome = save_project(&path, &registry, &host).expect("save project");
    assert_eq!(outcome, SaveOutcome::Saved(path.clone()));

    let mut restored = empty_registry();
    let mut fresh_host = HeadlessHost::default();
    let load = load_project(&path, &mut restored, &mut fresh_host, &ResourceRoots::default());
    let report = load.report().expect("project loads");
    assert_eq!(report.restored, vec![first, second]);
    assert!(report.failures.is_empty());

    let sessions = restored.sessions();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id(), first);
    assert_eq!(sessions[1].id(), second);
    assert_eq!(sessions[0].title(), "Scene");
    assert_eq!(sessions[1].title(), "Scene");
    assert_ne!(sessions[0].unique_title(), sessions[1].unique_title());
    assert_eq!(fresh_host.window_geometry(), WindowGeometry { width: 1600, height: 900, x: 40, y: 30 });
}

#[test]
fn duplicate_persisted_ids_restore_one_session() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("conflict.project");
    fs::write(
        &path,
        r#"{
            "version": "0",
            "window": {"width": 800, "height": 600, "x": 0, "y": 0},
            "scenes": [{"id": 2, "title": "A"}, {"id": 2, "title": "B"}],
            "docks": null
        }"#,
    )
    .expect("write project");

    let mut registry = empty_registry();
    let mut host = HeadlessHost::default();
    let load = load_project(&path, &mut registry, &mut host, &ResourceRoots::default());
    let report = load.report().expect("project loads");
    assert_eq!(report.restored, vec![SessionId::new(2)]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(matches!(report.failures[0].error, SessionError::IdentityConflict(id) if id == SessionId::new(2)));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.sessions()[0].title(), "A");
}

#[test]
fn load_replaces_existing_sessions_and_ids() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("single.project");
    let mut saved = empty_registry();
    saved.create_session();
    save_project(&path, &saved, &HeadlessHost::default()).expect("save project");

    let mut registry = empty_registry();
    let mut host = HeadlessHost::default();
    for _ in 0..3 {
        registry.create_session();
    }
    assert!(load_project(&path, &mut registry, &mut host, &ResourceRoots::default()).is_loaded());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.ids().iter().collect::<Vec<_>>(), vec![SessionId::new(1)]);
    assert_eq!(registry.create_session(), SessionId::new(2));
}

#[test]
fn empty_path_save_does_no_io() {
    let dir = tempdir().expect("tempdir");
    let mut registry = empty_registry();
    registry.create_session();
    let outcome = save_project(Path::new(""), &registry, &HeadlessHost::default()).expect("empty path");
    assert_eq!(outcome, SaveOutcome::Skipped);
    assert_eq!(fs::read_dir(dir.path()).expect("read tempdir").count(), 0);
}

#[test]
fn relative_project_paths_resolve_through_resource_roots() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("Data");
    fs::create_dir_all(&data).expect("create data dir");
    let mut saved = empty_registry();
    saved.create_session();
    save_project(&data.join("Layouts.project"), &saved, &HeadlessHost::default()).expect("save project");

    let resources = ResourceRoots::new([dir.path().join("CoreData"), data.clone()]);
    let mut registry = empty_registry();
    let mut host = HeadlessHost::default();
    match load_project(Path::new("Layouts.project"), &mut registry, &mut host, &resources) {
        ProjectLoad::Loaded(report) => assert_eq!(report.path, data.join("Layouts.project")),
        ProjectLoad::Skipped(reason) => panic!("project should resolve through roots: {reason}"),
    }
    assert_eq!(registry.len(), 1);
}

#[test]
fn scene_contents_and_settings_survive_reload() {
    let dir = tempdir().expect("tempdir");
    let scene_path = dir.path().join("Yard.scene");
    let project_path = dir.path().join("yard.project");
    let resources = ResourceRoots::default();

    let mut registry = empty_registry();
    let id = registry.create_session();
    {
        let session = registry.get_mut(id).expect("session");
        let tree = session.scene_mut().spawn_node("Tree", None);
        session.scene_mut().spawn_node("Leaf", Some(tree));
        session.toggle_gizmo_snap();
        session.save_scene(Some(&scene_path), &resources).expect("save scene");
    }
    save_project(&project_path, &registry, &HeadlessHost::default()).expect("save project");

    let mut restored = empty_registry();
    let mut host = HeadlessHost::default();
    assert!(load_project(&project_path, &mut restored, &mut host, &resources).is_loaded());
    let session = restored.get(id).expect("restored session");
    assert_eq!(session.path(), Some(scene_path.as_path()));
    assert_eq!(session.scene().node_count(), 2);
    assert!(session.gizmo().snap);
    let rows = session.hierarchy_rows();
    assert_eq!(rows.iter().map(|row| (row.label.as_str(), row.depth)).collect::<Vec<_>>(), [("Tree", 0), ("Leaf", 1)]);
}

#[test]
fn dock_layout_is_handed_back_to_the_host() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("docks.project");
    let mut registry = empty_registry();
    let mut host = HeadlessHost::default();
    registry.create_session();
    registry.run_frame(&mut host);
    save_project(&path, &registry, &host).expect("save project");

    let mut restored = empty_registry();
    let mut fresh = HeadlessHost::default();
    load_project(&path, &mut restored, &mut fresh, &ResourceRoots::default());
    assert!(fresh.placement_of("Scene###1").is_some());
}
