use anyhow::{anyhow, bail, Context, Result};
use scene_tabs::cli::CliOverrides;
use scene_tabs::config::EditorConfig;
use scene_tabs::host::HeadlessHost;
use scene_tabs::project::{self, ProjectDescriptor, ProjectLoad, SaveOutcome, VersionSupport, WindowGeometry};
use scene_tabs::resources::ResourceRoots;
use scene_tabs::{Editor, SessionRegistry};
use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::process;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "list" => {
            let path = args.next().ok_or_else(|| anyhow!("list requires a path: project_tool list <project>"))?;
            init_logging(&EditorConfig::default());
            cmd_list(&path)
        }
        "validate" => {
            let path = args
                .next()
                .ok_or_else(|| anyhow!("validate requires a path: project_tool validate <project>"))?;
            init_logging(&EditorConfig::default());
            cmd_validate(&path)
        }
        "new" => {
            let path =
                args.next().ok_or_else(|| anyhow!("new requires arguments: project_tool new <project> [count]"))?;
            let count = match args.next() {
                Some(raw) => raw.parse::<usize>().with_context(|| format!("Invalid scene count '{raw}'"))?,
                None => 1,
            };
            init_logging(&EditorConfig::default());
            cmd_new(&path, count)
        }
        "restore" => {
            let path =
                args.next().ok_or_else(|| anyhow!("restore requires a path: project_tool restore <project>"))?;
            init_logging(&EditorConfig::default());
            cmd_restore(&path)
        }
        "boot" => {
            let overrides = CliOverrides::parse(env::args().skip(1))?;
            cmd_boot(overrides)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'")),
    }
}

fn print_usage() {
    eprintln!(
        "Project Tool

Usage:
  project_tool list <project>              List the scene sessions stored in a project file
  project_tool validate <project>          Check session ids, titles and scene paths
  project_tool new <project> [count]       Write a project with <count> empty scene sessions
  project_tool restore <project>           Load a project headlessly and save it back in place
  project_tool boot [--project <p>] [--config <c>] [--width <w>] [--height <h>]
                                           Run one headless editor frame against the default project
  project_tool help                        Show this message
"
    );
}

fn init_logging(config: &EditorConfig) {
    let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    // a logger may already be installed when commands are chained in tests
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

fn cmd_list(path: &str) -> Result<()> {
    let descriptor = ProjectDescriptor::read(path)?;
    println!(
        "Project '{path}' version {} window {}x{} at ({}, {})",
        descriptor.version,
        descriptor.window.width,
        descriptor.window.height,
        descriptor.window.x,
        descriptor.window.y
    );
    for (index, block) in descriptor.scenes.iter().enumerate() {
        let id = block.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        let scene_path =
            block.path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<unsaved>".to_string());
        println!("  #{index} id={id} title='{}' path={scene_path}", block.title);
    }
    Ok(())
}

fn cmd_validate(path: &str) -> Result<()> {
    let descriptor = ProjectDescriptor::read(path)?;
    let resources = ResourceRoots::from_config(&EditorConfig::default());
    let base = Path::new(path).parent().unwrap_or_else(|| Path::new("."));
    let mut ids = HashSet::new();
    let mut issues = Vec::new();

    match descriptor.version.support() {
        VersionSupport::Current => {}
        support => issues.push(format!("project version '{}' is {support:?}", descriptor.version)),
    }
    for (index, block) in descriptor.scenes.iter().enumerate() {
        match block.id {
            Some(id) if !id.is_valid() => issues.push(format!("scene #{index} uses the reserved id 0")),
            Some(id) if !ids.insert(id) => issues.push(format!("scene #{index} repeats id {id}")),
            Some(_) => {}
            None => issues.push(format!("scene #{index} has no id; a new one is issued on load")),
        }
        if let Some(scene_path) = &block.path {
            let found = resources.resolve(scene_path).is_some() || base.join(scene_path).is_file();
            if !found {
                issues.push(format!("scene #{index} points at missing file {}", scene_path.display()));
            }
        }
    }

    if issues.is_empty() {
        println!("Project '{path}' is valid. Scenes: {}", descriptor.scenes.len());
        Ok(())
    } else {
        for issue in &issues {
            println!("  - {issue}");
        }
        bail!("project '{path}' has {} issue(s)", issues.len())
    }
}

fn cmd_new(path: &str, count: usize) -> Result<()> {
    let config = EditorConfig::default();
    let host = HeadlessHost::new(WindowGeometry::sized(config.window.width, config.window.height));
    let mut registry =
        SessionRegistry::new(config.sessions.first_dock_anchor.clone(), config.sessions.scene_title.clone());
    for _ in 0..count {
        registry.create_session();
    }
    match project::save_project(Path::new(path), &registry, &host)? {
        SaveOutcome::Saved(saved) => println!("Wrote {count} scene session(s) to {}", saved.display()),
        SaveOutcome::Skipped => println!("Empty path; nothing written"),
    }
    Ok(())
}

fn cmd_restore(path: &str) -> Result<()> {
    let mut editor = Editor::new(EditorConfig::default(), HeadlessHost::default());
    let report = match editor.load_project(Path::new(path)) {
        ProjectLoad::Loaded(report) => report,
        ProjectLoad::Skipped(reason) => bail!("project '{path}' not loaded: {reason}"),
    };
    for failure in &report.failures {
        println!("  - scene #{} not restored: {}", failure.index, failure.error);
    }
    editor.run_frame();
    editor.save_project().with_context(|| format!("Failed to save project '{path}'"))?;
    println!("Restored {} scene session(s) from {}", report.restored.len(), report.path.display());
    Ok(())
}

fn cmd_boot(overrides: CliOverrides) -> Result<()> {
    let mut config = match overrides.config_path() {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    config.apply_overrides(&overrides.into_config_overrides());
    init_logging(&config);

    let host = HeadlessHost::new(WindowGeometry::sized(config.window.width, config.window.height));
    let mut editor = Editor::new(config, host);
    let load = editor.start();
    if editor.registry().is_empty() {
        editor.create_session();
    }
    editor.run_frame();
    for event in editor.drain_events() {
        log::info!("[editor] {event}");
    }
    println!(
        "Booted with {} scene session(s); project {}",
        editor.registry().len(),
        if load.is_loaded() { "loaded" } else { "not found" }
    );
    editor.stop()?;
    Ok(())
}
