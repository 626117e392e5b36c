use crate::egui_host::EguiPanelHost;
use anyhow::Result;
use scene_tabs::cli::CliOverrides;
use scene_tabs::config::EditorConfig;
use scene_tabs::host::FileDialogs;
use scene_tabs::project::{ProjectLoad, SaveOutcome};
use scene_tabs::resources::ResourceRoots;
use scene_tabs::Editor;

/// Owns the editor and feeds it one frame per `egui::Context` pass.
pub struct StudioShell {
    editor: Editor<EguiPanelHost>,
    started: bool,
}

impl StudioShell {
    pub fn new(config: EditorConfig, dialogs: Box<dyn FileDialogs>) -> Self {
        let resources = ResourceRoots::from_config(&config);
        let host = EguiPanelHost::new(resources.clone(), dialogs);
        Self { editor: Editor::with_resources(config, host, resources), started: false }
    }

    /// Builds the config from `--config` plus the remaining command line overrides.
    pub fn from_cli(overrides: CliOverrides, dialogs: Box<dyn FileDialogs>) -> Result<Self> {
        let mut config = match overrides.config_path() {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::default(),
        };
        let overrides = overrides.into_config_overrides();
        if !overrides.is_empty() {
            log::info!("[editor] CLI overrides: {}", overrides.applied_fields().join(", "));
        }
        config.apply_overrides(&overrides);
        Ok(Self::new(config, dialogs))
    }

    pub fn start(&mut self) -> ProjectLoad {
        self.started = true;
        self.editor.start()
    }

    /// Runs one editor frame. Returns `false` once the user asked to exit.
    pub fn frame(&mut self, ctx: &egui::Context) -> bool {
        if !self.started {
            self.start();
        }
        self.editor.host_mut().begin_frame(ctx);
        self.editor.run_frame();
        self.editor.host_mut().end_frame();
        for event in self.editor.drain_events() {
            log::debug!("[editor] {event}");
        }
        !self.editor.exit_requested()
    }

    pub fn shutdown(&mut self) -> Option<SaveOutcome> {
        match self.editor.stop() {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                log::error!("[editor] Final project save failed: {err}");
                None
            }
        }
    }

    pub fn editor(&self) -> &Editor<EguiPanelHost> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor<EguiPanelHost> {
        &mut self.editor
    }
}
