use crate::host::PanelHost;
use crate::id_pool::{IdPool, SessionId};
use crate::registry::SessionRegistry;
use crate::resources::ResourceRoots;
use crate::session::{SessionBlock, SessionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PROJECT_VERSION: &str = "0";
pub const PROJECT_EXTENSION: &str = "project";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to access project file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse project file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode project: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

impl WindowGeometry {
    pub fn sized(width: u32, height: u32) -> Self {
        Self { width, height, x: 0, y: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSupport {
    Current,
    Older,
    Newer,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectVersion(pub String);

impl ProjectVersion {
    pub fn current() -> Self {
        Self(PROJECT_VERSION.to_string())
    }

    /// Versions are plain integers in a string; anything else is `Unknown`.
    pub fn support(&self) -> VersionSupport {
        let (Ok(found), Ok(current)) = (self.0.trim().parse::<u64>(), PROJECT_VERSION.parse::<u64>()) else {
            return VersionSupport::Unknown;
        };
        match found.cmp(&current) {
            std::cmp::Ordering::Equal => VersionSupport::Current,
            std::cmp::Ordering::Less => VersionSupport::Older,
            std::cmp::Ordering::Greater => VersionSupport::Newer,
        }
    }
}

impl Default for ProjectVersion {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for ProjectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// On-disk project file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDescriptor {
    pub version: ProjectVersion,
    pub window: WindowGeometry,
    pub scenes: Vec<SessionBlock>,
    pub docks: serde_json::Value,
}

impl ProjectDescriptor {
    pub fn capture<H: PanelHost + ?Sized>(registry: &SessionRegistry, host: &H) -> Self {
        Self {
            version: ProjectVersion::current(),
            window: host.window_geometry(),
            scenes: registry.sessions().iter().map(|session| session.serialize()).collect(),
            docks: host.save_dock_layout(),
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ProjectError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_slice(&bytes).map_err(|source| ProjectError::Parse { path: path.to_path_buf(), source })
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|source| ProjectError::Io { path: parent.to_path_buf(), source })?;
            }
        }
        fs::write(path, json).map_err(|source| ProjectError::Io { path: path.to_path_buf(), source })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Skipped,
}

#[derive(Debug)]
pub struct RestoreFailure {
    pub index: usize,
    pub id: Option<SessionId>,
    pub error: SessionError,
}

#[derive(Debug)]
pub struct LoadReport {
    pub path: PathBuf,
    pub version: ProjectVersion,
    pub restored: Vec<SessionId>,
    pub failures: Vec<RestoreFailure>,
}

#[derive(Debug)]
pub enum ProjectLoad {
    Skipped(String),
    Loaded(LoadReport),
}

impl ProjectLoad {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ProjectLoad::Loaded(_))
    }

    pub fn report(&self) -> Option<&LoadReport> {
        match self {
            ProjectLoad::Loaded(report) => Some(report),
            ProjectLoad::Skipped(_) => None,
        }
    }
}

/// Writes the registry, window geometry and dock layout to `path`. An empty path does nothing.
pub fn save_project<H: PanelHost + ?Sized>(
    path: &Path,
    registry: &SessionRegistry,
    host: &H,
) -> Result<SaveOutcome, ProjectError> {
    if path.as_os_str().is_empty() {
        return Ok(SaveOutcome::Skipped);
    }
    let descriptor = ProjectDescriptor::capture(registry, host);
    if let Err(err) = descriptor.write(path) {
        log::error!("[project] Saving project failed: {err}");
        return Err(err);
    }
    log::info!("[project] Saved {} scene session(s) to {}", descriptor.scenes.len(), path.display());
    Ok(SaveOutcome::Saved(path.to_path_buf()))
}

/// Replaces the open sessions with the ones stored in `path`.
///
/// A missing or unreadable file leaves everything untouched; the first run of the editor has no
/// project yet. Sessions whose id is already taken are skipped and listed in the report.
pub fn load_project<H: PanelHost + ?Sized>(
    path: &Path,
    registry: &mut SessionRegistry,
    host: &mut H,
    resources: &ResourceRoots,
) -> ProjectLoad {
    if path.as_os_str().is_empty() {
        return ProjectLoad::Skipped("empty project path".to_string());
    }
    let resolved = resources.resolve(path).unwrap_or_else(|| path.to_path_buf());
    let descriptor = match ProjectDescriptor::read(&resolved) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            log::debug!("[project] Not loading project: {err}");
            return ProjectLoad::Skipped(err.to_string());
        }
    };
    match descriptor.version.support() {
        VersionSupport::Current => {}
        support => log::warn!(
            "[project] {} has {support:?} version '{}'; loading best-effort",
            resolved.display(),
            descriptor.version
        ),
    }

    registry.ids_mut().clear();
    host.set_window_geometry(descriptor.window);
    registry.clear();

    let mut restored = Vec::new();
    let mut failures = Vec::new();
    for (index, block) in with_assigned_ids(&descriptor.scenes).iter().enumerate() {
        match registry.restore_session(block, resources) {
            Ok(id) => restored.push(id),
            Err(error) => {
                log::error!("[project] Restoring scene session #{index} failed: {error}");
                failures.push(RestoreFailure { index, id: block.id, error });
            }
        }
    }
    host.load_dock_layout(&descriptor.docks);
    log::info!("[project] Loaded {} scene session(s) from {}", restored.len(), resolved.display());
    ProjectLoad::Loaded(LoadReport { path: resolved, version: descriptor.version, restored, failures })
}

/// Gives id-less blocks (older files) the lowest ids no other block in the file claims, keeping
/// document order.
fn with_assigned_ids(blocks: &[SessionBlock]) -> Vec<SessionBlock> {
    let mut claimed = IdPool::new();
    for id in blocks.iter().filter_map(|block| block.id) {
        claimed.reserve(id);
    }
    blocks
        .iter()
        .map(|block| {
            let mut block = block.clone();
            if block.id.is_none() {
                block.id = Some(claimed.allocate());
            }
            block
        })
        .collect()
}
