use crate::config::EditorConfig;
use std::path::{Path, PathBuf};

/// Ordered list of directories relative resource paths are looked up in.
#[derive(Debug, Clone, Default)]
pub struct ResourceRoots {
    roots: Vec<PathBuf>,
}

impl ResourceRoots {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self { roots: roots.into_iter().collect() }
    }

    /// Every `prefix/resource_path` combination, prefixes first, in config order.
    pub fn from_config(config: &EditorConfig) -> Self {
        let mut roots = Vec::new();
        for prefix in &config.resources.prefix_paths {
            for path in &config.resources.paths {
                let root = prefix.join(path);
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
        }
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolves a relative resource name to the first existing file under the roots.
    /// Absolute paths are returned as-is when they exist.
    pub fn resolve(&self, path: &Path) -> Option<PathBuf> {
        if path.is_absolute() {
            return path.exists().then(|| path.to_path_buf());
        }
        self.roots.iter().map(|root| root.join(path)).find(|candidate| candidate.is_file())
    }

    /// Destination for writing a resource: an existing file wins, otherwise the path as given.
    pub fn resolve_for_write(&self, path: &Path) -> PathBuf {
        self.resolve(path).unwrap_or_else(|| path.to_path_buf())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Scene,
    Project,
    Model,
    Material,
    Texture,
    Unknown,
}

impl ContentType {
    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default().to_ascii_lowercase();
        match ext.as_str() {
            "scene" => ContentType::Scene,
            "project" => ContentType::Project,
            "mdl" | "gltf" | "glb" => ContentType::Model,
            "material" => ContentType::Material,
            "png" | "jpg" | "jpeg" | "dds" | "hdr" => ContentType::Texture,
            _ => ContentType::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_through_roots_in_order() {
        let dir = tempdir().expect("tempdir");
        let core = dir.path().join("CoreData");
        let data = dir.path().join("Data");
        fs::create_dir_all(core.join("Scenes")).expect("core dir");
        fs::create_dir_all(data.join("Scenes")).expect("data dir");
        fs::write(data.join("Scenes/a.scene"), "{}").expect("write a");
        fs::write(core.join("Scenes/b.scene"), "{}").expect("write core b");
        fs::write(data.join("Scenes/b.scene"), "{}").expect("write data b");

        let roots = ResourceRoots::new([core.clone(), data.clone()]);
        assert_eq!(roots.resolve(Path::new("Scenes/a.scene")), Some(data.join("Scenes/a.scene")));
        assert_eq!(roots.resolve(Path::new("Scenes/b.scene")), Some(core.join("Scenes/b.scene")));
        assert_eq!(roots.resolve(Path::new("Scenes/missing.scene")), None);
        assert_eq!(roots.resolve_for_write(Path::new("new.scene")), PathBuf::from("new.scene"));
    }

    #[test]
    fn config_roots_combine_prefixes_and_paths() {
        let config = EditorConfig::default();
        let roots = ResourceRoots::from_config(&config);
        assert_eq!(
            roots.roots().len(),
            config.resources.prefix_paths.len() * config.resources.paths.len()
        );
    }

    #[test]
    fn classifies_content_by_extension() {
        assert_eq!(ContentType::from_path(Path::new("Scenes/Level.SCENE")), ContentType::Scene);
        assert_eq!(ContentType::from_path(Path::new("tex.png")), ContentType::Texture);
        assert_eq!(ContentType::from_path(Path::new("README")), ContentType::Unknown);
    }
}
