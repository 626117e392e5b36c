use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SCENE_FILE_VERSION: u32 = 1;

// ---------- Components ----------
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}
impl Default for Transform {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}
#[derive(Component, Clone, Debug)]
pub struct NodeName(pub String);
#[derive(Component, Clone, Copy)]
pub struct Parent(pub Entity);
#[derive(Component, Default)]
pub struct Children(pub Vec<Entity>);
/// Helper objects the editor needs in every scene; never saved, never selectable.
#[derive(Component, Clone, Copy, Default)]
pub struct EditorOnly;
#[derive(Component, Clone, Copy, Default)]
pub struct EditorCamera;
#[derive(Component, Clone, Copy)]
pub struct EditorGrid {
    pub visible: bool,
    pub cell_size: f32,
    pub cells: u32,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to access scene file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scene file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode scene")]
    Encode(#[from] serde_json::Error),
    #[error("node {node} has an invalid parent {parent} (missing, itself or part of a cycle)")]
    InvalidParent { node: usize, parent: usize },
}

// ---------- Scene file ----------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default = "SceneFile::default_version")]
    pub version: u32,
    #[serde(default)]
    pub nodes: Vec<SceneNodeData>,
}

impl Default for SceneFile {
    fn default() -> Self {
        Self { version: SCENE_FILE_VERSION, nodes: Vec::new() }
    }
}

impl SceneFile {
    const fn default_version() -> u32 {
        SCENE_FILE_VERSION
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| SceneError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_slice(&bytes).map_err(|source| SceneError::Parse { path: path.to_path_buf(), source })
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| SceneError::Io { path: parent.to_path_buf(), source })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json.as_bytes()).map_err(|source| SceneError::Io { path: path.to_path_buf(), source })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub transform: TransformData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformData {
    pub translation: Vec3Data,
    pub rotation: QuatData,
    pub scale: Vec3Data,
}

impl Default for TransformData {
    fn default() -> Self {
        Transform::default().into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl From<Vec3> for Vec3Data {
    fn from(value: Vec3) -> Self {
        Self { x: value.x, y: value.y, z: value.z }
    }
}

impl From<Vec3Data> for Vec3 {
    fn from(value: Vec3Data) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

impl From<Quat> for QuatData {
    fn from(value: Quat) -> Self {
        let v = value.normalize();
        Self { x: v.x, y: v.y, z: v.z, w: v.w }
    }
}

impl From<QuatData> for Quat {
    fn from(value: QuatData) -> Self {
        Quat::from_xyzw(value.x, value.y, value.z, value.w)
    }
}

impl From<Transform> for TransformData {
    fn from(value: Transform) -> Self {
        Self { translation: value.translation.into(), rotation: value.rotation.into(), scale: value.scale.into() }
    }
}

impl From<TransformData> for Transform {
    fn from(value: TransformData) -> Self {
        Self { translation: value.translation.into(), rotation: value.rotation.into(), scale: value.scale.into() }
    }
}

// ---------- Editor scene ----------
/// One scene instance plus the editor helpers every session needs.
pub struct EditorScene {
    pub world: World,
    camera: Entity,
    grid: Entity,
}

impl Default for EditorScene {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorScene {
    pub fn new() -> Self {
        let mut world = World::new();
        let camera = world
            .spawn((
                EditorOnly,
                EditorCamera,
                NodeName("EditorCamera".to_string()),
                Transform { translation: Vec3::new(0.0, 5.0, -10.0), ..Transform::default() },
            ))
            .id();
        let grid = world
            .spawn((
                EditorOnly,
                EditorGrid { visible: true, cell_size: 1.0, cells: 64 },
                NodeName("EditorGrid".to_string()),
                Transform::default(),
            ))
            .id();
        Self { world, camera, grid }
    }

    pub fn from_file(file: &SceneFile) -> Result<Self, SceneError> {
        for (index, node) in file.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent >= file.nodes.len() || parent == index {
                    return Err(SceneError::InvalidParent { node: index, parent });
                }
            }
        }
        // an acyclic chain is at most nodes.len() - 1 links long
        for (index, node) in file.nodes.iter().enumerate() {
            let mut current = node.parent;
            let mut steps = 0;
            while let Some(parent) = current {
                steps += 1;
                if parent == index || steps > file.nodes.len() {
                    return Err(SceneError::InvalidParent { node: index, parent: node.parent.unwrap_or(parent) });
                }
                current = file.nodes[parent].parent;
            }
        }
        let mut scene = Self::new();
        let entities: Vec<Entity> = file
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let name = node.name.clone().unwrap_or_else(|| format!("Node {index}"));
                scene.world.spawn((NodeName(name), Transform::from(node.transform.clone()))).id()
            })
            .collect();
        for (index, node) in file.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                scene.attach(entities[index], entities[parent]);
            }
        }
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let file = SceneFile::load_from_path(path)?;
        Self::from_file(&file)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        self.to_file().save_to_path(path)
    }

    pub fn to_file(&self) -> SceneFile {
        let order = self.ordered_nodes();
        let nodes = order
            .iter()
            .map(|(entity, _)| {
                let parent = self
                    .world
                    .get::<Parent>(*entity)
                    .and_then(|parent| order.iter().position(|(candidate, _)| *candidate == parent.0));
                SceneNodeData {
                    name: self.node_name(*entity).map(str::to_string),
                    transform: self.transform(*entity).unwrap_or_default().into(),
                    parent,
                }
            })
            .collect();
        SceneFile { version: SCENE_FILE_VERSION, nodes }
    }

    pub fn spawn_node(&mut self, name: impl Into<String>, parent: Option<Entity>) -> Entity {
        let entity = self.world.spawn((NodeName(name.into()), Transform::default())).id();
        if let Some(parent) = parent.filter(|p| self.contains(*p)) {
            self.attach(entity, parent);
        }
        entity
    }

    /// Despawns `entity` and its subtree. Returns `false` if nothing was removed.
    pub fn remove_node(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            return false;
        }
        if let Some(parent) = self.world.get::<Parent>(entity).copied() {
            if let Some(mut siblings) = self.world.get_mut::<Children>(parent.0) {
                siblings.0.retain(|&child| child != entity);
            }
        }
        let child_ids = self.world.get::<Children>(entity).map(|c| c.0.clone()).unwrap_or_default();
        for child in child_ids {
            self.remove_node(child);
        }
        self.world.despawn(entity)
    }

    /// True for live scene nodes; editor helpers are not nodes.
    pub fn contains(&self, entity: Entity) -> bool {
        match self.world.get_entity(entity) {
            Ok(entity_ref) => !entity_ref.contains::<EditorOnly>(),
            Err(_) => false,
        }
    }

    pub fn node_name(&self, entity: Entity) -> Option<&str> {
        self.world.get::<NodeName>(entity).map(|name| name.0.as_str())
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.world.get::<Transform>(entity).copied()
    }

    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.world.get::<Children>(entity).map(|c| c.0.as_slice()).unwrap_or(&[])
    }

    pub fn roots(&self) -> Vec<Entity> {
        let mut roots: Vec<Entity> = self
            .world
            .iter_entities()
            .filter(|e| !e.contains::<EditorOnly>() && !e.contains::<Parent>())
            .map(|e| e.id())
            .collect();
        roots.sort_by_key(|entity| entity.index());
        roots
    }

    pub fn node_count(&self) -> usize {
        self.world.iter_entities().filter(|e| !e.contains::<EditorOnly>()).count()
    }

    /// Depth-first node order with depths; roots sorted by spawn index.
    pub fn ordered_nodes(&self) -> Vec<(Entity, usize)> {
        let mut out = Vec::with_capacity(self.node_count());
        let mut stack: Vec<(Entity, usize)> = self.roots().into_iter().rev().map(|e| (e, 0)).collect();
        while let Some((entity, depth)) = stack.pop() {
            out.push((entity, depth));
            for child in self.children(entity).iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }

    pub fn camera(&self) -> Entity {
        self.camera
    }

    pub fn camera_transform(&self) -> Transform {
        self.world.get::<Transform>(self.camera).copied().unwrap_or_default()
    }

    pub fn set_camera_transform(&mut self, transform: Transform) {
        if let Some(mut current) = self.world.get_mut::<Transform>(self.camera) {
            *current = transform;
        }
    }

    pub fn grid(&self) -> Option<EditorGrid> {
        self.world.get::<EditorGrid>(self.grid).copied()
    }

    pub fn set_grid(&mut self, grid: EditorGrid) {
        if let Some(mut current) = self.world.get_mut::<EditorGrid>(self.grid) {
            *current = grid;
        }
    }

    fn attach(&mut self, child: Entity, parent: Entity) {
        self.world.entity_mut(child).insert(Parent(parent));
        match self.world.get_mut::<Children>(parent) {
            Some(mut children) => children.0.push(child),
            None => {
                self.world.entity_mut(parent).insert(Children(vec![child]));
            }
        }
    }
}
