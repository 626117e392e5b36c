use crate::scene::EditorScene;
use bevy_ecs::prelude::Entity;
use smallvec::SmallVec;

/// Non-owning set of selected scene nodes.
///
/// Entries are generation-checked entity handles; a node despawned elsewhere is simply skipped by
/// [`Selection::iter_live`] and dropped on the next [`Selection::prune`].
#[derive(Debug, Default, Clone)]
pub struct Selection {
    nodes: SmallVec<[Entity; 8]>,
}

impl Selection {
    pub fn insert(&mut self, node: Entity) -> bool {
        if self.nodes.contains(&node) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    pub fn remove(&mut self, node: Entity) -> bool {
        match self.nodes.iter().position(|entry| *entry == node) {
            Some(index) => {
                self.nodes.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.nodes.is_empty();
        self.nodes.clear();
        changed
    }

    pub fn contains(&self, node: Entity) -> bool {
        self.nodes.contains(&node)
    }

    pub fn iter_live<'a>(&'a self, scene: &'a EditorScene) -> impl Iterator<Item = Entity> + 'a {
        self.nodes.iter().copied().filter(move |node| scene.contains(*node))
    }

    /// Drops entries whose node no longer exists. Returns how many were dropped.
    pub fn prune(&mut self, scene: &EditorScene) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node| scene.contains(*node));
        before - self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
