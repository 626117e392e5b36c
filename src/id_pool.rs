use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of an open scene session. `0` is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u32);

impl SessionId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues identifiers that are unique among live sessions.
///
/// Allocation always hands out the lowest free identifier, so an identifier released by a closed
/// session is the next one issued.
#[derive(Debug, Default, Clone)]
pub struct IdPool {
    held: BTreeSet<SessionId>,
}

impl IdPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> SessionId {
        let mut candidate = 1u32;
        for held in &self.held {
            if held.0 != candidate {
                break;
            }
            candidate += 1;
        }
        let id = SessionId(candidate);
        self.held.insert(id);
        id
    }

    /// Returns `false` when `id` was not held, which means a double free or a foreign id.
    pub fn reclaim(&mut self, id: SessionId) -> bool {
        self.held.remove(&id)
    }

    /// Claims an identifier coming from persisted data.
    pub fn reserve(&mut self, id: SessionId) -> bool {
        if !id.is_valid() {
            return false;
        }
        self.held.insert(id)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, id: SessionId) -> bool {
        self.held.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.held.iter().copied()
    }
}
