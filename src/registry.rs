use crate::host::{DockPlacement, DockSlot, PanelHost};
use crate::id_pool::{IdPool, SessionId};
use crate::resources::ResourceRoots;
use crate::session::{SceneSession, SessionBlock, SessionError};

/// Outcome of one [`SessionRegistry::run_frame`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub closed: Vec<SessionId>,
    pub active: Option<SessionId>,
    pub active_changed: bool,
}

/// Ordered collection of open scene sessions; order is the tab order.
pub struct SessionRegistry {
    sessions: Vec<SceneSession>,
    active: Option<SessionId>,
    ids: IdPool,
    first_dock_anchor: String,
    scene_title: String,
}

impl SessionRegistry {
    pub fn new(first_dock_anchor: impl Into<String>, scene_title: impl Into<String>) -> Self {
        Self {
            sessions: Vec::new(),
            active: None,
            ids: IdPool::new(),
            first_dock_anchor: first_dock_anchor.into(),
            scene_title: scene_title.into(),
        }
    }

    /// Opens a new empty session with a freshly allocated id.
    pub fn create_session(&mut self) -> SessionId {
        let id = self.ids.allocate();
        let session = SceneSession::new(id, self.scene_title.clone(), self.next_placement());
        log::debug!("[registry] Created scene session {}", session.unique_title());
        self.sessions.push(session);
        id
    }

    /// Opens a session from a project block. Nothing is added when the persisted id is taken.
    pub fn restore_session(
        &mut self,
        block: &SessionBlock,
        resources: &ResourceRoots,
    ) -> Result<SessionId, SessionError> {
        let placement = self.next_placement();
        let session = SceneSession::restore(block, &mut self.ids, placement, resources)?;
        let id = session.id();
        log::debug!("[registry] Restored scene session {}", session.unique_title());
        self.sessions.push(session);
        Ok(id)
    }

    /// Renders every session in order, drops the ones whose panel was closed and arbitrates which
    /// session is active.
    ///
    /// Every rendered session takes over a claim held by an unfocused session, so without focus the
    /// last visible session wins. Once a focused session holds the claim, later sessions do not take
    /// it. Hosts may briefly report several focused panels while a dock is dragged.
    pub fn run_frame<H: PanelHost + ?Sized>(&mut self, host: &mut H) -> FrameReport {
        let previous = self.active;
        let mut report = FrameReport::default();
        let mut claim: Option<(SessionId, bool)> = None;
        let mut index = 0;
        while index < self.sessions.len() {
            let session = &mut self.sessions[index];
            if !session.render_frame(host) {
                let id = session.id();
                self.sessions.remove(index);
                if !self.ids.reclaim(id) {
                    log::error!("[registry] Closed scene session {id} did not hold its id");
                }
                report.closed.push(id);
                continue;
            }
            if session.is_rendered() {
                let focused = session.is_active();
                if !matches!(claim, Some((_, true))) {
                    claim = Some((session.id(), focused));
                }
            }
            index += 1;
        }
        if let Some((id, _)) = claim {
            self.active = Some(id);
        } else if self.active.is_some_and(|id| self.get(id).is_none()) {
            self.active = None;
        }
        report.active = self.active;
        report.active_changed = previous != self.active;
        report
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active.filter(|id| self.get(*id).is_some())
    }

    pub fn active_session(&self) -> Option<&SceneSession> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_session_mut(&mut self) -> Option<&mut SceneSession> {
        let id = self.active?;
        self.get_mut(id)
    }

    pub fn get(&self, id: SessionId) -> Option<&SceneSession> {
        self.sessions.iter().find(|session| session.id() == id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut SceneSession> {
        self.sessions.iter_mut().find(|session| session.id() == id)
    }

    pub fn sessions(&self) -> &[SceneSession] {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> impl Iterator<Item = &mut SceneSession> {
        self.sessions.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops every session without releasing ids; project load clears the pool itself.
    pub fn clear(&mut self) {
        self.sessions.clear();
        self.active = None;
    }

    pub fn ids(&self) -> &IdPool {
        &self.ids
    }

    pub fn ids_mut(&mut self) -> &mut IdPool {
        &mut self.ids
    }

    pub fn last_unique_title(&self) -> Option<&str> {
        self.sessions.last().map(|session| session.unique_title())
    }

    fn next_placement(&self) -> DockPlacement {
        match self.sessions.last() {
            Some(previous) => DockPlacement::next_to(previous.unique_title(), DockSlot::Tab),
            None => DockPlacement::next_to(self.first_dock_anchor.clone(), DockSlot::Right),
        }
    }
}
