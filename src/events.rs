use crate::id_pool::SessionId;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SessionOpened { session: SessionId },
    SessionClosed { session: SessionId },
    ActiveSessionChanged { session: Option<SessionId> },
    SelectionChanged { session: SessionId },
    SceneLoaded { session: SessionId, path: PathBuf },
    SceneSaved { session: SessionId, path: PathBuf },
    ProjectLoaded { path: PathBuf, sessions: usize },
    ProjectSaved { path: PathBuf },
}

impl fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorEvent::SessionOpened { session } => write!(f, "SessionOpened session={session}"),
            EditorEvent::SessionClosed { session } => write!(f, "SessionClosed session={session}"),
            EditorEvent::ActiveSessionChanged { session: Some(session) } => {
                write!(f, "ActiveSessionChanged session={session}")
            }
            EditorEvent::ActiveSessionChanged { session: None } => write!(f, "ActiveSessionChanged session=none"),
            EditorEvent::SelectionChanged { session } => write!(f, "SelectionChanged session={session}"),
            EditorEvent::SceneLoaded { session, path } => {
                write!(f, "SceneLoaded session={session} path={}", path.display())
            }
            EditorEvent::SceneSaved { session, path } => {
                write!(f, "SceneSaved session={session} path={}", path.display())
            }
            EditorEvent::ProjectLoaded { path, sessions } => {
                write!(f, "ProjectLoaded path={} sessions={sessions}", path.display())
            }
            EditorEvent::ProjectSaved { path } => write!(f, "ProjectSaved path={}", path.display()),
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<EditorEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = EditorEvent>) {
        self.events.extend(events);
    }
}
