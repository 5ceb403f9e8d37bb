use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::SessionConfig;

#[derive(Debug)]
struct SessionEntry {
    attributes: HashMap<String, String>,
    /// Submission id to the bitstream being edited in it
    editing: HashMap<i32, i32>,
    last_access: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            attributes: HashMap::new(),
            editing: HashMap::new(),
            last_access: Instant::now(),
        }
    }
}

/// Server-side session data keyed by cookie id.
///
/// Clones share the same map.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, SessionEntry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            idle_timeout,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.idle_timeout))
    }

    /// Returns a handle on an existing live session, refreshing its idle
    /// timer. Expired sessions are dropped on the spot.
    pub fn load(&self, id: Uuid) -> Option<Session> {
        let mut entry = self.sessions.get_mut(&id)?;
        if entry.last_access.elapsed() > self.idle_timeout {
            drop(entry);
            self.sessions.remove(&id);
            tracing::debug!(session_id = %id, "Session expired");
            return None;
        }
        entry.last_access = Instant::now();
        Some(Session {
            id,
            store: self.clone(),
            is_new: false,
        })
    }

    pub fn create(&self) -> Session {
        let id = Uuid::new_v4();
        self.sessions.insert(id, SessionEntry::new());
        tracing::debug!(session_id = %id, "Session created");
        Session {
            id,
            store: self.clone(),
            is_new: true,
        }
    }

    pub fn load_or_create(&self, id: Option<Uuid>) -> Session {
        id.and_then(|id| self.load(id))
            .unwrap_or_else(|| self.create())
    }

    /// Removes sessions idle for longer than the timeout.
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        let timeout = self.idle_timeout;
        self.sessions
            .retain(|_, entry| entry.last_access.elapsed() <= timeout);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Starts a task purging expired sessions every `every`.
    pub fn spawn_purge_task(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = store.purge_expired();
                if purged > 0 {
                    tracing::info!(purged, remaining = store.len(), "Purged expired sessions");
                }
            }
        })
    }

    /// Runs `f` on a live entry. A purged session stays gone.
    fn with_entry<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionEntry) -> R) -> Option<R> {
        let Some(mut entry) = self.sessions.get_mut(&id) else {
            tracing::debug!(session_id = %id, "Session no longer exists");
            return None;
        };
        Some(f(&mut entry))
    }
}

/// Handle on one session, stored in request extensions.
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    store: SessionStore,
    is_new: bool,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// True when the session was created for the current request.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.store
            .with_entry(self.id, |e| e.attributes.get(name).cloned())
            .flatten()
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.store.with_entry(self.id, |e| {
            e.attributes.insert(name.to_string(), value);
        });
    }

    /// Bitstream currently edited within a submission.
    pub fn editing_bitstream(&self, submission_id: i32) -> Option<i32> {
        self.store
            .with_entry(self.id, |e| e.editing.get(&submission_id).copied())
            .flatten()
    }

    pub fn set_editing_bitstream(&self, submission_id: i32, bitstream_id: Option<i32>) {
        self.store.with_entry(self.id, |e| match bitstream_id {
            Some(bitstream_id) => {
                e.editing.insert(submission_id, bitstream_id);
            }
            None => {
                e.editing.remove(&submission_id);
            }
        });
    }
}
