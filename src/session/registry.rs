//! Session storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::debug;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Lifetime of a session after creation or renewal unless configured otherwise.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// One stored session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// The user that owns the session.
    pub user_id: String,
    /// The instant from which the session counts as expired.
    pub expires_at: Instant,
    /// Arbitrary per-session values.
    pub data: HashMap<String, String>,
}

impl SessionRecord {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Keyed store of sessions with lazy expiry.
///
/// Reads mask expired sessions without removing them; only
/// [`invalidate`](Self::invalidate) and [`sweep`](Self::sweep) remove
/// records. Nothing sweeps on its own: call `sweep` periodically or use
/// [`spawn_sweeper`](Self::spawn_sweeper).
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, SessionRecord>>>,
    timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Create a registry with the default 30 minute timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_SESSION_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start a session for `user_id` and return its id.
    pub fn create(&self, user_id: impl Into<String>) -> String {
        self.create_at(user_id, Instant::now())
    }

    /// The owning user, if the session exists and has not expired.
    pub fn resolve(&self, session_id: &str) -> Option<String> {
        self.resolve_at(session_id, Instant::now())
    }

    /// Push the expiry of an existing session out by the timeout.
    ///
    /// Works on sessions that have expired but not yet been swept.
    pub fn renew(&self, session_id: &str) -> bool {
        self.renew_at(session_id, Instant::now())
    }

    /// Remove a session. Returns whether it existed.
    pub fn invalidate(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }

    /// Remove every expired session and return how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Number of stored sessions, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Store a value on a live session. Returns false if there is none.
    pub fn set_data(&self, session_id: &str, key: impl Into<String>, value: impl Into<String>) -> bool {
        let now = Instant::now();
        match self.lock().get_mut(session_id) {
            Some(record) if !record.is_expired_at(now) => {
                record.data.insert(key.into(), value.into());
                true
            }
            _ => false,
        }
    }

    /// Read a value from a live session.
    pub fn get_data(&self, session_id: &str, key: &str) -> Option<String> {
        let now = Instant::now();
        self.lock()
            .get(session_id)
            .filter(|record| !record.is_expired_at(now))
            .and_then(|record| record.data.get(key).cloned())
    }

    /// Drop all values from a live session.
    pub fn clear_data(&self, session_id: &str) -> bool {
        let now = Instant::now();
        match self.lock().get_mut(session_id) {
            Some(record) if !record.is_expired_at(now) => {
                record.data.clear();
                true
            }
            _ => false,
        }
    }

    /// Run [`sweep`](Self::sweep) every `period` on the current Tokio runtime.
    ///
    /// Abort the returned handle to stop sweeping.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = registry.sweep();
                if removed > 0 {
                    debug!("Swept {removed} expired sessions");
                }
            }
        })
    }

    pub(crate) fn create_at(&self, user_id: impl Into<String>, now: Instant) -> String {
        let session_id = Uuid::new_v4().to_string();
        let record = SessionRecord {
            user_id: user_id.into(),
            expires_at: self.expiry_from(now),
            data: HashMap::new(),
        };
        self.lock().insert(session_id.clone(), record);
        session_id
    }

    pub(crate) fn resolve_at(&self, session_id: &str, now: Instant) -> Option<String> {
        self.lock()
            .get(session_id)
            .filter(|record| !record.is_expired_at(now))
            .map(|record| record.user_id.clone())
    }

    pub(crate) fn renew_at(&self, session_id: &str, now: Instant) -> bool {
        let expires_at = self.expiry_from(now);
        match self.lock().get_mut(session_id) {
            Some(record) => {
                record.expires_at = expires_at;
                true
            }
            None => false,
        }
    }

    pub(crate) fn sweep_at(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired_at(now));
        before - sessions.len()
    }

    fn expiry_from(&self, now: Instant) -> Instant {
        now.checked_add(self.timeout)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionRecord>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
