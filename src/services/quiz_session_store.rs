use crate::error::{Error, Result};
use crate::models::user::Actor;
use crate::services::quiz_engine::{QuizSession, SessionHandle, SessionSnapshot};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

const SESSION_IDLE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

struct SessionEntry {
    owner: Uuid,
    last_active: Instant,
    session: SessionHandle,
}

/// In-memory registry of live quiz sessions. Each session sits behind its own
/// mutex, so actions on one attempt run one at a time (an answer sent while
/// questions are still loading waits for the fetch to resolve) while
/// different users never contend. Sessions expire after a period without
/// any lookup, so an attempt in progress is never evicted.
#[derive(Clone)]
pub struct QuizSessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    idle_ttl: Duration,
}

impl Default for QuizSessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(SESSION_IDLE_TTL)
    }
}

impl QuizSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub async fn create(&self, actor: Actor) -> SessionSnapshot {
        let session = QuizSession::new(actor);
        let snapshot = session.snapshot();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| now.duration_since(entry.last_active) < self.idle_ttl);
        sessions.insert(
            session.id(),
            SessionEntry {
                owner: actor.user_id,
                last_active: now,
                session: Arc::new(Mutex::new(session)),
            },
        );
        tracing::debug!(session_id = %snapshot.session_id, live = sessions.len(), "quiz session created");
        snapshot
    }

    /// Looks up a session owned by `actor` and marks it active. Sessions of
    /// other users, and idle ones, are reported as missing.
    pub async fn get(&self, id: Uuid, actor: &Actor) -> Result<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let expired = sessions
            .get(&id)
            .is_some_and(|entry| now.duration_since(entry.last_active) >= self.idle_ttl);
        if expired {
            sessions.remove(&id);
            tracing::debug!(session_id = %id, "idle quiz session expired");
        }
        sessions
            .get_mut(&id)
            .filter(|entry| entry.owner == actor.user_id)
            .map(|entry| {
                entry.last_active = now;
                Arc::clone(&entry.session)
            })
            .ok_or_else(|| Error::NotFound("Quiz session not found".to_string()))
    }

    pub async fn remove(&self, id: Uuid, actor: &Actor) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(entry) if entry.owner == actor.user_id => {
                sessions.remove(&id);
                Ok(())
            }
            _ => Err(Error::NotFound("Quiz session not found".to_string())),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
