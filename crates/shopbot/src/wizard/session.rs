use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::state::Session;

struct StoredSession {
    session: Session,
    touched_at: Instant,
}

/// Open wizard sessions keyed by Telegram user id.
///
/// Sessions idle for longer than the TTL are treated as gone. Nothing is
/// persisted, a restart drops every open wizard.
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, StoredSession>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn get(&self, user_id: i64) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        if let Some(stored) = sessions.get(&user_id) {
            if stored.touched_at.elapsed() < self.ttl {
                return Some(stored.session.clone());
            }
            log::debug!("Wizard session of user {} expired", user_id);
            sessions.remove(&user_id);
        }
        None
    }

    pub async fn set(&self, user_id: i64, session: Session) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            user_id,
            StoredSession {
                session,
                touched_at: Instant::now(),
            },
        );
    }

    pub async fn clear(&self, user_id: i64) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(&user_id).map(|stored| stored.session)
    }

    /// Stores the next session, or drops it when the wizard is over.
    pub async fn store(&self, user_id: i64, next: Option<Session>) {
        match next {
            Some(session) => self.set(user_id, session).await,
            None => {
                self.clear(user_id).await;
            }
        }
    }

    /// Removes expired sessions, returns how many were dropped
    pub async fn cleanup(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, stored| stored.touched_at.elapsed() < self.ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Sweeps expired sessions every `interval` until the process exits.
    pub fn spawn_cleanup(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = self.cleanup().await;
                if removed > 0 {
                    log::info!("Dropped {} expired wizard session(s)", removed);
                }
            }
        })
    }
}
