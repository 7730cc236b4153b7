//! Pending DM edits of bot messages.
//!
//! An administrator who reacts with ✏️ on a bot message gets one session, keyed by their user
//! id. Their next DM either applies the edit or, once the TTL has passed, reports expiry.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Minutes an edit session stays open.
pub const SESSION_TTL_MINUTES: i64 = 15;

/// A pending edit of one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSession {
    pub user_id: u64,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
    pub expires_at: DateTime<Utc>,
}

/// Result of claiming a user's session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionClaim {
    Active(EditSession),
    Expired(EditSession),
    Missing,
}

#[derive(Clone)]
pub struct EditSessionService {
    sessions: Arc<Mutex<HashMap<u64, EditSession>>>,
    ttl: Duration,
}

impl Default for EditSessionService {
    fn default() -> Self {
        Self::new(Duration::minutes(SESSION_TTL_MINUTES))
    }
}

impl EditSessionService {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Opens a session for `user_id`, replacing any previous one.
    pub async fn open(
        &self,
        user_id: u64,
        guild_id: Option<u64>,
        channel_id: u64,
        message_id: u64,
    ) -> EditSession {
        self.open_at(user_id, guild_id, channel_id, message_id, Utc::now())
            .await
    }

    pub async fn open_at(
        &self,
        user_id: u64,
        guild_id: Option<u64>,
        channel_id: u64,
        message_id: u64,
        now: DateTime<Utc>,
    ) -> EditSession {
        let session = EditSession {
            user_id,
            guild_id,
            channel_id,
            message_id,
            expires_at: now + self.ttl,
        };
        self.sessions
            .lock()
            .await
            .insert(user_id, session.clone());
        session
    }

    /// Removes and returns the session of `user_id`, telling whether it is still valid.
    pub async fn claim(&self, user_id: u64) -> SessionClaim {
        self.claim_at(user_id, Utc::now()).await
    }

    pub async fn claim_at(&self, user_id: u64, now: DateTime<Utc>) -> SessionClaim {
        match self.sessions.lock().await.remove(&user_id) {
            Some(session) if now > session.expires_at => SessionClaim::Expired(session),
            Some(session) => SessionClaim::Active(session),
            None => SessionClaim::Missing,
        }
    }

    /// Removes every expired session.
    ///
    /// # Returns
    /// - `Vec<EditSession>` - Sessions removed, so their users can be notified
    pub async fn remove_expired(&self) -> Vec<EditSession> {
        self.remove_expired_at(Utc::now()).await
    }

    pub async fn remove_expired_at(&self, now: DateTime<Utc>) -> Vec<EditSession> {
        let mut sessions = self.sessions.lock().await;

        let expired: Vec<u64> = sessions
            .values()
            .filter(|session| session.expires_at < now)
            .map(|session| session.user_id)
            .collect();

        expired
            .into_iter()
            .filter_map(|user_id| sessions.remove(&user_id))
            .collect()
    }
}
