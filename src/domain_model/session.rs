use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(SessionId)
    }
}

/// One live session as the store sees it: key, bound user, time left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub ttl_secs: u64,
}

impl SessionRecord {
    /// Builds a record whose TTL is the time remaining until `expires_at`.
    /// Never shorter than one second, stores reject a zero expiry.
    pub fn until(
        session_id: SessionId,
        user_id: UserId,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let secs = (expires_at - now).num_seconds();
        SessionRecord {
            session_id,
            user_id,
            ttl_secs: if secs <= 0 { 1 } else { secs as u64 },
        }
    }
}

/// Result of a successful access check. Produced per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub session_id: SessionId,
    pub user_id: UserId,
}
