use crate::domain_model::*;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt session value: {0}")]
    Corrupt(String),
}

/// Failure of a combined revoke + register. `Revoke` means nothing changed,
/// `Register` means the old session is already gone.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SwapError {
    #[error("revoking old session: {0}")]
    Revoke(StoreError),
    #[error("registering new sessions: {0}")]
    Register(StoreError),
}

/// Key-value contract over the session store. Keys are session ids,
/// values the bound user id. Single-key operations are atomic.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Create or overwrite `record` with its TTL.
    async fn put(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// The user bound to `session_id`, or `None` once deleted or expired.
    async fn get(&self, session_id: &SessionId) -> Result<Option<UserId>, StoreError>;

    /// Number of records removed, 0 if there was nothing live.
    async fn delete(&self, session_id: &SessionId) -> Result<u64, StoreError>;

    /// Remove every live session bound to `user_id`.
    async fn delete_user(&self, user_id: UserId) -> Result<u64, StoreError>;

    /// Delete `old` and, only if it existed, write `fresh`. Returns `false`
    /// when `old` was already gone.
    ///
    /// The default runs separate calls: a failure after the delete leaves
    /// the caller with no live session. Stores with multi-key atomicity
    /// override it.
    async fn swap(&self, old: &SessionId, fresh: &[SessionRecord]) -> Result<bool, SwapError> {
        if self.delete(old).await.map_err(SwapError::Revoke)? == 0 {
            return Ok(false);
        }
        for record in fresh {
            self.put(record).await.map_err(SwapError::Register)?;
        }
        Ok(true)
    }
}
