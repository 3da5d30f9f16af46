use crate::application_port::AuthError;
use crate::domain_model::*;
use crate::domain_port::SessionStore;
use crate::logger::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Makes an issued pair durable: one store record per session id.
pub struct SessionRegistrar {
    store: Arc<dyn SessionStore>,
}

impl SessionRegistrar {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        SessionRegistrar { store }
    }

    pub fn records(pair: &TokenPair, now: DateTime<Utc>) -> [SessionRecord; 2] {
        [
            SessionRecord::until(pair.access_session_id, pair.user_id, pair.access_expires_at, now),
            SessionRecord::until(pair.refresh_session_id, pair.user_id, pair.refresh_expires_at, now),
        ]
    }

    /// Either both records are written or the pair must be discarded.
    pub async fn register(&self, pair: &TokenPair) -> Result<(), AuthError> {
        for record in Self::records(pair, Utc::now()) {
            self.store.put(&record).await.map_err(|e| {
                warn!(session_id = %record.session_id, user_id = %record.user_id, "registering session: {}", e);
                AuthError::RegistrationFailed(e.to_string())
            })?;
        }
        Ok(())
    }
}
