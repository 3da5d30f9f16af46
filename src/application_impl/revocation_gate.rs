use crate::application_port::AuthError;
use crate::domain_model::*;
use crate::domain_port::SessionStore;
use crate::logger::*;
use std::sync::Arc;

/// Checks validated access claims against live session records.
pub struct RevocationGate {
    store: Arc<dyn SessionStore>,
}

impl RevocationGate {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        RevocationGate { store }
    }

    /// The store's user id wins over the token subject if they ever differ.
    pub async fn authorize(&self, claims: &TokenClaims) -> Result<AuthenticatedIdentity, AuthError> {
        let user_id = self
            .store
            .get(&claims.sid)
            .await?
            .ok_or(AuthError::RevokedOrUnknownSession)?;

        if user_id != claims.sub {
            warn!(session_id = %claims.sid, subject = %claims.sub, stored = %user_id, "session bound to a different user than token subject");
        }

        Ok(AuthenticatedIdentity {
            session_id: claims.sid,
            user_id,
        })
    }

    /// Number of records deleted; 0 means there was no live session.
    pub async fn revoke(&self, session_id: &SessionId) -> Result<u64, AuthError> {
        Ok(self.store.delete(session_id).await?)
    }

    pub async fn revoke_user(&self, user_id: UserId) -> Result<u64, AuthError> {
        Ok(self.store.delete_user(user_id).await?)
    }
}
