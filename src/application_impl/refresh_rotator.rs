use super::{SessionRegistrar, TokenIssuer, TokenValidator};
use crate::application_port::AuthError;
use crate::domain_model::*;
use crate::domain_port::{SessionStore, SwapError};
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;

/// Exchanges a refresh token for a new pair, invalidating the old refresh
/// session. The old access session is left alone.
pub struct RefreshRotator {
    validator: Arc<TokenValidator>,
    issuer: Arc<TokenIssuer>,
    store: Arc<dyn SessionStore>,
}

impl RefreshRotator {
    pub fn new(
        validator: Arc<TokenValidator>,
        issuer: Arc<TokenIssuer>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        RefreshRotator {
            validator,
            issuer,
            store,
        }
    }

    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .validator
            .validate_token(TokenKind::Refresh, refresh_token)
            .map_err(|e| AuthError::RefreshInvalid(Box::new(e)))?;

        // Signing is pure, so mint before touching the store.
        let pair = self.issuer.issue(claims.sub)?;
        let fresh = SessionRegistrar::records(&pair, Utc::now());

        match self.store.swap(&claims.sid, &fresh).await {
            Ok(true) => {
                debug!(user_id = %claims.sub, old = %claims.sid, new = %pair.refresh_session_id, "refresh rotated");
                Ok(pair)
            }
            Ok(false) => Err(AuthError::RefreshAlreadyUsedOrExpired),
            Err(SwapError::Revoke(e)) => Err(AuthError::StoreUnavailable(e.to_string())),
            Err(SwapError::Register(e)) => {
                error!(user_id = %claims.sub, old = %claims.sid, "old refresh session revoked but new pair not registered: {}", e);
                Err(AuthError::RegistrationFailed(e.to_string()))
            }
        }
    }
}
