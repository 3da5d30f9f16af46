use super::JwtConfig;
use crate::application_port::{AuthError, TokenCodec};
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Mints access/refresh pairs. Does not touch the session store.
pub struct TokenIssuer {
    codec: Arc<dyn TokenCodec>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(codec: Arc<dyn TokenCodec>, cfg: &JwtConfig) -> Self {
        TokenIssuer {
            codec,
            access_ttl: cfg.access_ttl,
            refresh_ttl: cfg.refresh_ttl,
        }
    }

    pub fn issue(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_expires_at = expires_at(now, self.access_ttl)?;
        let refresh_expires_at = expires_at(now, self.refresh_ttl)?;
        let access_session_id = SessionId::generate();
        let refresh_session_id = SessionId::generate();

        let access = TokenClaims::new(TokenKind::Access, user_id, access_session_id, access_expires_at);
        let refresh = TokenClaims::new(TokenKind::Refresh, user_id, refresh_session_id, refresh_expires_at);

        Ok(TokenPair {
            user_id,
            access_token: AccessToken(self.codec.issue(TokenKind::Access, &access)?),
            refresh_token: RefreshToken(self.codec.issue(TokenKind::Refresh, &refresh)?),
            access_session_id,
            refresh_session_id,
            access_expires_at,
            refresh_expires_at,
        })
    }
}

fn expires_at(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AuthError> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AuthError::SigningFailure(format!("token ttl out of range: {ttl:?}")))
}
