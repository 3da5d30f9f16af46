use super::{SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which secret a token is signed with. Always chosen by the caller,
/// never read from the token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Payload signed inside both token kinds. Only access tokens carry
/// `authorized`; refresh tokens omit it on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub sid: SessionId,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub authorized: bool,
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(kind: TokenKind, user_id: UserId, session_id: SessionId, expires_at: DateTime<Utc>) -> Self {
        TokenClaims {
            sub: user_id,
            sid: session_id,
            authorized: kind == TokenKind::Access,
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

/// Freshly minted credentials. Never stored as a whole, only the two
/// session ids are registered.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub user_id: UserId,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_session_id: SessionId,
    pub refresh_session_id: SessionId,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_claims_omit_authorized_marker() {
        let claims = TokenClaims::new(TokenKind::Refresh, UserId(7), SessionId::generate(), Utc::now());
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("authorized").is_none());
        assert_eq!(json["sub"], serde_json::json!(7));
    }

    #[test]
    fn access_claims_carry_authorized_marker() {
        let claims = TokenClaims::new(TokenKind::Access, UserId(7), SessionId::generate(), Utc::now());
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["authorized"], serde_json::json!(true));
    }
}
