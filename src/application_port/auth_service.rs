use crate::domain_model::*;
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("malformed token")]
    MalformedToken,
    #[error("token signature invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("session revoked or unknown")]
    RevokedOrUnknownSession,
    #[error("refresh token invalid: {0}")]
    RefreshInvalid(Box<AuthError>),
    #[error("refresh token already used or expired")]
    RefreshAlreadyUsedOrExpired,
    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("signing failure: {0}")]
    SigningFailure(String),
    #[error("session registration failed: {0}")]
    RegistrationFailed(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::StoreUnavailable(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// What callers receive after login or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

impl From<TokenPair> for AuthTokens {
    fn from(pair: TokenPair) -> Self {
        AuthTokens {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_token_expires_at: pair.access_expires_at,
            refresh_token_expires_at: pair.refresh_expires_at,
        }
    }
}

/// Signs and verifies tokens. The secret is picked by `kind` alone.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, kind: TokenKind, claims: &TokenClaims) -> Result<String, AuthError>;
    fn parse_and_verify(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<UserId, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError>;
    /// Runs the full access check on a raw `Authorization` header value.
    async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthenticatedIdentity, AuthError>;
    async fn logout(&self, identity: &AuthenticatedIdentity) -> Result<(), AuthError>;
    async fn logout_all(&self, identity: &AuthenticatedIdentity) -> Result<u64, AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
}
