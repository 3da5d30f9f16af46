use crate::application_port::{AuthError, TokenCodec};
use crate::domain_model::*;
use std::sync::Arc;

/// Structural and cryptographic checks only. Never consults the store.
pub struct TokenValidator {
    codec: Arc<dyn TokenCodec>,
}

impl TokenValidator {
    pub fn new(codec: Arc<dyn TokenCodec>) -> Self {
        TokenValidator { codec }
    }

    /// Validates an `Authorization` header value of the form `Bearer <token>`.
    pub fn validate(&self, kind: TokenKind, header: &str) -> Result<TokenClaims, AuthError> {
        let token = extract_bearer(header).ok_or(AuthError::MalformedToken)?;
        self.validate_token(kind, token)
    }

    pub fn validate_token(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, AuthError> {
        self.codec.parse_and_verify(kind, token)
    }
}

/// Exactly two space-separated parts, the first being the bearer scheme.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Some(token)
        }
        _ => None,
    }
}
