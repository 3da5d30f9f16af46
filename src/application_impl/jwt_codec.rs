use crate::application_port::{AuthError, TokenCodec};
use crate::domain_model::{TokenClaims, TokenKind};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::fmt;
use std::time::Duration;

#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl JwtConfig {
    /// Upper bound for either token lifetime.
    pub const MAX_TTL: Duration = Duration::from_secs(5 * 365 * 24 * 60 * 60);

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            anyhow::bail!("jwt secrets must not be empty");
        }
        if self.access_secret == self.refresh_secret {
            anyhow::bail!("access and refresh secrets must differ");
        }
        if self.access_ttl.is_zero() || self.refresh_ttl.is_zero() {
            anyhow::bail!("token ttl must be positive");
        }
        if self.access_ttl > Self::MAX_TTL || self.refresh_ttl > Self::MAX_TTL {
            anyhow::bail!("token ttl must not exceed {}s", Self::MAX_TTL.as_secs());
        }
        if self.access_ttl >= self.refresh_ttl {
            anyhow::bail!("access ttl must be shorter than refresh ttl");
        }
        Ok(())
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        KeyPair {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// HS256 codec with independent access and refresh secrets.
pub struct JwtHs256Codec {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        JwtHs256Codec {
            access: KeyPair::from_secret(&cfg.access_secret),
            refresh: KeyPair::from_secret(&cfg.refresh_secret),
            validation,
        }
    }

    #[inline]
    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

impl TokenCodec for JwtHs256Codec {
    fn issue(&self, kind: TokenKind, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.keys(kind).encoding)
            .map_err(|e| AuthError::SigningFailure(e.to_string()))
    }

    fn parse_and_verify(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.keys(kind).decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::SignatureInvalid
                }
                _ => AuthError::MalformedToken,
            })?;

        let claims = data.claims;
        // Only access tokens may act as the user.
        if claims.authorized != (kind == TokenKind::Access) {
            return Err(AuthError::MalformedToken);
        }
        Ok(claims)
    }
}
