use crate::application_port::*;
use crate::domain_model::*;
use chrono::{Duration, Utc};

#[derive(Debug)]
pub struct FakeAuthService;

impl FakeAuthService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FakeAuthService {
    fn default() -> Self {
        Self::new()
    }
}

// Unsigned tokens that embed the user id, for front-end work without a
// session store. Nothing is ever revoked.
#[async_trait::async_trait]
impl AuthService for FakeAuthService {
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        Ok(get_fake_pair(get_fake_id(&request.username)))
    }

    async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthenticatedIdentity, AuthError> {
        let user_id = authorization
            .and_then(|h| h.strip_prefix("Bearer fake-access-token:"))
            .and_then(|id| id.parse::<UserId>().ok())
            .ok_or(AuthError::MalformedToken)?;
        Ok(AuthenticatedIdentity {
            session_id: SessionId(uuid::Uuid::nil()),
            user_id,
        })
    }

    async fn logout(&self, _identity: &AuthenticatedIdentity) -> Result<(), AuthError> {
        Ok(())
    }

    async fn logout_all(&self, _identity: &AuthenticatedIdentity) -> Result<u64, AuthError> {
        Ok(0)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        refresh_token
            .strip_prefix("fake-refresh-token:")
            .and_then(|id| id.parse::<UserId>().ok())
            .map(get_fake_pair)
            .ok_or(AuthError::RefreshInvalid(Box::new(AuthError::MalformedToken)))
    }
}

fn get_fake_id(username: &str) -> UserId {
    // FNV-1a, stable across runs.
    let hash = username
        .bytes()
        .fold(0xcbf29ce484222325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100000001b3));
    UserId(hash)
}

fn get_fake_pair(user_id: UserId) -> TokenPair {
    let now = Utc::now();
    TokenPair {
        user_id,
        access_token: AccessToken(format!("fake-access-token:{}", user_id)),
        refresh_token: RefreshToken(format!("fake-refresh-token:{}", user_id)),
        access_session_id: SessionId(uuid::Uuid::nil()),
        refresh_session_id: SessionId(uuid::Uuid::nil()),
        access_expires_at: now + Duration::days(1),
        refresh_expires_at: now + Duration::days(7),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_tokens_round_trip() {
        let auth = FakeAuthService::new();
        let pair = auth
            .login(LoginInput {
                username: "alice".to_string(),
                password: String::new(),
            })
            .await
            .unwrap();

        let header = format!("Bearer {}", pair.access_token.0);
        let identity = auth.authenticate(Some(&header)).await.unwrap();
        assert_eq!(identity.user_id, pair.user_id);

        let again = auth.refresh(&pair.refresh_token.0).await.unwrap();
        assert_eq!(again.user_id, pair.user_id);
        assert!(auth.authenticate(Some("Bearer nope")).await.is_err());
    }
}
