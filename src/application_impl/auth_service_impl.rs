use super::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::SessionStore;
use crate::logger::*;
use std::sync::Arc;

/// Token lifecycle over a session store: login, the access gate, logout
/// and refresh rotation.
pub struct RealAuthService {
    credential_verifier: Arc<dyn CredentialVerifier>,
    issuer: Arc<TokenIssuer>,
    registrar: SessionRegistrar,
    validator: Arc<TokenValidator>,
    gate: RevocationGate,
    rotator: RefreshRotator,
}

impl RealAuthService {
    pub fn new(
        credential_verifier: Arc<dyn CredentialVerifier>,
        token_codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn SessionStore>,
        cfg: &JwtConfig,
    ) -> Self {
        let issuer = Arc::new(TokenIssuer::new(token_codec.clone(), cfg));
        let validator = Arc::new(TokenValidator::new(token_codec));
        Self {
            credential_verifier,
            registrar: SessionRegistrar::new(session_store.clone()),
            gate: RevocationGate::new(session_store.clone()),
            rotator: RefreshRotator::new(validator.clone(), issuer.clone(), session_store),
            issuer,
            validator,
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        let LoginInput { username, password } = request;

        let user_id = self.credential_verifier.verify(&username, &password).await?;
        let pair = self.issuer.issue(user_id)?;
        self.registrar.register(&pair).await?;

        info!(%user_id, session_id = %pair.access_session_id, "login");
        Ok(pair)
    }

    async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthenticatedIdentity, AuthError> {
        let header = authorization.ok_or(AuthError::MalformedToken)?;
        let claims = self.validator.validate(TokenKind::Access, header)?;
        self.gate.authorize(&claims).await
    }

    async fn logout(&self, identity: &AuthenticatedIdentity) -> Result<(), AuthError> {
        match self.gate.revoke(&identity.session_id).await? {
            0 => Err(AuthError::RevokedOrUnknownSession),
            _ => {
                info!(user_id = %identity.user_id, session_id = %identity.session_id, "logout");
                Ok(())
            }
        }
    }

    async fn logout_all(&self, identity: &AuthenticatedIdentity) -> Result<u64, AuthError> {
        let revoked = self.gate.revoke_user(identity.user_id).await?;
        info!(user_id = %identity.user_id, revoked, "logout from all sessions");
        Ok(revoked)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.rotator.rotate(refresh_token).await
    }
}
