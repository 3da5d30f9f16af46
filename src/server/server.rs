use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::UserId;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
}

impl Server {
    pub fn new(auth_service: Arc<dyn AuthService>) -> Self {
        Self { auth_service }
    }

    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let jwt_config = JwtConfig {
            access_secret: settings.jwt.access_secret.clone().into_bytes(),
            refresh_secret: settings.jwt.refresh_secret.clone().into_bytes(),
            access_ttl: Duration::from_secs(settings.jwt.access_ttl_secs),
            refresh_ttl: Duration::from_secs(settings.jwt.refresh_ttl_secs),
        };
        jwt_config.validate()?;
        debug!(?jwt_config);

        let auth_service: Arc<dyn AuthService> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeAuthService::new()),
            "real" => {
                let session_store = Self::session_store(settings).await?;
                let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(&jwt_config));
                let credential_verifier: Arc<dyn CredentialVerifier> =
                    Arc::new(StaticCredentialVerifier::new(settings.auth.accounts.iter().map(
                        |a| StaticAccount {
                            user_id: UserId(a.user_id),
                            username: a.username.clone(),
                            password: a.password.clone(),
                        },
                    )));
                Arc::new(RealAuthService::new(
                    credential_verifier,
                    token_codec,
                    session_store,
                    &jwt_config,
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        info!(auth = %settings.auth.backend, store = %settings.store.backend, "server started");

        Ok(Self::new(auth_service))
    }

    async fn session_store(settings: &Settings) -> anyhow::Result<Arc<dyn SessionStore>> {
        match settings.store.backend.as_str() {
            "redis" => {
                let redis_client = redis::Client::open(settings.store.dsn.as_str())?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Ok(Arc::new(RedisSessionStore::new(
                    redis_manager,
                    settings.store.prefix.clone(),
                )))
            }
            "memory" => {
                warn!("sessions are kept in process memory and lost on restart");
                Ok(Arc::new(MemorySessionStore::new()))
            }
            other => Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        }
    }
}
