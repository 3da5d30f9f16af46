use super::*;
use crate::application_port::TokenCodec;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::MemorySessionStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

pub fn test_config() -> JwtConfig {
    JwtConfig {
        access_secret: b"access-secret-for-tests".to_vec(),
        refresh_secret: b"refresh-secret-for-tests".to_vec(),
        access_ttl: Duration::from_secs(15 * 60),
        refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
    }
}

pub fn codec() -> Arc<dyn TokenCodec> {
    Arc::new(JwtHs256Codec::new(&test_config()))
}

pub fn issuer() -> TokenIssuer {
    issuer_with(codec())
}

pub fn issuer_with(codec: Arc<dyn TokenCodec>) -> TokenIssuer {
    TokenIssuer::new(codec, &test_config())
}

pub async fn registered_access_claims(store: Arc<dyn SessionStore>, user_id: UserId) -> TokenClaims {
    let codec = codec();
    let pair = issuer_with(codec.clone()).issue(user_id).unwrap();
    SessionRegistrar::new(store).register(&pair).await.unwrap();
    codec
        .parse_and_verify(TokenKind::Access, &pair.access_token.0)
        .unwrap()
}

/// Memory store that can be switched off or made to fail writes.
/// Keeps the trait's default `swap` so the non-atomic path is exercised.
pub struct FlakyStore {
    inner: MemorySessionStore,
    down: AtomicBool,
    puts_left: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Self {
        FlakyStore {
            inner: MemorySessionStore::new(),
            down: AtomicBool::new(false),
            puts_left: AtomicU32::new(u32::MAX),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Let the next `n` puts through, fail the rest.
    pub fn fail_put_after(&self, n: u32) {
        self.puts_left.store(n, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for FlakyStore {
    async fn put(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.check()?;
        let allowed = self
            .puts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                0 => None,
                u32::MAX => Some(u32::MAX),
                n => Some(n - 1),
            })
            .is_ok();
        if !allowed {
            return Err(StoreError::Unavailable("write timed out".to_string()));
        }
        self.inner.put(record).await
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<UserId>, StoreError> {
        self.check()?;
        self.inner.get(session_id).await
    }

    async fn delete(&self, session_id: &SessionId) -> Result<u64, StoreError> {
        self.check()?;
        self.inner.delete(session_id).await
    }

    async fn delete_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        self.check()?;
        self.inner.delete_user(user_id).await
    }
}
