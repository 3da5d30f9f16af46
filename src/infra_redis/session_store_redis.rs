use crate::domain_model::*;
use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{
    AsyncCommands, FromRedisValue, RedisError, RedisResult, RedisWrite, Script, ToRedisArgs, Value,
};

const SESSION_PUT: &str = include_str!("session_put.lua");
const SESSION_DELETE: &str = include_str!("session_delete.lua");
const SESSION_SWAP: &str = include_str!("session_swap.lua");
const SESSION_DELETE_USER: &str = include_str!("session_delete_user.lua");

/// Sessions live at `{prefix}:session:{id}` with the user id as a decimal
/// string. `{prefix}:user:{id}` is a set of that user's session ids, kept
/// for bulk revocation. Writes and deletes keep the index in step; ids whose
/// keys expired passively are pruned on the next write for that user.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
    put_script: Script,
    delete_script: Script,
    swap_script: Script,
    delete_user_script: Script,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisSessionStore {
            conn,
            prefix: prefix.into(),
            put_script: Script::new(SESSION_PUT),
            delete_script: Script::new(SESSION_DELETE),
            swap_script: Script::new(SESSION_SWAP),
            delete_user_script: Script::new(SESSION_DELETE_USER),
        }
    }

    fn session_prefix(&self) -> String {
        format!("{}:session:", self.prefix)
    }

    fn key(&self, session_id: &SessionId) -> String {
        format!("{}{}", self.session_prefix(), session_id)
    }

    fn user_prefix(&self) -> String {
        format!("{}:user:", self.prefix)
    }

    fn user_key(&self, user_id: UserId) -> String {
        format!("{}{}", self.user_prefix(), user_id)
    }
}

impl ToRedisArgs for UserId {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        out.write_arg(self.to_string().as_bytes())
    }
}

impl FromRedisValue for UserId {
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        let s: String = redis::from_redis_value(v)?;
        let user_id = s.parse::<UserId>().map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "invalid UserId string",
                e.to_string(),
            ))
        })?;
        Ok(user_id)
    }
}

impl ToRedisArgs for SessionId {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        out.write_arg(self.to_string().as_bytes())
    }
}

fn store_error(e: RedisError) -> StoreError {
    if e.kind() == redis::ErrorKind::TypeError {
        StoreError::Corrupt(e.to_string())
    } else {
        StoreError::Unavailable(e.to_string())
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = self
            .put_script
            .key(self.key(&record.session_id))
            .key(self.user_key(record.user_id))
            .arg(&record.user_id)
            .arg(record.ttl_secs)
            .arg(&record.session_id)
            .arg(self.session_prefix())
            .invoke_async(&mut conn)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<UserId>, StoreError> {
        let mut conn = self.conn.clone();
        let val: Option<UserId> = conn.get(self.key(session_id)).await.map_err(store_error)?;
        Ok(val)
    }

    async fn delete(&self, session_id: &SessionId) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let deleted: u64 = self
            .delete_script
            .key(self.key(session_id))
            .arg(self.user_prefix())
            .arg(session_id)
            .invoke_async(&mut conn)
            .await
            .map_err(store_error)?;
        Ok(deleted)
    }

    async fn delete_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let deleted: u64 = self
            .delete_user_script
            .key(self.user_key(user_id))
            .arg(self.session_prefix())
            .arg(&user_id)
            .invoke_async(&mut conn)
            .await
            .map_err(store_error)?;
        Ok(deleted)
    }

    /// One Lua script, so the revoke and the new writes commit together.
    async fn swap(&self, old: &SessionId, fresh: &[SessionRecord]) -> Result<bool, SwapError> {
        let Some(first) = fresh.first() else {
            return self
                .delete(old)
                .await
                .map(|n| n > 0)
                .map_err(SwapError::Revoke);
        };

        let mut invocation = self.swap_script.prepare_invoke();
        invocation
            .key(self.key(old))
            .key(self.user_key(first.user_id))
            .arg(old)
            .arg(&first.user_id)
            .arg(self.session_prefix());
        for record in fresh {
            invocation
                .key(self.key(&record.session_id))
                .arg(&record.session_id)
                .arg(record.ttl_secs);
        }

        let mut conn = self.conn.clone();
        let swapped: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(|e| SwapError::Revoke(store_error(e)))?;
        Ok(swapped == 1)
    }
}
