//! Redis-backed session store.
//!
//! Sessions are JSON documents under `session:{token}` with a Redis TTL. The
//! login flow that issues them lives outside this service; `validate` is
//! what every `/api` request goes through.

use crate::domain::{Role, SessionInfo, SessionStore, SessionStorePtr};
use anyhow::{anyhow, Context, Result};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

// ---

/// Session data stored in Redis.
#[derive(Debug, Serialize, Deserialize)]
struct SessionData {
    //
    user_id: String,
    username: String,
    role: Role,
    expires_at: i64,
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

// ---

pub struct RedisSessionStore {
    // ---
    client: redis::Client,
    ttl: Duration,
}

impl RedisSessionStore {
    // ---
    pub fn new(client: redis::Client, ttl: Duration) -> Self {
        Self { client, ttl }
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection> {
        // ---
        self.client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to connect to Redis")
    }
}

/// Creates the Redis session store from a connection URL.
pub fn create_redis_session_store(url: &str, ttl: Duration) -> Result<SessionStorePtr> {
    // ---
    let client = redis::Client::open(url).context("Invalid ATTENDANCE_REDIS_URL")?;
    Ok(Arc::new(RedisSessionStore::new(client, ttl)))
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    // ---
    async fn create(&self, info: &SessionInfo) -> Result<String> {
        // ---
        let token = Uuid::new_v4().to_string();
        let ttl_secs = self.ttl.as_secs();
        let expires_at = chrono::Utc::now().timestamp() + ttl_secs as i64;

        let session_data = SessionData {
            user_id: info.user_id.to_string(),
            username: info.username.clone(),
            role: info.role,
            expires_at,
        };
        let session_json = serde_json::to_string(&session_data)?;

        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(session_key(&token), session_json, ttl_secs)
            .await
            .context("Failed to store session in Redis")?;

        tracing::info!("Created session for user: {}", info.username);

        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Option<SessionInfo>> {
        // ---
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .get(session_key(token))
            .await
            .context("Failed to read session from Redis")?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let data: SessionData = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Discarding unreadable session: {e}");
                return Ok(None);
            }
        };

        if data.expires_at < chrono::Utc::now().timestamp() {
            return Ok(None);
        }

        let user_id = Uuid::parse_str(&data.user_id)
            .map_err(|e| anyhow!("Session holds an invalid user id: {e}"))?;

        Ok(Some(SessionInfo {
            user_id,
            username: data.username,
            role: data.role,
        }))
    }

    async fn ping(&self) -> Result<()> {
        // ---
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
