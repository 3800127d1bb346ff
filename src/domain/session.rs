use super::models::Role;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    // ---
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Token-based session storage.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    // ---
    /// Issue a new token for the given identity.
    async fn create(&self, info: &SessionInfo) -> Result<String>;

    /// Resolve a token. Unknown or expired tokens yield `None`.
    async fn validate(&self, token: &str) -> Result<Option<SessionInfo>>;

    async fn ping(&self) -> Result<()>;
}

pub type SessionStorePtr = Arc<dyn SessionStore>;
