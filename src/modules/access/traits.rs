use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// The user on whose behalf an operation runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    /// School the user belongs to; users without a school only ever act globally
    pub school_id: Option<i64>,
}

/// Maps a bearer token to the acting user
#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// Returns `AppError::Unauthorized` when the token does not identify a user
    async fn resolve_actor(&self, token: &str) -> Result<Actor>;
}

/// Boolean permission decision for a user and a permission string
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn is_allowed(&self, actor_id: &str, permission: &str) -> Result<bool>;
}
