//! File-seeded user directory.
//!
//! Users are listed in a YAML document with the SHA-256 hex digest of their bearer
//! token and the permission strings granted to them:
//!
//! ```yaml
//! users:
//!   - id: "u-100"
//!     school_id: 5
//!     token_sha256: "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
//!     permissions: ["reports:local:read", "reports:local:write"]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::core::{AppError, Result};
use crate::modules::access::traits::{Actor, ActorResolver, PermissionChecker};

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    #[serde(default)]
    pub school_id: Option<i64>,
    pub token_sha256: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    users: Vec<DirectoryUser>,
}

/// In-process actor resolver and permission checker
#[derive(Debug, Default)]
pub struct AccessDirectory {
    actors_by_digest: HashMap<String, Actor>,
    grants: HashMap<String, HashSet<String>>,
}

impl AccessDirectory {
    pub fn new(users: Vec<DirectoryUser>) -> Self {
        let mut directory = Self::default();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    /// Parse a YAML directory document
    pub fn from_yaml(source: &str) -> Result<Self> {
        let file: DirectoryFile = serde_yaml::from_str(source).map_err(|e| {
            AppError::Configuration(format!("Invalid access directory: {}", e))
        })?;
        Ok(Self::new(file.users))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read access directory {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&source)
    }

    /// Hex SHA-256 of a bearer token, the form stored in the directory
    pub fn token_digest(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    pub fn insert(&mut self, user: DirectoryUser) {
        let actor = Actor {
            id: user.id.clone(),
            school_id: user.school_id,
        };
        self.actors_by_digest
            .insert(user.token_sha256.to_ascii_lowercase(), actor);
        self.grants
            .entry(user.id)
            .or_default()
            .extend(user.permissions);
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[async_trait]
impl ActorResolver for AccessDirectory {
    async fn resolve_actor(&self, token: &str) -> Result<Actor> {
        self.actors_by_digest
            .get(&Self::token_digest(token))
            .cloned()
            .ok_or_else(|| AppError::unauthorized("User not found."))
    }
}

#[async_trait]
impl PermissionChecker for AccessDirectory {
    async fn is_allowed(&self, actor_id: &str, permission: &str) -> Result<bool> {
        Ok(self
            .grants
            .get(actor_id)
            .is_some_and(|granted| granted.contains(permission)))
    }
}
