//! Persistent cache scopes
//!
//! A cache scope is a named directory the build engine keeps across
//! builds and mounts into `Run` steps. Package managers point their
//! download caches at these so repeated builds skip the network.
//!
//! This crate only declares scopes. Creation, locking and eviction are
//! handled by whatever executes the definition.

use serde::{Deserialize, Serialize};
use std::fmt;

/// apt downloaded archives
pub const APT_CACHE_DIR: &str = "/var/cache/apt";

/// apt package lists and state
pub const APT_LIB_DIR: &str = "/var/lib/apt";

/// pip wheel and HTTP cache
pub const PIP_CACHE_DIR: &str = "/root/.cache/pip";

/// How concurrent builds may share a cache scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSharing {
    /// Any number of builds may use the scope at once
    Shared,
}

impl fmt::Display for CacheSharing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
        }
    }
}

/// A persistent cache directory mounted into a run step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheScope {
    /// Scope name; builds using the same id see the same directory
    pub id: String,
    /// Mount point inside the build container
    pub target: String,
    pub sharing: CacheSharing,
}

impl CacheScope {
    /// A shared scope named after its mount point
    pub fn shared(target: &str) -> Self {
        Self {
            id: target.to_string(),
            target: target.to_string(),
            sharing: CacheSharing::Shared,
        }
    }
}

/// Scopes for apt-get runs
pub fn apt_scopes() -> Vec<CacheScope> {
    vec![
        CacheScope::shared(APT_CACHE_DIR),
        CacheScope::shared(APT_LIB_DIR),
    ]
}

/// Scopes for pip runs
pub fn pip_scopes() -> Vec<CacheScope> {
    vec![CacheScope::shared(PIP_CACHE_DIR)]
}
