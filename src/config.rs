//! Agent configuration.
//!
//! The cache version identifier and the asset manifest are fixed at
//! construction time. A deploy that changes either one produces a new
//! `AgentConfig` value (and therefore a new store name); nothing here is
//! mutated at runtime.

use serde::{Deserialize, Serialize};

/// Immutable agent configuration: the cache version identifier and the
/// ordered asset manifest precached at install time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Version identifier embedded in the store name. Bumped on each deploy.
    pub cache_version: String,

    /// Ordered list of URLs precached at install time. Mixes same-origin
    /// paths (`/`, `/static/style.css`) and absolute cross-origin URLs
    /// (CDN library bundles, font stylesheets).
    pub manifest: Vec<String>,
}

impl AgentConfig {
    pub fn new(cache_version: impl Into<String>, manifest: Vec<String>) -> Self {
        Self {
            cache_version: cache_version.into(),
            manifest,
        }
    }

    /// Name of the store treated as current for this configuration.
    /// Every differently-named store is stale and swept at activation.
    pub fn cache_name(&self) -> &str {
        &self.cache_version
    }
}
