//! The caching agent: lifecycle controller and request router.
//!
//! An [`Agent`] owns an immutable [`AgentConfig`] and handles to the three
//! platform capabilities it consumes: a named-store cache, the network, and
//! the lifecycle controls. The platform invokes `install`, `activate` and
//! `handle_fetch` as independently scheduled tasks; the agent only defines
//! what each task does once invoked.

pub mod lifecycle;
pub mod router;

pub use router::Strategy;

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::AgentConfig;
use crate::control::{LifecycleControl, NoopControl};
use crate::error::{AgentError, Result};
use crate::net::Network;
use crate::store::CacheStorage;

/// Agent lifecycle states.
///
/// `Redundant` is terminal: it is reached when a newer agent registers before
/// this one becomes active, or when this agent's install fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unregistered,
    Installing,
    /// Install succeeded; waiting to activate.
    Installed,
    Activating,
    /// Controlling pages and routing their requests.
    Active,
    Redundant,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Unregistered => "unregistered",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
            LifecycleState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The offline caching agent.
pub struct Agent {
    config: AgentConfig,
    store: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    control: Arc<dyn LifecycleControl>,
    state: RwLock<LifecycleState>,
}

impl Agent {
    /// Create an agent over the given store and network, with no-op
    /// lifecycle controls.
    pub fn new(
        config: AgentConfig,
        store: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            config,
            store,
            network,
            control: Arc::new(NoopControl),
            state: RwLock::new(LifecycleState::Unregistered),
        }
    }

    /// Replace the lifecycle controls with a platform-provided implementation.
    pub fn with_control(mut self, control: Arc<dyn LifecycleControl>) -> Self {
        self.control = control;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Mark this agent redundant, e.g. because a newer version registered
    /// before this one reached `Active`.
    pub async fn mark_redundant(&self) {
        *self.state.write().await = LifecycleState::Redundant;
    }

    /// Move from `expected` to `next`, failing if the current state differs.
    pub(crate) async fn transition(
        &self,
        expected: LifecycleState,
        next: LifecycleState,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if *state != expected {
            return Err(AgentError::InvalidState {
                expected: expected.as_str(),
                actual: state.as_str(),
            });
        }
        *state = next;
        Ok(())
    }

    pub(crate) async fn set_state(&self, next: LifecycleState) {
        *self.state.write().await = next;
    }
}
