//! Lifecycle controls provided by the platform.
//!
//! Two controls are consumed by the agent: "skip waiting" (drop the standard
//! two-version overlap and activate as soon as install completes) and "claim
//! clients" (serve all currently open pages immediately instead of after
//! their next reload).

use async_trait::async_trait;

use crate::error::ControlError;

/// Platform hooks the agent pulls during its lifecycle transitions.
#[async_trait]
pub trait LifecycleControl: Send + Sync {
    /// Request an immediate transition out of the waiting state once install
    /// completes.
    async fn skip_waiting(&self) -> Result<(), ControlError>;

    /// Take over all currently open pages.
    async fn claim_clients(&self) -> Result<(), ControlError>;
}

/// A control implementation that does nothing, for environments without a
/// page registry (tests, standalone agents).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopControl;

#[async_trait]
impl LifecycleControl for NoopControl {
    async fn skip_waiting(&self) -> Result<(), ControlError> {
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), ControlError> {
        Ok(())
    }
}
