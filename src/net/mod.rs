//! Network fetch primitive.
//!
//! The platform's fetch capability is modeled as the [`Network`] trait so the
//! agent can be exercised against a scripted fake. [`HttpNetwork`] is the
//! real reqwest-backed implementation.

pub mod http;

pub use http::HttpNetwork;

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::request::{FetchRequest, StoredResponse};

/// Abstraction over the live network.
///
/// A fetch that reaches the server returns a snapshot regardless of status
/// code; only transport-level failures (offline, DNS, reset) are errors.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, NetworkError>;
}
