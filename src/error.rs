//! Error types for the cacheworker library.

use thiserror::Error;

/// Errors produced by the network fetch primitive.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// The request could not be sent or the connection failed (offline,
    /// DNS failure, connection reset, ...).
    #[error("Network error: {0}")]
    Transport(String),

    /// The request URL could not be parsed or resolved against the base origin.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a non-success status where a success was
    /// required (precache).
    #[error("HTTP error {status}")]
    Status { status: u16 },
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        NetworkError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        NetworkError::InvalidUrl(err.to_string())
    }
}

/// Errors produced by a cache store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error while reading or writing store contents.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored entry could not be serialized or parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The named store does not exist.
    #[error("No such cache store: {0}")]
    NoSuchStore(String),
}

/// Failure of a platform lifecycle control (skip-waiting, claim-clients).
#[derive(Error, Debug)]
#[error("Lifecycle control error: {0}")]
pub struct ControlError(pub String);

/// Top-level agent errors spanning lifecycle and request handling.
#[derive(Error, Debug)]
pub enum AgentError {
    /// A manifest URL failed to fetch during install. Fatal to that
    /// install attempt; no manifest entry becomes observable.
    #[error("Precache failed for {url}: {source}")]
    Precache {
        /// The manifest URL that failed.
        url: String,
        source: NetworkError,
    },

    /// Network failure outside the precache batch.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Cache store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Platform control failure. The agent itself tolerates control
    /// failures during install and activation (they are logged, not
    /// propagated); this variant exists for downstream [`LifecycleControl`]
    /// implementors surfacing control errors through their own plumbing.
    ///
    /// [`LifecycleControl`]: crate::control::LifecycleControl
    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    /// An operation was invoked in a lifecycle state that does not permit it.
    #[error("Invalid lifecycle state: expected {expected}, was {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
}

/// A specialized `Result` type for cacheworker operations.
pub type Result<T> = std::result::Result<T, AgentError>;
