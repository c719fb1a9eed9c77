//! Request and response model for the caching agent.
//!
//! A cache entry maps a [`RequestKey`] (method + URL) to a [`StoredResponse`]
//! snapshot. Snapshots are plain owned values; cloning one yields the
//! independent copy needed when a response is both written to the store and
//! returned to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP status used for the synthesized offline-fallback response.
const OFFLINE_STATUS: u16 = 503;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
        };
        f.write_str(s)
    }
}

/// How a request was initiated. Only `Navigate` is significant to routing:
/// page navigations always go network-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RequestMode {
    /// A top-level page navigation.
    Navigate,
    /// A cross-origin subresource request.
    Cors,
    /// A cross-origin request without CORS (opaque response).
    #[default]
    NoCors,
    /// A request restricted to the page's own origin.
    SameOrigin,
}

/// An intercepted outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    /// Absolute URL or same-origin path, as issued by the page.
    pub url: String,
    pub mode: RequestMode,
}

impl FetchRequest {
    /// A plain GET subresource request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            mode: RequestMode::NoCors,
        }
    }

    /// A top-level page navigation.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }

    /// Cache identity of this request.
    pub fn key(&self) -> RequestKey {
        RequestKey {
            method: self.method,
            url: self.url.clone(),
        }
    }
}

/// Identity of a cache entry: method + URL, exactly as the request carries
/// them. Keys are compared literally; `/a` and `/a?x=1` are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: Method,
    pub url: String,
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// An owned snapshot of a fetched response.
///
/// The underlying platform response stream is single-consumption; storing a
/// response therefore always means storing a snapshot, and `Clone` is how a
/// second independent copy is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// When this snapshot was taken. Informational only; entries are never
    /// expired by age.
    pub stored_at: DateTime<Utc>,
}

impl StoredResponse {
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
            stored_at: Utc::now(),
        }
    }

    /// A 200 response with the given body. Mostly useful in tests.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, None, body.into())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The response served when the network is unreachable and the cache
    /// holds no entry for the request. The platform leaves this case
    /// undefined; answering with 503 makes the failure visible to the page
    /// instead of surfacing a transport error.
    pub fn offline_fallback() -> Self {
        Self::new(
            OFFLINE_STATUS,
            Some("text/plain; charset=utf-8".to_string()),
            b"Offline: no cached copy of this resource".to_vec(),
        )
    }
}
