//! cacheworker - an offline caching agent for static web apps.
//!
//! The agent precaches a fixed asset manifest into a versioned named cache
//! store, garbage-collects stores left behind by earlier versions, and
//! answers every intercepted request with one of two strategies:
//!
//! - **network-first** for pages, `.json` data and the root path: the live
//!   response wins and is written through to the store, with the cached copy
//!   as the offline fallback;
//! - **cache-first** for everything else (styles, scripts, images, pinned
//!   third-party bundles): the stored snapshot wins, the network is only
//!   touched on a miss and never written back.
//!
//! The platform surfaces are injected as traits - [`store::CacheStorage`],
//! [`net::Network`] and [`control::LifecycleControl`] - so the agent can run
//! against an in-memory store and a scripted network in tests, and against a
//! disk store and HTTP in production.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cacheworker::{Agent, AgentConfig, FetchRequest, HttpNetwork, MemoryStore};
//!
//! # async fn demo() -> cacheworker::Result<()> {
//! let config = AgentConfig::new(
//!     "app-v9",
//!     vec![
//!         "/".to_string(),
//!         "/static/style.css".to_string(),
//!         "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js".to_string(),
//!     ],
//! );
//! let network = HttpNetwork::new("https://app.example.com/".parse().unwrap())?;
//! let agent = Agent::new(config, Arc::new(MemoryStore::new()), Arc::new(network));
//!
//! agent.install().await?;
//! agent.activate().await?;
//!
//! let response = agent.handle_fetch(&FetchRequest::navigate("/")).await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod control;
pub mod error;
pub mod net;
pub mod request;
pub mod store;

pub use agent::{Agent, LifecycleState, Strategy};
pub use config::AgentConfig;
pub use control::{LifecycleControl, NoopControl};
pub use error::{AgentError, ControlError, NetworkError, Result, StoreError};
pub use net::{HttpNetwork, Network};
pub use request::{FetchRequest, Method, RequestKey, RequestMode, StoredResponse};
pub use store::{CacheStorage, DiskStore, MemoryStore};
