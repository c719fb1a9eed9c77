//! Request routing: strategy selection and the two serving strategies.

use std::borrow::Cow;
use std::fmt;

use tracing::{debug, warn};
use url::Url;

use crate::error::{AgentError, Result};
use crate::request::{FetchRequest, RequestMode, StoredResponse};

use super::{Agent, LifecycleState};

/// How a request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Try the live network, write the response through to the store, fall
    /// back to the cache on failure. For content that changes between
    /// deploys: pages and data.
    NetworkFirst,
    /// Serve from the store, touch the network only on a miss. For assets
    /// assumed immutable per version: styles, scripts, images, pinned
    /// third-party bundles.
    CacheFirst,
}

impl Strategy {
    /// The routing predicate, in precedence order: a navigation request, a
    /// `.json` path, or the root path goes network-first; everything else
    /// goes cache-first.
    pub fn for_request(request: &FetchRequest) -> Strategy {
        if request.mode == RequestMode::Navigate {
            return Strategy::NetworkFirst;
        }
        let path = request_path(&request.url);
        if path.ends_with(".json") || path == "/" {
            Strategy::NetworkFirst
        } else {
            Strategy::CacheFirst
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::NetworkFirst => "network-first",
            Strategy::CacheFirst => "cache-first",
        })
    }
}

/// Path component of a request URL, for absolute URLs and bare same-origin
/// paths alike. Query strings and fragments are not part of the path.
fn request_path(raw: &str) -> Cow<'_, str> {
    match Url::parse(raw) {
        Ok(url) => Cow::Owned(url.path().to_string()),
        // A bare path like `/data.json?d=1`
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let end = raw.find(['?', '#']).unwrap_or(raw.len());
            Cow::Borrowed(&raw[..end])
        }
        // Unparseable; route by the raw string
        Err(_) => Cow::Borrowed(raw),
    }
}

impl Agent {
    /// Answer an intercepted request.
    ///
    /// Only valid once the agent is `Active` (controlling pages); the
    /// platform does not route requests to an agent in any other state.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<StoredResponse> {
        {
            let state = self.state().await;
            if state != LifecycleState::Active {
                return Err(AgentError::InvalidState {
                    expected: LifecycleState::Active.as_str(),
                    actual: state.as_str(),
                });
            }
        }

        let strategy = Strategy::for_request(request);
        debug!(url = %request.url, %strategy, "Routing request");
        match strategy {
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
        }
    }

    /// Live fetch with write-through; cache fallback on network failure.
    async fn network_first(&self, request: &FetchRequest) -> Result<StoredResponse> {
        let name = self.config.cache_name();
        let key = request.key();

        match self.network.fetch(request).await {
            Ok(response) => {
                // The store gets its own snapshot; the caller gets the other.
                // A write failure costs the cache an entry, never the caller
                // a response already in hand.
                if let Err(e) = self.store.put(name, &key, response.clone()).await {
                    warn!(url = %request.url, error = %e, "Write-through failed, serving network response");
                }
                debug!(url = %request.url, status = response.status, "Served from network");
                Ok(response)
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Network failed, falling back to cache");
                match self.store.get(name, &key).await? {
                    Some(cached) => Ok(cached),
                    None => {
                        debug!(url = %request.url, "No cached copy, serving offline fallback");
                        Ok(StoredResponse::offline_fallback())
                    }
                }
            }
        }
    }

    /// Cache lookup first; a miss falls through to one live fetch whose
    /// result is returned directly and never written back.
    async fn cache_first(&self, request: &FetchRequest) -> Result<StoredResponse> {
        let name = self.config.cache_name();
        let key = request.key();

        if let Some(cached) = self.store.get(name, &key).await? {
            debug!(url = %request.url, "Served from cache");
            return Ok(cached);
        }

        debug!(url = %request.url, "Cache miss, fetching from network");
        let response = self.network.fetch(request).await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::agent::testutil::FakeNetwork;
    use crate::config::AgentConfig;
    use crate::error::{AgentError, StoreError};
    use crate::store::{CacheStorage, MemoryStore};

    use super::*;

    // ===== Routing predicate =====

    #[test]
    fn test_navigation_routes_network_first() {
        let req = FetchRequest::navigate("/events/parade");
        assert_eq!(Strategy::for_request(&req), Strategy::NetworkFirst);
    }

    #[test]
    fn test_root_and_json_route_network_first() {
        assert_eq!(
            Strategy::for_request(&FetchRequest::get("/")),
            Strategy::NetworkFirst
        );
        assert_eq!(
            Strategy::for_request(&FetchRequest::get("/data.json")),
            Strategy::NetworkFirst
        );
        // Query string does not hide the extension
        assert_eq!(
            Strategy::for_request(&FetchRequest::get("/data.json?day=2")),
            Strategy::NetworkFirst
        );
        // Absolute URL form of the root
        assert_eq!(
            Strategy::for_request(&FetchRequest::get("https://app.example.com/")),
            Strategy::NetworkFirst
        );
    }

    #[test]
    fn test_static_assets_route_cache_first() {
        assert_eq!(
            Strategy::for_request(&FetchRequest::get("/static/style.css")),
            Strategy::CacheFirst
        );
        assert_eq!(
            Strategy::for_request(&FetchRequest::get("/static/images/x.png")),
            Strategy::CacheFirst
        );
        assert_eq!(
            Strategy::for_request(&FetchRequest::get(
                "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"
            )),
            Strategy::CacheFirst
        );
    }

    #[test]
    fn test_request_path_extraction() {
        assert_eq!(request_path("/a/b.css?v=1#x"), "/a/b.css");
        assert_eq!(request_path("https://cdn.example.com/lib.js?x=1"), "/lib.js");
        assert_eq!(request_path("/"), "/");
    }

    // ===== Serving strategies =====

    async fn active_agent(
        version: &str,
    ) -> (Agent, Arc<MemoryStore>, Arc<FakeNetwork>) {
        let store = Arc::new(MemoryStore::new());
        store.open(version).await.unwrap();
        let network = Arc::new(FakeNetwork::new());
        let agent = Agent::new(
            AgentConfig::new(version, vec![]),
            store.clone(),
            network.clone(),
        );
        // Drive the agent to Active without a manifest
        agent.install().await.unwrap();
        agent.activate().await.unwrap();
        (agent, store, network)
    }

    #[tokio::test]
    async fn test_fetch_rejected_before_activation() {
        let agent = Agent::new(
            AgentConfig::new("v1", vec![]),
            Arc::new(MemoryStore::new()),
            Arc::new(FakeNetwork::new()),
        );
        let err = agent.handle_fetch(&FetchRequest::get("/")).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidState {
                expected: "active",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_network_first_returns_fresh_and_writes_through() {
        let (agent, store, network) = active_agent("v1").await;
        let req = FetchRequest::get("/data.json");

        // A stale cached copy exists
        store
            .put("v1", &req.key(), StoredResponse::ok("stale"))
            .await
            .unwrap();
        network.serve("/data.json", "fresh");

        let served = agent.handle_fetch(&req).await.unwrap();
        assert_eq!(served.body, b"fresh");

        // The store entry was overwritten to match
        let stored = store.get("v1", &req.key()).await.unwrap().unwrap();
        assert_eq!(stored.body, b"fresh");
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cache_when_offline() {
        let (agent, store, network) = active_agent("v1").await;
        let req = FetchRequest::navigate("/");

        let snapshot = StoredResponse::new(200, Some("text/html".to_string()), b"<html>".to_vec());
        store.put("v1", &req.key(), snapshot.clone()).await.unwrap();
        network.set_offline(true);

        let served = agent.handle_fetch(&req).await.unwrap();
        assert_eq!(served, snapshot);
    }

    #[tokio::test]
    async fn test_network_first_double_miss_serves_offline_fallback() {
        let (agent, _store, network) = active_agent("v1").await;
        network.set_offline(true);

        let served = agent
            .handle_fetch(&FetchRequest::navigate("/never-seen"))
            .await
            .unwrap();
        assert_eq!(served.status, 503);
    }

    /// A store whose writes always fail, e.g. because the backing storage
    /// is full.
    struct FailingPutStore {
        inner: MemoryStore,
    }

    #[async_trait::async_trait]
    impl CacheStorage for FailingPutStore {
        async fn open(&self, name: &str) -> std::result::Result<(), StoreError> {
            self.inner.open(name).await
        }

        async fn keys(&self) -> std::result::Result<Vec<String>, StoreError> {
            self.inner.keys().await
        }

        async fn delete(&self, name: &str) -> std::result::Result<bool, StoreError> {
            self.inner.delete(name).await
        }

        async fn put(
            &self,
            _name: &str,
            _key: &crate::request::RequestKey,
            _response: StoredResponse,
        ) -> std::result::Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            )))
        }

        async fn get(
            &self,
            name: &str,
            key: &crate::request::RequestKey,
        ) -> std::result::Result<Option<StoredResponse>, StoreError> {
            self.inner.get(name, key).await
        }
    }

    #[tokio::test]
    async fn test_write_through_failure_still_serves_network_response() {
        let store = Arc::new(FailingPutStore {
            inner: MemoryStore::new(),
        });
        let network = Arc::new(FakeNetwork::new());
        network.serve("/data.json", "fresh");

        let agent = Agent::new(
            AgentConfig::new("v1", vec![]),
            store.clone(),
            network.clone(),
        );
        agent.install().await.unwrap();
        agent.activate().await.unwrap();

        // The fetched response is served even though caching it failed
        let req = FetchRequest::get("/data.json");
        let served = agent.handle_fetch(&req).await.unwrap();
        assert_eq!(served.body, b"fresh");
        assert!(store.get("v1", &req.key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_first_hit_never_touches_network() {
        let (agent, store, network) = active_agent("v1").await;
        let req = FetchRequest::get("/static/style.css");
        let snapshot = StoredResponse::ok("body{}");
        store.put("v1", &req.key(), snapshot.clone()).await.unwrap();

        // Repeated identical requests return the same snapshot
        for _ in 0..3 {
            let served = agent.handle_fetch(&req).await.unwrap();
            assert_eq!(served, snapshot);
        }
        assert_eq!(network.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_first_miss_fetches_once_without_backfill() {
        let (agent, store, network) = active_agent("v1").await;
        let req = FetchRequest::get("/static/late-addition.png");
        network.serve("/static/late-addition.png", "png");

        let served = agent.handle_fetch(&req).await.unwrap();
        assert_eq!(served.body, b"png");
        assert_eq!(network.calls_for("/static/late-addition.png"), 1);

        // The fallback fetch is not written back to the store
        assert!(store.get("v1", &req.key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_first_miss_with_network_failure_is_an_error() {
        let (agent, _store, network) = active_agent("v1").await;
        network.set_offline(true);

        let err = agent
            .handle_fetch(&FetchRequest::get("/static/missing.css"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Network(_)));
    }

    #[tokio::test]
    async fn test_concurrent_network_first_writes_last_wins() {
        let (agent, store, network) = active_agent("v1").await;
        let agent = Arc::new(agent);
        network.serve("/data.json", "payload");

        let mut handles = Vec::new();
        for _ in 0..4 {
            let agent = agent.clone();
            handles.push(tokio::spawn(async move {
                agent.handle_fetch(&FetchRequest::get("/data.json")).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().body, b"payload");
        }

        let key = FetchRequest::get("/data.json").key();
        assert_eq!(store.get("v1", &key).await.unwrap().unwrap().body, b"payload");
    }
}
