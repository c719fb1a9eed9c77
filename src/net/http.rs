//! HTTP network implementation backed by reqwest.

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;
use url::Url;

use crate::error::NetworkError;
use crate::request::{FetchRequest, Method, StoredResponse};

use super::Network;

/// Live network fetches over HTTP.
///
/// Relative manifest paths and same-origin request URLs are resolved against
/// the configured base origin. No request timeout is configured; a hung
/// request simply leaves its task suspended.
///
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: Client,
    base: Url,
}

impl HttpNetwork {
    /// Create a network handle resolving relative URLs against `base`
    /// (e.g. `https://app.example.com/`).
    pub fn new(base: Url) -> Result<Self, NetworkError> {
        let client = Client::builder().build()?;
        Ok(Self { client, base })
    }

    /// Resolve a request URL to an absolute URL.
    fn resolve(&self, raw: &str) -> Result<Url, NetworkError> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(self.base.join(raw)?),
            Err(e) => Err(e.into()),
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Patch => reqwest::Method::PATCH,
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, NetworkError> {
        let url = self.resolve(&request.url)?;
        debug!(method = %request.method, url = %url, "Fetching");

        let response = self
            .client
            .request(to_reqwest_method(request.method), url)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(StoredResponse::new(status, content_type, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_against_base() {
        let net = HttpNetwork::new(Url::parse("https://app.example.com/").unwrap()).unwrap();
        let url = net.resolve("/static/style.css").unwrap();
        assert_eq!(url.as_str(), "https://app.example.com/static/style.css");
    }

    #[test]
    fn test_resolve_absolute_passes_through() {
        let net = HttpNetwork::new(Url::parse("https://app.example.com/").unwrap()).unwrap();
        let url = net.resolve("https://unpkg.com/leaflet@1.9.4/dist/leaflet.js").unwrap();
        assert_eq!(url.host_str(), Some("unpkg.com"));
    }

    #[test]
    fn test_resolve_garbage_fails() {
        let net = HttpNetwork::new(Url::parse("https://app.example.com/").unwrap()).unwrap();
        assert!(net.resolve("http://[broken").is_err());
    }
}
