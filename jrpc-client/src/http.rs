//! JSON-RPC over HTTP
//!
//! Each call (or batch) is one `POST` to the endpoint with a JSON body. A
//! single call is sent as a bare request object, a batch as an array. The
//! reply must come back with status 200; its body is decoded as one response
//! object or as an array of them.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jrpc_client::{HttpTransport, JrpcClient};
//! use std::time::Duration;
//!
//! let transport = HttpTransport::builder("http://localhost:8080/rpc")
//!     .header("Authorization", "Bearer secret")
//!     .timeout(Duration::from_secs(5))
//!     .build();
//!
//! let client = JrpcClient::new(transport);
//! ```

use crate::transport::Transport;
use async_trait::async_trait;
use jrpc_core::{codec, Error, Request, Response, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;

/// HTTP transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Transport with default settings
    pub fn new(url: impl Into<String>) -> Self {
        Self::builder(url).build()
    }

    /// Start configuring a transport
    pub fn builder(url: impl Into<String>) -> HttpTransportBuilder {
        HttpTransportBuilder::new(url)
    }

    /// Endpoint every request is posted to
    pub fn url(&self) -> &str {
        &self.url
    }

    fn header_map(&self, method: &str) -> Result<HeaderMap> {
        let marshal = |e: Box<dyn std::error::Error + Send + Sync>| Error::Marshal {
            method: method.to_string(),
            source: e,
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Custom headers go in last so they can replace the content type.
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| marshal(Box::new(e)))?;
            let value = HeaderValue::from_str(value).map_err(|e| marshal(Box::new(e)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, requests), fields(url = %self.url, count = requests.len()))]
    async fn send(&self, requests: &[Request], batch: bool) -> Result<Option<Vec<Response>>> {
        let body = codec::encode_requests(requests, batch)?;
        let method = requests.first().map(|r| r.method.as_str()).unwrap_or_default();
        let headers = self.header_map(method)?;

        let mut request = self.client.post(&self.url).headers(headers).body(body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(method = %method, "Posting request");
        let response = request.send().await.map_err(|e| Error::Invoke {
            method: method.to_string(),
            source: Box::new(e),
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(method = %method, status = status.as_u16(), "Unexpected status");
            return Err(Error::StatusCode {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| Error::Invoke {
            method: method.to_string(),
            source: Box::new(e),
        })?;

        let responses = codec::decode_responses(&bytes, batch, method)?;
        tracing::debug!(
            method = %method,
            responses = responses.as_ref().map_or(0, Vec::len),
            "Reply decoded"
        );
        Ok(responses)
    }
}

/// Builder for [`HttpTransport`]
///
/// # Defaults
///
/// - HTTP client: `reqwest::Client::new()`
/// - headers: only `Content-Type: application/json`
/// - timeout: none
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    url: String,
    client: Option<reqwest::Client>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    /// Builder for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Use a preconfigured `reqwest::Client` (proxies, TLS, pools)
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Add a header to every request, replacing an earlier one of the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several headers to every request
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Fail any request that takes longer than `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the transport
    ///
    /// Header names and values are checked when a request is sent.
    pub fn build(self) -> HttpTransport {
        HttpTransport {
            url: self.url,
            client: self.client.unwrap_or_default(),
            headers: self.headers,
            timeout: self.timeout,
        }
    }
}
