//! HTTP transport for the daemon API.
//!
//! Two request shapes exist: a query-string GET, and a POST carrying a single
//! multipart field plus optional query parameters. Responses are returned as
//! raw bytes; interpreting the JSON is left to the operation that made the
//! call. Failures are classified through [`classify`].

use std::time::Duration;

use bytes::Bytes;
use ipfsbridge_config::{AppConfig, DaemonConfig};
use reqwest::header::USER_AGENT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::build_info;
use crate::error::{IpfsError, TransportFailure, classify};

/// Query parameters as `(name, value)` pairs.
pub type Query<'a> = [(&'a str, &'a str)];

/// Request builder and sender bound to one daemon base URL.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    daemon: DaemonConfig,
    request_timeout: Duration,
    stream_idle_timeout: Option<Duration>,
    max_stream_message: usize,
}

impl Transport {
    /// Create a transport from an already-resolved configuration.
    pub fn new(config: &AppConfig) -> Self {
        let idle = config.pubsub.idle_timeout_secs;
        Self {
            client: Client::new(),
            daemon: config.daemon.clone(),
            request_timeout: Duration::from_secs(config.daemon.request_timeout_secs),
            stream_idle_timeout: (idle > 0).then(|| Duration::from_secs(idle)),
            max_stream_message: config.pubsub.max_message_bytes,
        }
    }

    /// Override the request/response deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the idle-read deadline of streaming calls (`None` = wait forever).
    pub fn with_stream_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    /// Override the size cap on one pending streamed message.
    pub fn with_max_stream_message(mut self, bytes: usize) -> Self {
        self.max_stream_message = bytes;
        self
    }

    pub fn max_stream_message(&self) -> usize {
        self.max_stream_message
    }

    pub fn base_url(&self) -> &str {
        &self.daemon.base_url
    }

    /// Full URL of an endpoint.
    pub fn url(&self, endpoint: &str) -> String {
        self.daemon.api_url(endpoint)
    }

    /// Query-string GET.
    pub async fn get(&self, endpoint: &str, query: &Query<'_>) -> Result<Bytes, IpfsError> {
        debug!(endpoint, "daemon GET");
        let request = self
            .request(Method::GET, endpoint)
            .query(query)
            .timeout(self.request_timeout);
        self.execute(endpoint, request).await
    }

    /// POST with a single multipart field named `field`.
    pub async fn post_multipart(
        &self,
        endpoint: &str,
        query: &Query<'_>,
        field: &str,
        data: Vec<u8>,
    ) -> Result<Bytes, IpfsError> {
        debug!(endpoint, field, len = data.len(), "daemon POST");
        let part = Part::bytes(data).file_name(field.to_string());
        let form = Form::new().part(field.to_string(), part);
        let request = self
            .request(Method::POST, endpoint)
            .query(query)
            .multipart(form)
            .timeout(self.request_timeout);
        self.execute(endpoint, request).await
    }

    /// Open a streaming GET. No total deadline applies; reads are bounded by
    /// [`Transport::next_chunk`] instead.
    pub async fn open_stream(
        &self,
        endpoint: &str,
        query: &Query<'_>,
    ) -> Result<Response, IpfsError> {
        debug!(endpoint, "daemon streaming GET");
        let response = self
            .request(Method::GET, endpoint)
            .query(query)
            .send()
            .await
            .map_err(|e| classify(endpoint, e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| classify(endpoint, e.into()))?;
            return Err(classify(
                endpoint,
                TransportFailure::Status {
                    status: status.as_u16(),
                    body,
                },
            ));
        }
        Ok(response)
    }

    /// Read the next chunk of a streaming response, `None` at end of stream.
    pub async fn next_chunk(
        &self,
        endpoint: &str,
        response: &mut Response,
    ) -> Result<Option<Bytes>, IpfsError> {
        let read = response.chunk();
        let chunk = match self.stream_idle_timeout {
            Some(idle) => tokio::time::timeout(idle, read)
                .await
                .map_err(|_| classify(endpoint, TransportFailure::Timeout))?,
            None => read.await,
        };
        chunk.map_err(|e| classify(endpoint, e.into()))
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(endpoint))
            .header(USER_AGENT, build_info::user_agent())
    }

    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<Bytes, IpfsError> {
        let response = request
            .send()
            .await
            .map_err(|e| classify(endpoint, e.into()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(endpoint, e.into()))?;

        if !status.is_success() {
            return Err(classify(
                endpoint,
                TransportFailure::Status {
                    status: status.as_u16(),
                    body,
                },
            ));
        }
        Ok(body)
    }
}

/// Decode a response body into the shape an operation expects.
pub fn decode_json<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T, IpfsError> {
    serde_json::from_slice(body).map_err(|e| IpfsError::invalid_response(endpoint, e))
}
