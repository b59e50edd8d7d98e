//! HTTP transport layer for the Bedrock client.

use crate::config::{ClientConfig, Credentials, LoginEncoding};
use crate::error::{ApiFailure, ApiResult, ClientError, ClientResult};
use crate::request::ApiRequest;
use bytes::Bytes;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Target of the response debug side-channel.
pub const DEBUG_TARGET: &str = "bedrock_client::debug";

/// Fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: header::HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode a 2xx body as JSON, or turn a non-2xx response into a failure.
    pub fn into_json(self) -> ApiResult<Value> {
        if !self.is_success() {
            return Err(ApiFailure::from_response(self.status.as_u16(), &self.body));
        }
        serde_json::from_slice(&self.body).map_err(|e| ApiFailure::InvalidResponseBody {
            detail: e.to_string(),
        })
    }

    /// Raw body of a 2xx response.
    pub fn into_bytes(self) -> ApiResult<Bytes> {
        if !self.is_success() {
            return Err(ApiFailure::from_response(self.status.as_u16(), &self.body));
        }
        Ok(self.body)
    }
}

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> ClientResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a URL for the given path, relative to the base URL.
    fn build_url(&self, path: &str) -> ApiResult<url::Url> {
        self.config
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiFailure::Transport {
                detail: format!("invalid request path '{}': {}", path, e),
            })
    }

    /// Send one API request, optionally with a bearer token.
    pub async fn send(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<RawResponse> {
        let url = self.build_url(&request.path)?;
        debug!(method = %request.method, url = %url, authenticated = token.is_some(), "API request");

        let mut builder = self.client.request(request.method.as_reqwest(), url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        self.execute(builder).await
    }

    /// Post credentials to the login endpoint.
    pub async fn send_login(&self, credentials: &Credentials) -> ApiResult<RawResponse> {
        let login = &self.config.login;
        let url = self.build_url(&login.path)?;
        debug!(url = %url, encoding = ?login.encoding, "Login request");

        let builder = self.client.post(url);
        let builder = match login.encoding {
            LoginEncoding::Form => builder.form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ]),
            LoginEncoding::Json => builder.json(&serde_json::json!({
                "username": credentials.username,
                "password": credentials.password,
            })),
        };

        self.execute(builder).await
    }

    async fn execute(&self, builder: RequestBuilder) -> ApiResult<RawResponse> {
        let response = builder.send().await.map_err(ApiFailure::transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(ApiFailure::transport)?;

        let raw = RawResponse {
            status,
            headers,
            body,
        };
        if self.config.debug_responses {
            log_response(&raw);
        }
        Ok(raw)
    }
}

fn log_response(response: &RawResponse) {
    let body = match serde_json::from_slice::<Value>(&response.body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_default(),
        Err(_) => String::from_utf8_lossy(&response.body).into_owned(),
    };
    tracing::info!(
        target: DEBUG_TARGET,
        status = response.status.as_u16(),
        headers = ?response.headers,
        "Response body: {}",
        body
    );
}
