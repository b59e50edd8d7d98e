//! Main client for the Bedrock Server Manager API.

use crate::auth::SessionManager;
use crate::config::{ClientConfig, Credentials, LoginConfig, LoginEncoding, DEFAULT_TIMEOUT};
use crate::error::{ApiResult, ClientError, ClientResult};
use crate::request::{Access, ApiRequest};
use crate::session::Session;
use crate::transport::{HttpTransport, RawResponse};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// The request core seen by tool wrappers.
///
/// Implementations never panic and never surface raw transport errors: every
/// call ends in decoded data or an [`ApiFailure`](crate::ApiFailure).
#[async_trait::async_trait]
pub trait BedrockApi: Send + Sync {
    /// Execute a request and decode the JSON response.
    async fn call(&self, request: ApiRequest) -> ApiResult<Value>;

    /// Execute a request and return the raw response body.
    async fn fetch_bytes(&self, request: ApiRequest) -> ApiResult<Bytes>;
}

/// Authenticated client for the Bedrock Server Manager API.
#[derive(Clone)]
pub struct BedrockClient {
    http: HttpTransport,
    auth: Arc<SessionManager>,
}

impl BedrockClient {
    /// Create a new client builder.
    pub fn builder() -> BedrockClientBuilder {
        BedrockClientBuilder::new()
    }

    /// Create a client from configuration and a shared session.
    pub fn from_config(config: ClientConfig, session: Arc<Session>) -> ClientResult<Self> {
        let http = HttpTransport::new(Arc::new(config))?;
        let auth = Arc::new(SessionManager::new(http.clone(), session));
        Ok(Self { http, auth })
    }

    /// The session this client reads and refreshes.
    pub fn session(&self) -> &Arc<Session> {
        self.auth.session()
    }

    /// Log in explicitly. See [`SessionManager::login`].
    pub async fn login(&self) -> bool {
        self.auth.login().await
    }

    /// Send a request, handling the token for authenticated endpoints.
    ///
    /// Authenticated requests log in first when no token is held and, on a
    /// 401, re-authenticate once and resend exactly once.
    async fn send(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
        if request.access == Access::Public {
            return self.http.send(request, None).await;
        }

        let token = match self.auth.session().token() {
            Some(token) => token,
            None => self.auth.refresh(None).await?,
        };

        let response = self.http.send(request, Some(&token)).await?;
        if response.status != reqwest::StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!(path = %request.path, "Received 401, re-authenticating");
        let token = self.auth.refresh(Some(&token)).await?;
        self.http.send(request, Some(&token)).await
    }
}

#[async_trait::async_trait]
impl BedrockApi for BedrockClient {
    async fn call(&self, request: ApiRequest) -> ApiResult<Value> {
        let result = self.send(&request).await.and_then(RawResponse::into_json);
        if let Err(ref failure) = result {
            warn!(
                method = %request.method,
                path = %request.path,
                reason = failure.reason(),
                error = %failure,
                "API call failed"
            );
        }
        result
    }

    async fn fetch_bytes(&self, request: ApiRequest) -> ApiResult<Bytes> {
        let result = self.send(&request).await.and_then(RawResponse::into_bytes);
        if let Err(ref failure) = result {
            warn!(
                method = %request.method,
                path = %request.path,
                reason = failure.reason(),
                error = %failure,
                "API fetch failed"
            );
        }
        result
    }
}

/// Builder for creating a BedrockClient.
pub struct BedrockClientBuilder {
    base_url: Option<String>,
    credentials: Credentials,
    timeout: Duration,
    login: LoginConfig,
    debug_responses: bool,
    session: Option<Arc<Session>>,
}

impl BedrockClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: Credentials::default(),
            timeout: DEFAULT_TIMEOUT,
            login: LoginConfig::default(),
            debug_responses: false,
            session: None,
        }
    }

    /// Set the base URL of the Bedrock Server Manager API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the login credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the login endpoint path.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login.path = path.into();
        self
    }

    /// Set how credentials are encoded at login.
    pub fn login_encoding(mut self, encoding: LoginEncoding) -> Self {
        self.login.encoding = encoding;
        self
    }

    /// Log every HTTP response on the debug side-channel.
    pub fn debug_responses(mut self, enabled: bool) -> Self {
        self.debug_responses = enabled;
        self
    }

    /// Share an existing session instead of starting with an empty one.
    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the client.
    pub fn build(self) -> ClientResult<BedrockClient> {
        let base_url_str = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::Config("base_url is required".to_string()))?;

        let base_url = Url::parse(base_url_str.trim())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base_url must use http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let mut config = ClientConfig::new(base_url, self.credentials);
        config.timeout = self.timeout;
        config.login = self.login;
        config.debug_responses = self.debug_responses;

        let session = self.session.unwrap_or_default();
        BedrockClient::from_config(config, session)
    }
}

impl Default for BedrockClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
