//! Configuration types for the Bedrock client.

use std::fmt;
use std::time::Duration;
use url::Url;

/// Default request timeout, applied to every call including login.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default authentication path of the Bedrock Server Manager API.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/token";

/// Configuration for the Bedrock client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Bedrock Server Manager API, always ending in `/`.
    pub base_url: Url,
    /// Credentials presented at login.
    pub credentials: Credentials,
    /// Request timeout.
    pub timeout: Duration,
    /// Login endpoint configuration.
    pub login: LoginConfig,
    /// Emit every HTTP response (status, headers, body) as a debug event.
    pub debug_responses: bool,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL and credentials.
    pub fn new(base_url: Url, credentials: Credentials) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            login: LoginConfig::default(),
            debug_responses: false,
        }
    }
}

/// Make sure relative joins keep any path prefix of the base URL.
pub(crate) fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Username and password used to obtain a bearer token.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How credentials are encoded in the login request.
///
/// Older deployments of the manager accept a JSON body, newer ones expect an
/// OAuth2-style form post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginEncoding {
    /// `application/x-www-form-urlencoded`
    #[default]
    Form,
    /// `application/json`
    Json,
}

/// Login endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginConfig {
    /// Path of the authentication endpoint, relative to the base URL.
    pub path: String,
    /// Body encoding for the credentials.
    pub encoding: LoginEncoding,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_LOGIN_PATH.to_string(),
            encoding: LoginEncoding::Form,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let url = Url::parse("http://localhost:11325").unwrap();
        let config = ClientConfig::new(url, Credentials::new("admin", "secret"));

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.login.path, "/auth/token");
        assert_eq!(config.login.encoding, LoginEncoding::Form);
        assert!(!config.debug_responses);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = Url::parse("http://localhost:11325/bsm").unwrap();
        let config = ClientConfig::new(url, Credentials::default());

        assert_eq!(config.base_url.as_str(), "http://localhost:11325/bsm/");
    }

    #[test]
    fn test_root_base_url_unchanged() {
        let url = Url::parse("http://localhost:11325/").unwrap();
        assert_eq!(normalize_base_url(url).as_str(), "http://localhost:11325/");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("admin", "hunter2");
        let rendered = format!("{:?}", creds);

        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
