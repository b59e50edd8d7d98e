//! Session management: login and token refresh.

use crate::error::{ApiFailure, ApiResult};
use crate::session::Session;
use crate::transport::HttpTransport;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Obtains bearer tokens and stores them in the shared [`Session`].
#[derive(Debug)]
pub struct SessionManager {
    http: HttpTransport,
    session: Arc<Session>,
    login_gate: Mutex<()>,
}

impl SessionManager {
    pub fn new(http: HttpTransport, session: Arc<Session>) -> Self {
        Self {
            http,
            session,
            login_gate: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Log in with the configured credentials.
    ///
    /// Returns `true` and stores the token on success. Any failure leaves the
    /// previous token in place.
    pub async fn login(&self) -> bool {
        let response = match self.http.send_login(&self.http.config().credentials).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login failed");
                return false;
            }
        };

        let body = match response.into_json() {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Login rejected");
                return false;
            }
        };

        match extract_token(&body) {
            Some(token) => {
                self.session.store(token);
                info!("Login succeeded");
                true
            }
            None => {
                warn!("Login response did not contain a token");
                false
            }
        }
    }

    /// Return a usable token, logging in if needed.
    ///
    /// `stale` is the token the caller last used (or `None` if it had none).
    /// Logins are serialized: a caller that waited on the gate while another
    /// caller logged in gets the fresh token without logging in again.
    pub async fn refresh(&self, stale: Option<&str>) -> ApiResult<String> {
        let _gate = self.login_gate.lock().await;

        if let Some(current) = self.session.token() {
            if Some(current.as_str()) != stale {
                return Ok(current);
            }
        }

        if !self.login().await {
            return Err(ApiFailure::AuthenticationFailed);
        }
        self.session.token().ok_or(ApiFailure::AuthenticationFailed)
    }
}

fn extract_token(body: &Value) -> Option<String> {
    ["access_token", "token"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, Credentials};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manager(server: &MockServer, session: Arc<Session>) -> SessionManager {
        let config = ClientConfig::new(
            url::Url::parse(&server.uri()).unwrap(),
            Credentials::new("admin", "secret"),
        );
        let http = HttpTransport::new(Arc::new(config)).unwrap();
        SessionManager::new(http, session)
    }

    async fn mount_login(server: &MockServer, template: ResponseTemplate, times: u64) {
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(template)
            .expect(times)
            .mount(server)
            .await;
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(
            extract_token(&json!({"access_token": "abc", "token_type": "bearer"})),
            Some("abc".to_string())
        );
        assert_eq!(extract_token(&json!({"token": "xyz"})), Some("xyz".to_string()));
        assert_eq!(extract_token(&json!({"access_token": ""})), None);
        assert_eq!(extract_token(&json!({"access_token": 42})), None);
        assert_eq!(extract_token(&json!([])), None);
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})),
            1,
        )
        .await;

        let session = Arc::new(Session::new());
        let manager = manager(&server, session.clone());

        assert!(manager.login().await);
        assert_eq!(session.token().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_token() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect username or password"})),
            1,
        )
        .await;

        let session = Arc::new(Session::with_token("previous"));
        let manager = manager(&server, session.clone());

        assert!(!manager.login().await);
        assert_eq!(session.token().as_deref(), Some("previous"));
    }

    #[tokio::test]
    async fn test_login_without_token_field_fails() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"status": "success"})),
            1,
        )
        .await;

        let session = Arc::new(Session::new());
        let manager = manager(&server, session.clone());

        assert!(!manager.login().await);
        assert!(!session.has_token());
    }

    #[tokio::test]
    async fn test_login_transport_error() {
        let config = ClientConfig::new(
            url::Url::parse("http://127.0.0.1:1").unwrap(),
            Credentials::new("admin", "secret"),
        );
        let http = HttpTransport::new(Arc::new(config)).unwrap();
        let manager = SessionManager::new(http, Arc::new(Session::new()));

        assert!(!manager.login().await);
    }

    #[tokio::test]
    async fn test_refresh_reuses_newer_token() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "unused"})),
            0,
        )
        .await;

        let session = Arc::new(Session::with_token("newer"));
        let manager = manager(&server, session);

        let token = manager.refresh(Some("stale")).await.unwrap();
        assert_eq!(token, "newer");
    }

    #[tokio::test]
    async fn test_refresh_logs_in_when_token_is_stale() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})),
            1,
        )
        .await;

        let session = Arc::new(Session::with_token("stale"));
        let manager = manager(&server, session);

        let token = manager.refresh(Some("stale")).await.unwrap();
        assert_eq!(token, "fresh");
    }

    #[tokio::test]
    async fn test_refresh_failure_is_authentication_failed() {
        let server = MockServer::start().await;
        mount_login(&server, ResponseTemplate::new(500), 1).await;

        let manager = manager(&server, Arc::new(Session::new()));

        assert_eq!(
            manager.refresh(None).await,
            Err(ApiFailure::AuthenticationFailed)
        );
    }

    #[tokio::test]
    async fn test_concurrent_refresh_logs_in_once() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "shared"})),
            1,
        )
        .await;

        let manager = Arc::new(manager(&server, Arc::new(Session::new())));
        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.refresh(None).await })
        };
        let second = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.refresh(None).await })
        };

        assert_eq!(first.await.unwrap().unwrap(), "shared");
        assert_eq!(second.await.unwrap().unwrap(), "shared");
    }
}
