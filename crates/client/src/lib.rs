//! # Bedrock Client
//!
//! Authenticated HTTP client for the Bedrock Server Manager REST API.
//!
//! Every call goes through a single request core that holds the bearer
//! token, logs in when none is held, and re-authenticates and resends exactly
//! once when the API answers 401. Responses are returned as untyped JSON;
//! callers read the envelope fields they need.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bedrock_client::{ApiRequest, BedrockApi, BedrockClient, ClientResult};
//!
//! #[tokio::main]
//! async fn main() -> ClientResult<()> {
//!     let client = BedrockClient::builder()
//!         .base_url("http://127.0.0.1:11325")
//!         .credentials("admin", "secret")
//!         .build()?;
//!
//!     match client.call(ApiRequest::get("/api/servers")).await {
//!         Ok(body) => println!("{}", body),
//!         Err(failure) => eprintln!("{} ({})", failure, failure.reason()),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod session;
pub mod transport;

pub use auth::SessionManager;
pub use client::{BedrockApi, BedrockClient, BedrockClientBuilder};
pub use config::{ClientConfig, Credentials, LoginConfig, LoginEncoding};
pub use error::{ApiFailure, ApiResult, ClientError, ClientResult};
pub use request::{Access, ApiRequest, Method};
pub use session::Session;

// Re-exported so implementors of `BedrockApi` don't need their own dependency.
pub use bytes::Bytes;
