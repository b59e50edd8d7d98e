//! Transport layer for the Bedrock client.

pub mod http;

pub use http::{HttpTransport, RawResponse, DEBUG_TARGET};
