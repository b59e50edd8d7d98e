// Test double for the request core

use crate::protocol::CallToolResult;
use crate::tools::Tool;
use bedrock_client::{ApiFailure, ApiRequest, ApiResult, BedrockApi, Bytes};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Scripted `BedrockApi` that records every request it receives.
pub struct FakeApi {
    json: ApiResult<Value>,
    bytes: ApiResult<Bytes>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeApi {
    /// Every call answers with `body`.
    pub fn responding(body: Value) -> Arc<Self> {
        Arc::new(Self {
            json: Ok(body),
            bytes: Ok(Bytes::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every byte fetch answers with `bytes`.
    pub fn serving(bytes: &'static [u8]) -> Arc<Self> {
        Arc::new(Self {
            json: Ok(Value::Null),
            bytes: Ok(Bytes::from_static(bytes)),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every call fails with `failure`.
    pub fn failing(failure: ApiFailure) -> Arc<Self> {
        Arc::new(Self {
            json: Err(failure.clone()),
            bytes: Err(failure),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl BedrockApi for FakeApi {
    async fn call(&self, request: ApiRequest) -> ApiResult<Value> {
        self.requests.lock().unwrap().push(request);
        self.json.clone()
    }

    async fn fetch_bytes(&self, request: ApiRequest) -> ApiResult<Bytes> {
        self.requests.lock().unwrap().push(request);
        self.bytes.clone()
    }
}

/// Execute a tool, failing the test on argument errors.
pub async fn run(tool: &dyn Tool, arguments: Value) -> CallToolResult {
    tool.execute(arguments)
        .await
        .expect("arguments should deserialize")
}

/// Failure used by the failure-path tests.
pub fn not_found() -> ApiFailure {
    ApiFailure::Http {
        status: 404,
        body: serde_json::json!({"message": "Server not found"}),
    }
}
