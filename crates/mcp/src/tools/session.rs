// Web session tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::failed;
use crate::tools::{json_schema_empty, Tool};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde_json::Value;
use std::sync::Arc;

/// End the manager's web session.
///
/// The locally held bearer token is left untouched; the next authenticated
/// call keeps using it until the manager rejects it with 401.
pub struct LogoutTool {
    api: Arc<dyn BedrockApi>,
}

impl LogoutTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for LogoutTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "api_logout".to_string(),
            description: "Log out of the manager's web session.".to_string(),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        // Logout may answer with a redirect page rather than JSON.
        match self.api.fetch_bytes(ApiRequest::get("/auth/logout").public()).await {
            Ok(_) => Ok(CallToolResult::text("Logout successful.")),
            Err(failure) => Ok(failed("Logout failed", &failure)),
        }
    }
}
