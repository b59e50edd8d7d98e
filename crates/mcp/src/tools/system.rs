// Host information and download cache tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{failed, field_or_unknown, is_empty_value, message_or, str_field};
use crate::tools::{json_schema_empty, Tool};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde_json::Value;
use std::sync::Arc;

/// Operating system and manager version
pub struct GetSystemInfoTool {
    api: Arc<dyn BedrockApi>,
}

impl GetSystemInfoTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetSystemInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_system_info".to_string(),
            description: "Get the host operating system and the manager's version.".to_string(),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        let body = match self.api.call(ApiRequest::get("/api/info")).await {
            Ok(body) => body,
            Err(failure) => return Ok(failed("Unable to fetch system information", &failure)),
        };

        let info = body.get("data");
        match info {
            Some(info) if !is_empty_value(Some(info)) && info.is_object() => {
                Ok(CallToolResult::text(format!(
                    "System Information:\nOS Type: {}\nApp Version: {}",
                    field_or_unknown(info, "os_type"),
                    field_or_unknown(info, "app_version")
                )))
            }
            _ => Ok(CallToolResult::text("No system information found.")),
        }
    }
}

/// Delete cached server downloads
pub struct PruneDownloadsTool {
    api: Arc<dyn BedrockApi>,
}

impl PruneDownloadsTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for PruneDownloadsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "prune_downloads".to_string(),
            description: "Prune the manager's cache of downloaded server archives.".to_string(),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        match self.api.call(ApiRequest::post("/api/downloads/prune")).await {
            Ok(body) => {
                let mut text = message_or(&body, "Download cache pruned");
                if let Some(freed) = str_field(&body, &["data", "freed_space"]) {
                    text.push_str(&format!("\nFreed space: {}", freed));
                }
                Ok(CallToolResult::text(text))
            }
            Err(failure) => Ok(failed("Failed to prune download cache", &failure)),
        }
    }
}
