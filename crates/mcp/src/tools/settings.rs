// Global manager settings; every tool returns the manager's JSON verbatim

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{failed, invalid, pretty_json};
use crate::tools::{
    json_schema_any, json_schema_empty, json_schema_object, json_schema_string, parse_args, Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Settings endpoints that take no arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsQuery {
    AllSettings,
    Themes,
    Reload,
}

impl SettingsQuery {
    fn name(self) -> &'static str {
        match self {
            Self::AllSettings => "get_all_settings",
            Self::Themes => "get_themes",
            Self::Reload => "reload_settings",
        }
    }

    fn request(self) -> ApiRequest {
        match self {
            Self::AllSettings => ApiRequest::get("/api/settings"),
            Self::Themes => ApiRequest::get("/api/themes"),
            Self::Reload => ApiRequest::post("/api/settings/reload"),
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::AllSettings => "Get all global manager settings as JSON.",
            Self::Themes => "List the web UI themes available on the manager, as JSON.",
            Self::Reload => "Reload global settings from disk and return the result as JSON.",
        }
    }

    fn failure(self) -> &'static str {
        match self {
            Self::AllSettings => "Failed to get settings",
            Self::Themes => "Failed to get themes",
            Self::Reload => "Failed to reload settings",
        }
    }
}

pub struct SettingsQueryTool {
    api: Arc<dyn BedrockApi>,
    query: SettingsQuery,
}

impl SettingsQueryTool {
    pub fn new(api: Arc<dyn BedrockApi>, query: SettingsQuery) -> Self {
        Self { api, query }
    }
}

#[async_trait::async_trait]
impl Tool for SettingsQueryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.query.name().to_string(),
            description: self.query.description().to_string(),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        match self.api.call(self.query.request()).await {
            Ok(body) => Ok(CallToolResult::text(pretty_json(&body))),
            Err(failure) => Ok(failed(self.query.failure(), &failure)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SetSettingArgs {
    key: String,
    value: Value,
}

/// Change one global setting by dotted key
pub struct SetSettingTool {
    api: Arc<dyn BedrockApi>,
}

impl SetSettingTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for SetSettingTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "set_setting".to_string(),
            description: "Set one global setting (dotted key, e.g. retention.backups). Returns \
                          the manager's JSON response."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "key": json_schema_string("Dotted setting key"),
                    "value": json_schema_any("New value of any JSON type"),
                }),
                vec!["key", "value"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: SetSettingArgs = parse_args(arguments, "set_setting")?;
        if args.key.trim().is_empty() {
            return Ok(invalid("key must not be empty."));
        }

        let request = ApiRequest::post("/api/settings")
            .json(json!({ "key": args.key, "value": args.value }));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(pretty_json(&body))),
            Err(failure) => Ok(failed(format!("Failed to set setting '{}'", args.key), &failure)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{run, FakeApi};
    use bedrock_client::{ApiFailure, Method};

    #[tokio::test]
    async fn test_queries_pass_json_through() {
        for (query, method, path) in [
            (SettingsQuery::AllSettings, Method::Get, "/api/settings"),
            (SettingsQuery::Themes, Method::Get, "/api/themes"),
            (SettingsQuery::Reload, Method::Post, "/api/settings/reload"),
        ] {
            let api = FakeApi::responding(json!({"a": 1}));
            let result = run(&SettingsQueryTool::new(api.clone(), query), json!({})).await;

            assert_eq!(result.text_content(), "{\n  \"a\": 1\n}");
            let request = api.last_request();
            assert_eq!(request.method, method);
            assert_eq!(request.path, path);
        }
    }

    #[tokio::test]
    async fn test_query_failure() {
        let api = FakeApi::failing(ApiFailure::InvalidResponseBody {
            detail: "expected value at line 1 column 1".to_string(),
        });
        let tool = SettingsQueryTool::new(api, SettingsQuery::Themes);
        let result = run(&tool, json!({})).await;

        assert!(result.is_error());
        assert_eq!(
            result.text_content(),
            "Failed to get themes: invalid response body: expected value at line 1 column 1"
        );
    }

    #[tokio::test]
    async fn test_set_setting_sends_any_value() {
        let api = FakeApi::responding(json!({"status": "success"}));
        let tool = SetSettingTool::new(api.clone());

        run(&tool, json!({"key": "retention.backups", "value": 5})).await;
        assert_eq!(
            api.last_request().body,
            Some(json!({"key": "retention.backups", "value": 5}))
        );

        run(&tool, json!({"key": "web.theme", "value": "dark"})).await;
        assert_eq!(
            api.last_request().body,
            Some(json!({"key": "web.theme", "value": "dark"}))
        );
    }

    #[tokio::test]
    async fn test_set_setting_failure_names_key() {
        let api = FakeApi::failing(ApiFailure::AuthenticationFailed);
        let result = run(
            &SetSettingTool::new(api),
            json!({"key": "web.theme", "value": "dark"}),
        )
        .await;
        assert_eq!(
            result.text_content(),
            "Failed to set setting 'web.theme': authentication failed"
        );
    }
}
