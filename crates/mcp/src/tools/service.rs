// OS service integration (autostart/autoupdate)

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{
    ensure_valid, failed, invalid, message_or, pretty_json, require_identifier, server_path,
};
use crate::tools::{
    json_schema_boolean, json_schema_free_object, json_schema_object, json_schema_string,
    parse_args, Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ConfigureServiceArgs {
    server_name: String,
    service_config: Map<String, Value>,
}

/// Create or reconfigure the system service for a server
pub struct ConfigureServiceTool {
    api: Arc<dyn BedrockApi>,
}

impl ConfigureServiceTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for ConfigureServiceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "configure_service".to_string(),
            description: "Configure the OS service (systemd or Windows service) for a server."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "service_config": json_schema_free_object(
                        "Service settings, e.g. {\"autoupdate\": true, \"autostart\": false}"
                    ),
                }),
                vec!["server_name", "service_config"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ConfigureServiceArgs = parse_args(arguments, "configure_service")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));

        let request = ApiRequest::post(server_path(&args.server_name, "service"))
            .json(json!({ "service_config": args.service_config }));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(format!(
                "{} for server {}",
                message_or(&body, "Service settings configured"),
                args.server_name
            ))),
            Err(failure) => Ok(failed(
                format!(
                    "Failed to configure service settings for server {}",
                    args.server_name
                ),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateServiceArgs {
    server_name: String,
    #[serde(default)]
    autoupdate: Option<bool>,
    #[serde(default)]
    autostart: Option<bool>,
}

/// Toggle autoupdate/autostart for a server's service
pub struct UpdateServiceSettingsTool {
    api: Arc<dyn BedrockApi>,
}

impl UpdateServiceSettingsTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for UpdateServiceSettingsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_service_settings".to_string(),
            description: "Enable or disable autoupdate and autostart for a server. Returns the \
                          manager's JSON response."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "autoupdate": json_schema_boolean("Update the server before each start"),
                    "autostart": json_schema_boolean("Start the server with the host"),
                }),
                vec!["server_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: UpdateServiceArgs = parse_args(arguments, "update_service_settings")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));

        let mut payload = Map::new();
        if let Some(autoupdate) = args.autoupdate {
            payload.insert("autoupdate".to_string(), Value::Bool(autoupdate));
        }
        if let Some(autostart) = args.autostart {
            payload.insert("autostart".to_string(), Value::Bool(autostart));
        }
        if payload.is_empty() {
            return Ok(invalid(
                "At least one of autoupdate or autostart must be provided.",
            ));
        }

        let request = ApiRequest::post(server_path(&args.server_name, "service/update"))
            .json(Value::Object(payload));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(pretty_json(&body))),
            Err(failure) => Ok(failed(
                format!(
                    "Failed to update service settings for server '{}'",
                    args.server_name
                ),
                &failure,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{not_found, run, FakeApi};

    #[tokio::test]
    async fn test_configure_service() {
        let api = FakeApi::responding(json!({"message": "Service configured"}));
        let result = run(
            &ConfigureServiceTool::new(api.clone()),
            json!({"server_name": "s1", "service_config": {"autostart": true}}),
        )
        .await;

        assert_eq!(result.text_content(), "Service configured for server s1");
        let request = api.last_request();
        assert_eq!(request.path, "/api/server/s1/service");
        assert_eq!(
            request.body,
            Some(json!({"service_config": {"autostart": true}}))
        );
    }

    #[tokio::test]
    async fn test_update_service_requires_a_flag() {
        let api = FakeApi::responding(json!({}));
        let result = run(
            &UpdateServiceSettingsTool::new(api.clone()),
            json!({"server_name": "s1"}),
        )
        .await;

        assert!(result.is_error());
        assert_eq!(
            result.text_content(),
            "At least one of autoupdate or autostart must be provided."
        );
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_service_sends_only_given_flags() {
        let api = FakeApi::responding(json!({"status": "success"}));
        let result = run(
            &UpdateServiceSettingsTool::new(api.clone()),
            json!({"server_name": "s1", "autostart": false}),
        )
        .await;

        assert_eq!(result.text_content(), "{\n  \"status\": \"success\"\n}");
        let request = api.last_request();
        assert_eq!(request.path, "/api/server/s1/service/update");
        assert_eq!(request.body, Some(json!({"autostart": false})));
    }

    #[tokio::test]
    async fn test_update_service_failure_names_server() {
        let api = FakeApi::failing(not_found());
        let result = run(
            &UpdateServiceSettingsTool::new(api),
            json!({"server_name": "s1", "autoupdate": true}),
        )
        .await;
        assert!(result.text_content().contains("'s1'"));
    }
}
