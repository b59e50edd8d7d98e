// Plugin tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{
    array_at, bullet_list, ensure_valid, failed, field_or_unknown, invalid, message_or,
    pretty_json, require_identifier,
};
use crate::tools::{
    json_schema_boolean, json_schema_empty, json_schema_free_object, json_schema_object,
    json_schema_string, parse_args, Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Status of every installed plugin
pub struct GetPluginStatusesTool {
    api: Arc<dyn BedrockApi>,
}

impl GetPluginStatusesTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

fn plugin_lines(body: &Value) -> Vec<String> {
    let listed = array_at(body, &["plugins"]);
    if !listed.is_empty() {
        return listed
            .iter()
            .map(|plugin| {
                format!(
                    "{}: {}",
                    field_or_unknown(plugin, "name"),
                    field_or_unknown(plugin, "status")
                )
            })
            .collect();
    }

    // Newer managers key plugin configs by name under `data`.
    let Some(configs) = body.get("data").and_then(Value::as_object) else {
        return Vec::new();
    };
    let mut names: Vec<&String> = configs.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| {
            let status = match configs[name.as_str()].get("enabled").and_then(Value::as_bool) {
                Some(true) => "enabled",
                Some(false) => "disabled",
                None => "Unknown",
            };
            format!("{}: {}", name, status)
        })
        .collect()
}

#[async_trait::async_trait]
impl Tool for GetPluginStatusesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_plugin_statuses".to_string(),
            description: "List installed plugins and whether each is enabled.".to_string(),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        match self.api.call(ApiRequest::get("/api/plugins")).await {
            Ok(body) => {
                let lines = plugin_lines(&body);
                if lines.is_empty() {
                    return Ok(CallToolResult::text("No plugins found."));
                }
                Ok(CallToolResult::text(bullet_list("Plugin statuses:", lines)))
            }
            Err(failure) => Ok(failed("Unable to fetch plugin statuses", &failure)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SetPluginEnabledArgs {
    plugin_name: String,
    enabled: bool,
}

/// Enable or disable one plugin
pub struct SetPluginEnabledTool {
    api: Arc<dyn BedrockApi>,
}

impl SetPluginEnabledTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for SetPluginEnabledTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "set_plugin_enabled".to_string(),
            description: "Enable or disable a plugin. Returns the manager's JSON response."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "plugin_name": json_schema_string("Name of the plugin"),
                    "enabled": json_schema_boolean("true to enable, false to disable"),
                }),
                vec!["plugin_name", "enabled"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: SetPluginEnabledArgs = parse_args(arguments, "set_plugin_enabled")?;
        ensure_valid!(require_identifier("plugin_name", &args.plugin_name));

        let request = ApiRequest::post(format!("/api/plugins/{}", args.plugin_name))
            .json(json!({ "enabled": args.enabled }));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(pretty_json(&body))),
            Err(failure) => {
                let verb = if args.enabled { "enable" } else { "disable" };
                Ok(failed(
                    format!("Failed to {} plugin '{}'", verb, args.plugin_name),
                    &failure,
                ))
            }
        }
    }
}

/// Reload every plugin
pub struct ReloadPluginsTool {
    api: Arc<dyn BedrockApi>,
}

impl ReloadPluginsTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for ReloadPluginsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "reload_all_plugins".to_string(),
            description: "Reload all plugins.".to_string(),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        match self.api.call(ApiRequest::post("/api/plugins/reload")).await {
            Ok(body) => Ok(CallToolResult::text(format!(
                "All plugins reloaded. Status: {}",
                message_or(&body, "Plugins reloaded successfully")
            ))),
            Err(failure) => Ok(failed("Failed to reload plugins", &failure)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TriggerEventArgs {
    event_name: String,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

/// Fire a custom plugin event
pub struct TriggerPluginEventTool {
    api: Arc<dyn BedrockApi>,
}

impl TriggerPluginEventTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for TriggerPluginEventTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "trigger_plugin_event".to_string(),
            description: "Trigger a custom plugin event. Returns the manager's JSON response."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "event_name": json_schema_string("Event name, e.g. my_plugin:something_happened"),
                    "payload": json_schema_free_object("Optional event payload"),
                }),
                vec!["event_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: TriggerEventArgs = parse_args(arguments, "trigger_plugin_event")?;
        if args.event_name.trim().is_empty() {
            return Ok(invalid("event_name must not be empty."));
        }

        let mut body = json!({ "event_name": args.event_name });
        if let Some(payload) = args.payload {
            body["payload"] = Value::Object(payload);
        }

        let request = ApiRequest::post("/api/plugins/trigger_event").json(body);
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(pretty_json(&body))),
            Err(failure) => Ok(failed(
                format!("Failed to trigger plugin event '{}'", args.event_name),
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
    async fn test_plugin_statuses_list() {
        let api = FakeApi::responding(json!({
            "plugins": [{"name": "auto_backup", "status": "enabled"}, {"name": "motd"}]
        }));
        let result = run(&GetPluginStatusesTool::new(api), json!({})).await;
        assert_eq!(
            result.text_content(),
            "Plugin statuses:\n  - auto_backup: enabled\n  - motd: Unknown"
        );
    }

    #[tokio::test]
    async fn test_plugin_statuses_keyed_by_name() {
        let api = FakeApi::responding(json!({
            "data": {"world_pruner": {"enabled": false}, "auto_backup": {"enabled": true}}
        }));
        let result = run(&GetPluginStatusesTool::new(api), json!({})).await;
        assert_eq!(
            result.text_content(),
            "Plugin statuses:\n  - auto_backup: enabled\n  - world_pruner: disabled"
        );
    }

    #[tokio::test]
    async fn test_plugin_statuses_empty() {
        let api = FakeApi::responding(json!({"plugins": []}));
        let result = run(&GetPluginStatusesTool::new(api), json!({})).await;
        assert_eq!(result.text_content(), "No plugins found.");
    }

    #[tokio::test]
    async fn test_set_plugin_enabled() {
        let api = FakeApi::responding(json!({"a": 1}));
        let result = run(
            &SetPluginEnabledTool::new(api.clone()),
            json!({"plugin_name": "motd", "enabled": false}),
        )
        .await;

        assert_eq!(result.text_content(), "{\n  \"a\": 1\n}");
        let request = api.last_request();
        assert_eq!(request.path, "/api/plugins/motd");
        assert_eq!(request.body, Some(json!({"enabled": false})));
    }

    #[tokio::test]
    async fn test_set_plugin_enabled_failure_names_plugin() {
        let api = FakeApi::failing(not_found());
        let result = run(
            &SetPluginEnabledTool::new(api),
            json!({"plugin_name": "motd", "enabled": true}),
        )
        .await;
        assert_eq!(
            result.text_content(),
            "Failed to enable plugin 'motd': HTTP 404: Server not found"
        );
    }

    #[tokio::test]
    async fn test_reload_plugins() {
        let api = FakeApi::responding(json!({}));
        let result = run(&ReloadPluginsTool::new(api), json!({})).await;
        assert_eq!(
            result.text_content(),
            "All plugins reloaded. Status: Plugins reloaded successfully"
        );
    }

    #[tokio::test]
    async fn test_trigger_event_payload() {
        let api = FakeApi::responding(json!({"status": "success"}));
        let tool = TriggerPluginEventTool::new(api.clone());

        run(&tool, json!({"event_name": "demo:ping", "payload": {"n": 1}})).await;
        assert_eq!(
            api.last_request().body,
            Some(json!({"event_name": "demo:ping", "payload": {"n": 1}}))
        );

        run(&tool, json!({"event_name": "demo:ping"})).await;
        assert_eq!(api.last_request().body, Some(json!({"event_name": "demo:ping"})));

        let result = run(&tool, json!({"event_name": " "})).await;
        assert!(result.is_error());
        assert_eq!(api.calls(), 2);
    }
}
