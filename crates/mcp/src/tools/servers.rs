// Server lifecycle and inspection tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{
    array_at, display_value, ensure_valid, failed, field_or_unknown, invalid, lookup, message_or,
    require_identifier, server_path, str_field,
};
use crate::tools::{
    json_schema_empty, json_schema_free_object, json_schema_object, json_schema_string,
    parse_args, server_name_schema, ServerArgs, Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// List every managed server with its status and version
pub struct GetServersTool {
    api: Arc<dyn BedrockApi>,
}

impl GetServersTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

fn render_servers(body: &Value) -> String {
    let servers = array_at(body, &["servers"]);
    if servers.is_empty() {
        return "No servers found.".to_string();
    }

    let mut text = servers
        .iter()
        .map(|server| {
            format!(
                "Server: {}\n  Status: {}\n  Version: {}",
                field_or_unknown(server, "name"),
                field_or_unknown(server, "status"),
                field_or_unknown(server, "version"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    // Partial success is reported through `message`.
    if let Some(note) = body.get("message").and_then(display_value) {
        text.push_str(&format!("\n\nNote: {}", note));
    }
    text
}

#[async_trait::async_trait]
impl Tool for GetServersTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_servers".to_string(),
            description: "List all Bedrock servers with their status and installed version."
                .to_string(),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        match self.api.call(ApiRequest::get("/api/servers")).await {
            Ok(body) => Ok(CallToolResult::text(render_servers(&body))),
            Err(failure) => Ok(failed("Unable to fetch servers list", &failure)),
        }
    }
}

/// Report whether a server process is running
pub struct GetServerStatusTool {
    api: Arc<dyn BedrockApi>,
}

impl GetServerStatusTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetServerStatusTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_server_status".to_string(),
            description: "Check whether a server is currently running.".to_string(),
            input_schema: server_name_schema("Name of the server to check"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "get_server_status")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        let request = ApiRequest::get(server_path(&name, "status")).public();
        match self.api.call(request).await {
            Ok(body) => {
                let text = match lookup(&body, &["data", "running"]).and_then(Value::as_bool) {
                    Some(true) => format!("Server '{}' is running.", name),
                    Some(false) => format!("Server '{}' is not running.", name),
                    None => format!("Could not determine running status for server '{}'.", name),
                };
                Ok(CallToolResult::text(text))
            }
            Err(failure) => Ok(failed(
                format!("Unable to fetch status for server '{}'", name),
                &failure,
            )),
        }
    }
}

/// Lifecycle commands sharing one request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAction {
    Start,
    Stop,
    Restart,
}

impl ServerAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Start => "Start a Bedrock server.",
            Self::Stop => "Stop a running Bedrock server.",
            Self::Restart => "Restart a Bedrock server.",
        }
    }
}

/// Start, stop or restart a server
pub struct ServerActionTool {
    api: Arc<dyn BedrockApi>,
    action: ServerAction,
}

impl ServerActionTool {
    pub fn new(api: Arc<dyn BedrockApi>, action: ServerAction) -> Self {
        Self { api, action }
    }

    fn tool_name(&self) -> String {
        format!("{}_server", self.action.verb())
    }
}

#[async_trait::async_trait]
impl Tool for ServerActionTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.tool_name(),
            description: self.action.description().to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, &self.tool_name())?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        let verb = self.action.verb();
        match self.api.call(ApiRequest::post(server_path(&name, verb))).await {
            Ok(body) => Ok(CallToolResult::text(message_or(
                &body,
                format!("Server {} {} command sent successfully.", name, verb),
            ))),
            Err(failure) => Ok(failed(format!("Failed to {} server {}", verb, name), &failure)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendCommandArgs {
    server_name: String,
    command: String,
}

/// Run a console command on a server
pub struct SendCommandTool {
    api: Arc<dyn BedrockApi>,
}

impl SendCommandTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for SendCommandTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "send_command".to_string(),
            description: "Execute a console command on a running server.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "server_name": json_schema_string("Name of the server"),
                    "command": json_schema_string("Console command to execute"),
                }),
                vec!["server_name", "command"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: SendCommandArgs = parse_args(arguments, "send_command")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        if args.command.trim().is_empty() {
            return Ok(invalid("command must not be empty."));
        }

        let request = ApiRequest::post(server_path(&args.server_name, "send_command"))
            .json(serde_json::json!({ "command": args.command }));
        match self.api.call(request).await {
            Ok(body) => {
                let output = body
                    .get("data")
                    .and_then(display_value)
                    .unwrap_or_else(|| "No response".to_string());
                Ok(CallToolResult::text(format!("Command response: {}", output)))
            }
            Err(failure) => Ok(failed(
                format!("Failed to send command to server {}", args.server_name),
                &failure,
            )),
        }
    }
}

/// Process details (PID, memory, uptime) of a running server
pub struct GetServerProcessInfoTool {
    api: Arc<dyn BedrockApi>,
}

impl GetServerProcessInfoTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetServerProcessInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_server_process_info".to_string(),
            description: "Get process information (PID, CPU, memory, uptime) for a running server."
                .to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "get_server_process_info")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        let body = match self.api.call(ApiRequest::get(server_path(&name, "process_info"))).await {
            Ok(body) => body,
            Err(failure) => {
                return Ok(failed(
                    format!("Unable to fetch process info for server '{}'", name),
                    &failure,
                ))
            }
        };

        let info = match body.get("process_info").and_then(Value::as_object) {
            Some(info) if !info.is_empty() => info,
            _ => {
                return Ok(CallToolResult::text(format!(
                    "No process information available for server '{}'.",
                    name
                )))
            }
        };

        let mut entries: Vec<_> = info.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut lines = vec![format!("Process Info for '{}':", name)];
        lines.extend(entries.into_iter().map(|(key, value)| {
            format!(
                "  {}: {}",
                key,
                display_value(value).unwrap_or_else(|| "None".to_string())
            )
        }));
        Ok(CallToolResult::text(lines.join("\n")))
    }
}

/// Installed server version
pub struct GetServerVersionTool {
    api: Arc<dyn BedrockApi>,
}

impl GetServerVersionTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetServerVersionTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_server_version".to_string(),
            description: "Get the installed Bedrock version of a server.".to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "get_server_version")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        match self.api.call(ApiRequest::get(server_path(&name, "version"))).await {
            Ok(body) => {
                let text = match lookup(&body, &["data", "version"]).and_then(display_value) {
                    Some(version) if !version.is_empty() => {
                        format!("Server {} version: {}", name, version)
                    }
                    _ => format!("No version information found for server {}.", name),
                };
                Ok(CallToolResult::text(text))
            }
            Err(failure) => Ok(failed(
                format!("Unable to fetch version for server {}", name),
                &failure,
            )),
        }
    }
}

/// Check that a server exists and its configuration is valid
pub struct ValidateServerTool {
    api: Arc<dyn BedrockApi>,
}

impl ValidateServerTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for ValidateServerTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "validate_server".to_string(),
            description: "Validate that a server exists and is correctly installed.".to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "validate_server")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        match self.api.call(ApiRequest::get(server_path(&name, "validate"))).await {
            Ok(body) => Ok(CallToolResult::text(message_or(
                &body,
                format!("Server {} validation completed", name),
            ))),
            Err(failure) => Ok(failed(format!("Unable to validate server {}", name), &failure)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateServerArgs {
    server_name: String,
    #[serde(default)]
    version: Option<String>,
}

/// Update a server to the latest or a given version
pub struct UpdateServerTool {
    api: Arc<dyn BedrockApi>,
}

impl UpdateServerTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for UpdateServerTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_server".to_string(),
            description: "Update a server, optionally to a specific version.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "server_name": json_schema_string("Name of the server"),
                    "version": json_schema_string("Target version (defaults to latest)"),
                }),
                vec!["server_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: UpdateServerArgs = parse_args(arguments, "update_server")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        let mut payload = serde_json::json!({ "action": "update" });
        if let Some(version) = args.version.filter(|v| !v.is_empty()) {
            payload["version"] = Value::String(version);
        }

        let request = ApiRequest::post(server_path(&name, "update")).json(payload);
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(message_or(&body, "Update command sent."))),
            Err(failure) => Ok(failed(
                format!("Failed to send update command for server {}", name),
                &failure,
            )),
        }
    }
}

/// Permanently delete a server
pub struct DeleteServerTool {
    api: Arc<dyn BedrockApi>,
}

impl DeleteServerTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for DeleteServerTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "delete_server".to_string(),
            description: "Delete a server and all of its data. This cannot be undone."
                .to_string(),
            input_schema: server_name_schema("Name of the server to delete"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "delete_server")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        match self.api.call(ApiRequest::delete(server_path(&name, "delete"))).await {
            Ok(body) => Ok(CallToolResult::text(format!(
                "{} for server {}",
                message_or(&body, "Server deleted"),
                name
            ))),
            Err(failure) => Ok(failed(format!("Failed to delete server {}", name), &failure)),
        }
    }
}

/// Status string stored in the server's config file
pub struct GetConfigStatusTool {
    api: Arc<dyn BedrockApi>,
}

impl GetConfigStatusTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetConfigStatusTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_config_status".to_string(),
            description: "Get the status recorded in a server's configuration.".to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "get_config_status")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        match self.api.call(ApiRequest::get(server_path(&name, "config_status"))).await {
            Ok(body) => {
                let text = match str_field(&body, &["config_status"]) {
                    Some(status) => format!("Configuration status for server {}: {}", name, status),
                    None => format!("Could not determine config status for server {}.", name),
                };
                Ok(CallToolResult::text(text))
            }
            Err(failure) => Ok(failed(
                format!("Unable to fetch config status for server {}", name),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstallServerArgs {
    server_config: serde_json::Map<String, Value>,
}

/// Install a new server instance
pub struct InstallNewServerTool {
    api: Arc<dyn BedrockApi>,
}

impl InstallNewServerTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for InstallNewServerTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "install_new_server".to_string(),
            description: "Install a new server. The configuration carries the server name, \
                          version and any installer options."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "server_config": json_schema_free_object(
                        "Installer parameters, e.g. {\"server_name\": \"...\", \"server_version\": \"LATEST\"}"
                    ),
                }),
                vec!["server_config"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: InstallServerArgs = parse_args(arguments, "install_new_server")?;
        let config = Value::Object(args.server_config);
        let subject = str_field(&config, &["server_name"])
            .or_else(|| str_field(&config, &["name"]))
            .map(|name| format!(" '{}'", name))
            .unwrap_or_default();

        let request = ApiRequest::post("/api/server/install").json(config.clone());
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(message_or(
                &body,
                "Install new server command sent.",
            ))),
            Err(failure) => Ok(failed(
                format!("Failed to install new server{}", subject),
                &failure,
            )),
        }
    }
}
