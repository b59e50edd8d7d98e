// Allowlist tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{
    array_at, display_value, ensure_valid, failed, field_or_unknown, invalid, message_or,
    require_identifier, server_path,
};
use crate::tools::{
    json_schema_array, json_schema_boolean, json_schema_object, json_schema_string, parse_args,
    server_name_schema, ServerArgs, Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Show a server's allowlist
pub struct GetAllowlistTool {
    api: Arc<dyn BedrockApi>,
}

impl GetAllowlistTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetAllowlistTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_allowlist".to_string(),
            description: "Get the allowlist (whitelist) of a server.".to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "get_allowlist")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        let body = match self.api.call(ApiRequest::get(server_path(&name, "allowlist/get"))).await {
            Ok(body) => body,
            Err(failure) => {
                return Ok(failed(
                    format!("Unable to fetch allowlist for server {}", name),
                    &failure,
                ))
            }
        };

        let players = array_at(&body, &["players"]);
        if players.is_empty() {
            return Ok(CallToolResult::text(format!("Allowlist for {} is empty.", name)));
        }

        let mut lines = vec![format!("Allowlist for {}:", name)];
        for player in players {
            let ignores = player
                .get("ignoresPlayerLimit")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            lines.push(format!(
                "  - {} (XUID: {}){}",
                field_or_unknown(player, "name"),
                field_or_unknown(player, "xuid"),
                if ignores { " [ignoresPlayerLimit]" } else { "" }
            ));
        }
        Ok(CallToolResult::text(lines.join("\n")))
    }
}

#[derive(Debug, Deserialize)]
struct AddToAllowlistArgs {
    server_name: String,
    player_names: Vec<String>,
    #[serde(default)]
    ignores_player_limit: bool,
}

/// Add players to a server's allowlist
pub struct AddToAllowlistTool {
    api: Arc<dyn BedrockApi>,
}

impl AddToAllowlistTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for AddToAllowlistTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "add_players_to_allowlist".to_string(),
            description: "Add one or more players (by gamertag) to a server's allowlist."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "player_names": json_schema_array(
                        json_schema_string("Gamertag"),
                        "Players to add"
                    ),
                    "ignores_player_limit": json_schema_boolean(
                        "Let these players join when the server is full (default false)"
                    ),
                }),
                vec!["server_name", "player_names"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: AddToAllowlistArgs = parse_args(arguments, "add_players_to_allowlist")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        if args.player_names.is_empty() {
            return Ok(invalid("player_names must contain at least one player."));
        }

        let request = ApiRequest::post(server_path(&args.server_name, "allowlist/add")).json(json!({
            "players": args.player_names,
            "ignoresPlayerLimit": args.ignores_player_limit,
        }));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(message_or(
                &body,
                "Add players to allowlist command sent.",
            ))),
            Err(failure) => Ok(failed(
                format!(
                    "Failed to add players to allowlist for server {}",
                    args.server_name
                ),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoveFromAllowlistArgs {
    server_name: String,
    player_names: Vec<String>,
}

fn joined_names(values: &[Value]) -> String {
    values
        .iter()
        .filter_map(display_value)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Remove players from a server's allowlist
pub struct RemoveFromAllowlistTool {
    api: Arc<dyn BedrockApi>,
}

impl RemoveFromAllowlistTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for RemoveFromAllowlistTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "remove_from_allowlist".to_string(),
            description: "Remove one or more players from a server's allowlist.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "player_names": json_schema_array(
                        json_schema_string("Gamertag"),
                        "Players to remove"
                    ),
                }),
                vec!["server_name", "player_names"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: RemoveFromAllowlistArgs = parse_args(arguments, "remove_from_allowlist")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        if args.player_names.is_empty() {
            return Ok(invalid("player_names must contain at least one player."));
        }

        let request = ApiRequest::delete(server_path(&args.server_name, "allowlist/remove"))
            .json(json!({ "players": args.player_names }));
        let body = match self.api.call(request).await {
            Ok(body) => body,
            Err(failure) => {
                return Ok(failed(
                    format!(
                        "Failed to remove players from allowlist for server {}",
                        args.server_name
                    ),
                    &failure,
                ))
            }
        };

        let mut parts = vec![message_or(&body, "Remove from allowlist command sent.")];
        let removed = array_at(&body, &["details", "removed"]);
        if !removed.is_empty() {
            parts.push(format!("Successfully removed: {}", joined_names(removed)));
        }
        let not_found = array_at(&body, &["details", "not_found"]);
        if !not_found.is_empty() {
            parts.push(format!("Not found in allowlist: {}", joined_names(not_found)));
        }
        Ok(CallToolResult::text(parts.join("\n")))
    }
}
