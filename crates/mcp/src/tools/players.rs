// Player database and permission tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{
    array_at, display_value, ensure_valid, failed, field_or_unknown, invalid, message_or,
    pretty_json, require_choice, require_identifier, server_path, str_field,
};
use crate::tools::{
    json_schema_array, json_schema_empty, json_schema_enum, json_schema_object,
    json_schema_string, parse_args, server_name_schema, ServerArgs, Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const PERMISSION_LEVELS: &[&str] = &["visitor", "member", "operator"];

/// All players known to the manager
pub struct GetPlayersTool {
    api: Arc<dyn BedrockApi>,
}

impl GetPlayersTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetPlayersTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_players".to_string(),
            description: "List every player the manager knows about (name, XUID, notes)."
                .to_string(),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        let body = match self.api.call(ApiRequest::get("/api/players/get")).await {
            Ok(body) => body,
            Err(failure) => return Ok(failed("Unable to fetch player list", &failure)),
        };

        let players = array_at(&body, &["players"]);
        if players.is_empty() {
            return Ok(CallToolResult::text("No players found."));
        }

        let mut blocks = vec!["Known Players:".to_string()];
        for player in players {
            let mut block = format!(
                "Name: {}\nXUID: {}",
                field_or_unknown(player, "name"),
                field_or_unknown(player, "xuid")
            );
            if let Some(notes) = player.get("notes").and_then(display_value) {
                block.push_str(&format!("\nNotes: {}", notes));
            }
            blocks.push(block);
        }
        Ok(CallToolResult::text(blocks.join("\n\n")))
    }
}

/// Scan server logs for new players
pub struct ScanPlayerLogsTool {
    api: Arc<dyn BedrockApi>,
}

impl ScanPlayerLogsTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for ScanPlayerLogsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "scan_player_logs".to_string(),
            description: "Scan all server logs for player connections and update the player \
                          database."
                .to_string(),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        match self.api.call(ApiRequest::post("/api/players/scan")).await {
            Ok(body) => {
                let mut text = message_or(&body, "Player scan completed");
                if let Some(found) = body.get("players_found").and_then(display_value) {
                    text.push_str(&format!("\nPlayers found: {}", found));
                }
                Ok(CallToolResult::text(text))
            }
            Err(failure) => Ok(failed("Failed to scan player logs", &failure)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddPlayersArgs {
    players: Vec<String>,
}

fn check_player_entry(entry: &str) -> Result<(), String> {
    let valid = entry.split_once(':').is_some_and(|(gamertag, xuid)| {
        !gamertag.trim().is_empty()
            && !xuid.is_empty()
            && xuid.chars().all(|c| c.is_ascii_digit())
    });
    if valid {
        Ok(())
    } else {
        Err(format!(
            "Invalid player entry '{}'. Expected 'gamertag:xuid'.",
            entry
        ))
    }
}

/// Add players to the manager's database by hand
pub struct AddPlayersTool {
    api: Arc<dyn BedrockApi>,
}

impl AddPlayersTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for AddPlayersTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "add_players".to_string(),
            description: "Add players to the global player database. Returns the manager's JSON \
                          response."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "players": json_schema_array(
                        json_schema_string("Entry in 'gamertag:xuid' form"),
                        "Players to add"
                    ),
                }),
                vec!["players"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: AddPlayersArgs = parse_args(arguments, "add_players")?;
        if args.players.is_empty() {
            return Ok(invalid("players must contain at least one entry."));
        }
        for entry in &args.players {
            ensure_valid!(check_player_entry(entry));
        }

        let count = args.players.len();
        let request = ApiRequest::post("/api/players/add").json(json!({ "players": args.players }));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(pretty_json(&body))),
            Err(failure) => Ok(failed(format!("Failed to add {} player(s)", count), &failure)),
        }
    }
}

/// Per-server permission levels
pub struct GetPlayerPermissionsTool {
    api: Arc<dyn BedrockApi>,
}

impl GetPlayerPermissionsTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetPlayerPermissionsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_player_permissions".to_string(),
            description: "Get the permission level of every player on a server.".to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "get_player_permissions")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        let body = match self.api.call(ApiRequest::get(server_path(&name, "permissions/get"))).await {
            Ok(body) => body,
            Err(failure) => {
                return Ok(failed(
                    format!("Unable to fetch player permissions for server '{}'", name),
                    &failure,
                ))
            }
        };

        let permissions = array_at(&body, &["data", "permissions"]);
        if permissions.is_empty() {
            return Ok(CallToolResult::text(format!(
                "No player permissions found for server '{}'.",
                name
            )));
        }

        let mut lines = vec![format!("Player permissions for '{}':", name)];
        lines.extend(permissions.iter().map(|entry| {
            format!(
                "  {} (XUID: {}): {}",
                field_or_unknown(entry, "name"),
                field_or_unknown(entry, "xuid"),
                field_or_unknown(entry, "permission_level")
            )
        }));
        Ok(CallToolResult::text(lines.join("\n")))
    }
}

#[derive(Debug, Deserialize)]
struct UpdatePermissionsArgs {
    server_name: String,
    permissions: Vec<Value>,
}

fn check_permission_entry(entry: &Value) -> Result<(), String> {
    if str_field(entry, &["xuid"]).is_none() {
        return Err(format!("Permission entry {} is missing 'xuid'.", entry));
    }
    let level = str_field(entry, &["permission_level"]).unwrap_or_default();
    require_choice("permission_level", level, PERMISSION_LEVELS)
}

/// Set permission levels for players on a server
pub struct UpdatePlayerPermissionsTool {
    api: Arc<dyn BedrockApi>,
}

impl UpdatePlayerPermissionsTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for UpdatePlayerPermissionsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_player_permissions".to_string(),
            description: "Set permission levels for players on a server.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "permissions": json_schema_array(
                        json_schema_object(
                            json!({
                                "xuid": json_schema_string("Player XUID"),
                                "name": json_schema_string("Player gamertag"),
                                "permission_level": json_schema_enum(
                                    PERMISSION_LEVELS,
                                    "Permission level"
                                ),
                            }),
                            vec!["xuid", "permission_level"],
                        ),
                        "Permission entries"
                    ),
                }),
                vec!["server_name", "permissions"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: UpdatePermissionsArgs = parse_args(arguments, "update_player_permissions")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        if args.permissions.is_empty() {
            return Ok(invalid("permissions must contain at least one entry."));
        }
        for entry in &args.permissions {
            ensure_valid!(check_permission_entry(entry));
        }

        let request = ApiRequest::put(server_path(&args.server_name, "permissions/set"))
            .json(json!({ "permissions": args.permissions }));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(message_or(
                &body,
                "Player permissions updated",
            ))),
            Err(failure) => Ok(failed(
                format!(
                    "Failed to update player permissions for server {}",
                    args.server_name
                ),
                &failure,
            )),
        }
    }
}
