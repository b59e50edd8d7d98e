// Backup, restore and pruning tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{
    array_at, display_value, ensure_valid, failed, invalid, message_or, pretty_json,
    require_choice, require_identifier, server_path,
};
use crate::tools::{
    json_schema_enum, json_schema_integer, json_schema_object, json_schema_string, parse_args,
    Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const BACKUP_TYPES: &[&str] = &["world", "config", "all"];
pub const RESTORE_TYPES: &[&str] = &["world", "properties", "allowlist", "permissions", "all"];
pub const BACKUP_LIST_TYPES: &[&str] =
    &["world", "config", "properties", "allowlist", "permissions", "all"];

fn default_backup_type() -> String {
    "world".to_string()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct BackupArgs {
    server_name: String,
    #[serde(default = "default_backup_type")]
    backup_type: String,
    #[serde(default)]
    file_to_backup: Option<String>,
}

/// Trigger a world, config or full backup
pub struct BackupServerTool {
    api: Arc<dyn BedrockApi>,
}

impl BackupServerTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for BackupServerTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "backup_server".to_string(),
            description: "Back up a server's world, one config file, or everything.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "backup_type": json_schema_enum(BACKUP_TYPES, "What to back up (default world)"),
                    "file_to_backup": json_schema_string(
                        "Config file relative to the server directory; required for config backups"
                    ),
                }),
                vec!["server_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: BackupArgs = parse_args(arguments, "backup_server")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        ensure_valid!(require_choice("backup_type", &args.backup_type, BACKUP_TYPES));

        let mut payload = json!({ "backup_type": args.backup_type });
        if args.backup_type == "config" {
            match args.file_to_backup.as_deref().filter(|file| !file.is_empty()) {
                Some(file) => payload["file_to_backup"] = Value::String(file.to_string()),
                None => {
                    return Ok(invalid(
                        "file_to_backup is required when backup_type is 'config'",
                    ))
                }
            }
        }

        let request = ApiRequest::post(server_path(&args.server_name, "backup/action")).json(payload);
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(message_or(
                &body,
                format!("{} backup command sent.", title_case(&args.backup_type)),
            ))),
            Err(failure) => Ok(failed(
                format!(
                    "Failed to send {} backup command for server {}",
                    args.backup_type, args.server_name
                ),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RestoreArgs {
    server_name: String,
    restore_type: String,
    #[serde(default)]
    backup_file: Option<String>,
}

/// Restore a server from a backup file
pub struct RestoreServerTool {
    api: Arc<dyn BedrockApi>,
}

impl RestoreServerTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for RestoreServerTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "restore_server".to_string(),
            description: "Restore a server from a backup. Returns the manager's JSON response."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "restore_type": json_schema_enum(RESTORE_TYPES, "What to restore"),
                    "backup_file": json_schema_string(
                        "Backup file name; required unless restore_type is all"
                    ),
                }),
                vec!["server_name", "restore_type"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: RestoreArgs = parse_args(arguments, "restore_server")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        ensure_valid!(require_choice("restore_type", &args.restore_type, RESTORE_TYPES));

        let mut payload = json!({ "restore_type": args.restore_type });
        if args.restore_type != "all" {
            match args.backup_file.as_deref().filter(|file| !file.is_empty()) {
                Some(file) => payload["backup_file"] = Value::String(file.to_string()),
                None => {
                    return Ok(invalid(format!(
                        "backup_file is required when restore_type is '{}'",
                        args.restore_type
                    )))
                }
            }
        }

        let request = ApiRequest::post(server_path(&args.server_name, "restore/action")).json(payload);
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(pretty_json(&body))),
            Err(failure) => Ok(failed(
                format!(
                    "Failed to restore server '{}' with type '{}'",
                    args.server_name, args.restore_type
                ),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SelectRestoreArgs {
    server_name: String,
    restore_type: String,
}

/// Ask the manager which backups are available for a restore type
pub struct SelectRestoreBackupTypeTool {
    api: Arc<dyn BedrockApi>,
}

impl SelectRestoreBackupTypeTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for SelectRestoreBackupTypeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "select_restore_backup_type".to_string(),
            description: "Select a restore type and get the manager's follow-up (usually the \
                          matching backup files) as JSON."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "restore_type": json_schema_enum(RESTORE_TYPES, "Restore type"),
                }),
                vec!["server_name", "restore_type"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: SelectRestoreArgs = parse_args(arguments, "select_restore_backup_type")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        ensure_valid!(require_choice("restore_type", &args.restore_type, RESTORE_TYPES));

        let request = ApiRequest::post(server_path(&args.server_name, "restore/select_backup_type"))
            .json(json!({ "restore_type": args.restore_type }));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(pretty_json(&body))),
            Err(failure) => Ok(failed(
                format!(
                    "Failed to select restore backup type for server '{}'",
                    args.server_name
                ),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListBackupsArgs {
    server_name: String,
    #[serde(default = "default_backup_type")]
    backup_type: String,
}

/// List backup files of one type
pub struct ListServerBackupsTool {
    api: Arc<dyn BedrockApi>,
}

impl ListServerBackupsTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

fn render_backups(body: &Value, server: &str, backup_type: &str) -> String {
    let header = format!("{} backups for '{}':", title_case(backup_type), server);
    let empty = format!("No {} backups found for server '{}'.", backup_type, server);

    // "all" groups files by category.
    if let Some(groups) = body.get("backups").and_then(Value::as_object) {
        let mut categories: Vec<_> = groups
            .iter()
            .filter_map(|(category, files)| {
                let files = files.as_array().filter(|files| !files.is_empty())?;
                Some((category, files))
            })
            .collect();
        if categories.is_empty() {
            return empty;
        }
        categories.sort_by(|a, b| a.0.cmp(b.0));

        let mut lines = vec![header];
        for (category, files) in categories {
            lines.push(format!("  {}:", category));
            lines.extend(
                files
                    .iter()
                    .filter_map(display_value)
                    .map(|file| format!("    - {}", file)),
            );
        }
        return lines.join("\n");
    }

    let files = array_at(body, &["backups"]);
    if files.is_empty() {
        return empty;
    }
    let mut lines = vec![header];
    lines.extend(
        files
            .iter()
            .filter_map(display_value)
            .map(|file| format!("  - {}", file)),
    );
    lines.join("\n")
}

#[async_trait::async_trait]
impl Tool for ListServerBackupsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_server_backups".to_string(),
            description: "List backup files of a server by type.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "backup_type": json_schema_enum(
                        BACKUP_LIST_TYPES,
                        "Backup category (default world)"
                    ),
                }),
                vec!["server_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ListBackupsArgs = parse_args(arguments, "list_server_backups")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        ensure_valid!(require_choice("backup_type", &args.backup_type, BACKUP_LIST_TYPES));

        let path = server_path(&args.server_name, &format!("backup/list/{}", args.backup_type));
        match self.api.call(ApiRequest::get(path)).await {
            Ok(body) => Ok(CallToolResult::text(render_backups(
                &body,
                &args.server_name,
                &args.backup_type,
            ))),
            Err(failure) => Ok(failed(
                format!(
                    "Unable to fetch backup list for server '{}'",
                    args.server_name
                ),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PruneArgs {
    server_name: String,
    #[serde(default)]
    keep: Option<u32>,
}

/// Delete old backups, keeping the newest ones
pub struct PruneBackupsTool {
    api: Arc<dyn BedrockApi>,
}

impl PruneBackupsTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for PruneBackupsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "prune_backups".to_string(),
            description: "Delete older backups of a server, keeping the newest ones.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "keep": json_schema_integer(
                        "Number of backups to keep (defaults to the manager's setting)"
                    ),
                }),
                vec!["server_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: PruneArgs = parse_args(arguments, "prune_backups")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        let mut request = ApiRequest::post(server_path(&name, "backups/prune"));
        if let Some(keep) = args.keep {
            request = request.json(json!({ "keep": keep }));
        }

        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(message_or(
                &body,
                format!("Backup pruning completed for server {}", name),
            ))),
            Err(failure) => Ok(failed(
                format!("Failed to prune backups for server {}", name),
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
    async fn test_backup_defaults_to_world() {
        let api = FakeApi::responding(json!({"status": "success"}));
        let result = run(&BackupServerTool::new(api.clone()), json!({"server_name": "s1"})).await;

        assert_eq!(result.text_content(), "World backup command sent.");
        let request = api.last_request();
        assert_eq!(request.path, "/api/server/s1/backup/action");
        assert_eq!(request.body, Some(json!({"backup_type": "world"})));
    }

    #[tokio::test]
    async fn test_backup_rejects_unknown_type() {
        let api = FakeApi::responding(json!({}));
        let result = run(
            &BackupServerTool::new(api.clone()),
            json!({"server_name": "s1", "backup_type": "bogus"}),
        )
        .await;

        assert!(result.is_error());
        assert_eq!(
            result.text_content(),
            "Invalid backup_type 'bogus'. Must be one of: world, config, all"
        );
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_config_backup_requires_file() {
        let api = FakeApi::responding(json!({}));
        let tool = BackupServerTool::new(api.clone());

        let result = run(&tool, json!({"server_name": "s1", "backup_type": "config"})).await;
        assert_eq!(
            result.text_content(),
            "file_to_backup is required when backup_type is 'config'"
        );
        assert_eq!(api.calls(), 0);

        run(
            &tool,
            json!({"server_name": "s1", "backup_type": "config", "file_to_backup": "allowlist.json"}),
        )
        .await;
        assert_eq!(
            api.last_request().body,
            Some(json!({"backup_type": "config", "file_to_backup": "allowlist.json"}))
        );
    }

    #[tokio::test]
    async fn test_backup_failure_names_server() {
        let api = FakeApi::failing(not_found());
        let result = run(&BackupServerTool::new(api), json!({"server_name": "s1"})).await;
        assert_eq!(
            result.text_content(),
            "Failed to send world backup command for server s1: HTTP 404: Server not found"
        );
    }

    #[tokio::test]
    async fn test_restore_passes_json_through() {
        let api = FakeApi::responding(json!({"a": 1}));
        let result = run(
            &RestoreServerTool::new(api.clone()),
            json!({"server_name": "s1", "restore_type": "world", "backup_file": "w.mcworld"}),
        )
        .await;

        let text = result.text_content();
        assert_eq!(text, "{\n  \"a\": 1\n}");
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), json!({"a": 1}));
        assert_eq!(
            api.last_request().body,
            Some(json!({"restore_type": "world", "backup_file": "w.mcworld"}))
        );
    }

    #[tokio::test]
    async fn test_restore_validation() {
        let api = FakeApi::responding(json!({}));
        let tool = RestoreServerTool::new(api.clone());

        let result = run(&tool, json!({"server_name": "s1", "restore_type": "config"})).await;
        assert!(result.text_content().starts_with("Invalid restore_type 'config'"));

        let result = run(&tool, json!({"server_name": "s1", "restore_type": "allowlist"})).await;
        assert_eq!(
            result.text_content(),
            "backup_file is required when restore_type is 'allowlist'"
        );
        assert_eq!(api.calls(), 0);

        run(&tool, json!({"server_name": "s1", "restore_type": "all"})).await;
        assert_eq!(api.last_request().body, Some(json!({"restore_type": "all"})));
    }

    #[tokio::test]
    async fn test_select_restore_type() {
        let api = FakeApi::responding(json!({"backups": ["a.json"]}));
        let tool = SelectRestoreBackupTypeTool::new(api.clone());

        let result = run(&tool, json!({"server_name": "s1", "restore_type": "properties"})).await;
        assert_eq!(
            serde_json::from_str::<Value>(&result.text_content()).unwrap(),
            json!({"backups": ["a.json"]})
        );
        assert_eq!(
            api.last_request().path,
            "/api/server/s1/restore/select_backup_type"
        );

        let result = run(&tool, json!({"server_name": "s1", "restore_type": "nope"})).await;
        assert!(result.is_error());
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_list_backups() {
        let api = FakeApi::responding(json!({"backups": ["b1.mcworld", "b2.mcworld"]}));
        let result = run(
            &ListServerBackupsTool::new(api.clone()),
            json!({"server_name": "s1"}),
        )
        .await;

        assert_eq!(
            result.text_content(),
            "World backups for 's1':\n  - b1.mcworld\n  - b2.mcworld"
        );
        assert_eq!(api.last_request().path, "/api/server/s1/backup/list/world");
    }

    #[tokio::test]
    async fn test_list_all_backups_grouped() {
        let api = FakeApi::responding(json!({
            "backups": {"world_backups": ["w.mcworld"], "properties_backups": [], "allowlist_backups": ["a.json"]}
        }));
        let result = run(
            &ListServerBackupsTool::new(api),
            json!({"server_name": "s1", "backup_type": "all"}),
        )
        .await;

        assert_eq!(
            result.text_content(),
            "All backups for 's1':\n  allowlist_backups:\n    - a.json\n  world_backups:\n    - w.mcworld"
        );
    }

    #[tokio::test]
    async fn test_list_backups_empty_and_invalid() {
        let api = FakeApi::responding(json!({"backups": []}));
        let tool = ListServerBackupsTool::new(api.clone());

        let result = run(&tool, json!({"server_name": "s1", "backup_type": "config"})).await;
        assert_eq!(result.text_content(), "No config backups found for server 's1'.");

        let result = run(&tool, json!({"server_name": "s1", "backup_type": "logs"})).await;
        assert!(result.is_error());
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_prune_backups_body() {
        let api = FakeApi::responding(json!({}));
        let tool = PruneBackupsTool::new(api.clone());

        let result = run(&tool, json!({"server_name": "s1"})).await;
        assert_eq!(result.text_content(), "Backup pruning completed for server s1");
        assert_eq!(api.last_request().body, None);

        run(&tool, json!({"server_name": "s1", "keep": 3})).await;
        assert_eq!(api.last_request().body, Some(json!({"keep": 3})));
    }
}
