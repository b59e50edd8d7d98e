// World, addon and content tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{
    array_at, bullet_list, display_value, ensure_valid, failed, invalid, message_or,
    require_identifier, server_path, str_field,
};
use crate::tools::{
    json_schema_empty, json_schema_object, json_schema_string, parse_args, server_name_schema,
    ServerArgs, Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi, Bytes};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

/// Export the active world to an .mcworld archive
pub struct ExportWorldTool {
    api: Arc<dyn BedrockApi>,
}

impl ExportWorldTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for ExportWorldTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "export_world".to_string(),
            description: "Export a server's active world to an .mcworld file.".to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "export_world")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        match self.api.call(ApiRequest::post(server_path(&name, "world/export"))).await {
            Ok(body) => {
                let mut text = format!(
                    "{} for server {}",
                    message_or(&body, "World export started"),
                    name
                );
                if let Some(path) = str_field(&body, &["data", "export_path"]) {
                    text.push_str(&format!("\nExport path: {}", path));
                }
                Ok(CallToolResult::text(text))
            }
            Err(failure) => Ok(failed(
                format!("Failed to export world for server {}", name),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstallContentArgs {
    server_name: String,
    filename: String,
}

/// Kinds of content file the manager can install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    World,
    Addon,
}

impl ContentKind {
    fn noun(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Addon => "addon",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::World => "World",
            Self::Addon => "Addon",
        }
    }
}

/// Install a world or addon file from the manager's content directory
pub struct InstallContentTool {
    api: Arc<dyn BedrockApi>,
    kind: ContentKind,
}

impl InstallContentTool {
    pub fn new(api: Arc<dyn BedrockApi>, kind: ContentKind) -> Self {
        Self { api, kind }
    }

    fn tool_name(&self) -> String {
        format!("install_{}", self.kind.noun())
    }
}

#[async_trait::async_trait]
impl Tool for InstallContentTool {
    fn schema(&self) -> ToolSchema {
        let (description, filename) = match self.kind {
            ContentKind::World => (
                "Install an .mcworld file onto a server, replacing its current world.",
                "Path to the .mcworld file relative to the content/worlds directory",
            ),
            ContentKind::Addon => (
                "Install an .mcaddon or .mcpack file onto a server.",
                "Path to the addon file relative to the content/addons directory",
            ),
        };
        ToolSchema {
            name: self.tool_name(),
            description: description.to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "filename": json_schema_string(filename),
                }),
                vec!["server_name", "filename"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: InstallContentArgs = parse_args(arguments, &self.tool_name())?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        if args.filename.trim().is_empty() {
            return Ok(invalid("filename must not be empty."));
        }

        let noun = self.kind.noun();
        let request = ApiRequest::post(server_path(&args.server_name, &format!("{}/install", noun)))
            .json(json!({ "filename": args.filename }));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(message_or(
                &body,
                format!(
                    "{} '{}' install command sent.",
                    self.kind.label(),
                    args.filename
                ),
            ))),
            Err(failure) => Ok(failed(
                format!(
                    "Failed to install {} '{}' on server {}",
                    noun, args.filename, args.server_name
                ),
                &failure,
            )),
        }
    }
}

/// Delete the current world so the server generates a new one
pub struct ResetWorldTool {
    api: Arc<dyn BedrockApi>,
}

impl ResetWorldTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for ResetWorldTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "reset_world".to_string(),
            description: "Delete a server's current world. A new one is generated on next start."
                .to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "reset_world")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        match self.api.call(ApiRequest::delete(server_path(&name, "world/reset"))).await {
            Ok(body) => Ok(CallToolResult::text(format!(
                "World reset for server '{}'. Status: {}",
                name,
                message_or(&body, "World reset successfully")
            ))),
            Err(failure) => Ok(failed(
                format!("Failed to reset world for server '{}'", name),
                &failure,
            )),
        }
    }
}

/// List installable content files
pub struct ListContentTool {
    api: Arc<dyn BedrockApi>,
    kind: ContentKind,
}

impl ListContentTool {
    pub fn new(api: Arc<dyn BedrockApi>, kind: ContentKind) -> Self {
        Self { api, kind }
    }
}

#[async_trait::async_trait]
impl Tool for ListContentTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: format!("list_available_{}s", self.kind.noun()),
            description: format!(
                "List {} files available for installation.",
                self.kind.noun()
            ),
            input_schema: json_schema_empty(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        let noun = self.kind.noun();
        let request = ApiRequest::get(format!("/api/content/{}s", noun)).public();
        match self.api.call(request).await {
            Ok(body) => {
                let files: Vec<String> = array_at(&body, &["files"])
                    .iter()
                    .filter_map(display_value)
                    .collect();
                if files.is_empty() {
                    return Ok(CallToolResult::text(format!("No {} files available.", noun)));
                }
                Ok(CallToolResult::text(bullet_list(
                    format!("Available {}s:", noun),
                    files,
                )))
            }
            Err(failure) => Ok(failed(format!("Unable to fetch available {}s", noun), &failure)),
        }
    }
}

/// Write image bytes to `save_path` or just acknowledge the fetch.
async fn deliver_image(label: &str, bytes: Bytes, save_path: Option<&str>) -> CallToolResult {
    let Some(path) = save_path.filter(|p| !p.is_empty()) else {
        return CallToolResult::text(format!(
            "{} fetched successfully (binary data not shown).",
            label
        ));
    };

    match tokio::fs::write(Path::new(path), &bytes).await {
        Ok(()) => {
            tracing::debug!(path, bytes = bytes.len(), "Saved image");
            CallToolResult::text(format!("{} saved to {}", label, path))
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "Failed to save image");
            CallToolResult::failure(format!(
                "Failed to save {} to {}: {}",
                label.to_lowercase(),
                path,
                e
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorldIconArgs {
    server_name: String,
    #[serde(default)]
    save_path: Option<String>,
}

/// Fetch a server's world icon
pub struct GetWorldIconTool {
    api: Arc<dyn BedrockApi>,
}

impl GetWorldIconTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetWorldIconTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_world_icon".to_string(),
            description: "Fetch the world icon image of a server, optionally saving it to a file."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "save_path": json_schema_string("Local file path to write the image to"),
                }),
                vec!["server_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: WorldIconArgs = parse_args(arguments, "get_world_icon")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));

        let request = ApiRequest::get(server_path(&args.server_name, "world/icon")).public();
        match self.api.fetch_bytes(request).await {
            Ok(bytes) => Ok(deliver_image("World icon image", bytes, args.save_path.as_deref()).await),
            Err(failure) => Ok(failed(
                format!("Failed to fetch world icon for server '{}'", args.server_name),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PanoramaArgs {
    #[serde(default)]
    save_path: Option<String>,
}

/// Fetch the manager's custom panorama image
pub struct GetPanoramaImageTool {
    api: Arc<dyn BedrockApi>,
}

impl GetPanoramaImageTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetPanoramaImageTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_panorama_image".to_string(),
            description: "Fetch the custom panorama image, optionally saving it to a file."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "save_path": json_schema_string("Local file path to write the image to"),
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: PanoramaArgs = parse_args(arguments, "get_panorama_image")?;

        match self.api.fetch_bytes(ApiRequest::get("/api/panorama").public()).await {
            Ok(bytes) => Ok(deliver_image("Panorama image", bytes, args.save_path.as_deref()).await),
            Err(failure) => Ok(failed("Failed to fetch panorama image", &failure)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{not_found, run, FakeApi};
    use bedrock_client::{Access, Method};

    #[tokio::test]
    async fn test_export_world_with_path() {
        let api = FakeApi::responding(json!({
            "message": "World exported",
            "data": {"export_path": "/backups/s1/world.mcworld"}
        }));
        let result = run(&ExportWorldTool::new(api), json!({"server_name": "s1"})).await;
        assert_eq!(
            result.text_content(),
            "World exported for server s1\nExport path: /backups/s1/world.mcworld"
        );
    }

    #[tokio::test]
    async fn test_export_world_defaults() {
        let api = FakeApi::responding(json!({"data": []}));
        let result = run(&ExportWorldTool::new(api), json!({"server_name": "s1"})).await;
        assert_eq!(result.text_content(), "World export started for server s1");
    }

    #[tokio::test]
    async fn test_install_world_and_addon() {
        let api = FakeApi::responding(json!({}));

        let world = InstallContentTool::new(api.clone(), ContentKind::World);
        assert_eq!(world.schema().name, "install_world");
        let result = run(&world, json!({"server_name": "s1", "filename": "skyblock.mcworld"})).await;
        assert_eq!(
            result.text_content(),
            "World 'skyblock.mcworld' install command sent."
        );
        assert_eq!(api.last_request().path, "/api/server/s1/world/install");
        assert_eq!(
            api.last_request().body,
            Some(json!({"filename": "skyblock.mcworld"}))
        );

        let addon = InstallContentTool::new(api.clone(), ContentKind::Addon);
        assert_eq!(addon.schema().name, "install_addon");
        run(&addon, json!({"server_name": "s1", "filename": "pack.mcpack"})).await;
        assert_eq!(api.last_request().path, "/api/server/s1/addon/install");
    }

    #[tokio::test]
    async fn test_install_failure_names_file_and_server() {
        let api = FakeApi::failing(not_found());
        let tool = InstallContentTool::new(api, ContentKind::Addon);
        let result = run(&tool, json!({"server_name": "s1", "filename": "pack.mcpack"})).await;
        assert_eq!(
            result.text_content(),
            "Failed to install addon 'pack.mcpack' on server s1: HTTP 404: Server not found"
        );
    }

    #[tokio::test]
    async fn test_reset_world() {
        let api = FakeApi::responding(json!({"message": "World deleted"}));
        let result = run(&ResetWorldTool::new(api.clone()), json!({"server_name": "s1"})).await;

        assert_eq!(
            result.text_content(),
            "World reset for server 's1'. Status: World deleted"
        );
        assert_eq!(api.last_request().method, Method::Delete);
    }

    #[tokio::test]
    async fn test_list_worlds_is_public() {
        let api = FakeApi::responding(json!({"files": ["a.mcworld", "b.mcworld"]}));
        let tool = ListContentTool::new(api.clone(), ContentKind::World);
        let result = run(&tool, json!({})).await;

        assert_eq!(tool.schema().name, "list_available_worlds");
        assert_eq!(
            result.text_content(),
            "Available worlds:\n  - a.mcworld\n  - b.mcworld"
        );
        let request = api.last_request();
        assert_eq!(request.path, "/api/content/worlds");
        assert_eq!(request.access, Access::Public);
    }

    #[tokio::test]
    async fn test_list_addons_empty() {
        let api = FakeApi::responding(json!({"files": []}));
        let tool = ListContentTool::new(api.clone(), ContentKind::Addon);
        let result = run(&tool, json!({})).await;

        assert_eq!(result.text_content(), "No addon files available.");
        assert_eq!(api.last_request().path, "/api/content/addons");
    }

    #[tokio::test]
    async fn test_world_icon_without_save_path() {
        let api = FakeApi::serving(b"\x89PNG");
        let result = run(&GetWorldIconTool::new(api.clone()), json!({"server_name": "s1"})).await;

        assert_eq!(
            result.text_content(),
            "World icon image fetched successfully (binary data not shown)."
        );
        assert_eq!(api.last_request().path, "/api/server/s1/world/icon");
        assert_eq!(api.last_request().access, Access::Public);
    }

    #[tokio::test]
    async fn test_panorama_saved_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panorama.jpeg");
        let path_str = path.to_str().unwrap().to_string();

        let api = FakeApi::serving(b"jpeg-bytes");
        let result = run(
            &GetPanoramaImageTool::new(api),
            json!({"save_path": path_str.clone()}),
        )
        .await;

        assert_eq!(
            result.text_content(),
            format!("Panorama image saved to {}", path_str)
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("icon.jpeg");

        let api = FakeApi::serving(b"icon");
        let result = run(
            &GetWorldIconTool::new(api),
            json!({"server_name": "s1", "save_path": path.to_str().unwrap()}),
        )
        .await;

        assert!(result.is_error());
        assert!(result.text_content().starts_with("Failed to save world icon image to"));
    }

    #[tokio::test]
    async fn test_image_fetch_failure() {
        let api = FakeApi::failing(not_found());
        let result = run(&GetWorldIconTool::new(api), json!({"server_name": "s1"})).await;
        assert!(result.is_error());
        assert!(result.text_content().contains("'s1'"));
    }
}
