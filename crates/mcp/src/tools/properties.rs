// server.properties tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{
    display_value, ensure_valid, failed, invalid, message_or, require_identifier, server_path,
};
use crate::tools::{
    json_schema_free_object, json_schema_object, json_schema_string, parse_args,
    server_name_schema, ServerArgs, Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Read every key of a server's server.properties
pub struct GetServerPropertiesTool {
    api: Arc<dyn BedrockApi>,
}

impl GetServerPropertiesTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetServerPropertiesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_server_properties".to_string(),
            description: "Get all key/value pairs from a server's server.properties file."
                .to_string(),
            input_schema: server_name_schema("Name of the server"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ServerArgs = parse_args(arguments, "get_server_properties")?;
        let name = args.server_name;
        ensure_valid!(require_identifier("server_name", &name));

        let body = match self.api.call(ApiRequest::get(server_path(&name, "properties/get"))).await {
            Ok(body) => body,
            Err(failure) => {
                return Ok(failed(
                    format!("Unable to fetch properties for server {}", name),
                    &failure,
                ))
            }
        };

        let properties = match body.get("properties").and_then(Value::as_object) {
            Some(properties) if !properties.is_empty() => properties,
            _ => {
                return Ok(CallToolResult::text(format!(
                    "No properties found for server {}.",
                    name
                )))
            }
        };

        let mut keys: Vec<&String> = properties.keys().collect();
        keys.sort();

        let mut lines = vec![format!("Properties for server {}:", name)];
        for key in keys {
            let value = display_value(&properties[key.as_str()]).unwrap_or_default();
            lines.push(format!("  {}: {}", key, value));
        }
        Ok(CallToolResult::text(lines.join("\n")))
    }
}

#[derive(Debug, Deserialize)]
struct UpdatePropertiesArgs {
    server_name: String,
    properties: Map<String, Value>,
}

/// Change selected server.properties keys
pub struct UpdateServerPropertiesTool {
    api: Arc<dyn BedrockApi>,
}

impl UpdateServerPropertiesTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for UpdateServerPropertiesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_server_properties".to_string(),
            description: "Update server.properties values. Only keys the manager allows \
                          (server-name, level-name, gamemode, difficulty, max-players, ...) \
                          can be changed."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "properties": json_schema_free_object("Property names mapped to new values"),
                }),
                vec!["server_name", "properties"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: UpdatePropertiesArgs = parse_args(arguments, "update_server_properties")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        if args.properties.is_empty() {
            return Ok(invalid("properties must contain at least one key."));
        }

        let request = ApiRequest::post(server_path(&args.server_name, "properties/set"))
            .json(json!({ "properties": args.properties }));
        match self.api.call(request).await {
            Ok(body) => Ok(CallToolResult::text(message_or(
                &body,
                "Server properties updated successfully.",
            ))),
            Err(failure) => Ok(failed(
                format!("Failed to update properties for server {}", args.server_name),
                &failure,
            )),
        }
    }
}
