// Cron (Linux) and Task Scheduler (Windows) job tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::format::{
    ensure_valid, failed, invalid, message_or, pretty_json, require_identifier, server_path,
};
use crate::tools::{
    json_schema_free_object, json_schema_object, json_schema_string, parse_args, Tool,
};
use anyhow::Result;
use bedrock_client::{ApiRequest, BedrockApi};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Send a command-style request and answer with `message` or `default`.
async fn acknowledge(
    api: &dyn BedrockApi,
    request: ApiRequest,
    default: &str,
    action: String,
) -> CallToolResult {
    match api.call(request).await {
        Ok(body) => CallToolResult::text(message_or(&body, default)),
        Err(failure) => failed(action, &failure),
    }
}

#[derive(Debug, Deserialize)]
struct JobDetailsArgs {
    server_name: String,
    job_details: Map<String, Value>,
}

/// Add and modify share the request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronEdit {
    Add,
    Modify,
}

/// Create or change a cron job
pub struct CronJobTool {
    api: Arc<dyn BedrockApi>,
    edit: CronEdit,
}

impl CronJobTool {
    pub fn new(api: Arc<dyn BedrockApi>, edit: CronEdit) -> Self {
        Self { api, edit }
    }

    fn verb(&self) -> &'static str {
        match self.edit {
            CronEdit::Add => "add",
            CronEdit::Modify => "modify",
        }
    }
}

#[async_trait::async_trait]
impl Tool for CronJobTool {
    fn schema(&self) -> ToolSchema {
        let (description, details) = match self.edit {
            CronEdit::Add => (
                "Add a cron job for a server (Linux hosts).",
                "Job definition, e.g. {\"new_cron_job\": \"0 */6 * * * bedrock-server-manager backup create --server s1\"}",
            ),
            CronEdit::Modify => (
                "Replace an existing cron job of a server (Linux hosts).",
                "Old and new job, e.g. {\"old_cron_job\": \"...\", \"new_cron_job\": \"...\"}",
            ),
        };
        ToolSchema {
            name: format!("{}_cron_job", self.verb()),
            description: description.to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "job_details": json_schema_free_object(details),
                }),
                vec!["server_name", "job_details"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let verb = self.verb();
        let args: JobDetailsArgs = parse_args(arguments, &format!("{}_cron_job", verb))?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        if args.job_details.is_empty() {
            return Ok(invalid("job_details must not be empty."));
        }

        let request = ApiRequest::post(server_path(
            &args.server_name,
            &format!("cron_scheduler/{}", verb),
        ))
        .json(Value::Object(args.job_details));
        let default = match self.edit {
            CronEdit::Add => "Add cron job command sent.",
            CronEdit::Modify => "Modify cron job command sent.",
        };
        Ok(acknowledge(
            self.api.as_ref(),
            request,
            default,
            format!("Failed to {} cron job for server {}", verb, args.server_name),
        )
        .await)
    }
}

#[derive(Debug, Deserialize)]
struct DeleteCronArgs {
    server_name: String,
    job_id: String,
}

/// Remove a cron job
pub struct DeleteCronJobTool {
    api: Arc<dyn BedrockApi>,
}

impl DeleteCronJobTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for DeleteCronJobTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "delete_cron_job".to_string(),
            description: "Delete a cron job of a server (Linux hosts).".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "job_id": json_schema_string("Identifier (or full cron line) of the job"),
                }),
                vec!["server_name", "job_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: DeleteCronArgs = parse_args(arguments, "delete_cron_job")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        if args.job_id.trim().is_empty() {
            return Ok(invalid("job_id must not be empty."));
        }

        let request = ApiRequest::delete(server_path(&args.server_name, "cron_scheduler/delete"))
            .json(json!({ "job_id": args.job_id }));
        Ok(acknowledge(
            self.api.as_ref(),
            request,
            "Delete cron job command sent.",
            format!(
                "Failed to delete cron job '{}' for server {}",
                args.job_id, args.server_name
            ),
        )
        .await)
    }
}

#[derive(Debug, Deserialize)]
struct AddTaskArgs {
    server_name: String,
    task_details: Map<String, Value>,
}

/// Create a Windows scheduled task
pub struct AddWindowsTaskTool {
    api: Arc<dyn BedrockApi>,
}

impl AddWindowsTaskTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for AddWindowsTaskTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "add_windows_task".to_string(),
            description: "Create a Windows Task Scheduler task for a server.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "task_details": json_schema_free_object(
                        "Task definition: command, triggers and options"
                    ),
                }),
                vec!["server_name", "task_details"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: AddTaskArgs = parse_args(arguments, "add_windows_task")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        if args.task_details.is_empty() {
            return Ok(invalid("task_details must not be empty."));
        }

        let request = ApiRequest::post(server_path(&args.server_name, "task_scheduler/add"))
            .json(Value::Object(args.task_details));
        Ok(acknowledge(
            self.api.as_ref(),
            request,
            "Add windows task command sent.",
            format!("Failed to add windows task for server {}", args.server_name),
        )
        .await)
    }
}

#[derive(Debug, Deserialize)]
struct TaskArgs {
    server_name: String,
    task_name: String,
}

/// Task Scheduler details for one task, as JSON
pub struct GetWindowsTaskDetailsTool {
    api: Arc<dyn BedrockApi>,
}

impl GetWindowsTaskDetailsTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for GetWindowsTaskDetailsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_windows_task_details".to_string(),
            description: "Get the definition of a Windows scheduled task as JSON.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "task_name": json_schema_string("Name of the task"),
                }),
                vec!["server_name", "task_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: TaskArgs = parse_args(arguments, "get_windows_task_details")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        ensure_valid!(require_identifier("task_name", &args.task_name));

        let request = ApiRequest::post(server_path(&args.server_name, "task_scheduler/details"))
            .json(json!({ "task_name": args.task_name }));
        match self.api.call(request).await {
            Ok(body) => {
                let data = body.get("data").cloned().unwrap_or_else(|| json!({}));
                Ok(CallToolResult::text(pretty_json(&data)))
            }
            Err(failure) => Ok(failed(
                format!(
                    "Failed to get windows task '{}' for server {}",
                    args.task_name, args.server_name
                ),
                &failure,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModifyTaskArgs {
    server_name: String,
    task_name: String,
    task_details: Map<String, Value>,
}

/// Replace a Windows scheduled task
pub struct ModifyWindowsTaskTool {
    api: Arc<dyn BedrockApi>,
}

impl ModifyWindowsTaskTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for ModifyWindowsTaskTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "modify_windows_task".to_string(),
            description: "Replace the definition of a Windows scheduled task.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "task_name": json_schema_string("Name of the task to modify"),
                    "task_details": json_schema_free_object("New task definition"),
                }),
                vec!["server_name", "task_name", "task_details"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ModifyTaskArgs = parse_args(arguments, "modify_windows_task")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        ensure_valid!(require_identifier("task_name", &args.task_name));

        let path = server_path(
            &args.server_name,
            &format!("task_scheduler/task/{}", args.task_name),
        );
        let request = ApiRequest::put(path).json(Value::Object(args.task_details));
        Ok(acknowledge(
            self.api.as_ref(),
            request,
            "Modify windows task command sent.",
            format!(
                "Failed to modify windows task '{}' for server {}",
                args.task_name, args.server_name
            ),
        )
        .await)
    }
}

/// Delete a Windows scheduled task
pub struct DeleteWindowsTaskTool {
    api: Arc<dyn BedrockApi>,
}

impl DeleteWindowsTaskTool {
    pub fn new(api: Arc<dyn BedrockApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for DeleteWindowsTaskTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "delete_windows_task".to_string(),
            description: "Delete a Windows scheduled task.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "server_name": json_schema_string("Name of the server"),
                    "task_name": json_schema_string("Name of the task to delete"),
                }),
                vec!["server_name", "task_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: TaskArgs = parse_args(arguments, "delete_windows_task")?;
        ensure_valid!(require_identifier("server_name", &args.server_name));
        ensure_valid!(require_identifier("task_name", &args.task_name));

        let path = server_path(
            &args.server_name,
            &format!("task_scheduler/task/{}", args.task_name),
        );
        Ok(acknowledge(
            self.api.as_ref(),
            ApiRequest::delete(path),
            "Delete windows task command sent.",
            format!(
                "Failed to delete windows task '{}' for server {}",
                args.task_name, args.server_name
            ),
        )
        .await)
    }
}
