pub mod allowlist;
pub mod backups;
pub mod format;
pub mod players;
pub mod plugins;
pub mod properties;
pub mod scheduler;
pub mod servers;
pub mod service;
pub mod session;
pub mod settings;
pub mod system;
pub mod world;
mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use registry::{
    json_schema_any, json_schema_array, json_schema_boolean, json_schema_empty, json_schema_enum,
    json_schema_free_object, json_schema_integer, json_schema_object, json_schema_string,
    parse_args, Tool, ToolRegistry,
};

use bedrock_client::BedrockApi;
use serde::Deserialize;
use std::sync::Arc;

/// Arguments of tools that only name a server.
#[derive(Debug, Deserialize)]
pub struct ServerArgs {
    pub server_name: String,
}

/// Input schema with a single required `server_name`.
pub fn server_name_schema(description: &str) -> serde_json::Value {
    json_schema_object(
        serde_json::json!({ "server_name": json_schema_string(description) }),
        vec!["server_name"],
    )
}

/// Register every Bedrock Server Manager tool against `api`.
pub fn register_all(registry: &mut ToolRegistry, api: Arc<dyn BedrockApi>) {
    use allowlist::*;
    use backups::*;
    use players::*;
    use plugins::*;
    use properties::*;
    use scheduler::*;
    use servers::*;
    use service::*;
    use session::*;
    use settings::*;
    use system::*;
    use world::*;

    let tools: Vec<Arc<dyn Tool>> = vec![
        // servers
        Arc::new(GetServersTool::new(api.clone())),
        Arc::new(GetServerStatusTool::new(api.clone())),
        Arc::new(ServerActionTool::new(api.clone(), ServerAction::Start)),
        Arc::new(ServerActionTool::new(api.clone(), ServerAction::Stop)),
        Arc::new(ServerActionTool::new(api.clone(), ServerAction::Restart)),
        Arc::new(SendCommandTool::new(api.clone())),
        Arc::new(GetServerProcessInfoTool::new(api.clone())),
        Arc::new(GetServerVersionTool::new(api.clone())),
        Arc::new(ValidateServerTool::new(api.clone())),
        Arc::new(UpdateServerTool::new(api.clone())),
        Arc::new(DeleteServerTool::new(api.clone())),
        Arc::new(GetConfigStatusTool::new(api.clone())),
        Arc::new(InstallNewServerTool::new(api.clone())),
        // allowlist
        Arc::new(GetAllowlistTool::new(api.clone())),
        Arc::new(AddToAllowlistTool::new(api.clone())),
        Arc::new(RemoveFromAllowlistTool::new(api.clone())),
        // properties
        Arc::new(GetServerPropertiesTool::new(api.clone())),
        Arc::new(UpdateServerPropertiesTool::new(api.clone())),
        // backups
        Arc::new(BackupServerTool::new(api.clone())),
        Arc::new(RestoreServerTool::new(api.clone())),
        Arc::new(SelectRestoreBackupTypeTool::new(api.clone())),
        Arc::new(ListServerBackupsTool::new(api.clone())),
        Arc::new(PruneBackupsTool::new(api.clone())),
        // world and content
        Arc::new(ExportWorldTool::new(api.clone())),
        Arc::new(InstallContentTool::new(api.clone(), ContentKind::World)),
        Arc::new(InstallContentTool::new(api.clone(), ContentKind::Addon)),
        Arc::new(ResetWorldTool::new(api.clone())),
        Arc::new(ListContentTool::new(api.clone(), ContentKind::World)),
        Arc::new(ListContentTool::new(api.clone(), ContentKind::Addon)),
        Arc::new(GetWorldIconTool::new(api.clone())),
        Arc::new(GetPanoramaImageTool::new(api.clone())),
        // players
        Arc::new(GetPlayersTool::new(api.clone())),
        Arc::new(ScanPlayerLogsTool::new(api.clone())),
        Arc::new(AddPlayersTool::new(api.clone())),
        Arc::new(GetPlayerPermissionsTool::new(api.clone())),
        Arc::new(UpdatePlayerPermissionsTool::new(api.clone())),
        // plugins
        Arc::new(GetPluginStatusesTool::new(api.clone())),
        Arc::new(SetPluginEnabledTool::new(api.clone())),
        Arc::new(ReloadPluginsTool::new(api.clone())),
        Arc::new(TriggerPluginEventTool::new(api.clone())),
        // settings
        Arc::new(SettingsQueryTool::new(api.clone(), SettingsQuery::AllSettings)),
        Arc::new(SettingsQueryTool::new(api.clone(), SettingsQuery::Themes)),
        Arc::new(SettingsQueryTool::new(api.clone(), SettingsQuery::Reload)),
        Arc::new(SetSettingTool::new(api.clone())),
        // system and service
        Arc::new(GetSystemInfoTool::new(api.clone())),
        Arc::new(PruneDownloadsTool::new(api.clone())),
        Arc::new(ConfigureServiceTool::new(api.clone())),
        Arc::new(UpdateServiceSettingsTool::new(api.clone())),
        // scheduler
        Arc::new(CronJobTool::new(api.clone(), CronEdit::Add)),
        Arc::new(CronJobTool::new(api.clone(), CronEdit::Modify)),
        Arc::new(DeleteCronJobTool::new(api.clone())),
        Arc::new(AddWindowsTaskTool::new(api.clone())),
        Arc::new(GetWindowsTaskDetailsTool::new(api.clone())),
        Arc::new(ModifyWindowsTaskTool::new(api.clone())),
        Arc::new(DeleteWindowsTaskTool::new(api.clone())),
        // session
        Arc::new(LogoutTool::new(api)),
    ];

    for tool in tools {
        registry.register(tool);
    }
    tracing::debug!(count = registry.len(), "Registered tools");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{run, FakeApi};
    use bedrock_client::ApiFailure;
    use serde_json::{json, Value};

    fn sample_calls() -> Vec<(&'static str, Value)> {
        let server = json!({"server_name": "Survival"});
        vec![
            ("get_servers", json!({})),
            ("get_server_status", server.clone()),
            ("start_server", server.clone()),
            ("stop_server", server.clone()),
            ("restart_server", server.clone()),
            ("send_command", json!({"server_name": "Survival", "command": "list"})),
            ("get_server_process_info", server.clone()),
            ("get_server_version", server.clone()),
            ("validate_server", server.clone()),
            ("update_server", server.clone()),
            ("delete_server", server.clone()),
            ("get_config_status", server.clone()),
            ("install_new_server", json!({"server_config": {"server_name": "Survival"}})),
            ("get_allowlist", server.clone()),
            ("add_players_to_allowlist", json!({"server_name": "Survival", "player_names": ["Steve"]})),
            ("remove_from_allowlist", json!({"server_name": "Survival", "player_names": ["Steve"]})),
            ("get_server_properties", server.clone()),
            ("update_server_properties", json!({"server_name": "Survival", "properties": {"difficulty": "hard"}})),
            ("backup_server", server.clone()),
            ("restore_server", json!({"server_name": "Survival", "restore_type": "all"})),
            ("select_restore_backup_type", json!({"server_name": "Survival", "restore_type": "world"})),
            ("list_server_backups", server.clone()),
            ("prune_backups", server.clone()),
            ("export_world", server.clone()),
            ("install_world", json!({"server_name": "Survival", "filename": "w.mcworld"})),
            ("install_addon", json!({"server_name": "Survival", "filename": "a.mcpack"})),
            ("reset_world", server.clone()),
            ("list_available_worlds", json!({})),
            ("list_available_addons", json!({})),
            ("get_world_icon", server.clone()),
            ("get_panorama_image", json!({})),
            ("get_players", json!({})),
            ("scan_player_logs", json!({})),
            ("add_players", json!({"players": ["Steve:2535400000000001"]})),
            ("get_player_permissions", server.clone()),
            ("update_player_permissions", json!({"server_name": "Survival", "permissions": [{"xuid": "1", "permission_level": "member"}]})),
            ("get_plugin_statuses", json!({})),
            ("set_plugin_enabled", json!({"plugin_name": "motd", "enabled": true})),
            ("reload_all_plugins", json!({})),
            ("trigger_plugin_event", json!({"event_name": "demo:ping"})),
            ("get_all_settings", json!({})),
            ("get_themes", json!({})),
            ("reload_settings", json!({})),
            ("set_setting", json!({"key": "web.theme", "value": "dark"})),
            ("get_system_info", json!({})),
            ("prune_downloads", json!({})),
            ("configure_service", json!({"server_name": "Survival", "service_config": {"autostart": true}})),
            ("update_service_settings", json!({"server_name": "Survival", "autostart": true})),
            ("add_cron_job", json!({"server_name": "Survival", "job_details": {"new_cron_job": "0 3 * * * backup"}})),
            ("modify_cron_job", json!({"server_name": "Survival", "job_details": {"new_cron_job": "0 4 * * * backup"}})),
            ("delete_cron_job", json!({"server_name": "Survival", "job_id": "job-1"})),
            ("add_windows_task", json!({"server_name": "Survival", "task_details": {"command": "backup"}})),
            ("get_windows_task_details", json!({"server_name": "Survival", "task_name": "nightly"})),
            ("modify_windows_task", json!({"server_name": "Survival", "task_name": "nightly", "task_details": {"command": "backup"}})),
            ("delete_windows_task", json!({"server_name": "Survival", "task_name": "nightly"})),
            ("api_logout", json!({})),
        ]
    }

    fn registry_with(api: Arc<FakeApi>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry, api);
        registry
    }

    #[test]
    fn test_every_tool_is_registered_once() {
        let registry = registry_with(FakeApi::responding(json!({})));
        let calls = sample_calls();

        assert_eq!(registry.len(), calls.len());
        for (name, _) in &calls {
            assert!(registry.contains(name), "missing tool {}", name);
        }

        let names: Vec<String> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_schemas_are_objects_with_descriptions() {
        let registry = registry_with(FakeApi::responding(json!({})));
        for schema in registry.list_schemas() {
            assert_eq!(schema.input_schema["type"], "object", "{}", schema.name);
            assert!(!schema.description.is_empty(), "{}", schema.name);
        }
    }

    #[tokio::test]
    async fn test_failures_name_their_subject() {
        let api = FakeApi::failing(ApiFailure::Http {
            status: 500,
            body: json!({"message": "boom"}),
        });
        let registry = registry_with(api.clone());

        for (name, arguments) in sample_calls() {
            let subject = arguments
                .get("server_name")
                .or_else(|| arguments.get("plugin_name"))
                .or_else(|| arguments.pointer("/server_config/server_name"))
                .and_then(Value::as_str)
                .map(str::to_string);

            let tool = registry.get(name).unwrap();
            let result = run(tool.as_ref(), arguments).await;
            let text = result.text_content();

            assert!(result.is_error(), "{} should report failure", name);
            assert!(text.ends_with("HTTP 500: boom"), "{}: {}", name, text);
            if let Some(subject) = subject {
                assert!(text.contains(&subject), "{}: {}", name, text);
            }
        }
        assert_eq!(api.calls(), sample_calls().len());
    }

    #[tokio::test]
    async fn test_read_only_tools_are_idempotent() {
        let api = FakeApi::responding(json!({
            "servers": [{"name": "Survival", "status": "RUNNING", "version": "1.20.40.01"}],
            "players": [{"name": "Steve", "xuid": "1"}],
            "properties": {"gamemode": "survival"},
            "data": {"os_type": "Linux", "app_version": "3.2.1"}
        }));
        let registry = registry_with(api);

        for name in [
            "get_servers",
            "get_players",
            "get_server_properties",
            "get_system_info",
            "get_all_settings",
        ] {
            let tool = registry.get(name).unwrap();
            let arguments = json!({"server_name": "Survival"});
            let first = run(tool.as_ref(), arguments.clone()).await.text_content();
            let second = run(tool.as_ref(), arguments).await.text_content();
            assert_eq!(first, second, "{}", name);
        }
    }
}
