use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    let my_issues = ToolDescriptor {
        name: "my_issues".into(),
        description: "Get Linear issues assigned to the authenticated user. Returns list of issues with id, identifier, title, description, state, priority, and project.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {}
        }),
    };

    let issue = ToolDescriptor {
        name: "issue".into(),
        description: "Get details of a specific Linear issue by its identifier (e.g., 'ENG-123'). Returns full issue details including comments, labels, assignee, and team.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "identifier": {"type": "string"}
            },
            "required": ["identifier"]
        }),
    };

    let search = ToolDescriptor {
        name: "search".into(),
        description: "Search Linear issues by text query. Searches in issue title and description (case-insensitive). Returns matching issues with basic details.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "query": {"type": "string"}
            },
            "required": ["query"]
        }),
    };

    let list_projects = ToolDescriptor {
        name: "list_projects".into(),
        description: "List Linear projects. Optionally filter by team_id. Returns projects with id, name, description, state, and url.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "team_id": {"type": "string"}
            }
        }),
    };

    let list_project_updates = ToolDescriptor {
        name: "list_project_updates".into(),
        description: "List status updates for a Linear project. Requires project_id (UUID from list_projects). Optional limit (default 10).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "project_id": {"type": "string"},
                "limit": {"type": "integer"}
            },
            "required": ["project_id"]
        }),
    };

    let create_issue = ToolDescriptor {
        name: "create_issue".into(),
        description: "Create a new Linear issue. Requires team_id and title. Optional: description, priority (0=none, 1=urgent, 2=high, 3=medium, 4=low), state_id, assignee_id, project_id.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "team_id": {"type": "string"},
                "title": {"type": "string"},
                "description": {"type": "string"},
                "priority": {"type": "integer", "minimum": 0, "maximum": 4},
                "state_id": {"type": "string"},
                "assignee_id": {"type": "string"},
                "project_id": {"type": "string"}
            },
            "required": ["team_id", "title"]
        }),
    };

    let update_issue = ToolDescriptor {
        name: "update_issue".into(),
        description: "Update an existing Linear issue. Requires issue_id (internal UUID from issue query). Optional: title, description, priority, state_id, assignee_id.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "issue_id": {"type": "string"},
                "title": {"type": "string"},
                "description": {"type": "string"},
                "priority": {"type": "integer", "minimum": 0, "maximum": 4},
                "state_id": {"type": "string"},
                "assignee_id": {"type": "string"}
            },
            "required": ["issue_id"]
        }),
    };

    let update_status = ToolDescriptor {
        name: "update_status".into(),
        description: "Update the workflow status of a Linear issue. Requires issue_id and state_id (get state_id from states tool).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "issue_id": {"type": "string"},
                "state_id": {"type": "string"}
            },
            "required": ["issue_id", "state_id"]
        }),
    };

    let create_project = ToolDescriptor {
        name: "create_project".into(),
        description: "Create a new Linear project. Requires name and team_id. Optional: description, state (planned, started, paused, completed, canceled).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "name": {"type": "string"},
                "team_id": {"type": "string"},
                "description": {"type": "string"},
                "state": {"type": "string"}
            },
            "required": ["name", "team_id"]
        }),
    };

    let create_project_update = ToolDescriptor {
        name: "create_project_update".into(),
        description: "Post a status update for a Linear project. Requires project_id (UUID from list_projects) and body. Optional: health (onTrack, atRisk, offTrack).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "project_id": {"type": "string"},
                "body": {"type": "string"},
                "health": {"type": "string", "enum": ["onTrack", "atRisk", "offTrack"]}
            },
            "required": ["project_id", "body"]
        }),
    };

    let states = ToolDescriptor {
        name: "states".into(),
        description: "Get available workflow states for a Linear team. If team_id is not provided, returns states for all teams. Use this to get state_id values for update_status tool. State types: backlog, unstarted, started, completed, canceled.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "team_id": {"type": "string"}
            }
        }),
    };

    vec![
        my_issues,
        issue,
        search,
        list_projects,
        list_project_updates,
        create_issue,
        update_issue,
        update_status,
        create_project,
        create_project_update,
        states,
    ]
}

// Tool inputs. Field names are the wire parameter names.

#[derive(Debug, Deserialize)]
pub struct IssueInput {
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchInput {
    pub query: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListProjectsInput {
    pub team_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListProjectUpdatesInput {
    pub project_id: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateIssueInput {
    pub team_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub state_id: Option<String>,
    pub assignee_id: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIssueInput {
    pub issue_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub state_id: Option<String>,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub issue_id: String,
    pub state_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub team_id: String,
    pub description: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectUpdateInput {
    pub project_id: String,
    pub body: String,
    pub health: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StatesInput {
    pub team_id: Option<String>,
}

/// Uniform failure envelope shared by every tool.
pub fn error_envelope(message: impl Into<String>) -> Value {
    serde_json::json!({
        "success": false,
        "error": message.into(),
        "isError": true
    })
}

/// True when `envelope` is the failure form.
pub fn is_error_envelope(envelope: &Value) -> bool {
    envelope
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_cover_all_tools() {
        let names: Vec<String> = tool_descriptors().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "my_issues",
                "issue",
                "search",
                "list_projects",
                "list_project_updates",
                "create_issue",
                "update_issue",
                "update_status",
                "create_project",
                "create_project_update",
                "states",
            ]
        );
    }

    #[test]
    fn error_envelope_shape() {
        let e = error_envelope("nope");
        assert_eq!(e["success"], serde_json::json!(false));
        assert_eq!(e["error"], serde_json::json!("nope"));
        assert_eq!(e["isError"], serde_json::json!(true));
        assert!(is_error_envelope(&e));
        assert!(!is_error_envelope(&serde_json::json!({"success": true})));
    }
}
