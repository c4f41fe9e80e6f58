use crate::auth::{CredentialResolver, RequestContext};
use crate::config::Config;
use crate::http;
use crate::mcp::mcp_wrap;
use crate::queries;
use crate::tools::*;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::io::{self, BufRead, Write};

// Minimal JSON-RPC 2.0 types
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Id {
    Str(String),
    Num(i64),
    Null,
}

#[derive(Debug, Serialize, Deserialize)]
struct Request {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Response {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

fn rpc_error(id: Option<Id>, code: i64, message: &str, data: Option<Value>) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.into(),
            data,
        }),
        id,
    }
}

fn rpc_ok(id: Option<Id>, result: Value) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: Some(result),
        error: None,
        id,
    }
}

pub async fn run_stdio_server() -> anyhow::Result<()> {
    info!(
        "Starting linear-mcp stdio server; protocol={}",
        PROTOCOL_VERSION
    );
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let resp = match serde_json::from_str::<Request>(&line) {
            Ok(req) => {
                debug!("Received method={}", req.method);
                dispatch(req).await
            }
            Err(e) => rpc_error(None, -32700, &format!("Parse error: {}", e), None),
        };
        write_response(&resp)?;
    }
    Ok(())
}

fn write_response(resp: &Response) -> anyhow::Result<()> {
    let mut out = io::stdout();
    let payload = serde_json::to_string(resp)?;
    writeln!(out, "{}", payload)?;
    out.flush()?;
    Ok(())
}

async fn dispatch(req: Request) -> Response {
    match req.method.as_str() {
        "initialize" => handle_initialize(req.id),
        "tools/list" => handle_tools_list(req.id),
        "tools/call" => handle_tools_call(req.id, req.params).await,
        other => rpc_error(req.id, -32601, &format!("Method not found: {}", other), None),
    }
}

fn handle_initialize(id: Option<Id>) -> Response {
    rpc_ok(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": "linear-mcp",
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": { "tools": {} }
        }),
    )
}

fn handle_tools_list(id: Option<Id>) -> Response {
    let tools = tool_descriptors();
    rpc_ok(id, json!({ "tools": tools }))
}

#[derive(Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

async fn handle_tools_call(id: Option<Id>, params: Value) -> Response {
    let parsed: Result<ToolCallParams, _> = serde_json::from_value(params);
    let Ok(call) = parsed else {
        return rpc_error(id, -32602, "Invalid params", None);
    };
    // The stdio transport carries no inbound HTTP request or broker
    // context; an HTTP gateway in front of the server would supply them.
    let ctx = RequestContext::detached();
    let envelope = match call.name.as_str() {
        "my_issues" => my_issues_envelope(&ctx).await,
        "issue" => match parse_input::<IssueInput>(call.arguments) {
            Ok(input) => issue_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        "search" => match parse_input::<SearchInput>(call.arguments) {
            Ok(input) => search_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        "list_projects" => match parse_input::<ListProjectsInput>(call.arguments) {
            Ok(input) => list_projects_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        "list_project_updates" => match parse_input::<ListProjectUpdatesInput>(call.arguments) {
            Ok(input) => list_project_updates_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        "create_issue" => match parse_input::<CreateIssueInput>(call.arguments) {
            Ok(input) => create_issue_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        "update_issue" => match parse_input::<UpdateIssueInput>(call.arguments) {
            Ok(input) => update_issue_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        "update_status" => match parse_input::<UpdateStatusInput>(call.arguments) {
            Ok(input) => update_status_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        "create_project" => match parse_input::<CreateProjectInput>(call.arguments) {
            Ok(input) => create_project_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        "create_project_update" => match parse_input::<CreateProjectUpdateInput>(call.arguments) {
            Ok(input) => create_project_update_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        "states" => match parse_input::<StatesInput>(call.arguments) {
            Ok(input) => states_envelope(&ctx, input).await,
            Err(e) => return rpc_error(id, -32602, &e, None),
        },
        _ => return rpc_error(id, -32601, &format!("Tool not found: {}", call.name), None),
    };
    let is_error = is_error_envelope(&envelope);
    rpc_ok(id, mcp_wrap(envelope, is_error))
}

fn parse_input<T: for<'de> Deserialize<'de>>(args: Value) -> Result<T, String> {
    // Missing arguments decode like an empty object for all-optional inputs.
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| format!("Invalid params: {}", e))
}

/// Resolve a credential and run one GraphQL operation. Every failure on
/// this path ends up as an envelope error string; nothing escapes to the
/// JSON-RPC layer.
async fn graphql(
    ctx: &RequestContext,
    document: &str,
    variables: Option<Map<String, Value>>,
) -> Result<Value, String> {
    let cfg = Config::from_env()?;
    let resolver = CredentialResolver::from_config(&cfg);
    let credential = resolver.resolve(ctx).map_err(|e| e.to_string())?;
    let client = http::build_client(&cfg).map_err(|e| e.to_string())?;
    http::execute(&client, &cfg, document, variables, &credential)
        .await
        .map_err(|e| e.to_string())
}

fn variables(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(m) => Some(m),
        _ => None,
    }
}

fn count_of(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}

/// Shape a mutation result: the upstream payload carries its own
/// `success` flag, distinct from the envelope's. A false flag is a domain
/// failure with a fixed message, not a transport error.
fn mutation_envelope(data: &Value, payload: &str, key: &str, failure: &str) -> Value {
    let result = data.get(payload).cloned().unwrap_or(Value::Null);
    if result
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        let mut obj = Map::new();
        obj.insert("success".to_string(), json!(true));
        obj.insert(
            key.to_string(),
            result.get(key).cloned().unwrap_or(Value::Null),
        );
        Value::Object(obj)
    } else {
        error_envelope(failure)
    }
}

async fn my_issues_envelope(ctx: &RequestContext) -> Value {
    match graphql(ctx, queries::MY_ISSUES, None).await {
        Ok(data) => {
            let issues = data
                .pointer("/viewer/assignedIssues/nodes")
                .cloned()
                .unwrap_or_else(|| json!([]));
            let count = count_of(&issues);
            json!({"success": true, "issues": issues, "count": count})
        }
        Err(msg) => error_envelope(msg),
    }
}

async fn issue_envelope(ctx: &RequestContext, input: IssueInput) -> Value {
    let vars = variables(json!({"identifier": input.identifier}));
    match graphql(ctx, queries::ISSUE, vars).await {
        Ok(data) => match data.get("issue") {
            Some(issue) if !issue.is_null() => json!({"success": true, "issue": issue}),
            _ => error_envelope(format!("Issue {} not found", input.identifier)),
        },
        Err(msg) => error_envelope(msg),
    }
}

async fn search_envelope(ctx: &RequestContext, input: SearchInput) -> Value {
    let vars = variables(json!({"query": input.query}));
    match graphql(ctx, queries::SEARCH_ISSUES, vars).await {
        Ok(data) => {
            let issues = data
                .pointer("/issues/nodes")
                .cloned()
                .unwrap_or_else(|| json!([]));
            let count = count_of(&issues);
            json!({
                "success": true,
                "query": input.query,
                "issues": issues,
                "count": count
            })
        }
        Err(msg) => error_envelope(msg),
    }
}

async fn list_projects_envelope(ctx: &RequestContext, input: ListProjectsInput) -> Value {
    let result = match &input.team_id {
        Some(team_id) => {
            let vars = variables(json!({"teamId": team_id}));
            match graphql(ctx, queries::TEAM_PROJECTS, vars).await {
                Ok(data) => {
                    if data.get("team").map_or(true, Value::is_null) {
                        return error_envelope(format!("Team {} not found", team_id));
                    }
                    Ok(data
                        .pointer("/team/projects/nodes")
                        .cloned()
                        .unwrap_or_else(|| json!([])))
                }
                Err(msg) => Err(msg),
            }
        }
        None => graphql(ctx, queries::PROJECTS, None).await.map(|data| {
            data.pointer("/projects/nodes")
                .cloned()
                .unwrap_or_else(|| json!([]))
        }),
    };
    match result {
        Ok(projects) => {
            let count = count_of(&projects);
            json!({"success": true, "projects": projects, "count": count})
        }
        Err(msg) => error_envelope(msg),
    }
}

async fn list_project_updates_envelope(
    ctx: &RequestContext,
    input: ListProjectUpdatesInput,
) -> Value {
    let limit = input.limit.unwrap_or(10);
    let vars = variables(json!({"projectId": input.project_id, "limit": limit}));
    match graphql(ctx, queries::PROJECT_UPDATES, vars).await {
        Ok(data) => match data.get("project") {
            Some(project) if !project.is_null() => {
                let updates = project
                    .pointer("/projectUpdates/nodes")
                    .cloned()
                    .unwrap_or_else(|| json!([]));
                let count = count_of(&updates);
                json!({
                    "success": true,
                    "project": {
                        "id": project.get("id").cloned().unwrap_or(Value::Null),
                        "name": project.get("name").cloned().unwrap_or(Value::Null),
                    },
                    "updates": updates,
                    "count": count
                })
            }
            _ => error_envelope(format!("Project {} not found", input.project_id)),
        },
        Err(msg) => error_envelope(msg),
    }
}

async fn create_issue_envelope(ctx: &RequestContext, input: CreateIssueInput) -> Value {
    let vars = variables(json!({
        "teamId": input.team_id,
        "title": input.title,
        "description": input.description,
        "priority": input.priority,
        "stateId": input.state_id,
        "assigneeId": input.assignee_id,
        "projectId": input.project_id,
    }));
    match graphql(ctx, queries::CREATE_ISSUE, vars).await {
        Ok(data) => mutation_envelope(&data, "issueCreate", "issue", "Issue creation failed"),
        Err(msg) => error_envelope(msg),
    }
}

async fn update_issue_envelope(ctx: &RequestContext, input: UpdateIssueInput) -> Value {
    let vars = variables(json!({
        "id": input.issue_id,
        "title": input.title,
        "description": input.description,
        "priority": input.priority,
        "stateId": input.state_id,
        "assigneeId": input.assignee_id,
    }));
    match graphql(ctx, queries::UPDATE_ISSUE, vars).await {
        Ok(data) => mutation_envelope(&data, "issueUpdate", "issue", "Issue update failed"),
        Err(msg) => error_envelope(msg),
    }
}

async fn update_status_envelope(ctx: &RequestContext, input: UpdateStatusInput) -> Value {
    let vars = variables(json!({"id": input.issue_id, "stateId": input.state_id}));
    match graphql(ctx, queries::UPDATE_STATUS, vars).await {
        Ok(data) => mutation_envelope(&data, "issueUpdate", "issue", "Status update failed"),
        Err(msg) => error_envelope(msg),
    }
}

async fn create_project_envelope(ctx: &RequestContext, input: CreateProjectInput) -> Value {
    // Upstream takes an array of team ids.
    let vars = variables(json!({
        "name": input.name,
        "teamIds": [input.team_id],
        "description": input.description,
        "state": input.state,
    }));
    match graphql(ctx, queries::CREATE_PROJECT, vars).await {
        Ok(data) => {
            mutation_envelope(&data, "projectCreate", "project", "Project creation failed")
        }
        Err(msg) => error_envelope(msg),
    }
}

async fn create_project_update_envelope(
    ctx: &RequestContext,
    input: CreateProjectUpdateInput,
) -> Value {
    let vars = variables(json!({
        "projectId": input.project_id,
        "body": input.body,
        "health": input.health,
    }));
    match graphql(ctx, queries::CREATE_PROJECT_UPDATE, vars).await {
        Ok(data) => mutation_envelope(
            &data,
            "projectUpdateCreate",
            "projectUpdate",
            "Project update failed",
        ),
        Err(msg) => error_envelope(msg),
    }
}

async fn states_envelope(ctx: &RequestContext, input: StatesInput) -> Value {
    match input.team_id {
        Some(team_id) => {
            let vars = variables(json!({"teamId": team_id}));
            match graphql(ctx, queries::TEAM_STATES, vars).await {
                Ok(data) => match data.get("team") {
                    Some(team) if !team.is_null() => json!({
                        "success": true,
                        "team": {
                            "id": team.get("id").cloned().unwrap_or(Value::Null),
                            "name": team.get("name").cloned().unwrap_or(Value::Null),
                        },
                        "states": team
                            .pointer("/states/nodes")
                            .cloned()
                            .unwrap_or_else(|| json!([])),
                    }),
                    _ => error_envelope(format!("Team {} not found", team_id)),
                },
                Err(msg) => error_envelope(msg),
            }
        }
        None => match graphql(ctx, queries::ALL_TEAMS_STATES, None).await {
            Ok(data) => {
                let teams: Vec<Value> = data
                    .pointer("/teams/nodes")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|team| {
                        json!({
                            "id": team.get("id").cloned().unwrap_or(Value::Null),
                            "name": team.get("name").cloned().unwrap_or(Value::Null),
                            "states": team
                                .pointer("/states/nodes")
                                .cloned()
                                .unwrap_or_else(|| json!([])),
                        })
                    })
                    .collect();
                json!({"success": true, "teams": teams})
            }
            Err(msg) => error_envelope(msg),
        },
    }
}
