use assert_cmd::Command;
use httpmock::{Method::POST, MockServer};
use std::io::Write;

fn run_with_env(req: &serde_json::Value, envs: &[(&str, &str)]) -> anyhow::Result<String> {
    let mut cmd = Command::cargo_bin("linear-mcp")?;
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let input = serde_json::to_string(req)?;
    let assert = cmd
        .arg("--log-level")
        .arg("warn")
        .write_stdin({
            let mut b = Vec::new();
            writeln!(b, "{}", input).unwrap();
            b
        })
        .assert();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    Ok(output)
}

fn graphql_env(server: &MockServer) -> Vec<(String, String)> {
    vec![
        ("LINEAR_API_TOKEN".to_string(), "t".to_string()),
        (
            "LINEAR_API_URL".to_string(),
            format!("{}/graphql", server.base_url()),
        ),
    ]
}

fn call(
    server: &MockServer,
    name: &str,
    arguments: serde_json::Value,
) -> anyhow::Result<serde_json::Value> {
    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": name, "arguments": arguments}
    });
    let envs = graphql_env(server);
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let out = run_with_env(&req, &envs)?;
    Ok(serde_json::from_str(&out)?)
}

#[test]
fn my_issues_happy_path() -> anyhow::Result<()> {
    let server = MockServer::start();
    let body = serde_json::json!({
      "data": {
        "viewer": {
          "assignedIssues": {
            "nodes": [
              {
                "id": "uuid-1",
                "identifier": "ENG-1",
                "title": "Fix login",
                "description": null,
                "state": {"name": "In Progress"},
                "priority": 2,
                "project": {"name": "Auth"}
              }
            ]
          }
        }
      }
    });
    let _m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .header("authorization", "Bearer t")
            // No variables for this operation: the field must be absent.
            .body(
                serde_json::to_string(
                    &serde_json::json!({"query": linear_mcp::queries::MY_ISSUES}),
                )
                .unwrap(),
            );
        then.status(200).json_body(body);
    });

    let v = call(&server, "my_issues", serde_json::json!({}))?;
    let envelope = &v["result"]["structuredContent"];
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["count"], 1);
    // The node passes through unmodified.
    assert_eq!(envelope["issues"][0]["identifier"], "ENG-1");
    assert_eq!(envelope["issues"][0]["state"]["name"], "In Progress");
    assert!(v["result"].get("isError").is_none());
    Ok(())
}

#[test]
fn issue_happy_path() -> anyhow::Result<()> {
    let server = MockServer::start();
    let body = serde_json::json!({
      "data": {
        "issue": {
          "id": "uuid-9",
          "identifier": "ENG-9",
          "title": "Ship it",
          "state": {"id": "s1", "name": "Todo"},
          "priority": 3,
          "labels": {"nodes": [{"name": "bug"}]},
          "assignee": {"name": "Alice", "email": "a@example.com"},
          "team": {"id": "t1", "name": "Eng"},
          "comments": {"nodes": []}
        }
      }
    });
    let _m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .json_body_partial(r#"{"variables": {"identifier": "ENG-9"}}"#);
        then.status(200).json_body(body);
    });

    let v = call(&server, "issue", serde_json::json!({"identifier": "ENG-9"}))?;
    let envelope = &v["result"]["structuredContent"];
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["issue"]["identifier"], "ENG-9");
    assert_eq!(envelope["issue"]["labels"]["nodes"][0]["name"], "bug");
    Ok(())
}

#[test]
fn issue_not_found_is_domain_error() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .json_body(serde_json::json!({"data": {"issue": null}}));
    });

    let v = call(&server, "issue", serde_json::json!({"identifier": "ENG-999"}))?;
    let envelope = &v["result"]["structuredContent"];
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"], "Issue ENG-999 not found");
    assert_eq!(envelope["isError"], true);
    assert_eq!(v["result"]["isError"], true);
    Ok(())
}

#[test]
fn search_returns_query_and_count() -> anyhow::Result<()> {
    let server = MockServer::start();
    let body = serde_json::json!({
      "data": {
        "issues": {
          "nodes": [
            {"id": "1", "identifier": "ENG-1", "title": "login bug"},
            {"id": "2", "identifier": "ENG-2", "title": "login flow"}
          ]
        }
      }
    });
    let _m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .json_body_partial(r#"{"variables": {"query": "login"}}"#);
        then.status(200).json_body(body);
    });

    let v = call(&server, "search", serde_json::json!({"query": "login"}))?;
    let envelope = &v["result"]["structuredContent"];
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["query"], "login");
    assert_eq!(envelope["count"], 2);
    assert_eq!(envelope["issues"].as_array().unwrap().len(), 2);
    Ok(())
}
