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

fn call(
    server: &MockServer,
    arguments: serde_json::Value,
) -> anyhow::Result<serde_json::Value> {
    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "states", "arguments": arguments}
    });
    let url = format!("{}/graphql", server.base_url());
    let out = run_with_env(
        &req,
        &[("LINEAR_API_TOKEN", "t"), ("LINEAR_API_URL", url.as_str())],
    )?;
    Ok(serde_json::from_str(&out)?)
}

#[test]
fn states_for_one_team() -> anyhow::Result<()> {
    let server = MockServer::start();
    let body = serde_json::json!({
      "data": {
        "team": {
          "id": "team-1",
          "name": "Engineering",
          "states": {
            "nodes": [
              {"id": "s1", "name": "Todo", "type": "unstarted"},
              {"id": "s2", "name": "Done", "type": "completed"}
            ]
          }
        }
      }
    });
    let _m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .json_body_partial(r#"{"variables": {"teamId": "team-1"}}"#);
        then.status(200).json_body(body);
    });

    let v = call(&server, serde_json::json!({"team_id": "team-1"}))?;
    let envelope = &v["result"]["structuredContent"];
    assert_eq!(envelope["success"], true);
    assert_eq!(
        envelope["team"],
        serde_json::json!({"id": "team-1", "name": "Engineering"})
    );
    assert_eq!(envelope["states"].as_array().unwrap().len(), 2);
    assert_eq!(envelope["states"][1]["type"], "completed");
    Ok(())
}

#[test]
fn states_for_all_teams() -> anyhow::Result<()> {
    let server = MockServer::start();
    let body = serde_json::json!({
      "data": {
        "teams": {
          "nodes": [
            {
              "id": "team-1",
              "name": "Engineering",
              "states": {"nodes": [{"id": "s1", "name": "Todo", "type": "unstarted"}]}
            },
            {
              "id": "team-2",
              "name": "Design",
              "states": {"nodes": []}
            }
          ]
        }
      }
    });
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200).json_body(body);
    });

    let v = call(&server, serde_json::json!({}))?;
    let envelope = &v["result"]["structuredContent"];
    assert_eq!(envelope["success"], true);
    let teams = envelope["teams"].as_array().unwrap();
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0]["states"][0]["name"], "Todo");
    assert_eq!(teams[1]["states"], serde_json::json!([]));
    Ok(())
}

#[test]
fn states_unknown_team() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .json_body(serde_json::json!({"data": {"team": null}}));
    });

    let v = call(&server, serde_json::json!({"team_id": "team-x"}))?;
    let envelope = &v["result"]["structuredContent"];
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"], "Team team-x not found");
    Ok(())
}
