use crate::config::Config;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Failures of one GraphQL round trip against the Linear API.
/// Display strings are surfaced verbatim as the tool envelope's `error`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Upstream answered with a non-200 status.
    #[error("Linear API returned HTTP {}: {body}", .status.as_u16())]
    Http { status: StatusCode, body: String },
    /// Upstream answered 200 but reported structured GraphQL errors.
    #[error("GraphQL errors: {message}")]
    GraphQl { message: String, errors: Vec<Value> },
    /// The request never completed (connect failure, timeout).
    #[error("Linear API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Upstream answered 200 with a body that is not valid JSON.
    #[error("Invalid JSON from Linear API: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

pub fn build_client(cfg: &Config) -> reqwest::Result<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_str(&cfg.user_agent).unwrap());
    // Authorization header is injected per request; the credential is
    // invocation-scoped and must not live in the shared client.
    let builder = Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls();
    builder.build()
}

/// Remove null-valued entries from GraphQL variables. Linear rejects
/// explicit null for optional fields. Falsy-but-present values
/// (0, "", false, []) are preserved unchanged.
pub fn sanitize_variables(variables: Map<String, Value>) -> Map<String, Value> {
    variables.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

/// Join upstream GraphQL error objects into one message, falling back to
/// each error's JSON string form when `message` is absent.
pub fn join_error_messages(errors: &[Value]) -> String {
    errors
        .iter()
        .map(|e| match e.get("message").and_then(Value::as_str) {
            Some(m) => m.to_string(),
            None => e.to_string(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Execute one GraphQL operation against the Linear API.
///
/// Sends `{query, variables?}` with the bearer credential; the variables
/// field is omitted entirely when the sanitized map is empty. Returns the
/// `data` payload (empty object when absent). One round trip, no retries.
pub async fn execute(
    client: &Client,
    cfg: &Config,
    document: &str,
    variables: Option<Map<String, Value>>,
    credential: &str,
) -> Result<Value, ClientError> {
    let mut body = Map::new();
    body.insert("query".to_string(), Value::String(document.to_string()));
    if let Some(vars) = variables {
        let vars = sanitize_variables(vars);
        if !vars.is_empty() {
            body.insert("variables".to_string(), Value::Object(vars));
        }
    }

    debug!("POST {} ({} byte query)", cfg.api_url, document.len());
    let res = client
        .post(&cfg.api_url)
        .bearer_auth(credential)
        .header(ACCEPT, HeaderValue::from_static("application/json"))
        .json(&Value::Object(body))
        .send()
        .await?;

    let status = res.status();
    let text = res.text().await?;
    if status != StatusCode::OK {
        return Err(ClientError::Http { status, body: text });
    }

    let parsed: Value = serde_json::from_str(&text).map_err(ClientError::InvalidJson)?;
    if let Some(errors) = parsed.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            return Err(ClientError::GraphQl {
                message: join_error_messages(errors),
                errors: errors.clone(),
            });
        }
    }
    Ok(parsed
        .get("data")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new())))
}
