use std::env;

/// How the Linear credential for an invocation is obtained.
/// Exactly one mode is active per process; modes are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Credential resolved once at startup from the environment
    /// (gateway-trusted deployments: the gateway already exchanged tokens).
    Token,
    /// Credential extracted per call from the inbound request's
    /// Authorization header.
    Header,
    /// Credential obtained per call from a broker-issued access context.
    Broker,
}

impl AuthMode {
    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "token" => Ok(AuthMode::Token),
            "header" => Ok(AuthMode::Header),
            "broker" => Ok(AuthMode::Broker),
            other => Err(format!(
                "Invalid LINEAR_MCP_AUTH_MODE '{}' (expected token, header or broker)",
                other
            )),
        }
    }
}

/// Settings for the brokered-exchange auth mode. Built once from the
/// environment and shared read-only by all invocations.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub zone_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub server_url: String,
}

/// Runtime configuration for the Linear GraphQL client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub auth_mode: AuthMode,
    pub token: Option<String>,
    pub broker: Option<BrokerConfig>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - LINEAR_MCP_AUTH_MODE (token | header | broker; default: token)
    /// - LINEAR_API_TOKEN (or LINEAR_TOKEN) [required in token mode]
    /// - LINEAR_MCP_ZONE_ID, LINEAR_MCP_CLIENT_ID, LINEAR_MCP_CLIENT_SECRET
    ///   [required in broker mode]
    /// - MCP_SERVER_URL (default: http://localhost:8000/)
    /// - LINEAR_API_URL (default: https://api.linear.app/graphql)
    /// - LINEAR_HTTP_TIMEOUT_SECS (default: 30)
    /// - LINEAR_USER_AGENT (default: linear-mcp/<version>)
    pub fn from_env() -> Result<Self, String> {
        let auth_mode = match env::var("LINEAR_MCP_AUTH_MODE") {
            Ok(s) => AuthMode::parse(&s)?,
            Err(_) => AuthMode::Token,
        };

        let token = match auth_mode {
            AuthMode::Token => Some(
                env::var("LINEAR_API_TOKEN")
                    .or_else(|_| env::var("LINEAR_TOKEN"))
                    .map_err(|_| "Missing LINEAR_API_TOKEN or LINEAR_TOKEN".to_string())?,
            ),
            _ => None,
        };

        let broker = match auth_mode {
            AuthMode::Broker => Some(BrokerConfig {
                zone_id: env::var("LINEAR_MCP_ZONE_ID")
                    .map_err(|_| "Missing LINEAR_MCP_ZONE_ID".to_string())?,
                client_id: env::var("LINEAR_MCP_CLIENT_ID")
                    .map_err(|_| "Missing LINEAR_MCP_CLIENT_ID".to_string())?,
                client_secret: env::var("LINEAR_MCP_CLIENT_SECRET")
                    .map_err(|_| "Missing LINEAR_MCP_CLIENT_SECRET".to_string())?,
                server_url: env::var("MCP_SERVER_URL")
                    .unwrap_or_else(|_| "http://localhost:8000/".to_string()),
            }),
            _ => None,
        };

        let api_url = env::var("LINEAR_API_URL")
            .unwrap_or_else(|_| "https://api.linear.app/graphql".to_string());
        let timeout_secs = env::var("LINEAR_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        let default_ua = format!(
            "linear-mcp/{} (+https://github.com/HautechAI/linear-mcp)",
            env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".into())
        );
        let user_agent = env::var("LINEAR_USER_AGENT").unwrap_or(default_ua);

        Ok(Self {
            api_url,
            auth_mode,
            token,
            broker,
            user_agent,
            timeout_secs,
        })
    }
}
