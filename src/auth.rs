use crate::config::{AuthMode, Config};
use std::collections::BTreeMap;
use thiserror::Error;

/// Base URL identifying Linear as an upstream resource inside a broker
/// access context. Distinct from the GraphQL endpoint in `Config`.
pub const LINEAR_RESOURCE_URL: &str = "https://api.linear.app";

/// Failure modes of credential resolution. Display strings are surfaced
/// verbatim as the tool envelope's `error` field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Missing Authorization header")]
    MissingCredential,
    #[error("Invalid Authorization header format - expected 'Bearer <token>'")]
    MalformedCredential,
    #[error("No active HTTP request - cannot extract token")]
    NoActiveRequest,
    #[error("No authentication context - broker auth may not be configured")]
    NoAuthContext,
    #[error("Authentication errors: {}", .0.join("; "))]
    AuthorizationFailed(Vec<String>),
}

/// Broker-issued authorization result for one invocation: either
/// credentials keyed by upstream resource URL, or the broker's errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessContext {
    tokens: BTreeMap<String, String>,
    errors: Vec<String>,
}

impl AccessContext {
    /// Context carrying a resolved credential for one upstream resource.
    pub fn resolved(resource_url: &str, token: &str) -> Self {
        let mut tokens = BTreeMap::new();
        tokens.insert(resource_url.to_string(), token.to_string());
        Self {
            tokens,
            errors: Vec::new(),
        }
    }

    /// Context carrying the broker's authorization errors.
    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            tokens: BTreeMap::new(),
            errors,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn access(&self, resource_url: &str) -> Option<&str> {
        self.tokens.get(resource_url).map(String::as_str)
    }
}

/// Per-invocation ambient state handed to handlers by the transport.
/// The stdio transport is detached (no inbound HTTP request, no broker
/// context); an HTTP gateway fronting the server populates these.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: Option<BTreeMap<String, String>>,
    access: Option<AccessContext>,
}

impl RequestContext {
    /// Context for an invocation with no active inbound HTTP request.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Context carrying the inbound request's headers (lowercase names).
    pub fn with_headers(headers: BTreeMap<String, String>) -> Self {
        Self {
            headers: Some(headers),
            access: None,
        }
    }

    /// Context carrying a broker-issued access context.
    pub fn with_access(access: AccessContext) -> Self {
        Self {
            headers: None,
            access: Some(access),
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(name))
            .map(String::as_str)
    }
}

/// Parse an Authorization header value into a bearer token.
/// Accepts the two-token form `<scheme> <value>` with a case-insensitive
/// `bearer` scheme; the token is returned verbatim.
pub fn parse_bearer_header(raw: &str) -> Result<String, CredentialError> {
    if raw.is_empty() {
        return Err(CredentialError::MissingCredential);
    }
    let mut parts = raw.splitn(2, ' ');
    let scheme = parts.next().unwrap_or("");
    let token = parts.next().ok_or(CredentialError::MalformedCredential)?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(CredentialError::MalformedCredential);
    }
    Ok(token.to_string())
}

/// Credential resolution strategy. Exactly one is constructed per process
/// from `Config`; handlers are parameterized over it instead of being
/// duplicated per deployment flavor.
#[derive(Debug, Clone)]
pub enum CredentialResolver {
    /// Extract the bearer token from the inbound request's
    /// Authorization header.
    Header,
    /// Credential already resolved at startup (pass-through).
    Static(String),
    /// Extract the credential for `resource_url` from the invocation's
    /// broker access context.
    Broker { resource_url: String },
}

impl CredentialResolver {
    pub fn from_config(cfg: &Config) -> Self {
        match cfg.auth_mode {
            AuthMode::Header => CredentialResolver::Header,
            // Token mode guarantees the credential at config load.
            AuthMode::Token => {
                CredentialResolver::Static(cfg.token.clone().unwrap_or_default())
            }
            AuthMode::Broker => CredentialResolver::Broker {
                resource_url: LINEAR_RESOURCE_URL.to_string(),
            },
        }
    }

    /// Produce a bearer credential for this invocation, or fail.
    pub fn resolve(&self, ctx: &RequestContext) -> Result<String, CredentialError> {
        match self {
            CredentialResolver::Header => {
                if ctx.headers.is_none() {
                    return Err(CredentialError::NoActiveRequest);
                }
                parse_bearer_header(ctx.header("authorization").unwrap_or(""))
            }
            CredentialResolver::Static(token) => Ok(token.clone()),
            CredentialResolver::Broker { resource_url } => {
                let access = ctx.access.as_ref().ok_or(CredentialError::NoAuthContext)?;
                if access.has_errors() {
                    return Err(CredentialError::AuthorizationFailed(
                        access.errors().to_vec(),
                    ));
                }
                access
                    .access(resource_url)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        CredentialError::AuthorizationFailed(vec![format!(
                            "no credential granted for {}",
                            resource_url
                        )])
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_ctx(value: &str) -> RequestContext {
        let mut headers = BTreeMap::new();
        headers.insert("authorization".to_string(), value.to_string());
        RequestContext::with_headers(headers)
    }

    #[test]
    fn bearer_header_matrix() {
        assert_eq!(parse_bearer_header("Bearer abc123").unwrap(), "abc123");
        assert_eq!(parse_bearer_header("bearer abc123").unwrap(), "abc123");
        assert_eq!(
            parse_bearer_header(""),
            Err(CredentialError::MissingCredential)
        );
        assert_eq!(
            parse_bearer_header("Basic abc123"),
            Err(CredentialError::MalformedCredential)
        );
        assert_eq!(
            parse_bearer_header("Bearer"),
            Err(CredentialError::MalformedCredential)
        );
    }

    #[test]
    fn header_strategy_requires_active_request() {
        let resolver = CredentialResolver::Header;
        assert_eq!(
            resolver.resolve(&RequestContext::detached()),
            Err(CredentialError::NoActiveRequest)
        );
        assert_eq!(
            resolver.resolve(&header_ctx("Bearer t0k")).unwrap(),
            "t0k"
        );
        // Headers present but no Authorization entry
        let ctx = RequestContext::with_headers(BTreeMap::new());
        assert_eq!(
            resolver.resolve(&ctx),
            Err(CredentialError::MissingCredential)
        );
    }

    #[test]
    fn static_strategy_passes_through() {
        let resolver = CredentialResolver::Static("lin_api_xyz".into());
        assert_eq!(
            resolver.resolve(&RequestContext::detached()).unwrap(),
            "lin_api_xyz"
        );
    }

    #[test]
    fn broker_strategy_matrix() {
        let resolver = CredentialResolver::Broker {
            resource_url: LINEAR_RESOURCE_URL.to_string(),
        };
        assert_eq!(
            resolver.resolve(&RequestContext::detached()),
            Err(CredentialError::NoAuthContext)
        );

        let errored = RequestContext::with_access(AccessContext::failed(vec![
            "grant denied".to_string(),
        ]));
        assert_eq!(
            resolver.resolve(&errored),
            Err(CredentialError::AuthorizationFailed(vec![
                "grant denied".to_string()
            ]))
        );

        let ok = RequestContext::with_access(AccessContext::resolved(
            LINEAR_RESOURCE_URL,
            "exchanged",
        ));
        assert_eq!(resolver.resolve(&ok).unwrap(), "exchanged");

        let wrong_resource = RequestContext::with_access(AccessContext::resolved(
            "https://api.example.com",
            "other",
        ));
        assert!(matches!(
            resolver.resolve(&wrong_resource),
            Err(CredentialError::AuthorizationFailed(_))
        ));
    }

    #[test]
    fn error_messages_are_stable() {
        assert_eq!(
            CredentialError::MissingCredential.to_string(),
            "Missing Authorization header"
        );
        assert_eq!(
            CredentialError::AuthorizationFailed(vec!["a".into(), "b".into()]).to_string(),
            "Authentication errors: a; b"
        );
    }
}
