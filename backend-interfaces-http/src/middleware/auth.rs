use axum::http::HeaderMap;

use backend_domain::RuntimeConfig;

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub username: String,
    pub role: String,
}

/// Resolves a presented bearer token against the configured token table.
pub fn authenticate(config: &RuntimeConfig, headers: &HeaderMap) -> Option<AuthContext> {
    let token = extract_bearer(headers)?;
    lookup_token(config, &token)
}

pub fn lookup_token(config: &RuntimeConfig, token: &str) -> Option<AuthContext> {
    config
        .api_tokens
        .iter()
        .find(|entry| entry.token == token)
        .map(|entry| AuthContext {
            user_id: entry.user_id.clone(),
            username: entry.username.clone(),
            role: entry.role.clone(),
        })
}

/// Read access: open when no tokens are configured, otherwise any valid
/// token.
pub fn authorize_read(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if config.api_tokens.is_empty() {
        return true;
    }
    authenticate(config, headers).is_some()
}

/// Mutation access: open when no tokens are configured, otherwise a valid
/// token carrying a privileged role.
pub fn authorize_privileged(
    config: &RuntimeConfig,
    headers: &HeaderMap,
) -> Result<Option<AuthContext>, ()> {
    if config.api_tokens.is_empty() {
        return Ok(None);
    }
    match authenticate(config, headers) {
        Some(ctx) if config.is_privileged_role(&ctx.role) => Ok(Some(ctx)),
        _ => Err(()),
    }
}

/// Privileged-scope membership for an already-resolved observer.
pub fn is_privileged(config: &RuntimeConfig, ctx: Option<&AuthContext>) -> bool {
    if config.api_tokens.is_empty() {
        return true;
    }
    ctx.map(|c| config.is_privileged_role(&c.role)).unwrap_or(false)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use backend_domain::ApiTokenEntry;

    fn config_with_tokens() -> RuntimeConfig {
        RuntimeConfig {
            api_tokens: vec![
                ApiTokenEntry {
                    token: "analyst-token".to_string(),
                    user_id: "u-1".to_string(),
                    username: "ana".to_string(),
                    role: "analyst".to_string(),
                },
                ApiTokenEntry {
                    token: "viewer-token".to_string(),
                    user_id: "u-2".to_string(),
                    username: "vic".to_string(),
                    role: "viewer".to_string(),
                },
            ],
            ..RuntimeConfig::default()
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn unconfigured_instance_is_open() {
        let config = RuntimeConfig::default();
        assert!(authorize_read(&config, &HeaderMap::new()));
        assert!(authorize_privileged(&config, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn viewer_token_reads_but_cannot_mutate() {
        let config = config_with_tokens();
        assert!(authorize_read(&config, &bearer("viewer-token")));
        assert!(authorize_privileged(&config, &bearer("viewer-token")).is_err());
    }

    #[test]
    fn analyst_token_is_privileged() {
        let config = config_with_tokens();
        let ctx = authorize_privileged(&config, &bearer("analyst-token"))
            .expect("privileged")
            .expect("context");
        assert_eq!(ctx.user_id, "u-1");
        assert_eq!(ctx.role, "analyst");
    }

    #[test]
    fn missing_or_unknown_token_is_rejected_when_configured() {
        let config = config_with_tokens();
        assert!(!authorize_read(&config, &HeaderMap::new()));
        assert!(!authorize_read(&config, &bearer("wrong")));
        assert!(!is_privileged(&config, None));
    }
}
