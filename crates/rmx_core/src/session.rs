use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

/// Identity resolved from a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: i64,
}

/// Answers "who is this token". Issuing and expiring tokens is delegated to
/// whatever sits in front of this service.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn resolve(&self, token: &str) -> Option<SessionUser>;
}

/// Token table seeded from configuration.
#[derive(Debug, Default)]
pub struct StaticSessions {
    tokens: HashMap<String, i64>,
}

impl StaticSessions {
    pub fn new(tokens: HashMap<String, i64>) -> Self {
        Self { tokens }
    }

    /// Parse comma-separated `token:user_id` pairs, e.g. `abc:1,def:2`.
    /// Malformed pairs are skipped.
    pub fn from_env_spec(spec: &str) -> Self {
        let tokens = spec
            .split(',')
            .filter_map(|pair| {
                let (token, id) = pair.split_once(':')?;
                let id = id.trim().parse().ok()?;
                let token = token.trim();
                (!token.is_empty()).then(|| (token.to_string(), id))
            })
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl SessionStore for StaticSessions {
    async fn resolve(&self, token: &str) -> Option<SessionUser> {
        self.tokens.get(token).map(|&id| SessionUser { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_known_token() {
        let sessions = StaticSessions::from_env_spec("abc:1,def:2");
        assert_eq!(sessions.resolve("abc").await, Some(SessionUser { id: 1 }));
        assert_eq!(sessions.resolve("def").await, Some(SessionUser { id: 2 }));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let sessions = StaticSessions::from_env_spec("abc:1");
        assert_eq!(sessions.resolve("nope").await, None);
        assert_eq!(sessions.resolve("").await, None);
    }

    #[tokio::test]
    async fn test_malformed_pairs_are_skipped() {
        let sessions = StaticSessions::from_env_spec("abc:1,broken,:3,x:not-a-number");
        assert_eq!(sessions.resolve("abc").await, Some(SessionUser { id: 1 }));
        assert_eq!(sessions.resolve("broken").await, None);
        assert_eq!(sessions.resolve("x").await, None);
    }
}
