use crate::session::SessionContext;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Environment variable that overrides the token from the config file.
pub const TOKEN_ENV: &str = "REELBOARD_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl SyncConfig {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("Invalid config: {}", path.as_ref().display()))?;
        Ok(config.with_token_override(std::env::var(TOKEN_ENV).ok()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: SyncConfig = serde_json::from_str(content)?;

        if config.base_url.trim().is_empty() {
            anyhow::bail!("base_url missing");
        }

        Ok(config)
    }

    /// Prefer `token` over the configured one when it is non-empty.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn session(&self) -> SessionContext {
        SessionContext::new(self.user_id.clone(), self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config = SyncConfig::from_json(r#"{"base_url":"http://localhost:8080/api"}"#).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.token, None);
        assert_eq!(config.user_id, None);
    }

    #[test]
    fn empty_base_url_rejected() {
        let err = SyncConfig::from_json(r#"{"base_url":"  "}"#).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn token_override() {
        let config = SyncConfig::from_json(r#"{"base_url":"http://x","token":"file"}"#).unwrap();
        let same = config.clone().with_token_override(Some(String::new()));
        assert_eq!(same.token.as_deref(), Some("file"));
        let env = config.with_token_override(Some("env".into()));
        assert_eq!(env.token.as_deref(), Some("env"));
    }

    #[test]
    fn session_carries_identity() {
        let config =
            SyncConfig::from_json(r#"{"base_url":"http://x","token":"t","user_id":"42"}"#).unwrap();
        let session = config.session();
        assert_eq!(session.user_id(), Some("42"));
        assert_eq!(session.token().as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        std::fs::write(&path, r#"{"base_url":"http://x","request_timeout_ms":250}"#).unwrap();
        let config = SyncConfig::load(&path).await.unwrap();
        assert_eq!(config.base_url, "http://x");
        assert_eq!(config.request_timeout_ms, 250);
    }

    #[tokio::test]
    async fn load_missing_file_has_context() {
        let err = SyncConfig::load("/tmp/no_such_reelboard_config.json")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
