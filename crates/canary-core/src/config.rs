//! Config - 環境変数からの設定読み込み
//!
//! # 認識する変数
//! - `REGISTRY_URL` (必須)
//! - `AUTH_TOKEN_ENDPOINT` / `AUTH_CLIENT_ID` / `AUTH_CLIENT_SECRET`
//! - `CONCURRENT_TASKS` (戦略ごとのワーカー数、既定 2)
//!
//! `from_lookup` にクロージャを渡せば、プロセスの環境変数に触らずにテストできます。

use thiserror::Error;
use tracing::warn;

pub const REGISTRY_URL: &str = "REGISTRY_URL";
pub const AUTH_TOKEN_ENDPOINT: &str = "AUTH_TOKEN_ENDPOINT";
pub const AUTH_CLIENT_ID: &str = "AUTH_CLIENT_ID";
pub const AUTH_CLIENT_SECRET: &str = "AUTH_CLIENT_SECRET";
pub const CONCURRENT_TASKS: &str = "CONCURRENT_TASKS";

/// Workers per strategy when `CONCURRENT_TASKS` is missing or invalid.
pub const DEFAULT_CONCURRENT_TASKS: usize = 2;

/// Largest accepted `CONCURRENT_TASKS`; anything above falls back to the default.
pub const MAX_CONCURRENT_TASKS: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
}

/// Credentials shared by both strategies.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthSettings {
    /// Selects OAuth2 client credentials for the OAuth strategy when present.
    pub token_endpoint: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

// secret をログに出さない
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanaryConfig {
    pub registry_url: String,
    pub auth: AuthSettings,
    /// Workers launched per authentication strategy.
    pub concurrent_tasks: usize,
}

impl CanaryConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let registry_url = non_empty(lookup(REGISTRY_URL)).ok_or(ConfigError::Missing(REGISTRY_URL))?;

        let auth = AuthSettings {
            token_endpoint: non_empty(lookup(AUTH_TOKEN_ENDPOINT)),
            client_id: non_empty(lookup(AUTH_CLIENT_ID)),
            client_secret: non_empty(lookup(AUTH_CLIENT_SECRET)),
        };

        let concurrent_tasks = parse_concurrent_tasks(lookup(CONCURRENT_TASKS).as_deref());

        Ok(Self {
            registry_url,
            auth,
            concurrent_tasks,
        })
    }
}

/// Parse `CONCURRENT_TASKS`, falling back to the default with a warning.
///
/// Zero and values above `MAX_CONCURRENT_TASKS` are rejected too.
pub fn parse_concurrent_tasks(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        warn!(
            default = DEFAULT_CONCURRENT_TASKS,
            "{CONCURRENT_TASKS} is not set, using default"
        );
        return DEFAULT_CONCURRENT_TASKS;
    };

    match raw.trim().parse::<usize>() {
        Ok(0) => {
            warn!(
                value = raw,
                default = DEFAULT_CONCURRENT_TASKS,
                "{CONCURRENT_TASKS} must be at least 1, using default"
            );
            DEFAULT_CONCURRENT_TASKS
        }
        Ok(n) if n > MAX_CONCURRENT_TASKS => {
            warn!(
                value = raw,
                max = MAX_CONCURRENT_TASKS,
                default = DEFAULT_CONCURRENT_TASKS,
                "{CONCURRENT_TASKS} is too large, using default"
            );
            DEFAULT_CONCURRENT_TASKS
        }
        Ok(n) => n,
        Err(e) => {
            warn!(
                value = raw,
                error = %e,
                default = DEFAULT_CONCURRENT_TASKS,
                "cannot load {CONCURRENT_TASKS}, using default"
            );
            DEFAULT_CONCURRENT_TASKS
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
