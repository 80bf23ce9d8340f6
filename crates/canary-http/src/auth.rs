//! Credentials - リクエストへの認証情報の付与
//!
//! # 種類
//! - **Anonymous**: 何も付けない
//! - **Basic**: client id / secret で HTTP Basic
//! - **ClientCredentials**: OAuth2 client credentials で取った bearer token
//!
//! token は期限の少し前まで使い回します（毎リクエストで token endpoint を叩かない）。

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::RequestBuilder;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use canary_core::domain::GatewayError;

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Used when the token endpoint does not send `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// OAuth2 client-credentials token source with a cached token.
pub struct TokenSource {
    http: reqwest::Client,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(
        http: reqwest::Client,
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cached: RwLock::new(None),
        }
    }

    /// Current access token, fetching a new one when missing or near expiry.
    pub async fn access_token(&self) -> Result<String, GatewayError> {
        {
            let guard = self.cached.read().await;
            if let Some(token) = guard.as_ref()
                && token.is_fresh(Utc::now())
            {
                return Ok(token.access_token.clone());
            }
        }

        let mut guard = self.cached.write().await;
        // 他のタスクが先に更新しているかもしれない
        if let Some(token) = guard.as_ref()
            && token.is_fresh(Utc::now())
        {
            return Ok(token.access_token.clone());
        }

        let token = self.fetch().await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    async fn fetch(&self) -> Result<CachedToken, GatewayError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Auth(format!("cannot parse token response: {e}")))?;

        let expires_in = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        debug!(expires_in, "fetched registry access token");
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now() + ChronoDuration::seconds(expires_in as i64),
        })
    }
}

/// How requests to the registry are authenticated.
pub enum Credentials {
    Anonymous,
    Basic { username: String, password: String },
    ClientCredentials(TokenSource),
}

impl Credentials {
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::Anonymous => "anonymous",
            Credentials::Basic { .. } => "basic",
            Credentials::ClientCredentials(_) => "oauth2-client-credentials",
        }
    }

    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        match self {
            Credentials::Anonymous => Ok(request),
            Credentials::Basic { username, password } => {
                Ok(request.basic_auth(username, Some(password)))
            }
            Credentials::ClientCredentials(source) => {
                let token = source.access_token().await?;
                Ok(request.bearer_auth(token))
            }
        }
    }
}
