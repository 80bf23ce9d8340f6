//! HttpGatewayFactory - 戦略ごとの HttpRegistryGateway を構築
//!
//! # 戦略と認証
//! - **OAuth**: `AUTH_TOKEN_ENDPOINT` があれば client credentials、なければ認証なし
//! - **Basic**: 常に client id / secret で HTTP Basic

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use canary_core::config::CanaryConfig;
use canary_core::domain::{AuthStrategy, GatewayError};
use canary_core::ports::{GatewayFactory, RegistryGateway};

use crate::auth::{Credentials, TokenSource};
use crate::gateway::HttpRegistryGateway;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpGatewayFactory {
    request_timeout: Duration,
}

impl HttpGatewayFactory {
    pub fn new() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    fn credentials_for(
        strategy: AuthStrategy,
        config: &CanaryConfig,
        http: &reqwest::Client,
    ) -> Credentials {
        let auth = &config.auth;
        let client_id = auth.client_id.clone().unwrap_or_default();
        let client_secret = auth.client_secret.clone().unwrap_or_default();
        if auth.client_id.is_none() || auth.client_secret.is_none() {
            // 起動は止めない。認証の失敗は counters に出る
            if strategy == AuthStrategy::Basic || auth.token_endpoint.is_some() {
                warn!(
                    strategy = %strategy,
                    "AUTH_CLIENT_ID / AUTH_CLIENT_SECRET not fully set, using empty values"
                );
            }
        }

        match strategy {
            AuthStrategy::OAuth => match &auth.token_endpoint {
                Some(endpoint) => Credentials::ClientCredentials(TokenSource::new(
                    http.clone(),
                    endpoint.clone(),
                    client_id,
                    client_secret,
                )),
                None => Credentials::Anonymous,
            },
            AuthStrategy::Basic => Credentials::Basic {
                username: client_id,
                password: client_secret,
            },
        }
    }
}

impl Default for HttpGatewayFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayFactory for HttpGatewayFactory {
    fn build(
        &self,
        strategy: AuthStrategy,
        config: &CanaryConfig,
    ) -> Result<Arc<dyn RegistryGateway>, GatewayError> {
        reqwest::Url::parse(&config.registry_url).map_err(|e| {
            GatewayError::Construction(format!("invalid registry url {}: {e}", config.registry_url))
        })?;

        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| GatewayError::Construction(format!("cannot build http client: {e}")))?;

        let credentials = Self::credentials_for(strategy, config, &http);
        info!(
            strategy = %strategy,
            auth = credentials.kind(),
            registry_url = %config.registry_url,
            "built registry gateway"
        );

        Ok(Arc::new(HttpRegistryGateway::new(
            http,
            config.registry_url.clone(),
            credentials,
        )))
    }
}
