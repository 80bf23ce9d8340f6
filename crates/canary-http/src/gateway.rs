//! HttpRegistryGateway - registry REST API v2 への RegistryGateway 実装
//!
//! `base_url` は API のルート（例: `http://registry:8080/apis/registry/v2`）です。
//! artifact はすべて group `default` の下に作ります。
//!
//! | 操作 | リクエスト |
//! |---|---|
//! | create | `POST {base}/groups/default/artifacts?ifExists=RETURN` |
//! | read_metadata | `GET {base}/groups/default/artifacts/{id}/meta` |
//! | read_content | `GET {base}/groups/default/artifacts/{id}` |
//! | delete | `DELETE {base}/groups/default/artifacts/{id}` |

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};

use canary_core::domain::{
    ArtifactId, ArtifactMetadata, DEFAULT_GROUP, GatewayError, IfExists, RegistryOperation,
    SchemaPayload,
};
use canary_core::ports::RegistryGateway;

use crate::auth::Credentials;

pub const ARTIFACT_ID_HEADER: &str = "X-Registry-ArtifactId";
pub const ARTIFACT_TYPE_HEADER: &str = "X-Registry-ArtifactType";

pub struct HttpRegistryGateway {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpRegistryGateway {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, credentials: Credentials) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            credentials,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn artifacts_url(&self) -> String {
        format!("{}/groups/{}/artifacts", self.base_url, DEFAULT_GROUP)
    }

    fn artifact_url(&self, id: &ArtifactId) -> String {
        format!("{}/{}", self.artifacts_url(), id)
    }

    /// Authorize, send, and turn non-2xx into `GatewayError`.
    async fn execute(
        &self,
        operation: RegistryOperation,
        request: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        let request = self.credentials.authorize(request).await?;
        let response = request.send().await.map_err(|e| GatewayError::Transport {
            operation,
            message: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound { operation });
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    async fn metadata_from(
        operation: RegistryOperation,
        response: Response,
    ) -> Result<ArtifactMetadata, GatewayError> {
        let body = response.text().await.map_err(|e| GatewayError::Transport {
            operation,
            message: e.to_string(),
        })?;
        // 空 body は「空の metadata」として返し、判定は呼び出し側に任せる
        if body.trim().is_empty() {
            return Ok(ArtifactMetadata::empty());
        }
        serde_json::from_str(&body)
            .map(ArtifactMetadata::new)
            .map_err(|e| GatewayError::Decode {
                operation,
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl RegistryGateway for HttpRegistryGateway {
    async fn create(
        &self,
        id: &ArtifactId,
        payload: &SchemaPayload,
    ) -> Result<ArtifactMetadata, GatewayError> {
        let operation = RegistryOperation::Create;
        let request = self
            .http
            .post(self.artifacts_url())
            .query(&[("ifExists", IfExists::Return.as_str())])
            .header(ARTIFACT_ID_HEADER, id.to_string())
            .header(ARTIFACT_TYPE_HEADER, payload.artifact_type().as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.content());
        let response = self.execute(operation, request).await?;
        Self::metadata_from(operation, response).await
    }

    async fn read_metadata(&self, id: &ArtifactId) -> Result<ArtifactMetadata, GatewayError> {
        let operation = RegistryOperation::ReadMetadata;
        let request = self.http.get(format!("{}/meta", self.artifact_url(id)));
        let response = self.execute(operation, request).await?;
        Self::metadata_from(operation, response).await
    }

    async fn read_content(&self, id: &ArtifactId) -> Result<Vec<u8>, GatewayError> {
        let operation = RegistryOperation::ReadContent;
        let request = self.http.get(self.artifact_url(id));
        let response = self.execute(operation, request).await?;
        let bytes = response.bytes().await.map_err(|e| GatewayError::Transport {
            operation,
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, id: &ArtifactId) -> Result<(), GatewayError> {
        let request = self.http.delete(self.artifact_url(id));
        self.execute(RegistryOperation::Delete, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenSource;
    use crate::testing::FakeRegistry;
    use canary_core::app::{CounterSnapshot, FailureCounters, ProbeCycle};
    use std::sync::Arc;
    use std::time::Duration;

    fn cycle(counters: &Arc<FailureCounters>) -> ProbeCycle {
        ProbeCycle::new(Arc::clone(counters)).with_settle_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn full_cycle_with_basic_auth() {
        let registry = FakeRegistry::start()
            .await
            .requiring_auth("Basic Y2FuYXJ5OnNlY3JldA==");
        let gateway = HttpRegistryGateway::new(
            reqwest::Client::new(),
            registry.api_url(),
            Credentials::Basic {
                username: "canary".to_string(),
                password: "secret".to_string(),
            },
        );
        let counters = Arc::new(FailureCounters::new());

        let report = cycle(&counters).run_once(&gateway).await;

        assert!(report.is_clean(), "{report:?}");
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
        let created = registry.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id, report.artifact_id.to_string());
        assert_eq!(created[0].artifact_type, "JSON");
        assert_eq!(created[0].if_exists.as_deref(), Some("RETURN"));
        assert_eq!(created[0].body, SchemaPayload::canary().content());
        assert_eq!(registry.stored_len(), 0);
    }

    #[tokio::test]
    async fn oauth_token_is_fetched_once_and_reused() {
        let registry = FakeRegistry::start().await.requiring_auth("Bearer token-1");
        let http = reqwest::Client::new();
        let gateway = HttpRegistryGateway::new(
            http.clone(),
            registry.api_url(),
            Credentials::ClientCredentials(TokenSource::new(
                http,
                registry.token_url(),
                "canary",
                "secret",
            )),
        );
        let counters = Arc::new(FailureCounters::new());
        let cycle = cycle(&counters);

        for _ in 0..3 {
            cycle.run_once(&gateway).await;
        }

        assert_eq!(counters.snapshot(), CounterSnapshot::default());
        assert_eq!(registry.token_requests(), 1);
        assert_eq!(
            registry.last_token_form().as_deref(),
            Some("grant_type=client_credentials&client_id=canary&client_secret=secret")
        );
    }

    #[tokio::test]
    async fn rejected_credentials_count_in_every_stage() {
        let registry = FakeRegistry::start().await.requiring_auth("Basic bm9wZQ==");
        let gateway = HttpRegistryGateway::new(
            reqwest::Client::new(),
            registry.api_url(),
            Credentials::Anonymous,
        );
        let counters = Arc::new(FailureCounters::new());

        let report = cycle(&counters).run_once(&gateway).await;

        assert!(matches!(
            report.create.error(),
            Some(GatewayError::Status { status: 401, .. })
        ));
        assert_eq!(
            counters.snapshot(),
            CounterSnapshot {
                creates: 1,
                reads: 1,
                deletes: 1
            }
        );
    }

    #[tokio::test]
    async fn token_endpoint_failure_is_an_auth_error() {
        let registry = FakeRegistry::start().await.failing_token_endpoint();
        let http = reqwest::Client::new();
        let gateway = HttpRegistryGateway::new(
            http.clone(),
            registry.api_url(),
            Credentials::ClientCredentials(TokenSource::new(
                http,
                registry.token_url(),
                "canary",
                "wrong",
            )),
        );

        let err = gateway.read_metadata(&ArtifactId::random()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Auth(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn missing_artifact_maps_to_not_found() {
        let registry = FakeRegistry::start().await;
        let gateway = HttpRegistryGateway::new(
            reqwest::Client::new(),
            format!("{}/", registry.api_url()),
            Credentials::Anonymous,
        );
        let id = ArtifactId::random();

        assert!(matches!(
            gateway.read_metadata(&id).await,
            Err(GatewayError::NotFound {
                operation: RegistryOperation::ReadMetadata
            })
        ));
        assert!(matches!(
            gateway.read_content(&id).await,
            Err(GatewayError::NotFound {
                operation: RegistryOperation::ReadContent
            })
        ));
        assert!(matches!(
            gateway.delete(&id).await,
            Err(GatewayError::NotFound {
                operation: RegistryOperation::Delete
            })
        ));
    }

    #[tokio::test]
    async fn create_twice_returns_existing_metadata() {
        let registry = FakeRegistry::start().await;
        let gateway = HttpRegistryGateway::new(
            reqwest::Client::new(),
            registry.api_url(),
            Credentials::Anonymous,
        );
        let id = ArtifactId::random();
        let payload = SchemaPayload::canary();

        let first = gateway.create(&id, &payload).await.unwrap();
        let second = gateway.create(&id, &payload).await.unwrap();

        assert!(first.is_present());
        assert_eq!(first, second);
        assert_eq!(registry.stored_len(), 1);
    }

    #[tokio::test]
    async fn unreachable_registry_is_a_transport_error() {
        let gateway = HttpRegistryGateway::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/apis/registry/v2",
            Credentials::Anonymous,
        );

        let err = gateway.delete(&ArtifactId::random()).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Transport {
                operation: RegistryOperation::Delete,
                ..
            }
        ));
    }
}
