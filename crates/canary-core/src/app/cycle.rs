//! ProbeCycle - create → 待機 → read → delete を 1 回実行
//!
//! # フロー
//! 1. IdGenerator で新しい ArtifactId を生成
//! 2. create（失敗しても次へ進む）
//! 3. settle_delay だけ待つ
//! 4. read_metadata → read_content（どちらかが失敗すれば read 失敗 1 回）
//! 5. delete
//!
//! create が失敗しても read / delete は必ず試します。
//! 存在しない artifact の read が正しく 404 になるか、delete が素直に失敗するかも
//! 監視対象のシグナルだからです。
//!
//! 各ステージは `Result` を返し、失敗は counters + ログに変換されて
//! `CycleReport` にまとめられます。`run_once` が `Err` を返すことはありません。
//! gateway 呼び出しの panic も `GatewayError::Panicked` としてそのステージに数え、
//! 次のステージへ進みます（ワーカーは止まらない）。

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, error};

use super::counters::FailureCounters;
use super::timings::DEFAULT_SETTLE_DELAY;
use crate::domain::{
    ArtifactId, CycleReport, GatewayError, RegistryOperation, SchemaPayload, Stage, StageOutcome,
};
use crate::ports::{Clock, IdGenerator, RegistryGateway, SystemClock, UuidGenerator};

pub const ARTIFACTS_CREATED: &str = "artifactsCreated";
pub const ARTIFACT_METADATA_FETCHED: &str = "artifactMetadataFetched";
pub const ARTIFACTS_CONTENT_DOWNLOADED: &str = "artifactsContentDownloaded";
pub const ARTIFACTS_DELETED: &str = "artifactsDeleted";
pub const OPERATION_SECONDS: &str = "registry_operation_seconds";

/// Runs one probe cycle against whatever gateway it is handed.
///
/// Cheap to share: every field is either `Copy` or an `Arc`.
#[derive(Clone)]
pub struct ProbeCycle {
    counters: Arc<FailureCounters>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    payload: SchemaPayload,
    settle_delay: Duration,
}

impl ProbeCycle {
    pub fn new(counters: Arc<FailureCounters>) -> Self {
        Self {
            counters,
            ids: Arc::new(UuidGenerator::new()),
            clock: Arc::new(SystemClock),
            payload: SchemaPayload::canary(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn counters(&self) -> &Arc<FailureCounters> {
        &self.counters
    }

    /// Execute create → settle → read → delete for a fresh artifact id.
    pub async fn run_once(&self, gateway: &dyn RegistryGateway) -> CycleReport {
        let artifact_id = self.ids.generate_artifact_id();
        let started_at = self.clock.now();

        let create = self.create_stage(gateway, &artifact_id).await;
        let create = self.settle(Stage::Create, &artifact_id, create);

        tokio::time::sleep(self.settle_delay).await;

        let read = self.read_stage(gateway, &artifact_id).await;
        let read = self.settle(Stage::Read, &artifact_id, read);

        let delete = self.delete_stage(gateway, &artifact_id).await;
        let delete = self.settle(Stage::Delete, &artifact_id, delete);

        let report = CycleReport {
            artifact_id,
            started_at,
            create,
            read,
            delete,
        };
        if report.is_clean() {
            debug!(artifact_id = %report.artifact_id, "canary cycle completed");
        }
        report
    }

    async fn create_stage(
        &self,
        gateway: &dyn RegistryGateway,
        id: &ArtifactId,
    ) -> Result<(), GatewayError> {
        let metadata = timed(RegistryOperation::Create, gateway.create(id, &self.payload)).await?;
        if !metadata.is_present() {
            return Err(GatewayError::EmptyResult {
                operation: RegistryOperation::Create,
            });
        }
        metrics::counter!(ARTIFACTS_CREATED).increment(1);
        Ok(())
    }

    // metadata が取れなければ content は試さない（read ステージとしては既に失敗）
    async fn read_stage(
        &self,
        gateway: &dyn RegistryGateway,
        id: &ArtifactId,
    ) -> Result<(), GatewayError> {
        let metadata = timed(RegistryOperation::ReadMetadata, gateway.read_metadata(id)).await?;
        if !metadata.is_present() {
            return Err(GatewayError::EmptyResult {
                operation: RegistryOperation::ReadMetadata,
            });
        }
        metrics::counter!(ARTIFACT_METADATA_FETCHED).increment(1);

        let content = timed(RegistryOperation::ReadContent, gateway.read_content(id)).await?;
        if content.is_empty() {
            return Err(GatewayError::EmptyResult {
                operation: RegistryOperation::ReadContent,
            });
        }
        metrics::counter!(ARTIFACTS_CONTENT_DOWNLOADED).increment(1);
        Ok(())
    }

    async fn delete_stage(
        &self,
        gateway: &dyn RegistryGateway,
        id: &ArtifactId,
    ) -> Result<(), GatewayError> {
        timed(RegistryOperation::Delete, gateway.delete(id)).await?;
        metrics::counter!(ARTIFACTS_DELETED).increment(1);
        Ok(())
    }

    /// Turn a stage result into an outcome, counting and logging failures.
    fn settle(
        &self,
        stage: Stage,
        id: &ArtifactId,
        result: Result<(), GatewayError>,
    ) -> StageOutcome {
        if let Err(err) = &result {
            let total = self.counters.record(stage);
            error!(
                stage = %stage,
                artifact_id = %id,
                failures = total,
                error = %err,
                cause = ?err,
                "canary {stage} failed"
            );
        }
        StageOutcome::from_result(result)
    }
}

/// Await one gateway call, recording its latency and turning a panic into an error.
async fn timed<T, F>(operation: RegistryOperation, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    let start = tokio::time::Instant::now();
    let result = match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(GatewayError::from_panic(operation, payload)),
    };
    metrics::histogram!(OPERATION_SECONDS, "operation" => operation.as_str())
        .record(start.elapsed().as_secs_f64());
    result
}
