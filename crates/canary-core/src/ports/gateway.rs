//! RegistryGateway port - schema registry への create/read/delete
//!
//! # 実装
//! - **InMemoryRegistryGateway** (`impls`): 開発用・テスト用
//! - **HttpRegistryGateway** (`canary-http`): 本番用（REST API v2）
//!
//! すべての操作は `Result` を返します。panic / unwind で失敗を伝えることはありません。

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::CanaryConfig;
use crate::domain::{ArtifactId, ArtifactMetadata, AuthStrategy, GatewayError, SchemaPayload};

/// RegistryGateway は 1 つの認証戦略に紐づいた registry へのハンドル
///
/// # 設計原則
/// - group は常に `"default"`（実装側で固定）
/// - 構築後は不変。`Arc<dyn RegistryGateway>` で全ワーカーから共有
/// - 空の結果（null / 空 body）の扱いは呼び出し側（ProbeCycle）が判定する
#[async_trait]
pub trait RegistryGateway: Send + Sync {
    /// Register `payload` under `id` (`ifExists=RETURN`).
    async fn create(
        &self,
        id: &ArtifactId,
        payload: &SchemaPayload,
    ) -> Result<ArtifactMetadata, GatewayError>;

    async fn read_metadata(&self, id: &ArtifactId) -> Result<ArtifactMetadata, GatewayError>;

    /// Latest version's raw content.
    async fn read_content(&self, id: &ArtifactId) -> Result<Vec<u8>, GatewayError>;

    async fn delete(&self, id: &ArtifactId) -> Result<(), GatewayError>;
}

/// GatewayFactory は設定から戦略ごとの gateway を構築
///
/// supervisor は起動時に戦略ごとに 1 回だけ呼びます。
/// ここでの失敗は起動失敗として扱います（リトライしない）。
pub trait GatewayFactory {
    fn build(
        &self,
        strategy: AuthStrategy,
        config: &CanaryConfig,
    ) -> Result<Arc<dyn RegistryGateway>, GatewayError>;
}
