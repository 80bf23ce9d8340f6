//! InMemoryRegistryGateway - 開発用・テスト用の registry
//!
//! # 学習ポイント
//! - `std::sync::Mutex` で短いクリティカルセクションを守る（ロックを跨いで await しない）
//! - 操作ごとの失敗注入（エラー / 空の結果 / panic）
//! - 呼び出し履歴の記録（テストでの検証用）
//!
//! `ifExists=RETURN` の挙動を再現します: 既にある id への create は既存の metadata を返します。

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{
    ArtifactId, ArtifactMetadata, GatewayError, RegistryOperation, SchemaPayload, DEFAULT_GROUP,
};
use crate::ports::RegistryGateway;

/// How an operation misbehaves when failure is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Return an HTTP 503-style error.
    Error,
    /// Succeed, but with an empty body / empty metadata.
    Empty,
    /// Panic inside the call (a misbehaving client library).
    Panic,
}

/// Ids each operation was called with, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    pub creates: Vec<ArtifactId>,
    pub read_metadata: Vec<ArtifactId>,
    pub read_content: Vec<ArtifactId>,
    pub deletes: Vec<ArtifactId>,
}

impl CallLog {
    fn push(&mut self, operation: RegistryOperation, id: ArtifactId) {
        match operation {
            RegistryOperation::Create => self.creates.push(id),
            RegistryOperation::ReadMetadata => self.read_metadata.push(id),
            RegistryOperation::ReadContent => self.read_content.push(id),
            RegistryOperation::Delete => self.deletes.push(id),
        }
    }
}

struct StoredArtifact {
    metadata: ArtifactMetadata,
    content: Vec<u8>,
}

#[derive(Default)]
struct State {
    artifacts: HashMap<ArtifactId, StoredArtifact>,
    calls: CallLog,
}

#[derive(Default)]
pub struct InMemoryRegistryGateway {
    state: Mutex<State>,
    failures: HashMap<RegistryOperation, FailureMode>,
    always_found: bool,
}

impl InMemoryRegistryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` fail on every call.
    pub fn failing(mut self, operation: RegistryOperation, mode: FailureMode) -> Self {
        self.failures.insert(operation, mode);
        self
    }

    /// Reads and deletes succeed even for ids that were never stored.
    pub fn always_found(mut self) -> Self {
        self.always_found = true;
        self
    }

    pub fn calls(&self) -> CallLog {
        self.lock().calls.clone()
    }

    pub fn stored_len(&self) -> usize {
        self.lock().artifacts.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and apply any injected failure.
    ///
    /// `Ok(true)` means "answer with an empty result".
    fn enter(&self, operation: RegistryOperation, id: &ArtifactId) -> Result<bool, GatewayError> {
        self.lock().calls.push(operation, *id);
        match self.failures.get(&operation) {
            None => Ok(false),
            Some(FailureMode::Empty) => Ok(true),
            Some(FailureMode::Error) => Err(GatewayError::Status {
                operation,
                status: 503,
                body: format!("injected {operation} failure"),
            }),
            Some(FailureMode::Panic) => panic!("injected panic during {operation}"),
        }
    }

    fn metadata_for(id: &ArtifactId, payload: &SchemaPayload) -> ArtifactMetadata {
        ArtifactMetadata::new(serde_json::json!({
            "groupId": DEFAULT_GROUP,
            "id": id.to_string(),
            "type": payload.artifact_type().as_str(),
            "version": "1",
        }))
    }
}

#[async_trait]
impl RegistryGateway for InMemoryRegistryGateway {
    async fn create(
        &self,
        id: &ArtifactId,
        payload: &SchemaPayload,
    ) -> Result<ArtifactMetadata, GatewayError> {
        if self.enter(RegistryOperation::Create, id)? {
            return Ok(ArtifactMetadata::empty());
        }
        let mut state = self.lock();
        let stored = state.artifacts.entry(*id).or_insert_with(|| StoredArtifact {
            metadata: Self::metadata_for(id, payload),
            content: payload.as_bytes().to_vec(),
        });
        Ok(stored.metadata.clone())
    }

    async fn read_metadata(&self, id: &ArtifactId) -> Result<ArtifactMetadata, GatewayError> {
        let operation = RegistryOperation::ReadMetadata;
        if self.enter(operation, id)? {
            return Ok(ArtifactMetadata::empty());
        }
        match self.lock().artifacts.get(id) {
            Some(stored) => Ok(stored.metadata.clone()),
            None if self.always_found => Ok(Self::metadata_for(id, &SchemaPayload::canary())),
            None => Err(GatewayError::NotFound { operation }),
        }
    }

    async fn read_content(&self, id: &ArtifactId) -> Result<Vec<u8>, GatewayError> {
        let operation = RegistryOperation::ReadContent;
        if self.enter(operation, id)? {
            return Ok(Vec::new());
        }
        match self.lock().artifacts.get(id) {
            Some(stored) => Ok(stored.content.clone()),
            None if self.always_found => Ok(SchemaPayload::canary().as_bytes().to_vec()),
            None => Err(GatewayError::NotFound { operation }),
        }
    }

    async fn delete(&self, id: &ArtifactId) -> Result<(), GatewayError> {
        let operation = RegistryOperation::Delete;
        // 空の結果は delete には意味がないので成功扱い
        self.enter(operation, id)?;
        let removed = self.lock().artifacts.remove(id);
        if removed.is_none() && !self.always_found {
            return Err(GatewayError::NotFound { operation });
        }
        Ok(())
    }
}
