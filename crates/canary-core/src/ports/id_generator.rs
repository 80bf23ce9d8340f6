//! IdGenerator port - ID 生成の抽象化
//!
//! テスト容易性のために trait として抽象化しています。
//!
//! # 実装
//! - **UuidGenerator**: v4 UUID（本番用）

use crate::domain::ArtifactId;

/// IdGenerator は 1 サイクルにつき 1 つの ArtifactId を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（全ワーカーで 1 つを共有する）
pub trait IdGenerator: Send + Sync {
    fn generate_artifact_id(&self) -> ArtifactId;
}

/// UuidGenerator は v4 UUID ベースの ID 生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl UuidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidGenerator {
    fn generate_artifact_id(&self) -> ArtifactId {
        ArtifactId::random()
    }
}
