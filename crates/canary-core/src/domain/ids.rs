//! Artifact identifiers.
//!
//! # UUID ベースの ID
//! 1 サイクルごとに新しい `ArtifactId` を生成します。
//! 同じ ID が 2 つのサイクルで使われることはありません。
//!
//! registry 側では artifact id はただの文字列なので、
//! Display は UUID のハイフン区切り表記をそのまま出します（プレフィックスなし）。

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one probe artifact (scoped to exactly one cycle).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    /// ランダムな v4 UUID から生成
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ArtifactId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
