//! Opaque artifact metadata.
//!
//! The canary never inspects individual fields; it only checks that the
//! registry returned *something*.

use serde::{Deserialize, Serialize};

/// Metadata returned by create / read-metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactMetadata(serde_json::Value);

impl ArtifactMetadata {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Metadata with no content at all (`null`, `{}`, `[]` or `""`).
    pub fn empty() -> Self {
        Self(serde_json::Value::Null)
    }

    /// true unless the value is null or an empty object/array/string.
    pub fn is_present(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            serde_json::Value::Array(items) => !items.is_empty(),
            serde_json::Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for ArtifactMetadata {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}
