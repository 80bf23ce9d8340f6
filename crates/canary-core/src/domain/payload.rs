//! The schema document every cycle registers.

use serde::{Deserialize, Serialize};

/// Logical group all probe artifacts live under.
pub const DEFAULT_GROUP: &str = "default";

/// Artifact type tag sent with the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactType {
    Json,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Json => "JSON",
        }
    }
}

/// Conflict policy for create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IfExists {
    /// Return the existing artifact's metadata instead of failing.
    Return,
}

impl IfExists {
    pub fn as_str(&self) -> &'static str {
        match self {
            IfExists::Return => "RETURN",
        }
    }
}

const CANARY_SCHEMA: &str = r#"{
  "$id": "https://example.com/canary.schema.json",
  "$schema": "http://json-schema.org/draft-07/schema#",
  "title": "Canary",
  "type": "object",
  "properties": {
    "firstName": {
      "type": "string",
      "description": "The person's first name."
    },
    "lastName": {
      "type": "string",
      "description": "The person's last name."
    },
    "age": {
      "description": "Age in years which must be equal to or greater than zero.",
      "type": "integer",
      "minimum": 0
    }
  }
}"#;

/// Fixed JSON-Schema document, identical for every cycle.
///
/// `'static` なので clone は参照のコピーだけです。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaPayload {
    content: &'static str,
    artifact_type: ArtifactType,
}

impl SchemaPayload {
    /// The canary's JSON-Schema document.
    pub const fn canary() -> Self {
        Self {
            content: CANARY_SCHEMA,
            artifact_type: ArtifactType::Json,
        }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.content.as_bytes()
    }

    pub fn artifact_type(&self) -> ArtifactType {
        self.artifact_type
    }
}

impl Default for SchemaPayload {
    fn default() -> Self {
        Self::canary()
    }
}
