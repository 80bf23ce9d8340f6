//! Domain model (ids, payload, metadata, errors, cycle reports).

pub mod ids;
pub mod payload;
pub mod metadata;
pub mod errors;
pub mod report;
pub mod strategy;

pub use self::ids::ArtifactId;
pub use self::payload::{ArtifactType, IfExists, SchemaPayload, DEFAULT_GROUP};
pub use self::metadata::ArtifactMetadata;
pub use self::errors::{GatewayError, RegistryOperation, Stage, panic_message};
pub use self::report::{CycleReport, StageOutcome};
pub use self::strategy::AuthStrategy;
