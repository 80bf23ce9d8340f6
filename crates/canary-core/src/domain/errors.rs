//! Errors - エラー型と分類
//!
//! # 分類
//! - `GatewayError`: registry 呼び出しの失敗理由（ログに原文のまま出す）
//! - `Stage`: どのカウンタに数えるか（Create / Read / Delete）
//!
//! 失敗理由（timeout, 401, 404 ...）は個別には数えません。
//! 数えるのは Stage 単位だけです。

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// A single registry operation, as seen by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryOperation {
    Create,
    ReadMetadata,
    ReadContent,
    Delete,
}

impl RegistryOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryOperation::Create => "create",
            RegistryOperation::ReadMetadata => "read_metadata",
            RegistryOperation::ReadContent => "read_content",
            RegistryOperation::Delete => "delete",
        }
    }

    /// Stage whose counter a failure of this operation lands in.
    pub fn stage(&self) -> Stage {
        match self {
            RegistryOperation::Create => Stage::Create,
            RegistryOperation::ReadMetadata | RegistryOperation::ReadContent => Stage::Read,
            RegistryOperation::Delete => Stage::Delete,
        }
    }
}

impl fmt::Display for RegistryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure classification used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Create,
    Read,
    Delete,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Create => "create",
            Stage::Read => "read",
            Stage::Delete => "delete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a registry operation failed.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("transport error during {operation}: {message}")]
    Transport {
        operation: RegistryOperation,
        message: String,
    },

    /// The registry answered with a non-success status.
    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        operation: RegistryOperation,
        status: u16,
        body: String,
    },

    #[error("artifact not found during {operation}")]
    NotFound { operation: RegistryOperation },

    /// Credentials could not be obtained (e.g. token endpoint rejected us).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The call succeeded but returned nothing usable.
    #[error("{operation} returned an empty result")]
    EmptyResult { operation: RegistryOperation },

    #[error("could not decode {operation} response: {message}")]
    Decode {
        operation: RegistryOperation,
        message: String,
    },

    /// Gateway could not be built at all.
    #[error("gateway construction failed: {0}")]
    Construction(String),

    /// The gateway call panicked; the cycle counts it like any other failure.
    #[error("{operation} panicked: {message}")]
    Panicked {
        operation: RegistryOperation,
        message: String,
    },
}

impl GatewayError {
    pub fn from_panic(operation: RegistryOperation, payload: Box<dyn Any + Send>) -> Self {
        GatewayError::Panicked {
            operation,
            message: panic_message(payload),
        }
    }
}

/// Text of a panic payload (`&str` / `String`), as produced by `panic!`.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
