use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Error codes understood by the smart home platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DeviceUnreachable,
    DeviceNotFound,
    InternalError,
    InvalidAction,
    InvalidValue,
    NotSupportedInCurrentMode,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeviceUnreachable => "DEVICE_UNREACHABLE",
            Self::DeviceNotFound => "DEVICE_NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::InvalidAction => "INVALID_ACTION",
            Self::InvalidValue => "INVALID_VALUE",
            Self::NotSupportedInCurrentMode => "NOT_SUPPORTED_IN_CURRENT_MODE",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SmartHomeError {
    /// Intentional failure reported verbatim to the platform.
    #[error("{code}: {message}")]
    Protocol { code: ErrorCode, message: String },
    /// Anything else; always reported as `INTERNAL_ERROR`.
    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

impl SmartHomeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Protocol { code, message: message.into() }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidValue, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotSupportedInCurrentMode, message)
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DeviceUnreachable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Protocol { code, .. } => *code,
            Self::Fault(_) => ErrorCode::InternalError,
        }
    }
}

pub type Result<T, E = SmartHomeError> = std::result::Result<T, E>;
