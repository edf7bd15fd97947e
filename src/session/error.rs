//! Session error taxonomy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::rpc::codes;
use crate::core::units::QuantityError;

/// Error object returned by the wallet provider (`{code, message, data?}`).
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    /// The provider answered, but not with anything we can decode.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, message)
    }

    pub fn unsupported(method: &str) -> Self {
        Self::new(codes::UNSUPPORTED_METHOD, format!("provider does not support {}", method))
    }
}

impl From<QuantityError> for ProviderRpcError {
    fn from(e: QuantityError) -> Self {
        ProviderRpcError::invalid_response(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderRpcError {
    fn from(e: serde_json::Error) -> Self {
        ProviderRpcError::invalid_response(e.to_string())
    }
}

/// Coarse error classification surfaced to the UI alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NoProviderAvailable,
    NoAccountAuthorized,
    UserRejected,
    RequestPending,
    ProviderError,
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("no wallet provider available")]
    NoProviderAvailable,
    #[error("wallet returned no authorized accounts")]
    NoAccountAuthorized,
    #[error("request rejected: {0}")]
    UserRejected(String),
    #[error("wallet request already pending: {0}")]
    RequestPending(String),
    #[error("{message} (code {code})")]
    Provider { code: i64, message: String },
    #[error("connection attempt superseded by disconnect")]
    Superseded,
}

pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::NoProviderAvailable => ErrorKind::NoProviderAvailable,
            SessionError::NoAccountAuthorized => ErrorKind::NoAccountAuthorized,
            SessionError::UserRejected(_) => ErrorKind::UserRejected,
            SessionError::RequestPending(_) => ErrorKind::RequestPending,
            SessionError::Provider { .. } => ErrorKind::ProviderError,
            SessionError::Superseded => ErrorKind::Superseded,
        }
    }

    /// Classify a provider error by its code.
    pub fn from_rpc(err: ProviderRpcError) -> Self {
        match err.code {
            codes::USER_REJECTED => SessionError::UserRejected(err.message),
            codes::REQUEST_PENDING => SessionError::RequestPending(err.message),
            code => SessionError::Provider { code, message: err.message },
        }
    }
}

impl From<ProviderRpcError> for SessionError {
    fn from(err: ProviderRpcError) -> Self {
        SessionError::from_rpc(err)
    }
}
