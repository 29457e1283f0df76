use serde::Serialize;
use thiserror::Error;

/// Failure reported by an external provider (proof provider, wallet, or the
/// bridge carrying them). The message is kept exactly as the provider sent it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    pub code: Option<i64>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>, code: Option<i64>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Error raised locally (transport, protocol) rather than by the provider.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(message, None)
    }
}

/// Classification of a failed flow, exposed to callers as `errorKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Availability,
    MissingProvider,
    Identity,
    Launch,
    Validation,
}

/// Error that halts a verification flow at a step boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Proof provider answered that it is not installed or not reachable.
    #[error("zkPass TransGate is not available; install extension from {install_url}")]
    Unavailable { install_url: String },

    /// The availability query itself failed.
    #[error("{0}")]
    Probe(ProviderError),

    #[error("Ethereum provider not found")]
    MissingProvider,

    #[error("{0}")]
    Identity(ProviderError),

    #[error("{0}")]
    Launch(ProviderError),

    #[error("{0}")]
    Validation(ProviderError),
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable { .. } | Self::Probe(_) => ErrorKind::Availability,
            Self::MissingProvider => ErrorKind::MissingProvider,
            Self::Identity(_) => ErrorKind::Identity,
            Self::Launch(_) => ErrorKind::Launch,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Numeric code supplied by the provider, if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Probe(e) | Self::Identity(e) | Self::Launch(e) | Self::Validation(e) => e.code,
            Self::Unavailable { .. } | Self::MissingProvider => None,
        }
    }
}
