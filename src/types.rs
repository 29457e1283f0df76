use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, FlowError};

/// Message delivered with a `Rejected` outcome.
pub const REJECTED_MESSAGE: &str = "Verification failed";

/// A single verification submission. Fields are fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    app_id: String,
    schema_id: String,
}

impl VerificationRequest {
    pub fn new(app_id: impl Into<String>, schema_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            schema_id: schema_id.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }
}

/// Wallet-bound recipient the proof is issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub address: String,
}

/// Chain family a proof signature is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Evm,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Evm => "evm",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof returned by the proof provider.
///
/// The payload shape depends on the schema and is never interpreted here; it is
/// tagged with the schema it was launched for and handed back untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofResult {
    schema_id: String,
    payload: serde_json::Value,
}

impl ProofResult {
    pub fn new(schema_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            schema_id: schema_id.into(),
            payload,
        }
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn into_payload(self) -> serde_json::Value {
        self.payload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Verified,
    Rejected,
    Failed,
}

/// Result of one verification flow, delivered to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl VerificationOutcome {
    pub fn verified(proof: ProofResult) -> Self {
        Self {
            status: OutcomeStatus::Verified,
            proof: Some(proof.into_payload()),
            error_message: None,
            error_code: None,
            error_kind: None,
        }
    }

    pub fn rejected() -> Self {
        Self {
            status: OutcomeStatus::Rejected,
            proof: None,
            error_message: Some(REJECTED_MESSAGE.to_string()),
            error_code: None,
            error_kind: None,
        }
    }

    pub fn failed(error: &FlowError) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            proof: None,
            error_message: Some(error.to_string()),
            error_code: error.code(),
            error_kind: Some(error.kind()),
        }
    }
}

// ─────────────────────────────────────────────
// HTTP bodies
// ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBody {
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub schema_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub wallet_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
