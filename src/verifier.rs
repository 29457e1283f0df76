use crate::error::FlowError;
use crate::provider::ProofProvider;
use crate::types::{Chain, ProofResult};

/// Answer of a completed signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVerdict {
    Valid,
    Invalid,
}

/// Check the proof's signature against the schema it was requested for.
///
/// A negative answer is `Ok(SignatureVerdict::Invalid)`; `Err` is reserved for
/// the provider failing to answer.
pub async fn validate(
    provider: &dyn ProofProvider,
    chain: Chain,
    schema_id: &str,
    proof: &ProofResult,
) -> Result<SignatureVerdict, FlowError> {
    let valid = provider
        .verify_signature(chain, schema_id, proof)
        .await
        .map_err(|e| {
            tracing::warn!("Signature validation errored: {} (code={:?})", e, e.code);
            FlowError::Validation(e)
        })?;

    tracing::info!(
        "Signature check for chain={} schema={}: {}",
        chain,
        schema_id,
        valid
    );

    Ok(if valid {
        SignatureVerdict::Valid
    } else {
        SignatureVerdict::Invalid
    })
}
