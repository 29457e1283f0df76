use crate::error::FlowError;
use crate::provider::ProofProvider;
use crate::types::{Identity, ProofResult};

/// Launch proof generation for `schema_id`, bound to the resolved recipient.
///
/// No timeout is applied: the provider may wait on the user indefinitely.
/// Provider errors are passed through untouched.
pub async fn launch(
    provider: &dyn ProofProvider,
    schema_id: &str,
    recipient: &Identity,
) -> Result<ProofResult, FlowError> {
    tracing::info!(
        "Launching proof generation for schema={} recipient={}",
        schema_id,
        recipient.address
    );

    let proof = provider
        .launch(schema_id, &recipient.address)
        .await
        .map_err(|e| {
            tracing::warn!("Launch failed: {} (code={:?})", e, e.code);
            FlowError::Launch(e)
        })?;

    tracing::info!("Proof received for schema={}", proof.schema_id());
    Ok(proof)
}
