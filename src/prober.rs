use crate::error::FlowError;
use crate::provider::ProofProvider;

/// Ask the proof provider whether it is installed and reachable.
///
/// `Ok(false)` is a definitive answer, not an error; the caller decides how to
/// halt. Only a failure to get an answer at all maps to `FlowError::Probe`.
pub async fn probe(provider: &dyn ProofProvider) -> Result<bool, FlowError> {
    let available = provider.is_available().await.map_err(|e| {
        tracing::warn!("Availability probe failed: {} (code={:?})", e, e.code);
        FlowError::Probe(e)
    })?;

    tracing::info!("Proof provider available={}", available);
    Ok(available)
}
