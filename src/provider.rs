//! Capability seams for the external actors taking part in a verification:
//! the proof provider (TransGate), the connector that scopes it to an app,
//! and the wallet provider exposing the user's signer.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{Chain, ProofResult};

/// Proof-generation capability for one app.
#[async_trait]
pub trait ProofProvider: Send + Sync {
    /// Whether the proof-generation surface is installed and reachable.
    async fn is_available(&self) -> Result<bool, ProviderError>;

    /// Ask the user to generate a proof for `schema_id` bound to `recipient`.
    /// May stay pending for as long as the user takes to act.
    async fn launch(&self, schema_id: &str, recipient: &str) -> Result<ProofResult, ProviderError>;

    /// Check that `proof` was signed for `schema_id` on `chain`.
    async fn verify_signature(
        &self,
        chain: Chain,
        schema_id: &str,
        proof: &ProofResult,
    ) -> Result<bool, ProviderError>;
}

/// Hands out a proof provider scoped to an app id.
pub trait ProofConnector: Send + Sync {
    fn connect(&self, app_id: &str) -> Box<dyn ProofProvider>;
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn get_signer(&self) -> Result<Box<dyn Signer>, ProviderError>;
}

#[async_trait]
pub trait Signer: Send + Sync {
    async fn get_address(&self) -> Result<String, ProviderError>;
}
