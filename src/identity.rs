use crate::error::FlowError;
use crate::provider::WalletProvider;
use crate::types::Identity;

/// Resolve the recipient address from the wallet, if one is present.
///
/// No wallet call is made when `wallet` is `None`.
pub async fn resolve(wallet: Option<&dyn WalletProvider>) -> Result<Identity, FlowError> {
    let Some(wallet) = wallet else {
        tracing::warn!("No wallet provider configured");
        return Err(FlowError::MissingProvider);
    };

    let signer = wallet.get_signer().await.map_err(FlowError::Identity)?;
    let address = signer.get_address().await.map_err(FlowError::Identity)?;

    tracing::info!("Resolved recipient address={}", address);
    Ok(Identity { address })
}
