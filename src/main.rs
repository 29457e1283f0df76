mod bridge;
mod config;
mod error;
mod identity;
mod launcher;
mod orchestrator;
mod prober;
mod provider;
mod routes;
mod types;
mod verifier;

use std::sync::Arc;

use crate::bridge::{BridgeClient, BridgeConnector, BridgeWallet};
use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::provider::WalletProvider;
use crate::routes::{build_router, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zkpass_handshake=info".into()),
        )
        .init();

    let config = Config::from_env();

    let proof_client = Arc::new(BridgeClient::new(
        config.bridge_addr.clone(),
        config.connect_timeout,
    ));
    tracing::info!("Proof provider bridge: {}", proof_client.addr());
    let connector = Arc::new(BridgeConnector::new(proof_client));

    // Without a wallet bridge every verification fails before launch.
    let wallet = match &config.wallet_bridge_addr {
        Some(addr) => {
            tracing::info!("Wallet provider bridge: {}", addr);
            let client = Arc::new(BridgeClient::new(addr.clone(), config.connect_timeout));
            Some(Arc::new(BridgeWallet::new(client)) as Arc<dyn WalletProvider>)
        }
        None => {
            tracing::warn!("WALLET_BRIDGE_ADDR not set; no wallet provider available");
            None
        }
    };

    let orchestrator = Orchestrator::new(connector, wallet, config.install_url.clone());

    let state = Arc::new(AppState {
        orchestrator,
        default_app_id: config.default_app_id.clone(),
        default_schema_id: config.default_schema_id.clone(),
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Verification service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            panic!("Failed to bind to {}: {}", addr, e);
        });

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            panic!("Server error: {}", e);
        });
}
