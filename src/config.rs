use std::time::Duration;

pub const DEFAULT_INSTALL_URL: &str =
    "https://chromewebstore.google.com/detail/zkpass-transgate/afkoofjocpbclhnldmmaphappihehpma";

/// Service configuration, read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub bridge_addr: String,
    /// No wallet provider is available when unset.
    pub wallet_bridge_addr: Option<String>,
    pub default_app_id: Option<String>,
    pub default_schema_id: Option<String>,
    pub install_url: String,
    pub connect_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = get("PORT").and_then(|v| v.parse().ok()).unwrap_or(4010);
        let connect_timeout_secs: u64 = get("BRIDGE_CONNECT_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            port,
            bridge_addr: get("TRANSGATE_BRIDGE_ADDR")
                .unwrap_or_else(|| "127.0.0.1:5005".to_string()),
            wallet_bridge_addr: get("WALLET_BRIDGE_ADDR"),
            default_app_id: get("DEFAULT_APP_ID"),
            default_schema_id: get("DEFAULT_SCHEMA_ID"),
            install_url: get("TRANSGATE_INSTALL_URL")
                .unwrap_or_else(|| DEFAULT_INSTALL_URL.to_string()),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        }
    }
}
