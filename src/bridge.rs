//! TCP client for the provider bridge.
//!
//! The bridge is the agent that hosts the TransGate extension and the user's
//! wallet. Each TCP connection carries exactly ONE request-response pair: the
//! client writes a JSON request, half-closes the socket, and reads the JSON
//! response until EOF.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::ProviderError;
use crate::provider::{ProofConnector, ProofProvider, Signer, WalletProvider};
use crate::types::{Chain, ProofResult};

// ─────────────────────────────────────────────
// Protocol types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BridgeRequest {
    #[serde(rename = "type")]
    request_type: String,
    request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chain: Option<Chain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proof: Option<serde_json::Value>,
}

impl BridgeRequest {
    fn new(request_type: &str, request_id: String) -> Self {
        Self {
            request_type: request_type.to_string(),
            request_id,
            app_id: None,
            schema_id: None,
            recipient: None,
            chain: None,
            proof: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeResponse {
    #[serde(rename = "type")]
    response_type: String,
    request_id: String,
    available: Option<bool>,
    proof: Option<serde_json::Value>,
    valid: Option<bool>,
    address: Option<String>,
    error: Option<String>,
    code: Option<i64>,
}

// ─────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────

pub struct BridgeClient {
    addr: String,
    connect_timeout: Duration,
    next_id: AtomicU64,
}

impl BridgeClient {
    pub fn new(addr: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn request(&self, request_type: &str) -> BridgeRequest {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        BridgeRequest::new(request_type, format!("{}-{}", request_type, id))
    }

    /// Send one request and wait for its response. Provider-reported errors
    /// come back as `Err` with the bridge's message and code untouched.
    async fn round_trip(
        &self,
        request: &BridgeRequest,
        expected_type: &str,
    ) -> Result<BridgeResponse, ProviderError> {
        let payload = encode_request(request)?;

        let mut stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| {
                ProviderError::transport(format!(
                    "Timed out connecting to bridge at {}",
                    self.addr
                ))
            })?
            .map_err(|e| {
                ProviderError::transport(format!(
                    "Failed to connect to bridge at {}: {}",
                    self.addr, e
                ))
            })?;

        tracing::debug!(
            "Bridge request type={} requestId={} ({} bytes)",
            request.request_type,
            request.request_id,
            payload.len()
        );

        stream
            .write_all(&payload)
            .await
            .map_err(|e| ProviderError::transport(format!("Failed to write bridge request: {}", e)))?;
        stream
            .shutdown()
            .await
            .map_err(|e| ProviderError::transport(format!("Failed to close bridge write half: {}", e)))?;

        // Launch may wait on the user for an unbounded time; no read timeout.
        let mut response_data = Vec::new();
        stream
            .read_to_end(&mut response_data)
            .await
            .map_err(|e| ProviderError::transport(format!("Failed to read bridge response: {}", e)))?;

        let response = decode_response(&response_data)?;
        check_response(request, response, expected_type)
    }
}

fn encode_request(request: &BridgeRequest) -> Result<Vec<u8>, ProviderError> {
    serde_json::to_vec(request)
        .map_err(|e| ProviderError::transport(format!("Failed to serialize bridge request: {}", e)))
}

fn decode_response(data: &[u8]) -> Result<BridgeResponse, ProviderError> {
    serde_json::from_slice(data)
        .map_err(|e| ProviderError::transport(format!("Invalid bridge response JSON: {}", e)))
}

fn check_response(
    request: &BridgeRequest,
    response: BridgeResponse,
    expected_type: &str,
) -> Result<BridgeResponse, ProviderError> {
    if response.request_id != request.request_id {
        return Err(ProviderError::transport(format!(
            "Bridge response requestId mismatch: expected {}, got {}",
            request.request_id, response.request_id
        )));
    }

    match response.response_type.as_str() {
        "error" => {
            let message = response
                .error
                .unwrap_or_else(|| "Bridge reported an error without a message".to_string());
            Err(ProviderError::new(message, response.code))
        }
        t if t == expected_type => Ok(response),
        other => Err(ProviderError::transport(format!(
            "Unexpected bridge response type: {} (expected {})",
            other, expected_type
        ))),
    }
}

fn missing_field(field: &str, response_type: &str) -> ProviderError {
    ProviderError::transport(format!(
        "Bridge {} response is missing '{}'",
        response_type, field
    ))
}

// ─────────────────────────────────────────────
// Proof provider
// ─────────────────────────────────────────────

/// Connects app-scoped proof providers through one shared bridge client.
pub struct BridgeConnector {
    client: Arc<BridgeClient>,
}

impl BridgeConnector {
    pub fn new(client: Arc<BridgeClient>) -> Self {
        Self { client }
    }
}

impl ProofConnector for BridgeConnector {
    fn connect(&self, app_id: &str) -> Box<dyn ProofProvider> {
        Box::new(BridgeProofProvider {
            client: self.client.clone(),
            app_id: app_id.to_string(),
        })
    }
}

pub struct BridgeProofProvider {
    client: Arc<BridgeClient>,
    app_id: String,
}

impl BridgeProofProvider {
    fn request(&self, request_type: &str) -> BridgeRequest {
        let mut request = self.client.request(request_type);
        request.app_id = Some(self.app_id.clone());
        request
    }
}

#[async_trait]
impl ProofProvider for BridgeProofProvider {
    async fn is_available(&self) -> Result<bool, ProviderError> {
        let request = self.request("availability");
        let response = self.client.round_trip(&request, "availability").await?;
        response
            .available
            .ok_or_else(|| missing_field("available", "availability"))
    }

    async fn launch(&self, schema_id: &str, recipient: &str) -> Result<ProofResult, ProviderError> {
        let mut request = self.request("launch");
        request.schema_id = Some(schema_id.to_string());
        request.recipient = Some(recipient.to_string());

        let response = self.client.round_trip(&request, "proof").await?;
        let payload = response.proof.ok_or_else(|| missing_field("proof", "proof"))?;
        Ok(ProofResult::new(schema_id, payload))
    }

    async fn verify_signature(
        &self,
        chain: Chain,
        schema_id: &str,
        proof: &ProofResult,
    ) -> Result<bool, ProviderError> {
        let mut request = self.request("verifySignature");
        request.chain = Some(chain);
        request.schema_id = Some(schema_id.to_string());
        request.proof = Some(proof.payload().clone());

        let response = self.client.round_trip(&request, "verification").await?;
        response
            .valid
            .ok_or_else(|| missing_field("valid", "verification"))
    }
}

// ─────────────────────────────────────────────
// Wallet provider
// ─────────────────────────────────────────────

pub struct BridgeWallet {
    client: Arc<BridgeClient>,
}

impl BridgeWallet {
    pub fn new(client: Arc<BridgeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WalletProvider for BridgeWallet {
    async fn get_signer(&self) -> Result<Box<dyn Signer>, ProviderError> {
        let request = self.client.request("signer");
        let response = self.client.round_trip(&request, "signer").await?;
        let address = response
            .address
            .ok_or_else(|| missing_field("address", "signer"))?;
        Ok(Box::new(BridgeSigner { address }))
    }
}

/// Signer handed out by the bridge; its account was unlocked when the signer
/// was requested.
pub struct BridgeSigner {
    address: String,
}

#[async_trait]
impl Signer for BridgeSigner {
    async fn get_address(&self) -> Result<String, ProviderError> {
        Ok(self.address.clone())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// Serve `responses.len()` one-shot connections, answering each request
    /// with the next canned response (its requestId echoed back). Received
    /// requests are forwarded on the channel.
    async fn fake_bridge(responses: Vec<Value>) -> (String, mpsc::UnboundedReceiver<Value>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for mut response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut data = Vec::new();
                stream.read_to_end(&mut data).await.unwrap();
                let request: Value = serde_json::from_slice(&data).unwrap();
                response["requestId"] = request["requestId"].clone();
                tx.send(request).unwrap();
                stream
                    .write_all(&serde_json::to_vec(&response).unwrap())
                    .await
                    .unwrap();
                stream.shutdown().await.unwrap();
            }
        });

        (addr, rx)
    }

    fn client(addr: &str) -> Arc<BridgeClient> {
        Arc::new(BridgeClient::new(addr, Duration::from_secs(2)))
    }

    #[test]
    fn test_bridge_request_serialize_launch() {
        let mut req = BridgeRequest::new("launch", "launch-1".to_string());
        req.app_id = Some("app-1".to_string());
        req.schema_id = Some("schema-1".to_string());
        req.recipient = Some("0xABC".to_string());
        let json: Value = serde_json::from_slice(&encode_request(&req).unwrap()).unwrap();
        assert_eq!(json["type"], "launch");
        assert_eq!(json["requestId"], "launch-1");
        assert_eq!(json["appId"], "app-1");
        assert_eq!(json["schemaId"], "schema-1");
        assert_eq!(json["recipient"], "0xABC");
        assert!(json.get("chain").is_none());
        assert!(json.get("proof").is_none());
    }

    #[test]
    fn test_bridge_response_deserialize_error() {
        let json = br#"{
            "type": "error",
            "requestId": "launch-7",
            "error": "User rejected",
            "code": 4001
        }"#;
        let resp = decode_response(json).unwrap();
        assert_eq!(resp.response_type, "error");
        assert_eq!(resp.error.as_deref(), Some("User rejected"));
        assert_eq!(resp.code, Some(4001));
        assert!(resp.proof.is_none());
    }

    #[test]
    fn test_decode_response_invalid_json() {
        let err = decode_response(b"not json").unwrap_err();
        assert!(err.message.contains("Invalid bridge response JSON"));
    }

    #[test]
    fn test_check_response_error_is_verbatim() {
        let req = BridgeRequest::new("launch", "launch-7".to_string());
        let resp = decode_response(
            br#"{"type":"error","requestId":"launch-7","error":"User rejected","code":4001}"#,
        )
        .unwrap();
        let err = check_response(&req, resp, "proof").unwrap_err();
        assert_eq!(err, ProviderError::new("User rejected", Some(4001)));
    }

    #[test]
    fn test_check_response_request_id_mismatch() {
        let req = BridgeRequest::new("availability", "availability-1".to_string());
        let resp = decode_response(
            br#"{"type":"availability","requestId":"availability-2","available":true}"#,
        )
        .unwrap();
        let err = check_response(&req, resp, "availability").unwrap_err();
        assert!(err.message.contains("requestId mismatch"));
    }

    #[test]
    fn test_check_response_unexpected_type() {
        let req = BridgeRequest::new("launch", "launch-1".to_string());
        let resp =
            decode_response(br#"{"type":"signer","requestId":"launch-1","address":"0x1"}"#)
                .unwrap();
        let err = check_response(&req, resp, "proof").unwrap_err();
        assert!(err.message.contains("Unexpected bridge response type: signer"));
        assert_eq!(err.code, None);
    }

    #[test]
    fn test_request_ids_are_unique() {
        let client = BridgeClient::new("127.0.0.1:1", Duration::from_secs(1));
        let a = client.request("launch");
        let b = client.request("launch");
        assert_ne!(a.request_id, b.request_id);
        assert!(a.request_id.starts_with("launch-"));
    }

    #[tokio::test]
    async fn test_is_available_round_trip() {
        let (addr, mut rx) =
            fake_bridge(vec![json!({"type": "availability", "available": true})]).await;

        let provider = BridgeConnector::new(client(&addr)).connect("app-1");
        assert!(provider.is_available().await.unwrap());

        let seen = rx.recv().await.unwrap();
        assert_eq!(seen["type"], "availability");
        assert_eq!(seen["appId"], "app-1");
    }

    #[tokio::test]
    async fn test_launch_and_verify_carry_proof_unchanged() {
        let (addr, mut rx) = fake_bridge(vec![
            json!({
                "type": "proof",
                "proof": {"taskId": "t-9", "uHash": "0x2bed", "publicFields": [1, "a"]}
            }),
            json!({"type": "verification", "valid": false}),
        ])
        .await;

        let provider = BridgeConnector::new(client(&addr)).connect("app-1");
        let proof = provider.launch("schema-1", "0xABC").await.unwrap();
        assert_eq!(proof.schema_id(), "schema-1");
        assert_eq!(
            proof.payload(),
            &json!({"taskId": "t-9", "uHash": "0x2bed", "publicFields": [1, "a"]})
        );

        let valid = provider
            .verify_signature(Chain::Evm, "schema-1", &proof)
            .await
            .unwrap();
        assert!(!valid);

        let launch_req = rx.recv().await.unwrap();
        assert_eq!(launch_req["type"], "launch");
        assert_eq!(launch_req["schemaId"], "schema-1");
        assert_eq!(launch_req["recipient"], "0xABC");

        let verify_req = rx.recv().await.unwrap();
        assert_eq!(verify_req["type"], "verifySignature");
        assert_eq!(verify_req["chain"], "evm");
        assert_eq!(&verify_req["proof"], proof.payload());
    }

    #[tokio::test]
    async fn test_launch_error_from_bridge() {
        let (addr, _rx) = fake_bridge(vec![json!({
            "type": "error",
            "error": "User rejected",
            "code": 4001
        })])
        .await;

        let provider = BridgeConnector::new(client(&addr)).connect("app-1");
        let err = provider.launch("schema-1", "0xABC").await.unwrap_err();
        assert_eq!(err.message, "User rejected");
        assert_eq!(err.code, Some(4001));
    }

    #[tokio::test]
    async fn test_launch_missing_proof_field() {
        let (addr, _rx) = fake_bridge(vec![json!({"type": "proof"})]).await;

        let provider = BridgeConnector::new(client(&addr)).connect("app-1");
        let err = provider.launch("schema-1", "0xABC").await.unwrap_err();
        assert!(err.message.contains("missing 'proof'"));
    }

    #[tokio::test]
    async fn test_wallet_signer_address() {
        let (addr, mut rx) =
            fake_bridge(vec![json!({"type": "signer", "address": "0xABC"})]).await;

        let wallet = BridgeWallet::new(client(&addr));
        let signer = wallet.get_signer().await.unwrap();
        assert_eq!(signer.get_address().await.unwrap(), "0xABC");

        let seen = rx.recv().await.unwrap();
        assert_eq!(seen["type"], "signer");
        assert!(seen.get("appId").is_none());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let provider = BridgeConnector::new(client(&addr)).connect("app-1");
        let err = provider.is_available().await.unwrap_err();
        assert!(err.message.contains("Failed to connect to bridge"));
        assert_eq!(err.code, None);
    }
}
