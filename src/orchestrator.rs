use std::sync::Arc;

use crate::error::FlowError;
use crate::provider::{ProofConnector, WalletProvider};
use crate::types::{Chain, ProofResult, VerificationOutcome, VerificationRequest};
use crate::verifier::SignatureVerdict;
use crate::{identity, launcher, prober, verifier};

/// Lifecycle of a single verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    CheckingAvailability,
    ResolvingIdentity,
    Launching,
    Validating,
    Verified,
    Rejected,
    Failed,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlowState::Verified | FlowState::Rejected | FlowState::Failed
        )
    }
}

/// Per-request state. Each submission gets its own flow, so overlapping
/// submissions never share anything.
#[derive(Debug)]
pub struct Flow {
    request: VerificationRequest,
    state: FlowState,
    history: Vec<FlowState>,
}

impl Flow {
    pub fn new(request: VerificationRequest) -> Self {
        Self {
            request,
            state: FlowState::Idle,
            history: vec![FlowState::Idle],
        }
    }

    pub fn request(&self) -> &VerificationRequest {
        &self.request
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Every state the flow has been in, starting with `Idle`.
    pub fn history(&self) -> &[FlowState] {
        &self.history
    }

    fn advance(&mut self, next: FlowState) {
        tracing::debug!(
            "Flow app={} schema={}: {:?} -> {:?}",
            self.request.app_id(),
            self.request.schema_id(),
            self.state,
            next
        );
        self.state = next;
        self.history.push(next);
    }

    fn complete(self) -> CompletedFlow {
        debug_assert!(self.state().is_terminal());
        CompletedFlow {
            request: self.request,
            history: self.history,
        }
    }
}

/// A flow that reached a terminal state. It cannot be driven again; a
/// resubmission builds a new `Flow` starting from `Idle`.
#[derive(Debug)]
pub struct CompletedFlow {
    request: VerificationRequest,
    history: Vec<FlowState>,
}

impl CompletedFlow {
    pub fn request(&self) -> &VerificationRequest {
        &self.request
    }

    pub fn state(&self) -> FlowState {
        // history always holds at least `Idle` and the terminal state
        self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[FlowState] {
        &self.history
    }
}

/// Sequences probe, identity resolution, launch and signature validation for
/// one request, and classifies the result. Never retries.
pub struct Orchestrator {
    connector: Arc<dyn ProofConnector>,
    wallet: Option<Arc<dyn WalletProvider>>,
    install_url: String,
    chain: Chain,
}

impl Orchestrator {
    pub fn new(
        connector: Arc<dyn ProofConnector>,
        wallet: Option<Arc<dyn WalletProvider>>,
        install_url: impl Into<String>,
    ) -> Self {
        Self {
            connector,
            wallet,
            install_url: install_url.into(),
            chain: Chain::Evm,
        }
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    /// Run a fresh flow for `request` to completion.
    pub async fn verify(&self, request: VerificationRequest) -> VerificationOutcome {
        let (outcome, _) = self.drive(Flow::new(request)).await;
        outcome
    }

    /// Drive `flow` from `Idle` to a terminal state. The flow is consumed so a
    /// finished run can never be restarted in place.
    pub async fn drive(&self, mut flow: Flow) -> (VerificationOutcome, CompletedFlow) {
        let outcome = match self.run_steps(&mut flow).await {
            Ok(Some(proof)) => {
                flow.advance(FlowState::Verified);
                VerificationOutcome::verified(proof)
            }
            Ok(None) => {
                flow.advance(FlowState::Rejected);
                VerificationOutcome::rejected()
            }
            Err(e) => {
                flow.advance(FlowState::Failed);
                VerificationOutcome::failed(&e)
            }
        };

        let done = flow.complete();
        tracing::info!(
            "Verification app={} schema={} finished: {:?} after {} transitions",
            done.request().app_id(),
            done.request().schema_id(),
            done.state(),
            done.history().len() - 1
        );

        (outcome, done)
    }

    /// `Ok(None)` means the signature check completed with a negative answer.
    async fn run_steps(&self, flow: &mut Flow) -> Result<Option<ProofResult>, FlowError> {
        let schema_id = flow.request().schema_id().to_string();
        let provider = self.connector.connect(flow.request().app_id());

        flow.advance(FlowState::CheckingAvailability);
        if !prober::probe(provider.as_ref()).await? {
            return Err(FlowError::Unavailable {
                install_url: self.install_url.clone(),
            });
        }

        flow.advance(FlowState::ResolvingIdentity);
        let recipient = identity::resolve(self.wallet.as_deref()).await?;

        flow.advance(FlowState::Launching);
        let proof = launcher::launch(provider.as_ref(), &schema_id, &recipient).await?;

        flow.advance(FlowState::Validating);
        match verifier::validate(provider.as_ref(), self.chain, &schema_id, &proof).await? {
            SignatureVerdict::Valid => Ok(Some(proof)),
            SignatureVerdict::Invalid => Ok(None),
        }
    }
}
