//! Stream operation client.
//!
//! One entry point, [`StreamOperationClient::execute`], runs every stream
//! operation through the same phases:
//!
//! ```text
//! Idle -> Resolving -> Building -> Submitting -> Confirmed
//!             \            \           \
//!              +------------+-----------+-----> Failed
//! ```
//!
//! Resolving reads the chain, the super token, and the sender from the
//! wallet. Nothing is cached between attempts and nothing is retried.

use std::sync::Arc;

use crate::address::Address;
use crate::error::{account_mismatch, missing_account, StreamError};
use crate::flow_rate::FlowRate;
use crate::operation::{
    FlowDescriptor, OperationKind, OperationOutcome, OperationPhase, OperationSummary, Receipt,
    StreamOperation,
};
use crate::provider::WalletProvider;
use crate::sdk::{Operation, StreamingSdk};
use crate::session::{network_name, Session};
use crate::slot::OperationSlot;

pub const DEFAULT_TOKEN_SYMBOL: &str = "fDAIx";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Super token every operation streams.
    pub token_symbol: String,
    /// Refuse to submit when the wallet is on any other chain.
    pub expected_chain_id: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            token_symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            expected_chain_id: None,
        }
    }
}

/// What the caller asked for, stream change or unwrap.
enum Request<'a> {
    Stream(&'a StreamOperation),
    Unwrap { super_app: Address },
}

impl Request<'_> {
    fn kind(&self) -> OperationKind {
        match self {
            Request::Stream(op) => op.kind(),
            Request::Unwrap { .. } => OperationKind::Unwrap,
        }
    }
}

/// Values looked up from the wallet and protocol at the start of an attempt.
struct Resolved {
    chain_id: u64,
    super_token: Address,
    sender: Address,
}

pub struct StreamOperationClient {
    provider: Arc<dyn WalletProvider>,
    sdk: Arc<dyn StreamingSdk>,
    settings: ClientSettings,
    slot: OperationSlot,
}

impl StreamOperationClient {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        sdk: Arc<dyn StreamingSdk>,
        settings: ClientSettings,
    ) -> Self {
        Self {
            provider,
            sdk,
            settings,
            slot: OperationSlot::new(),
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// True while an operation holds the in-flight slot.
    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// Run one stream operation to a terminal state.
    pub async fn execute(&self, session: &Session, op: &StreamOperation) -> OperationOutcome {
        self.execute_observed(session, op, |_| {}).await
    }

    /// Like [`execute`](Self::execute), reporting each phase as it is entered.
    pub async fn execute_observed(
        &self,
        session: &Session,
        op: &StreamOperation,
        on_phase: impl FnMut(OperationPhase) + Send,
    ) -> OperationOutcome {
        self.attempt(session, Request::Stream(op), on_phase).await
    }

    /// Unwrap the configured super token through `super_app`.
    pub async fn unwrap(&self, session: &Session, super_app: Address) -> OperationOutcome {
        self.unwrap_observed(session, super_app, |_| {}).await
    }

    pub async fn unwrap_observed(
        &self,
        session: &Session,
        super_app: Address,
        on_phase: impl FnMut(OperationPhase) + Send,
    ) -> OperationOutcome {
        self.attempt(session, Request::Unwrap { super_app }, on_phase)
            .await
    }

    async fn attempt(
        &self,
        session: &Session,
        request: Request<'_>,
        mut on_phase: impl FnMut(OperationPhase) + Send,
    ) -> OperationOutcome {
        let kind = request.kind();

        let Some(_guard) = self.slot.try_acquire() else {
            log::warn!("Rejected {}: another operation is in flight", kind);
            return OperationOutcome::Failed {
                kind,
                error: StreamError::OperationInFlight,
            };
        };

        on_phase(OperationPhase::Idle);
        match self.run(session, &request, &mut on_phase).await {
            Ok((summary, receipt)) => {
                on_phase(OperationPhase::Confirmed);
                log::info!(
                    "✅ {} confirmed in {} (block {:?})",
                    kind,
                    receipt.transaction_hash,
                    receipt.block_number
                );
                OperationOutcome::Confirmed { summary, receipt }
            }
            Err(error) => {
                on_phase(OperationPhase::Failed);
                log::error!("❌ {} failed [{}]: {}", kind, error.kind(), error);
                OperationOutcome::Failed { kind, error }
            }
        }
    }

    async fn run(
        &self,
        session: &Session,
        request: &Request<'_>,
        on_phase: &mut (impl FnMut(OperationPhase) + Send),
    ) -> Result<(OperationSummary, Receipt), StreamError> {
        let kind = request.kind();

        on_phase(OperationPhase::Resolving);
        let resolved = self.resolve(session).await?;

        on_phase(OperationPhase::Building);
        let (operation, receiver, flow_rate) = self.build(request, &resolved)?;

        on_phase(OperationPhase::Submitting);
        log::info!("{}", kind.progress_message());
        let signer = self.provider.signer();
        let receipt = operation.exec(signer.as_ref()).await?;
        if !receipt.success {
            return Err(StreamError::Reverted(receipt.transaction_hash));
        }

        let summary = OperationSummary {
            kind,
            network: network_name(resolved.chain_id),
            token_symbol: self.settings.token_symbol.clone(),
            sender: resolved.sender,
            receiver,
            flow_rate,
            transaction_hash: receipt.transaction_hash.clone(),
        };
        Ok((summary, receipt))
    }

    async fn resolve(&self, session: &Session) -> Result<Resolved, StreamError> {
        let chain_id = self.provider.chain_id().await?;
        if let Some(expected) = self.settings.expected_chain_id {
            if expected != chain_id {
                return Err(StreamError::WrongChain {
                    expected,
                    actual: chain_id,
                });
            }
        }

        let super_token = self
            .sdk
            .resolve_super_token(chain_id, &self.settings.token_symbol)
            .await?;

        let accounts = self.provider.request_accounts().await?;
        let sender = accounts
            .first()
            .copied()
            .ok_or_else(|| missing_account(chain_id))?;

        if let Some(current) = session.account() {
            if current != sender {
                log::warn!("{}", account_mismatch(&current, &sender));
            }
        }

        log::debug!(
            "resolved chain={} token={} sender={}",
            chain_id,
            super_token,
            sender
        );
        Ok(Resolved {
            chain_id,
            super_token,
            sender,
        })
    }

    fn build(
        &self,
        request: &Request<'_>,
        resolved: &Resolved,
    ) -> Result<(Box<dyn Operation>, Address, Option<FlowRate>), StreamError> {
        match request {
            Request::Stream(op) => {
                let flow = FlowDescriptor {
                    sender: resolved.sender,
                    receiver: op.recipient(),
                    flow_rate: op.flow_rate(),
                    super_token: resolved.super_token,
                };
                let operation = match op {
                    StreamOperation::Create { .. } => self.sdk.create_flow(&flow)?,
                    StreamOperation::Update { .. } => self.sdk.update_flow(&flow)?,
                    StreamOperation::Delete { .. } => self.sdk.delete_flow(&flow)?,
                };
                Ok((operation, flow.receiver, flow.flow_rate))
            }
            Request::Unwrap { super_app } => {
                let operation =
                    self.sdk
                        .unwrap(resolved.sender, *super_app, resolved.super_token)?;
                Ok((operation, *super_app, None))
            }
        }
    }
}
