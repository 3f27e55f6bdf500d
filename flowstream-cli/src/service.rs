//! Background service task, a single `select!` loop.
//!
//! The service owns the wallet connector and the session. It receives
//! [`UiEvent`]s from the input loop and sends [`ServiceEvent`]s back.
//! Stream operations run in their own tasks so the loop stays responsive
//! while the wallet waits on the user; the client's slot rejects overlap.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use flowstream::{
    to_monthly_display, Address, CfaForwarder, OperationKind, OperationOutcome, OperationPhase,
    Session, StreamError, StreamOperation, StreamOperationClient, WalletConnector, WalletProvider,
};

use crate::config::Config;
use crate::events::{ServiceEvent, UiEvent};
use crate::rpc_wallet::RpcWallet;

/// Run the service loop until the cancellation token fires.
pub async fn run(
    token: CancellationToken,
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    config: Config,
) {
    let wallet = open_wallet(&config);
    let state = ServiceState::new(svc_tx, wallet, &config);
    run_loop(token, ui_rx, state).await;
}

fn open_wallet(config: &Config) -> Option<Arc<dyn WalletProvider>> {
    let endpoint = match config.wallet_endpoint() {
        Some(endpoint) => endpoint,
        None => {
            log::warn!("⚠️ No wallet endpoint configured");
            return None;
        }
    };

    match RpcWallet::new(&endpoint, config.receipt_poll_interval()) {
        Ok(wallet) => {
            log::info!("👛 Using wallet at {}", wallet.endpoint());
            Some(Arc::new(wallet))
        }
        Err(e) => {
            log::error!("Failed to create wallet client: {}", e);
            None
        }
    }
}

async fn run_loop(
    token: CancellationToken,
    mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    mut state: ServiceState,
) {
    // Account requests can wait on the user indefinitely.
    tokio::select! {
        _ = token.cancelled() => {
            log::info!("🛑 Service cancelled during startup account check");
            return;
        }
        _ = state.restore() => {}
    }

    log::info!("🚀 Service loop started");

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                log::info!("🛑 Service loop shutting down");
                break;
            }

            event = ui_rx.recv() => {
                match event {
                    Some(UiEvent::Shutdown) | None => {
                        log::info!("🛑 Shutdown requested");
                        token.cancel();
                        break;
                    }
                    Some(event) => {
                        let cancelled = tokio::select! {
                            _ = token.cancelled() => true,
                            _ = state.handle(event) => false,
                        };
                        if cancelled {
                            log::info!("🛑 Service loop cancelled while handling an event");
                            break;
                        }
                    }
                }
            }
        }
    }
}

struct ServiceState {
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    connector: WalletConnector,
    /// `None` when there is no wallet to sign with.
    client: Option<Arc<StreamOperationClient>>,
    session: Session,
    super_app: Option<Address>,
}

impl ServiceState {
    fn new(
        svc_tx: mpsc::UnboundedSender<ServiceEvent>,
        wallet: Option<Arc<dyn WalletProvider>>,
        config: &Config,
    ) -> Self {
        let (connector, client) = match wallet {
            Some(wallet) => {
                let sdk = Arc::new(CfaForwarder::new(config.tokens.clone()));
                let client =
                    StreamOperationClient::new(wallet.clone(), sdk, config.client_settings());
                (WalletConnector::new(wallet), Some(Arc::new(client)))
            }
            None => (WalletConnector::without_provider(), None),
        };

        Self {
            svc_tx,
            connector,
            client,
            session: Session::new(),
            super_app: config.super_app,
        }
    }

    fn send(&self, event: ServiceEvent) {
        let _ = self.svc_tx.send(event);
    }

    async fn restore(&mut self) {
        match self.connector.restore(&mut self.session).await {
            Ok(Some(account)) => self.send(ServiceEvent::Connected {
                account,
                chain_id: self.session.chain_id(),
            }),
            Ok(None) => self.send(ServiceEvent::NoAccount),
            Err(StreamError::NoProvider) => {
                self.send(ServiceEvent::Error(StreamError::NoProvider.to_string()))
            }
            Err(e) => {
                log::warn!("Startup account check failed: {}", e);
                self.send(ServiceEvent::NoAccount);
            }
        }
    }

    async fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Connect => self.connect().await,

            UiEvent::FlowRateInput(input) => match to_monthly_display(&input) {
                Ok(monthly) => self.send(ServiceEvent::FlowRateDisplay(monthly.to_string())),
                Err(e) => {
                    log::debug!("flow rate input {:?}: {}", input, e);
                    self.send(ServiceEvent::Error(
                        "You can only calculate a flowRate based on a number".to_string(),
                    ));
                }
            },

            UiEvent::Execute(op) => self.spawn_operation(Some(op)),

            UiEvent::Unwrap => self.spawn_operation(None),

            // Handled by the loop.
            UiEvent::Shutdown => {}
        }
    }

    async fn connect(&mut self) {
        match self.connector.connect(&mut self.session).await {
            Ok(account) => self.send(ServiceEvent::Connected {
                account,
                chain_id: self.session.chain_id(),
            }),
            Err(e) => self.send(ServiceEvent::Error(e.to_string())),
        }
    }

    /// `None` means unwrap.
    fn spawn_operation(&self, op: Option<StreamOperation>) {
        let kind = op
            .as_ref()
            .map(StreamOperation::kind)
            .unwrap_or(OperationKind::Unwrap);

        let Some(client) = self.client.clone() else {
            self.send(ServiceEvent::OperationFinished(OperationOutcome::Failed {
                kind,
                error: StreamError::NoProvider,
            }));
            return;
        };

        let job = match (op, self.super_app) {
            (Some(op), _) => Job::Stream(op),
            (None, Some(app)) => Job::Unwrap(app),
            (None, None) => {
                self.send(ServiceEvent::Error(
                    "No super app configured for unwrap".to_string(),
                ));
                return;
            }
        };

        let session = self.session.clone();
        let tx = self.svc_tx.clone();

        tokio::spawn(async move {
            let phase_tx = tx.clone();
            let on_phase = move |phase: OperationPhase| {
                let event = match phase {
                    OperationPhase::Idle => ServiceEvent::OperationStarted(kind),
                    phase => ServiceEvent::Phase(kind, phase),
                };
                let _ = phase_tx.send(event);
            };

            let outcome = match job {
                Job::Stream(op) => client.execute_observed(&session, &op, on_phase).await,
                Job::Unwrap(app) => client.unwrap_observed(&session, app, on_phase).await,
            };
            let _ = tx.send(ServiceEvent::OperationFinished(outcome));
        });
    }
}

enum Job {
    Stream(StreamOperation),
    Unwrap(Address),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use flowstream::{FlowRate, Receipt, TransactionRequest, TransactionSigner};

    struct StubWallet {
        accounts: Vec<Address>,
    }

    #[async_trait]
    impl WalletProvider for StubWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>, StreamError> {
            Ok(self.accounts.clone())
        }

        async fn chain_id(&self) -> Result<u64, StreamError> {
            Ok(42)
        }

        fn signer(&self) -> Arc<dyn TransactionSigner> {
            Arc::new(StubSigner)
        }
    }

    /// Answers the first `answered` account requests with no accounts and
    /// leaves every later prompt open forever.
    struct UnansweredWallet {
        answered: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WalletProvider for UnansweredWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>, StreamError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.answered {
                return Ok(vec![]);
            }
            std::future::pending().await
        }

        async fn chain_id(&self) -> Result<u64, StreamError> {
            Ok(42)
        }

        fn signer(&self) -> Arc<dyn TransactionSigner> {
            Arc::new(StubSigner)
        }
    }

    struct StubSigner;

    #[async_trait]
    impl TransactionSigner for StubSigner {
        async fn send_transaction(&self, _tx: &TransactionRequest) -> Result<Receipt, StreamError> {
            Ok(Receipt {
                transaction_hash: "0x01".into(),
                block_number: Some(1),
                success: true,
            })
        }
    }

    fn state(
        wallet: Option<Arc<dyn WalletProvider>>,
        config: &Config,
    ) -> (ServiceState, mpsc::UnboundedReceiver<ServiceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ServiceState::new(tx, wallet, config), rx)
    }

    fn account() -> Address {
        Address::repeat_byte(0xaa)
    }

    #[tokio::test]
    async fn test_flow_rate_input() {
        let (mut state, mut rx) = state(None, &Config::default());

        state.handle(UiEvent::FlowRateInput("1000".into())).await;
        match rx.recv().await {
            Some(ServiceEvent::FlowRateDisplay(s)) => assert_eq!(s, "0.000000002592"),
            other => panic!("unexpected event: {:?}", other),
        }

        state.handle(UiEvent::FlowRateInput("abc".into())).await;
        assert!(matches!(rx.recv().await, Some(ServiceEvent::Error(_))));
    }

    #[tokio::test]
    async fn test_operation_without_wallet_fails_fast() {
        let (mut state, mut rx) = state(None, &Config::default());

        state
            .handle(UiEvent::Execute(StreamOperation::Delete {
                recipient: account(),
            }))
            .await;

        match rx.recv().await {
            Some(ServiceEvent::OperationFinished(outcome)) => {
                assert_eq!(outcome.error(), Some(&StreamError::NoProvider));
                assert_eq!(outcome.kind(), OperationKind::Delete);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_restore_and_create() {
        let wallet: Arc<dyn WalletProvider> = Arc::new(StubWallet {
            accounts: vec![account()],
        });
        let (mut state, mut rx) = state(Some(wallet), &Config::default());

        state.restore().await;
        assert!(matches!(
            rx.recv().await,
            Some(ServiceEvent::Connected { account: a, chain_id: Some(42) }) if a == account()
        ));

        state
            .handle(UiEvent::Execute(StreamOperation::Create {
                recipient: Address::repeat_byte(0xbe),
                flow_rate: FlowRate::new(1000).unwrap(),
            }))
            .await;

        assert!(matches!(
            rx.recv().await,
            Some(ServiceEvent::OperationStarted(OperationKind::Create))
        ));
        loop {
            match rx.recv().await {
                Some(ServiceEvent::Phase(_, _)) => continue,
                Some(ServiceEvent::OperationFinished(outcome)) => {
                    assert_eq!(outcome.phase(), OperationPhase::Confirmed);
                    break;
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_restore_without_accounts() {
        let wallet: Arc<dyn WalletProvider> = Arc::new(StubWallet { accounts: vec![] });
        let (mut state, mut rx) = state(Some(wallet), &Config::default());

        state.restore().await;
        assert!(matches!(rx.recv().await, Some(ServiceEvent::NoAccount)));
        assert!(!state.session.is_connected());
    }

    #[tokio::test]
    async fn test_unwrap_requires_super_app() {
        let wallet: Arc<dyn WalletProvider> = Arc::new(StubWallet {
            accounts: vec![account()],
        });
        let config = Config {
            super_app: None,
            ..Config::default()
        };
        let (mut state, mut rx) = state(Some(wallet), &config);

        state.handle(UiEvent::Unwrap).await;
        assert!(matches!(rx.recv().await, Some(ServiceEvent::Error(_))));
    }

    #[tokio::test]
    async fn test_shutdown_during_startup_prompt() {
        let wallet: Arc<dyn WalletProvider> = Arc::new(UnansweredWallet {
            answered: 0,
            calls: AtomicUsize::new(0),
        });
        let (state, _rx) = state(Some(wallet), &Config::default());
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        let service = tokio::spawn(run_loop(token.clone(), ui_rx, state));

        ui_tx.send(UiEvent::Shutdown).unwrap();
        token.cancel();

        let finished = tokio::time::timeout(Duration::from_secs(2), service).await;
        assert!(finished.is_ok(), "service loop did not stop");
    }

    #[tokio::test]
    async fn test_shutdown_during_connect_prompt() {
        let wallet: Arc<dyn WalletProvider> = Arc::new(UnansweredWallet {
            answered: 1,
            calls: AtomicUsize::new(0),
        });
        let (state, mut rx) = state(Some(wallet), &Config::default());
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        let service = tokio::spawn(run_loop(token.clone(), ui_rx, state));
        assert!(matches!(rx.recv().await, Some(ServiceEvent::NoAccount)));

        ui_tx.send(UiEvent::Connect).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        ui_tx.send(UiEvent::Shutdown).unwrap();
        token.cancel();

        let finished = tokio::time::timeout(Duration::from_secs(2), service).await;
        assert!(finished.is_ok(), "service loop did not stop");
    }
}
