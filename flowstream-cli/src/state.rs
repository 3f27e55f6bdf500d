//! Application state, plain data with no async.
//!
//! `AppState` holds everything the terminal needs to render. The service task
//! sends `ServiceEvent`s which are applied via `AppState::apply()`.

use flowstream::{network_name, short_address, Address, OperationKind, OperationPhase, StreamError};

use crate::events::ServiceEvent;

#[derive(Debug, Default)]
pub struct AppState {
    // -- Wallet --
    pub current_account: Option<Address>,
    pub chain_id: Option<u64>,

    // -- Flow rate calculator --
    pub flow_rate_display: String,

    // -- Operations --
    /// The operation currently running and the phase it is in.
    pub pending: Option<(OperationKind, OperationPhase)>,

    // -- Feedback --
    pub success_message: Option<String>,
    pub error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            flow_rate_display: "0".to_string(),
            ..Self::default()
        }
    }

    /// Apply a service event to the state.
    pub fn apply(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::Connected { account, chain_id } => {
                self.current_account = Some(account);
                if chain_id.is_some() {
                    self.chain_id = chain_id;
                }
                self.error = None;
            }

            ServiceEvent::NoAccount => {}

            ServiceEvent::FlowRateDisplay(display) => {
                self.flow_rate_display = display;
                self.error = None;
            }

            ServiceEvent::OperationStarted(kind) => {
                self.pending = Some((kind, OperationPhase::Idle));
                self.success_message = None;
                self.error = None;
            }

            ServiceEvent::Phase(kind, phase) => {
                if !phase.is_terminal() {
                    self.pending = Some((kind, phase));
                }
            }

            ServiceEvent::OperationFinished(outcome) => {
                // A rejected overlap must not clear the running operation.
                let rejected = matches!(
                    outcome.error(),
                    Some(StreamError::OperationInFlight)
                );
                if !rejected {
                    self.pending = None;
                }
                match outcome.error() {
                    None => {
                        self.success_message = Some(outcome.message());
                        self.error = None;
                    }
                    Some(_) => self.error = Some(outcome.message()),
                }
            }

            ServiceEvent::Error(msg) => {
                self.error = Some(msg);
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// `Connected: 0xAb...1234` or `Connect Wallet`.
    pub fn account_badge(&self) -> String {
        match self.current_account {
            Some(account) => match self.chain_id {
                Some(chain_id) => format!(
                    "Connected: {} ({})",
                    short_address(&account),
                    network_name(chain_id)
                ),
                None => format!("Connected: {}", short_address(&account)),
            },
            None => "Connect Wallet".to_string(),
        }
    }
}
