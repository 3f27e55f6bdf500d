//! flowstream: create, update, and delete money streams, and unwrap super
//! tokens, through a connected wallet.
//!
//! - `WalletConnector` acquires the session account
//! - `flow_rate::to_monthly_display` projects a per-second rate to a month
//! - `StreamOperationClient` runs every operation through one guarded path
//! - `CfaForwarder` encodes the protocol calls for the CFAv1 forwarder

pub mod address;
pub mod client;
pub mod connector;
pub mod error;
pub mod flow_rate;
pub mod forwarder;
pub mod operation;
pub mod provider;
pub mod sdk;
pub mod session;
pub mod slot;

pub use address::{parse_address, short_address, Address};
pub use client::{ClientSettings, StreamOperationClient, DEFAULT_TOKEN_SYMBOL};
pub use connector::WalletConnector;
pub use error::StreamError;
pub use flow_rate::{to_monthly_display, FlowRate, MonthlyAmount};
pub use forwarder::{CfaForwarder, TokenEntry, CFA_V1_FORWARDER};
pub use operation::{
    FlowDescriptor, OperationKind, OperationOutcome, OperationPhase, OperationSummary, Receipt,
    StreamOperation, TransactionRequest,
};
pub use provider::{TransactionSigner, WalletProvider};
pub use sdk::{Operation, StreamingSdk};
pub use session::{network_name, Session};
pub use slot::{OperationSlot, SlotGuard};
