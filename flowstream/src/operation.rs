//! Operation values: what the user asked for, what gets built from it, and
//! how it ended.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::error::StreamError;
use crate::flow_rate::FlowRate;

/// One user-triggered stream change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamOperation {
    Create {
        recipient: Address,
        flow_rate: FlowRate,
    },
    Update {
        recipient: Address,
        flow_rate: FlowRate,
    },
    Delete {
        recipient: Address,
    },
}

impl StreamOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            StreamOperation::Create { .. } => OperationKind::Create,
            StreamOperation::Update { .. } => OperationKind::Update,
            StreamOperation::Delete { .. } => OperationKind::Delete,
        }
    }

    pub fn recipient(&self) -> Address {
        match self {
            StreamOperation::Create { recipient, .. }
            | StreamOperation::Update { recipient, .. }
            | StreamOperation::Delete { recipient } => *recipient,
        }
    }

    pub fn flow_rate(&self) -> Option<FlowRate> {
        match self {
            StreamOperation::Create { flow_rate, .. }
            | StreamOperation::Update { flow_rate, .. } => Some(*flow_rate),
            StreamOperation::Delete { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Unwrap,
}

impl OperationKind {
    /// Progress line printed while the transaction is out.
    pub fn progress_message(&self) -> &'static str {
        match self {
            OperationKind::Create => "Creating your stream...",
            OperationKind::Update => "Updating your stream...",
            OperationKind::Delete => "Deleting your stream...",
            OperationKind::Unwrap => "Unwrapping super token...",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            OperationKind::Create => "created a new",
            OperationKind::Update => "updated a",
            OperationKind::Delete => "deleted your",
            OperationKind::Unwrap => "unwrapped your",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Unwrap => "unwrap",
        };
        f.write_str(name)
    }
}

/// Parameters handed to the protocol for a single flow change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDescriptor {
    pub sender: Address,
    pub receiver: Address,
    /// `None` for deletes.
    pub flow_rate: Option<FlowRate>,
    pub super_token: Address,
}

/// A contract call ready for the wallet to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
}

impl TransactionRequest {
    pub fn data_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.data))
    }
}

/// Mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Where an operation attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    Idle,
    Resolving,
    Building,
    Submitting,
    Confirmed,
    Failed,
}

impl OperationPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationPhase::Confirmed | OperationPhase::Failed)
    }
}

/// Human-readable record of a confirmed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSummary {
    pub kind: OperationKind,
    pub network: String,
    pub token_symbol: String,
    pub sender: Address,
    /// Stream receiver, or the app contract for an unwrap.
    pub receiver: Address,
    pub flow_rate: Option<FlowRate>,
    pub transaction_hash: String,
}

pub const DASHBOARD_URL: &str = "https://app.superfluid.finance/dashboard";

impl fmt::Display for OperationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.kind == OperationKind::Unwrap {
            "super token"
        } else {
            "money stream"
        };
        writeln!(f, "Congrats - you've just {} {}!", self.kind.past_tense(), noun)?;
        if matches!(self.kind, OperationKind::Create | OperationKind::Update) {
            writeln!(
                f,
                "View Your Stream At: {}/{}",
                DASHBOARD_URL,
                self.receiver.to_checksum(None)
            )?;
        }
        writeln!(f, "Network: {}", self.network)?;
        writeln!(f, "Super Token: {}", self.token_symbol)?;
        writeln!(f, "Sender: {}", self.sender.to_checksum(None))?;
        writeln!(f, "Receiver: {}", self.receiver.to_checksum(None))?;
        if let Some(rate) = self.flow_rate {
            let label = if self.kind == OperationKind::Update {
                "New FlowRate"
            } else {
                "FlowRate"
            };
            writeln!(f, "{}: {}", label, rate)?;
        }
        write!(f, "Transaction: {}", self.transaction_hash)
    }
}

/// Terminal state of one operation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Confirmed {
        summary: OperationSummary,
        receipt: Receipt,
    },
    Failed {
        kind: OperationKind,
        error: StreamError,
    },
}

impl OperationOutcome {
    pub fn phase(&self) -> OperationPhase {
        match self {
            OperationOutcome::Confirmed { .. } => OperationPhase::Confirmed,
            OperationOutcome::Failed { .. } => OperationPhase::Failed,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            OperationOutcome::Confirmed { summary, .. } => summary.kind,
            OperationOutcome::Failed { kind, .. } => *kind,
        }
    }

    pub fn error(&self) -> Option<&StreamError> {
        match self {
            OperationOutcome::Failed { error, .. } => Some(error),
            OperationOutcome::Confirmed { .. } => None,
        }
    }

    /// The line shown to the user for this outcome.
    pub fn message(&self) -> String {
        match self {
            OperationOutcome::Confirmed { summary, .. } => summary.to_string(),
            OperationOutcome::Failed { kind, error } => failure_message(*kind, error),
        }
    }
}

fn failure_message(kind: OperationKind, error: &StreamError) -> String {
    match (kind, error) {
        (_, StreamError::OperationInFlight) => {
            "Please wait for the current transaction to finish.".to_string()
        }
        (OperationKind::Update | OperationKind::Delete, _) => format!(
            "Hmmm, your transaction threw an error. Make sure that this stream already \
             exists, and that you've entered a valid Ethereum address! ({})",
            error
        ),
        (OperationKind::Unwrap, _) => format!("Error unwrapping super token: {}", error),
        _ => format!("Hmmm, your transaction threw an error: {}", error),
    }
}
