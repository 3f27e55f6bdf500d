//! Event types for communication between the terminal and the service task.
//!
//! These two enums are the only interface between the input loop and the
//! asynchronous service task.

use flowstream::{Address, OperationKind, OperationOutcome, OperationPhase, StreamOperation};

// ============================================================================
// UI → Service
// ============================================================================

/// Commands sent from the input loop to the background service task.
#[derive(Debug)]
pub enum UiEvent {
    /// Ask the wallet for account access.
    Connect,

    /// The flow rate field changed; recompute the monthly projection.
    FlowRateInput(String),

    /// Create, update or delete a stream.
    Execute(StreamOperation),

    /// Unwrap the configured super token through the app contract.
    Unwrap,

    /// Clean shutdown.
    Shutdown,
}

// ============================================================================
// Service → UI
// ============================================================================

/// Events sent from the service task back to the input loop.
#[derive(Debug)]
pub enum ServiceEvent {
    /// The wallet authorized an account.
    Connected {
        account: Address,
        chain_id: Option<u64>,
    },

    /// Startup check found no authorized account.
    NoAccount,

    /// Projected monthly amount for the current flow rate input.
    FlowRateDisplay(String),

    /// An operation was accepted and is now running.
    OperationStarted(OperationKind),

    /// A running operation entered a new phase.
    Phase(OperationKind, OperationPhase),

    /// An operation reached a terminal state.
    OperationFinished(OperationOutcome),

    /// Something went wrong outside an operation.
    Error(String),
}
