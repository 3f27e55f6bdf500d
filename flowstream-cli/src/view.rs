//! Text rendering for the terminal front end.

use flowstream::{OperationOutcome, OperationPhase};

use crate::events::ServiceEvent;
use crate::state::AppState;

pub const HELP: &str = "\
Commands:
  connect                         connect your wallet
  create <recipient> <flow rate>  start a stream (flow rate in wei per second)
  update <recipient> <flow rate>  change the rate of an existing stream
  delete <recipient>              stop a stream
  rate <amount>                   preview the monthly amount for a flow rate
  unwrap                          unwrap the super token through the app
  status                          show wallet and operation status
  help                            show this help
  quit                            exit";

/// Line printed for a service event, if any.
pub fn describe(event: &ServiceEvent) -> Option<String> {
    match event {
        ServiceEvent::Connected { account, .. } => Some(format!("🔗 Connected: {}", account)),
        ServiceEvent::NoAccount => Some("No authorized account found".to_string()),
        ServiceEvent::FlowRateDisplay(monthly) => {
            Some(format!("Your flow will be equal to: {} per month", monthly))
        }
        ServiceEvent::OperationStarted(kind) => Some(kind.progress_message().to_string()),
        ServiceEvent::Phase(_, phase) => match phase {
            OperationPhase::Submitting => Some("Waiting for your wallet...".to_string()),
            _ => None,
        },
        ServiceEvent::OperationFinished(outcome) => Some(match outcome {
            OperationOutcome::Confirmed { .. } => format!("✅ {}", outcome.message()),
            OperationOutcome::Failed { .. } => format!("❌ {}", outcome.message()),
        }),
        ServiceEvent::Error(msg) => Some(format!("❌ {}", msg)),
    }
}

pub fn status(state: &AppState) -> String {
    let mut out = state.account_badge();
    out.push_str(&format!("\nMonthly preview: {}", state.flow_rate_display));
    match state.pending {
        Some((kind, phase)) => out.push_str(&format!("\nRunning: {} ({:?})", kind, phase)),
        None => out.push_str("\nNo operation running"),
    }
    if let Some(msg) = state.error.as_ref().or(state.success_message.as_ref()) {
        out.push_str(&format!("\nLast result: {}", msg));
    }
    out
}

pub fn prompt(state: &AppState) -> String {
    if state.is_loading() {
        "flowstream (busy)> ".to_string()
    } else {
        "flowstream> ".to_string()
    }
}
