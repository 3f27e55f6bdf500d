use thiserror::Error;

use crate::address::{short_address, Address};

/// Every failure a stream operation or wallet connection can end in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("No wallet provider found. Ensure you have a wallet running")]
    NoProvider,

    #[error("The request was rejected in the wallet")]
    UserRejected,

    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Flow does not exist")]
    FlowNotFound,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Super token {symbol} is not known on chain {chain_id}")]
    TokenNotFound { symbol: String, chain_id: u64 },

    #[error("Wallet is on chain {actual}, expected chain {expected}")]
    WrongChain { expected: u64, actual: u64 },

    #[error("Another operation is still in flight")]
    OperationInFlight,

    #[error("Transaction {0} reverted")]
    Reverted(String),

    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<String>,
    },
}

impl StreamError {
    pub fn wallet_unavailable(reason: impl Into<String>) -> Self {
        Self::WalletUnavailable(reason.into())
    }

    /// Short machine-friendly tag, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoProvider => "no_provider",
            Self::UserRejected => "user_rejected",
            Self::WalletUnavailable(_) => "wallet_unavailable",
            Self::InvalidNumber(_) => "invalid_number",
            Self::FlowNotFound => "flow_not_found",
            Self::InvalidAddress(_) => "invalid_address",
            Self::TokenNotFound { .. } => "token_not_found",
            Self::WrongChain { .. } => "wrong_chain",
            Self::OperationInFlight => "operation_in_flight",
            Self::Reverted(_) => "reverted",
            Self::Rpc { .. } => "rpc",
        }
    }
}

/// The wallet answered but reported no authorized account.
pub(crate) fn missing_account(chain_id: u64) -> StreamError {
    StreamError::wallet_unavailable(format!("no authorized account on chain {}", chain_id))
}

pub(crate) fn account_mismatch(session: &Address, wallet: &Address) -> String {
    format!(
        "session account {} differs from wallet account {}",
        short_address(session),
        short_address(wallet)
    )
}
