//! Wallet seam.
//!
//! The wallet holds the keys. This crate only ever asks it for accounts, the
//! chain it is on, and a signer that can push a transaction through.

use async_trait::async_trait;
use std::sync::Arc;

use crate::address::Address;
use crate::error::StreamError;
use crate::operation::{Receipt, TransactionRequest};

/// An EIP-1193 style wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask for account access. The wallet may prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, StreamError>;

    /// Chain the wallet is currently connected to.
    async fn chain_id(&self) -> Result<u64, StreamError>;

    /// Signer for the wallet's active account.
    fn signer(&self) -> Arc<dyn TransactionSigner>;
}

/// Authorizes, broadcasts, and waits for a transaction to be mined.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<Receipt, StreamError>;
}
