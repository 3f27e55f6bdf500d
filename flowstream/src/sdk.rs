//! Streaming-payments protocol seam.

use async_trait::async_trait;

use crate::address::Address;
use crate::error::StreamError;
use crate::operation::{FlowDescriptor, Receipt};
use crate::provider::TransactionSigner;

/// A built protocol call waiting for a signature.
#[async_trait]
pub trait Operation: Send + Sync {
    async fn exec(&self, signer: &dyn TransactionSigner) -> Result<Receipt, StreamError>;
}

/// Builds flow operations against the protocol deployed on a chain.
#[async_trait]
pub trait StreamingSdk: Send + Sync {
    /// Look up the super token registered under `symbol` on `chain_id`.
    async fn resolve_super_token(&self, chain_id: u64, symbol: &str)
        -> Result<Address, StreamError>;

    fn create_flow(&self, flow: &FlowDescriptor) -> Result<Box<dyn Operation>, StreamError>;

    fn update_flow(&self, flow: &FlowDescriptor) -> Result<Box<dyn Operation>, StreamError>;

    fn delete_flow(&self, flow: &FlowDescriptor) -> Result<Box<dyn Operation>, StreamError>;

    /// Unwrap a super token through an app contract that exposes
    /// `unwrap(address)`.
    fn unwrap(
        &self,
        sender: Address,
        super_app: Address,
        super_token: Address,
    ) -> Result<Box<dyn Operation>, StreamError>;
}
