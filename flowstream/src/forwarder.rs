//! [`StreamingSdk`] backed by the protocol's CFAv1 forwarder contract.
//!
//! Flow changes are plain contract calls to the forwarder, signed by the
//! wallet. Super tokens are looked up in a table keyed by chain and symbol.

use alloy_primitives::{address, Bytes};
use alloy_sol_types::{sol, SolCall, SolError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::address::Address;
use crate::error::StreamError;
use crate::flow_rate::FlowRate;
use crate::operation::{FlowDescriptor, Receipt, TransactionRequest};
use crate::provider::TransactionSigner;
use crate::sdk::{Operation, StreamingSdk};

sol! {
    interface ICFAv1Forwarder {
        function createFlow(address token, address sender, address receiver, int96 flowrate, bytes userData) external returns (bool);
        function updateFlow(address token, address sender, address receiver, int96 flowrate, bytes userData) external returns (bool);
        function deleteFlow(address token, address sender, address receiver, bytes userData) external returns (bool);
    }

    interface ISuperApp {
        function unwrap(address token) external;
    }

    error CFA_FLOW_DOES_NOT_EXIST();
}

/// Forwarder deployment address, identical on every supported network.
pub const CFA_V1_FORWARDER: Address = address!("cfA132E353cB4E398080B9700609bb008eceB125");

/// A super token known on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub chain_id: u64,
    pub symbol: String,
    pub address: Address,
}

pub struct CfaForwarder {
    forwarder: Address,
    tokens: HashMap<(u64, String), Address>,
}

impl CfaForwarder {
    pub fn new(tokens: impl IntoIterator<Item = TokenEntry>) -> Self {
        Self::with_forwarder(CFA_V1_FORWARDER, tokens)
    }

    pub fn with_forwarder(forwarder: Address, tokens: impl IntoIterator<Item = TokenEntry>) -> Self {
        let tokens = tokens
            .into_iter()
            .map(|t| ((t.chain_id, t.symbol), t.address))
            .collect();
        Self { forwarder, tokens }
    }

    pub fn forwarder(&self) -> Address {
        self.forwarder
    }

    fn call(&self, from: Address, to: Address, data: Vec<u8>) -> Box<dyn Operation> {
        Box::new(ContractCall {
            request: TransactionRequest { from, to, data },
        })
    }
}

#[async_trait]
impl StreamingSdk for CfaForwarder {
    async fn resolve_super_token(
        &self,
        chain_id: u64,
        symbol: &str,
    ) -> Result<Address, StreamError> {
        self.tokens
            .get(&(chain_id, symbol.to_string()))
            .copied()
            .ok_or_else(|| StreamError::TokenNotFound {
                symbol: symbol.to_string(),
                chain_id,
            })
    }

    fn create_flow(&self, flow: &FlowDescriptor) -> Result<Box<dyn Operation>, StreamError> {
        let data = ICFAv1Forwarder::createFlowCall {
            token: flow.super_token,
            sender: flow.sender,
            receiver: flow.receiver,
            flowrate: require_rate(flow)?.to_int96(),
            userData: Bytes::new(),
        }
        .abi_encode();
        Ok(self.call(flow.sender, self.forwarder, data))
    }

    fn update_flow(&self, flow: &FlowDescriptor) -> Result<Box<dyn Operation>, StreamError> {
        let data = ICFAv1Forwarder::updateFlowCall {
            token: flow.super_token,
            sender: flow.sender,
            receiver: flow.receiver,
            flowrate: require_rate(flow)?.to_int96(),
            userData: Bytes::new(),
        }
        .abi_encode();
        Ok(self.call(flow.sender, self.forwarder, data))
    }

    /// Any rate on the descriptor is ignored.
    fn delete_flow(&self, flow: &FlowDescriptor) -> Result<Box<dyn Operation>, StreamError> {
        let data = ICFAv1Forwarder::deleteFlowCall {
            token: flow.super_token,
            sender: flow.sender,
            receiver: flow.receiver,
            userData: Bytes::new(),
        }
        .abi_encode();
        Ok(self.call(flow.sender, self.forwarder, data))
    }

    fn unwrap(
        &self,
        sender: Address,
        super_app: Address,
        super_token: Address,
    ) -> Result<Box<dyn Operation>, StreamError> {
        let data = ISuperApp::unwrapCall { token: super_token }.abi_encode();
        Ok(self.call(sender, super_app, data))
    }
}

fn require_rate(flow: &FlowDescriptor) -> Result<FlowRate, StreamError> {
    flow.flow_rate
        .ok_or_else(|| StreamError::InvalidNumber("flow rate is required".into()))
}

/// A single signed contract call.
struct ContractCall {
    request: TransactionRequest,
}

#[async_trait]
impl Operation for ContractCall {
    async fn exec(&self, signer: &dyn TransactionSigner) -> Result<Receipt, StreamError> {
        log::debug!(
            "→ call {} data={}",
            self.request.to,
            self.request.data_hex()
        );
        signer
            .send_transaction(&self.request)
            .await
            .map_err(classify_revert)
    }
}

/// Turn a revert of a missing flow into [`StreamError::FlowNotFound`].
///
/// Nodes report the revert either as raw data on the RPC error or, when they
/// decode it themselves, as the error name inside the message.
pub fn classify_revert(err: StreamError) -> StreamError {
    match &err {
        StreamError::Rpc { message, data, .. } => {
            let by_data = data.as_deref().map(is_missing_flow).unwrap_or(false);
            if by_data || message.contains("CFA_FLOW_DOES_NOT_EXIST") {
                StreamError::FlowNotFound
            } else {
                err
            }
        }
        _ => err,
    }
}

/// Does the hex revert data start with the `CFA_FLOW_DOES_NOT_EXIST()` selector?
fn is_missing_flow(revert_data: &str) -> bool {
    let digits = revert_data.trim().trim_start_matches("0x");
    match hex::decode(digits.get(..8).unwrap_or_default()) {
        Ok(prefix) => prefix[..] == CFA_FLOW_DOES_NOT_EXIST::SELECTOR[..],
        Err(_) => false,
    }
}
