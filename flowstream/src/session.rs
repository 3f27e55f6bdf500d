use crate::address::Address;

/// Per-session wallet context.
///
/// Written only by [`WalletConnector`](crate::connector::WalletConnector);
/// operations borrow it immutably, so a failed operation can never change
/// the connected account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    account: Option<Address>,
    chain_id: Option<u64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub(crate) fn set_account(&mut self, account: Address, chain_id: Option<u64>) {
        self.account = Some(account);
        if chain_id.is_some() {
            self.chain_id = chain_id;
        }
    }
}

/// Display name for a chain id.
pub fn network_name(chain_id: u64) -> String {
    let name = match chain_id {
        1 => "Ethereum",
        5 => "Goerli",
        10 => "Optimism",
        42 => "Kovan",
        100 => "Gnosis",
        137 => "Polygon",
        42161 => "Arbitrum One",
        43114 => "Avalanche C-Chain",
        80001 => "Mumbai",
        11155111 => "Sepolia",
        other => return format!("chain {}", other),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_disconnected() {
        let session = Session::new();
        assert!(!session.is_connected());
        assert_eq!(session.chain_id(), None);
    }

    #[test]
    fn test_set_account_keeps_known_chain() {
        let mut session = Session::new();
        let addr = Address::repeat_byte(1);
        session.set_account(addr, Some(42));
        session.set_account(addr, None);
        assert_eq!(session.account(), Some(addr));
        assert_eq!(session.chain_id(), Some(42));
    }

    #[test]
    fn test_network_names() {
        assert_eq!(network_name(42), "Kovan");
        assert_eq!(network_name(999_999), "chain 999999");
    }
}
