//! Wallet connection.

use std::sync::Arc;

use crate::address::{short_address, Address};
use crate::error::StreamError;
use crate::provider::WalletProvider;
use crate::session::Session;

pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
}

impl WalletConnector {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A connector for an environment with no wallet at all. Every call
    /// fails with [`StreamError::NoProvider`].
    pub fn without_provider() -> Self {
        Self { provider: None }
    }

    pub fn provider(&self) -> Result<&Arc<dyn WalletProvider>, StreamError> {
        self.provider.as_ref().ok_or(StreamError::NoProvider)
    }

    /// Request account access and make the first authorized account the
    /// session's current account.
    ///
    /// The session is only touched on success.
    pub async fn connect(&self, session: &mut Session) -> Result<Address, StreamError> {
        self.adopt_first_account(session)
            .await?
            .ok_or_else(|| StreamError::wallet_unavailable("wallet returned no accounts"))
    }

    /// Startup check: pick up an already-authorized account if there is one.
    ///
    /// Unlike [`connect`](Self::connect), an empty account list is not an
    /// error.
    pub async fn restore(&self, session: &mut Session) -> Result<Option<Address>, StreamError> {
        let account = self.adopt_first_account(session).await?;
        match account {
            Some(account) => log::info!("Found an authorized account: {}", account),
            None => log::info!("No authorized account found"),
        }
        Ok(account)
    }

    async fn adopt_first_account(
        &self,
        session: &mut Session,
    ) -> Result<Option<Address>, StreamError> {
        let provider = self.provider()?;
        let accounts = provider.request_accounts().await.map_err(|e| {
            log::warn!("Error connecting to wallet: {}", e);
            e
        })?;

        let Some(account) = accounts.first().copied() else {
            return Ok(None);
        };

        let chain_id = match provider.chain_id().await {
            Ok(id) => {
                log::info!("chain ID: {}", id);
                Some(id)
            }
            Err(e) => {
                log::warn!("Could not read chain ID: {}", e);
                None
            }
        };

        session.set_account(account, chain_id);
        log::info!("✅ Connected wallet {}", short_address(&account));
        Ok(Some(account))
    }

    /// Chain the wallet is on. Diagnostic only.
    pub async fn active_chain(&self) -> Result<u64, StreamError> {
        self.provider()?.chain_id().await
    }
}
