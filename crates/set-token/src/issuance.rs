use std::sync::Arc;

use butter_wrappers::wrappers::basic_issuance_module::BasicIssuanceModule;
use ethers::{
    providers::Middleware,
    types::{Address, TransactionReceipt, U256},
};
use eyre::{eyre, Result};
use tracing::info;

use crate::{config::Configuration, tx::send};

/// Sends the manager-side calls of Set Protocol's `BasicIssuanceModule`.
pub struct BasicIssuanceModuleManager<M> {
    module: BasicIssuanceModule<M>,
    pre_issue_hook: Option<Address>,
}

impl<M: Middleware + 'static> BasicIssuanceModuleManager<M> {
    pub fn new(address: Address, client: Arc<M>) -> Self {
        Self {
            module: BasicIssuanceModule::new(address, client),
            pre_issue_hook: None,
        }
    }

    /// Binds the module configured in `configuration`, along with its
    /// pre-issue hook.
    pub fn from_configuration(configuration: &Configuration, client: Arc<M>) -> Result<Self> {
        let module = configuration
            .core
            .modules
            .basic_issuance_module
            .as_ref()
            .ok_or_else(|| eyre!("BasicIssuanceModule is not configured"))?;
        Ok(Self {
            module: BasicIssuanceModule::new(module.address, client),
            pre_issue_hook: module.pre_issue_hook,
        })
    }

    pub fn address(&self) -> Address {
        self.module.address()
    }

    pub fn contract(&self) -> &BasicIssuanceModule<M> {
        &self.module
    }

    /// Registers the module with `set_token`. Without a hook the configured
    /// one is used, and without either the zero address.
    pub async fn initialize(
        &self,
        set_token: Address,
        pre_issue_hook: Option<Address>,
    ) -> Result<TransactionReceipt> {
        let pre_issue_hook = pre_issue_hook
            .or(self.pre_issue_hook)
            .unwrap_or_else(Address::zero);
        info!(?set_token, ?pre_issue_hook, "initializing BasicIssuanceModule");
        send(self.module.initialize(set_token, pre_issue_hook)).await
    }

    pub async fn issue(
        &self,
        set_token: Address,
        quantity: U256,
        to: Address,
    ) -> Result<TransactionReceipt> {
        info!(?set_token, %quantity, ?to, "issuing set tokens");
        send(self.module.issue(set_token, quantity, to)).await
    }

    pub async fn redeem(
        &self,
        set_token: Address,
        quantity: U256,
        to: Address,
    ) -> Result<TransactionReceipt> {
        info!(?set_token, %quantity, ?to, "redeeming set tokens");
        send(self.module.redeem(set_token, quantity, to)).await
    }

    /// The components and amounts that must be supplied to issue `quantity`
    /// set tokens.
    pub async fn required_component_units_for_issue(
        &self,
        set_token: Address,
        quantity: U256,
    ) -> Result<(Vec<Address>, Vec<U256>)> {
        Ok(self
            .module
            .get_required_component_units_for_issue(set_token, quantity)
            .call()
            .await?)
    }
}
