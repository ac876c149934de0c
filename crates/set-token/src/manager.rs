use std::sync::Arc;

use ethers::{providers::Middleware, types::Address};
use eyre::Result;
use tracing::info;

use crate::{
    config::{Configuration, Module},
    created_address::find_created_set_token,
    creator::SetTokenCreator,
    issuance::BasicIssuanceModuleManager,
    streaming_fee::StreamingFeeModuleManager,
};

/// Creates a set token and brings its modules online.
pub struct SetTokenManager<M> {
    client: Arc<M>,
    configuration: Configuration,
}

impl<M: Middleware + 'static> SetTokenManager<M> {
    pub fn new(client: Arc<M>, configuration: Configuration) -> Self {
        Self {
            client,
            configuration,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Creates the token, reads its address from the creation logs and
    /// initializes every configured module. Returns the new token.
    pub async fn create_set(&self, debug: bool) -> Result<Address> {
        info!("creating set");
        let creator = SetTokenCreator::new(self.client.clone(), self.configuration.clone(), debug);
        let receipt = creator.create().await?;

        info!("getting newly created token set address");
        let set_token =
            find_created_set_token(self.client.as_ref(), Some(receipt.transaction_hash)).await?;
        info!(?set_token, "token set address");

        info!("initializing modules");
        self.initialize_modules(set_token).await?;
        info!(?set_token, "created token set");

        Ok(set_token)
    }

    /// Initializes the configured modules one after another. Each
    /// initialization is confirmed before the next one is sent.
    pub async fn initialize_modules(&self, set_token: Address) -> Result<()> {
        for module in self.configuration.modules() {
            match module {
                Module::BasicIssuance(_) => {
                    BasicIssuanceModuleManager::from_configuration(
                        &self.configuration,
                        self.client.clone(),
                    )?
                    .initialize(set_token, None)
                    .await?;
                }
                Module::StreamingFee(_) => {
                    StreamingFeeModuleManager::from_configuration(
                        &self.configuration,
                        self.client.clone(),
                    )?
                    .initialize(set_token, None)
                    .await?;
                }
            }
        }
        Ok(())
    }
}
