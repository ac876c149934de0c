use std::sync::Arc;

use butter_wrappers::wrappers::streaming_fee_module::{FeeState, StreamingFeeModule};
use ethers::{
    providers::Middleware,
    types::{Address, TransactionReceipt, U256},
};
use eyre::{eyre, Result};
use fixed_point::FixedPoint;
use tracing::info;

use crate::{
    config::{Configuration, FeeSettings},
    tx::send,
};

impl From<FeeSettings> for FeeState {
    fn from(settings: FeeSettings) -> Self {
        Self {
            fee_recipient: settings.fee_recipient,
            max_streaming_fee_percentage: settings.max_streaming_fee_percentage,
            streaming_fee_percentage: settings.streaming_fee_percentage,
            last_streaming_fee_timestamp: settings.last_streaming_fee_timestamp,
        }
    }
}

impl From<FeeState> for FeeSettings {
    fn from(state: FeeState) -> Self {
        Self {
            fee_recipient: state.fee_recipient,
            max_streaming_fee_percentage: state.max_streaming_fee_percentage,
            streaming_fee_percentage: state.streaming_fee_percentage,
            last_streaming_fee_timestamp: state.last_streaming_fee_timestamp,
        }
    }
}

/// Sends the manager-side calls of Set Protocol's `StreamingFeeModule`.
pub struct StreamingFeeModuleManager<M> {
    module: StreamingFeeModule<M>,
    settings: Option<FeeSettings>,
}

impl<M: Middleware + 'static> StreamingFeeModuleManager<M> {
    pub fn new(address: Address, client: Arc<M>, settings: Option<FeeSettings>) -> Self {
        Self {
            module: StreamingFeeModule::new(address, client),
            settings,
        }
    }

    pub fn from_configuration(configuration: &Configuration, client: Arc<M>) -> Result<Self> {
        let module = configuration
            .core
            .modules
            .streaming_fee_module
            .as_ref()
            .ok_or_else(|| eyre!("StreamingFeeModule is not configured"))?;
        Ok(Self::new(module.address, client, module.settings.clone()))
    }

    pub fn address(&self) -> Address {
        self.module.address()
    }

    pub fn settings(&self) -> Option<&FeeSettings> {
        self.settings.as_ref()
    }

    /// Registers the module with `set_token`, using `settings` or else the
    /// ones the manager was built with.
    pub async fn initialize(
        &self,
        set_token: Address,
        settings: Option<FeeSettings>,
    ) -> Result<TransactionReceipt> {
        let settings = settings
            .or_else(|| self.settings.clone())
            .ok_or_else(|| eyre!("no StreamingFeeModule settings to initialize with"))?;
        info!(
            ?set_token,
            fee_recipient = ?settings.fee_recipient,
            max_streaming_fee = %FixedPoint::from(settings.max_streaming_fee_percentage),
            streaming_fee = %FixedPoint::from(settings.streaming_fee_percentage),
            last_streaming_fee_timestamp = %settings.last_streaming_fee_timestamp,
            "initializing StreamingFeeModule"
        );
        send(self.module.initialize(set_token, settings.into())).await
    }

    /// Mints the fee accrued since the last accrual to the fee recipient.
    pub async fn accrue_fee(&self, set_token: Address) -> Result<TransactionReceipt> {
        info!(?set_token, "accruing streaming fee");
        send(self.module.accrue_fee(set_token)).await
    }

    pub async fn fee_state(&self, set_token: Address) -> Result<FeeSettings> {
        let (
            fee_recipient,
            max_streaming_fee_percentage,
            streaming_fee_percentage,
            last_streaming_fee_timestamp,
        ) = self.module.fee_states(set_token).call().await?;
        Ok(FeeSettings {
            fee_recipient,
            max_streaming_fee_percentage,
            streaming_fee_percentage,
            last_streaming_fee_timestamp,
        })
    }

    /// The fee, as a wad percentage of supply, that accruing now would mint.
    pub async fn fee(&self, set_token: Address) -> Result<FixedPoint> {
        Ok(self.module.get_fee(set_token).call().await?.into())
    }

    pub async fn update_fee_recipient(
        &self,
        set_token: Address,
        fee_recipient: Address,
    ) -> Result<TransactionReceipt> {
        info!(?set_token, ?fee_recipient, "updating fee recipient");
        send(self.module.update_fee_recipient(set_token, fee_recipient)).await
    }

    /// Changes the annual fee. The module accrues the old fee first and
    /// rejects fees above the maximum.
    pub async fn update_streaming_fee(
        &self,
        set_token: Address,
        streaming_fee: U256,
    ) -> Result<TransactionReceipt> {
        if let Some(settings) = &self.settings {
            if streaming_fee > settings.max_streaming_fee_percentage {
                return Err(eyre!(
                    "streaming fee {} exceeds the maximum {}",
                    FixedPoint::from(streaming_fee),
                    FixedPoint::from(settings.max_streaming_fee_percentage)
                ));
            }
        }
        info!(?set_token, streaming_fee = %FixedPoint::from(streaming_fee), "updating streaming fee");
        send(self.module.update_streaming_fee(set_token, streaming_fee)).await
    }
}

#[cfg(test)]
mod tests {
    use ethers::providers::Provider;
    use fixed_point_macros::uint256;

    use super::*;

    #[test]
    fn test_fee_state_conversion() {
        let settings = FeeSettings::new(Address::from_low_u64_be(0xfe));
        let state = FeeState::from(settings.clone());
        assert_eq!(state.fee_recipient, settings.fee_recipient);
        assert_eq!(state.streaming_fee_percentage, uint256!(0.01e18));
        assert_eq!(FeeSettings::from(state), settings);
    }

    #[tokio::test]
    async fn test_initialize_requires_settings() -> Result<()> {
        // Settings are checked before anything is sent.
        let provider = Arc::new(Provider::mocked().0);
        let manager =
            StreamingFeeModuleManager::new(Address::from_low_u64_be(0xf1), provider, None);
        assert!(manager
            .initialize(Address::from_low_u64_be(0x5e7), None)
            .await
            .is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_streaming_fee_above_maximum() -> Result<()> {
        let provider = Arc::new(Provider::mocked().0);
        let manager = StreamingFeeModuleManager::new(
            Address::from_low_u64_be(0xf1),
            provider,
            Some(FeeSettings::new(Address::from_low_u64_be(0xfe))),
        );
        assert!(manager
            .update_streaming_fee(Address::from_low_u64_be(0x5e7), uint256!(0.05e18))
            .await
            .is_err());
        Ok(())
    }
}
