//! Simulates Synthetix atomic exchanges on a mainnet fork: sUSD is swapped into
//! a target synth at regular block intervals and the amount received is
//! logged.

use std::{env, sync::Arc};

use butter_addresses::{ButterAddresses, S_AUD, S_EUR, S_GBP, S_JPY, S_USD, SUSD_WHALE};
use butter_wrappers::wrappers::{ierc20::IERC20, synthetix::Synthetix};
use ethers::{
    signers::Signer,
    types::{Address, U256},
    utils::format_bytes32_string,
};
use eyre::{eyre, Result};
use fixed_point::FixedPoint;
use fixed_point_macros::fixed;
use serde::Deserialize;
use set_token::send;
use tracing::info;

use crate::{
    chain::{Chain, ChainClient},
    simulation::{deserialize_ether, step_until, BlockRecord},
};

/// The token contract of a synth currency key.
pub fn synth_address(currency_key: &str) -> Result<Address> {
    match currency_key {
        "sUSD" => Ok(*S_USD),
        "sEUR" => Ok(*S_EUR),
        "sGBP" => Ok(*S_GBP),
        "sAUD" => Ok(*S_AUD),
        "sJPY" => Ok(*S_JPY),
        _ => Err(eyre!("unknown synth {}", currency_key)),
    }
}

/// Read from `EXCHANGE_*` variables.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub rpc_url: Option<String>,
    /// Falls back to `FORKING_RPC_URL`.
    pub forking_rpc_url: Option<String>,
    pub start_block: u64,
    pub end_block: u64,
    pub blocks_per_step: u64,
    #[serde(deserialize_with = "deserialize_ether")]
    pub source_amount: FixedPoint,
    #[serde(deserialize_with = "deserialize_ether")]
    pub funding_amount: FixedPoint,
    pub whale: Address,
    #[serde(deserialize_with = "deserialize_ether")]
    pub whale_eth: FixedPoint,
    pub source_currency: String,
    pub destination_currency: String,
    pub tracking_code: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            forking_rpc_url: None,
            start_block: 14_277_072,
            end_block: 14_320_258,
            blocks_per_step: 240,
            source_amount: fixed!(10e18),
            funding_amount: fixed!(20_000e18),
            whale: *SUSD_WHALE,
            whale_eth: fixed!(10e18),
            source_currency: "sUSD".to_string(),
            destination_currency: "sJPY".to_string(),
            tracking_code: String::new(),
        }
    }
}

impl ExchangeConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = envy::prefixed("EXCHANGE_")
            .from_env::<Self>()
            .map_err(|e| eyre!("failed to read EXCHANGE_* environment: {}", e))?;
        if config.forking_rpc_url.is_none() {
            config.forking_rpc_url = env::var("FORKING_RPC_URL").ok();
        }
        Ok(config)
    }

    pub fn forking_rpc_url(&self) -> Result<&str> {
        self.forking_rpc_url
            .as_deref()
            .ok_or_else(|| eyre!("FORKING_RPC_URL is not set"))
    }

    pub async fn connect(&self) -> Result<Chain> {
        match &self.rpc_url {
            Some(rpc_url) => Chain::connect(Some(rpc_url.clone())).await,
            None => Chain::fork(self.forking_rpc_url()?, self.start_block).await,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeRecord {
    pub block: u64,
    pub source_amount: FixedPoint,
    pub amount_received: FixedPoint,
}

impl BlockRecord for ExchangeRecord {
    fn block(&self) -> u64 {
        self.block
    }
}

pub struct ExchangeSimulation<S: Signer + 'static> {
    chain: Chain,
    client: Arc<ChainClient<S>>,
    config: ExchangeConfig,
    synthetix: Synthetix<ChainClient<S>>,
    source: IERC20<ChainClient<S>>,
    destination: IERC20<ChainClient<S>>,
}

impl<S: Signer + 'static> ExchangeSimulation<S> {
    pub async fn new(
        chain: Chain,
        signer: S,
        config: ExchangeConfig,
        addresses: &ButterAddresses,
    ) -> Result<Self> {
        let client = chain.client(signer).await?;
        let synthetix = Synthetix::new(addresses.synthetix, client.clone());
        let source = IERC20::new(synth_address(&config.source_currency)?, client.clone());
        let destination = IERC20::new(
            synth_address(&config.destination_currency)?,
            client.clone(),
        );
        Ok(Self {
            chain,
            client,
            config,
            synthetix,
            source,
            destination,
        })
    }

    /// Rewinds the fork and exchanges once per step until the end block.
    pub async fn run(&self) -> Result<Vec<ExchangeRecord>> {
        self.chain
            .reset_fork(self.config.forking_rpc_url()?, self.config.start_block)
            .await?;
        self.chain
            .deal(self.client.address(), fixed!(1_000e18))
            .await?;
        info!(start_block = self.config.start_block, "reset fork");

        let this = self;
        step_until(
            self.config.start_block,
            self.config.end_block,
            move || async move {
                let record = this.step().await?;
                info!(
                    block = record.block,
                    source = %this.config.source_currency,
                    source_amount = %record.source_amount,
                    destination = %this.config.destination_currency,
                    amount_received = %record.amount_received,
                    "exchanged atomically"
                );
                Ok::<_, eyre::Report>(record)
            },
            move || async move { this.chain.mine(this.config.blocks_per_step).await },
        )
        .await
    }

    /// Funds the signer from the whale and makes one atomic exchange.
    pub async fn step(&self) -> Result<ExchangeRecord> {
        let owner = self.client.address();
        let whale = self.config.whale;
        self.chain.impersonate(whale).await?;
        self.chain.deal(whale, self.config.whale_eth).await?;
        let whale_source = IERC20::new(self.source.address(), Arc::new(self.chain.provider()));
        let whale_balance: FixedPoint = whale_source.balance_of(whale).call().await?.into();
        info!(?whale, %whale_balance, "funding from whale");
        send(
            whale_source
                .transfer(owner, self.config.funding_amount.into())
                .from(whale),
        )
        .await?;
        self.chain.stop_impersonating(whale).await?;

        send(self.source.approve(self.synthetix.address(), U256::MAX)).await?;
        let before = self.destination.balance_of(owner).call().await?;
        send(self.synthetix.exchange_atomically(
            format_bytes32_string(&self.config.source_currency)?,
            self.config.source_amount.into(),
            format_bytes32_string(&self.config.destination_currency)?,
            format_bytes32_string(&self.config.tracking_code)?,
        ))
        .await?;
        let after = self.destination.balance_of(owner).call().await?;

        let block = self
            .chain
            .latest_block()
            .await?
            .number
            .ok_or_else(|| eyre!("latest block is pending"))?
            .as_u64();
        Ok(ExchangeRecord {
            block,
            source_amount: self.config.source_amount,
            amount_received: (after.saturating_sub(before)).into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synth_address() -> Result<()> {
        assert_eq!(synth_address("sUSD")?, *S_USD);
        assert_eq!(synth_address("sJPY")?, *S_JPY);
        assert!(synth_address("sBTC").is_err());
        Ok(())
    }

    #[test]
    fn test_default_config() -> Result<()> {
        let config: ExchangeConfig = envy::prefixed("EXCHANGE_").from_iter(vec![(
            "EXCHANGE_DESTINATION_CURRENCY".to_string(),
            "sEUR".to_string(),
        )])?;
        assert_eq!(config.start_block, 14_277_072);
        assert_eq!(config.end_block, 14_320_258);
        assert_eq!(config.source_amount, fixed!(10e18));
        assert_eq!(config.whale, *SUSD_WHALE);
        assert_eq!(config.destination_currency, "sEUR");
        assert_eq!(format_bytes32_string(&config.tracking_code)?, [0; 32]);
        Ok(())
    }
}
