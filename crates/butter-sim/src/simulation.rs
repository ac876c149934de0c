//! Measures the slippage of minting Butter through the batch contract across
//! a range of mainnet blocks.
//!
//! Each step deploys a fresh batch stack on the fork, funds the owner with
//! the deposit token, mints one batch and compares the USD value deposited
//! with the USD value of the set tokens the batch produced. Every step is
//! appended to a CSV file, then the fork moves forward by
//! `blocks_per_step` blocks.

use std::{
    env,
    fmt,
    fs::OpenOptions,
    future::Future,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use butter_addresses::ButterAddresses;
use butter_wrappers::{artifacts::ArtifactStore, wrappers::ierc20::IERC20};
use ethers::{
    signers::Signer,
    types::{Address, U256},
};
use eyre::{eyre, Result};
use fixed_point::FixedPoint;
use fixed_point_macros::fixed;
use serde::{Deserialize, Deserializer};
use set_token::send;
use tracing::{info, warn};

use crate::{
    batch::ButterBatchAdapter,
    chain::{Chain, ChainClient},
    deploy::{deploy_contracts, Contracts},
};

/// Reads a decimal amount of whole tokens, e.g. `"10000.5"`, as a wad.
pub(crate) fn deserialize_ether<'de, D>(deserializer: D) -> Result<FixedPoint, D::Error>
where
    D: Deserializer<'de>,
{
    let ether: String = Deserialize::deserialize(deserializer)?;
    FixedPoint::from_str(&ether).map_err(serde::de::Error::custom)
}

/// A measurement taken at a block.
pub trait BlockRecord {
    fn block(&self) -> u64;
}

/// Calls `step` until a step reports a block at or past `end_block`,
/// calling `advance` after every step. Nothing runs when `start_block` is
/// already at the end.
pub async fn step_until<R, Step, StepFut, Advance, AdvanceFut>(
    start_block: u64,
    end_block: u64,
    mut step: Step,
    mut advance: Advance,
) -> Result<Vec<R>>
where
    R: BlockRecord,
    Step: FnMut() -> StepFut,
    StepFut: Future<Output = Result<R>>,
    Advance: FnMut() -> AdvanceFut,
    AdvanceFut: Future<Output = Result<()>>,
{
    let mut records = vec![];
    let mut block = start_block;
    while block < end_block {
        let record = step().await?;
        block = record.block();
        records.push(record);
        advance().await?;
    }
    Ok(records)
}

/// Errors when the funded balance can't cover the deposit.
pub fn ensure_funded(balance: FixedPoint, input_amount: FixedPoint) -> Result<()> {
    if balance < input_amount {
        return Err(eyre!(
            "owner holds {} of the deposit token but deposits {}",
            balance,
            input_amount
        ));
    }
    Ok(())
}

/// The simulation parameters, read from `SIMULATION_*` variables. Amounts are
/// given in whole tokens, e.g. `SIMULATION_INPUT_AMOUNT=10000`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// A running anvil node to use instead of spawning one.
    pub rpc_url: Option<String>,
    /// The archive node to fork from. Falls back to `FORKING_RPC_URL`.
    pub forking_rpc_url: Option<String>,
    pub start_block: u64,
    pub end_block: u64,
    #[serde(deserialize_with = "deserialize_ether")]
    pub input_amount: FixedPoint,
    pub max_slippage: f64,
    pub blocks_per_step: u64,
    /// Deposit token sent by the whale. The faucet path sends whatever
    /// `faucet_eth` buys instead.
    #[serde(deserialize_with = "deserialize_ether")]
    pub funding_amount: FixedPoint,
    /// An account holding the deposit token. Without one the owner is
    /// funded through the faucet.
    pub whale: Option<Address>,
    /// Ether dealt to the whale to pay for its transfer.
    #[serde(deserialize_with = "deserialize_ether")]
    pub whale_eth: FixedPoint,
    /// Ether the faucet swaps into 3CRV when there is no whale.
    #[serde(deserialize_with = "deserialize_ether")]
    pub faucet_eth: FixedPoint,
    /// The token deposited into the mint batch. Defaults to 3CRV.
    pub deposit_token: Option<Address>,
    pub csv_path: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            forking_rpc_url: None,
            start_block: 14_221_601,
            end_block: 14_244_857,
            input_amount: fixed!(10_000e18),
            max_slippage: 0.002,
            blocks_per_step: 240,
            funding_amount: fixed!(20_000e18),
            whale: None,
            whale_eth: fixed!(10e18),
            faucet_eth: fixed!(100e18),
            deposit_token: None,
            csv_path: PathBuf::from("slippage.csv"),
        }
    }
}

impl SimulationConfig {
    pub fn from_env() -> Result<Self> {
        let config = envy::prefixed("SIMULATION_")
            .from_env::<Self>()
            .map_err(|e| eyre!("failed to read SIMULATION_* environment: {}", e))?;
        Ok(config.with_forking_rpc_url(env::var("FORKING_RPC_URL").ok()))
    }

    fn with_forking_rpc_url(mut self, fallback: Option<String>) -> Self {
        if self.forking_rpc_url.is_none() {
            self.forking_rpc_url = fallback;
        }
        self
    }

    pub fn forking_rpc_url(&self) -> Result<&str> {
        self.forking_rpc_url
            .as_deref()
            .ok_or_else(|| eyre!("FORKING_RPC_URL is not set"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_block >= self.end_block {
            return Err(eyre!(
                "start block {} is not before end block {}",
                self.start_block,
                self.end_block
            ));
        }
        if self.blocks_per_step == 0 {
            return Err(eyre!("blocks per step must be positive"));
        }
        if self.input_amount.is_zero() {
            return Err(eyre!("input amount must be positive"));
        }
        if self.funding_amount < self.input_amount {
            return Err(eyre!(
                "funding amount {} doesn't cover the input amount {}",
                self.funding_amount,
                self.input_amount
            ));
        }
        Ok(())
    }

    /// Connects to the configured node, or spawns an anvil fork at the start
    /// block.
    pub async fn connect(&self) -> Result<Chain> {
        match &self.rpc_url {
            Some(rpc_url) => Chain::connect(Some(rpc_url.clone())).await,
            None => Chain::fork(self.forking_rpc_url()?, self.start_block).await,
        }
    }
}

/// One simulated mint. Amounts are wads; the CSV shows them in wei.
#[derive(Clone, Debug, PartialEq)]
pub struct SlippageRecord {
    pub block: u64,
    pub timestamp: u64,
    pub input_amount: FixedPoint,
    pub input_usd: FixedPoint,
    pub output_amount: FixedPoint,
    pub output_usd: FixedPoint,
    pub slippage: f64,
    pub acceptable: bool,
}

impl SlippageRecord {
    pub const CSV_HEADER: &'static str =
        "block,timestamp,input_amount,input_usd,output_amount,output_usd,slippage,acceptable";

    /// Prices `output_amount` set tokens at `value_per_unit` USD each and
    /// compares them with `input_usd`. Positive slippage means the mint lost
    /// value.
    pub fn new(
        block: u64,
        timestamp: u64,
        input_amount: FixedPoint,
        input_usd: FixedPoint,
        output_amount: FixedPoint,
        value_per_unit: FixedPoint,
        max_slippage: f64,
    ) -> Result<Self> {
        let output_usd = value_per_unit.mul_down(output_amount);
        if output_usd.is_zero() {
            return Err(eyre!("the batch at block {} minted nothing", block));
        }
        let slippage = input_usd.div_down(output_usd).to_f64() - 1.0;
        Ok(Self {
            block,
            timestamp,
            input_amount,
            input_usd,
            output_amount,
            output_usd,
            slippage,
            acceptable: slippage <= max_slippage,
        })
    }

    /// Appends the record to a CSV file. Each record is preceded by a line
    /// break; a new file starts with the header.
    pub fn append_to(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eyre!("failed to open {}: {}", path.display(), e))?;
        if file.metadata()?.len() == 0 {
            write!(file, "{}", Self::CSV_HEADER)?;
        }
        write!(file, "\r\n{}", self)?;
        Ok(())
    }
}

impl BlockRecord for SlippageRecord {
    fn block(&self) -> u64 {
        self.block
    }
}

impl fmt::Display for SlippageRecord {
    /// The CSV row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.block,
            self.timestamp,
            U256::from(self.input_amount),
            U256::from(self.input_usd),
            U256::from(self.output_amount),
            U256::from(self.output_usd),
            self.slippage,
            self.acceptable
        )
    }
}

/// The slippage loop over a forked chain.
pub struct SlippageSimulation<S: Signer + 'static> {
    chain: Chain,
    client: Arc<ChainClient<S>>,
    config: SimulationConfig,
    addresses: ButterAddresses,
    artifacts: ArtifactStore,
}

impl<S: Signer + 'static> SlippageSimulation<S> {
    pub async fn new(
        chain: Chain,
        signer: S,
        config: SimulationConfig,
        addresses: ButterAddresses,
        artifacts: ArtifactStore,
    ) -> Result<Self> {
        config.validate()?;
        let client = chain.client(signer).await?;
        Ok(Self {
            chain,
            client,
            config,
            addresses,
            artifacts,
        })
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    fn deposit_token(&self) -> Address {
        self.config.deposit_token.unwrap_or(self.addresses.three_crv)
    }

    /// Rewinds the fork to the start block and mints until the end block is
    /// reached. Returns the records that were written.
    pub async fn run(&self) -> Result<Vec<SlippageRecord>> {
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
                record.append_to(&this.config.csv_path)?;
                info!(
                    block = record.block,
                    timestamp = record.timestamp,
                    input_amount = %record.input_amount,
                    input_usd = %record.input_usd.format_rounded(),
                    output_amount = %record.output_amount,
                    output_usd = %record.output_usd.format_rounded(),
                    slippage = record.slippage,
                    acceptable = record.acceptable,
                    "minted batch"
                );
                if !record.acceptable {
                    warn!(
                        block = record.block,
                        slippage = record.slippage,
                        max_slippage = this.config.max_slippage,
                        "slippage above maximum"
                    );
                }
                Ok::<_, eyre::Report>(record)
            },
            move || async move { this.chain.mine(this.config.blocks_per_step).await },
        )
        .await
    }

    /// Deploys a batch stack, mints one batch and measures it.
    pub async fn step(&self) -> Result<SlippageRecord> {
        let owner = self.client.address();
        let contracts = deploy_contracts(
            self.client.clone(),
            owner,
            &self.addresses,
            &self.artifacts,
        )
        .await?;
        self.fund(&contracts).await?;
        let deposit_token = IERC20::new(self.deposit_token(), self.client.clone());
        ensure_funded(
            deposit_token.balance_of(owner).call().await?.into(),
            self.config.input_amount,
        )?;

        let batch = ButterBatchAdapter::new(contracts.butter_batch.clone());
        send(deposit_token.approve(contracts.butter_batch.address(), U256::MAX)).await?;
        send(
            contracts
                .butter_batch
                .deposit_for_mint(self.config.input_amount.into(), owner),
        )
        .await?;
        let mint_batch_id = contracts
            .butter_batch
            .current_mint_batch_id()
            .call()
            .await?;
        send(contracts.butter_batch.batch_mint()).await?;
        let minting_block = self.chain.latest_block().await?;

        let output_amount = batch.get_batch(mint_batch_id).await?.claimable_token_balance;
        let (components, quantities) = contracts
            .basic_issuance_module
            .required_component_units_for_issue(contracts.set_token.address(), fixed!(1e18).into())
            .await?;
        let value_per_unit = contracts
            .butter_batch
            .value_of_components(components, quantities)
            .call()
            .await?;

        SlippageRecord::new(
            minting_block
                .number
                .ok_or_else(|| eyre!("latest block is pending"))?
                .as_u64(),
            minting_block.timestamp.as_u64(),
            self.config.input_amount,
            self.config.input_amount,
            output_amount.into(),
            value_per_unit.into(),
            self.config.max_slippage,
        )
    }

    /// Gives the owner `funding_amount` of the deposit token from the whale
    /// if one is configured. Otherwise the faucet swaps `faucet_eth` into
    /// 3CRV for the owner.
    async fn fund(&self, contracts: &Contracts<ChainClient<S>>) -> Result<()> {
        let owner = self.client.address();
        match self.config.whale {
            Some(whale) => {
                self.chain.impersonate(whale).await?;
                self.chain.deal(whale, self.config.whale_eth).await?;
                let token = IERC20::new(self.deposit_token(), Arc::new(self.chain.provider()));
                let balance: FixedPoint = token.balance_of(whale).call().await?.into();
                info!(?whale, %balance, "funding from whale");
                send(
                    token
                        .transfer(owner, self.config.funding_amount.into())
                        .from(whale),
                )
                .await?;
                self.chain.stop_impersonating(whale).await?;
            }
            None => {
                self.chain
                    .deal(contracts.faucet.address(), self.config.faucet_eth)
                    .await?;
                send(
                    contracts
                        .faucet
                        .send_three_crv(self.config.faucet_eth.into(), owner),
                )
                .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, fs};

    use super::*;

    #[test]
    fn test_default_config() -> Result<()> {
        let config: SimulationConfig =
            envy::prefixed("SIMULATION_").from_iter(Vec::<(String, String)>::new())?;
        config.validate()?;
        assert_eq!(config.start_block, 14_221_601);
        assert_eq!(config.end_block, 14_244_857);
        assert_eq!(config.input_amount, fixed!(10_000e18));
        assert_eq!(config.funding_amount, fixed!(20_000e18));
        assert_eq!(config.max_slippage, 0.002);
        assert_eq!(config.blocks_per_step, 240);
        assert_eq!(config.csv_path, PathBuf::from("slippage.csv"));
        assert!(config.forking_rpc_url().is_err());
        Ok(())
    }

    #[test]
    fn test_config_from_env() -> Result<()> {
        let vars = [
            ("SIMULATION_START_BLOCK", "100"),
            ("SIMULATION_END_BLOCK", "200"),
            ("SIMULATION_INPUT_AMOUNT", "1000.5"),
            ("SIMULATION_MAX_SLIPPAGE", "0.02"),
            (
                "SIMULATION_WHALE",
                "0xC8C2b727d864CC75199f5118F0943d2087fB543b",
            ),
            ("SIMULATION_CSV_PATH", "out/slippage.csv"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()));
        let config = envy::prefixed("SIMULATION_")
            .from_iter::<_, SimulationConfig>(vars)?
            .with_forking_rpc_url(Some("http://archive:8545".to_string()));
        assert_eq!(config.start_block, 100);
        assert_eq!(config.input_amount, fixed!(1000.5e18));
        assert_eq!(config.max_slippage, 0.02);
        assert_eq!(
            config.whale,
            Some("0xC8C2b727d864CC75199f5118F0943d2087fB543b".parse()?)
        );
        assert_eq!(config.forking_rpc_url()?, "http://archive:8545");

        // An explicit forking url wins over the fallback.
        let config = SimulationConfig {
            forking_rpc_url: Some("http://explicit:8545".to_string()),
            ..config
        }
        .with_forking_rpc_url(Some("http://archive:8545".to_string()));
        assert_eq!(config.forking_rpc_url()?, "http://explicit:8545");

        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let config = SimulationConfig {
            start_block: 10,
            end_block: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            funding_amount: fixed!(1e18),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            blocks_per_step: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_slippage_record() -> Result<()> {
        // 10,000 USD in, 99.5 set tokens worth 100 USD each out: 0.5% lost.
        let record = SlippageRecord::new(
            14_221_602,
            1_645_000_000,
            fixed!(10_000e18),
            fixed!(10_000e18),
            fixed!(99.5e18),
            fixed!(100e18),
            0.002,
        )?;
        assert_eq!(record.output_usd, fixed!(9_950e18));
        assert!((record.slippage - 0.005025125628140703).abs() < 1e-12);
        assert!(!record.acceptable);

        // Gaining value is always acceptable.
        let record = SlippageRecord::new(
            1,
            1,
            fixed!(10_000e18),
            fixed!(10_000e18),
            fixed!(101e18),
            fixed!(100e18),
            0.002,
        )?;
        assert!(record.slippage < 0.0);
        assert!(record.acceptable);

        // An empty batch can't be priced.
        assert!(SlippageRecord::new(
            1,
            1,
            fixed!(10_000e18),
            fixed!(10_000e18),
            fixed!(0),
            fixed!(100e18),
            0.002
        )
        .is_err());

        Ok(())
    }

    #[test]
    fn test_append_to_csv() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("slippage.csv");
        let record = SlippageRecord::new(
            14_221_602,
            1_645_000_000,
            fixed!(10_000e18),
            fixed!(10_000e18),
            fixed!(100e18),
            fixed!(100e18),
            0.002,
        )?;
        record.append_to(&path)?;
        record.append_to(&path)?;

        let row = "14221602,1645000000,10000000000000000000000,10000000000000000000000,\
                   100000000000000000000,10000000000000000000000,0,true";
        assert_eq!(
            fs::read_to_string(&path)?,
            format!("{}\r\n{}\r\n{}", SlippageRecord::CSV_HEADER, row, row)
        );

        Ok(())
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Stamp(u64);

    impl BlockRecord for Stamp {
        fn block(&self) -> u64 {
            self.0
        }
    }

    #[tokio::test]
    async fn test_step_until_stops_at_end_block() -> Result<()> {
        let block = &Cell::new(100);
        let advances = &Cell::new(0);
        let records = step_until(
            100,
            130,
            move || async move { Ok(Stamp(block.get())) },
            move || async move {
                block.set(block.get() + 10);
                advances.set(advances.get() + 1);
                Ok(())
            },
        )
        .await?;
        // The step landing on the end block is the last one.
        assert_eq!(records, vec![Stamp(100), Stamp(110), Stamp(120), Stamp(130)]);
        assert_eq!(advances.get(), 4);

        // A step past the end also stops the loop.
        let records = step_until(
            0,
            50,
            || async { Ok(Stamp(75)) },
            || async { Ok(()) },
        )
        .await?;
        assert_eq!(records, vec![Stamp(75)]);

        // Nothing runs from the end block.
        let records = step_until(
            50,
            50,
            || async { Ok(Stamp(50)) },
            || async { Ok(()) },
        )
        .await?;
        assert!(records.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_step_until_stops_on_error() {
        let steps = &Cell::new(0);
        let result = step_until(
            0,
            1_000,
            move || async move {
                steps.set(steps.get() + 1);
                if steps.get() == 2 {
                    Err(eyre!("deployment reverted"))
                } else {
                    Ok(Stamp(steps.get()))
                }
            },
            || async { Ok(()) },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(steps.get(), 2);
    }

    #[test]
    fn test_ensure_funded() {
        assert!(ensure_funded(fixed!(10_000e18), fixed!(10_000e18)).is_ok());
        assert!(ensure_funded(fixed!(20_000e18), fixed!(10_000e18)).is_ok());
        assert!(ensure_funded(fixed!(9_999.99e18), fixed!(10_000e18)).is_err());
        assert!(ensure_funded(fixed!(0), fixed!(1)).is_err());
    }
}
