//! A read-side adapter over the Butter batch contract: batch views, claim
//! amounts and the minimum 3CRV a redeem batch should return.

use butter_wrappers::wrappers::butter_batch_processing::ButterBatchProcessing;
use ethers::{
    providers::Middleware,
    types::{Address, U256},
};
use eyre::{eyre, Result};
use fixed_point::FixedPoint;
use fixed_point_macros::fixed;
use set_token::BasicIssuanceModuleManager;
use tracing::debug;

use crate::deploy::DeployedComponent;

/// Slippage tolerated by `min_amount_to_receive_for_batch_redeem` when none
/// is given: 50 bps.
pub const DEFAULT_REDEEM_SLIPPAGE: f64 = 0.005;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchType {
    Mint,
    Redeem,
}

impl TryFrom<u8> for BatchType {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(BatchType::Mint),
            1 => Ok(BatchType::Redeem),
            _ => Err(eyre!("unknown batch type {}", value)),
        }
    }
}

impl From<BatchType> for u8 {
    fn from(batch_type: BatchType) -> Self {
        match batch_type {
            BatchType::Mint => 0,
            BatchType::Redeem => 1,
        }
    }
}

/// A mint batch collects 3CRV and pays out set tokens; a redeem batch does
/// the reverse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    pub batch_type: BatchType,
    pub batch_id: [u8; 32],
    pub claimable: bool,
    pub unclaimed_shares: U256,
    pub supplied_token_balance: U256,
    pub claimable_token_balance: U256,
    pub supplied_token_address: Address,
    pub claimable_token_address: Address,
}

type RawBatch = (u8, [u8; 32], bool, U256, U256, U256, Address, Address);

impl TryFrom<RawBatch> for Batch {
    type Error = eyre::Report;

    fn try_from(raw: RawBatch) -> Result<Self> {
        let (
            batch_type,
            batch_id,
            claimable,
            unclaimed_shares,
            supplied_token_balance,
            claimable_token_balance,
            supplied_token_address,
            claimable_token_address,
        ) = raw;
        Ok(Self {
            batch_type: batch_type.try_into()?,
            batch_id,
            claimable,
            unclaimed_shares,
            supplied_token_balance,
            claimable_token_balance,
            supplied_token_address,
            claimable_token_address,
        })
    }
}

/// The account's pro-rata share of a batch's claimable tokens.
pub fn claim_amount(
    claimable_token_balance: FixedPoint,
    account_balance: FixedPoint,
    unclaimed_shares: FixedPoint,
) -> Result<FixedPoint> {
    if unclaimed_shares.is_zero() {
        return Err(eyre!("batch has no unclaimed shares"));
    }
    Ok(claimable_token_balance.mul_div_down(account_balance, unclaimed_shares))
}

/// The USD price of one vault share: the vault's price per share in LP
/// tokens times the pool's virtual price.
pub fn component_price(price_per_share: FixedPoint, virtual_price: FixedPoint) -> FixedPoint {
    price_per_share.mul_down(virtual_price)
}

/// Values the components at their prices and takes off `slippage`, a
/// fraction such as `0.005`.
pub fn min_amount_to_receive(
    prices: &[FixedPoint],
    amounts: &[FixedPoint],
    slippage: f64,
) -> Result<FixedPoint> {
    if prices.len() != amounts.len() {
        return Err(eyre!(
            "got {} prices for {} component amounts",
            prices.len(),
            amounts.len()
        ));
    }
    let slippage = FixedPoint::from_f64(slippage)?;
    if slippage > fixed!(1e18) {
        return Err(eyre!("slippage {} is more than 100%", slippage));
    }
    let value = prices
        .iter()
        .zip(amounts)
        .fold(fixed!(0), |value, (price, amount)| {
            value + price.mul_down(*amount)
        });
    Ok(value.mul_down(fixed!(1e18) - slippage))
}

pub struct ButterBatchAdapter<M> {
    contract: ButterBatchProcessing<M>,
}

impl<M: Middleware + 'static> ButterBatchAdapter<M> {
    pub fn new(contract: ButterBatchProcessing<M>) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &ButterBatchProcessing<M> {
        &self.contract
    }

    pub async fn get_batch(&self, batch_id: [u8; 32]) -> Result<Batch> {
        self.contract.batches(batch_id).call().await?.try_into()
    }

    pub async fn current_mint_batch(&self) -> Result<Batch> {
        let batch_id = self.contract.current_mint_batch_id().call().await?;
        self.get_batch(batch_id).await
    }

    pub async fn current_redeem_batch(&self) -> Result<Batch> {
        let batch_id = self.contract.current_redeem_batch_id().call().await?;
        self.get_batch(batch_id).await
    }

    /// How many claimable tokens `account` gets out of the batch.
    pub async fn amount_to_receive_for_claim(
        &self,
        batch_id: [u8; 32],
        account: Address,
    ) -> Result<U256> {
        let batch = self.get_batch(batch_id).await?;
        let account_balance = self
            .contract
            .account_balances(batch_id, account)
            .call()
            .await?;
        Ok(claim_amount(
            batch.claimable_token_balance.into(),
            account_balance.into(),
            batch.unclaimed_shares.into(),
        )?
        .into())
    }

    /// The least 3CRV the current redeem batch should return: the set tokens
    /// in the batch are broken into component units, each unit is priced
    /// through its vault and metapool, and `slippage` (default 50 bps) is
    /// taken off the total.
    pub async fn min_amount_to_receive_for_batch_redeem(
        &self,
        slippage: Option<f64>,
        issuance: &BasicIssuanceModuleManager<M>,
        set_token: Address,
        components: &[DeployedComponent<M>],
    ) -> Result<U256> {
        let batch = self.current_redeem_batch().await?;
        let (addresses, amounts) = issuance
            .required_component_units_for_issue(set_token, batch.supplied_token_balance)
            .await?;

        let mut prices = Vec::with_capacity(addresses.len());
        for address in &addresses {
            let component = components
                .iter()
                .find(|component| component.vault.address() == *address)
                .ok_or_else(|| eyre!("no vault or metapool known for component {:?}", address))?;
            let price_per_share = component.vault.price_per_share().call().await?;
            let virtual_price = component.metapool.get_virtual_price().call().await?;
            let price = component_price(price_per_share.into(), virtual_price.into());
            debug!(component = ?address, %price, "priced component");
            prices.push(price);
        }

        let amounts = amounts.into_iter().map(FixedPoint::from).collect::<Vec<_>>();
        Ok(min_amount_to_receive(
            &prices,
            &amounts,
            slippage.unwrap_or(DEFAULT_REDEEM_SLIPPAGE),
        )?
        .into())
    }
}
