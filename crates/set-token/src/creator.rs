use std::sync::Arc;

use butter_wrappers::wrappers::{
    curve_metapool::CurveMetapool, set_token_creator::SetTokenCreator as SetTokenCreatorContract,
    yearn_vault::YearnVault,
};
use ethers::{
    contract::ContractCall,
    providers::Middleware,
    types::{Address, Sign, TransactionReceipt, I256},
};
use eyre::{eyre, Result};
use fixed_point::FixedPoint;
use fixed_point_macros::fixed;
use tracing::{debug, info};

use crate::{
    config::{Component, Configuration},
    tx::send,
};

/// Computes how many units of a component one set token holds so that the
/// component makes up `ratio` percent of `target_nav`. The ratio is a wad, so
/// `33.34e18` is 33.34 percent.
///
/// The component is a Yearn vault share over a Curve LP token, so its USD
/// value is `units * price_per_share * virtual_price`. All divisions round
/// down.
pub fn calculate_units(
    target_nav: FixedPoint,
    ratio: FixedPoint,
    price_per_share: FixedPoint,
    virtual_price: FixedPoint,
) -> Result<FixedPoint> {
    if price_per_share.is_zero() || virtual_price.is_zero() {
        return Err(eyre!(
            "cannot price a component with price per share {} and virtual price {}",
            price_per_share,
            virtual_price
        ));
    }
    if ratio > fixed!(100e18) {
        return Err(eyre!("ratio {} is more than 100 percent", ratio));
    }
    let target_component_value = target_nav.mul_div_down(ratio, fixed!(100e18));
    let target_lp_units = target_component_value.div_down(virtual_price);
    Ok(target_lp_units.div_down(price_per_share))
}

/// Creates a set token from a [`Configuration`].
pub struct SetTokenCreator<M> {
    client: Arc<M>,
    configuration: Configuration,
    debug: bool,
}

impl<M: Middleware + 'static> SetTokenCreator<M> {
    /// With `debug` set, the unit calculation for each component is logged at
    /// info level instead of debug level.
    pub fn new(client: Arc<M>, configuration: Configuration, debug: bool) -> Self {
        Self {
            client,
            configuration,
            debug,
        }
    }

    /// Reads the vault and pool prices of a component and converts its share
    /// of the target NAV into set units.
    pub async fn component_units(&self, component: &Component) -> Result<FixedPoint> {
        let vault = YearnVault::new(component.address, self.client.clone());
        let pool = CurveMetapool::new(component.oracle, self.client.clone());
        let price_per_share: FixedPoint = vault.price_per_share().call().await?.into();
        let virtual_price: FixedPoint = pool.get_virtual_price().call().await?.into();

        let target_nav = self.configuration.target_nav();
        let units = calculate_units(
            target_nav,
            component.ratio,
            price_per_share,
            virtual_price,
        )?;
        if self.debug {
            info!(
                %target_nav,
                ratio = %component.ratio,
                %price_per_share,
                %virtual_price,
                %units,
                "calculated component units"
            );
        } else {
            debug!(
                %target_nav,
                ratio = %component.ratio,
                %price_per_share,
                %virtual_price,
                %units,
                "calculated component units"
            );
        }
        Ok(units)
    }

    /// The manager recorded on the token: the configured one, else the
    /// client's sender.
    pub fn manager(&self) -> Result<Address> {
        self.configuration
            .manager
            .or_else(|| self.client.default_sender())
            .ok_or_else(|| eyre!("no manager configured and the client has no sender"))
    }

    async fn create_call(&self) -> Result<ContractCall<M, Address>> {
        self.configuration.validate()?;

        let mut components = Vec::with_capacity(self.configuration.components.len());
        let mut units = Vec::with_capacity(self.configuration.components.len());
        for component in self.configuration.components.values() {
            let amount = self.component_units(component).await?;
            components.push(component.address);
            units.push(
                I256::checked_from_sign_and_abs(Sign::Positive, amount.into())
                    .ok_or_else(|| eyre!("component units {} overflow int256", amount))?,
            );
        }
        let modules = self
            .configuration
            .modules()
            .iter()
            .map(|module| module.address())
            .collect::<Vec<_>>();

        let creator =
            SetTokenCreatorContract::new(self.configuration.core.set_token_creator, self.client.clone());
        Ok(creator.create(
            components,
            units,
            modules,
            self.manager()?,
            self.configuration.name.clone(),
            self.configuration.symbol.clone(),
        ))
    }

    /// The address the token would be created at if `create` were sent now.
    pub async fn preview_address(&self) -> Result<Address> {
        Ok(self.create_call().await?.call().await?)
    }

    /// Creates the token and waits for one confirmation.
    pub async fn create(&self) -> Result<TransactionReceipt> {
        let call = self.create_call().await?;
        info!(
            name = %self.configuration.name,
            symbol = %self.configuration.symbol,
            "waiting for block confirmation"
        );
        send(call).await
    }
}
