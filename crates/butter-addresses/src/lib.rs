//! Address books for the Set Protocol deployment and the mainnet contracts
//! the Butter basket is built from.

#[macro_use]
extern crate lazy_static;

mod mainnet;
mod network;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

pub use mainnet::*;
pub use network::Network;

/// The Set Protocol core contracts the basket is created and managed with.
#[derive(Default, Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProtocolAddresses {
    pub set_token_creator: Address,
    pub basic_issuance_module: Address,
    pub streaming_fee_module: Address,
}

impl SetProtocolAddresses {
    pub fn mainnet() -> Self {
        Self {
            set_token_creator: *SET_TOKEN_CREATOR,
            basic_issuance_module: *SET_BASIC_ISSUANCE_MODULE,
            streaming_fee_module: *SET_STREAMING_FEE_MODULE,
        }
    }
}

/// A yCRV component of the basket: the Yearn vault token that is held by the
/// set, the Curve LP token the vault wraps, and the metapool that prices it.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveComponent {
    pub vault: Address,
    pub lp_token: Address,
    pub metapool: Address,
}

/// The mainnet contracts the slippage simulation deploys against.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButterAddresses {
    pub set_protocol: SetProtocolAddresses,
    pub uniswap_router: Address,
    pub curve_address_provider: Address,
    pub curve_metapool_deposit_zap: Address,
    pub three_crv: Address,
    pub three_pool: Address,
    // The component order is the order the set token is created with.
    pub rai: CurveComponent,
    pub frax: CurveComponent,
    pub musd: CurveComponent,
    pub alusd: CurveComponent,
    pub susd: Address,
    pub susd_whale: Address,
    pub synthetix: Address,
}

impl Default for ButterAddresses {
    fn default() -> Self {
        Self {
            set_protocol: SetProtocolAddresses::mainnet(),
            uniswap_router: *UNISWAP_ROUTER,
            curve_address_provider: *CURVE_ADDRESS_PROVIDER,
            curve_metapool_deposit_zap: *CURVE_FACTORY_METAPOOL_DEPOSIT_ZAP,
            three_crv: *THREE_CRV,
            three_pool: *THREE_POOL,
            rai: CurveComponent {
                vault: *Y_CRV_RAI,
                lp_token: *CRV_RAI,
                metapool: *RAI_METAPOOL,
            },
            frax: CurveComponent {
                vault: *Y_CRV_FRAX,
                lp_token: *CRV_FRAX,
                metapool: *FRAX_METAPOOL,
            },
            musd: CurveComponent {
                vault: *Y_CRV_MUSD,
                lp_token: *CRV_MUSD,
                metapool: *MUSD_METAPOOL,
            },
            alusd: CurveComponent {
                vault: *Y_CRV_ALUSD,
                lp_token: *CRV_ALUSD,
                metapool: *ALUSD_METAPOOL,
            },
            susd: *S_USD,
            susd_whale: *SUSD_WHALE,
            synthetix: *SYNTHETIX,
        }
    }
}

impl ButterAddresses {
    /// The basket components in creation order.
    pub fn components(&self) -> [CurveComponent; 4] {
        [self.rai, self.frax, self.musd, self.alusd]
    }
}
