//! Creation and module setup of Set Protocol basket tokens.
//!
//! The flow mirrors what a manager does by hand: compute the component
//! units for the target NAV, create the token through the `SetTokenCreator`,
//! find the new token's address in the creation receipt and then initialize
//! each configured module, one transaction at a time.

pub mod config;
pub mod created_address;
pub mod creator;
pub mod issuance;
pub mod manager;
pub mod streaming_fee;
mod tx;

pub use config::{Component, Configuration, FeeSettings};
pub use created_address::{created_set_token_address, find_created_set_token};
pub use creator::{calculate_units, SetTokenCreator};
pub use issuance::BasicIssuanceModuleManager;
pub use manager::SetTokenManager;
pub use streaming_fee::StreamingFeeModuleManager;
pub use tx::send;
