pub mod acl_registry;
pub mod basic_issuance_module;
pub mod butter_batch_processing;
pub mod contract_registry;
pub mod curve_metapool;
pub mod faucet;
pub mod ierc20;
pub mod keeper_incentive;
pub mod mock_erc20;
pub mod set_token;
pub mod set_token_creator;
pub mod streaming_fee_module;
pub mod synthetix;
pub mod yearn_vault;
