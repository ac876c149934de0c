//! Deploys the Butter batch-processing stack on top of a mainnet fork: a
//! fresh Butter set token made of the four yCRV vaults, the Popcorn
//! registries and staking contracts, and the batch contract wired to all of
//! them.

use std::sync::Arc;

use butter_addresses::{ButterAddresses, CurveComponent};
use butter_wrappers::{
    artifacts::ArtifactStore,
    wrappers::{
        acl_registry::ACLRegistry, butter_batch_processing::ButterBatchProcessing,
        contract_registry::ContractRegistry, curve_metapool::CurveMetapool, faucet::Faucet,
        ierc20::IERC20, keeper_incentive::KeeperIncentive, mock_erc20::MockERC20,
        set_token::SetToken, set_token_creator::SetTokenCreator, yearn_vault::YearnVault,
    },
};
use ethers::{
    providers::Middleware,
    types::{Address, I256, U256},
    utils::{format_bytes32_string, keccak256},
};
use eyre::Result;
use fixed_point_macros::uint256;
use set_token::{send, BasicIssuanceModuleManager};
use tracing::info;

pub const SET_TOKEN_NAME: &str = "Butter2";
pub const SET_TOKEN_SYMBOL: &str = "BTR2";

/// The name the batch contract's keeper incentive is registered under.
pub const BATCH_CONTRACT_NAME: &str = "ButterBatchProcessing";

/// Slippage tolerance of the batch contract's Curve trades, in basis points.
pub const BATCH_SLIPPAGE: u64 = 1000;

/// A yCRV component with bindings for the vault, the Curve LP token it
/// wraps and the metapool that prices the LP token.
pub struct DeployedComponent<M> {
    pub vault: YearnVault<M>,
    pub lp_token: IERC20<M>,
    pub metapool: CurveMetapool<M>,
}

impl<M: Middleware + 'static> DeployedComponent<M> {
    fn new(component: &CurveComponent, client: Arc<M>) -> Self {
        Self {
            vault: YearnVault::new(component.vault, client.clone()),
            lp_token: IERC20::new(component.lp_token, client.clone()),
            metapool: CurveMetapool::new(component.metapool, client),
        }
    }
}

/// Everything `deploy_contracts` deployed or bound.
pub struct Contracts<M> {
    pub set_token: SetToken<M>,
    pub pop: MockERC20<M>,
    pub three_crv: IERC20<M>,
    pub three_pool: CurveMetapool<M>,
    /// In set creation order.
    pub components: Vec<DeployedComponent<M>>,
    pub faucet: Faucet<M>,
    pub acl_registry: ACLRegistry<M>,
    pub contract_registry: ContractRegistry<M>,
    pub keeper_incentive: KeeperIncentive<M>,
    pub pop_locker: Address,
    pub rewards_escrow: Address,
    pub staking: Address,
    pub basic_issuance_module: BasicIssuanceModuleManager<M>,
    pub butter_batch: ButterBatchProcessing<M>,
}

/// Creates the Butter set token: 25 units of each yCRV vault, with the
/// issuance module as its only module. Returns the token's address.
pub async fn create_butter_set<M: Middleware + 'static>(
    client: Arc<M>,
    owner: Address,
    addresses: &ButterAddresses,
) -> Result<Address> {
    let creator = SetTokenCreator::new(addresses.set_protocol.set_token_creator, client);
    let components = addresses
        .components()
        .iter()
        .map(|component| component.vault)
        .collect::<Vec<_>>();
    let units = vec![I256::from_raw(uint256!(25e18)); components.len()];
    let call = creator.create(
        components,
        units,
        vec![addresses.set_protocol.basic_issuance_module],
        owner,
        SET_TOKEN_NAME.to_string(),
        SET_TOKEN_SYMBOL.to_string(),
    );
    let set_token = call.call().await?;
    send(call).await?;
    info!(?set_token, "created Butter set token");
    Ok(set_token)
}

/// Deploys the batch-processing stack with `client` as the owner of every
/// contract. The compiled Popcorn contracts are read from `artifacts`.
pub async fn deploy_contracts<M: Middleware + 'static>(
    client: Arc<M>,
    owner: Address,
    addresses: &ButterAddresses,
    artifacts: &ArtifactStore,
) -> Result<Contracts<M>> {
    let set_token = create_butter_set(client.clone(), owner, addresses).await?;
    let set_token = SetToken::new(set_token, client.clone());
    let three_crv = IERC20::new(addresses.three_crv, client.clone());

    let pop = artifacts
        .get("MockERC20")?
        .deploy(client.clone(), ("POP".to_string(), "POP".to_string(), 18_u8))
        .await?;
    let pop = MockERC20::new(pop.address(), client.clone());

    // Popcorn infrastructure.
    let faucet = artifacts
        .get("Faucet")?
        .deploy(
            client.clone(),
            (
                addresses.uniswap_router,
                addresses.curve_address_provider,
                addresses.curve_metapool_deposit_zap,
            ),
        )
        .await?;
    let faucet = Faucet::new(faucet.address(), client.clone());
    let acl_registry = artifacts.get("ACLRegistry")?.deploy(client.clone(), ()).await?;
    let acl_registry = ACLRegistry::new(acl_registry.address(), client.clone());
    let contract_registry = artifacts
        .get("ContractRegistry")?
        .deploy(client.clone(), acl_registry.address())
        .await?;
    let contract_registry = ContractRegistry::new(contract_registry.address(), client.clone());
    let keeper_incentive = artifacts
        .get("KeeperIncentive")?
        .deploy(
            client.clone(),
            (contract_registry.address(), U256::zero(), U256::zero()),
        )
        .await?;
    let keeper_incentive = KeeperIncentive::new(keeper_incentive.address(), client.clone());
    let pop_locker = artifacts
        .get("PopLocker")?
        .deploy(client.clone(), (pop.address(), pop.address()))
        .await?
        .address();
    let rewards_escrow = artifacts
        .get("RewardsEscrow")?
        .deploy(client.clone(), pop.address())
        .await?
        .address();
    let staking = artifacts
        .get("Staking")?
        .deploy(
            client.clone(),
            (pop.address(), set_token.address(), rewards_escrow),
        )
        .await?
        .address();
    info!(
        pop = ?pop.address(),
        faucet = ?faucet.address(),
        contract_registry = ?contract_registry.address(),
        staking = ?staking,
        "deployed Popcorn contracts"
    );

    // Mainnet pools and the issuance module.
    let three_pool = CurveMetapool::new(addresses.three_pool, client.clone());
    let components = addresses
        .components()
        .iter()
        .map(|component| DeployedComponent::new(component, client.clone()))
        .collect::<Vec<_>>();
    let basic_issuance_module = BasicIssuanceModuleManager::new(
        addresses.set_protocol.basic_issuance_module,
        client.clone(),
    );
    basic_issuance_module
        .initialize(set_token.address(), Some(Address::zero()))
        .await?;

    // The batch contract.
    let y_tokens = components
        .iter()
        .map(|component| component.vault.address())
        .collect::<Vec<_>>();
    let curve_dependencies = components
        .iter()
        .map(|component| (component.metapool.address(), component.lp_token.address()))
        .collect::<Vec<_>>();
    let butter_batch = artifacts
        .get("ButterBatchProcessing")?
        .deploy(
            client.clone(),
            (
                contract_registry.address(),
                staking,
                set_token.address(),
                three_crv.address(),
                three_pool.address(),
                basic_issuance_module.address(),
                y_tokens,
                curve_dependencies,
                U256::zero(),
                U256::zero(),
                U256::zero(),
            ),
        )
        .await?;
    let butter_batch = ButterBatchProcessing::new(butter_batch.address(), client.clone());
    send(butter_batch.set_approvals()).await?;

    // Roles, slippage and registry entries.
    send(acl_registry.grant_role(keccak256("DAO"), owner)).await?;
    send(acl_registry.grant_role(keccak256("Keeper"), owner)).await?;
    send(butter_batch.set_mint_slippage(BATCH_SLIPPAGE.into())).await?;
    send(butter_batch.set_redeem_slippage(BATCH_SLIPPAGE.into())).await?;
    let version = keccak256("1");
    for (name, address) in [
        ("POP", pop.address()),
        ("KeeperIncentive", keeper_incentive.address()),
        ("PopLocker", pop_locker),
    ] {
        send(contract_registry.add_contract(keccak256(name), address, version)).await?;
    }

    // Two incentives are registered under the batch contract's name.
    let batch_contract_name = format_bytes32_string(BATCH_CONTRACT_NAME)?;
    for _ in 0..2 {
        send(keeper_incentive.create_incentive(batch_contract_name, U256::zero(), true, false))
            .await?;
    }
    send(keeper_incentive.add_controller_contract(batch_contract_name, butter_batch.address()))
        .await?;
    info!(butter_batch = ?butter_batch.address(), "deployed ButterBatchProcessing");

    Ok(Contracts {
        set_token,
        pop,
        three_crv,
        three_pool,
        components,
        faucet,
        acl_registry,
        contract_registry,
        keeper_incentive,
        pop_locker,
        rewards_escrow,
        staking,
        basic_issuance_module,
        butter_batch,
    })
}
