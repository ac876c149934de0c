use butter_addresses::ButterAddresses;
use butter_sim::{
    batch::ButterBatchAdapter,
    constants::{ARTIFACTS_DIR, MAYBE_FORKING_RPC_URL, OWNER},
    deploy::deploy_contracts,
    exchange::{ExchangeConfig, ExchangeSimulation},
    simulation::{SimulationConfig, SlippageRecord, SlippageSimulation},
};
use butter_wrappers::artifacts::ArtifactStore;
use ethers::{signers::Signer, types::U256};
use eyre::{eyre, Result};
use fixed_point_macros::uint256;

fn forking_rpc_url() -> Result<String> {
    MAYBE_FORKING_RPC_URL
        .clone()
        .ok_or_else(|| eyre!("FORKING_RPC_URL is not set"))
}

#[ignore]
#[tokio::test]
async fn test_deploy_contracts() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let config = SimulationConfig {
        forking_rpc_url: Some(forking_rpc_url()?),
        ..Default::default()
    };
    let chain = config.connect().await?;
    chain.deal(OWNER.address(), uint256!(100e18)).await?;
    let client = chain.client(OWNER.clone()).await?;
    let contracts = deploy_contracts(
        client.clone(),
        OWNER.address(),
        &ButterAddresses::default(),
        &ArtifactStore::new(ARTIFACTS_DIR.as_str()),
    )
    .await?;

    // The set holds the four vaults and the new batch is empty.
    assert_eq!(contracts.set_token.get_components().call().await?.len(), 4);
    assert_eq!(contracts.components.len(), 4);
    let batch = ButterBatchAdapter::new(contracts.butter_batch.clone())
        .current_mint_batch()
        .await?;
    assert!(!batch.claimable);
    assert_eq!(batch.supplied_token_balance, U256::zero());
    assert_eq!(batch.supplied_token_address, contracts.three_crv.address());
    assert_eq!(batch.claimable_token_address, contracts.set_token.address());

    Ok(())
}

#[ignore]
#[tokio::test]
async fn test_slippage_step() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let dir = tempfile::tempdir()?;
    let config = SimulationConfig {
        forking_rpc_url: Some(forking_rpc_url()?),
        csv_path: dir.path().join("slippage.csv"),
        ..Default::default()
    };
    let chain = config.connect().await?;
    chain.deal(OWNER.address(), uint256!(100e18)).await?;
    let simulation = SlippageSimulation::new(
        chain,
        OWNER.clone(),
        config.clone(),
        ButterAddresses::default(),
        ArtifactStore::new(ARTIFACTS_DIR.as_str()),
    )
    .await?;

    let record = simulation.step().await?;
    assert!(record.block >= config.start_block);
    assert!(!record.output_amount.is_zero());
    assert_eq!(record.input_amount, config.input_amount);
    assert!(record.slippage.is_finite());

    record.append_to(&config.csv_path)?;
    let csv = std::fs::read_to_string(&config.csv_path)?;
    assert!(csv.starts_with(SlippageRecord::CSV_HEADER));
    assert!(csv.ends_with(&format!("\r\n{}", record)));

    Ok(())
}

#[ignore]
#[tokio::test]
async fn test_exchange_step() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let config = ExchangeConfig {
        forking_rpc_url: Some(forking_rpc_url()?),
        ..Default::default()
    };
    let chain = config.connect().await?;
    chain.deal(OWNER.address(), uint256!(100e18)).await?;
    let simulation =
        ExchangeSimulation::new(chain, OWNER.clone(), config.clone(), &ButterAddresses::default())
            .await?;

    let record = simulation.step().await?;
    assert_eq!(record.source_amount, config.source_amount);
    assert!(!record.amount_received.is_zero());

    Ok(())
}
