use butter_sim::{
    chain::Chain,
    constants::{MAYBE_FORKING_RPC_URL, OWNER},
};
use butter_wrappers::wrappers::set_token::SetToken;
use ethers::{signers::Signer, types::Address};
use eyre::{eyre, Result};
use fixed_point::FixedPoint;
use fixed_point_macros::{fixed, uint256};
use set_token::{
    config::Module, Configuration, FeeSettings, SetTokenCreator, SetTokenManager,
    StreamingFeeModuleManager,
};

fn hysi_fixture() -> Result<Configuration> {
    Configuration::from_json_file(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/hysi.json"))
}

#[test]
fn test_hysi_fixture() -> Result<()> {
    let configuration = hysi_fixture()?;
    assert_eq!(configuration.target_nav(), fixed!(250e18));
    assert_eq!(configuration.manager, None);
    assert_eq!(configuration.components.len(), 4);
    assert!(configuration
        .components
        .values()
        .all(|c| c.ratio == fixed!(25e18)));
    // Components keep the order of the file.
    assert_eq!(
        configuration.components.keys().collect::<Vec<_>>(),
        vec!["ycrvALUSD", "ycrvFRAX", "ycrvMUSD", "ycrvRAI"]
    );
    assert!(matches!(
        configuration.modules().as_slice(),
        [Module::BasicIssuance(_), Module::StreamingFee(_)]
    ));

    let settings = configuration
        .core
        .modules
        .streaming_fee_module
        .and_then(|module| module.settings)
        .ok_or_else(|| eyre!("missing fee settings"))?;
    assert_eq!(
        settings,
        FeeSettings::new(Address::from_low_u64_be(0xfe))
    );

    Ok(())
}

#[ignore]
#[tokio::test]
async fn test_create_set_on_fork() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let forking_rpc_url = MAYBE_FORKING_RPC_URL
        .clone()
        .ok_or_else(|| eyre!("FORKING_RPC_URL is not set"))?;
    let chain = Chain::fork(&forking_rpc_url, 14_221_601).await?;
    let owner = OWNER.address();
    chain.deal(owner, uint256!(100e18)).await?;
    let client = chain.client(OWNER.clone()).await?;

    let mut configuration = hysi_fixture()?;
    if let Some(module) = configuration.core.modules.streaming_fee_module.as_mut() {
        module.settings = Some(FeeSettings::new(owner));
    }

    // The static call predicts the address the token is created at.
    let preview = SetTokenCreator::new(client.clone(), configuration.clone(), true)
        .preview_address()
        .await?;
    let manager = SetTokenManager::new(client.clone(), configuration.clone());
    let set_token = manager.create_set(true).await?;
    assert_eq!(set_token, preview);

    // Both modules are initialized.
    let token = SetToken::new(set_token, client.clone());
    assert_eq!(token.symbol().call().await?, "HYSI");
    assert_eq!(token.manager().call().await?, owner);
    for module in configuration.modules() {
        assert!(
            token.is_initialized_module(module.address()).call().await?,
            "{:?} is not initialized",
            module
        );
    }
    let components = token.get_components().call().await?;
    assert_eq!(components.len(), 4);

    // The fee module stores the configured settings.
    let fee_module = StreamingFeeModuleManager::from_configuration(&configuration, client)?;
    let state = fee_module.fee_state(set_token).await?;
    assert_eq!(state.fee_recipient, owner);
    assert_eq!(state.streaming_fee_percentage, uint256!(0.01e18));
    assert_eq!(state.max_streaming_fee_percentage, uint256!(0.03e18));

    Ok(())
}
