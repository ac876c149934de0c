use std::env;

use butter_addresses::Network;
use butter_sim::{chain::Chain, constants::OWNER};
use dotenvy::dotenv;
use ethers::signers::LocalWallet;
use eyre::Result;
use set_token::{Configuration, SetTokenManager};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();
    let debug = env::args().any(|arg| arg == "--debug");

    // Connect to the network named by NETWORK.
    let network: Network = env::var("NETWORK")
        .unwrap_or_else(|_| "localhost".to_string())
        .parse()?;
    let rpc_url = network.rpc_url(
        env::var("RPC_URL").ok().as_deref(),
        env::var("INFURA_PROJECT_ID").ok().as_deref(),
    )?;
    let chain = Chain::connect(Some(rpc_url)).await?;
    let signer = match env::var("PRIVATE_KEY") {
        Ok(key) => key.parse::<LocalWallet>()?,
        Err(_) => OWNER.clone(),
    };
    let client = chain.client(signer).await?;

    // Create the set described by SET_TOKEN_CONFIG, or the default HYSI set.
    let configuration = match env::var("SET_TOKEN_CONFIG") {
        Ok(path) => Configuration::from_json_file(path)?,
        Err(_) => Configuration::from_env()?,
    };
    info!(%network, name = %configuration.name, symbol = %configuration.symbol, "creating set token");
    let set_token = SetTokenManager::new(client, configuration)
        .create_set(debug)
        .await?;
    println!("{:?}", set_token);

    Ok(())
}
