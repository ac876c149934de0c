use std::env;

use butter_sim::{
    constants::OWNER,
    exchange::{ExchangeConfig, ExchangeSimulation},
    infra::load_addresses,
};
use dotenvy::dotenv;
use ethers::signers::LocalWallet;
use eyre::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ExchangeConfig::from_env()?;
    let chain = config.connect().await?;
    let signer = match env::var("PRIVATE_KEY") {
        Ok(key) => key.parse::<LocalWallet>()?,
        Err(_) => OWNER.clone(),
    };
    let simulation =
        ExchangeSimulation::new(chain, signer, config, &load_addresses().await?).await?;

    let records = simulation.run().await?;
    info!(exchanges = records.len(), "exchange simulation finished");

    Ok(())
}
