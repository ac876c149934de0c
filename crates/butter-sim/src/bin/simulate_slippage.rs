use std::env;

use butter_sim::{
    constants::{ARTIFACTS_DIR, OWNER},
    infra::load_addresses,
    simulation::{SimulationConfig, SlippageSimulation},
};
use butter_wrappers::artifacts::ArtifactStore;
use dotenvy::dotenv;
use ethers::signers::LocalWallet;
use eyre::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = SimulationConfig::from_env()?;
    let chain = config.connect().await?;
    let signer = match env::var("PRIVATE_KEY") {
        Ok(key) => key.parse::<LocalWallet>()?,
        Err(_) => OWNER.clone(),
    };
    let simulation = SlippageSimulation::new(
        chain,
        signer,
        config.clone(),
        load_addresses().await?,
        ArtifactStore::new(ARTIFACTS_DIR.as_str()),
    )
    .await?;

    let records = simulation.run().await?;
    let acceptable = records.iter().filter(|record| record.acceptable).count();
    info!(
        steps = records.len(),
        acceptable,
        csv = %config.csv_path.display(),
        "simulation finished"
    );

    Ok(())
}
