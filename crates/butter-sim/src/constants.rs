use std::env;

use ethers::{signers::LocalWallet, utils::keccak256};

lazy_static! {
    // The account that deploys the contracts and deposits into the batch.
    pub static ref OWNER: LocalWallet = LocalWallet::from_bytes(&keccak256("owner")).unwrap();
    pub static ref ALICE: LocalWallet = LocalWallet::from_bytes(&keccak256("alice")).unwrap();

    // The archive node the simulations fork from. Fork tests are skipped
    // without it.
    pub static ref MAYBE_FORKING_RPC_URL: Option<String> = env::var("FORKING_RPC_URL").ok();

    // Where the compiled Butter contracts are found.
    pub static ref ARTIFACTS_DIR: String = env::var("BUTTER_ARTIFACTS_DIR").unwrap_or_else(|_| "artifacts".to_string());
}
