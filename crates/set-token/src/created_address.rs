use butter_wrappers::wrappers::set_token_creator::SetTokenCreatedFilter;
use ethers::{
    contract::EthEvent,
    providers::Middleware,
    types::{Address, TransactionReceipt, H256},
};
use eyre::{eyre, Result};

/// Returns the token announced by the last `SetTokenCreated` event in the
/// receipt. The token address is the event's only indexed argument.
pub fn created_set_token_address(receipt: &TransactionReceipt) -> Result<Address> {
    let signature = SetTokenCreatedFilter::signature();
    receipt
        .logs
        .iter()
        .rev()
        .find(|log| log.topics.len() > 1 && log.topics[0] == signature)
        .map(|log| Address::from(log.topics[1]))
        .ok_or_else(|| {
            eyre!(
                "no SetTokenCreated event in transaction {:?}",
                receipt.transaction_hash
            )
        })
}

/// Fetches the receipt of a creation transaction and returns the created
/// token.
pub async fn find_created_set_token<M: Middleware + 'static>(
    client: &M,
    tx_hash: Option<H256>,
) -> Result<Address> {
    let tx_hash = tx_hash.ok_or_else(|| eyre!("Invalid transaction hash"))?;
    let receipt = client
        .get_transaction_receipt(tx_hash)
        .await
        .map_err(|e| eyre!("failed to fetch receipt for {:?}: {}", tx_hash, e))?
        .ok_or_else(|| eyre!("Invalid transaction hash: no receipt for {:?}", tx_hash))?;
    created_set_token_address(&receipt)
}
