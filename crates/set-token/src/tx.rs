use ethers::{
    abi::Detokenize, contract::ContractCall, providers::Middleware, types::TransactionReceipt,
};
use eyre::{eyre, Result};

/// Sends a contract call and waits for it to be mined. Reverted and dropped
/// transactions are errors.
pub async fn send<M: Middleware + 'static, D: Detokenize>(
    call: ContractCall<M, D>,
) -> Result<TransactionReceipt> {
    let receipt = call
        .send()
        .await?
        .await?
        .ok_or_else(|| eyre!("transaction was dropped from the mempool"))?;
    if receipt.status != Some(1.into()) {
        return Err(eyre!(
            "transaction {:?} reverted",
            receipt.transaction_hash
        ));
    }
    Ok(receipt)
}
