//! A handle on the chain the simulations run against, usually an anvil fork
//! of mainnet, and the client stack transactions are sent through.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use ethers::{
    core::utils::Anvil,
    middleware::{
        gas_escalator::{Frequency, GeometricGasPrice},
        nonce_manager::NonceManagerError,
        GasEscalatorMiddleware, MiddlewareError, NonceManagerMiddleware, SignerMiddleware,
    },
    providers::{
        Http, HttpClientError, HttpRateLimitRetryPolicy, Middleware, PendingTransaction, Provider,
        RetryClient, RetryClientBuilder, RetryPolicy,
    },
    signers::Signer,
    types::{
        transaction::eip2718::TypedTransaction, Address, Block, BlockId, BlockNumber, H256, U256,
    },
    utils::AnvilInstance,
};
use eyre::{eyre, Result};
use serde_json::json;
use tracing::debug;

/// Errors a forked anvil node returns while it is still fetching state from
/// the upstream archive node. They go away on their own.
const TRANSIENT_FORK_ERRORS: [&str; 3] = [
    "intrinsic gas too high",
    "header not found",
    "failed to get account",
];

fn is_transient_fork_error(error: &HttpClientError) -> bool {
    let error = error.to_string();
    TRANSIENT_FORK_ERRORS
        .iter()
        .any(|message| error.contains(message))
}

/// Retries rate limits and timeouts like the default policy, and also the
/// transient errors of a forked node.
#[derive(Debug, Default)]
struct ForkRetryPolicy(HttpRateLimitRetryPolicy);

impl RetryPolicy<HttpClientError> for ForkRetryPolicy {
    fn should_retry(&self, error: &HttpClientError) -> bool {
        self.0.should_retry(error) || is_transient_fork_error(error)
    }

    fn backoff_hint(&self, error: &HttpClientError) -> Option<Duration> {
        self.0.backoff_hint(error).or_else(|| {
            is_transient_fork_error(error).then(|| Duration::from_millis(100))
        })
    }
}

type ChainClientProvider = Arc<RetryClient<Http>>;

type ChainClientInner<S> = NonceManagerMiddleware<
    SignerMiddleware<GasEscalatorMiddleware<Provider<ChainClientProvider>>, S>,
>;

/// A signing client whose stack retries transient RPC failures, tracks
/// nonces locally and bumps gas prices of stuck transactions every block.
#[derive(Debug)]
pub struct ChainClient<S: Signer + 'static> {
    inner: ChainClientInner<S>,
    address: Address,
}

impl<S: Signer + 'static> ChainClient<S> {
    pub async fn new(provider: Provider<Http>, signer: S) -> Result<Self> {
        let provider = RetryClientBuilder::default()
            .rate_limit_retries(10)
            .timeout_retries(3)
            .initial_backoff(Duration::from_millis(100))
            .build(
                provider.as_ref().clone(),
                Box::<ForkRetryPolicy>::default(),
            );
        let provider = Provider::new(Arc::new(provider)).interval(Duration::from_millis(10));

        let inner = GasEscalatorMiddleware::new(
            provider,
            GeometricGasPrice::new(1.125, 10u64, None::<u64>),
            Frequency::PerBlock,
        );
        let inner = SignerMiddleware::new_with_provider_chain(inner, signer).await?;
        let address = inner.address();
        let inner = NonceManagerMiddleware::new(inner, address);

        Ok(Self { inner, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl<S: Signer + 'static> Middleware for ChainClient<S> {
    // Pass-through: errors come from the top of the stack.
    type Error = NonceManagerError<Self::Inner>;

    type Provider = ChainClientProvider;
    type Inner = ChainClientInner<S>;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn send_transaction<T: Into<TypedTransaction> + Send + Sync>(
        &self,
        tx: T,
        block: Option<BlockId>,
    ) -> Result<PendingTransaction<'_, Self::Provider>, Self::Error> {
        Ok(self
            .inner
            .send_transaction(tx, block)
            .await
            .map_err(MiddlewareError::from_err)?)
    }
}

/// An Ethereum chain plus the anvil cheat codes the simulations need to
/// rewind, fund and fast-forward it.
pub struct Chain {
    provider: Provider<Http>,
    client_version: String,
    _maybe_anvil: Option<AnvilInstance>,
}

impl Chain {
    /// Connects to `rpc_url`, or spawns a local anvil node when no url is
    /// given.
    pub async fn connect(maybe_rpc_url: Option<String>) -> Result<Self> {
        match maybe_rpc_url {
            Some(rpc_url) => Self::from_url(&rpc_url, None).await,
            None => Self::spawn(Anvil::new()).await,
        }
    }

    /// Spawns a local anvil node forked from `forking_url` at `block`.
    pub async fn fork(forking_url: &str, block: u64) -> Result<Self> {
        Self::spawn(Anvil::new().fork(forking_url).fork_block_number(block)).await
    }

    async fn from_url(rpc_url: &str, anvil: Option<AnvilInstance>) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)?.interval(Duration::from_millis(10));
        let client_version = provider.client_version().await?;
        debug!(%rpc_url, %client_version, "connected to chain");
        Ok(Self {
            provider,
            client_version,
            _maybe_anvil: anvil,
        })
    }

    async fn spawn(anvil: Anvil) -> Result<Self> {
        let anvil = anvil.spawn();
        let endpoint = anvil.endpoint();
        Self::from_url(&endpoint, Some(anvil)).await
    }

    pub fn provider(&self) -> Provider<Http> {
        self.provider.clone()
    }

    pub async fn client<S: Signer + 'static>(&self, signer: S) -> Result<Arc<ChainClient<S>>> {
        Ok(Arc::new(ChainClient::new(self.provider(), signer).await?))
    }

    /// Resets the node to a fresh fork of `forking_url` at `block`. Every
    /// contract deployed and every balance dealt since is gone.
    pub async fn reset_fork(&self, forking_url: &str, block: u64) -> Result<()> {
        self.ensure_anvil("reset")?;
        self.provider
            .request::<_, ()>(
                "anvil_reset",
                [json!({
                    "forking": {
                        "jsonRpcUrl": forking_url,
                        "blockNumber": block,
                    }
                })],
            )
            .await?;
        Ok(())
    }

    /// Lets transactions from `address` be sent without its key.
    pub async fn impersonate(&self, address: Address) -> Result<()> {
        self.ensure_anvil("impersonate")?;
        self.provider
            .request::<_, ()>("anvil_impersonateAccount", [address])
            .await?;
        Ok(())
    }

    pub async fn stop_impersonating(&self, address: Address) -> Result<()> {
        self.ensure_anvil("impersonate")?;
        self.provider
            .request::<_, ()>("anvil_stopImpersonatingAccount", [address])
            .await?;
        Ok(())
    }

    /// Adds `amount` wei to the ether balance of `address`.
    pub async fn deal<U: Into<U256>>(&self, address: Address, amount: U) -> Result<()> {
        self.ensure_anvil("deal")?;
        let balance = self.provider.get_balance(address, None).await?;
        self.provider
            .request::<(Address, U256), ()>("anvil_setBalance", (address, balance + amount))
            .await?;
        Ok(())
    }

    pub async fn mine(&self, blocks: u64) -> Result<()> {
        self.ensure_anvil("mine")?;
        self.provider
            .request::<[U256; 1], ()>("anvil_mine", [U256::from(blocks)])
            .await?;
        Ok(())
    }

    /// Moves the clock forward by `duration` seconds and mines a block at the
    /// new time.
    pub async fn increase_time(&self, duration: u128) -> Result<()> {
        self.ensure_anvil("increase the time of")?;
        self.provider
            .request::<[u128; 1], i128>("anvil_increaseTime", [duration])
            .await?;
        self.mine(1).await
    }

    pub async fn snapshot(&self) -> Result<U256> {
        self.ensure_anvil("snapshot")?;
        let id = self.provider.request("evm_snapshot", ()).await?;
        Ok(id)
    }

    pub async fn revert<U: Into<U256>>(&self, id: U) -> Result<()> {
        self.ensure_anvil("revert")?;
        let reverted = self
            .provider
            .request::<[U256; 1], bool>("evm_revert", [id.into()])
            .await?;
        if !reverted {
            return Err(eyre!("snapshot not found"));
        }
        Ok(())
    }

    pub async fn latest_block(&self) -> Result<Block<H256>> {
        self.provider
            .get_block(BlockNumber::Latest)
            .await?
            .ok_or_else(|| eyre!("the chain has no latest block"))
    }

    fn ensure_anvil(&self, action: &str) -> Result<()> {
        if self.is_anvil() {
            Ok(())
        } else {
            Err(eyre!(
                "can't {} a non-anvil chain (client version {})",
                action,
                self.client_version
            ))
        }
    }

    fn is_anvil(&self) -> bool {
        self.client_version.contains("anvil")
    }
}
