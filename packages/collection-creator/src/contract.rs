//! Binding for the deployed collection contract.

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::abi::{self, Address, TokenId, TokenIdSlot};
use crate::rpc::{RpcClient, TransactionReceipt};

/// The contract calls the mint pipeline makes. Each call resolves once the
/// transaction is confirmed.
pub trait TokenContract: Send + Sync {
    /// Account that signs and receives mints.
    fn signer(&self) -> Address;

    /// `mint(to)`.
    fn mint(
        &self,
        to: &Address,
    ) -> impl Future<Output = Result<TransactionReceipt, crate::Error>> + Send;

    /// `setTokenURI(tokenId, uri)`.
    fn set_token_uri(
        &self,
        token_id: &TokenId,
        uri: &str,
    ) -> impl Future<Output = Result<TransactionReceipt, crate::Error>> + Send;
}

/// Locates the `TokenMinted` event in a receipt and reads the token id.
#[derive(Debug, Clone)]
pub struct MintedEvent {
    contract: Address,
    topic: [u8; 32],
    slot: TokenIdSlot,
}

impl MintedEvent {
    pub fn new(contract: Address, signature: &str, slot: TokenIdSlot) -> Self {
        Self {
            contract,
            topic: abi::event_topic(signature),
            slot,
        }
    }

    pub fn topic(&self) -> [u8; 32] {
        self.topic
    }

    /// Token id from the first matching log emitted by the contract.
    pub fn token_id(&self, receipt: &TransactionReceipt) -> Result<TokenId, crate::Error> {
        for log in receipt.logs.iter().filter(|l| l.address == self.contract) {
            let topics = log.topic_words().map_err(crate::Error::Contract)?;
            if topics.first() != Some(&self.topic) {
                continue;
            }
            let data = log.data_bytes().map_err(crate::Error::Contract)?;
            return abi::decode_token_id(self.slot, &topics, &data).map_err(crate::Error::Contract);
        }
        Err(crate::Error::Contract(format!(
            "no TokenMinted event in transaction {}",
            receipt.transaction_hash
        )))
    }
}

/// [`TokenContract`] over JSON-RPC with provider-side signing.
pub struct EvmContract {
    rpc: RpcClient,
    address: Address,
    from: Address,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl EvmContract {
    /// Resolve the signing account: `from` if given, else the provider's first account.
    pub async fn connect(
        rpc: RpcClient,
        address: Address,
        from: Option<Address>,
        poll_interval: Duration,
        receipt_timeout: Duration,
    ) -> Result<Self, crate::Error> {
        let from = match from {
            Some(addr) => addr,
            None => rpc
                .accounts()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| crate::Error::Rpc("wallet provider exposes no accounts".into()))?,
        };
        let chain_id = rpc.chain_id().await?;
        info!(contract = %address, signer = %from, chain_id, "Connected to collection contract");
        Ok(Self {
            rpc,
            address,
            from,
            poll_interval,
            receipt_timeout,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn transact(&self, what: &str, data: Vec<u8>) -> Result<TransactionReceipt, crate::Error> {
        let tx_hash = self
            .rpc
            .send_transaction(&self.from, &self.address, &data)
            .await?;
        debug!(tx = %tx_hash, what, "Transaction submitted");
        let receipt = self.wait_for_receipt(&tx_hash).await?;
        if !receipt.succeeded() {
            return Err(crate::Error::Contract(format!("{what} reverted in {tx_hash}")));
        }
        Ok(receipt)
    }

    /// Poll until the receipt appears. The transaction is already sent, so
    /// RPC errors are retried until the deadline.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, crate::Error> {
        let deadline = Instant::now() + self.receipt_timeout;
        let mut last_error = None;
        loop {
            match self.rpc.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e) => {
                    warn!(tx = %tx_hash, error = %e, "Receipt poll failed, retrying");
                    last_error = Some(e);
                }
            }
            if Instant::now() >= deadline {
                let cause = last_error.map(|e| format!(" (last error: {e})")).unwrap_or_default();
                return Err(crate::Error::Rpc(format!(
                    "transaction {tx_hash} not confirmed after {}s{cause}",
                    self.receipt_timeout.as_secs()
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl TokenContract for EvmContract {
    fn signer(&self) -> Address {
        self.from
    }

    async fn mint(&self, to: &Address) -> Result<TransactionReceipt, crate::Error> {
        self.transact("mint", abi::encode_mint(to)).await
    }

    async fn set_token_uri(
        &self,
        token_id: &TokenId,
        uri: &str,
    ) -> Result<TransactionReceipt, crate::Error> {
        self.transact("setTokenURI", abi::encode_set_token_uri(token_id, uri))
            .await
    }
}
