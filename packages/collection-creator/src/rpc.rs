//! Ethereum JSON-RPC client with primary → fallback failover for reads.
//!
//! Writes (`eth_accounts`, `eth_sendTransaction`) always go to the primary:
//! the signing account lives in that provider.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::abi::{self, Address};
use crate::metrics::METRICS;

const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
const CIRCUIT_BREAKER_WINDOW_MS: u64 = 30_000;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

struct CircuitState {
    failures: u64,
    last_failure_ms: u64,
    open: bool,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// A log entry from a transaction receipt.
#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

impl Log {
    pub fn topic_words(&self) -> Result<Vec<[u8; 32]>, String> {
        self.topics
            .iter()
            .map(|t| {
                let bytes = abi::from_hex(t)?;
                bytes
                    .try_into()
                    .map_err(|b: Vec<u8>| format!("topic is {} bytes", b.len()))
            })
            .collect()
    }

    pub fn data_bytes(&self) -> Result<Vec<u8>, String> {
        abi::from_hex(&self.data)
    }
}

/// Subset of `eth_getTransactionReceipt` the mint pipeline reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` reverted. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        match self.status.as_deref() {
            Some(s) => parse_quantity(s).map(|v| v == 1).unwrap_or(false),
            None => true,
        }
    }
}

/// Parse a hex `QUANTITY` (`0x2a`).
pub fn parse_quantity(s: &str) -> Result<u64, String> {
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| format!("quantity must start with 0x: {s}"))?;
    u64::from_str_radix(body, 16).map_err(|e| format!("invalid quantity {s}: {e}"))
}

/// JSON-RPC client with failover and a circuit breaker on the primary.
pub struct RpcClient {
    http: reqwest::Client,
    primary_url: String,
    fallback_url: Option<String>,
    circuit: Mutex<CircuitState>,
    total_failovers: AtomicU64,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(
        primary_url: &str,
        fallback_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, crate::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| crate::Error::Config(format!("HTTP client build failed: {e}")))?;
        let fallback_url = fallback_url.filter(|u| !u.is_empty()).map(str::to_string);
        info!(
            primary = primary_url,
            fallback = fallback_url.as_deref().unwrap_or("none"),
            "RPC client initialized"
        );
        Ok(Self {
            http,
            primary_url: primary_url.to_string(),
            fallback_url,
            circuit: Mutex::new(CircuitState {
                failures: 0,
                last_failure_ms: 0,
                open: false,
            }),
            total_failovers: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    // --- Calls ---

    async fn call_url<T: DeserializeOwned>(
        &self,
        url: &str,
        method: &str,
        params: Value,
    ) -> Result<T, crate::Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, url, "RPC call");

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| crate::Error::Rpc(format!("{method}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(crate::Error::Rpc(format!("{method}: HTTP {status}")));
        }
        let resp: RpcResponse = response
            .json()
            .await
            .map_err(|e| crate::Error::Rpc(format!("{method}: invalid response: {e}")))?;

        if let Some(err) = resp.error {
            return Err(crate::Error::Rpc(format!(
                "{method}: {} (code {})",
                err.message, err.code
            )));
        }
        serde_json::from_value(resp.result.unwrap_or(Value::Null))
            .map_err(|e| crate::Error::Rpc(format!("{method}: unexpected result: {e}")))
    }

    /// Primary only. Used for anything that needs the signing account.
    async fn call_primary<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, crate::Error> {
        match self.call_url(&self.primary_url, method, params).await {
            Ok(v) => {
                self.record_success();
                Ok(v)
            }
            Err(e) => {
                self.record_failure();
                Err(e)
            }
        }
    }

    /// Read call with automatic failover.
    async fn call_read<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, crate::Error> {
        let Some(fallback) = self.fallback_url.as_deref() else {
            return self.call_primary(method, params).await;
        };
        if self.is_circuit_open() {
            return self.call_url(fallback, method, params).await;
        }
        match self.call_url(&self.primary_url, method, params.clone()).await {
            Ok(v) => {
                self.record_success();
                Ok(v)
            }
            Err(e) => {
                self.record_failure();
                warn!(error = %e, method, "Primary RPC failed, trying fallback");
                self.call_url(fallback, method, params).await.map_err(|e2| {
                    crate::Error::Rpc(format!("{method} failed: primary={e}, fallback={e2}"))
                })
            }
        }
    }

    // --- Methods ---

    pub async fn accounts(&self) -> Result<Vec<Address>, crate::Error> {
        self.call_primary("eth_accounts", json!([])).await
    }

    pub async fn chain_id(&self) -> Result<u64, crate::Error> {
        let id: String = self.call_read("eth_chainId", json!([])).await?;
        parse_quantity(&id).map_err(crate::Error::Rpc)
    }

    /// Provider-signed transaction. Returns the transaction hash.
    pub async fn send_transaction(
        &self,
        from: &Address,
        to: &Address,
        data: &[u8],
    ) -> Result<String, crate::Error> {
        self.call_primary(
            "eth_sendTransaction",
            json!([{
                "from": from.to_string(),
                "to": to.to_string(),
                "data": abi::to_hex(data),
            }]),
        )
        .await
    }

    /// `None` while the transaction is pending.
    pub async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, crate::Error> {
        self.call_read("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }

    // --- Failover / circuit breaker ---

    fn record_success(&self) {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if circuit.failures > 0 {
            info!(primary = %self.primary_url, "Primary RPC recovered");
            circuit.failures = 0;
            circuit.open = false;
        }
    }

    fn record_failure(&self) {
        METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        circuit.failures += 1;
        circuit.last_failure_ms = now_ms();
        if self.fallback_url.is_some()
            && circuit.failures >= CIRCUIT_BREAKER_THRESHOLD
            && !circuit.open
        {
            circuit.open = true;
            self.total_failovers.fetch_add(1, Ordering::Relaxed);
            METRICS.rpc_failovers.fetch_add(1, Ordering::Relaxed);
            warn!(
                failures = circuit.failures,
                fallback = ?self.fallback_url,
                "Circuit breaker opened, routing reads to fallback"
            );
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if !circuit.open {
            return false;
        }
        if now_ms().saturating_sub(circuit.last_failure_ms) > CIRCUIT_BREAKER_WINDOW_MS {
            circuit.open = false;
            circuit.failures = 0;
            info!(primary = %self.primary_url, "Circuit breaker half-open, retrying primary");
            return false;
        }
        true
    }

    pub fn failover_count(&self) -> u64 {
        self.total_failovers.load(Ordering::Relaxed)
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
