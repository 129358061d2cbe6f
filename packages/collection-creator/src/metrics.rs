//! Run counters (lock-free atomics), summarized once at the end of a run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Pinning ---
    pub pin_total: AtomicU64,
    pub pin_errors: AtomicU64,
    pub pin_bytes: AtomicU64,

    // --- Minting ---
    pub mint_total: AtomicU64,
    pub mint_errors: AtomicU64,
    pub mint_duration_us_sum: AtomicU64,
    pub mint_duration_us_max: AtomicU64,

    // --- RPC ---
    pub rpc_failovers: AtomicU64,
    pub rpc_errors: AtomicU64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            pin_total: AtomicU64::new(0),
            pin_errors: AtomicU64::new(0),
            pin_bytes: AtomicU64::new(0),
            mint_total: AtomicU64::new(0),
            mint_errors: AtomicU64::new(0),
            mint_duration_us_sum: AtomicU64::new(0),
            mint_duration_us_max: AtomicU64::new(0),
            rpc_failovers: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
        }
    }

    pub fn record_pin(&self, bytes: u64) {
        self.pin_total.fetch_add(1, Ordering::Relaxed);
        self.pin_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_pin_error(&self) {
        self.pin_total.fetch_add(1, Ordering::Relaxed);
        self.pin_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// One mint attempt (mint + setTokenURI) finished, successfully or not.
    pub fn record_mint(&self, start: Instant, ok: bool) {
        self.mint_total.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.mint_errors.fetch_add(1, Ordering::Relaxed);
        }
        let us = start.elapsed().as_micros() as u64;
        self.mint_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.mint_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.mint_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Single-line `key=value` summary for the end-of-run log.
    pub fn summary(&self) -> String {
        let pin_total = self.pin_total.load(Ordering::Relaxed);
        let pin_errors = self.pin_errors.load(Ordering::Relaxed);
        let pin_bytes = self.pin_bytes.load(Ordering::Relaxed);
        let mint_total = self.mint_total.load(Ordering::Relaxed);
        let mint_errors = self.mint_errors.load(Ordering::Relaxed);
        let mint_sum = self.mint_duration_us_sum.load(Ordering::Relaxed);
        let mint_max = self.mint_duration_us_max.load(Ordering::Relaxed);
        let rpc_failovers = self.rpc_failovers.load(Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);

        let mint_avg_s = if mint_total == 0 {
            0.0
        } else {
            mint_sum as f64 / mint_total as f64 / 1_000_000.0
        };
        let mint_max_s = mint_max as f64 / 1_000_000.0;

        format!(
            "pins={pin_total} pin_errors={pin_errors} pinned_bytes={pin_bytes} \
             mints={mint_total} mint_errors={mint_errors} \
             mint_avg_s={mint_avg_s:.3} mint_max_s={mint_max_s:.3} \
             rpc_errors={rpc_errors} rpc_failovers={rpc_failovers}"
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
