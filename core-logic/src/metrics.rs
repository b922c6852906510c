use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub transactions: TxMetrics,
    pub broadcast: LatencyMetrics,
    pub signer_rebinds: u64,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxMetrics {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyMetrics {
    pub calls: u64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

/// Counters for one batch run. Every field is atomic so the collector can be
/// shared behind `&` while the execution loop owns the client.
#[derive(Debug)]
pub struct MetricsCollector {
    txs_total: AtomicU64,
    txs_success: AtomicU64,
    txs_failed: AtomicU64,
    broadcast_calls: AtomicU64,
    broadcast_latency_sum_ms: AtomicU64,
    broadcast_min_latency_ms: AtomicU64,
    broadcast_max_latency_ms: AtomicU64,
    rebinds: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            txs_total: AtomicU64::new(0),
            txs_success: AtomicU64::new(0),
            txs_failed: AtomicU64::new(0),
            broadcast_calls: AtomicU64::new(0),
            broadcast_latency_sum_ms: AtomicU64::new(0),
            broadcast_min_latency_ms: AtomicU64::new(u64::MAX),
            broadcast_max_latency_ms: AtomicU64::new(0),
            rebinds: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl MetricsCollector {
    pub fn record_tx(&self, success: bool) {
        self.txs_total.fetch_add(1, Ordering::SeqCst);
        if success {
            self.txs_success.fetch_add(1, Ordering::SeqCst);
        } else {
            self.txs_failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn record_broadcast_latency(&self, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;
        self.broadcast_calls.fetch_add(1, Ordering::SeqCst);
        self.broadcast_latency_sum_ms
            .fetch_add(latency_ms, Ordering::SeqCst);
        self.broadcast_min_latency_ms
            .fetch_min(latency_ms, Ordering::SeqCst);
        self.broadcast_max_latency_ms
            .fetch_max(latency_ms, Ordering::SeqCst);
    }

    pub fn record_rebind(&self) {
        self.rebinds.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.txs_total.load(Ordering::SeqCst);
        let success = self.txs_success.load(Ordering::SeqCst);
        let calls = self.broadcast_calls.load(Ordering::SeqCst);
        let latency_sum = self.broadcast_latency_sum_ms.load(Ordering::SeqCst);
        let min_latency = self.broadcast_min_latency_ms.load(Ordering::SeqCst);

        MetricsSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            transactions: TxMetrics {
                total,
                success,
                failed: self.txs_failed.load(Ordering::SeqCst),
                success_rate: if total > 0 {
                    success as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
            },
            broadcast: LatencyMetrics {
                calls,
                avg_latency_ms: if calls > 0 {
                    latency_sum as f64 / calls as f64
                } else {
                    0.0
                },
                min_latency_ms: if min_latency == u64::MAX {
                    0
                } else {
                    min_latency
                },
                max_latency_ms: self.broadcast_max_latency_ms.load(Ordering::SeqCst),
            },
            signer_rebinds: self.rebinds.load(Ordering::SeqCst),
            uptime_secs: self.uptime().as_secs(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    pub async fn export_to_file(&self, path: &str) -> std::io::Result<()> {
        tokio::fs::write(path, self.to_json()).await
    }

    pub fn txs_total(&self) -> u64 {
        self.txs_total.load(Ordering::SeqCst)
    }

    pub fn txs_success(&self) -> u64 {
        self.txs_success.load(Ordering::SeqCst)
    }

    pub fn txs_failed(&self) -> u64 {
        self.txs_failed.load(Ordering::SeqCst)
    }

    pub fn rebinds(&self) -> u64 {
        self.rebinds.load(Ordering::SeqCst)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
