//! Execution loop.
//!
//! Walks a plan one spec at a time:
//!
//! ```text
//! PENDING -> SIGNING -> BROADCASTING -> SUCCEEDED | FAILED
//! ```
//!
//! The chain client is a single binding that is swapped only when the next
//! spec's signer differs from the bound one. Signing and broadcast failures
//! are recorded against the spec and the loop moves on. Connect, encoding
//! and any other fatal error aborts the run. A fixed cooldown separates
//! consecutive specs; none follows the last one.

use crate::amount::format_display;
use crate::client::{BroadcastReceipt, ChainClient, ClientConnector};
use crate::planner::{RoundTag, TransactionSpec};
use crate::tx_builder::build_execute_msg;
use core_logic::{
    BatchStats, Cooldown, CoreError, FeeConfig, MetricsCollector, BATCH_TARGET, TX_RESULT_TARGET,
};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Immutable settings shared by every spec in a run
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub contract_address: String,
    pub fee: FeeConfig,
    pub cooldown: Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    Pending,
    Signing,
    Broadcasting,
    Succeeded,
    Failed,
}

impl TxPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TxPhase::Succeeded | TxPhase::Failed)
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_advance_to(self, next: TxPhase) -> bool {
        matches!(
            (self, next),
            (TxPhase::Pending, TxPhase::Signing)
                | (TxPhase::Signing, TxPhase::Broadcasting)
                | (TxPhase::Signing, TxPhase::Failed)
                | (TxPhase::Broadcasting, TxPhase::Succeeded)
                | (TxPhase::Broadcasting, TxPhase::Failed)
        )
    }
}

impl fmt::Display for TxPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxPhase::Pending => "PENDING",
            TxPhase::Signing => "SIGNING",
            TxPhase::Broadcasting => "BROADCASTING",
            TxPhase::Succeeded => "SUCCEEDED",
            TxPhase::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// What happened to the binding before a spec ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindChange {
    Reused,
    Initial,
    Switched { from: usize },
}

/// The one "hot" chain client. A bound client reports its own signer.
pub enum ClientBinding<C> {
    Unbound,
    Bound(C),
}

impl<C: ChainClient> ClientBinding<C> {
    pub fn bound_index(&self) -> Option<usize> {
        match self {
            ClientBinding::Unbound => None,
            ClientBinding::Bound(client) => Some(client.wallet_index()),
        }
    }

    /// Binds to `wallet_index` unless already bound to it.
    pub async fn ensure_bound<K>(
        &mut self,
        connector: &K,
        wallet_index: usize,
    ) -> Result<(&C, BindChange), CoreError>
    where
        K: ClientConnector<Client = C>,
    {
        let change = match self.bound_index() {
            Some(current) if current == wallet_index => BindChange::Reused,
            Some(current) => BindChange::Switched { from: current },
            None => BindChange::Initial,
        };

        if change != BindChange::Reused {
            // Drop the old client before connecting the new one
            *self = ClientBinding::Unbound;
            let client = connector.connect(wallet_index).await?;
            if client.wallet_index() != wallet_index {
                return Err(CoreError::Unknown {
                    message: format!(
                        "connector returned wallet {} for wallet {}",
                        client.wallet_index(),
                        wallet_index
                    ),
                });
            }
            *self = ClientBinding::Bound(client);
        }

        match self {
            ClientBinding::Bound(client) => Ok((client, change)),
            ClientBinding::Unbound => Err(CoreError::Unknown {
                message: format!("client for wallet {} not bound", wallet_index),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Succeeded { tx_hash: String },
    Failed { error: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Succeeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    /// 1-based position in the plan
    pub index: usize,
    pub wallet_index: usize,
    pub tag: Option<RoundTag>,
    pub amount: u128,
    pub outcome: ExecutionResult,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub records: Vec<ExecutionRecord>,
    pub rebinds: u64,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn successes(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter().filter(|r| r.outcome.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter().filter(|r| !r.outcome.is_success())
    }

    pub fn stats(&self) -> BatchStats {
        let success = self.successes().count() as u64;
        BatchStats {
            success,
            failed: self.records.len() as u64 - success,
        }
    }
}

pub struct BatchExecutor<K: ClientConnector> {
    connector: K,
    settings: ExecutorSettings,
    binding: ClientBinding<K::Client>,
    metrics: MetricsCollector,
}

impl<K: ClientConnector> BatchExecutor<K> {
    pub fn new(connector: K, settings: ExecutorSettings) -> Self {
        Self {
            connector,
            settings,
            binding: ClientBinding::Unbound,
            metrics: MetricsCollector::default(),
        }
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn bound_wallet(&self) -> Option<usize> {
        self.binding.bound_index()
    }

    /// Runs every spec in order. Errors that are not [`CoreError::is_fatal`]
    /// are recorded in the report; fatal errors abort and are returned.
    pub async fn run(&mut self, specs: &[TransactionSpec]) -> Result<BatchReport, CoreError> {
        let started = Instant::now();
        let total = specs.len();
        let rebinds_before = self.metrics.rebinds();
        let mut records = Vec::with_capacity(total);

        for (position, spec) in specs.iter().enumerate() {
            let index = position + 1;
            if position > 0 {
                self.settings.cooldown.wait().await;
            }

            let outcome = match self.execute_one(index, total, spec).await {
                Ok(receipt) => ExecutionResult::Succeeded {
                    tx_hash: receipt.tx_hash,
                },
                Err(e) if !e.is_fatal() => {
                    self.metrics.record_tx(false);
                    ExecutionResult::Failed {
                        error: e.to_string(),
                    }
                }
                Err(e) => return Err(e),
            };
            records.push(ExecutionRecord {
                index,
                wallet_index: spec.signer.index,
                tag: spec.tag,
                amount: spec.amount,
                outcome,
            });
        }

        let report = BatchReport {
            records,
            rebinds: self.metrics.rebinds() - rebinds_before,
            elapsed: started.elapsed(),
        };
        let stats = report.stats();
        info!(
            target: BATCH_TARGET,
            success = stats.success,
            failed = stats.failed,
            "Batch finished: {}/{} succeeded ({:.1}%)",
            stats.success,
            stats.total(),
            stats.success_rate()
        );
        Ok(report)
    }

    async fn execute_one(
        &mut self,
        index: usize,
        total: usize,
        spec: &TransactionSpec,
    ) -> Result<BroadcastReceipt, CoreError> {
        let wallet = spec.signer.index;
        let round = spec.tag.map(|t| t.round);
        let mut phase = TxPhase::Pending;

        info!(
            target: BATCH_TARGET,
            index, total, wallet,
            "[{}/{}] {} from {}",
            index,
            total,
            format_display(spec.amount),
            spec.signer.short_address()
        );

        let (client, change) = match self.binding.ensure_bound(&self.connector, wallet).await {
            Ok(bound) => bound,
            Err(e) => {
                error!(target: BATCH_TARGET, wallet, "Failed to bind signer: {}", e);
                return Err(e);
            }
        };
        match change {
            BindChange::Reused => {}
            BindChange::Initial => {
                debug!(target: BATCH_TARGET, wallet, "Bound client to wallet {}", wallet)
            }
            BindChange::Switched { from } => {
                self.metrics.record_rebind();
                info!(target: BATCH_TARGET, wallet, "Switching signer: wallet {} -> {}", from, wallet);
            }
        }

        let instruction = spec.instruction()?;
        let msg = build_execute_msg(spec, &instruction, &self.settings.contract_address)?;

        advance(&mut phase, TxPhase::Signing, index);
        let signed = match client.sign(&msg, &spec.memo, &self.settings.fee).await {
            Ok(signed) => signed,
            Err(e) => {
                advance(&mut phase, TxPhase::Failed, index);
                error!(
                    target: TX_RESULT_TARGET,
                    index, total, wallet, round,
                    error = %e,
                    "FAILED [{}/{}] signing: {}", index, total, e
                );
                return Err(e.into());
            }
        };

        advance(&mut phase, TxPhase::Broadcasting, index);
        let sent_at = Instant::now();
        let result = client.broadcast(signed).await;
        self.metrics.record_broadcast_latency(sent_at.elapsed());

        match result {
            Ok(receipt) => {
                advance(&mut phase, TxPhase::Succeeded, index);
                self.metrics.record_tx(true);
                info!(
                    target: TX_RESULT_TARGET,
                    index, total, wallet, round,
                    tx_hash = %receipt.tx_hash,
                    "SUCCESS [{}/{}] {}", index, total, receipt.tx_hash
                );
                Ok(receipt)
            }
            Err(e) => {
                advance(&mut phase, TxPhase::Failed, index);
                error!(
                    target: TX_RESULT_TARGET,
                    index, total, wallet, round,
                    error = %e,
                    "FAILED [{}/{}] {}", index, total, e
                );
                Err(e.into())
            }
        }
    }
}

fn advance(phase: &mut TxPhase, next: TxPhase, index: usize) {
    debug_assert!(phase.can_advance_to(next), "{} -> {}", phase, next);
    debug!(target: BATCH_TARGET, index, "{} -> {}", phase, next);
    *phase = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        use TxPhase::*;
        assert!(Pending.can_advance_to(Signing));
        assert!(Signing.can_advance_to(Broadcasting));
        assert!(Signing.can_advance_to(Failed));
        assert!(Broadcasting.can_advance_to(Succeeded));
        assert!(Broadcasting.can_advance_to(Failed));

        assert!(!Pending.can_advance_to(Broadcasting));
        assert!(!Succeeded.can_advance_to(Pending));
        assert!(!Failed.can_advance_to(Signing));
        assert!(Succeeded.is_terminal() && Failed.is_terminal());
        assert!(!Broadcasting.is_terminal());
    }

    #[test]
    fn test_report_stats() {
        let record = |index, outcome| ExecutionRecord {
            index,
            wallet_index: 1,
            tag: None,
            amount: 1_000,
            outcome,
        };
        let report = BatchReport {
            records: vec![
                record(1, ExecutionResult::Succeeded { tx_hash: "AA".into() }),
                record(2, ExecutionResult::Failed { error: "boom".into() }),
                record(3, ExecutionResult::Succeeded { tx_hash: "BB".into() }),
            ],
            rebinds: 0,
            elapsed: Duration::ZERO,
        };

        let stats = report.stats();
        assert_eq!(stats.success, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(report.failures().next().map(|r| r.index), Some(2));
    }
}
