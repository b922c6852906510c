use async_trait::async_trait;
use babylon_sender::client::{BroadcastReceipt, ChainClient, ClientConnector, SignedTx};
use babylon_sender::executor::{BatchExecutor, ExecutionResult, ExecutorSettings};
use babylon_sender::planner::{plan_multi_wallet, plan_single_wallet, PlanDefaults, TransactionSpec};
use babylon_sender::tx_builder::ExecuteContractMsg;
use babylon_sender::wallet::WalletAccount;
use core_logic::{Cooldown, CoreError, FeeConfig, TransactionError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Connect(usize),
    Sign { wallet: usize, memo: String },
    Broadcast(usize),
}

#[derive(Default)]
struct Shared {
    events: Mutex<Vec<Event>>,
    salts: Mutex<Vec<String>>,
    broadcasts: Mutex<usize>,
    signs: Mutex<usize>,
}

/// Fails the broadcast attempts whose 1-based number is in `fail_on` and
/// the signing attempts in `fail_sign_on`
struct MockConnector {
    shared: Arc<Shared>,
    fail_on: HashSet<usize>,
    fail_sign_on: HashSet<usize>,
    refuse_connect: HashSet<usize>,
    /// Hand out clients signing for this wallet whatever was asked
    report_as: Option<usize>,
}

impl MockConnector {
    fn new(fail_on: &[usize]) -> (Self, Arc<Shared>) {
        let shared = Arc::new(Shared::default());
        (
            Self {
                shared: shared.clone(),
                fail_on: fail_on.iter().copied().collect(),
                fail_sign_on: HashSet::new(),
                refuse_connect: HashSet::new(),
                report_as: None,
            },
            shared,
        )
    }
}

struct MockClient {
    wallet: usize,
    shared: Arc<Shared>,
    fail_on: HashSet<usize>,
    fail_sign_on: HashSet<usize>,
}

#[async_trait]
impl ClientConnector for MockConnector {
    type Client = MockClient;

    async fn connect(&self, wallet_index: usize) -> Result<MockClient, CoreError> {
        if self.refuse_connect.contains(&wallet_index) {
            return Err(TransactionError::Connect {
                endpoint: "mock".to_string(),
                reason: "refused".to_string(),
            }
            .into());
        }
        self.shared
            .events
            .lock()
            .unwrap()
            .push(Event::Connect(wallet_index));
        Ok(MockClient {
            wallet: self.report_as.unwrap_or(wallet_index),
            shared: self.shared.clone(),
            fail_on: self.fail_on.clone(),
            fail_sign_on: self.fail_sign_on.clone(),
        })
    }
}

#[async_trait]
impl ChainClient for MockClient {
    fn wallet_index(&self) -> usize {
        self.wallet
    }

    async fn sign(
        &self,
        msg: &ExecuteContractMsg,
        memo: &str,
        _fee: &FeeConfig,
    ) -> Result<SignedTx, TransactionError> {
        let attempt = {
            let mut count = self.shared.signs.lock().unwrap();
            *count += 1;
            *count
        };
        if self.fail_sign_on.contains(&attempt) {
            return Err(TransactionError::Signing {
                reason: "key unavailable".to_string(),
            });
        }

        let call = msg.call().unwrap();
        self.shared.salts.lock().unwrap().push(call.send.salt);
        self.shared.events.lock().unwrap().push(Event::Sign {
            wallet: self.wallet,
            memo: memo.to_string(),
        });
        Ok(SignedTx {
            bytes: msg.msg.clone(),
            sequence: 0,
        })
    }

    async fn broadcast(&self, _tx: SignedTx) -> Result<BroadcastReceipt, TransactionError> {
        self.shared
            .events
            .lock()
            .unwrap()
            .push(Event::Broadcast(self.wallet));
        let attempt = {
            let mut count = self.shared.broadcasts.lock().unwrap();
            *count += 1;
            *count
        };
        if self.fail_on.contains(&attempt) {
            return Err(TransactionError::Rejected {
                code: 5,
                log: "insufficient funds".to_string(),
            });
        }
        Ok(BroadcastReceipt {
            tx_hash: format!("HASH{}", attempt),
        })
    }
}

fn settings(cooldown: Cooldown) -> ExecutorSettings {
    ExecutorSettings {
        contract_address: "bbn1contract".to_string(),
        fee: FeeConfig::default(),
        cooldown,
    }
}

fn wallets(n: usize) -> Vec<WalletAccount> {
    (1..=n)
        .map(|i| WalletAccount::new(i, format!("bbn1wallet{}", i), format!("xion1wallet{}", i)))
        .collect()
}

fn multi_plan(wallet_count: usize, rounds: u32) -> Vec<TransactionSpec> {
    plan_multi_wallet(&wallets(wallet_count), rounds, "0.001", &PlanDefaults::default(), None)
        .unwrap()
        .into_specs()
}

#[tokio::test]
async fn test_broadcasts_in_plan_order_and_rebinds_between_wallets() {
    let (connector, shared) = MockConnector::new(&[]);
    let mut executor = BatchExecutor::new(connector, settings(Cooldown::none()));

    let report = executor.run(&multi_plan(2, 2)).await.unwrap();

    let events = shared.events.lock().unwrap().clone();
    let sign = |wallet, memo: &str| Event::Sign {
        wallet,
        memo: memo.to_string(),
    };
    assert_eq!(
        events,
        vec![
            Event::Connect(1),
            sign(1, "Round 1 - Wallet 1"),
            Event::Broadcast(1),
            Event::Connect(2),
            sign(2, "Round 1 - Wallet 2"),
            Event::Broadcast(2),
            Event::Connect(1),
            sign(1, "Round 2 - Wallet 1"),
            Event::Broadcast(1),
            Event::Connect(2),
            sign(2, "Round 2 - Wallet 2"),
            Event::Broadcast(2),
        ]
    );

    // first bind is not a rebind
    assert_eq!(report.rebinds, 3);
    assert_eq!(executor.metrics().rebinds(), 3);
    assert_eq!(executor.bound_wallet(), Some(2));
    let indices: Vec<usize> = report.records.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_single_wallet_binds_once() {
    let (connector, shared) = MockConnector::new(&[]);
    let mut executor = BatchExecutor::new(connector, settings(Cooldown::none()));
    let amounts = vec!["1".to_string(), "2".to_string(), "3".to_string()];
    let specs = plan_single_wallet(&wallets(1)[0], &amounts, &PlanDefaults::default(), None)
        .unwrap()
        .into_specs();

    let report = executor.run(&specs).await.unwrap();

    let connects = shared
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, Event::Connect(_)))
        .count();
    assert_eq!(connects, 1);
    assert_eq!(report.rebinds, 0);
    let amounts: Vec<u128> = report.records.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![1_000_000, 2_000_000, 3_000_000]);
}

#[tokio::test]
async fn test_failure_does_not_halt_the_batch() {
    let (connector, _shared) = MockConnector::new(&[2]);
    let mut executor = BatchExecutor::new(connector, settings(Cooldown::none()));

    let report = executor.run(&multi_plan(3, 1)).await.unwrap();

    assert_eq!(report.records.len(), 3);
    assert_eq!(
        report.records[0].outcome,
        ExecutionResult::Succeeded {
            tx_hash: "HASH1".to_string()
        }
    );
    assert!(matches!(
        &report.records[1].outcome,
        ExecutionResult::Failed { error } if error.contains("insufficient funds")
    ));
    assert_eq!(
        report.records[2].outcome,
        ExecutionResult::Succeeded {
            tx_hash: "HASH3".to_string()
        }
    );

    let stats = report.stats();
    assert_eq!((stats.success, stats.failed), (2, 1));
    assert_eq!(executor.metrics().txs_failed(), 1);
    assert_eq!(executor.metrics().txs_success(), 2);
    assert_eq!(report.failures().next().unwrap().wallet_index, 2);
}

#[tokio::test]
async fn test_signing_failure_does_not_halt_the_batch() {
    let (mut connector, shared) = MockConnector::new(&[]);
    connector.fail_sign_on.insert(2);
    let mut executor = BatchExecutor::new(connector, settings(Cooldown::none()));

    let report = executor.run(&multi_plan(3, 1)).await.unwrap();

    assert!(report.records[0].outcome.is_success());
    assert!(matches!(
        &report.records[1].outcome,
        ExecutionResult::Failed { error } if error.contains("key unavailable")
    ));
    assert!(report.records[2].outcome.is_success());

    let stats = report.stats();
    assert_eq!((stats.success, stats.failed), (2, 1));

    // the failed spec never reached broadcast, the next one did
    let broadcasts: Vec<Event> = shared
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, Event::Broadcast(_)))
        .cloned()
        .collect();
    assert_eq!(broadcasts, vec![Event::Broadcast(1), Event::Broadcast(3)]);
    assert_eq!(executor.metrics().txs_failed(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_between_transactions_only() {
    let (connector, _shared) = MockConnector::new(&[2]);
    let mut executor = BatchExecutor::new(connector, settings(Cooldown::from_secs(10)));

    let started = tokio::time::Instant::now();
    let report = executor.run(&multi_plan(3, 1)).await.unwrap();

    // three transactions, two gaps, no trailing wait; a failure still waits
    assert_eq!(report.records.len(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(20));
}

#[tokio::test]
async fn test_salt_is_unique_per_transaction() {
    let (connector, shared) = MockConnector::new(&[]);
    let mut executor = BatchExecutor::new(connector, settings(Cooldown::none()));

    executor.run(&multi_plan(2, 3)).await.unwrap();

    let salts = shared.salts.lock().unwrap().clone();
    let unique: HashSet<&String> = salts.iter().collect();
    assert_eq!(salts.len(), 6);
    assert_eq!(unique.len(), 6);
}

#[tokio::test]
async fn test_connect_failure_aborts_run() {
    let (mut connector, shared) = MockConnector::new(&[]);
    connector.refuse_connect.insert(2);
    let mut executor = BatchExecutor::new(connector, settings(Cooldown::none()));

    let err = executor.run(&multi_plan(3, 1)).await.unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(
        err,
        CoreError::Transaction(TransactionError::Connect { .. })
    ));
    // wallet 1 went out, wallet 3 was never reached
    let broadcasts: Vec<Event> = shared
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, Event::Broadcast(_)))
        .cloned()
        .collect();
    assert_eq!(broadcasts, vec![Event::Broadcast(1)]);
}

#[tokio::test]
async fn test_client_for_wrong_wallet_aborts_run() {
    let (mut connector, shared) = MockConnector::new(&[]);
    connector.report_as = Some(9);
    let mut executor = BatchExecutor::new(connector, settings(Cooldown::none()));

    let err = executor.run(&multi_plan(2, 1)).await.unwrap_err();

    assert!(err.is_fatal());
    assert!(err.to_string().contains("returned wallet 9 for wallet 1"));
    assert_eq!(shared.events.lock().unwrap().clone(), vec![Event::Connect(1)]);
    assert_eq!(executor.bound_wallet(), None);
}

#[tokio::test]
async fn test_empty_plan_is_a_noop() {
    let (connector, shared) = MockConnector::new(&[]);
    let mut executor = BatchExecutor::new(connector, settings(Cooldown::from_secs(10)));

    let report = executor.run(&[]).await.unwrap();

    assert!(report.records.is_empty());
    assert!(shared.events.lock().unwrap().is_empty());
    assert_eq!(executor.bound_wallet(), None);
}
