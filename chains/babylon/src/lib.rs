//! Babylon Sender - sequential cross-chain transfer batches on Babylon testnet
//!
//! Sends CosmWasm `send` calls carrying a fixed-layout cross-chain transfer
//! instruction, one transaction at a time, from one or many mnemonic-derived
//! wallets.
//!
//! # Architecture
//!
//! - **[`amount`]**: human BBN decimals ↔ integer ubbn
//! - **[`instruction`]**: fixed 32-byte-word instruction payload encoder
//! - **[`tx_builder`]**: wraps a payload into an execute-contract message
//!   with a fresh salt and timeout
//! - **[`planner`]**: expands resolved options into an ordered spec list
//!   (single-wallet or round-major multi-wallet)
//! - **[`executor`]**: walks the plan, rebinding the chain client between
//!   signers, isolating per-transaction failures and pacing sends
//! - **[`client`]**: chain client capability and its Tendermint RPC
//!   implementation
//! - **[`wallet`]**: mnemonic → signing key → `bbn`/`xion` addresses
//! - **[`config`]** / **[`options`]**: file/env configuration and
//!   flag → prompt → default resolution
//!
//! # Quick Start
//!
//! ```bash
//! # phrase.txt holds one mnemonic per line
//! cargo run -p babylon-sender -- --count 3 --amount 0.001 --dry-run
//! ```
//!
//! # Building a Plan
//!
//! ```rust
//! use babylon_sender::planner::{plan_multi_wallet, PlanDefaults};
//! use babylon_sender::wallet::WalletAccount;
//!
//! let wallets = vec![
//!     WalletAccount::new(1, "bbn1first", "xion1first"),
//!     WalletAccount::new(2, "bbn1second", "xion1second"),
//! ];
//! let plan = plan_multi_wallet(&wallets, 2, "0.5", &PlanDefaults::default(), None).unwrap();
//! assert_eq!(plan.len(), 4);
//! assert_eq!(plan.specs()[1].memo, "Round 1 - Wallet 2");
//! ```

pub mod amount;
pub mod client;
pub mod config;
pub mod executor;
pub mod instruction;
pub mod options;
pub mod planner;
pub mod tx_builder;
pub mod wallet;

pub use client::{BroadcastReceipt, ChainClient, ClientConnector, RpcConnector, SignedTx};
pub use config::BabylonConfig;
pub use executor::{BatchExecutor, BatchReport, ExecutionRecord, ExecutionResult, ExecutorSettings};
pub use instruction::InstructionPayload;
pub use planner::{BatchMode, BatchPlan, PlanDefaults, TransactionSpec};
pub use wallet::{WalletAccount, WalletIdentity};
