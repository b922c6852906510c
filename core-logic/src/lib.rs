//! # Core Logic - Shared Utilities for Batch Senders
//!
//! This crate provides the chain-agnostic pieces used by every chain crate:
//! error taxonomy, configuration structs, mnemonic loading, logging, pacing
//! and run metrics.
//!
//! ## Modules
//!
//! - [`config`] - Chain and mnemonic source configuration
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Transaction counters and broadcast latency
//! - [`traits`] - Core trait definitions
//! - [`utils`] - Utility modules (logger, fee, mnemonics, cooldown)

pub mod config;
pub mod error;
pub mod metrics;
pub mod traits;
pub(crate) mod utils;

pub use config::{ChainConfig, MnemonicSource};
pub use error::{ConfigError, CoreError, EncodingError, TransactionError, WalletError};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use traits::{BatchStats, WalletLoader};

pub use utils::{
    setup_logger, Cooldown, FeeConfig, Mnemonic, MnemonicManager, BATCH_TARGET, TX_RESULT_TARGET,
};
