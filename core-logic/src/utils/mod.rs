//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod fee;
pub(crate) mod logger;
pub(crate) mod mnemonic_manager;
pub(crate) mod pacer;

// Selective exports - only public utilities
pub use fee::FeeConfig;
pub use logger::{setup_logger, BATCH_TARGET, TX_RESULT_TARGET};
pub use mnemonic_manager::{Mnemonic, MnemonicManager};
pub use pacer::Cooldown;
