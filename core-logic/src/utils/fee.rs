//! # Core Logic - Fee Configuration
//!
//! Fixed per-transaction fee settings. The sender never estimates gas; every
//! transaction in a batch pays the same configured fee.

use serde::{Deserialize, Serialize};

/// Fee attached to every signed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub denom: String,
    pub amount: u64,
    pub gas_limit: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            denom: Self::DEFAULT_DENOM.to_string(),
            amount: Self::DEFAULT_AMOUNT,
            gas_limit: Self::DEFAULT_GAS_LIMIT,
        }
    }
}

impl FeeConfig {
    pub const DEFAULT_DENOM: &'static str = "ubbn";
    pub const DEFAULT_AMOUNT: u64 = 4970;
    pub const DEFAULT_GAS_LIMIT: u64 = 496_922;

    pub fn new(denom: impl Into<String>, amount: u64, gas_limit: u64) -> Self {
        Self {
            denom: denom.into(),
            amount,
            gas_limit,
        }
    }
}
