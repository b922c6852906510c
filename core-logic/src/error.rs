//! # Core Error Types
//!
//! Centralized error definitions shared by every chain crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Unified error type for batch operations.
///
/// Wraps the specific error families and decides which of them end the run.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Encoding(EncodingError),

    #[error(transparent)]
    Wallet(WalletError),

    #[error(transparent)]
    Transaction(TransactionError),

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

impl CoreError {
    /// Returns false only for errors scoped to a single transaction.
    ///
    /// Client construction failures are transaction-layer errors but still
    /// abort the run, since no later spec can be signed without a client.
    pub fn is_fatal(&self) -> bool {
        match self {
            CoreError::Transaction(TransactionError::Connect { .. }) => true,
            CoreError::Transaction(_) => false,
            _ => true,
        }
    }
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<EncodingError> for CoreError {
    fn from(e: EncodingError) -> Self {
        CoreError::Encoding(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl From<TransactionError> for CoreError {
    fn from(e: TransactionError) -> Self {
        CoreError::Transaction(e)
    }
}

/// Configuration-related errors. All of them abort before any broadcast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No valid mnemonics found in {source_name}")]
    NoMnemonics { source_name: String },

    #[error("Invalid wallet count {requested}: expected 1-{available}")]
    InvalidWalletCount { requested: String, available: usize },

    #[error("Invalid value for '{field}': '{value}' is not a positive integer")]
    InvalidCount { field: String, value: String },

    #[error("Invalid amount: {input}")]
    InvalidAmount { input: String },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },

    #[error("Failed to load configuration: {msg}")]
    Load { msg: String },
}

/// Instruction payload construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Address '{address}' is {length} bytes, field capacity is {capacity}")]
    AddressTooLong {
        address: String,
        length: usize,
        capacity: usize,
    },

    #[error("Malformed instruction payload: {reason}")]
    MalformedInstruction { reason: String },

    #[error("Failed to serialize contract message: {reason}")]
    Serialization { reason: String },
}

/// Wallet derivation and address errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Invalid mnemonic for wallet {index}: {reason}")]
    InvalidMnemonic { index: usize, reason: String },

    #[error("Key derivation failed for wallet {index}: {reason}")]
    DerivationFailed { index: usize, reason: String },

    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("No signing identity registered for wallet {index}")]
    UnknownSigner { index: usize },
}

/// Signing, broadcast and transport errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("Account query failed for {address}: {reason}")]
    Account { address: String, reason: String },

    #[error("Signing failed: {reason}")]
    Signing { reason: String },

    #[error("Broadcast to {endpoint} failed: {reason}")]
    Broadcast { endpoint: String, reason: String },

    #[error("Transaction rejected with code {code}: {log}")]
    Rejected { code: u32, log: String },
}
