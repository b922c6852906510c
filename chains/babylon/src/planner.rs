//! Batch planner: expands resolved options into an ordered list of
//! transaction specs.
//!
//! One wallet → single-wallet mode, N specs with individually supplied
//! amounts. Several wallets → multi-wallet mode, rounds × wallets specs in
//! round-major order sharing one amount. The execution loop consumes the
//! list in exactly this order.

use crate::amount::to_base_units;
use crate::instruction::{validate_address, InstructionPayload};
use crate::tx_builder::DEFAULT_TIMEOUT_OFFSET;
use crate::wallet::WalletAccount;
use core_logic::{ConfigError, CoreError};
use std::fmt;
use std::time::Duration;

/// The three addresses encoded into the instruction payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSet {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl AddressSet {
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        tertiary: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            tertiary: tertiary.into(),
        }
    }
}

/// Round/wallet position of a multi-wallet spec, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTag {
    pub round: u32,
    pub wallet: usize,
}

impl fmt::Display for RoundTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Round {} - Wallet {}", self.round, self.wallet)
    }
}

/// Everything needed to build and send one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSpec {
    pub signer: WalletAccount,
    /// Base units (ubbn)
    pub amount: u128,
    pub denom: String,
    pub addresses: AddressSet,
    pub channel_id: u32,
    pub timeout_height: String,
    pub timeout_offset: Duration,
    pub memo: String,
    pub tag: Option<RoundTag>,
    pub instruction_override: Option<InstructionPayload>,
}

impl TransactionSpec {
    pub fn new(
        signer: WalletAccount,
        amount: u128,
        denom: impl Into<String>,
        addresses: AddressSet,
        channel_id: u32,
    ) -> Self {
        Self {
            signer,
            amount,
            denom: denom.into(),
            addresses,
            channel_id,
            timeout_height: "0".to_string(),
            timeout_offset: DEFAULT_TIMEOUT_OFFSET,
            memo: String::new(),
            tag: None,
            instruction_override: None,
        }
    }

    pub fn with_timeout(mut self, height: impl Into<String>, offset: Duration) -> Self {
        self.timeout_height = height.into();
        self.timeout_offset = offset;
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_tag(mut self, tag: RoundTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_instruction_override(mut self, payload: Option<InstructionPayload>) -> Self {
        self.instruction_override = payload;
        self
    }

    /// The override when present, otherwise freshly encoded
    pub fn instruction(&self) -> Result<InstructionPayload, CoreError> {
        if let Some(payload) = &self.instruction_override {
            return Ok(payload.clone());
        }
        Ok(InstructionPayload::encode(
            self.amount,
            &self.addresses.primary,
            &self.addresses.secondary,
            &self.addresses.tertiary,
        )?)
    }
}

/// Shared values every planned spec inherits
#[derive(Debug, Clone)]
pub struct PlanDefaults {
    pub denom: String,
    pub tertiary_address: String,
    pub channel_id: u32,
    pub timeout_height: String,
    pub timeout_offset: Duration,
    pub memo: String,
    pub default_amount: String,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            denom: "ubbn".to_string(),
            tertiary_address:
                "xion1j0hp6qztgaza7t0y8dvc22eavvvqyds3kze58dlqkulys8r2kc8s9mp0sm".to_string(),
            channel_id: 4,
            timeout_height: "0".to_string(),
            timeout_offset: Duration::from_secs(72 * 60 * 60),
            memo: String::new(),
            default_amount: "0.001".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchMode {
    /// One spec per amount, all from the first wallet
    SingleWallet { amounts: Vec<String> },
    /// `rounds` passes over every wallet with one shared amount
    MultiWallet { rounds: u32, amount: String },
}

#[derive(Debug, Clone)]
pub struct BatchPlan {
    specs: Vec<TransactionSpec>,
    wallet_count: usize,
    rounds: Option<u32>,
}

impl BatchPlan {
    pub fn specs(&self) -> &[TransactionSpec] {
        &self.specs
    }

    pub fn into_specs(self) -> Vec<TransactionSpec> {
        self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn wallet_count(&self) -> usize {
        self.wallet_count
    }

    /// `Some(rounds)` in multi-wallet mode
    pub fn rounds(&self) -> Option<u32> {
        self.rounds
    }

    pub fn total_base_units(&self) -> u128 {
        self.specs.iter().map(|s| s.amount).sum()
    }
}

fn amount_or_default<'a>(input: &'a str, defaults: &'a PlanDefaults) -> &'a str {
    if input.trim().is_empty() {
        &defaults.default_amount
    } else {
        input
    }
}

fn validate_spec(spec: &TransactionSpec) -> Result<(), CoreError> {
    if spec.instruction_override.is_none() {
        validate_address(&spec.addresses.primary)?;
        validate_address(&spec.addresses.secondary)?;
        validate_address(&spec.addresses.tertiary)?;
    }
    Ok(())
}

fn base_spec(
    wallet: &WalletAccount,
    amount: u128,
    defaults: &PlanDefaults,
    instruction_override: &Option<InstructionPayload>,
) -> TransactionSpec {
    TransactionSpec::new(
        wallet.clone(),
        amount,
        defaults.denom.clone(),
        AddressSet::new(
            &wallet.primary_address,
            &wallet.secondary_address,
            &defaults.tertiary_address,
        ),
        defaults.channel_id,
    )
    .with_timeout(defaults.timeout_height.clone(), defaults.timeout_offset)
    .with_instruction_override(instruction_override.clone())
}

/// N specs from `wallet`, one per supplied amount, in input order.
pub fn plan_single_wallet(
    wallet: &WalletAccount,
    amounts: &[String],
    defaults: &PlanDefaults,
    instruction_override: Option<InstructionPayload>,
) -> Result<BatchPlan, CoreError> {
    if amounts.is_empty() {
        return Err(ConfigError::InvalidCount {
            field: "transactions".to_string(),
            value: "0".to_string(),
        }
        .into());
    }

    let mut specs = Vec::with_capacity(amounts.len());
    for input in amounts {
        let amount = to_base_units(amount_or_default(input, defaults))?;
        let spec = base_spec(wallet, amount, defaults, &instruction_override)
            .with_memo(defaults.memo.clone());
        validate_spec(&spec)?;
        specs.push(spec);
    }

    Ok(BatchPlan {
        specs,
        wallet_count: 1,
        rounds: None,
    })
}

/// `rounds × wallets.len()` specs in round-major order, memo tagged with
/// the round and wallet index.
pub fn plan_multi_wallet(
    wallets: &[WalletAccount],
    rounds: u32,
    amount: &str,
    defaults: &PlanDefaults,
    instruction_override: Option<InstructionPayload>,
) -> Result<BatchPlan, CoreError> {
    if rounds == 0 {
        return Err(ConfigError::InvalidCount {
            field: "rounds".to_string(),
            value: rounds.to_string(),
        }
        .into());
    }
    if wallets.is_empty() {
        return Err(ConfigError::NoMnemonics {
            source_name: "wallet list".to_string(),
        }
        .into());
    }

    let amount = to_base_units(amount_or_default(amount, defaults))?;
    let mut specs = Vec::with_capacity(rounds as usize * wallets.len());

    for round in 1..=rounds {
        for wallet in wallets {
            let tag = RoundTag {
                round,
                wallet: wallet.index,
            };
            let memo = if defaults.memo.is_empty() {
                tag.to_string()
            } else {
                format!("{} - {}", defaults.memo, tag)
            };
            let spec = base_spec(wallet, amount, defaults, &instruction_override)
                .with_memo(memo)
                .with_tag(tag);
            validate_spec(&spec)?;
            specs.push(spec);
        }
    }

    Ok(BatchPlan {
        specs,
        wallet_count: wallets.len(),
        rounds: Some(rounds),
    })
}

/// Dispatches on the resolved mode. Single-wallet mode always uses the
/// first wallet.
pub fn plan(
    wallets: &[WalletAccount],
    mode: &BatchMode,
    defaults: &PlanDefaults,
    instruction_override: Option<InstructionPayload>,
) -> Result<BatchPlan, CoreError> {
    match mode {
        BatchMode::SingleWallet { amounts } => {
            let wallet = wallets.first().ok_or_else(|| ConfigError::NoMnemonics {
                source_name: "wallet list".to_string(),
            })?;
            plan_single_wallet(wallet, amounts, defaults, instruction_override)
        }
        BatchMode::MultiWallet { rounds, amount } => {
            plan_multi_wallet(wallets, *rounds, amount, defaults, instruction_override)
        }
    }
}
