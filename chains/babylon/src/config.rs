use crate::executor::ExecutorSettings;
use crate::planner::PlanDefaults;
use config::{Config, Environment, File};
use core_logic::{ChainConfig, ConfigError, Cooldown, FeeConfig, MnemonicSource};
use serde::Deserialize;
use std::time::Duration;

pub const ENV_PREFIX: &str = "BBN_SENDER";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Babylon sender configuration. Every field has a default, so an absent
/// config file is equivalent to an empty one.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BabylonConfig {
    pub rpc_endpoint: String,
    /// Queried from the node's status when absent
    pub chain_id: Option<String>,
    pub address_prefix: String,
    pub secondary_prefix: String,
    pub contract_address: String,
    pub tx_denom: String,
    /// Destination address encoded into every instruction
    pub tertiary_address: String,
    pub channel_id: u32,
    pub timeout_height: String,
    pub timeout_offset_hours: u64,
    pub default_amount: String,
    pub default_memo: String,
    pub fee_denom: String,
    pub fee_amount: u64,
    pub gas_limit: u64,
    pub cooldown_secs: u64,
    pub mnemonic_file: String,
    /// When set, mnemonics come from this environment variable instead of the file
    pub mnemonic_env: Option<String>,
}

impl Default for BabylonConfig {
    fn default() -> Self {
        let fee = FeeConfig::default();
        let plan = PlanDefaults::default();
        Self {
            rpc_endpoint: "https://babylon-testnet-rpc.nodes.guru/".to_string(),
            chain_id: None,
            address_prefix: "bbn".to_string(),
            secondary_prefix: "xion".to_string(),
            contract_address: "bbn1336jj8ertl8h7rdvnz4dh5rqahd09cy0x43guhsxx6xyrztx292q77945h"
                .to_string(),
            tx_denom: plan.denom,
            tertiary_address: plan.tertiary_address,
            channel_id: plan.channel_id,
            timeout_height: plan.timeout_height,
            timeout_offset_hours: 72,
            default_amount: plan.default_amount,
            default_memo: plan.memo,
            fee_denom: fee.denom,
            fee_amount: fee.amount,
            gas_limit: fee.gas_limit,
            cooldown_secs: Cooldown::DEFAULT_SECS,
            mnemonic_file: "phrase.txt".to_string(),
            mnemonic_env: None,
        }
    }
}

/// Longest timeout offset whose deadline still fits an `i64` millisecond clock
const MAX_TIMEOUT_OFFSET_SECS: u64 = i64::MAX as u64 / 1000;

impl BabylonConfig {
    /// Loads `path` (optional) and then `BBN_SENDER_*` environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| ConfigError::Load { msg: e.to_string() })?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load { msg: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("rpc_endpoint", &self.rpc_endpoint),
            ("address_prefix", &self.address_prefix),
            ("secondary_prefix", &self.secondary_prefix),
            ("contract_address", &self.contract_address),
            ("tx_denom", &self.tx_denom),
            ("tertiary_address", &self.tertiary_address),
            ("fee_denom", &self.fee_denom),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                });
            }
        }
        if self.gas_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gas_limit".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.timeout_offset_secs().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "timeout_offset_hours".to_string(),
                reason: format!("{} hours is out of range", self.timeout_offset_hours),
            });
        }
        Ok(())
    }

    fn timeout_offset_secs(&self) -> Option<u64> {
        self.timeout_offset_hours
            .checked_mul(60 * 60)
            .filter(|secs| *secs <= MAX_TIMEOUT_OFFSET_SECS)
    }

    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            name: "babylon".to_string(),
            rpc_endpoint: self.rpc_endpoint.clone(),
            chain_id: self.chain_id.clone(),
            address_prefix: self.address_prefix.clone(),
        }
    }

    pub fn fee_config(&self) -> FeeConfig {
        FeeConfig::new(self.fee_denom.clone(), self.fee_amount, self.gas_limit)
    }

    pub fn mnemonic_source(&self) -> MnemonicSource {
        match &self.mnemonic_env {
            Some(key) => MnemonicSource::Env { key: key.clone() },
            None => MnemonicSource::File {
                path: self.mnemonic_file.clone(),
            },
        }
    }

    pub fn plan_defaults(&self) -> PlanDefaults {
        PlanDefaults {
            denom: self.tx_denom.clone(),
            tertiary_address: self.tertiary_address.clone(),
            channel_id: self.channel_id,
            timeout_height: self.timeout_height.clone(),
            timeout_offset: Duration::from_secs(
                self.timeout_offset_secs().unwrap_or(MAX_TIMEOUT_OFFSET_SECS),
            ),
            memo: self.default_memo.clone(),
            default_amount: self.default_amount.clone(),
        }
    }

    pub fn executor_settings(&self) -> ExecutorSettings {
        ExecutorSettings {
            contract_address: self.contract_address.clone(),
            fee: self.fee_config(),
            cooldown: Cooldown::from_secs(self.cooldown_secs),
        }
    }
}
