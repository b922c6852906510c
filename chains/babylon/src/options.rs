//! Option resolution: command-line flag first, then an interactive prompt,
//! then the configured default.
//!
//! Prompts go through [`Prompter`] so the resolution rules can be driven
//! from scripted answers. An empty answer selects the default; a question
//! with no default (the transaction/round count) turns an empty answer into
//! `MissingField`.

use crate::planner::{BatchMode, PlanDefaults};
use core_logic::ConfigError;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

pub trait Prompter {
    /// Asks `prompt` and returns the raw (possibly empty) answer.
    fn ask(&mut self, prompt: &str) -> Result<String, ConfigError>;
}

/// Terminal prompts via `dialoguer`
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String, ConfigError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ConfigError::IoError {
                path: "stdin".to_string(),
                msg: e.to_string(),
            })
    }
}

/// Never prompts; every question is answered with its default (`--yes`).
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn ask(&mut self, _prompt: &str) -> Result<String, ConfigError> {
        Ok(String::new())
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct OptionInputs {
    pub wallets: Option<usize>,
    pub count: Option<u32>,
    pub amounts: Vec<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// First `wallet_count` wallets take part
    pub wallet_count: usize,
    pub mode: BatchMode,
    pub memo: String,
}

impl ResolvedOptions {
    pub fn apply_to(&self, defaults: &PlanDefaults) -> PlanDefaults {
        PlanDefaults {
            memo: self.memo.clone(),
            ..defaults.clone()
        }
    }
}

fn parse_positive(field: &str, answer: &str) -> Result<u32, ConfigError> {
    let value = answer.trim();
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidCount {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

fn resolve_wallet_count(
    flag: Option<usize>,
    available: usize,
    prompter: &mut dyn Prompter,
) -> Result<usize, ConfigError> {
    let invalid = |requested: String| ConfigError::InvalidWalletCount {
        requested,
        available,
    };

    let requested = match flag {
        Some(n) => n,
        // Nothing to ask with one wallet
        None if available == 1 => 1,
        None => {
            let answer = prompter.ask(&format!(
                "How many wallets do you want to use? (1-{}, default: all)",
                available
            ))?;
            let answer = answer.trim();
            if answer.is_empty() {
                available
            } else {
                answer.parse().map_err(|_| invalid(answer.to_string()))?
            }
        }
    };

    if requested == 0 || requested > available {
        return Err(invalid(requested.to_string()));
    }
    Ok(requested)
}

fn resolve_count(
    flag: Option<u32>,
    field: &str,
    prompt: &str,
    prompter: &mut dyn Prompter,
) -> Result<u32, ConfigError> {
    if let Some(n) = flag {
        return parse_positive(field, &n.to_string());
    }
    let answer = prompter.ask(prompt)?;
    if answer.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_string(),
        });
    }
    parse_positive(field, &answer)
}

fn resolve_amount(
    flag: Option<&String>,
    prompt: &str,
    defaults: &PlanDefaults,
    prompter: &mut dyn Prompter,
) -> Result<String, ConfigError> {
    if let Some(amount) = flag {
        return Ok(amount.clone());
    }
    let answer = prompter.ask(prompt)?;
    let answer = answer.trim();
    Ok(if answer.is_empty() {
        defaults.default_amount.clone()
    } else {
        answer.to_string()
    })
}

/// Resolves the batch shape for `available` loaded wallets.
pub fn resolve(
    inputs: &OptionInputs,
    available: usize,
    defaults: &PlanDefaults,
    prompter: &mut dyn Prompter,
) -> Result<ResolvedOptions, ConfigError> {
    if available == 0 {
        return Err(ConfigError::NoMnemonics {
            source_name: "wallet list".to_string(),
        });
    }

    let wallet_count = resolve_wallet_count(inputs.wallets, available, prompter)?;

    let mode = if wallet_count == 1 {
        let count = resolve_count(
            inputs.count,
            "transactions",
            "How many transactions do you want to send?",
            prompter,
        )?;
        let amounts = (0..count as usize)
            .map(|i| {
                resolve_amount(
                    inputs.amounts.get(i),
                    &format!(
                        "Amount for tx {} in BBN (default: {})",
                        i + 1,
                        defaults.default_amount
                    ),
                    defaults,
                    prompter,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        BatchMode::SingleWallet { amounts }
    } else {
        let rounds = resolve_count(
            inputs.count,
            "rounds",
            &format!(
                "How many rounds do you want to send? (each round sends from all {} wallets)",
                wallet_count
            ),
            prompter,
        )?;
        let amount = resolve_amount(
            inputs.amounts.first(),
            &format!(
                "Amount per transaction in BBN (default: {})",
                defaults.default_amount
            ),
            defaults,
            prompter,
        )?;
        BatchMode::MultiWallet { rounds, amount }
    };

    Ok(ResolvedOptions {
        wallet_count,
        mode,
        memo: inputs.memo.clone().unwrap_or_else(|| defaults.memo.clone()),
    })
}
