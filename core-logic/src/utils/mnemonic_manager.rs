use crate::config::MnemonicSource;
use crate::error::ConfigError;
use crate::traits::WalletLoader;
use crate::utils::logger::BATCH_TARGET;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// One seed phrase. Wiped from memory on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic {
    phrase: String,
}

impl Mnemonic {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("words", &self.word_count())
            .field("phrase", &"***REDACTED***")
            .finish()
    }
}

/// Reads newline-delimited seed phrases, one wallet per non-empty line.
pub struct MnemonicManager {
    source: MnemonicSource,
}

impl MnemonicManager {
    pub const DEFAULT_FILE: &'static str = "phrase.txt";

    pub fn new(source: MnemonicSource) -> Self {
        Self { source }
    }

    pub fn from_file(path: impl Into<String>) -> Self {
        Self::new(MnemonicSource::File { path: path.into() })
    }

    pub fn source(&self) -> &MnemonicSource {
        &self.source
    }

    /// Splits raw content into phrases. Blank lines are skipped and
    /// surrounding whitespace is trimmed; an empty result is an error.
    pub fn parse(content: &str, source_name: &str) -> Result<Vec<Mnemonic>, ConfigError> {
        let phrases: Vec<Mnemonic> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Mnemonic::new)
            .collect();

        if phrases.is_empty() {
            return Err(ConfigError::NoMnemonics {
                source_name: source_name.to_string(),
            });
        }
        Ok(phrases)
    }

    pub async fn load(&self) -> Result<Vec<Mnemonic>, ConfigError> {
        let source_name = self.source.describe();
        let content = Zeroizing::new(match &self.source {
            MnemonicSource::File { path } => {
                if !Path::new(path).exists() {
                    return Err(ConfigError::FileNotFound { path: path.clone() });
                }
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| ConfigError::IoError {
                        path: path.clone(),
                        msg: e.to_string(),
                    })?
            }
            MnemonicSource::Env { key } => {
                std::env::var(key).map_err(|_| ConfigError::MissingField { field: key.clone() })?
            }
        });

        let phrases = Self::parse(&content, &source_name)?;
        info!(target: BATCH_TARGET, "Found {} wallet(s) in {}", phrases.len(), source_name);
        Ok(phrases)
    }
}

#[async_trait]
impl WalletLoader for MnemonicManager {
    type Wallet = Mnemonic;

    async fn load_wallets(&self) -> Result<Vec<Self::Wallet>> {
        Ok(self.load().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let content = "word one two\n\n   \nthree four five  \n";
        let phrases = MnemonicManager::parse(content, "memory").unwrap();
        assert_eq!(phrases.len(), 2);
        assert_eq!(phrases[0].phrase(), "word one two");
        assert_eq!(phrases[1].phrase(), "three four five");
    }

    #[test]
    fn test_parse_empty_is_config_error() {
        let err = MnemonicManager::parse("\n  \n", "phrase.txt").unwrap_err();
        assert_eq!(
            err,
            ConfigError::NoMnemonics {
                source_name: "phrase.txt".to_string()
            }
        );
    }

    #[test]
    fn test_debug_redacts_phrase() {
        let m = Mnemonic::new("secret words here");
        let printed = format!("{:?}", m);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("REDACTED"));
    }
}
