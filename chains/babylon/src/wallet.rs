//! Wallet capability: mnemonic → secp256k1 signing key → bech32 addresses.
//!
//! Keys are derived on the Cosmos coin type path `m/44'/118'/0'/0/0`, the
//! same first account a CosmJS HD wallet exposes. The secondary address is
//! the primary address's raw bytes re-encoded under a foreign prefix.

use bip39::Language;
use core_logic::{Mnemonic, WalletError};
use cosmrs::bip32::DerivationPath;
use cosmrs::crypto::secp256k1::SigningKey;
use cosmrs::crypto::PublicKey;
use cosmrs::AccountId;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

pub const HD_PATH: &str = "m/44'/118'/0'/0/0";

/// Public view of a wallet: its 1-based index and both addresses.
///
/// This is what plans and specs carry around; the signing key stays in
/// [`WalletIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAccount {
    pub index: usize,
    pub primary_address: String,
    pub secondary_address: String,
}

impl WalletAccount {
    pub fn new(
        index: usize,
        primary_address: impl Into<String>,
        secondary_address: impl Into<String>,
    ) -> Self {
        Self {
            index,
            primary_address: primary_address.into(),
            secondary_address: secondary_address.into(),
        }
    }

    /// First 20 characters of the primary address, for progress lines
    pub fn short_address(&self) -> String {
        let cut: String = self.primary_address.chars().take(20).collect();
        format!("{}...", cut)
    }
}

/// A signing identity derived once at startup and immutable afterwards.
pub struct WalletIdentity {
    account: WalletAccount,
    signing_key: SigningKey,
}

impl WalletIdentity {
    /// Derives the identity for wallet `index` (1-based) from a mnemonic.
    pub fn derive(
        index: usize,
        mnemonic: &Mnemonic,
        prefix: &str,
        secondary_prefix: &str,
    ) -> Result<Self, WalletError> {
        // 12 to 24 words
        let phrase = bip39::Mnemonic::parse_in_normalized(Language::English, mnemonic.phrase())
            .map_err(|e| WalletError::InvalidMnemonic {
                index,
                reason: e.to_string(),
            })?;
        let seed = Zeroizing::new(phrase.to_seed(""));

        let path = DerivationPath::from_str(HD_PATH).map_err(|e| WalletError::DerivationFailed {
            index,
            reason: e.to_string(),
        })?;
        let signing_key = SigningKey::derive_from_path(seed.as_slice(), &path).map_err(|e| {
            WalletError::DerivationFailed {
                index,
                reason: e.to_string(),
            }
        })?;

        let primary = signing_key
            .public_key()
            .account_id(prefix)
            .map_err(|e| WalletError::DerivationFailed {
                index,
                reason: e.to_string(),
            })?
            .to_string();
        let secondary = reencode_address(&primary, secondary_prefix)?;

        Ok(Self {
            account: WalletAccount::new(index, primary, secondary),
            signing_key,
        })
    }

    pub fn account(&self) -> &WalletAccount {
        &self.account
    }

    pub fn index(&self) -> usize {
        self.account.index
    }

    pub fn primary_address(&self) -> &str {
        &self.account.primary_address
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn public_key(&self) -> PublicKey {
        self.signing_key.public_key()
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("account", &self.account)
            .field("signing_key", &"***REDACTED***")
            .finish()
    }
}

/// Re-encodes a bech32 address under `new_prefix`, keeping its raw bytes.
pub fn reencode_address(address: &str, new_prefix: &str) -> Result<String, WalletError> {
    let invalid = |reason: String| WalletError::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let id = AccountId::from_str(address).map_err(|e| invalid(e.to_string()))?;
    let reencoded = AccountId::new(new_prefix, &id.to_bytes()).map_err(|e| invalid(e.to_string()))?;
    Ok(reencoded.to_string())
}

/// Derives identities for every mnemonic, numbering wallets from 1.
pub fn derive_all(
    mnemonics: &[Mnemonic],
    prefix: &str,
    secondary_prefix: &str,
) -> Result<Vec<WalletIdentity>, WalletError> {
    mnemonics
        .iter()
        .enumerate()
        .map(|(i, m)| WalletIdentity::derive(i + 1, m, prefix, secondary_prefix))
        .collect()
}
