use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub success: u64,
    pub failed: u64,
}

impl BatchStats {
    pub fn total(&self) -> u64 {
        self.success + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.success as f64 / self.total() as f64 * 100.0
        }
    }
}

#[async_trait]
pub trait WalletLoader: Send + Sync {
    type Wallet;

    /// Load wallet secrets from a source (mnemonic file, env var, etc.)
    async fn load_wallets(&self) -> Result<Vec<Self::Wallet>>;
}
