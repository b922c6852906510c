use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    pub rpc_endpoint: String,
    /// Queried from the node when absent
    pub chain_id: Option<String>,
    pub address_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MnemonicSource {
    /// Newline-delimited file, one phrase per line
    File { path: String },
    /// Newline-delimited phrases held in an environment variable
    Env { key: String },
}

impl MnemonicSource {
    pub fn describe(&self) -> String {
        match self {
            MnemonicSource::File { path } => path.clone(),
            MnemonicSource::Env { key } => format!("${}", key),
        }
    }
}
