//! Chain client capability.
//!
//! [`ChainClient`] is a client bound to exactly one signing identity. It
//! signs an execute-contract message and broadcasts the result. A
//! [`ClientConnector`] creates bound clients on demand, keyed by wallet
//! index; the execution loop decides when to rebind.
//!
//! The concrete implementation talks Tendermint RPC through `cosmrs`:
//! account number and sequence come from the auth module query, the
//! transaction is signed in direct mode and sent with `broadcast_tx_sync`.

use crate::tx_builder::ExecuteContractMsg;
use crate::wallet::WalletIdentity;
use async_trait::async_trait;
use core_logic::{
    ChainConfig, ConfigError, CoreError, FeeConfig, TransactionError, WalletError, BATCH_TARGET,
};
use cosmrs::cosmwasm::MsgExecuteContract;
use cosmrs::proto::cosmos::auth::v1beta1::{BaseAccount, QueryAccountRequest, QueryAccountResponse};
use cosmrs::proto::traits::Message;
use cosmrs::rpc::{Client, HttpClient};
use cosmrs::tendermint::chain;
use cosmrs::tx::{self, Fee, Msg, SignDoc, SignerInfo};
use cosmrs::{AccountId, Coin, Denom};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const ACCOUNT_QUERY_PATH: &str = "/cosmos.auth.v1beta1.Query/Account";

/// Signed transaction bytes plus the sequence they were signed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub bytes: Vec<u8>,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReceipt {
    pub tx_hash: String,
}

/// A client bound to a single signer.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// 1-based index of the wallet this client signs for
    fn wallet_index(&self) -> usize;

    async fn sign(
        &self,
        msg: &ExecuteContractMsg,
        memo: &str,
        fee: &FeeConfig,
    ) -> Result<SignedTx, TransactionError>;

    async fn broadcast(&self, tx: SignedTx) -> Result<BroadcastReceipt, TransactionError>;
}

/// Produces clients bound to a given wallet.
#[async_trait]
pub trait ClientConnector: Send + Sync {
    type Client: ChainClient;

    async fn connect(&self, wallet_index: usize) -> Result<Self::Client, CoreError>;
}

/// Connector over Tendermint RPC, holding every derived identity.
pub struct RpcConnector {
    endpoint: String,
    chain_id: Option<chain::Id>,
    identities: HashMap<usize, Arc<WalletIdentity>>,
}

impl RpcConnector {
    pub fn new(
        config: &ChainConfig,
        identities: impl IntoIterator<Item = WalletIdentity>,
    ) -> Result<Self, CoreError> {
        let chain_id = config
            .chain_id
            .as_deref()
            .map(|id| {
                chain::Id::from_str(id).map_err(|e| ConfigError::InvalidValue {
                    field: "chain_id".to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            endpoint: config.rpc_endpoint.clone(),
            chain_id,
            identities: identities
                .into_iter()
                .map(|identity| (identity.index(), Arc::new(identity)))
                .collect(),
        })
    }

    fn connect_error(&self, reason: impl ToString) -> TransactionError {
        TransactionError::Connect {
            endpoint: self.endpoint.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl ClientConnector for RpcConnector {
    type Client = RpcChainClient;

    async fn connect(&self, wallet_index: usize) -> Result<Self::Client, CoreError> {
        let identity = self
            .identities
            .get(&wallet_index)
            .cloned()
            .ok_or(WalletError::UnknownSigner {
                index: wallet_index,
            })?;

        let rpc = HttpClient::new(self.endpoint.as_str()).map_err(|e| self.connect_error(e))?;

        // Also serves as a liveness check for the endpoint
        let status = rpc.status().await.map_err(|e| self.connect_error(e))?;
        let chain_id = match &self.chain_id {
            Some(id) => id.clone(),
            None => status.node_info.network,
        };

        debug!(
            target: BATCH_TARGET,
            wallet = wallet_index,
            chain_id = %chain_id,
            "Connected signer to {}", self.endpoint
        );

        Ok(RpcChainClient {
            rpc,
            endpoint: self.endpoint.clone(),
            chain_id,
            identity,
            next_sequence: Mutex::new(None),
        })
    }
}

/// Tendermint RPC client signing for one identity.
pub struct RpcChainClient {
    rpc: HttpClient,
    endpoint: String,
    chain_id: chain::Id,
    identity: Arc<WalletIdentity>,
    /// Sequence after the last accepted broadcast; covers a node that has
    /// not yet committed it when the next account query runs
    next_sequence: Mutex<Option<u64>>,
}

impl RpcChainClient {
    async fn query_account(&self) -> Result<BaseAccount, TransactionError> {
        let address = self.identity.primary_address().to_string();
        let account_error = |reason: String| TransactionError::Account {
            address: address.clone(),
            reason,
        };

        let request = QueryAccountRequest {
            address: address.clone(),
        };
        let response = self
            .rpc
            .abci_query(
                Some(ACCOUNT_QUERY_PATH.to_string()),
                request.encode_to_vec(),
                None,
                false,
            )
            .await
            .map_err(|e| account_error(e.to_string()))?;

        if response.code.is_err() {
            return Err(account_error(response.log));
        }

        let decoded = QueryAccountResponse::decode(response.value.as_slice())
            .map_err(|e| account_error(e.to_string()))?;
        let any = decoded
            .account
            .ok_or_else(|| account_error("account not found".to_string()))?;
        BaseAccount::decode(any.value.as_slice()).map_err(|e| account_error(e.to_string()))
    }
}

fn signing_error(reason: impl ToString) -> TransactionError {
    TransactionError::Signing {
        reason: reason.to_string(),
    }
}

fn to_cosmos_msg(msg: &ExecuteContractMsg) -> Result<MsgExecuteContract, TransactionError> {
    let funds = msg
        .funds
        .iter()
        .map(|coin| -> Result<Coin, TransactionError> {
            let amount = coin.amount.parse::<u128>().map_err(signing_error)?;
            let denom = Denom::from_str(&coin.denom).map_err(signing_error)?;
            Ok(Coin { denom, amount })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MsgExecuteContract {
        sender: AccountId::from_str(&msg.sender).map_err(signing_error)?,
        contract: AccountId::from_str(&msg.contract).map_err(signing_error)?,
        msg: msg.msg.clone(),
        funds,
    })
}

fn to_fee(fee: &FeeConfig) -> Result<Fee, TransactionError> {
    let coin = Coin {
        denom: Denom::from_str(&fee.denom).map_err(signing_error)?,
        amount: u128::from(fee.amount),
    };
    Ok(Fee::from_amount_and_gas(coin, fee.gas_limit))
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn wallet_index(&self) -> usize {
        self.identity.index()
    }

    async fn sign(
        &self,
        msg: &ExecuteContractMsg,
        memo: &str,
        fee: &FeeConfig,
    ) -> Result<SignedTx, TransactionError> {
        let account = self.query_account().await?;
        let sequence = {
            let local = self.next_sequence.lock().await;
            local.map_or(account.sequence, |s| s.max(account.sequence))
        };

        let any = to_cosmos_msg(msg)?.to_any().map_err(signing_error)?;
        let body = tx::Body::new(vec![any], memo, 0u32);
        let auth_info =
            SignerInfo::single_direct(Some(self.identity.public_key()), sequence).auth_info(to_fee(fee)?);

        let sign_doc = SignDoc::new(&body, &auth_info, &self.chain_id, account.account_number)
            .map_err(signing_error)?;
        let raw = sign_doc
            .sign(self.identity.signing_key())
            .map_err(signing_error)?;
        let bytes = raw.to_bytes().map_err(signing_error)?;

        Ok(SignedTx { bytes, sequence })
    }

    async fn broadcast(&self, tx: SignedTx) -> Result<BroadcastReceipt, TransactionError> {
        let response = self
            .rpc
            .broadcast_tx_sync(tx.bytes)
            .await
            .map_err(|e| TransactionError::Broadcast {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        if response.code.is_err() {
            return Err(TransactionError::Rejected {
                code: response.code.value(),
                log: response.log,
            });
        }

        *self.next_sequence.lock().await = Some(tx.sequence + 1);

        Ok(BroadcastReceipt {
            tx_hash: response.hash.to_string(),
        })
    }
}
