//! Transaction builder: wraps an instruction payload into a CosmWasm
//! execute-contract message.
//!
//! The contract message is the JSON object
//! `{"send":{"channel_id","timeout_height","timeout_timestamp","salt","instruction"}}`
//! serialized to bytes. No network I/O happens here.

use crate::instruction::InstructionPayload;
use crate::planner::TransactionSpec;
use chrono::Utc;
use core_logic::EncodingError;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SALT_BYTES: usize = 32;
/// Timeout offset for specs built without a planner
pub const DEFAULT_TIMEOUT_OFFSET: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendArgs {
    pub channel_id: u32,
    pub timeout_height: String,
    pub timeout_timestamp: String,
    pub salt: String,
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub send: SendArgs,
}

/// Execute-contract message ready for signing. `msg` is the serialized
/// [`ContractCall`] and is opaque to the outer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteContractMsg {
    pub sender: String,
    pub contract: String,
    pub funds: Vec<Coin>,
    pub msg: Vec<u8>,
}

impl ExecuteContractMsg {
    pub fn call(&self) -> Result<ContractCall, EncodingError> {
        serde_json::from_slice(&self.msg).map_err(|e| EncodingError::Serialization {
            reason: e.to_string(),
        })
    }
}

/// `"0x"` + 32 fresh random bytes from the OS RNG
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt);
    format!("0x{}", hex::encode(salt))
}

/// Millisecond epoch + offset, rendered at nanosecond granularity by
/// appending six zeros.
pub fn timeout_timestamp(now_ms: i64, offset: Duration) -> Result<String, EncodingError> {
    let deadline_ms = i64::try_from(offset.as_millis())
        .ok()
        .and_then(|offset_ms| now_ms.checked_add(offset_ms))
        .ok_or_else(|| EncodingError::Serialization {
            reason: format!("timeout offset of {}s is out of range", offset.as_secs()),
        })?;
    Ok(format!("{}000000", deadline_ms))
}

/// Builds the message for `spec` using the wall clock and a fresh salt.
pub fn build_execute_msg(
    spec: &TransactionSpec,
    instruction: &InstructionPayload,
    contract: &str,
) -> Result<ExecuteContractMsg, EncodingError> {
    build_execute_msg_at(
        spec,
        instruction,
        contract,
        Utc::now().timestamp_millis(),
        generate_salt(),
    )
}

/// Deterministic variant of [`build_execute_msg`] with an explicit clock and salt.
pub fn build_execute_msg_at(
    spec: &TransactionSpec,
    instruction: &InstructionPayload,
    contract: &str,
    now_ms: i64,
    salt: String,
) -> Result<ExecuteContractMsg, EncodingError> {
    let call = ContractCall {
        send: SendArgs {
            channel_id: spec.channel_id,
            timeout_height: spec.timeout_height.clone(),
            timeout_timestamp: timeout_timestamp(now_ms, spec.timeout_offset)?,
            salt,
            instruction: instruction.to_hex(),
        },
    };
    let msg = serde_json::to_vec(&call).map_err(|e| EncodingError::Serialization {
        reason: e.to_string(),
    })?;

    Ok(ExecuteContractMsg {
        sender: spec.signer.primary_address.clone(),
        contract: contract.to_string(),
        funds: vec![Coin {
            denom: spec.denom.clone(),
            amount: spec.amount.to_string(),
        }],
        msg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{AddressSet, TransactionSpec};
    use crate::wallet::WalletAccount;

    const CONTRACT: &str = "bbn1336jj8ertl8h7rdvnz4dh5rqahd09cy0x43guhsxx6xyrztx292q77945h";

    fn spec() -> TransactionSpec {
        let signer = WalletAccount::new(1, "bbn1sender", "xion1sender");
        TransactionSpec::new(
            signer.clone(),
            1_000,
            "ubbn",
            AddressSet::new(&signer.primary_address, &signer.secondary_address, "xion1dest"),
            4,
        )
    }

    #[test]
    fn test_message_layout() {
        let spec = spec();
        let payload = InstructionPayload::encode(1_000, "bbn1sender", "xion1sender", "xion1dest").unwrap();
        let salt = format!("0x{}", "ab".repeat(32));
        let msg = build_execute_msg_at(&spec, &payload, CONTRACT, 1_700_000_000_000, salt.clone()).unwrap();

        assert_eq!(msg.sender, "bbn1sender");
        assert_eq!(msg.contract, CONTRACT);
        assert_eq!(
            msg.funds,
            vec![Coin {
                denom: "ubbn".to_string(),
                amount: "1000".to_string()
            }]
        );

        let call = msg.call().unwrap();
        assert_eq!(call.send.channel_id, 4);
        assert_eq!(call.send.timeout_height, "0");
        // default spec offset is one hour
        assert_eq!(call.send.timeout_timestamp, "1700003600000000000");
        assert_eq!(call.send.salt, salt);
        assert_eq!(call.send.instruction, payload.to_hex());
    }

    #[test]
    fn test_json_field_order() {
        let spec = spec();
        let payload = InstructionPayload::encode(1_000, "a", "b", "c").unwrap();
        let msg = build_execute_msg_at(&spec, &payload, CONTRACT, 0, "0x00".to_string()).unwrap();
        let json = String::from_utf8(msg.msg).unwrap();

        assert!(json.starts_with(r#"{"send":{"channel_id":4,"timeout_height":"0","timeout_timestamp":"3600000000000","salt":"0x00","instruction":"0x"#));
    }

    #[test]
    fn test_timeout_timestamp_appends_six_zeros() {
        assert_eq!(
            timeout_timestamp(1_000, Duration::from_millis(500)).unwrap(),
            "1500000000"
        );
        assert_eq!(
            timeout_timestamp(0, Duration::from_secs(72 * 3600)).unwrap(),
            "259200000000000"
        );
    }

    #[test]
    fn test_timeout_timestamp_out_of_range() {
        // more milliseconds than an i64 holds
        assert!(matches!(
            timeout_timestamp(0, Duration::from_secs(u64::MAX)),
            Err(EncodingError::Serialization { .. })
        ));
        // fits on its own but not added to the clock
        let offset = Duration::from_millis(i64::MAX as u64);
        assert!(timeout_timestamp(0, offset).is_ok());
        assert!(timeout_timestamp(1, offset).is_err());

        let spec = spec().with_timeout("0", Duration::from_secs(u64::MAX));
        let payload = InstructionPayload::encode(1_000, "a", "b", "c").unwrap();
        assert!(build_execute_msg_at(&spec, &payload, CONTRACT, 0, "0x00".to_string()).is_err());
    }

    #[test]
    fn test_salt_is_fresh_each_call() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), 2 + SALT_BYTES * 2);
        assert!(a.starts_with("0x"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_wall_clock_build_uses_new_salt() {
        let spec = spec();
        let payload = InstructionPayload::encode(1_000, "a", "b", "c").unwrap();
        let first = build_execute_msg(&spec, &payload, CONTRACT).unwrap().call().unwrap();
        let second = build_execute_msg(&spec, &payload, CONTRACT).unwrap().call().unwrap();
        assert_ne!(first.send.salt, second.send.salt);
        assert_eq!(first.send.instruction, second.send.instruction);
    }
}
