//! Instruction payload encoder.
//!
//! The receiving contract expects one fixed call shape: a batch instruction
//! wrapping a single fungible asset order, ABI-encoded as big-endian 32-byte
//! words. Only the amount and the three address fields vary; every offset and
//! length in the header is tied to that shape, so addresses must fit a fixed
//! 64-byte field and the payload length never changes.
//!
//! Full layout (word index: content), 36 words = 1152 bytes:
//!
//! ```text
//!  0..14  PREFIX_WORDS_V1        instruction header + order head offsets
//! 14      amount                 base_amount
//! 15..20  MIDDLE_WORDS_V1        symbol/name offsets, decimals, path, quote offset
//! 20      amount                 quote_amount
//! 21..24  address field          sender    (primary)
//! 24..27  address field          receiver  (secondary)
//! 27..33  denom field × 3        base_token, base_token_symbol, base_token_name
//! 33..36  address field          quote_token (tertiary)
//! ```

use core_logic::EncodingError;

pub const WORD_BYTES: usize = 32;
/// Capacity of one address field, excluding its length word
pub const ADDRESS_FIELD_BYTES: usize = 64;
/// Capacity of one denom field, excluding its length word
pub const DENOM_FIELD_BYTES: usize = 32;
pub const DENOM_SYMBOL: &str = "ubbn";
pub const DENOM_FIELD_REPEAT: usize = 3;

/// Header words for contract call layout v1.
///
/// Outer instruction `(version, opcode, operand)` with opcode 2 (batch),
/// whose operand is a one-element instruction array holding
/// `(version 1, opcode 3 = fungible asset order, operand)`. The last three
/// words are the order's head: byte offsets of sender, receiver and
/// base_token, relative to the start of the order tuple.
const PREFIX_WORDS_V1: [u64; 14] = [
    0x000, // outer version
    0x002, // outer opcode: batch
    0x060, // offset of outer operand
    0x400, // outer operand length (1024 bytes)
    0x020, // offset of instructions array
    0x001, // instructions array length
    0x020, // offset of instructions[0]
    0x001, // inner version
    0x003, // inner opcode: fungible asset order
    0x060, // offset of inner operand
    0x320, // inner operand length (800 bytes)
    0x140, // offset of sender
    0x1a0, // offset of receiver
    0x200, // offset of base_token
];

/// Order head words between `base_amount` and `quote_amount`.
const MIDDLE_WORDS_V1: [u64; 5] = [
    0x240, // offset of base_token_symbol
    0x280, // offset of base_token_name
    0x006, // base_token_decimals
    0x000, // base_token_path
    0x2c0, // offset of quote_token
];

const ADDRESS_FIELD_WORDS: usize = 1 + ADDRESS_FIELD_BYTES / WORD_BYTES;
const DENOM_FIELD_WORDS: usize = 1 + DENOM_FIELD_BYTES / WORD_BYTES;

/// Total encoded size in bytes; identical for every valid input.
pub const ENCODED_LEN: usize = WORD_BYTES
    * (PREFIX_WORDS_V1.len()
        + 1
        + MIDDLE_WORDS_V1.len()
        + 1
        + 3 * ADDRESS_FIELD_WORDS
        + DENOM_FIELD_REPEAT * DENOM_FIELD_WORDS);

/// Encoded amount + addressing blob passed verbatim to the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionPayload {
    bytes: Vec<u8>,
}

impl InstructionPayload {
    /// Builds the payload for `amount` base units and the three addresses.
    /// Pure: identical inputs produce identical bytes.
    pub fn encode(
        amount: u128,
        primary: &str,
        secondary: &str,
        tertiary: &str,
    ) -> Result<Self, EncodingError> {
        let mut buf = Vec::with_capacity(ENCODED_LEN);

        for word in PREFIX_WORDS_V1 {
            push_word(&mut buf, word as u128);
        }
        push_word(&mut buf, amount);
        for word in MIDDLE_WORDS_V1 {
            push_word(&mut buf, word as u128);
        }
        push_word(&mut buf, amount);

        push_field(&mut buf, primary, ADDRESS_FIELD_BYTES)?;
        push_field(&mut buf, secondary, ADDRESS_FIELD_BYTES)?;
        for _ in 0..DENOM_FIELD_REPEAT {
            push_field(&mut buf, DENOM_SYMBOL, DENOM_FIELD_BYTES)?;
        }
        push_field(&mut buf, tertiary, ADDRESS_FIELD_BYTES)?;

        debug_assert_eq!(buf.len(), ENCODED_LEN);
        Ok(Self { bytes: buf })
    }

    /// Accepts a pre-built `0x…` payload for replay. Only the structure is
    /// checked: hex digits, whole 32-byte words, non-empty.
    pub fn from_hex(payload: &str) -> Result<Self, EncodingError> {
        let malformed = |reason: &str| EncodingError::MalformedInstruction {
            reason: reason.to_string(),
        };

        let digits = payload
            .strip_prefix("0x")
            .ok_or_else(|| malformed("missing 0x prefix"))?;
        let bytes = hex::decode(digits).map_err(|e| malformed(&e.to_string()))?;
        if bytes.is_empty() {
            return Err(malformed("empty payload"));
        }
        if bytes.len() % WORD_BYTES != 0 {
            return Err(malformed(&format!(
                "{} bytes is not a whole number of 32-byte words",
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.bytes.len() / WORD_BYTES
    }

    /// `"0x"` followed by lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.bytes))
    }
}

/// Convenience wrapper returning the hex form directly.
pub fn encode_instruction(
    amount: u128,
    primary: &str,
    secondary: &str,
    tertiary: &str,
) -> Result<String, EncodingError> {
    InstructionPayload::encode(amount, primary, secondary, tertiary).map(|p| p.to_hex())
}

/// Checks that an address fits the fixed address field.
pub fn validate_address(address: &str) -> Result<(), EncodingError> {
    check_capacity(address, ADDRESS_FIELD_BYTES)
}

fn check_capacity(value: &str, capacity: usize) -> Result<(), EncodingError> {
    if value.len() > capacity {
        return Err(EncodingError::AddressTooLong {
            address: value.to_string(),
            length: value.len(),
            capacity,
        });
    }
    Ok(())
}

/// One big-endian, left-zero-padded 32-byte word.
fn push_word(buf: &mut Vec<u8>, value: u128) {
    buf.extend_from_slice(&[0u8; WORD_BYTES - 16]);
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Length word followed by the raw bytes right-padded to `capacity`.
fn push_field(buf: &mut Vec<u8>, value: &str, capacity: usize) -> Result<(), EncodingError> {
    check_capacity(value, capacity)?;
    push_word(buf, value.len() as u128);
    buf.extend_from_slice(value.as_bytes());
    buf.resize(buf.len() + capacity - value.len(), 0);
    Ok(())
}
