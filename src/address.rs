//! Account address validation and normalization.
//!
//! Addresses are 32-byte ed25519 public keys, canonically rendered as
//! base58. Input pasted from EVM tooling sometimes arrives with a `0x`
//! hex prefix; such strings are reinterpreted as native addresses when
//! the hex payload is exactly 32 bytes, and rejected otherwise.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Byte length of a native account address.
pub const ADDRESS_LEN: usize = 32;

/// A validated 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("not a valid base58 address: {0}")]
    InvalidBase58(String),
    #[error("hex-prefixed input does not decode to a native address: {0}")]
    InvalidHex(String),
    #[error("decoded address is {actual} bytes, expected {expected}")]
    WrongLength { actual: usize, expected: usize },
}

/// Check whether the input carries a foreign-chain hex prefix.
///
/// Kept as a named predicate so the copy-paste tolerance rule is
/// testable on its own rather than buried in parse control flow.
pub fn has_hex_prefix(raw: &str) -> bool {
    raw.starts_with("0x") || raw.starts_with("0X")
}

impl Address {
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Validate a raw string without keeping the parsed value.
    ///
    /// Any decode failure (bad alphabet, wrong length, malformed hex
    /// payload) is `false`; this never panics on untrusted input.
    pub fn is_valid(raw: &str) -> bool {
        raw.parse::<Address>().is_ok()
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();

        // Hex-prefixed input is reinterpreted, never fed to base58:
        // a failed reinterpretation is a failed parse.
        let bytes = if has_hex_prefix(trimmed) {
            hex::decode(&trimmed[2..])
                .map_err(|_| AddressError::InvalidHex(trimmed.to_string()))?
        } else {
            bs58::decode(trimmed)
                .into_vec()
                .map_err(|_| AddressError::InvalidBase58(trimmed.to_string()))?
        };

        let bytes: [u8; ADDRESS_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| AddressError::WrongLength {
                    actual: bytes.len(),
                    expected: ADDRESS_LEN,
                })?;

        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}
