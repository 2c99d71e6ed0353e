//! Primitive types for the Drip SDK.
//!
//! Provides type-safe wrappers for ledger addresses, transaction hashes,
//! and token identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SdkError;

/// A 20-byte ledger account address.
///
/// Rendered as a lowercase `0x`-prefixed hex string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the zero address.
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; 20])
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parses an address from a hex string, with or without `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::InvalidAddress` if the string is not 20 bytes of
    /// valid hex.
    pub fn from_hex(s: &str) -> Result<Self, SdkError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| SdkError::InvalidAddress(s.to_string()))?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| SdkError::InvalidAddress(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl TryFrom<String> for Address {
    type Error = SdkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// A 32-byte transaction hash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// Creates a transaction hash from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parses a transaction hash from a hex string, with or without `0x`
    /// prefix.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::InvalidHash` if the string is not 32 bytes of
    /// valid hex.
    pub fn from_hex(s: &str) -> Result<Self, SdkError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| SdkError::InvalidHash(s.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SdkError::InvalidHash(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl TryFrom<String> for TxHash {
    type Error = SdkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<TxHash> for String {
    fn from(value: TxHash) -> Self {
        value.to_string()
    }
}

/// The token a scheduled payment pays out in.
///
/// Payments are funded and paid either in the chain's native coin or in a
/// fungible token identified by its contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// The chain's native coin.
    Native,
    /// A fungible token contract.
    Token(Address),
}

impl TokenKind {
    /// Returns true for the native coin.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Returns the token contract address, if any.
    #[must_use]
    pub const fn token_address(&self) -> Option<Address> {
        match self {
            Self::Native => None,
            Self::Token(addr) => Some(*addr),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Token(addr) => write!(f, "{}", addr),
        }
    }
}
