use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Number of hex characters in a valid address: 65 bytes == 130 hex characters.
const ADDRESS_HEX_LENGTH: usize = 130;
/// Uncompressed secp256k1 points are serialized with this prefix byte.
const UNCOMPRESSED_POINT_PREFIX: &str = "04";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address length. Expected: 130 hex characters but got: {0}")]
    InvalidLength(usize),
    #[error("Address must contain only hex characters: {0}")]
    NotHexEncoded(String),
    #[error("Address must start with the uncompressed point prefix 04: {0}")]
    MissingPrefix(String),
}

/// An ECDSA public key on curve secp256k1 that acts as the ownership identifier of a UTXO.
///
/// The encoding is a 65-byte uncompressed point as a hex string: exactly 130 hex
/// characters starting with `04`. Construction validates the encoding, so holding an
/// `Address` guarantees the format; whether the bytes are a real curve point is only
/// decided when a signature is verified against it.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn from_hex(address: &str) -> Result<Self, AddressError> {
        if address.len() != ADDRESS_HEX_LENGTH {
            return Err(AddressError::InvalidLength(address.len()));
        }
        if !address.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::NotHexEncoded(address.to_string()));
        }
        if !address.starts_with(UNCOMPRESSED_POINT_PREFIX) {
            return Err(AddressError::MissingPrefix(address.to_string()));
        }
        Ok(Self(address.to_string()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Decodes the hex encoding back into the raw 65 bytes of the public key.
    pub fn to_bytes(&self) -> Vec<u8> {
        // The constructor guarantees a valid hex string of even length.
        hex::decode(&self.0).expect("address is hex-encoded by construction")
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::from_hex(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
