use crate::{Address, TransactionId};
use secp256k1::ecdsa;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::debug;

/// A DER-encoded ECDSA signature over a transaction id.
///
/// The coinbase input carries an empty signature since it references no UTXO.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(der_bytes: Vec<u8>) -> Self {
        Self(der_bytes)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_der(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Checks that the signature over the given transaction id was produced by the private
/// key matching the owner's public key.
///
/// This is a total function: malformed signature bytes or an owner encoding that is not
/// a point on the curve make it return false, never panic or error. Callers turn a false
/// result into their own typed rejection.
pub fn verify_signature(message: &TransactionId, signature: &Signature, owner: &Address) -> bool {
    let public_key = match PublicKey::from_slice(&owner.to_bytes()) {
        Ok(public_key) => public_key,
        Err(_) => {
            debug!(owner = %owner, "owner is not a valid curve point");
            return false;
        }
    };
    let signature = match ecdsa::Signature::from_der(signature.as_der()) {
        Ok(signature) => signature,
        Err(_) => {
            debug!(transaction_id = %message, "signature bytes are not valid DER");
            return false;
        }
    };
    let message = match Message::from_slice(message.as_slice()) {
        Ok(message) => message,
        Err(_) => return false,
    };
    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&message, &signature, &public_key).is_ok()
}

/// A secp256k1 key pair used by the wallet collaborator to authorize spends.
///
/// Key storage and selection live outside this crate; this type only covers deriving
/// the address encoding the verifier expects and producing input signatures.
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, secp256k1::Error> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(secret)?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// The 04-prefixed uncompressed hex encoding of the public key.
    pub fn address(&self) -> Address {
        let encoded = hex::encode(self.public_key.serialize_uncompressed());
        Address::from_hex(&encoded).expect("uncompressed public key is a valid address")
    }

    /// Signs a transaction id, producing the DER bytes placed in a transaction input.
    pub fn sign(&self, transaction_id: &TransactionId) -> Signature {
        let secp = Secp256k1::new();
        let message = Message::from_slice(transaction_id.as_slice())
            .expect("transaction id is a 32-byte digest");
        let signature = secp.sign_ecdsa(&message, &self.secret_key);
        Signature::new(signature.serialize_der().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sha256;

    fn key_pair(seed: u8) -> KeyPair {
        KeyPair::from_secret_bytes(&[seed; 32]).unwrap()
    }

    fn message() -> TransactionId {
        TransactionId::new(Sha256::digest(b"message under test"))
    }

    #[test]
    fn sign_then_verify() {
        let key_pair = key_pair(1);
        let signature = key_pair.sign(&message());
        assert!(verify_signature(&message(), &signature, &key_pair.address()));
    }

    #[test]
    fn rejects_signature_from_another_key() {
        let owner = key_pair(1);
        let other = key_pair(2);
        let signature = other.sign(&message());
        assert!(!verify_signature(&message(), &signature, &owner.address()));
    }

    #[test]
    fn rejects_signature_over_another_message() {
        let key_pair = key_pair(1);
        let signature = key_pair.sign(&TransactionId::new(Sha256::digest(b"other")));
        assert!(!verify_signature(&message(), &signature, &key_pair.address()));
    }

    #[test]
    fn garbage_der_bytes_return_false() {
        let key_pair = key_pair(1);
        let signature = Signature::new(vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(!verify_signature(&message(), &signature, &key_pair.address()));
    }

    #[test]
    fn empty_signature_returns_false() {
        let key_pair = key_pair(1);
        assert!(!verify_signature(&message(), &Signature::empty(), &key_pair.address()));
    }

    #[test]
    fn owner_off_the_curve_returns_false() {
        // Well-formed encoding, but not a point on the curve.
        let mut bogus = String::from("04");
        bogus.push_str(&"ff".repeat(64));
        let owner = Address::from_hex(&bogus).unwrap();
        let key_pair = key_pair(1);
        let signature = key_pair.sign(&message());
        assert!(!verify_signature(&message(), &signature, &owner));
    }

    #[test]
    fn address_has_expected_encoding() {
        let address = key_pair(3).address();
        assert_eq!(address.as_hex().len(), 130);
        assert!(address.as_hex().starts_with("04"));
    }
}
