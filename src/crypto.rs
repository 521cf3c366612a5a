use crate::Address;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use std::convert::TryFrom;

/// Decides whether a signature authorizes a message on behalf of an address.
///
/// Implementations must return false for anything they cannot parse, e.g. a malformed key or a
/// signature blob of the wrong length.
pub trait SignatureVerifier {
    fn verify_signature(&self, address: &Address, message: &[u8], signature: &[u8]) -> bool;
}

/// Verifies ed25519 signatures, where the address is the raw verifying key.
#[derive(Debug, Default, Copy, Clone)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify_signature(&self, address: &Address, message: &[u8], signature: &[u8]) -> bool {
        let verifying_key = match VerifyingKey::from_bytes(address.as_bytes()) {
            Ok(key) => key,
            Err(_) => return false,
        };
        match Signature::from_slice(signature) {
            Ok(signature) => verifying_key.verify_strict(message, &signature).is_ok(),
            Err(_) => false,
        }
    }
}

/// An ed25519 key pair owning coins at `address()`.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic key pair, used by tests and benchmarks.
    pub fn from_seed(seed: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn from_hex(secret: &str) -> Result<Self, String> {
        let bytes = hex::decode(secret.trim()).map_err(|e| e.to_string())?;
        let seed = <[u8; SECRET_KEY_LENGTH]>::try_from(bytes.as_slice()).map_err(|_| {
            format!(
                "Invalid secret key length. Expected: {} bytes but got: {}",
                SECRET_KEY_LENGTH,
                bytes.len()
            )
        })?;
        Ok(Self::from_seed(seed))
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn address(&self) -> Address {
        Address::new(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}
