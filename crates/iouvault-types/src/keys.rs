//! opaque key material attached to an obligation.
//!
//! these types wrap the raw bytes and provide serialization support.
//! nothing in iouvault parses or verifies them; that is left to the owning ledger layer.

use serde::{Deserialize, Serialize};

/// public key associated with an obligation.
///
/// the owning layer uses it to check the obligation's signed message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// create a public key from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// get the raw bytes of the key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// consume the key, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// returns a short string representation for logging.
    pub fn short_string(&self) -> String {
        short_string("pubkey", &self.0)
    }
}

/// detached signature over a canonical form of the obligation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedMessage(Vec<u8>);

impl SignedMessage {
    /// create a signed message from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// get the raw bytes of the signature.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// consume the signature, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// returns a short string representation for logging.
    pub fn short_string(&self) -> String {
        short_string("sig", &self.0)
    }
}

fn short_string(prefix: &str, bytes: &[u8]) -> String {
    if bytes.len() >= 2 {
        format!("{}:{}...", prefix, hex::encode(&bytes[..2]))
    } else {
        format!("{}:???", prefix)
    }
}
