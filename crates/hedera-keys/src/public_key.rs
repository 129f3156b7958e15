//! Public keys and signature verification.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use ed25519_dalek::{Verifier, VerifyingKey};
use secp256k1::{ecdsa, Message, Secp256k1};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::der;
use crate::error::{decode_hex, malformed, KeyError};
use crate::KeyAlgorithm;

const ED25519_PUBLIC_LEN: usize = 32;
const ECDSA_COMPRESSED_LEN: usize = 33;
const ECDSA_UNCOMPRESSED_LEN: usize = 65;

/// A public key on the Hedera network.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(PublicKeyData);

#[derive(Clone, Copy, PartialEq, Eq)]
enum PublicKeyData {
    Ed25519(VerifyingKey),
    Ecdsa(secp256k1::PublicKey),
}

/// ECDSA signatures cover the Keccak-256 digest of the message.
pub(crate) fn ecdsa_message(message: &[u8]) -> Message {
    Message::from_digest(Keccak256::digest(message).into())
}

impl PublicKey {
    pub(crate) fn from_ed25519(key: VerifyingKey) -> Self {
        Self(PublicKeyData::Ed25519(key))
    }

    pub(crate) fn from_secp256k1(key: secp256k1::PublicKey) -> Self {
        Self(PublicKeyData::Ecdsa(key))
    }

    /// Parse a public key from bytes.
    ///
    /// 32 bytes are read as Ed25519, 33 bytes as a compressed secp256k1
    /// point, anything else as DER.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        match bytes.len() {
            ED25519_PUBLIC_LEN => Self::from_bytes_ed25519(bytes),
            ECDSA_COMPRESSED_LEN => Self::from_bytes_ecdsa(bytes),
            _ => Self::from_bytes_der(bytes),
        }
    }

    /// Parse an Ed25519 public key from 32 raw bytes or DER.
    pub fn from_bytes_ed25519(bytes: &[u8]) -> Result<Self, KeyError> {
        if let Ok(raw) = <&[u8; ED25519_PUBLIC_LEN]>::try_from(bytes) {
            return ed25519_point(raw);
        }
        Self::from_bytes_der(bytes)?.require(KeyAlgorithm::Ed25519)
    }

    /// Parse a secp256k1 public key from 33/65 raw bytes or DER.
    pub fn from_bytes_ecdsa(bytes: &[u8]) -> Result<Self, KeyError> {
        match bytes.len() {
            ECDSA_COMPRESSED_LEN | ECDSA_UNCOMPRESSED_LEN => secp256k1_point(bytes),
            _ => Self::from_bytes_der(bytes)?.require(KeyAlgorithm::Ecdsa),
        }
    }

    /// Parse a public key from a DER `SubjectPublicKeyInfo`.
    pub fn from_bytes_der(bytes: &[u8]) -> Result<Self, KeyError> {
        let (algorithm, key) = der::decode_public_key(bytes)?;
        match algorithm {
            KeyAlgorithm::Ed25519 => {
                let raw = <&[u8; ED25519_PUBLIC_LEN]>::try_from(key).map_err(|_| {
                    malformed(format!(
                        "Ed25519 public keys are {ED25519_PUBLIC_LEN} bytes, got {}",
                        key.len()
                    ))
                })?;
                ed25519_point(raw)
            }
            KeyAlgorithm::Ecdsa => secp256k1_point(key),
        }
    }

    /// Parse a public key from DER hex.
    pub fn from_str_der(s: &str) -> Result<Self, KeyError> {
        Self::from_bytes_der(&decode_hex(s)?)
    }

    pub fn from_str_ed25519(s: &str) -> Result<Self, KeyError> {
        Self::from_bytes_ed25519(&decode_hex(s)?)
    }

    pub fn from_str_ecdsa(s: &str) -> Result<Self, KeyError> {
        Self::from_bytes_ecdsa(&decode_hex(s)?)
    }

    fn require(self, algorithm: KeyAlgorithm) -> Result<Self, KeyError> {
        if self.algorithm() == algorithm {
            Ok(self)
        } else {
            Err(KeyError::UnsupportedAlgorithm(format!(
                "expected an {algorithm} key, found {}",
                self.algorithm()
            )))
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self.0 {
            PublicKeyData::Ed25519(_) => KeyAlgorithm::Ed25519,
            PublicKeyData::Ecdsa(_) => KeyAlgorithm::Ecdsa,
        }
    }

    pub fn is_ed25519(&self) -> bool {
        self.algorithm() == KeyAlgorithm::Ed25519
    }

    pub fn is_ecdsa(&self) -> bool {
        self.algorithm() == KeyAlgorithm::Ecdsa
    }

    /// Raw point: 32 bytes (Ed25519) or 33 compressed bytes (secp256k1).
    pub fn to_bytes_raw(&self) -> Vec<u8> {
        match &self.0 {
            PublicKeyData::Ed25519(key) => key.to_bytes().to_vec(),
            PublicKeyData::Ecdsa(key) => key.serialize().to_vec(),
        }
    }

    pub fn to_bytes_der(&self) -> Vec<u8> {
        der::encode_public_key(self.algorithm(), &self.to_bytes_raw())
    }

    /// Raw bytes for Ed25519, DER for ECDSA.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self.algorithm() {
            KeyAlgorithm::Ed25519 => self.to_bytes_raw(),
            KeyAlgorithm::Ecdsa => self.to_bytes_der(),
        }
    }

    pub fn to_string_der(&self) -> String {
        hex::encode(self.to_bytes_der())
    }

    pub fn to_string_raw(&self) -> String {
        hex::encode(self.to_bytes_raw())
    }

    /// Verify a signature produced by [`crate::PrivateKey::sign`].
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), KeyError> {
        match &self.0 {
            PublicKeyData::Ed25519(key) => {
                let signature = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|_| KeyError::SignatureVerify)?;
                key.verify(message, &signature)
                    .map_err(|_| KeyError::SignatureVerify)
            }
            PublicKeyData::Ecdsa(key) => {
                let mut signature = ecdsa::Signature::from_compact(signature)
                    .map_err(|_| KeyError::SignatureVerify)?;
                signature.normalize_s();
                Secp256k1::verification_only()
                    .verify_ecdsa(&ecdsa_message(message), &signature, key)
                    .map_err(|_| KeyError::SignatureVerify)
            }
        }
    }
}

fn ed25519_point(raw: &[u8; ED25519_PUBLIC_LEN]) -> Result<PublicKey, KeyError> {
    VerifyingKey::from_bytes(raw)
        .map(PublicKey::from_ed25519)
        .map_err(|_| malformed("not a valid Ed25519 point"))
}

fn secp256k1_point(bytes: &[u8]) -> Result<PublicKey, KeyError> {
    secp256k1::PublicKey::from_slice(bytes)
        .map(PublicKey::from_secp256k1)
        .map_err(|_| malformed("not a valid secp256k1 point"))
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.algorithm().hash(state);
        self.to_bytes_raw().hash(state);
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(\"{}\")", self.to_string_der())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_der())
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(&decode_hex(s)?)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_der())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
