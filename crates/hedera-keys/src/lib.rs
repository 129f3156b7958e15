//! Hedera Keys
//!
//! Private and public keys for the Hedera network.
//!
//! # Algorithms
//!
//! - Ed25519 (RFC 8032), derivable with SLIP-10 (hardened children only)
//! - ECDSA over secp256k1, derivable with BIP-32; messages are hashed with
//!   Keccak-256 before signing
//!
//! # Encodings
//!
//! | Format | Private key | Public key |
//! |--------|-------------|------------|
//! | raw    | 32 bytes    | 32 bytes (Ed25519), 33 bytes compressed (ECDSA) |
//! | DER    | PKCS#8 / SEC1 | SubjectPublicKeyInfo |
//! | PEM    | `PRIVATE KEY`, `EC PRIVATE KEY` (read only) | - |
//! | string | hex of DER (canonical) or of raw bytes | same |
//!
//! # Example
//!
//! ```
//! use hedera_keys::PrivateKey;
//!
//! let key = PrivateKey::generate_ed25519();
//! let signature = key.sign(b"hello");
//! assert!(key.public_key().verify(b"hello", &signature).is_ok());
//!
//! let parsed: PrivateKey = key.to_string().parse().unwrap();
//! assert_eq!(parsed.to_bytes(), key.to_bytes());
//!
//! let key = PrivateKey::generate_ecdsa();
//! let parsed: PrivateKey = key.to_string().parse().unwrap();
//! assert!(parsed.is_ecdsa());
//! assert_eq!(parsed.to_bytes(), key.to_bytes());
//! ```

pub mod algorithm;
pub mod der;
pub mod derive;
pub mod error;
pub mod mnemonic;
mod pem;
pub mod private_key;
pub mod public_key;

pub use algorithm::KeyAlgorithm;
pub use derive::ChainCode;
pub use error::{KeyError, ParseAttempt};
pub use mnemonic::{Mnemonic, MnemonicError, WordCount};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
