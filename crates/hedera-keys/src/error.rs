//! Errors returned by key parsing, derivation and verification.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Wrong length, bad hex/base64, broken DER or PEM structure.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    /// The encoding names a curve or algorithm this crate does not handle.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// Derivation requested on a key without a chain code.
    #[error("Key is not derivable: {0}")]
    NotDerivable(String),
    /// Every candidate decoding of a generic key string failed.
    #[error("Failed to parse key: {}", describe_attempts(.0))]
    AggregateParseFailure(Vec<(ParseAttempt, KeyError)>),
    /// A derivation step produced an invalid key; try the next index.
    #[error("Derivation failed: {0}")]
    DerivationFailed(String),
    /// The signature does not match the message and public key.
    #[error("Signature verification failed")]
    SignatureVerify,
}

impl KeyError {
    /// True for [`KeyError::MalformedInput`], and for an aggregate failure in
    /// which every attempt was malformed.
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::MalformedInput(_) => true,
            Self::AggregateParseFailure(attempts) => {
                !attempts.is_empty() && attempts.iter().all(|(_, err)| err.is_malformed())
            }
            _ => false,
        }
    }
}

/// One candidate decoding tried by the generic string parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAttempt {
    RawHex,
    DerHex,
    Pem,
}

impl fmt::Display for ParseAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RawHex => "raw hex",
            Self::DerHex => "DER hex",
            Self::Pem => "PEM",
        })
    }
}

fn describe_attempts(attempts: &[(ParseAttempt, KeyError)]) -> String {
    attempts
        .iter()
        .map(|(attempt, err)| format!("{attempt}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn malformed(message: impl Into<String>) -> KeyError {
    KeyError::MalformedInput(message.into())
}

/// Hex with an optional `0x` prefix and surrounding whitespace.
pub(crate) fn decode_hex(s: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let s = s.trim();
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
        .map(Zeroizing::new)
        .map_err(|e| malformed(format!("invalid hex: {e}")))
}
