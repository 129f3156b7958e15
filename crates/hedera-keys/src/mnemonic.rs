//! BIP-39 recovery phrases
//!
//! Word lists and checksums are handled by the `bip39` crate. This module
//! only exposes what key construction needs: generate, parse, seed.

use bip39::Language;
use thiserror::Error;
use zeroize::Zeroizing;

pub use bip39::Mnemonic;

#[derive(Error, Debug)]
pub enum MnemonicError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("Mnemonic generation failed: {0}")]
    Generation(String),
}

/// Supported phrase lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCount {
    /// 128 bits of entropy
    Twelve,
    /// 256 bits of entropy
    TwentyFour,
}

impl WordCount {
    pub fn words(self) -> usize {
        match self {
            Self::Twelve => 12,
            Self::TwentyFour => 24,
        }
    }
}

/// Generate a new English mnemonic
pub fn generate_mnemonic(count: WordCount) -> Result<Mnemonic, MnemonicError> {
    Mnemonic::generate_in(Language::English, count.words())
        .map_err(|e| MnemonicError::Generation(e.to_string()))
}

/// Parse an English mnemonic from words
pub fn parse_mnemonic(words: &str) -> Result<Mnemonic, MnemonicError> {
    Mnemonic::parse_in(Language::English, words)
        .map_err(|e| MnemonicError::InvalidMnemonic(e.to_string()))
}

/// BIP-39 seed (PBKDF2-HMAC-SHA512, 2048 rounds, salt `"mnemonic" || passphrase`)
pub fn derive_seed(mnemonic: &Mnemonic, passphrase: &str) -> Zeroizing<[u8; 64]> {
    Zeroizing::new(mnemonic.to_seed(passphrase))
}
