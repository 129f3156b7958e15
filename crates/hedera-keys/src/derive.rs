//! Hierarchical key derivation.
//!
//! Both schemes start from `I = HMAC-SHA512(key, data)` and split it into
//! `I_L` (key material) and `I_R` (the child's chain code):
//!
//! - **Ed25519 / SLIP-10**: only hardened children exist.
//!   `data = 0x00 || k_par || ser_32(index | 2^31)`, `k_child = I_L`.
//! - **secp256k1 / BIP-32**: hardened children hash the private key,
//!   normal children hash the compressed public key.
//!   `k_child = parse_256(I_L) + k_par (mod n)`.
//!
//! The legacy scheme predates both and stretches the key with PBKDF2.

use std::fmt;

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{Scalar, Secp256k1, SecretKey};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::KeyError;

/// Set on an index to request a hardened child.
pub const HARDENED_BIT: u32 = 0x8000_0000;

/// SLIP-44 coin type of the Hedera network (m/44'/3030'/...).
pub const HEDERA_COIN_TYPE: u32 = 3030;

/// HMAC key for the SLIP-10 Ed25519 master node.
pub const ED25519_SEED_KEY: &[u8] = b"ed25519 seed";

/// HMAC key for the BIP-32 secp256k1 master node.
pub const BITCOIN_SEED_KEY: &[u8] = b"Bitcoin seed";

/// PBKDF2 iteration count of the legacy derivation.
pub const LEGACY_PBKDF2_ROUNDS: u32 = 2048;

type HmacSha512 = Hmac<Sha512>;

/// 32 bytes of extra entropy that make a key derivable.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ChainCode([u8; 32]);

impl ChainCode {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn random() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl fmt::Debug for ChainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChainCode(..)")
    }
}

/// `I_L` and `I_R` of one HMAC-SHA512 step.
pub(crate) struct Extended {
    pub(crate) key: Zeroizing<[u8; 32]>,
    pub(crate) chain_code: ChainCode,
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Extended, KeyError> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| KeyError::DerivationFailed(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let output = mac.finalize().into_bytes();

    let mut key = Zeroizing::new([0u8; 32]);
    let mut chain_code = ChainCode([0u8; 32]);
    key.copy_from_slice(&output[..32]);
    chain_code.0.copy_from_slice(&output[32..]);

    Ok(Extended { key, chain_code })
}

/// SLIP-10 master node for Ed25519.
pub(crate) fn ed25519_master(seed: &[u8]) -> Result<Extended, KeyError> {
    hmac_sha512(ED25519_SEED_KEY, &[seed])
}

/// SLIP-10 Ed25519 child. The index is always hardened.
pub(crate) fn ed25519_child(
    key: &[u8; 32],
    chain_code: &ChainCode,
    index: u32,
) -> Result<Extended, KeyError> {
    let index = index | HARDENED_BIT;
    hmac_sha512(
        &chain_code.0,
        &[&[0u8][..], &key[..], &index.to_be_bytes()[..]],
    )
}

/// BIP-32 master node for secp256k1.
pub(crate) fn secp256k1_master(seed: &[u8]) -> Result<(SecretKey, ChainCode), KeyError> {
    let Extended { key, chain_code } = hmac_sha512(BITCOIN_SEED_KEY, &[seed])?;
    let secret = SecretKey::from_slice(&key[..]).map_err(|_| {
        KeyError::DerivationFailed("master secret is not a valid secp256k1 scalar".into())
    })?;
    Ok((secret, chain_code))
}

/// BIP-32 private child derivation (CKDpriv).
pub(crate) fn secp256k1_child(
    parent: &SecretKey,
    chain_code: &ChainCode,
    index: u32,
) -> Result<(SecretKey, ChainCode), KeyError> {
    let Extended { key, chain_code } = if index & HARDENED_BIT != 0 {
        let secret = Zeroizing::new(parent.secret_bytes());
        hmac_sha512(
            &chain_code.0,
            &[&[0u8][..], &secret[..], &index.to_be_bytes()[..]],
        )?
    } else {
        let public = parent.public_key(&Secp256k1::signing_only());
        hmac_sha512(
            &chain_code.0,
            &[&public.serialize()[..], &index.to_be_bytes()[..]],
        )?
    };

    // I_L >= n or a zero child: BIP-32 says skip to the next index.
    let tweak = Scalar::from_be_bytes(*key).map_err(|_| {
        KeyError::DerivationFailed(format!("child {index} is out of range, use the next index"))
    })?;
    let child = parent.add_tweak(&tweak).map_err(|_| {
        KeyError::DerivationFailed(format!("child {index} is out of range, use the next index"))
    })?;

    Ok((child, chain_code))
}

/// Legacy Ed25519 derivation with a 64-bit index.
///
/// `PBKDF2-HMAC-SHA512(key || i1 || i2, [0xff], 2048)`. `i1` is the sign word
/// (`0xff` for the special `0xff_ffff_ffff` index) and `i2` repeats the low
/// byte of `index` four times, as early Hedera wallets did.
pub(crate) fn legacy_ed25519(key: &[u8; 32], index: i64) -> Zeroizing<[u8; 32]> {
    let i1: i32 = if index == 0xff_ffff_ffff {
        0xff
    } else if index >= 0 {
        0
    } else {
        -1
    };
    // truncation intended
    let low = index as u8;

    let mut password = Zeroizing::new(Vec::with_capacity(40));
    password.extend_from_slice(key);
    password.extend_from_slice(&i1.to_be_bytes());
    password.extend_from_slice(&[low; 4]);

    let mut out = Zeroizing::new([0u8; 32]);
    pbkdf2::pbkdf2_hmac::<Sha512>(&password, &[0xff], LEGACY_PBKDF2_ROUNDS, &mut out[..]);
    out
}
