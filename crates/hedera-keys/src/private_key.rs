//! Private keys: generation, parsing, export, derivation and signing.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer, SigningKey};
use log::{debug, trace};
use rand::rngs::OsRng;
use secp256k1::{Secp256k1, SecretKey};
use zeroize::Zeroizing;

use crate::der;
use crate::derive::{self, ChainCode, HARDENED_BIT, HEDERA_COIN_TYPE};
use crate::error::{decode_hex, malformed, KeyError, ParseAttempt};
use crate::mnemonic::{derive_seed, Mnemonic};
use crate::pem;
use crate::public_key::{ecdsa_message, PublicKey};
use crate::KeyAlgorithm;

const SECRET_LEN: usize = 32;
const ED25519_KEYPAIR_LEN: usize = 64;

const PEM_PKCS8: &str = "PRIVATE KEY";
const PEM_SEC1: &str = "EC PRIVATE KEY";
const PEM_ENCRYPTED: &str = "ENCRYPTED PRIVATE KEY";

/// secp256k1 scalar that is wiped when the key is dropped.
#[derive(Clone)]
struct EcdsaSecret(SecretKey);

impl Drop for EcdsaSecret {
    fn drop(&mut self) {
        self.0.non_secure_erase();
    }
}

#[derive(Clone)]
enum KeyData {
    Ed25519(SigningKey),
    Ecdsa(EcdsaSecret),
}

/// A private key on the Hedera network.
///
/// Immutable once built. Keys carrying a [`ChainCode`] can derive children.
#[derive(Clone)]
pub struct PrivateKey {
    data: KeyData,
    chain_code: Option<ChainCode>,
}

impl PrivateKey {
    fn ed25519(key: SigningKey, chain_code: Option<ChainCode>) -> Self {
        Self {
            data: KeyData::Ed25519(key),
            chain_code,
        }
    }

    fn ecdsa(key: SecretKey, chain_code: Option<ChainCode>) -> Self {
        Self {
            data: KeyData::Ecdsa(EcdsaSecret(key)),
            chain_code,
        }
    }

    /// Generate a new derivable Ed25519 key.
    pub fn generate_ed25519() -> Self {
        Self::ed25519(SigningKey::generate(&mut OsRng), Some(ChainCode::random()))
    }

    /// Generate a new secp256k1 key. It carries no chain code.
    pub fn generate_ecdsa() -> Self {
        Self::ecdsa(SecretKey::new(&mut rand::thread_rng()), None)
    }

    /// Parse a private key from bytes.
    ///
    /// 32 and 64 bytes are read as Ed25519 (a 64-byte keypair keeps only its
    /// first half), unless the 64 bytes are a complete DER key. Anything else
    /// is read as DER, which names its algorithm.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if let Some(key) = Self::from_bytes_der_sized_as_keypair(bytes) {
            return Ok(key);
        }
        match bytes.len() {
            SECRET_LEN | ED25519_KEYPAIR_LEN => {
                debug!("{} raw bytes, reading as Ed25519", bytes.len());
                Self::from_bytes_ed25519(bytes)
            }
            _ => Self::from_bytes_der(bytes),
        }
    }

    /// Parse an Ed25519 key from 32/64 raw bytes or DER.
    pub fn from_bytes_ed25519(bytes: &[u8]) -> Result<Self, KeyError> {
        if let Some(key) = Self::from_bytes_der_sized_as_keypair(bytes) {
            return key.require(KeyAlgorithm::Ed25519);
        }
        match bytes.len() {
            SECRET_LEN | ED25519_KEYPAIR_LEN => {
                Ok(Self::ed25519(ed25519_secret(&bytes[..SECRET_LEN])?, None))
            }
            _ => Self::from_bytes_der(bytes)?.require(KeyAlgorithm::Ed25519),
        }
    }

    /// secp256k1 PKCS#8 DER is exactly as long as an Ed25519 keypair. A
    /// 64-byte input that decodes completely as DER is taken as DER.
    fn from_bytes_der_sized_as_keypair(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != ED25519_KEYPAIR_LEN || bytes.first() != Some(&der::TAG_SEQUENCE) {
            return None;
        }
        let key = Self::from_bytes_der(bytes).ok()?;
        debug!("64 bytes decode as {} DER, not an Ed25519 keypair", key.algorithm());
        Some(key)
    }

    /// Parse a secp256k1 key from a 32-byte scalar or DER.
    pub fn from_bytes_ecdsa(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() == SECRET_LEN {
            return Ok(Self::ecdsa(ecdsa_secret(bytes)?, None));
        }
        Self::from_bytes_der(bytes)?.require(KeyAlgorithm::Ecdsa)
    }

    /// Parse a PKCS#8 or SEC1 DER private key.
    pub fn from_bytes_der(bytes: &[u8]) -> Result<Self, KeyError> {
        let (algorithm, secret) = der::decode_private_key(bytes)?;
        match algorithm {
            KeyAlgorithm::Ed25519 => Ok(Self::ed25519(ed25519_secret(secret)?, None)),
            KeyAlgorithm::Ecdsa => Ok(Self::ecdsa(ecdsa_secret(secret)?, None)),
        }
    }

    /// Parse hex-encoded DER.
    pub fn from_str_der(s: &str) -> Result<Self, KeyError> {
        Self::from_bytes_der(&decode_hex(s)?)
    }

    /// Parse a hex-encoded Ed25519 key (raw or DER).
    pub fn from_str_ed25519(s: &str) -> Result<Self, KeyError> {
        Self::from_bytes_ed25519(&decode_hex(s)?)
    }

    /// Parse a hex-encoded secp256k1 key (raw or DER).
    pub fn from_str_ecdsa(s: &str) -> Result<Self, KeyError> {
        Self::from_bytes_ecdsa(&decode_hex(s)?)
    }

    fn from_str_raw(s: &str) -> Result<Self, KeyError> {
        let bytes = decode_hex(s)?;
        if Self::from_bytes_der_sized_as_keypair(&bytes).is_some() {
            return Err(malformed("input is a DER key, not a raw key"));
        }
        match bytes.len() {
            SECRET_LEN | ED25519_KEYPAIR_LEN => Self::from_bytes_ed25519(&bytes),
            n => Err(malformed(format!(
                "raw keys are {SECRET_LEN} or {ED25519_KEYPAIR_LEN} bytes, got {n}"
            ))),
        }
    }

    /// Parse a PEM `PRIVATE KEY` (PKCS#8) or `EC PRIVATE KEY` (SEC1) block.
    pub fn from_pem(text: &str) -> Result<Self, KeyError> {
        let block = pem::decode(text)?;
        match block.label.as_str() {
            PEM_PKCS8 => Self::from_bytes_der(&block.contents),
            PEM_SEC1 => Self::from_bytes_der(&block.contents)?.require(KeyAlgorithm::Ecdsa),
            PEM_ENCRYPTED => Err(KeyError::UnsupportedAlgorithm(
                "password-protected PEM".into(),
            )),
            other => Err(malformed(format!("unexpected PEM label `{other}`"))),
        }
    }

    /// SLIP-10 Ed25519 master key of `seed`.
    pub fn from_seed_ed25519(seed: &[u8]) -> Result<Self, KeyError> {
        let master = derive::ed25519_master(seed)?;
        Ok(Self::ed25519(
            SigningKey::from_bytes(&master.key),
            Some(master.chain_code),
        ))
    }

    /// BIP-32 secp256k1 master key of `seed`.
    pub fn from_seed_ecdsa(seed: &[u8]) -> Result<Self, KeyError> {
        let (secret, chain_code) = derive::secp256k1_master(seed)?;
        Ok(Self::ecdsa(secret, Some(chain_code)))
    }

    /// Ed25519 key at `m/44'/3030'/0'/0'`, the root of a wallet's accounts.
    pub fn from_mnemonic(mnemonic: &Mnemonic, passphrase: &str) -> Result<Self, KeyError> {
        let seed = derive_seed(mnemonic, passphrase);
        let mut key = Self::from_seed_ed25519(&seed[..])?;
        for index in [44, HEDERA_COIN_TYPE, 0, 0] {
            key = key.derive(index)?;
        }
        Ok(key)
    }

    /// secp256k1 key at `m/44'/3030'/0'/0`.
    pub fn from_mnemonic_ecdsa(mnemonic: &Mnemonic, passphrase: &str) -> Result<Self, KeyError> {
        let seed = derive_seed(mnemonic, passphrase);
        let mut key = Self::from_seed_ecdsa(&seed[..])?;
        for index in [44 | HARDENED_BIT, HEDERA_COIN_TYPE | HARDENED_BIT, HARDENED_BIT, 0] {
            key = key.derive(index)?;
        }
        Ok(key)
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
        match self.data {
            KeyData::Ed25519(_) => KeyAlgorithm::Ed25519,
            KeyData::Ecdsa(_) => KeyAlgorithm::Ecdsa,
        }
    }

    pub fn is_ed25519(&self) -> bool {
        self.algorithm() == KeyAlgorithm::Ed25519
    }

    pub fn is_ecdsa(&self) -> bool {
        self.algorithm() == KeyAlgorithm::Ecdsa
    }

    pub fn public_key(&self) -> PublicKey {
        match &self.data {
            KeyData::Ed25519(key) => PublicKey::from_ed25519(key.verifying_key()),
            KeyData::Ecdsa(secret) => {
                PublicKey::from_secp256k1(secret.0.public_key(&Secp256k1::signing_only()))
            }
        }
    }

    fn secret_bytes(&self) -> Zeroizing<[u8; SECRET_LEN]> {
        match &self.data {
            KeyData::Ed25519(key) => Zeroizing::new(key.to_bytes()),
            KeyData::Ecdsa(secret) => Zeroizing::new(secret.0.secret_bytes()),
        }
    }

    /// The 32-byte secret: Ed25519 seed or secp256k1 scalar.
    pub fn to_bytes_raw(&self) -> Vec<u8> {
        self.secret_bytes().to_vec()
    }

    /// PKCS#8 DER.
    pub fn to_bytes_der(&self) -> Vec<u8> {
        der::encode_private_key(self.algorithm(), &self.secret_bytes())
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

    /// Sign `message`.
    ///
    /// Ed25519 returns the 64-byte RFC 8032 signature. ECDSA signs the
    /// Keccak-256 digest of `message` with an RFC 6979 nonce and returns the
    /// 64-byte compact `r || s` with low `s`.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match &self.data {
            KeyData::Ed25519(key) => key.sign(message).to_bytes().to_vec(),
            KeyData::Ecdsa(secret) => Secp256k1::signing_only()
                .sign_ecdsa(&ecdsa_message(message), &secret.0)
                .serialize_compact()
                .to_vec(),
        }
    }

    pub fn is_derivable(&self) -> bool {
        self.chain_code.is_some()
    }

    pub fn chain_code(&self) -> Option<&ChainCode> {
        self.chain_code.as_ref()
    }

    /// Derive the child at `index`.
    ///
    /// Ed25519 children are always hardened. secp256k1 children are hardened
    /// when `index` has [`HARDENED_BIT`] set.
    pub fn derive(&self, index: u32) -> Result<Self, KeyError> {
        let chain_code = self.chain_code.as_ref().ok_or_else(|| {
            KeyError::NotDerivable(format!("{} key has no chain code", self.algorithm()))
        })?;
        trace!("deriving {} child {index}", self.algorithm());

        match &self.data {
            KeyData::Ed25519(key) => {
                let parent = Zeroizing::new(key.to_bytes());
                let child = derive::ed25519_child(&parent, chain_code, index)?;
                Ok(Self::ed25519(
                    SigningKey::from_bytes(&child.key),
                    Some(child.chain_code),
                ))
            }
            KeyData::Ecdsa(secret) => {
                let (child, chain_code) = derive::secp256k1_child(&secret.0, chain_code, index)?;
                Ok(Self::ecdsa(child, Some(chain_code)))
            }
        }
    }

    /// Derive with the pre-SLIP-10 scheme used by early Hedera wallets.
    ///
    /// Ed25519 only. Works without a chain code; the child has none.
    pub fn legacy_derive(&self, index: i64) -> Result<Self, KeyError> {
        match &self.data {
            KeyData::Ed25519(key) => {
                trace!("legacy derivation of Ed25519 child {index}");
                let parent = Zeroizing::new(key.to_bytes());
                let child = derive::legacy_ed25519(&parent, index);
                Ok(Self::ed25519(SigningKey::from_bytes(&child), None))
            }
            KeyData::Ecdsa(_) => Err(KeyError::NotDerivable(
                "legacy derivation is only defined for Ed25519".into(),
            )),
        }
    }
}

fn ed25519_secret(bytes: &[u8]) -> Result<SigningKey, KeyError> {
    let seed = <&[u8; SECRET_LEN]>::try_from(bytes).map_err(|_| {
        malformed(format!(
            "Ed25519 secrets are {SECRET_LEN} bytes, got {}",
            bytes.len()
        ))
    })?;
    Ok(SigningKey::from_bytes(seed))
}

fn ecdsa_secret(bytes: &[u8]) -> Result<SecretKey, KeyError> {
    if bytes.len() != SECRET_LEN {
        return Err(malformed(format!(
            "secp256k1 secrets are {SECRET_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    SecretKey::from_slice(bytes).map_err(|_| malformed("secp256k1 scalar out of range"))
}

impl FromStr for PrivateKey {
    type Err = KeyError;

    /// Tries raw hex, then DER hex, then PEM. The first that parses wins.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let attempts: [(ParseAttempt, fn(&str) -> Result<Self, KeyError>); 3] = [
            (ParseAttempt::RawHex, Self::from_str_raw),
            (ParseAttempt::DerHex, Self::from_str_der),
            (ParseAttempt::Pem, Self::from_pem),
        ];

        let mut failures = Vec::with_capacity(attempts.len());
        for (attempt, parse) in attempts {
            match parse(s) {
                Ok(key) => return Ok(key),
                Err(err) => {
                    debug!("private key is not {attempt}: {err}");
                    failures.push((attempt, err));
                }
            }
        }
        Err(KeyError::AggregateParseFailure(failures))
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_der())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("public_key", &self.public_key().to_string_der())
            .field("derivable", &self.is_derivable())
            .finish()
    }
}
