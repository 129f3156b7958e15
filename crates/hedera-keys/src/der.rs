//! Minimal ASN.1 DER support for key containers.
//!
//! Only the structures keys travel in are covered:
//!
//! - PKCS#8 `PrivateKeyInfo` / `OneAsymmetricKey` (RFC 5208, RFC 5958)
//! - SEC1 `ECPrivateKey` (RFC 5915)
//! - X.509 `SubjectPublicKeyInfo` (RFC 5280)
//!
//! Lengths must use the minimal encoding and at most two length octets, which
//! is plenty for 32-byte keys.

use zeroize::Zeroizing;

use crate::error::{malformed, KeyError};
use crate::KeyAlgorithm;

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_OID: u8 = 0x06;
pub(crate) const TAG_SEQUENCE: u8 = 0x30;
const TAG_EC_PARAMETERS: u8 = 0xa0;

/// 1.3.101.112
pub const OID_ED25519: &[u8] = &[0x2b, 0x65, 0x70];
/// 1.2.840.10045.2.1
pub const OID_EC_PUBLIC_KEY: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];
/// 1.3.132.0.10
pub const OID_SECP256K1: &[u8] = &[0x2b, 0x81, 0x04, 0x00, 0x0a];

struct Reader<'a> {
    input: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    fn peek_tag(&self) -> Option<u8> {
        self.input.first().copied()
    }

    fn read_any(&mut self) -> Result<(u8, &'a [u8]), KeyError> {
        let (&tag, rest) = self
            .input
            .split_first()
            .ok_or_else(|| malformed("unexpected end of DER input"))?;
        let (&first, rest) = rest
            .split_first()
            .ok_or_else(|| malformed("DER value is missing its length"))?;

        let (len, rest) = match first {
            0x00..=0x7f => (usize::from(first), rest),
            0x81 => match rest.split_first() {
                Some((&len, rest)) if len >= 0x80 => (usize::from(len), rest),
                Some(_) => return Err(malformed("non-minimal DER length")),
                None => return Err(malformed("truncated DER length")),
            },
            0x82 => {
                if rest.len() < 2 {
                    return Err(malformed("truncated DER length"));
                }
                let len = usize::from(u16::from_be_bytes([rest[0], rest[1]]));
                if len < 0x100 {
                    return Err(malformed("non-minimal DER length"));
                }
                (len, &rest[2..])
            }
            _ => return Err(malformed("unsupported DER length encoding")),
        };

        if rest.len() < len {
            return Err(malformed(format!(
                "truncated DER value: need {} bytes, have {}",
                len,
                rest.len()
            )));
        }

        let (value, rest) = rest.split_at(len);
        self.input = rest;
        Ok((tag, value))
    }

    fn read(&mut self, tag: u8) -> Result<&'a [u8], KeyError> {
        let (actual, value) = self.read_any()?;
        if actual != tag {
            return Err(malformed(format!(
                "expected DER tag 0x{tag:02x}, found 0x{actual:02x}"
            )));
        }
        Ok(value)
    }

    fn finish(self) -> Result<(), KeyError> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(malformed("trailing data after DER value"))
        }
    }
}

/// Reads a single SEQUENCE that spans all of `input`.
fn top_level_sequence(input: &[u8]) -> Result<Reader<'_>, KeyError> {
    let mut outer = Reader::new(input);
    let body = outer.read(TAG_SEQUENCE)?;
    outer.finish()?;
    Ok(Reader::new(body))
}

/// Decodes a PKCS#8 or SEC1 private key and returns its algorithm and the raw
/// secret bytes (borrowed from `input`).
pub fn decode_private_key(input: &[u8]) -> Result<(KeyAlgorithm, &[u8]), KeyError> {
    let mut seq = top_level_sequence(input)?;
    let version = seq.read(TAG_INTEGER)?;

    // SEC1 puts the secret directly after the version.
    if seq.peek_tag() == Some(TAG_OCTET_STRING) {
        if version != [1] {
            return Err(malformed("unsupported ECPrivateKey version"));
        }
        return Ok((KeyAlgorithm::Ecdsa, read_sec1_body(seq)?));
    }

    if version != [0] && version != [1] {
        return Err(malformed("unsupported PKCS#8 version"));
    }

    let algorithm = read_algorithm_identifier(&mut seq)?;
    let private_key = seq.read(TAG_OCTET_STRING)?;

    // Optional attributes [0] and public key [1] are not needed, but must parse.
    while !seq.is_empty() {
        seq.read_any()?;
    }

    let secret = match algorithm {
        KeyAlgorithm::Ed25519 => {
            let mut inner = Reader::new(private_key);
            let secret = inner.read(TAG_OCTET_STRING)?;
            inner.finish()?;
            secret
        }
        // Older ledger tooling wraps a bare OCTET STRING instead of ECPrivateKey.
        KeyAlgorithm::Ecdsa if private_key.first() == Some(&TAG_OCTET_STRING) => {
            let mut inner = Reader::new(private_key);
            let secret = inner.read(TAG_OCTET_STRING)?;
            inner.finish()?;
            secret
        }
        KeyAlgorithm::Ecdsa => decode_sec1(private_key)?,
    };

    Ok((algorithm, secret))
}

fn decode_sec1(input: &[u8]) -> Result<&[u8], KeyError> {
    let mut seq = top_level_sequence(input)?;
    if seq.read(TAG_INTEGER)? != [1] {
        return Err(malformed("unsupported ECPrivateKey version"));
    }
    read_sec1_body(seq)
}

fn read_sec1_body(mut seq: Reader<'_>) -> Result<&[u8], KeyError> {
    let secret = seq.read(TAG_OCTET_STRING)?;

    while !seq.is_empty() {
        let (tag, value) = seq.read_any()?;
        if tag == TAG_EC_PARAMETERS {
            let mut params = Reader::new(value);
            let curve = params.read(TAG_OID)?;
            params.finish()?;
            if curve != OID_SECP256K1 {
                return Err(unsupported_curve(curve));
            }
        }
    }

    Ok(secret)
}

fn read_algorithm_identifier(seq: &mut Reader<'_>) -> Result<KeyAlgorithm, KeyError> {
    let mut id = Reader::new(seq.read(TAG_SEQUENCE)?);
    let oid = id.read(TAG_OID)?;
    let params = if id.is_empty() {
        None
    } else {
        Some(id.read_any()?)
    };
    id.finish()?;

    if oid == OID_ED25519 {
        Ok(KeyAlgorithm::Ed25519)
    } else if oid == OID_SECP256K1 {
        Ok(KeyAlgorithm::Ecdsa)
    } else if oid == OID_EC_PUBLIC_KEY {
        match params {
            Some((TAG_OID, curve)) if curve == OID_SECP256K1 => Ok(KeyAlgorithm::Ecdsa),
            Some((TAG_OID, curve)) => Err(unsupported_curve(curve)),
            _ => Err(malformed("EC key without a named curve")),
        }
    } else {
        Err(KeyError::UnsupportedAlgorithm(format!(
            "algorithm OID {}",
            oid_to_string(oid)
        )))
    }
}

/// Decodes a SubjectPublicKeyInfo and returns its algorithm and the key bytes
/// from the BIT STRING.
pub fn decode_public_key(input: &[u8]) -> Result<(KeyAlgorithm, &[u8]), KeyError> {
    let mut seq = top_level_sequence(input)?;
    let algorithm = read_algorithm_identifier(&mut seq)?;
    let bits = seq.read(TAG_BIT_STRING)?;
    seq.finish()?;

    match bits.split_first() {
        Some((0, key)) => Ok((algorithm, key)),
        Some(_) => Err(malformed("public key BIT STRING has unused bits")),
        None => Err(malformed("empty public key BIT STRING")),
    }
}

/// PKCS#8 v1 encoding of a 32-byte secret.
///
/// Ed25519 produces the 48-byte `302e020100300506032b657004220420 || key` form;
/// secp256k1 wraps a SEC1 `ECPrivateKey` under `id-ecPublicKey`.
pub fn encode_private_key(algorithm: KeyAlgorithm, secret: &[u8; 32]) -> Vec<u8> {
    let version = encode(TAG_INTEGER, &[0]);
    let private_key = match algorithm {
        KeyAlgorithm::Ed25519 => Zeroizing::new(encode(TAG_OCTET_STRING, secret)),
        KeyAlgorithm::Ecdsa => {
            let inner = Zeroizing::new(encode(TAG_OCTET_STRING, secret));
            Zeroizing::new(sequence(&[encode(TAG_INTEGER, &[1]).as_slice(), &inner[..]]))
        }
    };
    let wrapped = Zeroizing::new(encode(TAG_OCTET_STRING, &private_key));

    sequence(&[
        version.as_slice(),
        algorithm_identifier(algorithm).as_slice(),
        &wrapped[..],
    ])
}

/// SubjectPublicKeyInfo encoding of raw public key bytes.
pub fn encode_public_key(algorithm: KeyAlgorithm, key: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(key.len() + 1);
    bits.push(0);
    bits.extend_from_slice(key);

    sequence(&[
        algorithm_identifier(algorithm).as_slice(),
        encode(TAG_BIT_STRING, &bits).as_slice(),
    ])
}

fn algorithm_identifier(algorithm: KeyAlgorithm) -> Vec<u8> {
    match algorithm {
        KeyAlgorithm::Ed25519 => sequence(&[encode(TAG_OID, OID_ED25519).as_slice()]),
        KeyAlgorithm::Ecdsa => sequence(&[
            encode(TAG_OID, OID_EC_PUBLIC_KEY).as_slice(),
            encode(TAG_OID, OID_SECP256K1).as_slice(),
        ]),
    }
}

fn sequence(parts: &[&[u8]]) -> Vec<u8> {
    let body = Zeroizing::new(parts.concat());
    encode(TAG_SEQUENCE, &body)
}

fn encode(tag: u8, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len() + 4);
    out.push(tag);
    match value.len() {
        len @ 0..=0x7f => out.push(len as u8),
        len @ 0x80..=0xff => {
            out.push(0x81);
            out.push(len as u8);
        }
        len => {
            let len = u16::try_from(len).expect("key containers are far below 64 KiB");
            out.push(0x82);
            out.extend_from_slice(&len.to_be_bytes());
        }
    }
    out.extend_from_slice(value);
    out
}

fn unsupported_curve(curve: &[u8]) -> KeyError {
    KeyError::UnsupportedAlgorithm(format!("elliptic curve {}", oid_to_string(curve)))
}

/// Dotted form of an encoded OBJECT IDENTIFIER, for error messages.
fn oid_to_string(oid: &[u8]) -> String {
    let mut arcs: Vec<u64> = Vec::new();
    let mut acc: u64 = 0;
    for &byte in oid {
        acc = (acc << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            if arcs.is_empty() {
                let first = (acc / 40).min(2);
                arcs.push(first);
                arcs.push(acc - first * 40);
            } else {
                arcs.push(acc);
            }
            acc = 0;
        }
    }
    arcs.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
