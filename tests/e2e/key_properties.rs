//! End-to-end properties of the key API.
//!
//! 1. Byte and string round-trips for both algorithms
//! 2. DER re-encoding is canonical
//! 3. Ed25519 signing is deterministic
//! 4. Signatures verify for any message length
//! 5. Derivation needs a chain code
//! 6. Derivation is deterministic
//! 7. Mnemonic roots line up with manual derivation

use hedera_keys::derive::HARDENED_BIT;
use hedera_keys::mnemonic::{derive_seed, parse_mnemonic};
use hedera_keys::{KeyAlgorithm, KeyError, PrivateKey, PublicKey};

// BIP-39 reference vector, 256 bits of zero entropy
const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn generated() -> [PrivateKey; 2] {
    [PrivateKey::generate_ed25519(), PrivateKey::generate_ecdsa()]
}

// ============================================================================
// 1. Round-trips
// ============================================================================

#[test]
fn test_from_bytes_to_bytes_roundtrip() {
    init();
    for key in generated() {
        let parsed = PrivateKey::from_bytes(&key.to_bytes()).unwrap();
        assert_eq!(parsed.to_bytes(), key.to_bytes(), "{}", key.algorithm());
    }
}

#[test]
fn test_display_parse_roundtrip() {
    init();
    for key in generated() {
        let parsed: PrivateKey = key.to_string().parse().unwrap();
        assert_eq!(parsed.algorithm(), key.algorithm());
        assert_eq!(parsed.to_bytes_raw(), key.to_bytes_raw());
    }
}

#[test]
fn test_ecdsa_der_keeps_its_algorithm() {
    init();
    let key = PrivateKey::generate_ecdsa();
    let der = key.to_bytes();
    assert_eq!(der.len(), 64);

    assert!(PrivateKey::from_bytes(&der).unwrap().is_ecdsa());
    assert!(key.to_string().parse::<PrivateKey>().unwrap().is_ecdsa());
    assert!(matches!(
        PrivateKey::from_bytes_ed25519(&der),
        Err(KeyError::UnsupportedAlgorithm(_))
    ));
}

#[test]
fn test_raw_roundtrip_with_explicit_algorithm() {
    init();
    for key in generated() {
        let parsed = match key.algorithm() {
            KeyAlgorithm::Ed25519 => PrivateKey::from_str_ed25519(&key.to_string_raw()),
            KeyAlgorithm::Ecdsa => PrivateKey::from_str_ecdsa(&key.to_string_raw()),
        }
        .unwrap();
        assert_eq!(parsed.to_bytes_raw(), key.to_bytes_raw());
    }
}

#[test]
fn test_round_trip_keeps_signatures() {
    init();
    for key in generated() {
        let parsed = PrivateKey::from_bytes(&key.to_bytes()).unwrap();
        assert_eq!(parsed.sign(b"same key"), key.sign(b"same key"));
    }
}

// ============================================================================
// 2. DER
// ============================================================================

#[test]
fn test_der_reencoding_is_stable() {
    init();
    for key in generated() {
        let der = key.to_bytes_der();
        let again = PrivateKey::from_bytes_der(&der).unwrap().to_bytes_der();
        assert_eq!(der, again);
    }
}

#[test]
fn test_sec1_der_reencodes_as_pkcs8() {
    init();
    // SEC1 ECPrivateKey with the secp256k1 parameter, scalar 1
    let sec1 = format!(
        "302e0201010420{}a00706052b8104000a",
        "0000000000000000000000000000000000000000000000000000000000000001"
    );
    let key = PrivateKey::from_str_der(&sec1).unwrap();
    assert!(key.is_ecdsa());

    let pkcs8 = key.to_bytes_der();
    let again = PrivateKey::from_bytes_der(&pkcs8).unwrap();
    assert_eq!(again.to_bytes_der(), pkcs8);
}

#[test]
fn test_public_key_der_roundtrip() {
    init();
    for key in generated() {
        let public = key.public_key();
        let parsed = PublicKey::from_bytes_der(&public.to_bytes_der()).unwrap();
        assert_eq!(parsed, public);

        let json = serde_json::to_string(&public).unwrap();
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, public);
    }
}

// ============================================================================
// 3-4. Signing
// ============================================================================

#[test]
fn test_ed25519_signing_is_deterministic() {
    init();
    let key = PrivateKey::generate_ed25519();
    assert_eq!(key.sign(b"hello"), key.sign(b"hello"));
}

#[test]
fn test_signatures_verify_for_any_length() {
    init();
    for key in generated() {
        let public = key.public_key();
        for len in [0usize, 1, 31, 32, 33, 64, 1000] {
            let message = vec![0x5a; len];
            let signature = key.sign(&message);
            assert_eq!(signature.len(), 64);
            assert!(
                public.verify(&message, &signature).is_ok(),
                "{} len {len}",
                key.algorithm()
            );
        }
    }
}

#[test]
fn test_hello_scenario() {
    init();
    let key = PrivateKey::generate_ed25519();
    let public = key.public_key();
    let mut signature = key.sign(b"hello");
    assert!(public.verify(b"hello", &signature).is_ok());

    signature[0] ^= 0x01;
    assert!(matches!(
        public.verify(b"hello", &signature),
        Err(KeyError::SignatureVerify)
    ));
}

#[test]
fn test_signature_from_other_key_fails() {
    init();
    let [a, b] = generated();
    let signature = a.sign(b"message");
    assert!(b.public_key().verify(b"message", &signature).is_err());
}

// ============================================================================
// 5-6. Derivation
// ============================================================================

#[test]
fn test_raw_ecdsa_is_not_derivable() {
    init();
    let raw = PrivateKey::generate_ecdsa().to_bytes_raw();
    let key = PrivateKey::from_bytes_ecdsa(&raw).unwrap();
    assert!(!key.is_derivable());
    assert!(matches!(key.derive(0), Err(KeyError::NotDerivable(_))));
}

#[test]
fn test_parsed_ed25519_loses_chain_code() {
    init();
    let key = PrivateKey::generate_ed25519();
    assert!(key.is_derivable());
    let parsed = PrivateKey::from_bytes(&key.to_bytes()).unwrap();
    assert!(!parsed.is_derivable());
    assert!(parsed.chain_code().is_none());
}

#[test]
fn test_derive_is_deterministic() {
    init();
    let mnemonic = parse_mnemonic(MNEMONIC).unwrap();
    let roots = [
        PrivateKey::from_mnemonic(&mnemonic, "").unwrap(),
        PrivateKey::from_mnemonic_ecdsa(&mnemonic, "").unwrap(),
    ];
    for root in roots {
        let copy = root.clone();
        for index in [0, 1, 7, HARDENED_BIT | 3] {
            let a = root.derive(index).unwrap();
            let b = copy.derive(index).unwrap();
            assert_eq!(a.to_bytes(), b.to_bytes());
            assert_eq!(a.chain_code(), b.chain_code());
        }
        assert_ne!(
            root.derive(0).unwrap().to_bytes(),
            root.derive(1).unwrap().to_bytes()
        );
    }
}

#[test]
fn test_child_keys_are_independent_values() {
    init();
    let root = PrivateKey::generate_ed25519();
    let child = root.derive(0).unwrap();
    drop(root);
    let signature = child.sign(b"still usable");
    assert!(child.public_key().verify(b"still usable", &signature).is_ok());
}

// ============================================================================
// 7. Mnemonic roots
// ============================================================================

#[test]
fn test_mnemonic_root_matches_manual_path() {
    init();
    let mnemonic = parse_mnemonic(MNEMONIC).unwrap();
    let seed = derive_seed(&mnemonic, "");

    let manual = [44, 3030, 0, 0]
        .into_iter()
        .try_fold(PrivateKey::from_seed_ed25519(&seed[..]).unwrap(), |key, i| {
            key.derive(i | HARDENED_BIT)
        })
        .unwrap();
    let root = PrivateKey::from_mnemonic(&mnemonic, "").unwrap();
    assert_eq!(root.to_string(), manual.to_string());
    assert!(root.is_ed25519());

    let ecdsa = PrivateKey::from_mnemonic_ecdsa(&mnemonic, "").unwrap();
    assert!(ecdsa.is_ecdsa());
    assert!(ecdsa.is_derivable());
}
