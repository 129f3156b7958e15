//! Derive per-account keys from a fresh recovery phrase
//! Run with: RUST_LOG=trace cargo run --example derive_accounts

use hedera_keys::mnemonic::generate_mnemonic;
use hedera_keys::{PrivateKey, WordCount};

fn main() {
    env_logger::init();

    let mnemonic = generate_mnemonic(WordCount::TwentyFour).unwrap();
    println!("=== TEST WALLET ===\n");
    println!("⚠️  SAVE THIS MNEMONIC (test use only):\n");
    println!("{}\n", mnemonic);

    // m/44'/3030'/0'/0'
    let root = PrivateKey::from_mnemonic(&mnemonic, "").unwrap();
    println!("Ed25519 accounts (m/44'/3030'/0'/0'/i'):\n");
    for index in 0..3 {
        let key = root.derive(index).unwrap();
        println!("  {index}: {}", key.public_key());
    }

    // m/44'/3030'/0'/0
    let root = PrivateKey::from_mnemonic_ecdsa(&mnemonic, "").unwrap();
    println!("\nECDSA(secp256k1) accounts (m/44'/3030'/0'/0/i):\n");
    for index in 0..3 {
        let key = root.derive(index).unwrap();
        println!("  {index}: {}", key.public_key().to_string_raw());
    }
}
