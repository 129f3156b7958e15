#![no_main]

use hedera_keys::mnemonic::parse_mnemonic;
use hedera_keys::PrivateKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary UTF-8 as a BIP-39 phrase; a phrase that parses must yield keys.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(mnemonic) = parse_mnemonic(s) {
            let _ = PrivateKey::from_mnemonic(&mnemonic, "");
            let _ = PrivateKey::from_mnemonic_ecdsa(&mnemonic, "");
        }
    }
});
