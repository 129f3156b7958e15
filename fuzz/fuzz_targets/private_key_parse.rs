#![no_main]

use hedera_keys::{PrivateKey, PublicKey};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The generic string parsers must return Ok or Err, never panic.
    // A key that parses must survive its own canonical string.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(key) = s.parse::<PrivateKey>() {
            let again: PrivateKey = key.to_string().parse().unwrap();
            assert_eq!(again.to_bytes_raw(), key.to_bytes_raw());
        }
        let _ = PrivateKey::from_str_ed25519(s);
        let _ = PrivateKey::from_str_ecdsa(s);
        let _ = s.parse::<PublicKey>();
    }
});
