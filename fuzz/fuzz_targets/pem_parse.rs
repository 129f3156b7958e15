#![no_main]

use hedera_keys::PrivateKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // PEM armor parsing must return Ok or Err, never panic.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = PrivateKey::from_pem(s);
    }
});
