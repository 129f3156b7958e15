#![no_main]

use hedera_keys::{der, PrivateKey, PublicKey};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = der::decode_public_key(data);
    let _ = PublicKey::from_bytes(data);

    // Anything accepted must re-encode to DER that decodes to the same secret.
    if let Ok(key) = PrivateKey::from_bytes_der(data) {
        let again = PrivateKey::from_bytes_der(&key.to_bytes_der()).unwrap();
        assert_eq!(again.to_bytes_raw(), key.to_bytes_raw());
    }
});
