#![no_main]

use libfuzzer_sys::fuzz_target;
use wallet_lobby_client::eip191::{recover_address, to_checksum_address};

fuzz_target!(|data: &[u8]| {
    let (message, signature) = data.split_at(data.len() / 2);
    let _ = recover_address(message, &String::from_utf8_lossy(signature));

    if let Ok(s) = std::str::from_utf8(data) {
        let _ = to_checksum_address(s);
    }
});
