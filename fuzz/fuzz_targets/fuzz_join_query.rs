#![no_main]

use libfuzzer_sys::fuzz_target;
use wallet_lobby_client::params::JoinParams;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let params = JoinParams::from_query(s);
        for value in [&params.wallet_address, &params.game_id, &params.username]
            .into_iter()
            .flatten()
        {
            assert!(!value.is_empty());
        }
    }
});
