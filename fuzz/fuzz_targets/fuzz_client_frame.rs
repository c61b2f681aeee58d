#![no_main]

use libfuzzer_sys::fuzz_target;
use wallet_lobby_client::protocol::{parse_frame, ClientEvent};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_frame(s);

        // A decoded event must encode back to a frame that decodes to itself.
        if let Ok(event) = ClientEvent::from_frame(s) {
            let frame = event.to_frame().expect("decoded event re-encodes");
            assert_eq!(ClientEvent::from_frame(&frame).ok(), Some(event));
        }
    }
});
