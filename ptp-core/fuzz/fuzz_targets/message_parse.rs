#![no_main]

use libfuzzer_sys::fuzz_target;
use ptp_core::{Message, MAX_DATA_LEN};

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = Message::deserialize(data) {
        let mut buffer = [0; MAX_DATA_LEN];
        let size = message
            .serialize(&mut buffer)
            .expect("decoded message must fit a send buffer");

        let reparsed = Message::deserialize(&buffer[..size]).expect("re-encoded message must decode");
        assert_eq!(reparsed, message);
    }
});
