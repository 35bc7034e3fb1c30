//! Fuzz target: `TouchEvent::from_payload`
//!
//! Feeds arbitrary JSON documents to the snapshot parser.  Parsing must
//! never panic, and whatever parses must survive a render/parse cycle
//! with the same touched set.
//!
//! cargo fuzz run fuzz_touch_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use touchreact::touch::{MAX_READINGS, TouchEvent};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(event) = TouchEvent::from_payload(&value) {
        assert!(event.readings().len() <= MAX_READINGS);
        let back = TouchEvent::from_payload(&event.to_payload()).expect("rendered snapshot must parse");
        assert_eq!(back.touched(), event.touched());
    }
});
