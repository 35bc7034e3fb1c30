//! Fuzz target: `FrameDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming frame decoder, split
//! at a fuzzer-chosen point, and checks that every yielded frame respects
//! the size limits and that splitting the input never changes the result.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use touchreact::adapters::bridge::codec::{FrameDecoder, MAX_FRAME_SIZE, encode_frame};

fuzz_target!(|data: &[u8]| {
    let mut whole = FrameDecoder::new();
    let frames = whole.feed(data);
    for f in &frames {
        assert!(!f.is_empty(), "decoder must not yield empty payload");
        assert!(f.len() <= MAX_FRAME_SIZE, "payload exceeds MAX_FRAME_SIZE");
        assert_eq!(encode_frame(f).map(|e| e.len()), Some(f.len() + 4));
    }

    let split = data.first().map_or(0, |b| *b as usize).min(data.len());
    let mut chunked = FrameDecoder::new();
    let mut again = chunked.feed(&data[..split]);
    again.extend(chunked.feed(&data[split..]));
    assert_eq!(frames, again, "chunking changed the decoded frames");
    assert_eq!(whole.is_mid_frame(), chunked.is_mid_frame());

    // After a reset the decoder must accept bytes cleanly again.
    whole.reset();
    assert!(!whole.is_mid_frame());
    let _ = whole.feed(data);
});
