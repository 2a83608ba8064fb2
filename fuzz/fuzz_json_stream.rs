//! Fuzz target for the pubsub stream decoder.
//!
//! Run with: cargo +nightly fuzz run fuzz_json_stream
//!
//! The first byte picks a chunk size; the rest is pushed in pieces of that
//! size. The decoder must never panic and must never yield a value from a
//! split input that it would not yield from the whole input.

#![no_main]

use ipfsbridge_core::{JsonStreamDecoder, PubsubMessage};
use libfuzzer_sys::fuzz_target;

fn drain(decoder: &mut JsonStreamDecoder, out: &mut Vec<serde_json::Value>) -> bool {
    loop {
        match decoder.next_value() {
            Ok(Some(value)) => out.push(value),
            Ok(None) => return true,
            Err(_) => return false,
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&step, body)) = data.split_first() else {
        return;
    };
    let step = usize::from(step).max(1);

    let mut whole = JsonStreamDecoder::new();
    whole.push(body);
    let mut expected = Vec::new();
    let whole_ok = drain(&mut whole, &mut expected);

    let mut split = JsonStreamDecoder::new();
    let mut seen = Vec::new();
    let mut split_ok = true;
    for chunk in body.chunks(step) {
        split.push(chunk);
        if !drain(&mut split, &mut seen) {
            split_ok = false;
            break;
        }
    }

    if whole_ok && split_ok {
        assert!(seen.len() <= expected.len());
        assert_eq!(seen[..], expected[..seen.len()]);
    }

    for value in seen {
        let _ = PubsubMessage::from_wire(value);
    }
});
