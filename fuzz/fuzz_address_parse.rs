//! Fuzz target for `/ipfs/` and `/ipns/` address parsing.
//!
//! Run with: cargo +nightly fuzz run fuzz_address_parse
//!
//! Any address that parses must print back to text that parses to the same
//! address.

#![no_main]

use ipfsbridge_core::Address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Some(address) = Address::parse(s) {
        let printed = address.to_string();
        assert_eq!(Address::parse(&printed), Some(address));
    }
});
