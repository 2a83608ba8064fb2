//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Feeds arbitrary text through `AppConfig::parse()` and, for inputs that
//! parse, through environment overrides and URL building.

#![no_main]

use ipfsbridge_config::{AppConfig, DAEMON_URL_ENV};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = AppConfig::parse(s) {
        let _ = config.daemon.api_url("dag/get");
        let overridden =
            config.apply_overrides(|key| (key == DAEMON_URL_ENV).then(|| s.to_string()));
        let _ = overridden.validate();
    }
});
