//! Fuzz target for the conversion dispatcher.
//!
//! Arbitrary bytes are parsed as a value document; anything that parses is
//! run through classification and conversion, which must fail cleanly
//! rather than panic.

#![no_main]

use inferconv::config::Settings;
use inferconv::conversion::{ConvertArgs, Converter};
use inferconv::ir::Value;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(value) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    // Paths would touch the filesystem.
    if matches!(value, Value::Str(_) | Value::List(_)) {
        return;
    }

    let settings = Settings::detect();
    let _ = Converter::new(&settings).convert(value, ConvertArgs::new());
});
