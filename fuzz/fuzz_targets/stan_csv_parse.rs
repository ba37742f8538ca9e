//! Fuzz target for CmdStan CSV parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the CmdStan CSV reader,
//! checking for panics, crashes, or hangs.

#![no_main]

use inferconv::ir::io_cmdstan_csv::from_stan_csv_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_stan_csv_slice(data);
});
