// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for parser crash safety and round-trip fidelity.
//!
//! Feeds arbitrary byte sequences to the parser and asserts that it never
//! panics. Whenever an input is accepted without error, serializing the
//! tree must reproduce the input byte for byte — the central lossless
//! guarantee of the crate.
//!
//! # Success Criteria
//!
//! - No panic on any input
//! - `parse` always returns a tree and an optional error
//! - Accepted inputs round-trip exactly

#![no_main]

use libfuzzer_sys::fuzz_target;
use luamin_core::parse;

fuzz_target!(|data: &[u8]| {
    let (file, err) = parse("fuzz.lua", data);
    if err.is_none() {
        assert_eq!(file.to_bytes(), data, "accepted input failed to round-trip");
    }
});
