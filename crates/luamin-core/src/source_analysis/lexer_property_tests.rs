// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the scanner and parser.
//!
//! These tests use `proptest` to verify invariants over generated inputs:
//!
//! 1. **Scanner never panics** — arbitrary bytes always produce tokens
//! 2. **Scanner is lossless** — concatenated token bytes equal the input
//! 3. **Parser never panics** — arbitrary bytes produce a tree or an error
//! 4. **Round trip** — any input parsed without error emits byte-identically
//! 5. **Minified output stays parseable** — and never grows
//! 6. **Scanner is deterministic** — same input, same tokens

use std::sync::Arc;

use proptest::prelude::*;

use super::lexer::Lexer;
use super::{parse, SourceFile, TokenKind};
use crate::minify::minify;

// ============================================================================
// Generators
// ============================================================================

/// Known-valid statement fragments to build programs from.
const STATEMENTS: &[&str] = &[
    "local x = 1",
    "local s = 'str'",
    "local long = [==[ raw ]==]",
    "x = x + .5",
    "x = 1 .. x .. 'end'",
    "t = {a = 1, [2] = 3; 4}",
    "f(x, 'y')",
    "t:m{1}",
    "do local inner = x end",
    "if x then f(x) elseif y then else g() end",
    "for i = 1, 10, 2 do x = x + i end",
    "for k, v in pairs(t) do f(k, v) end",
    "while x < 10 do x = x + 1 end",
    "repeat x = x - 1 until x == 0",
    "local function helper(a, ...) return a, ... end",
    "function t.field:method(p) return self, p end",
];

/// Trivia to interleave between statements.
const SEPARATORS: &[&str] = &[
    "\n",
    " ",
    "\t",
    ";\n",
    " -- comment\n",
    "\n--[[ block\ncomment ]]\n",
    "\r\n",
];

fn statement() -> impl Strategy<Value = String> {
    prop::sample::select(STATEMENTS).prop_map(str::to_string)
}

fn separator() -> impl Strategy<Value = String> {
    prop::sample::select(SEPARATORS).prop_map(str::to_string)
}

/// A syntactically valid program: statements joined by separators.
fn program() -> impl Strategy<Value = String> {
    prop::collection::vec((statement(), separator()), 0..12).prop_map(|parts| {
        let mut program = String::new();
        for (stmt, sep) in parts {
            program.push_str(&stmt);
            program.push_str(&sep);
        }
        program
    })
}

fn scan_all(src: &[u8]) -> Vec<(usize, TokenKind, Vec<u8>)> {
    let file = Arc::new(SourceFile::new("prop.lua"));
    let mut lexer = Lexer::new(file, src);
    let mut tokens = Vec::new();
    loop {
        let (off, kind, bytes) = lexer.scan();
        let done = kind == TokenKind::Eof;
        tokens.push((off, kind, bytes.to_vec()));
        if done {
            return tokens;
        }
    }
}

// ============================================================================
// Property tests
// ============================================================================

/// Default is 256 cases; override via `PROPTEST_CASES` for longer runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(256),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: the scanner never panics on arbitrary bytes.
    #[test]
    fn scanner_never_panics(input in prop::collection::vec(any::<u8>(), 0..400)) {
        let _tokens = scan_all(&input);
    }

    /// Property 2: concatenating every token's bytes reproduces the input.
    #[test]
    fn scanner_is_lossless(input in prop::collection::vec(any::<u8>(), 0..400)) {
        let tokens = scan_all(&input);
        let mut rebuilt = Vec::new();
        for (off, _, bytes) in &tokens {
            prop_assert_eq!(*off, rebuilt.len());
            rebuilt.extend_from_slice(bytes);
        }
        prop_assert_eq!(rebuilt, input);
    }

    /// Property 3: the parser never panics on arbitrary bytes.
    #[test]
    fn parser_never_panics(input in prop::collection::vec(any::<u8>(), 0..400)) {
        let (_file, _err) = parse("prop.lua", &input);
    }

    /// Property 4: any input accepted without error round-trips exactly.
    #[test]
    fn accepted_input_round_trips(input in prop::collection::vec(any::<u8>(), 0..400)) {
        let (file, err) = parse("prop.lua", &input);
        if err.is_none() {
            prop_assert_eq!(file.to_bytes(), input);
        }
    }

    /// Property 4b: generated valid programs parse and round-trip.
    #[test]
    fn generated_programs_round_trip(src in program()) {
        let (file, err) = parse("prop.lua", src.as_bytes());
        prop_assert!(err.is_none(), "program failed to parse: {:?}\n{}", err, src);
        prop_assert_eq!(file.to_bytes(), src.as_bytes());
    }

    /// Property 5: minified programs stay parseable and never grow.
    #[test]
    fn minified_programs_reparse(src in program()) {
        let (mut file, err) = parse("prop.lua", src.as_bytes());
        prop_assert!(err.is_none());
        minify(&mut file);
        let out = file.to_bytes();
        prop_assert!(out.len() <= src.len());
        let (_refile, err) = parse("prop2.lua", &out);
        prop_assert!(
            err.is_none(),
            "minified output failed to parse: {:?}\n{}",
            err,
            String::from_utf8_lossy(&out)
        );
    }

    /// Property 6: scanning is deterministic.
    #[test]
    fn scanner_is_deterministic(input in prop::collection::vec(any::<u8>(), 0..400)) {
        prop_assert_eq!(scan_all(&input), scan_all(&input));
    }
}
