// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token-level rewrites of parsed trees.
//!
//! After a pass mutates token bytes or trivia, the tree's offsets and line
//! table no longer describe its content; [`fix_token_offsets`] recomputes
//! them. [`fix_adjoined_tokens`] inserts the minimum separators needed so
//! that the emitted bytes re-lex to the same token sequence.

mod adjoin;
mod reflow;

pub use adjoin::{adjoin_separator, fix_adjoined_tokens};
pub use reflow::{fix_block_offsets, fix_expr_offsets, fix_stmt_offsets, fix_token_offsets};
