// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lossless Lua 5.1 parser and source-transformation toolkit.
//!
//! This crate parses Lua 5.1 source into a tree that preserves every byte
//! of the input — comments, whitespace, and exact literal spellings
//! included — supports programmatic rewrites of that tree, and serializes
//! it back: byte-identical when unmodified, compact and correct after
//! transformations such as identifier minification.
//!
//! - [`source_analysis`] — token taxonomy, scanner, parser, positions
//! - [`ast`] — the lossless tree and its validity predicates
//! - [`ast_walker`] — depth-first, lexical-order traversal
//! - [`transform`] — offset reflow and adjoin fixing
//! - [`analyse`] — scope graph and variable resolution
//! - [`minify()`](crate::minify()) — shortest-identifier renaming
//!
//! # Round-trip guarantee
//!
//! ```
//! use luamin_core::source_analysis::parse;
//!
//! let source = b"local x = 1 -- keep me\nprint(x)\n";
//! let (file, err) = parse("demo.lua", source);
//! assert!(err.is_none());
//! assert_eq!(file.to_bytes(), source);
//! ```
//!
//! # Minification
//!
//! ```
//! use luamin_core::source_analysis::parse;
//! use luamin_core::minify;
//!
//! let (mut file, _) = parse("demo.lua", b"local value = 1\nprint(value)\n");
//! minify(&mut file);
//! assert_eq!(file.to_bytes(), b"local a=1 print(a)");
//! ```

pub mod analyse;
pub mod ast;
pub mod ast_walker;
mod minify;
pub mod source_analysis;
pub mod transform;
mod unparse;

pub use analyse::build_file_scope;
pub use minify::{
    generate_ident, ident_index, minify, MAX_IDENT_INDEX, MAX_IDENT_LENGTH,
};
pub use source_analysis::{parse, parse_file};
pub use transform::{fix_adjoined_tokens, fix_token_offsets};
