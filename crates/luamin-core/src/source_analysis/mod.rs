// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical and syntactic analysis of Lua 5.1 source text.
//!
//! # Scanning
//!
//! The [`Lexer`] turns a byte buffer into a stream of
//! (offset, [`TokenKind`], bytes) triples. Every byte of the input is
//! covered by exactly one token — whitespace and comments are tokens of
//! their own — which is what makes lossless trees possible downstream.
//!
//! # Parsing
//!
//! [`parse`] drives the lexer and builds a [`File`](crate::ast::File)
//! whose serialization reproduces the input byte for byte. Prefix tokens
//! are folded into the next significant token; operator precedence is
//! handled with Pratt-style priorities from the [`TokenKind`] table.
//!
//! ```
//! use luamin_core::source_analysis::parse;
//!
//! let source = b"-- example\nreturn 1 + 2\n";
//! let (file, err) = parse("example.lua", source);
//! assert!(err.is_none());
//! assert_eq!(file.to_bytes(), source);
//! ```
//!
//! # Errors
//!
//! Syntax errors abort the parse; lexical errors are recorded while
//! scanning continues. Either way the first error is returned as a
//! [`SyntaxError`] carrying a [`Position`] resolved against the file's
//! line table.

mod error;
mod lexer;
mod parser;
mod source_file;
mod token;

#[cfg(test)]
mod lexer_property_tests;

pub use error::{SyntaxError, SyntaxErrorKind};
pub use lexer::Lexer;
pub use parser::{parse, parse_file};
pub use source_file::{Position, SourceFile};
pub use token::{AdjoinSep, TokenKind, UNARY_PRECEDENCE};
