// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for Lua 5.1 source text.
//!
//! The parser consumes tokens from the [`Lexer`] one at a time, folding
//! prefix tokens (spaces and comments) into the next significant token so
//! the resulting tree is lossless. Expressions use Pratt-style operator
//! precedence (see the `expressions` submodule); a single one-token lookahead exists for
//! exactly one production — disambiguating `name =` from a bare expression
//! inside a table constructor — and is not used anywhere else.
//!
//! # Failure Model
//!
//! The first structural violation aborts the parse: errors propagate out of
//! every production with `?`, and [`parse`] returns the error together with
//! a file node holding only the shared file info. Lexical errors do not
//! abort — the scanner records them and keeps producing best-effort tokens —
//! but the first of them is reported in preference to any later parse error.
//!
//! # Example
//!
//! ```
//! use luamin_core::source_analysis::parse;
//!
//! let (file, err) = parse("demo.lua", b"local x = 1\n");
//! assert!(err.is_none());
//! assert_eq!(file.body.items.len(), 1);
//! ```

use std::sync::Arc;

use camino::Utf8Path;
use ecow::EcoVec;

use crate::ast::{Block, File, Prefix, Token};
use crate::source_analysis::{
    Lexer, SourceFile, SyntaxError, SyntaxErrorKind, TokenKind,
};

mod expressions;
mod statements;

pub(crate) use statements::FunctionForm;

/// The current token: its offset, kind, bytes, and accumulated prefixes.
#[derive(Debug, Clone, Default)]
struct TokenState {
    off: usize,
    kind: TokenKind,
    bytes: EcoVec<u8>,
    prefix: Vec<Prefix>,
}

/// Parser state over a token stream.
pub(crate) struct Parser<'src> {
    file: Arc<SourceFile>,
    lexer: Lexer<'src>,
    /// Current token state.
    state: TokenState,
    /// Stored state for the single-token lookahead.
    look: Option<TokenState>,
}

impl<'src> Parser<'src> {
    fn new(file: Arc<SourceFile>, src: &'src [u8]) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(Arc::clone(&file), src),
            file,
            state: TokenState::default(),
            look: None,
        };
        parser.next();
        parser
    }

    /// Advances to the next significant token, accumulating prefix tokens.
    fn next(&mut self) {
        if let Some(look) = self.look.take() {
            // Consume stored lookahead state.
            self.state = look;
            return;
        }

        let (off, kind, bytes) = self.lexer.scan();
        self.state.off = off;
        self.state.kind = kind;
        self.state.bytes = EcoVec::from(bytes);
        self.state.prefix = Vec::new();
        while self.state.kind.is_prefix() {
            self.state.prefix.push(Prefix {
                kind: self.state.kind,
                bytes: std::mem::take(&mut self.state.bytes),
            });
            let (off, kind, bytes) = self.lexer.scan();
            self.state.off = off;
            self.state.kind = kind;
            self.state.bytes = EcoVec::from(bytes);
        }
    }

    /// Peeks at the next significant token without consuming the current
    /// state. The peeked state is stored and consumed by the next call to
    /// [`Parser::next`].
    fn lookahead(&mut self) {
        let prev = self.state.clone();
        self.next();
        self.look = Some(std::mem::replace(&mut self.state, prev));
    }

    /// Returns whether the lookahead slot holds a token of the given kind.
    fn lookahead_is(&self, kind: TokenKind) -> bool {
        self.look.as_ref().is_some_and(|look| look.kind == kind)
    }

    /// The kind of the current token.
    fn kind(&self) -> TokenKind {
        self.state.kind
    }

    /// Builds an error at the given offset.
    fn error<T>(&self, off: usize, kind: SyntaxErrorKind) -> Result<T, SyntaxError> {
        Err(SyntaxError::new(self.file.position(off), kind))
    }

    /// Asserts that the current token is of the given kind.
    fn expect(&self, kind: TokenKind) -> Result<(), SyntaxError> {
        if self.state.kind == kind {
            Ok(())
        } else {
            self.error(self.state.off, SyntaxErrorKind::TokenExpected(kind))
        }
    }

    /// Creates a token node from the current state.
    fn token(&self) -> Token {
        Token {
            kind: self.state.kind,
            prefix: self.state.prefix.clone(),
            offset: self.state.off,
            bytes: self.state.bytes.clone(),
        }
    }

    /// Creates a token node from the current state, then advances.
    fn token_next(&mut self) -> Token {
        let token = self.token();
        self.next();
        token
    }

    /// Asserts the current token kind, creates its node, then advances.
    fn expect_token(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        self.expect(kind)?;
        Ok(self.token_next())
    }

    /// Returns whether the current token ends a block.
    fn is_block_follow(&self) -> bool {
        matches!(
            self.state.kind,
            TokenKind::Eof
                | TokenKind::Else
                | TokenKind::ElseIf
                | TokenKind::Until
                | TokenKind::End
        )
    }

    /// Parses the whole source into a file node.
    fn parse_file(&mut self) -> Result<File, SyntaxError> {
        let body = self.parse_block()?;
        self.expect(TokenKind::Eof)?;
        Ok(File {
            info: Arc::clone(&self.file),
            body,
            eof_token: self.token_next(),
        })
    }
}

/// Parses the source code of a single Lua file.
///
/// `filename` is used only when recording positional information. Returns
/// the parsed tree and the first error encountered, if any. When the parse
/// aborted, the returned tree is a file node with an empty body; when only
/// lexical errors occurred, the tree is complete and covers the whole
/// source with best-effort tokens.
#[must_use]
pub fn parse(filename: &str, source: &[u8]) -> (File, Option<SyntaxError>) {
    let info = Arc::new(SourceFile::new(filename));
    let mut parser = Parser::new(Arc::clone(&info), source);
    match parser.parse_file() {
        Ok(file) => (file, parser.lexer.into_first_error()),
        Err(err) => {
            let first = parser.lexer.into_first_error().unwrap_or(err);
            let file = File {
                info,
                body: Block::default(),
                eof_token: Token::invalid(),
            };
            (file, Some(first))
        }
    }
}

/// Reads and parses the Lua file at `path`.
///
/// I/O failures surface as [`std::io::Error`]; syntax errors are returned
/// the same way as from [`parse`].
///
/// # Errors
///
/// Returns an error when the file cannot be read.
pub fn parse_file(path: &Utf8Path) -> std::io::Result<(File, Option<SyntaxError>)> {
    let source = std::fs::read(path)?;
    Ok(parse(path.as_str(), &source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Stmt};

    fn parse_ok(src: &[u8]) -> File {
        let (file, err) = parse("test.lua", src);
        assert!(err.is_none(), "unexpected error: {err:?}");
        file
    }

    fn parse_err(src: &[u8]) -> SyntaxError {
        let (_, err) = parse("test.lua", src);
        err.expect("expected a parse error")
    }

    #[test]
    fn parses_empty_source() {
        let file = parse_ok(b"");
        assert!(file.body.items.is_empty());
        assert_eq!(file.eof_token.kind, TokenKind::Eof);
        assert!(file.is_valid());
    }

    #[test]
    fn attaches_prefix_to_following_token() {
        let file = parse_ok(b"-- a\nlocal x = 1\n");
        let Stmt::LocalVar(stmt) = &file.body.items[0] else {
            panic!("expected local statement");
        };
        assert_eq!(stmt.local_token.prefix.len(), 2);
        assert_eq!(stmt.local_token.prefix[0].kind, TokenKind::Comment);
        assert_eq!(stmt.local_token.prefix[0].bytes.as_slice(), b"-- a");
        assert_eq!(stmt.local_token.prefix[1].kind, TokenKind::Space);
        assert_eq!(stmt.names.items[0].bytes.as_slice(), b"x");
        let values = stmt.values.as_ref().expect("values");
        assert!(matches!(values.items[0], Expr::Number(_)));
    }

    #[test]
    fn eof_token_owns_trailing_trivia() {
        let file = parse_ok(b"break -- trailing\n");
        assert_eq!(file.eof_token.kind, TokenKind::Eof);
        assert_eq!(file.eof_token.prefix.len(), 3);
        assert_eq!(file.eof_token.prefix[1].kind, TokenKind::Comment);
    }

    #[test]
    fn semicolon_separators_are_recorded() {
        let file = parse_ok(b"break; ");
        assert_eq!(file.body.seps[0].kind, TokenKind::Semicolon);

        let file = parse_ok(b"break ");
        assert_eq!(file.body.seps[0].kind, TokenKind::Invalid);
    }

    #[test]
    fn reports_missing_end() {
        let err = parse_err(b"do x = 1");
        assert_eq!(err.kind, SyntaxErrorKind::TokenExpected(TokenKind::End));
    }

    #[test]
    fn reports_trailing_garbage() {
        let err = parse_err(b"x = 1 end");
        assert_eq!(err.kind, SyntaxErrorKind::TokenExpected(TokenKind::Eof));
    }

    #[test]
    fn error_positions_are_one_based() {
        let err = parse_err(b"x = \n]");
        assert_eq!(err.position.line, 2);
        assert_eq!(err.position.column, 1);
        assert_eq!(err.position.filename, "test.lua");
    }

    #[test]
    fn lexical_error_wins_over_later_parse_error() {
        // The unterminated string is scanned before the parser trips over
        // the following `end`.
        let (_, err) = parse("test.lua", b"x = 'abc\nend");
        let err = err.expect("expected an error");
        assert_eq!(err.kind, SyntaxErrorKind::UnfinishedStringEol);
    }

    #[test]
    fn aborted_parse_returns_empty_file() {
        let (file, err) = parse("test.lua", b"local = 1");
        assert!(err.is_some());
        assert!(file.body.items.is_empty());
        assert_eq!(file.eof_token.kind, TokenKind::Invalid);
        assert_eq!(file.info.name(), "test.lua");
    }
}
