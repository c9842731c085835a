// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Structured syntax errors with source positions.
//!
//! Both the scanner and the parser report [`SyntaxError`]s. The message
//! spellings follow a traditional Lua front-end (`'<name>' expected`,
//! `unfinished string (EOL)`, ...), so tools can surface them verbatim
//! together with the formatted position.

use std::fmt;

use miette::LabeledSpan;
use thiserror::Error;

use super::{Position, TokenKind};

/// The condition that produced a [`SyntaxError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    /// A specific token kind was required and something else was seen.
    #[error("'{0}' expected")]
    TokenExpected(TokenKind),

    /// A quoted string ran into the end of the file.
    #[error("unfinished string (EOF)")]
    UnfinishedStringEof,

    /// A quoted string ran into the end of the line.
    #[error("unfinished string (EOL)")]
    UnfinishedStringEol,

    /// A numeric escape evaluated to more than 255.
    #[error("escape sequence too large")]
    EscapeTooLarge,

    /// `[=` was not completed into a long-bracket opener.
    #[error("invalid long string delimiter")]
    InvalidLongStringDelimiter,

    /// A long string ran into the end of the file.
    #[error("unfinished long string near '<eof>'")]
    UnfinishedLongString,

    /// A long comment ran into the end of the file.
    #[error("unfinished long comment near '<eof>'")]
    UnfinishedLongComment,

    /// No lexical or syntactic rule matches the current input.
    #[error("unexpected symbol")]
    UnexpectedSymbol,

    /// After `for name`, neither `=` nor `,`/`in` followed.
    #[error("'=' or 'in' expected")]
    ForAssignOrInExpected,

    /// A call was not followed by arguments.
    #[error("function arguments expected")]
    FunctionArgsExpected,

    /// A method or call expression appeared on the left of an assignment.
    #[error("syntax error")]
    BadAssignTarget,
}

/// An error within a file, carrying the source position of the offending
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// The location of the error.
    pub position: Position,
    /// The condition of the error.
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    /// Creates a new error at the given position.
    #[must_use]
    pub fn new(position: Position, kind: SyntaxErrorKind) -> Self {
        Self { position, kind }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.position.filename.is_empty() && !self.position.is_valid() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.position, self.kind)
        }
    }
}

impl std::error::Error for SyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl miette::Diagnostic for SyntaxError {
    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::at_offset(
            self.position.offset,
            "here",
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_when_known() {
        let err = SyntaxError::new(
            Position {
                filename: "f.lua".into(),
                offset: 4,
                line: 1,
                column: 5,
            },
            SyntaxErrorKind::TokenExpected(TokenKind::End),
        );
        assert_eq!(err.to_string(), "f.lua:1:5: 'end' expected");
    }

    #[test]
    fn display_omits_unknown_position() {
        let err = SyntaxError::new(Position::default(), SyntaxErrorKind::UnfinishedStringEof);
        assert_eq!(err.to_string(), "unfinished string (EOF)");
    }

    #[test]
    fn message_spellings() {
        assert_eq!(
            SyntaxErrorKind::TokenExpected(TokenKind::Name).to_string(),
            "'<name>' expected"
        );
        assert_eq!(
            SyntaxErrorKind::ForAssignOrInExpected.to_string(),
            "'=' or 'in' expected"
        );
        assert_eq!(
            SyntaxErrorKind::UnfinishedLongComment.to_string(),
            "unfinished long comment near '<eof>'"
        );
    }
}
