// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Adjoin fixing: insert the minimum separators between adjacent tokens.
//!
//! After trivia has been stripped or tokens rewritten, two neighboring
//! tokens may re-lex as one (`return` + `5` → the name `return5`;
//! `..` + `.5` → `...` followed by `5`). This pass walks the token stream —
//! treating each prefix as a token of its own — and, wherever the pair of
//! kinds requires it, prepends a separator character to an existing space
//! prefix or inserts a synthetic one-byte space prefix.
//!
//! The kind-level requirements come from [`TokenKind::adjoin_separator`];
//! the two content-dependent pairs are resolved here against the bytes of
//! the right token.

use ecow::EcoVec;

use crate::ast::{File, Prefix, Token};
use crate::ast_walker::walk_tokens_mut;
use crate::source_analysis::{AdjoinSep, TokenKind};

/// Returns the separator byte that allows a token of kind `left` to
/// precede a token of kind `right` with the given bytes, or `None` when
/// the two may be adjacent.
///
/// The content-dependent pairs resolve as follows: after `..`, a number
/// needs a separator exactly when it begins with `.` (the bytes would
/// otherwise re-lex starting with `...`); after a keyword, a number needs
/// a separator exactly when it does *not* begin with `.` (a digit would be
/// absorbed into the keyword, forming a name).
#[must_use]
pub fn adjoin_separator(left: TokenKind, right: TokenKind, right_bytes: &[u8]) -> Option<u8> {
    match left.adjoin_separator(right) {
        AdjoinSep::Ok => None,
        AdjoinSep::Space => Some(b' '),
        AdjoinSep::Newline => Some(b'\n'),
        AdjoinSep::Cond => {
            let starts_with_dot = right_bytes.first() == Some(&b'.');
            let required = if left == TokenKind::Concat {
                starts_with_dot
            } else {
                !starts_with_dot
            };
            required.then_some(b' ')
        }
    }
}

fn space_prefix(c: u8) -> Prefix {
    let mut bytes = EcoVec::with_capacity(1);
    bytes.push(c);
    Prefix {
        kind: TokenKind::Space,
        bytes,
    }
}

/// Fixes one token against the previous one, walking its prefixes as
/// though they were tokens.
fn fix_token(prev: &mut Option<TokenKind>, tok: &mut Token) {
    if !tok.kind.is_valid() {
        return;
    }
    let Some(mut left) = *prev else {
        *prev = Some(tok.kind);
        return;
    };

    let mut i = 0;
    while i < tok.prefix.len() {
        if let Some(c) = adjoin_separator(left, tok.prefix[i].kind, &tok.prefix[i].bytes) {
            if tok.prefix[i].kind == TokenKind::Space {
                // Prepend directly to the existing space bytes.
                let mut bytes = EcoVec::with_capacity(tok.prefix[i].bytes.len() + 1);
                bytes.push(c);
                bytes.extend_from_slice(&tok.prefix[i].bytes);
                tok.prefix[i].bytes = bytes;
            } else {
                // Insert a synthetic space before the prefix.
                tok.prefix.insert(i, space_prefix(c));
                i += 1;
            }
        }
        left = tok.prefix[i].kind;
        i += 1;
    }

    // The token itself, which follows either its last prefix or the
    // previous token.
    if let Some(c) = adjoin_separator(left, tok.kind, &tok.bytes) {
        match tok.prefix.last_mut() {
            Some(last) if last.kind == TokenKind::Space => last.bytes.push(c),
            _ => tok.prefix.push(space_prefix(c)),
        }
    }

    *prev = Some(tok.kind);
}

/// Walks the tree and ensures that adjacent tokens have the minimum
/// spacing required to re-lex to the same token sequence.
pub fn fix_adjoined_tokens(file: &mut File) {
    let mut prev: Option<TokenKind> = None;
    walk_tokens_mut(file, &mut |tok| fix_token(&mut prev, tok));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::parse;

    /// Parses, strips all trivia, fixes adjacency, and emits.
    fn strip_and_fix(src: &[u8]) -> Vec<u8> {
        let (mut file, err) = parse("adjoin.lua", src);
        assert!(err.is_none(), "parse error in {:?}: {err:?}", src);
        walk_tokens_mut(&mut file, &mut |tok| tok.prefix.clear());
        fix_adjoined_tokens(&mut file);
        file.to_bytes()
    }

    #[test]
    fn keyword_before_number() {
        assert_eq!(strip_and_fix(b"return 5"), b"return 5");
        // A number starting with `.` may adjoin a keyword.
        assert_eq!(strip_and_fix(b"return .5"), b"return.5");
        assert_eq!(strip_and_fix(b"return 0x1F"), b"return 0x1F");
    }

    #[test]
    fn concat_before_number() {
        assert_eq!(strip_and_fix(b"x = a .. .5"), b"x=a.. .5");
        assert_eq!(strip_and_fix(b"x = a .. 5"), b"x=a..5");
        assert_eq!(strip_and_fix(b"x = a .. b"), b"x=a..b");
    }

    #[test]
    fn names_keywords_and_numbers_separate() {
        assert_eq!(strip_and_fix(b"local x = 1"), b"local x=1");
        assert_eq!(
            strip_and_fix(b"for i = 1, 2 do end"),
            b"for i=1,2 do end"
        );
        assert_eq!(strip_and_fix(b"x = 1 + 2"), b"x=1+2");
        assert_eq!(strip_and_fix(b"x = a and b or c"), b"x=a and b or c");
        assert_eq!(strip_and_fix(b"x = not not x"), b"x=not not x");
    }

    #[test]
    fn unary_minus_chains_keep_space() {
        // `--` would start a comment.
        assert_eq!(strip_and_fix(b"x = - - y"), b"x=- -y");
        assert_eq!(strip_and_fix(b"x = a - -y"), b"x=a- -y");
    }

    #[test]
    fn bracket_before_long_string() {
        // `[[` would open a long string.
        assert_eq!(strip_and_fix(b"x = t[ [[s]] ]"), b"x=t[ [[s]]]");
    }

    #[test]
    fn number_before_dot_chain() {
        assert_eq!(strip_and_fix(b"x = 1 .. 2"), b"x=1 ..2");
    }

    #[test]
    fn comments_force_newline() {
        let (mut file, err) = parse("comment.lua", b"x = 1 -- c\ny = 2\n");
        assert!(err.is_none());
        // Drop the spaces but keep the comment; the fixer must restore a
        // newline so `y` is not absorbed into the comment.
        walk_tokens_mut(&mut file, &mut |tok| {
            tok.prefix.retain(|p| p.kind != TokenKind::Space);
        });
        fix_adjoined_tokens(&mut file);
        let out = file.to_bytes();
        assert_eq!(out, b"x=1-- c\ny=2");

        // The output re-lexes to the same statement count.
        let (reparsed, err) = parse("comment2.lua", &out);
        assert!(err.is_none());
        assert_eq!(reparsed.body.items.len(), 2);
    }

    #[test]
    fn fixed_output_reparses_to_same_token_stream() {
        let sources: &[&[u8]] = &[
            b"local x, y = 1, .5\nreturn x .. .5 .. y",
            b"x = - -1 - - -2",
            b"if a then return .5 end",
            b"x = t[ [[s]] ] .. 'q'",
            b"for i = 1, 10 do x = x .. i end",
        ];
        for src in sources {
            let out = strip_and_fix(src);
            let (orig, _) = parse("a.lua", src);
            let (fixed, err) = parse("b.lua", &out);
            assert!(err.is_none(), "reparse of {:?} failed: {err:?}", out);

            let mut orig_stream = Vec::new();
            let mut orig_file = orig;
            walk_tokens_mut(&mut orig_file, &mut |tok| {
                if tok.kind.is_valid() {
                    orig_stream.push((tok.kind, tok.bytes.clone()));
                }
            });
            let mut fixed_stream = Vec::new();
            let mut fixed_file = fixed;
            walk_tokens_mut(&mut fixed_file, &mut |tok| {
                if tok.kind.is_valid() {
                    fixed_stream.push((tok.kind, tok.bytes.clone()));
                }
            });
            assert_eq!(orig_stream, fixed_stream, "token stream changed for {src:?}");
        }
    }

    #[test]
    fn no_bytes_inserted_for_compatible_pairs() {
        assert_eq!(strip_and_fix(b"z = f ( x ) [ 1 ] . y"), b"z=f(x)[1].y");
        assert_eq!(strip_and_fix(b"x = { 1 , 2 ; 3 }"), b"x={1,2;3}");
    }
}
