// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Lua 5.1 source text.
//!
//! The [`Lexer`] is a pull scanner over a byte buffer: the parser calls
//! [`Lexer::scan`] repeatedly until it yields [`TokenKind::Eof`]. Every call
//! returns the token's byte offset, its kind, and the exact source bytes it
//! covers — including malformed numbers and unterminated strings, which are
//! still captured as single tokens so downstream passes can keep working.
//!
//! # Error Recovery
//!
//! Lexical errors are recorded rather than returned: the first error fills a
//! one-shot slot (see [`Lexer::first_error`]) and a counter tracks the rest.
//! Scanning continues whenever forward progress is possible.
//!
//! # Line Tracking
//!
//! Each time the scanner crosses a newline it reports the offset of the
//! following byte to the shared [`SourceFile`], keeping the line table in
//! source order.

use std::sync::Arc;

use super::{SourceFile, SyntaxError, SyntaxErrorKind, TokenKind};

const fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

const fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

/// A scanner over Lua source bytes.
///
/// Holds a byte cursor, the current character, and the offset of the current
/// line. Construct with [`Lexer::new`] and drive with [`Lexer::scan`].
pub struct Lexer<'src> {
    file: Arc<SourceFile>,
    src: &'src [u8],

    /// Current character; `None` at end of input.
    ch: Option<u8>,
    /// Offset of the current character.
    offset: usize,
    /// Offset of the next character to read.
    rd_offset: usize,
    /// Offset of the start of the current line.
    line_offset: usize,

    first_error: Option<SyntaxError>,
    error_count: usize,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("offset", &self.offset)
            .field("error_count", &self.error_count)
            .finish_non_exhaustive()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a scanner over `src`, reporting line starts into `file`.
    #[must_use]
    pub fn new(file: Arc<SourceFile>, src: &'src [u8]) -> Self {
        let mut lexer = Self {
            file,
            src,
            ch: Some(b' '),
            offset: 0,
            rd_offset: 0,
            line_offset: 0,
            first_error: None,
            error_count: 0,
        };
        lexer.next();
        lexer
    }

    /// Returns the number of errors encountered so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Returns the offset at which the current line starts.
    #[must_use]
    pub fn line_offset(&self) -> usize {
        self.line_offset
    }

    /// Returns the first error encountered, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&SyntaxError> {
        self.first_error.as_ref()
    }

    /// Consumes the scanner, returning the first error encountered.
    #[must_use]
    pub fn into_first_error(self) -> Option<SyntaxError> {
        self.first_error
    }

    /// Advances to the next character, tracking any newline crossed.
    fn next(&mut self) {
        if self.rd_offset < self.src.len() {
            self.offset = self.rd_offset;
            if self.ch == Some(b'\n') {
                self.line_offset = self.offset;
                self.file.add_line(self.offset);
            }
            self.ch = Some(self.src[self.rd_offset]);
            self.rd_offset += 1;
        } else {
            self.offset = self.src.len();
            if self.ch == Some(b'\n') {
                self.line_offset = self.offset;
                self.file.add_line(self.offset);
            }
            self.ch = None;
        }
    }

    /// Records an error at the given offset; the first one wins.
    fn error(&mut self, offset: usize, kind: SyntaxErrorKind) {
        if self.first_error.is_none() {
            self.first_error = Some(SyntaxError::new(self.file.position(offset), kind));
        }
        self.error_count += 1;
    }

    /// Consumes a maximal run of space characters.
    fn scan_space(&mut self) {
        while self.ch.is_some_and(is_space) {
            self.next();
        }
    }

    /// Consumes a name of the form `[A-Za-z_][0-9A-Za-z_]*` and returns its
    /// bytes. Also used to capture trailing alphanumeric runs of malformed
    /// numbers.
    fn scan_name(&mut self) -> &'src [u8] {
        let off = self.offset;
        while self
            .ch
            .is_some_and(|c| is_letter(c) || c.is_ascii_digit())
        {
            self.next();
        }
        &self.src[off..self.offset]
    }

    /// Consumes a number. The captured bytes may not evaluate to a valid
    /// number; trailing alphanumerics are swallowed so that a malformed
    /// literal still forms one token.
    fn scan_number(&mut self) -> TokenKind {
        let off = self.offset;
        while self.ch.is_some_and(|c| c.is_ascii_digit() || c == b'.') {
            self.next();
        }
        if matches!(self.ch, Some(b'e' | b'E')) {
            self.next();
            if matches!(self.ch, Some(b'+' | b'-')) {
                self.next();
            }
        }
        self.scan_name();
        if self.src[off..self.offset].starts_with(b"0x") {
            TokenKind::NumberHex
        } else {
            TokenKind::NumberFloat
        }
    }

    /// Consumes a quoted string, including its delimiters.
    fn scan_string(&mut self, off: usize) {
        let quote = self.ch;
        self.next();
        loop {
            match self.ch {
                c if c == quote => {
                    self.next();
                    return;
                }
                None => {
                    self.error(off, SyntaxErrorKind::UnfinishedStringEof);
                    return;
                }
                Some(b'\n' | b'\r') => {
                    self.error(off, SyntaxErrorKind::UnfinishedStringEol);
                    return;
                }
                Some(b'\\') => {
                    self.next();
                    match self.ch {
                        Some(c @ (b'\n' | b'\r')) => {
                            // Escaped newline; a two-character mixed newline
                            // counts as one.
                            self.next();
                            if matches!(self.ch, Some(b'\n' | b'\r')) && self.ch != Some(c) {
                                self.next();
                            }
                        }
                        Some(c) if c.is_ascii_digit() => {
                            // Numeric escape of up to three digits.
                            let mut value = u32::from(c - b'0');
                            self.next();
                            let mut digits = 1;
                            while digits < 3 {
                                let Some(d) = self.ch.filter(u8::is_ascii_digit) else {
                                    break;
                                };
                                value = value * 10 + u32::from(d - b'0');
                                self.next();
                                digits += 1;
                            }
                            if value > 255 {
                                self.error(off, SyntaxErrorKind::EscapeTooLarge);
                            }
                        }
                        None => {}
                        Some(_) => {
                            // Known escapes (a b f n r t v) and any other
                            // escaped character, including the quote.
                            self.next();
                        }
                    }
                }
                Some(_) => {
                    self.next();
                }
            }
        }
    }

    /// Consumes a long bracket body. The opening `[` has been consumed; the
    /// current character is the first `=` or the second `[`.
    fn scan_long_string(&mut self, off: usize, kind: TokenKind) {
        let mut eq = 0;
        while self.ch == Some(b'=') {
            eq += 1;
            self.next();
        }
        if self.ch != Some(b'[') {
            self.error(off, SyntaxErrorKind::InvalidLongStringDelimiter);
            return;
        }
        self.next();
        'scan: loop {
            match self.ch {
                None => {
                    let kind = if kind == TokenKind::LongComment {
                        SyntaxErrorKind::UnfinishedLongComment
                    } else {
                        SyntaxErrorKind::UnfinishedLongString
                    };
                    self.error(off, kind);
                    return;
                }
                Some(b']') => {
                    self.next();
                    for _ in 0..eq {
                        if self.ch != Some(b'=') {
                            continue 'scan;
                        }
                        self.next();
                    }
                    if self.ch == Some(b']') {
                        self.next();
                        return;
                    }
                }
                Some(_) => {
                    self.next();
                }
            }
        }
    }

    /// Returns whether the bytes from the current `[` form a long-bracket
    /// opener `[=*[`.
    fn long_bracket_follows(&self) -> bool {
        if self.ch != Some(b'[') {
            return false;
        }
        let mut i = self.rd_offset;
        while self.src.get(i) == Some(&b'=') {
            i += 1;
        }
        self.src.get(i) == Some(&b'[')
    }

    /// Consumes a short or long comment. The first `-` has been consumed;
    /// the current character is the second.
    fn scan_comment(&mut self, off: usize) -> TokenKind {
        self.next();
        if self.long_bracket_follows() {
            self.next();
            self.scan_long_string(off, TokenKind::LongComment);
            return TokenKind::LongComment;
        }
        while !matches!(self.ch, None | Some(b'\n')) {
            self.next();
        }
        TokenKind::Comment
    }

    /// Scans the next token, returning its offset, kind, and bytes. The end
    /// of the source is indicated by [`TokenKind::Eof`].
    ///
    /// Line information is added to the [`SourceFile`] given to
    /// [`Lexer::new`] as a side effect.
    pub fn scan(&mut self) -> (usize, TokenKind, &'src [u8]) {
        let off = self.offset;
        let kind = match self.ch {
            None => TokenKind::Eof,
            Some(c) if is_space(c) => {
                self.scan_space();
                TokenKind::Space
            }
            Some(c) if is_letter(c) => TokenKind::lookup(self.scan_name()),
            Some(c) if c.is_ascii_digit() => self.scan_number(),
            Some(b'"' | b'\'') => {
                self.scan_string(off);
                TokenKind::String
            }
            Some(c) => {
                self.next();
                match c {
                    b'-' => {
                        if self.ch == Some(b'-') {
                            self.scan_comment(off)
                        } else {
                            TokenKind::Sub
                        }
                    }
                    b'+' => TokenKind::Add,
                    b'*' => TokenKind::Mul,
                    b'/' => TokenKind::Div,
                    b'%' => TokenKind::Mod,
                    b'^' => TokenKind::Exp,
                    b'.' => {
                        if self.ch.is_some_and(|c| c.is_ascii_digit()) {
                            self.scan_number()
                        } else if self.ch == Some(b'.') {
                            self.next();
                            if self.ch == Some(b'.') {
                                self.next();
                                TokenKind::Vararg
                            } else {
                                TokenKind::Concat
                            }
                        } else {
                            TokenKind::Dot
                        }
                    }
                    b'<' => {
                        if self.ch == Some(b'=') {
                            self.next();
                            TokenKind::Leq
                        } else {
                            TokenKind::Lt
                        }
                    }
                    b'>' => {
                        if self.ch == Some(b'=') {
                            self.next();
                            TokenKind::Geq
                        } else {
                            TokenKind::Gt
                        }
                    }
                    b'=' => {
                        if self.ch == Some(b'=') {
                            self.next();
                            TokenKind::Eq
                        } else {
                            TokenKind::Assign
                        }
                    }
                    b'~' => {
                        if self.ch == Some(b'=') {
                            self.next();
                            TokenKind::Neq
                        } else {
                            self.error(self.offset, SyntaxErrorKind::UnexpectedSymbol);
                            TokenKind::Invalid
                        }
                    }
                    b';' => TokenKind::Semicolon,
                    b',' => TokenKind::Comma,
                    b':' => TokenKind::Colon,
                    b'[' => {
                        if matches!(self.ch, Some(b'[' | b'=')) {
                            self.scan_long_string(off, TokenKind::LongString);
                            TokenKind::LongString
                        } else {
                            TokenKind::LBrack
                        }
                    }
                    b']' => TokenKind::RBrack,
                    b'(' => TokenKind::LParen,
                    b')' => TokenKind::RParen,
                    b'{' => TokenKind::LBrace,
                    b'}' => TokenKind::RBrace,
                    b'#' => TokenKind::Length,
                    _ => TokenKind::Invalid,
                }
            }
        };
        (off, kind, &self.src[off..self.offset])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(src: &[u8]) -> (Vec<(usize, TokenKind, Vec<u8>)>, usize) {
        let file = Arc::new(SourceFile::new("test.lua"));
        let mut lexer = Lexer::new(file, src);
        let mut tokens = Vec::new();
        loop {
            let (off, kind, bytes) = lexer.scan();
            let done = kind == TokenKind::Eof;
            tokens.push((off, kind, bytes.to_vec()));
            if done {
                break;
            }
        }
        (tokens, lexer.error_count())
    }

    fn kinds(src: &[u8]) -> Vec<TokenKind> {
        scan_all(src).0.into_iter().map(|(_, k, _)| k).collect()
    }

    #[test]
    fn scans_names_and_keywords() {
        assert_eq!(
            kinds(b"local x"),
            vec![
                TokenKind::Local,
                TokenKind::Space,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds(b"_f00"),
            vec![TokenKind::Name, TokenKind::Eof]
        );
    }

    #[test]
    fn scans_numbers() {
        let (tokens, errors) = scan_all(b"1 3.14 .5 1e-3 0x1F 12abc");
        assert_eq!(errors, 0);
        let kinds: Vec<_> = tokens
            .iter()
            .filter(|(_, k, _)| *k != TokenKind::Space && *k != TokenKind::Eof)
            .map(|(_, k, b)| (*k, b.clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::NumberFloat, b"1".to_vec()),
                (TokenKind::NumberFloat, b"3.14".to_vec()),
                (TokenKind::NumberFloat, b".5".to_vec()),
                (TokenKind::NumberFloat, b"1e-3".to_vec()),
                (TokenKind::NumberHex, b"0x1F".to_vec()),
                (TokenKind::NumberFloat, b"12abc".to_vec()),
            ]
        );
    }

    #[test]
    fn scans_strings_with_escapes() {
        let (tokens, errors) = scan_all(br#""a\"b" 'c\n' "\65""#);
        assert_eq!(errors, 0);
        let strings: Vec<_> = tokens
            .iter()
            .filter(|(_, k, _)| *k == TokenKind::String)
            .map(|(_, _, b)| b.clone())
            .collect();
        assert_eq!(
            strings,
            vec![
                br#""a\"b""#.to_vec(),
                br"'c\n'".to_vec(),
                br#""\65""#.to_vec()
            ]
        );
    }

    #[test]
    fn unfinished_string_reports_error() {
        let file = Arc::new(SourceFile::new("test.lua"));
        let mut lexer = Lexer::new(file, b"\"abc\nx");
        let (_, kind, _) = lexer.scan();
        assert_eq!(kind, TokenKind::String);
        assert_eq!(lexer.error_count(), 1);
        assert_eq!(
            lexer.first_error().unwrap().kind,
            SyntaxErrorKind::UnfinishedStringEol
        );
    }

    #[test]
    fn numeric_escape_too_large_reports_error_and_continues() {
        let file = Arc::new(SourceFile::new("test.lua"));
        let mut lexer = Lexer::new(file, b"'\\300' x");
        let (_, kind, bytes) = lexer.scan();
        assert_eq!(kind, TokenKind::String);
        assert_eq!(bytes, b"'\\300'");
        assert_eq!(
            lexer.first_error().unwrap().kind,
            SyntaxErrorKind::EscapeTooLarge
        );
        // The scanner keeps going after the error.
        let (_, kind, _) = lexer.scan();
        assert_eq!(kind, TokenKind::Space);
        let (_, kind, bytes) = lexer.scan();
        assert_eq!(kind, TokenKind::Name);
        assert_eq!(bytes, b"x");
    }

    #[test]
    fn numeric_escape_of_three_digits_in_range_is_fine() {
        let (_, errors) = scan_all(b"'\\255\\0\\10'");
        assert_eq!(errors, 0);
    }

    #[test]
    fn scans_long_strings_with_nested_brackets() {
        let (tokens, errors) = scan_all(b"x = [==[ hello ]=] world ]==]");
        assert_eq!(errors, 0);
        let long: Vec<_> = tokens
            .iter()
            .filter(|(_, k, _)| *k == TokenKind::LongString)
            .map(|(_, _, b)| b.clone())
            .collect();
        assert_eq!(long, vec![b"[==[ hello ]=] world ]==]".to_vec()]);
    }

    #[test]
    fn unfinished_long_string_reports_eof_error() {
        let file = Arc::new(SourceFile::new("test.lua"));
        let mut lexer = Lexer::new(file, b"[[abc");
        let (_, kind, _) = lexer.scan();
        assert_eq!(kind, TokenKind::LongString);
        assert_eq!(
            lexer.first_error().unwrap().kind,
            SyntaxErrorKind::UnfinishedLongString
        );
    }

    #[test]
    fn scans_comments() {
        assert_eq!(
            kinds(b"-- line\nx"),
            vec![
                TokenKind::Comment,
                TokenKind::Space,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds(b"--[[ long\ncomment ]] y"),
            vec![
                TokenKind::LongComment,
                TokenKind::Space,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
        // `--[` not followed by a long bracket is a plain line comment.
        assert_eq!(
            kinds(b"--[ not long\nz"),
            vec![
                TokenKind::Comment,
                TokenKind::Space,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn disambiguates_dots() {
        assert_eq!(
            kinds(b". .. ..."),
            vec![
                TokenKind::Dot,
                TokenKind::Space,
                TokenKind::Concat,
                TokenKind::Space,
                TokenKind::Vararg,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn disambiguates_comparison_operators() {
        assert_eq!(
            kinds(b"< <= > >= = == ~="),
            vec![
                TokenKind::Lt,
                TokenKind::Space,
                TokenKind::Leq,
                TokenKind::Space,
                TokenKind::Gt,
                TokenKind::Space,
                TokenKind::Geq,
                TokenKind::Space,
                TokenKind::Assign,
                TokenKind::Space,
                TokenKind::Eq,
                TokenKind::Space,
                TokenKind::Neq,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lone_tilde_is_invalid() {
        let (tokens, errors) = scan_all(b"~");
        assert_eq!(errors, 1);
        assert_eq!(tokens[0].1, TokenKind::Invalid);
    }

    #[test]
    fn tracks_line_offsets() {
        let file = Arc::new(SourceFile::new("test.lua"));
        let mut lexer = Lexer::new(Arc::clone(&file), b"a\nbb\nccc");
        while lexer.scan().1 != TokenKind::Eof {}
        assert_eq!(file.line_count(), 3);
        assert_eq!(file.position(2).line, 2);
        assert_eq!(file.position(5).line, 3);
        assert_eq!(file.position(7).column, 3);
    }

    #[test]
    fn token_bytes_cover_source_exactly() {
        let src = b"local x = 1 -- c\nreturn x + 0x2\n";
        let (tokens, _) = scan_all(src);
        let mut rebuilt = Vec::new();
        for (off, _, bytes) in &tokens {
            assert_eq!(*off, rebuilt.len());
            rebuilt.extend_from_slice(bytes);
        }
        assert_eq!(rebuilt, src);
    }
}
