// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source file descriptor and position lookup.
//!
//! A [`SourceFile`] records the name of a Lua source and the byte offsets at
//! which its lines begin. The scanner and the reflow pass feed the line
//! table; position lookups ([`SourceFile::position`]) binary-search it.
//!
//! The line table always satisfies: non-empty, first entry `0`, every later
//! entry is the byte index immediately after a `\n`, strictly increasing.
//!
//! Lookups may run concurrently with mutation (a language tool resolving
//! positions while another parse reuses the descriptor), so the table lives
//! behind a mutex.

use std::fmt;
use std::sync::Mutex;

use ecow::EcoString;

/// A position within a file: offset, line and column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    /// The name of the file, if specified.
    pub filename: EcoString,
    /// The byte offset within the file, starting at 0.
    pub offset: usize,
    /// The line number, starting at 1. Zero when unknown.
    pub line: usize,
    /// The column number, starting at 1. Zero when unknown.
    pub column: usize,
}

impl Position {
    /// Returns whether the position carries valid line information.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    /// Formats the position as one of several forms:
    ///
    /// ```text
    /// file:line:column    Filename with valid position.
    /// line:column         No filename with valid position.
    /// file                Filename with invalid position.
    /// -                   No filename with invalid position.
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.filename.is_empty(), self.is_valid()) {
            (false, true) => write!(f, "{}:{}:{}", self.filename, self.line, self.column),
            (true, true) => write!(f, "{}:{}", self.line, self.column),
            (false, false) => f.write_str(&self.filename),
            (true, false) => f.write_str("-"),
        }
    }
}

/// A Lua source file descriptor. Methods are safe to use concurrently.
#[derive(Debug)]
pub struct SourceFile {
    name: EcoString,
    lines: Mutex<Vec<usize>>,
}

impl SourceFile {
    /// Creates a new descriptor with the given name.
    #[must_use]
    pub fn new(filename: impl Into<EcoString>) -> Self {
        Self {
            name: filename.into(),
            lines: Mutex::new(vec![0]),
        }
    }

    /// Returns the name of the file.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of lines in the file.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.lock().expect("line table poisoned").len()
    }

    /// Records the byte offset of the start of a line.
    ///
    /// Offsets must be added in increasing order; an offset not greater than
    /// the last recorded one is ignored, which makes the call idempotent.
    pub fn add_line(&self, offset: usize) {
        let mut lines = self.lines.lock().expect("line table poisoned");
        if lines.last().is_none_or(|&last| last < offset) {
            lines.push(offset);
        }
    }

    /// Resets the line table to a single line starting at offset 0.
    pub fn clear_lines(&self) {
        let mut lines = self.lines.lock().expect("line table poisoned");
        lines.clear();
        lines.push(0);
    }

    /// Rebuilds the line table by scanning the given content.
    pub fn set_lines_for_content(&self, content: &[u8]) {
        let mut new_lines = vec![0];
        for (offset, &b) in content.iter().enumerate() {
            if b == b'\n' {
                new_lines.push(offset + 1);
            }
        }
        *self.lines.lock().expect("line table poisoned") = new_lines;
    }

    /// Returns the [`Position`] for a byte offset within the file.
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let lines = self.lines.lock().expect("line table poisoned");
        // Index of the last line start at or before the offset.
        let index = lines.partition_point(|&start| start <= offset);
        let mut pos = Position {
            filename: self.name.clone(),
            offset,
            ..Position::default()
        };
        if index > 0 {
            pos.line = index;
            pos.column = offset - lines[index - 1] + 1;
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_file_starts_with_line_zero() {
        let file = SourceFile::new("test.lua");
        assert_eq!(file.name(), "test.lua");
        assert_eq!(file.line_count(), 1);
        let pos = file.position(0);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn add_line_is_monotonic() {
        let file = SourceFile::new("test.lua");
        file.add_line(5);
        file.add_line(5);
        file.add_line(3);
        file.add_line(9);
        assert_eq!(file.line_count(), 3);
    }

    #[test]
    fn position_resolves_lines_and_columns() {
        let file = SourceFile::new("test.lua");
        // Content: "ab\ncd\ne"
        file.set_lines_for_content(b"ab\ncd\ne");
        assert_eq!(file.line_count(), 3);

        let pos = file.position(0);
        assert_eq!((pos.line, pos.column), (1, 1));
        let pos = file.position(2);
        assert_eq!((pos.line, pos.column), (1, 3));
        let pos = file.position(3);
        assert_eq!((pos.line, pos.column), (2, 1));
        let pos = file.position(6);
        assert_eq!((pos.line, pos.column), (3, 1));
    }

    #[test]
    fn set_lines_for_content_keeps_invariant_on_empty_input() {
        let file = SourceFile::new("test.lua");
        file.set_lines_for_content(b"");
        assert_eq!(file.line_count(), 1);
        assert_eq!(file.position(0).line, 1);
    }

    #[test]
    fn clear_lines_resets_to_line_zero() {
        let file = SourceFile::new("test.lua");
        file.set_lines_for_content(b"a\nb\nc");
        assert_eq!(file.line_count(), 3);
        file.clear_lines();
        assert_eq!(file.line_count(), 1);
        assert_eq!(file.position(4).line, 1);
    }

    #[test]
    fn position_display_forms() {
        let with_file = Position {
            filename: "f.lua".into(),
            offset: 3,
            line: 2,
            column: 4,
        };
        assert_eq!(with_file.to_string(), "f.lua:2:4");

        let no_file = Position {
            line: 2,
            column: 4,
            ..Position::default()
        };
        assert_eq!(no_file.to_string(), "2:4");

        let invalid = Position {
            filename: "f.lua".into(),
            ..Position::default()
        };
        assert_eq!(invalid.to_string(), "f.lua");

        assert_eq!(Position::default().to_string(), "-");
    }

    #[test]
    fn concurrent_position_lookups() {
        use std::sync::Arc;

        let file = Arc::new(SourceFile::new("test.lua"));
        file.set_lines_for_content(b"a\nb\nc\nd\n");
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let file = Arc::clone(&file);
                std::thread::spawn(move || {
                    for offset in 0..8 {
                        let pos = file.position(offset);
                        assert!(pos.line >= 1);
                        let _ = i;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
