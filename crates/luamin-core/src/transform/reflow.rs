// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Offset reflow: recompute token offsets and the line table.
//!
//! Walks the tree with a running byte counter in lexical order, advancing
//! over each valid token's prefix and content bytes and rewriting the
//! token's offset. For a file node the shared line table is rebuilt along
//! the way: it is cleared first, and the byte index after every `\n`
//! encountered is recorded, so position lookups stay consistent with the
//! current bytes.

use crate::ast::{Block, Expr, File, Stmt, Token};
use crate::ast_walker::{block_tokens_mut, expr_tokens_mut, stmt_tokens_mut, walk_tokens_mut};
use crate::source_analysis::SourceFile;

fn scan_newlines(info: &SourceFile, base: usize, bytes: &[u8]) {
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            info.add_line(base + i + 1);
        }
    }
}

fn reflow_token(info: Option<&SourceFile>, off: &mut usize, tok: &mut Token) {
    if !tok.kind.is_valid() {
        return;
    }
    for prefix in &tok.prefix {
        if !prefix.kind.is_valid() {
            continue;
        }
        if let Some(info) = info {
            scan_newlines(info, *off, &prefix.bytes);
        }
        *off += prefix.bytes.len();
    }
    if let Some(info) = info {
        scan_newlines(info, *off, &tok.bytes);
    }
    tok.offset = *off;
    *off += tok.bytes.len();
}

/// Rewrites the offset of every token in the file so that it is correct
/// for the tokens' current bytes, starting at `offset`. The file's line
/// table is cleared and rebuilt.
pub fn fix_token_offsets(file: &mut File, offset: usize) {
    let info = std::sync::Arc::clone(&file.info);
    info.clear_lines();
    let mut off = offset;
    walk_tokens_mut(file, &mut |tok| reflow_token(Some(&info), &mut off, tok));
}

/// Rewrites token offsets within a block, starting at `offset`. Returns
/// the offset following the block. Line tables belong to file nodes and
/// are not touched.
pub fn fix_block_offsets(block: &mut Block, offset: usize) -> usize {
    let mut off = offset;
    block_tokens_mut(block, &mut |tok| reflow_token(None, &mut off, tok));
    off
}

/// Rewrites token offsets within a statement, starting at `offset`.
/// Returns the offset following the statement.
pub fn fix_stmt_offsets(stmt: &mut Stmt, offset: usize) -> usize {
    let mut off = offset;
    stmt_tokens_mut(stmt, &mut |tok| reflow_token(None, &mut off, tok));
    off
}

/// Rewrites token offsets within an expression, starting at `offset`.
/// Returns the offset following the expression.
pub fn fix_expr_offsets(expr: &mut Expr, offset: usize) -> usize {
    let mut off = offset;
    expr_tokens_mut(expr, &mut |tok| reflow_token(None, &mut off, tok));
    off
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast_walker::walk_tokens_mut;
    use crate::source_analysis::parse;
    use ecow::EcoVec;

    #[test]
    fn offsets_match_emitted_positions_after_mutation() {
        let src = b"local alpha = 1\nprint(alpha)\n";
        let (mut file, err) = parse("reflow.lua", src);
        assert!(err.is_none());

        // Rename `alpha` to `a` everywhere, invalidating all offsets.
        walk_tokens_mut(&mut file, &mut |tok| {
            if tok.bytes.as_slice() == b"alpha" {
                tok.bytes = EcoVec::from(&b"a"[..]);
            }
        });
        fix_token_offsets(&mut file, 0);

        let emitted = file.to_bytes();
        assert_eq!(emitted, b"local a = 1\nprint(a)\n");

        // Every token's offset equals the number of bytes emitted before it.
        let mut expected = 0usize;
        walk_tokens_mut(&mut file, &mut |tok| {
            if !tok.kind.is_valid() {
                return;
            }
            for prefix in &tok.prefix {
                expected += prefix.bytes.len();
            }
            assert_eq!(tok.offset, expected);
            expected += tok.bytes.len();
        });
        assert_eq!(expected, emitted.len());
    }

    #[test]
    fn line_table_is_rebuilt() {
        let src = b"x = 1\ny = 2\nz = 3\n";
        let (mut file, err) = parse("lines.lua", src);
        assert!(err.is_none());
        fix_token_offsets(&mut file, 0);

        assert_eq!(file.info.line_count(), 4);
        assert_eq!(file.info.position(0).line, 1);
        assert_eq!(file.info.position(6).line, 2);
        assert_eq!(file.info.position(12).line, 3);
        // Column of `z`'s `=` sign.
        let pos = file.info.position(14);
        assert_eq!((pos.line, pos.column), (3, 3));
    }

    #[test]
    fn line_table_counts_newlines_in_long_strings() {
        let src = b"x = [[a\nb\nc]]\ny = 2\n";
        let (mut file, err) = parse("long.lua", src);
        assert!(err.is_none());
        fix_token_offsets(&mut file, 0);
        // Newlines inside the long string token are line starts too.
        assert_eq!(file.info.line_count(), 5);
        assert_eq!(file.info.position(14).line, 4);
    }

    #[test]
    fn node_level_reflow_returns_final_offset() {
        let (file, err) = parse("node.lua", b"return 1 + 2");
        assert!(err.is_none());
        let mut stmt = file.body.items.into_iter().next().expect("statement");
        let end = fix_stmt_offsets(&mut stmt, 100);
        assert_eq!(end, 100 + b"return 1 + 2".len());
        assert_eq!(stmt.first_token().offset, 100);
    }
}
