// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Identifier minification.
//!
//! [`minify`] rewrites a tree in place: every local variable is renamed to
//! the shortest identifier that avoids Lua keywords, globals, and other
//! locals with overlapping visibility; all trivia is stripped; then the
//! adjoin fixer reinserts mandatory separators and a reflow recomputes
//! offsets from byte 0.
//!
//! # Identifier enumeration
//!
//! Candidate names are enumerated by [`generate_ident`], a bijection from
//! indices to identifiers: the first character is drawn from the 53 name
//! starters (letters and `_`), subsequent characters from all 63 name
//! characters. Index 0 is `a`; the largest representable index,
//! `i32::MAX`, is six characters long. [`ident_index`] is the inverse, and
//! is what maps keywords and global names onto the indices they block.
//!
//! # Assignment
//!
//! Indices are assigned per declaring scope: keywords block their index in
//! every scope, globals block theirs everywhere they are visible (the
//! whole file), and each local takes the smallest index that is either
//! vacant in its declaring scope or held by a local whose visibility does
//! not overlap. Locals are processed by descending the scope-item lists
//! depth-first, parents before children, in the order the scope builder
//! recorded them — this fixes the assignment deterministically.

use std::collections::HashMap;

use ecow::EcoVec;

use crate::analyse::{build_file_scope, FileScope, ScopeId, ScopeItem, VarId, VariableKind};
use crate::ast::File;
use crate::ast_walker::walk_tokens_mut;
use crate::source_analysis::TokenKind;
use crate::transform::{fix_adjoined_tokens, fix_token_offsets};

/// Name characters: the 53 starters first, then the 10 digits.
const CHARS: &[u8; 63] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_0123456789";
const FIRST: u64 = 53;
const SECOND: u64 = 63;

/// The largest index [`generate_ident`] accepts; its identifier is six
/// characters long.
pub const MAX_IDENT_INDEX: u64 = i32::MAX as u64;

/// The length of the identifier for [`MAX_IDENT_INDEX`].
pub const MAX_IDENT_LENGTH: usize = 6;

/// Generates the identifier with the given index. Returns `None` above
/// [`MAX_IDENT_INDEX`].
#[must_use]
pub fn generate_ident(index: u64) -> Option<EcoVec<u8>> {
    if index > MAX_IDENT_INDEX {
        return None;
    }
    // Find the length block the index falls into.
    let mut local = index;
    let mut length = 1;
    let mut block = FIRST;
    while local >= block {
        local -= block;
        block *= SECOND;
        length += 1;
    }

    let mut buf = EcoVec::with_capacity(length);
    buf.push(CHARS[(local % FIRST) as usize]);
    local /= FIRST;
    for _ in 1..length {
        buf.push(CHARS[(local % SECOND) as usize]);
        local /= SECOND;
    }
    Some(buf)
}

fn char_index(b: u8) -> Option<u64> {
    match b {
        b'a'..=b'z' => Some(u64::from(b - b'a')),
        b'A'..=b'Z' => Some(u64::from(b - b'A') + 26),
        b'_' => Some(52),
        b'0'..=b'9' => Some(u64::from(b - b'0') + 53),
        _ => None,
    }
}

/// Returns the index of a generated identifier: the inverse of
/// [`generate_ident`]. Returns `None` for names that no index generates
/// (empty, too long, starting with a digit, or containing other bytes).
#[must_use]
pub fn ident_index(name: &[u8]) -> Option<u64> {
    if name.is_empty() || name.len() > MAX_IDENT_LENGTH {
        return None;
    }
    let first = char_index(name[0])?;
    if first >= FIRST {
        return None;
    }
    let mut local = 0u64;
    for &b in name[1..].iter().rev() {
        local = local * SECOND + char_index(b)?;
    }
    local = local * FIRST + first;

    // Skip over the blocks of all shorter lengths.
    let mut prefix = 0u64;
    let mut block = FIRST;
    for _ in 1..name.len() {
        prefix += block;
        block *= SECOND;
    }
    let index = prefix + local;
    (index <= MAX_IDENT_INDEX).then_some(index)
}

/// What currently holds an index within a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occupant {
    /// A Lua keyword; never reusable.
    Keyword,
    /// A variable; reusable by a local whose visibility does not overlap.
    Var(VarId),
}

struct Assigner<'a> {
    fs: &'a FileScope,
    used: HashMap<(ScopeId, u64), Occupant>,
    var_indexes: HashMap<VarId, u64>,
}

impl Assigner<'_> {
    /// Marks an index as used in the scope and every descendant that can
    /// reach the variable.
    fn mark_scope_tree(&mut self, scope: ScopeId, var: VarId, index: u64) {
        if self.fs.scope_contains(scope, var) {
            self.used.insert((scope, index), Occupant::Var(var));
        }
        for item in &self.fs.scope(scope).items {
            if let ScopeItem::Scope(child) = item {
                self.mark_scope_tree(*child, var, index);
            }
        }
    }

    /// Assigns indices to the locals reachable from `scope`, in item
    /// order, descending into child scopes as they appear.
    fn assign_locals(&mut self, scope: ScopeId) {
        for i in 0..self.fs.scope(scope).items.len() {
            match self.fs.scope(scope).items[i] {
                ScopeItem::Scope(child) => self.assign_locals(child),
                ScopeItem::Name(token) => {
                    let Some(var) = self.fs.variable_of_id(token) else {
                        continue;
                    };
                    if self.fs.variable(var).kind != VariableKind::Local
                        || self.var_indexes.contains_key(&var)
                    {
                        continue;
                    }
                    let declaring = self.fs.variable(var).scopes[0];

                    // The smallest index that is vacant or reusable.
                    let mut index = 0;
                    loop {
                        match self.used.get(&(declaring, index)) {
                            None => break,
                            Some(Occupant::Var(other))
                                if !self.fs.visibility_overlaps(var, *other) =>
                            {
                                break;
                            }
                            _ => index += 1,
                        }
                    }
                    self.var_indexes.insert(var, index);
                    self.used.insert((declaring, index), Occupant::Var(var));
                    // The local is reachable from the scopes opened after
                    // its declaration.
                    for item in &self.fs.scope(scope).items[i + 1..] {
                        if let ScopeItem::Scope(child) = item {
                            self.mark_scope_tree(*child, var, index);
                        }
                    }
                }
            }
        }
    }
}

/// Minifies the tree in place: renames locals to the shortest available
/// identifiers, strips all whitespace and comments, reinserts mandatory
/// separators, and reflows offsets from byte 0.
pub fn minify(file: &mut File) {
    let fs = build_file_scope(file);

    let mut assigner = Assigner {
        fs: &fs,
        used: HashMap::new(),
        var_indexes: HashMap::new(),
    };

    // Keywords hold their index in every scope.
    for &keyword in TokenKind::KEYWORDS {
        if let Some(index) = ident_index(keyword.to_string().as_bytes()) {
            for scope in fs.scope_ids() {
                assigner.used.insert((scope, index), Occupant::Keyword);
            }
        }
    }

    // Globals are visible everywhere and forever, so their names hold
    // their index in every scope. They are processed before any local so
    // their existence is known file-wide.
    for &global in &fs.globals {
        let Some(index) = ident_index(fs.variable(global).name.as_bytes()) else {
            continue;
        };
        assigner.var_indexes.insert(global, index);
        for scope in fs.scope_ids() {
            assigner.used.insert((scope, index), Occupant::Var(global));
        }
    }

    assigner.assign_locals(fs.root);

    // Collect the new bytes for every reference of every renamed local.
    let mut renames: HashMap<usize, EcoVec<u8>> = HashMap::new();
    for (&var, &index) in &assigner.var_indexes {
        if fs.variable(var).kind != VariableKind::Local {
            continue;
        }
        let Some(name) = generate_ident(index) else {
            continue;
        };
        for &token in &fs.variable(var).references {
            renames.insert(token.offset(), name.clone());
        }
    }

    // Rewrite names and erase all trivia, then repair the byte stream.
    walk_tokens_mut(file, &mut |tok| {
        if !tok.kind.is_valid() {
            return;
        }
        tok.prefix.clear();
        if tok.kind == TokenKind::Name {
            if let Some(name) = renames.get(&tok.offset) {
                tok.bytes = name.clone();
            }
        }
    });
    fix_adjoined_tokens(file);
    fix_token_offsets(file, 0);
}
