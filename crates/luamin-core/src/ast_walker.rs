// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Depth-first, lexical-order traversal of the parse tree.
//!
//! Two traversals are provided:
//!
//! - [`walk_file`] (and the per-node `walk_*` functions) drive a
//!   [`Visitor`]: `visit` is called at node entry and may skip the node's
//!   children, `leave` is called at exit, and `visit_token` is called for
//!   every token slot — including invalid placeholder slots — strictly in
//!   byte-offset order of the serialized source.
//!
//! - [`walk_tokens_mut`] visits every token mutably in the same order. The
//!   rewrite passes (offset reflow, adjoin fixing, minification) are all
//!   token-level edits, so this is the traversal they share.
//!
//! The `index` passed to `visit_token` identifies the token slot within its
//! node variant: fixed slots are numbered in lexical order, and for the
//! homogeneous list nodes ([`NameList`], [`FuncNameList`]) even indices
//! identify items while odd indices identify separators. For nodes whose
//! list elements are themselves nodes ([`Block`], [`ExprList`],
//! [`EntryList`]), the separator after item `i` has index `i`.
//!
//! Passes that must thread state through the traversal in a custom order
//! (the scope builder reorders `local` declarations relative to their
//! values) keep their own recursive traversal instead of using a visitor.

use crate::ast::{
    Args, Block, ElseClause, ElseIfClause, Entry, EntryList, Expr, ExprList, File, FuncNameList,
    FunctionExpr, NameList, Stmt, Token,
};

/// A node reference handed to a [`Visitor`].
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    File(&'a File),
    Block(&'a Block),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    ExprList(&'a ExprList),
    NameList(&'a NameList),
    EntryList(&'a EntryList),
    FuncNameList(&'a FuncNameList),
    Entry(&'a Entry),
    Args(&'a Args),
    ElseIfClause(&'a ElseIfClause),
    ElseClause(&'a ElseClause),
}

/// A visitor over nodes and tokens in lexical order.
pub trait Visitor {
    /// Called when a node is entered. Return `false` to skip the node's
    /// children (and its `leave` call).
    fn visit(&mut self, node: Node<'_>) -> bool {
        let _ = node;
        true
    }

    /// Called when a node visited with `visit` is left.
    fn leave(&mut self, node: Node<'_>) {
        let _ = node;
    }

    /// Called for every token of a visited node. `index` identifies the
    /// token slot within the node variant.
    fn visit_token(&mut self, node: Node<'_>, index: usize, token: &Token) {
        let _ = (node, index, token);
    }
}

/// Walks a file: its body, then the EOF token.
pub fn walk_file<V: Visitor>(v: &mut V, file: &File) {
    let node = Node::File(file);
    if !v.visit(node) {
        return;
    }
    walk_block(v, &file.body);
    v.visit_token(node, 0, &file.eof_token);
    v.leave(node);
}

/// Walks a block: each statement followed by its separator slot.
pub fn walk_block<V: Visitor>(v: &mut V, block: &Block) {
    let node = Node::Block(block);
    if !v.visit(node) {
        return;
    }
    for (i, item) in block.items.iter().enumerate() {
        walk_stmt(v, item);
        if let Some(sep) = block.seps.get(i) {
            v.visit_token(node, i, sep);
        }
    }
    v.leave(node);
}

/// Walks an expression list: each expression followed by its comma.
pub fn walk_expr_list<V: Visitor>(v: &mut V, list: &ExprList) {
    let node = Node::ExprList(list);
    if !v.visit(node) {
        return;
    }
    for (i, item) in list.items.iter().enumerate() {
        walk_expr(v, item);
        if let Some(sep) = list.seps.get(i) {
            v.visit_token(node, i, sep);
        }
    }
    v.leave(node);
}

/// Walks a name list: name and comma tokens interleaved.
pub fn walk_name_list<V: Visitor>(v: &mut V, list: &NameList) {
    let node = Node::NameList(list);
    if !v.visit(node) {
        return;
    }
    let mut n = 0;
    for (i, item) in list.items.iter().enumerate() {
        v.visit_token(node, n, item);
        n += 1;
        if let Some(sep) = list.seps.get(i) {
            v.visit_token(node, n, sep);
            n += 1;
        }
    }
    v.leave(node);
}

/// Walks an entry list: each entry followed by its separator.
pub fn walk_entry_list<V: Visitor>(v: &mut V, list: &EntryList) {
    let node = Node::EntryList(list);
    if !v.visit(node) {
        return;
    }
    for (i, item) in list.items.iter().enumerate() {
        walk_entry(v, item);
        if let Some(sep) = list.seps.get(i) {
            v.visit_token(node, i, sep);
        }
    }
    v.leave(node);
}

/// Walks a function name list: names and dots interleaved, then the colon
/// and method slots.
pub fn walk_func_name_list<V: Visitor>(v: &mut V, list: &FuncNameList) {
    let node = Node::FuncNameList(list);
    if !v.visit(node) {
        return;
    }
    let mut n = 0;
    for (i, item) in list.items.iter().enumerate() {
        v.visit_token(node, n, item);
        n += 1;
        if let Some(sep) = list.seps.get(i) {
            v.visit_token(node, n, sep);
            n += 1;
        }
    }
    v.visit_token(node, n, &list.colon_token);
    v.visit_token(node, n + 1, &list.method_token);
    v.leave(node);
}

/// Walks the parameter tokens of a function: `(`, the parameter names, the
/// vararg slots, and `)`. Shared by the three function forms; `base` is the
/// index of the `(` slot within the parent node.
fn walk_params<V: Visitor>(v: &mut V, node: Node<'_>, func: &FunctionExpr, base: usize) {
    v.visit_token(node, base, &func.lparen_token);
    if let Some(params) = &func.params {
        walk_name_list(v, params);
    }
    v.visit_token(node, base + 1, &func.vararg_sep_token);
    v.visit_token(node, base + 2, &func.vararg_token);
    v.visit_token(node, base + 3, &func.rparen_token);
}

/// Walks an expression.
pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) {
    let node = Node::Expr(expr);
    if !v.visit(node) {
        return;
    }
    match expr {
        Expr::Number(e) => v.visit_token(node, 0, &e.number_token),
        Expr::String(e) => v.visit_token(node, 0, &e.string_token),
        Expr::Nil(e) => v.visit_token(node, 0, &e.nil_token),
        Expr::Bool(e) => v.visit_token(node, 0, &e.bool_token),
        Expr::Vararg(e) => v.visit_token(node, 0, &e.vararg_token),
        Expr::Variable(e) => v.visit_token(node, 0, &e.name_token),
        Expr::Unop(e) => {
            v.visit_token(node, 0, &e.unop_token);
            walk_expr(v, &e.operand);
        }
        Expr::Binop(e) => {
            walk_expr(v, &e.left);
            v.visit_token(node, 0, &e.binop_token);
            walk_expr(v, &e.right);
        }
        Expr::Paren(e) => {
            v.visit_token(node, 0, &e.lparen_token);
            walk_expr(v, &e.value);
            v.visit_token(node, 1, &e.rparen_token);
        }
        Expr::Table(e) => {
            v.visit_token(node, 0, &e.lbrace_token);
            walk_entry_list(v, &e.entries);
            v.visit_token(node, 1, &e.rbrace_token);
        }
        Expr::Function(e) => {
            v.visit_token(node, 0, &e.func_token);
            walk_params(v, node, e, 1);
            walk_block(v, &e.body);
            v.visit_token(node, 5, &e.end_token);
        }
        Expr::Field(e) => {
            walk_expr(v, &e.value);
            v.visit_token(node, 0, &e.dot_token);
            v.visit_token(node, 1, &e.name_token);
        }
        Expr::Index(e) => {
            walk_expr(v, &e.value);
            v.visit_token(node, 0, &e.lbrack_token);
            walk_expr(v, &e.index);
            v.visit_token(node, 1, &e.rbrack_token);
        }
        Expr::Method(e) => {
            walk_expr(v, &e.value);
            v.visit_token(node, 0, &e.colon_token);
            v.visit_token(node, 1, &e.name_token);
            walk_args(v, &e.args);
        }
        Expr::Call(e) => {
            walk_expr(v, &e.value);
            walk_args(v, &e.args);
        }
    }
    v.leave(node);
}

/// Walks a table entry.
pub fn walk_entry<V: Visitor>(v: &mut V, entry: &Entry) {
    let node = Node::Entry(entry);
    if !v.visit(node) {
        return;
    }
    match entry {
        Entry::Index(e) => {
            v.visit_token(node, 0, &e.lbrack_token);
            walk_expr(v, &e.key);
            v.visit_token(node, 1, &e.rbrack_token);
            v.visit_token(node, 2, &e.assign_token);
            walk_expr(v, &e.value);
        }
        Entry::Field(e) => {
            v.visit_token(node, 0, &e.name_token);
            v.visit_token(node, 1, &e.assign_token);
            walk_expr(v, &e.value);
        }
        Entry::Value(e) => walk_expr(v, &e.value),
    }
    v.leave(node);
}

/// Walks call arguments.
pub fn walk_args<V: Visitor>(v: &mut V, args: &Args) {
    let node = Node::Args(args);
    if !v.visit(node) {
        return;
    }
    match args {
        Args::List(a) => {
            v.visit_token(node, 0, &a.lparen_token);
            if let Some(values) = &a.values {
                walk_expr_list(v, values);
            }
            v.visit_token(node, 1, &a.rparen_token);
        }
        Args::Table(a) => {
            v.visit_token(node, 0, &a.value.lbrace_token);
            walk_entry_list(v, &a.value.entries);
            v.visit_token(node, 1, &a.value.rbrace_token);
        }
        Args::String(a) => v.visit_token(node, 0, &a.value.string_token),
    }
    v.leave(node);
}

/// Walks a statement.
pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Stmt) {
    let node = Node::Stmt(stmt);
    if !v.visit(node) {
        return;
    }
    match stmt {
        Stmt::Do(s) => {
            v.visit_token(node, 0, &s.do_token);
            walk_block(v, &s.body);
            v.visit_token(node, 1, &s.end_token);
        }
        Stmt::Assign(s) => {
            walk_expr_list(v, &s.left);
            v.visit_token(node, 0, &s.assign_token);
            walk_expr_list(v, &s.right);
        }
        Stmt::Call(s) => walk_expr(v, &s.call),
        Stmt::If(s) => {
            v.visit_token(node, 0, &s.if_token);
            walk_expr(v, &s.cond);
            v.visit_token(node, 1, &s.then_token);
            walk_block(v, &s.body);
            for clause in &s.else_if {
                walk_else_if_clause(v, clause);
            }
            if let Some(clause) = &s.else_clause {
                walk_else_clause(v, clause);
            }
            v.visit_token(node, 2, &s.end_token);
        }
        Stmt::NumericFor(s) => {
            v.visit_token(node, 0, &s.for_token);
            v.visit_token(node, 1, &s.name_token);
            v.visit_token(node, 2, &s.assign_token);
            walk_expr(v, &s.min);
            v.visit_token(node, 3, &s.max_sep_token);
            walk_expr(v, &s.max);
            v.visit_token(node, 4, &s.step_sep_token);
            if let Some(step) = &s.step {
                walk_expr(v, step);
            }
            v.visit_token(node, 5, &s.do_token);
            walk_block(v, &s.body);
            v.visit_token(node, 6, &s.end_token);
        }
        Stmt::GenericFor(s) => {
            v.visit_token(node, 0, &s.for_token);
            walk_name_list(v, &s.names);
            v.visit_token(node, 1, &s.in_token);
            walk_expr_list(v, &s.iterator);
            v.visit_token(node, 2, &s.do_token);
            walk_block(v, &s.body);
            v.visit_token(node, 3, &s.end_token);
        }
        Stmt::While(s) => {
            v.visit_token(node, 0, &s.while_token);
            walk_expr(v, &s.cond);
            v.visit_token(node, 1, &s.do_token);
            walk_block(v, &s.body);
            v.visit_token(node, 2, &s.end_token);
        }
        Stmt::Repeat(s) => {
            v.visit_token(node, 0, &s.repeat_token);
            walk_block(v, &s.body);
            v.visit_token(node, 1, &s.until_token);
            walk_expr(v, &s.cond);
        }
        Stmt::LocalVar(s) => {
            v.visit_token(node, 0, &s.local_token);
            walk_name_list(v, &s.names);
            v.visit_token(node, 1, &s.assign_token);
            if let Some(values) = &s.values {
                walk_expr_list(v, values);
            }
        }
        Stmt::LocalFunction(s) => {
            // The function's tokens interleave with the name, so they are
            // visited inline rather than as a nested expression.
            v.visit_token(node, 0, &s.local_token);
            v.visit_token(node, 1, &s.func.func_token);
            v.visit_token(node, 2, &s.name_token);
            walk_params(v, node, &s.func, 3);
            walk_block(v, &s.func.body);
            v.visit_token(node, 7, &s.func.end_token);
        }
        Stmt::Function(s) => {
            v.visit_token(node, 0, &s.func.func_token);
            walk_func_name_list(v, &s.name);
            walk_params(v, node, &s.func, 1);
            walk_block(v, &s.func.body);
            v.visit_token(node, 5, &s.func.end_token);
        }
        Stmt::Break(s) => v.visit_token(node, 0, &s.break_token),
        Stmt::Return(s) => {
            v.visit_token(node, 0, &s.return_token);
            if let Some(values) = &s.values {
                walk_expr_list(v, values);
            }
        }
    }
    v.leave(node);
}

/// Walks an `elseif` clause.
pub fn walk_else_if_clause<V: Visitor>(v: &mut V, clause: &ElseIfClause) {
    let node = Node::ElseIfClause(clause);
    if !v.visit(node) {
        return;
    }
    v.visit_token(node, 0, &clause.else_if_token);
    walk_expr(v, &clause.cond);
    v.visit_token(node, 1, &clause.then_token);
    walk_block(v, &clause.body);
    v.leave(node);
}

/// Walks an `else` clause.
pub fn walk_else_clause<V: Visitor>(v: &mut V, clause: &ElseClause) {
    let node = Node::ElseClause(clause);
    if !v.visit(node) {
        return;
    }
    v.visit_token(node, 0, &clause.else_token);
    walk_block(v, &clause.body);
    v.leave(node);
}

// ---------------------------------------------------------------------------
// Mutable token traversal

/// Visits every token of the file mutably, in the same lexical order as the
/// [`Visitor`] traversal.
pub fn walk_tokens_mut(file: &mut File, f: &mut impl FnMut(&mut Token)) {
    block_tokens_mut(&mut file.body, f);
    f(&mut file.eof_token);
}

/// Visits every token of a block mutably, in lexical order.
pub fn block_tokens_mut(block: &mut Block, f: &mut impl FnMut(&mut Token)) {
    for (i, item) in block.items.iter_mut().enumerate() {
        stmt_tokens_mut(item, f);
        if let Some(sep) = block.seps.get_mut(i) {
            f(sep);
        }
    }
}

fn expr_list_tokens_mut(list: &mut ExprList, f: &mut impl FnMut(&mut Token)) {
    for (i, item) in list.items.iter_mut().enumerate() {
        expr_tokens_mut(item, f);
        if let Some(sep) = list.seps.get_mut(i) {
            f(sep);
        }
    }
}

fn name_list_tokens_mut(list: &mut NameList, f: &mut impl FnMut(&mut Token)) {
    for (i, item) in list.items.iter_mut().enumerate() {
        f(item);
        if let Some(sep) = list.seps.get_mut(i) {
            f(sep);
        }
    }
}

fn entry_list_tokens_mut(list: &mut EntryList, f: &mut impl FnMut(&mut Token)) {
    for (i, item) in list.items.iter_mut().enumerate() {
        entry_tokens_mut(item, f);
        if let Some(sep) = list.seps.get_mut(i) {
            f(sep);
        }
    }
}

fn func_name_list_tokens_mut(list: &mut FuncNameList, f: &mut impl FnMut(&mut Token)) {
    for (i, item) in list.items.iter_mut().enumerate() {
        f(item);
        if let Some(sep) = list.seps.get_mut(i) {
            f(sep);
        }
    }
    f(&mut list.colon_token);
    f(&mut list.method_token);
}

fn params_tokens_mut(func: &mut FunctionExpr, f: &mut impl FnMut(&mut Token)) {
    f(&mut func.lparen_token);
    if let Some(params) = &mut func.params {
        name_list_tokens_mut(params, f);
    }
    f(&mut func.vararg_sep_token);
    f(&mut func.vararg_token);
    f(&mut func.rparen_token);
}

/// Visits every token of an expression mutably, in lexical order.
pub fn expr_tokens_mut(expr: &mut Expr, f: &mut impl FnMut(&mut Token)) {
    match expr {
        Expr::Number(e) => f(&mut e.number_token),
        Expr::String(e) => f(&mut e.string_token),
        Expr::Nil(e) => f(&mut e.nil_token),
        Expr::Bool(e) => f(&mut e.bool_token),
        Expr::Vararg(e) => f(&mut e.vararg_token),
        Expr::Variable(e) => f(&mut e.name_token),
        Expr::Unop(e) => {
            f(&mut e.unop_token);
            expr_tokens_mut(&mut e.operand, f);
        }
        Expr::Binop(e) => {
            expr_tokens_mut(&mut e.left, f);
            f(&mut e.binop_token);
            expr_tokens_mut(&mut e.right, f);
        }
        Expr::Paren(e) => {
            f(&mut e.lparen_token);
            expr_tokens_mut(&mut e.value, f);
            f(&mut e.rparen_token);
        }
        Expr::Table(e) => {
            f(&mut e.lbrace_token);
            entry_list_tokens_mut(&mut e.entries, f);
            f(&mut e.rbrace_token);
        }
        Expr::Function(e) => {
            f(&mut e.func_token);
            params_tokens_mut(e, f);
            block_tokens_mut(&mut e.body, f);
            f(&mut e.end_token);
        }
        Expr::Field(e) => {
            expr_tokens_mut(&mut e.value, f);
            f(&mut e.dot_token);
            f(&mut e.name_token);
        }
        Expr::Index(e) => {
            expr_tokens_mut(&mut e.value, f);
            f(&mut e.lbrack_token);
            expr_tokens_mut(&mut e.index, f);
            f(&mut e.rbrack_token);
        }
        Expr::Method(e) => {
            expr_tokens_mut(&mut e.value, f);
            f(&mut e.colon_token);
            f(&mut e.name_token);
            args_tokens_mut(&mut e.args, f);
        }
        Expr::Call(e) => {
            expr_tokens_mut(&mut e.value, f);
            args_tokens_mut(&mut e.args, f);
        }
    }
}

fn entry_tokens_mut(entry: &mut Entry, f: &mut impl FnMut(&mut Token)) {
    match entry {
        Entry::Index(e) => {
            f(&mut e.lbrack_token);
            expr_tokens_mut(&mut e.key, f);
            f(&mut e.rbrack_token);
            f(&mut e.assign_token);
            expr_tokens_mut(&mut e.value, f);
        }
        Entry::Field(e) => {
            f(&mut e.name_token);
            f(&mut e.assign_token);
            expr_tokens_mut(&mut e.value, f);
        }
        Entry::Value(e) => expr_tokens_mut(&mut e.value, f),
    }
}

fn args_tokens_mut(args: &mut Args, f: &mut impl FnMut(&mut Token)) {
    match args {
        Args::List(a) => {
            f(&mut a.lparen_token);
            if let Some(values) = &mut a.values {
                expr_list_tokens_mut(values, f);
            }
            f(&mut a.rparen_token);
        }
        Args::Table(a) => {
            f(&mut a.value.lbrace_token);
            entry_list_tokens_mut(&mut a.value.entries, f);
            f(&mut a.value.rbrace_token);
        }
        Args::String(a) => f(&mut a.value.string_token),
    }
}

/// Visits every token of a statement mutably, in lexical order.
pub fn stmt_tokens_mut(stmt: &mut Stmt, f: &mut impl FnMut(&mut Token)) {
    match stmt {
        Stmt::Do(s) => {
            f(&mut s.do_token);
            block_tokens_mut(&mut s.body, f);
            f(&mut s.end_token);
        }
        Stmt::Assign(s) => {
            expr_list_tokens_mut(&mut s.left, f);
            f(&mut s.assign_token);
            expr_list_tokens_mut(&mut s.right, f);
        }
        Stmt::Call(s) => expr_tokens_mut(&mut s.call, f),
        Stmt::If(s) => {
            f(&mut s.if_token);
            expr_tokens_mut(&mut s.cond, f);
            f(&mut s.then_token);
            block_tokens_mut(&mut s.body, f);
            for clause in &mut s.else_if {
                f(&mut clause.else_if_token);
                expr_tokens_mut(&mut clause.cond, f);
                f(&mut clause.then_token);
                block_tokens_mut(&mut clause.body, f);
            }
            if let Some(clause) = &mut s.else_clause {
                f(&mut clause.else_token);
                block_tokens_mut(&mut clause.body, f);
            }
            f(&mut s.end_token);
        }
        Stmt::NumericFor(s) => {
            f(&mut s.for_token);
            f(&mut s.name_token);
            f(&mut s.assign_token);
            expr_tokens_mut(&mut s.min, f);
            f(&mut s.max_sep_token);
            expr_tokens_mut(&mut s.max, f);
            f(&mut s.step_sep_token);
            if let Some(step) = &mut s.step {
                expr_tokens_mut(step, f);
            }
            f(&mut s.do_token);
            block_tokens_mut(&mut s.body, f);
            f(&mut s.end_token);
        }
        Stmt::GenericFor(s) => {
            f(&mut s.for_token);
            name_list_tokens_mut(&mut s.names, f);
            f(&mut s.in_token);
            expr_list_tokens_mut(&mut s.iterator, f);
            f(&mut s.do_token);
            block_tokens_mut(&mut s.body, f);
            f(&mut s.end_token);
        }
        Stmt::While(s) => {
            f(&mut s.while_token);
            expr_tokens_mut(&mut s.cond, f);
            f(&mut s.do_token);
            block_tokens_mut(&mut s.body, f);
            f(&mut s.end_token);
        }
        Stmt::Repeat(s) => {
            f(&mut s.repeat_token);
            block_tokens_mut(&mut s.body, f);
            f(&mut s.until_token);
            expr_tokens_mut(&mut s.cond, f);
        }
        Stmt::LocalVar(s) => {
            f(&mut s.local_token);
            name_list_tokens_mut(&mut s.names, f);
            f(&mut s.assign_token);
            if let Some(values) = &mut s.values {
                expr_list_tokens_mut(values, f);
            }
        }
        Stmt::LocalFunction(s) => {
            f(&mut s.local_token);
            f(&mut s.func.func_token);
            f(&mut s.name_token);
            params_tokens_mut(&mut s.func, f);
            block_tokens_mut(&mut s.func.body, f);
            f(&mut s.func.end_token);
        }
        Stmt::Function(s) => {
            f(&mut s.func.func_token);
            func_name_list_tokens_mut(&mut s.name, f);
            params_tokens_mut(&mut s.func, f);
            block_tokens_mut(&mut s.func.body, f);
            f(&mut s.func.end_token);
        }
        Stmt::Break(s) => f(&mut s.break_token),
        Stmt::Return(s) => {
            f(&mut s.return_token);
            if let Some(values) = &mut s.values {
                expr_list_tokens_mut(values, f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::parse;

    /// Collects `(kind, offset)` pairs of every valid token visited.
    struct Collector {
        offsets: Vec<usize>,
    }

    impl Visitor for Collector {
        fn visit_token(&mut self, _node: Node<'_>, _index: usize, token: &Token) {
            if token.kind.is_valid() {
                self.offsets.push(token.offset);
            }
        }
    }

    #[test]
    fn tokens_are_visited_in_byte_offset_order() {
        let src = b"local x, y = 1, {a = 2; [3] = 4}\n\
            function t.f:m(p, ...) return p end\n\
            for i = 1, 10, 2 do t:m(i){} end\n\
            for k, v in pairs(t) do print(k, -v) end\n\
            while x < y do x = x + 1 end\n\
            repeat do break end until x\n\
            if x then elseif y then else end\n\
            x = a.b[c]('s') .. f'lit'\n";
        let (file, err) = parse("order.lua", src);
        assert!(err.is_none(), "parse failed: {err:?}");

        let mut collector = Collector {
            offsets: Vec::new(),
        };
        walk_file(&mut collector, &file);
        assert!(!collector.offsets.is_empty());
        for pair in collector.offsets.windows(2) {
            assert!(
                pair[0] < pair[1],
                "tokens out of lexical order: {} then {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn mutable_walk_matches_visitor_walk() {
        let src = b"local f = function(a, b) return a + b end\nf{1, 2}\n";
        let (mut file, err) = parse("walk.lua", src);
        assert!(err.is_none());

        let mut collector = Collector {
            offsets: Vec::new(),
        };
        walk_file(&mut collector, &file);

        let mut mut_offsets = Vec::new();
        walk_tokens_mut(&mut file, &mut |tok| {
            if tok.kind.is_valid() {
                mut_offsets.push(tok.offset);
            }
        });
        assert_eq!(collector.offsets, mut_offsets);
    }

    #[test]
    fn visit_can_skip_children() {
        struct SkipAll {
            tokens: usize,
        }
        impl Visitor for SkipAll {
            fn visit(&mut self, node: Node<'_>) -> bool {
                !matches!(node, Node::Block(_))
            }
            fn visit_token(&mut self, _node: Node<'_>, _index: usize, _token: &Token) {
                self.tokens += 1;
            }
        }

        let (file, _) = parse("skip.lua", b"local x = 1");
        let mut v = SkipAll { tokens: 0 };
        walk_file(&mut v, &file);
        // Only the EOF token is seen when the body block is skipped.
        assert_eq!(v.tokens, 1);
    }
}
