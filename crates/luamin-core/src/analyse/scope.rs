// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Scope and variable analysis.
//!
//! [`build_file_scope`] walks a parse tree and produces a [`FileScope`]: a
//! tree of [`Scope`]s holding the local variables they declare, an interned
//! table of global variables, and a map from name tokens back to variables.
//!
//! Scopes and variables live in arenas inside the [`FileScope`] and are
//! addressed by [`ScopeId`]/[`VarId`]; the parent link of a scope is an id
//! into the same arena, which resolves the parent/child cycle without
//! shared ownership. The analysis borrows nothing from the tree: tokens are
//! identified by their byte offset ([`TokenId`]), which is unique per
//! parsed token and stays valid until offsets are rewritten by a reflow.
//!
//! # Lifetimes
//!
//! The builder stamps every scope boundary and name event with a counter
//! that increases in traversal order. A variable records `life_start` (its
//! declaration), `life_end` (its latest reference), and `scope_end` (the
//! close of its declaring scope). Two variables are simultaneously
//! accessible — their *visibility overlaps* — exactly when their
//! `[life_start, scope_end]` intervals intersect; the minifier may give two
//! locals the same name only when they do not.
//!
//! # Scope items
//!
//! Each scope keeps an ordered [`ScopeItem`] list interleaving its name
//! events (declarations and references) with its child scopes. This is the
//! substrate the minifier descends: it fixes a deterministic assignment
//! order and records which scopes can reach which variables.

use std::collections::HashMap;

use ecow::EcoString;

use crate::ast::{
    Args, Block, Entry, Expr, ExprList, File, FunctionExpr, NameList, Stmt, Token,
};

/// Identity of a token within one parse: its byte offset.
///
/// Offsets are unique across the tokens of a parsed file. A reflow pass
/// rewrites offsets, so analysis results must not be used across one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(usize);

impl TokenId {
    /// The identity of the given token.
    #[must_use]
    pub fn of(token: &Token) -> Self {
        Self(token.offset)
    }

    /// The byte offset this identity was taken from.
    #[must_use]
    pub fn offset(self) -> usize {
        self.0
    }
}

/// Index of a [`Scope`] within its [`FileScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// Index of a [`Variable`] within its [`FileScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

/// Whether a variable is a local or lives in the global table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Local,
    Global,
}

/// The construct that opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOpener {
    /// The top-level block of the file.
    File,
    /// A function body, shared by all three function forms.
    Function,
    /// A `do` block.
    Do,
    /// The `if` arm of an if-chain.
    If,
    /// An `elseif` arm; a sibling of the preceding arm, not a child.
    ElseIf,
    /// An `else` arm.
    Else,
    /// The min/max/step expressions of a numeric `for`.
    NumericForHeader,
    /// The body of a numeric `for`, containing the control variable.
    NumericForBody,
    /// The iterator expressions of a generic `for`.
    GenericForHeader,
    /// The body of a generic `for`, containing the loop variables.
    GenericForBody,
    /// A `while` body (the condition is analyzed in the same scope).
    While,
    /// A `repeat` body; the `until` condition is evaluated inside it.
    Repeat,
}

/// A single named entity within a tree.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Whether the variable is local or global.
    pub kind: VariableKind,
    /// The variable's name.
    pub name: EcoString,
    /// Every name token referring to the variable. For a local, the first
    /// entry is its declaration.
    pub references: Vec<TokenId>,
    /// Scopes referring to the variable. For a local, the first entry is
    /// the declaring scope.
    pub scopes: Vec<ScopeId>,
    /// Position counter at declaration.
    pub life_start: u32,
    /// Position counter of the latest reference.
    pub life_end: u32,
    /// Position counter at the close of the declaring scope. Globals use
    /// `u32::MAX`: they are visible everywhere, forever.
    pub scope_end: u32,
}

/// One element of a scope's ordered contents: a name event or a nested
/// scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeItem {
    /// A declaration of, or reference to, a variable.
    Name(TokenId),
    /// A child scope.
    Scope(ScopeId),
}

/// A lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    /// The surrounding scope; `None` for the root.
    pub parent: Option<ScopeId>,
    /// Inner scopes, in traversal order.
    pub children: Vec<ScopeId>,
    /// Variables declared in this scope, in declaration order.
    pub variables: Vec<VarId>,
    /// Name events and child scopes, in lexical interleaving order.
    pub items: Vec<ScopeItem>,
    /// The construct that opened the scope.
    pub opener: ScopeOpener,
    /// Position counter at open.
    pub start: u32,
    /// Position counter at close.
    pub end: u32,
}

/// The scopes and variables of one file.
#[derive(Debug, Clone)]
pub struct FileScope {
    scopes: Vec<Scope>,
    variables: Vec<Variable>,
    /// The file's root scope.
    pub root: ScopeId,
    /// Global variables, in order of first reference.
    pub globals: Vec<VarId>,
    variable_map: HashMap<TokenId, VarId>,
}

impl FileScope {
    /// Returns the scope with the given id.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Returns the variable with the given id.
    #[must_use]
    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    /// Returns every scope id, root first.
    pub fn scope_ids(&self) -> impl Iterator<Item = ScopeId> + '_ {
        (0..self.scopes.len()).map(ScopeId)
    }

    /// Returns every variable id.
    pub fn variable_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.variables.len()).map(VarId)
    }

    /// Returns the variable a name token resolves to, if the token was a
    /// declaration or reference.
    #[must_use]
    pub fn variable_of(&self, token: &Token) -> Option<VarId> {
        self.variable_map.get(&TokenId::of(token)).copied()
    }

    /// Returns the variable for a token identity.
    #[must_use]
    pub fn variable_of_id(&self, id: TokenId) -> Option<VarId> {
        self.variable_map.get(&id).copied()
    }

    /// Returns whether the two variables are accessible simultaneously
    /// anywhere in the file.
    #[must_use]
    pub fn visibility_overlaps(&self, a: VarId, b: VarId) -> bool {
        let a = self.variable(a);
        let b = self.variable(b);
        a.life_start <= b.scope_end && b.life_start <= a.scope_end
    }

    /// Returns whether the scope's items, transitively, contain a
    /// reference to the variable.
    #[must_use]
    pub fn scope_contains(&self, scope: ScopeId, var: VarId) -> bool {
        self.scope(scope).items.iter().any(|item| match item {
            ScopeItem::Name(id) => self.variable_of_id(*id) == Some(var),
            ScopeItem::Scope(child) => self.scope_contains(*child, var),
        })
    }
}

/// Builder state while walking a tree.
struct ScopeBuilder {
    scopes: Vec<Scope>,
    variables: Vec<Variable>,
    globals: Vec<VarId>,
    variable_map: HashMap<TokenId, VarId>,
    current: Option<ScopeId>,
    counter: u32,
}

impl ScopeBuilder {
    fn new() -> Self {
        Self {
            scopes: Vec::new(),
            variables: Vec::new(),
            globals: Vec::new(),
            variable_map: HashMap::new(),
            current: None,
            counter: 0,
        }
    }

    fn tick(&mut self) -> u32 {
        let n = self.counter;
        self.counter += 1;
        n
    }

    fn current(&self) -> ScopeId {
        self.current.expect("scope builder outside any scope")
    }

    fn open_scope(&mut self, opener: ScopeOpener) {
        let start = self.tick();
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: self.current,
            children: Vec::new(),
            variables: Vec::new(),
            items: Vec::new(),
            opener,
            start,
            end: 0,
        });
        if let Some(parent) = self.current {
            self.scopes[parent.0].children.push(id);
            self.scopes[parent.0].items.push(ScopeItem::Scope(id));
        }
        self.current = Some(id);
    }

    fn close_scope(&mut self) {
        let end = self.tick();
        let id = self.current();
        self.scopes[id.0].end = end;
        for i in 0..self.scopes[id.0].variables.len() {
            let var = self.scopes[id.0].variables[i];
            self.variables[var.0].scope_end = end;
        }
        self.current = self.scopes[id.0].parent;
    }

    /// Declares a local variable named by the given token in the current
    /// scope.
    fn declare_local(&mut self, name: &Token) {
        let pos = self.tick();
        let scope = self.current();
        let token_id = TokenId::of(name);
        let var = VarId(self.variables.len());
        self.variables.push(Variable {
            kind: VariableKind::Local,
            name: token_name(name),
            references: vec![token_id],
            scopes: vec![scope],
            life_start: pos,
            life_end: pos,
            scope_end: 0,
        });
        self.scopes[scope.0].variables.push(var);
        self.scopes[scope.0].items.push(ScopeItem::Name(token_id));
        self.variable_map.insert(token_id, var);
    }

    /// Finds a local of the given name in the current scope or any outer
    /// one. Later declarations shadow earlier ones.
    fn find_local(&self, name: &[u8]) -> Option<VarId> {
        let mut scope = self.current;
        while let Some(id) = scope {
            for &var in self.scopes[id.0].variables.iter().rev() {
                if self.variables[var.0].name.as_bytes() == name {
                    return Some(var);
                }
            }
            scope = self.scopes[id.0].parent;
        }
        None
    }

    /// Records a reference to the variable named by the given token. The
    /// variable is resolved against the enclosing locals; an unresolved
    /// name targets the global table, interning a new global if needed.
    fn reference(&mut self, name: &Token) {
        let pos = self.tick();
        let scope = self.current();
        let token_id = TokenId::of(name);
        let var = match self.find_local(&name.bytes) {
            Some(var) => var,
            None => self.intern_global(name),
        };
        let variable = &mut self.variables[var.0];
        variable.references.push(token_id);
        variable.life_end = pos;
        if variable.scopes.last() != Some(&scope) {
            variable.scopes.push(scope);
        }
        self.scopes[scope.0].items.push(ScopeItem::Name(token_id));
        self.variable_map.insert(token_id, var);
    }

    fn intern_global(&mut self, name: &Token) -> VarId {
        for &var in &self.globals {
            if self.variables[var.0].name.as_bytes() == name.bytes.as_slice() {
                return var;
            }
        }
        let var = VarId(self.variables.len());
        self.variables.push(Variable {
            kind: VariableKind::Global,
            name: token_name(name),
            references: Vec::new(),
            scopes: vec![self.current()],
            life_start: 0,
            life_end: 0,
            scope_end: u32::MAX,
        });
        self.globals.push(var);
        var
    }

    // --- Traversal -------------------------------------------------------
    //
    // The builder needs to reorder children (values before names in a
    // local statement) and to open scopes mid-node (if-chain arms), so it
    // walks the tree itself instead of implementing the generic visitor.

    fn walk_file(&mut self, file: &File) {
        self.open_scope(ScopeOpener::File);
        self.walk_block(&file.body);
        self.close_scope();
    }

    fn walk_block(&mut self, block: &Block) {
        for stmt in &block.items {
            self.walk_stmt(stmt);
        }
    }

    fn declare_names(&mut self, names: &NameList) {
        for name in &names.items {
            self.declare_local(name);
        }
    }

    fn walk_expr_list(&mut self, list: &ExprList) {
        for expr in &list.items {
            self.walk_expr(expr);
        }
    }

    /// Analyzes a function body: parameters are declared inside the
    /// function's scope, before the body.
    fn walk_function(&mut self, func: &FunctionExpr) {
        self.open_scope(ScopeOpener::Function);
        if let Some(params) = &func.params {
            self.declare_names(params);
        }
        self.walk_block(&func.body);
        self.close_scope();
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Do(s) => {
                self.open_scope(ScopeOpener::Do);
                self.walk_block(&s.body);
                self.close_scope();
            }
            Stmt::Assign(s) => {
                self.walk_expr_list(&s.left);
                self.walk_expr_list(&s.right);
            }
            Stmt::Call(s) => self.walk_expr(&s.call),
            Stmt::If(s) => {
                self.open_scope(ScopeOpener::If);
                self.walk_expr(&s.cond);
                self.walk_block(&s.body);
                for clause in &s.else_if {
                    // Each arm replaces the previous one as a sibling.
                    self.close_scope();
                    self.open_scope(ScopeOpener::ElseIf);
                    self.walk_expr(&clause.cond);
                    self.walk_block(&clause.body);
                }
                if let Some(clause) = &s.else_clause {
                    self.close_scope();
                    self.open_scope(ScopeOpener::Else);
                    self.walk_block(&clause.body);
                }
                self.close_scope();
            }
            Stmt::NumericFor(s) => {
                // Range expressions evaluate before the control variable
                // exists, in a scope that precedes the body as a sibling.
                self.open_scope(ScopeOpener::NumericForHeader);
                self.walk_expr(&s.min);
                self.walk_expr(&s.max);
                if let Some(step) = &s.step {
                    self.walk_expr(step);
                }
                self.close_scope();
                self.open_scope(ScopeOpener::NumericForBody);
                self.declare_local(&s.name_token);
                self.walk_block(&s.body);
                self.close_scope();
            }
            Stmt::GenericFor(s) => {
                self.open_scope(ScopeOpener::GenericForHeader);
                self.walk_expr_list(&s.iterator);
                self.close_scope();
                self.open_scope(ScopeOpener::GenericForBody);
                self.declare_names(&s.names);
                self.walk_block(&s.body);
                self.close_scope();
            }
            Stmt::While(s) => {
                self.open_scope(ScopeOpener::While);
                self.walk_expr(&s.cond);
                self.walk_block(&s.body);
                self.close_scope();
            }
            Stmt::Repeat(s) => {
                // The until condition can see the body's locals.
                self.open_scope(ScopeOpener::Repeat);
                self.walk_block(&s.body);
                self.walk_expr(&s.cond);
                self.close_scope();
            }
            Stmt::LocalVar(s) => {
                // Values are analyzed first: they cannot see the names
                // being declared.
                if let Some(values) = &s.values {
                    self.walk_expr_list(values);
                }
                self.declare_names(&s.names);
            }
            Stmt::LocalFunction(s) => {
                // The name is visible inside the body, enabling recursion.
                self.declare_local(&s.name_token);
                self.walk_function(&s.func);
            }
            Stmt::Function(s) => {
                // Only the head of `function a.b.c:m` is a variable; the
                // rest are field and method names on its value.
                if let Some(head) = s.name.items.first() {
                    self.reference(head);
                }
                self.walk_function(&s.func);
            }
            Stmt::Break(_) => {}
            Stmt::Return(s) => {
                if let Some(values) = &s.values {
                    self.walk_expr_list(values);
                }
            }
        }
    }

    fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(_)
            | Expr::String(_)
            | Expr::Nil(_)
            | Expr::Bool(_)
            | Expr::Vararg(_) => {}
            Expr::Variable(e) => self.reference(&e.name_token),
            Expr::Unop(e) => self.walk_expr(&e.operand),
            Expr::Binop(e) => {
                self.walk_expr(&e.left);
                self.walk_expr(&e.right);
            }
            Expr::Paren(e) => self.walk_expr(&e.value),
            Expr::Table(e) => {
                for entry in &e.entries.items {
                    match entry {
                        Entry::Index(entry) => {
                            self.walk_expr(&entry.key);
                            self.walk_expr(&entry.value);
                        }
                        // A field name is not a variable.
                        Entry::Field(entry) => self.walk_expr(&entry.value),
                        Entry::Value(entry) => self.walk_expr(&entry.value),
                    }
                }
            }
            Expr::Function(e) => self.walk_function(e),
            Expr::Field(e) => self.walk_expr(&e.value),
            Expr::Index(e) => {
                self.walk_expr(&e.value);
                self.walk_expr(&e.index);
            }
            Expr::Method(e) => {
                self.walk_expr(&e.value);
                self.walk_args(&e.args);
            }
            Expr::Call(e) => {
                self.walk_expr(&e.value);
                self.walk_args(&e.args);
            }
        }
    }

    fn walk_args(&mut self, args: &Args) {
        match args {
            Args::List(a) => {
                if let Some(values) = &a.values {
                    self.walk_expr_list(values);
                }
            }
            Args::Table(a) => {
                for entry in &a.value.entries.items {
                    match entry {
                        Entry::Index(entry) => {
                            self.walk_expr(&entry.key);
                            self.walk_expr(&entry.value);
                        }
                        Entry::Field(entry) => self.walk_expr(&entry.value),
                        Entry::Value(entry) => self.walk_expr(&entry.value),
                    }
                }
            }
            Args::String(_) => {}
        }
    }
}

fn token_name(token: &Token) -> EcoString {
    EcoString::from(String::from_utf8_lossy(&token.bytes).as_ref())
}

/// Walks the tree and builds its scope graph and variable table.
#[must_use]
pub fn build_file_scope(file: &File) -> FileScope {
    let mut builder = ScopeBuilder::new();
    builder.walk_file(file);
    assert!(builder.current.is_none(), "unbalanced scopes");
    FileScope {
        root: ScopeId(0),
        scopes: builder.scopes,
        variables: builder.variables,
        globals: builder.globals,
        variable_map: builder.variable_map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::parse;

    fn scope_of(src: &[u8]) -> (File, FileScope) {
        let (file, err) = parse("scope.lua", src);
        assert!(err.is_none(), "parse error: {err:?}");
        let fs = build_file_scope(&file);
        (file, fs)
    }

    /// Finds the variable resolved for the name token at the given byte
    /// offset.
    fn var_at(fs: &FileScope, offset: usize) -> VarId {
        fs.variable_of_id(TokenId(offset))
            .unwrap_or_else(|| panic!("no variable at offset {offset}"))
    }

    #[test]
    fn locals_resolve_to_innermost_binding() {
        //           0         1         2         3
        //           0123456789012345678901234567890123456789
        let src = b"local x = 1 do local x = 2 print(x) end";
        let (_, fs) = scope_of(src);

        let outer = var_at(&fs, 6);
        let inner = var_at(&fs, 21);
        let used = var_at(&fs, 33);
        assert_ne!(outer, inner);
        assert_eq!(used, inner, "shadowing local must win");
        assert_eq!(fs.variable(inner).references.len(), 2);
        assert_eq!(fs.variable(outer).references.len(), 1);
    }

    #[test]
    fn unresolved_names_intern_one_global_each() {
        let src = b"print(a) print(a) io.write(a)";
        let (_, fs) = scope_of(src);
        let names: Vec<_> = fs
            .globals
            .iter()
            .map(|&g| fs.variable(g).name.as_str())
            .collect();
        assert_eq!(names, ["print", "a", "io"]);
        let a = fs
            .globals
            .iter()
            .copied()
            .find(|&g| fs.variable(g).name == "a")
            .unwrap();
        assert_eq!(fs.variable(a).references.len(), 3);
        assert_eq!(fs.variable(a).kind, VariableKind::Global);
    }

    #[test]
    fn local_values_cannot_see_their_names() {
        // The `x` on the right side refers to the global, not the new
        // local.
        let src = b"local x = x";
        let (_, fs) = scope_of(src);
        let value = var_at(&fs, 10);
        let declared = var_at(&fs, 6);
        assert_eq!(fs.variable(value).kind, VariableKind::Global);
        assert_eq!(fs.variable(declared).kind, VariableKind::Local);
    }

    #[test]
    fn local_function_can_recurse() {
        //           0         1         2         3
        //           0123456789012345678901234567890123456789
        let src = b"local function f() return f() end";
        let (_, fs) = scope_of(src);
        let declared = var_at(&fs, 15);
        let used = var_at(&fs, 26);
        assert_eq!(declared, used);
        assert_eq!(fs.variable(declared).kind, VariableKind::Local);
    }

    #[test]
    fn function_stmt_references_only_head_name() {
        let src = b"function a.b.c:m() end";
        let (_, fs) = scope_of(src);
        assert_eq!(fs.globals.len(), 1);
        assert_eq!(fs.variable(fs.globals[0]).name, "a");
        // b, c, m resolve to nothing.
        assert!(fs.variable_of_id(TokenId(11)).is_none());
        assert!(fs.variable_of_id(TokenId(13)).is_none());
        assert!(fs.variable_of_id(TokenId(15)).is_none());
    }

    #[test]
    fn parameters_belong_to_the_function_scope() {
        let src = b"local p = 1 local f = function(p) return p end return p";
        let (_, fs) = scope_of(src);
        let outer = var_at(&fs, 6);
        let param = var_at(&fs, 31);
        let inner_use = var_at(&fs, 41);
        let outer_use = var_at(&fs, 54);
        assert_ne!(outer, param);
        assert_eq!(inner_use, param);
        assert_eq!(outer_use, outer);
    }

    #[test]
    fn numeric_for_header_is_outside_the_body() {
        // The `i` in the range refers to the outer local, the one in the
        // body to the loop variable.
        //           0         1         2         3
        //           0123456789012345678901234567890123456789
        let src = b"local i = 1 for i = i, 9 do x(i) end";
        let (_, fs) = scope_of(src);
        let outer = var_at(&fs, 6);
        let loop_var = var_at(&fs, 16);
        let range_use = var_at(&fs, 20);
        let body_use = var_at(&fs, 30);
        assert_ne!(outer, loop_var);
        assert_eq!(range_use, outer);
        assert_eq!(body_use, loop_var);
    }

    #[test]
    fn repeat_condition_sees_body_locals() {
        //           0         1         2         3
        //           0123456789012345678901234567890123456789
        let src = b"repeat local done = t() until done";
        let (_, fs) = scope_of(src);
        let declared = var_at(&fs, 13);
        let used = var_at(&fs, 30);
        assert_eq!(declared, used);
    }

    #[test]
    fn if_arms_are_sibling_scopes() {
        let src = b"if a then local x = 1 elseif b then local x = 2 else local x = 3 end";
        let (_, fs) = scope_of(src);
        let root_children = &fs.scope(fs.root).children;
        assert_eq!(root_children.len(), 3);
        let openers: Vec<_> = root_children
            .iter()
            .map(|&c| fs.scope(c).opener)
            .collect();
        assert_eq!(
            openers,
            [ScopeOpener::If, ScopeOpener::ElseIf, ScopeOpener::Else]
        );
        for &child in root_children {
            assert_eq!(fs.scope(child).parent, Some(fs.root));
            assert_eq!(fs.scope(child).variables.len(), 1);
        }
    }

    #[test]
    fn lifetimes_track_declaration_and_last_reference() {
        let src = b"local x = 1 x = x + 1 do end";
        let (_, fs) = scope_of(src);
        let x = var_at(&fs, 6);
        let var = fs.variable(x);
        assert!(var.life_start < var.life_end);
        assert!(var.life_end < var.scope_end);
        assert_eq!(var.references.len(), 3);
    }

    #[test]
    fn visibility_overlap() {
        let src = b"local a = 1 do local b = a end do local c = 2 end";
        let (_, fs) = scope_of(src);
        let a = var_at(&fs, 6);
        let b = var_at(&fs, 21);
        let c = var_at(&fs, 40);
        // `a` is visible while both `b` and `c` live.
        assert!(fs.visibility_overlaps(a, b));
        assert!(fs.visibility_overlaps(a, c));
        // `b`'s block closes before `c` is declared.
        assert!(!fs.visibility_overlaps(b, c));
    }

    #[test]
    fn scope_items_interleave_names_and_children() {
        let src = b"local a = 1 do print(a) end local b = 2";
        let (_, fs) = scope_of(src);
        let root = fs.scope(fs.root);
        // a declaration, the do scope, b declaration.
        assert_eq!(root.items.len(), 3);
        assert!(matches!(root.items[0], ScopeItem::Name(_)));
        assert!(matches!(root.items[1], ScopeItem::Scope(_)));
        assert!(matches!(root.items[2], ScopeItem::Name(_)));

        let a = var_at(&fs, 6);
        let ScopeItem::Scope(do_scope) = root.items[1] else {
            unreachable!();
        };
        assert!(fs.scope_contains(do_scope, a));
        let b = var_at(&fs, 34);
        assert!(!fs.scope_contains(do_scope, b));
    }

    #[test]
    fn every_name_token_in_value_position_is_mapped() {
        let src = b"local x = y while x do x = x - z end";
        let (_, fs) = scope_of(src);
        let mapped: usize = fs
            .variable_ids()
            .map(|v| fs.variable(v).references.len())
            .sum();
        // x: declaration + 3 uses; y: 1; z: 1.
        assert_eq!(mapped, 6);
    }
}
