// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The Lua 5.1 parse tree.
//!
//! Every node stores its terminals as [`Token`]s, including separators and
//! keywords, and every token carries the whitespace and comments that
//! precede it ([`Prefix`]). Serializing a tree therefore reproduces the
//! original source byte for byte as long as the tree is unmodified.
//!
//! Grammar nonterminals are closed tagged enums ([`Stmt`], [`Expr`],
//! [`Entry`], [`Args`]); dispatching on them is exhaustive, so a new variant
//! cannot be added without every walker, writer and predicate noticing.
//!
//! An optional token slot (a semicolon separator, the `=` of a valueless
//! `local`, a vararg comma) holds a token of [`TokenKind::Invalid`] rather
//! than an `Option`, keeping the parallel `items`/`seps` lists of the four
//! list shapes aligned index for index.
//!
//! Structural well-formedness is defined by the `is_valid` predicates on
//! each node; writers assume validity. Validity is shallow: it checks the
//! node's own slots, not its children.

use std::sync::Arc;

use ecow::EcoVec;

use crate::source_analysis::{SourceFile, TokenKind};

/// A token within a file: its kind, preceding trivia, byte offset, and the
/// exact bytes it covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    /// The token's kind.
    pub kind: TokenKind,
    /// The prefix tokens preceding this token, left to right.
    pub prefix: Vec<Prefix>,
    /// The byte offset of the token within the file (prefix excluded).
    pub offset: usize,
    /// The bytes of the file that the token covers.
    pub bytes: EcoVec<u8>,
}

/// A space or comment preceding a [`Token`]. A kind is a prefix when
/// [`TokenKind::is_prefix`] returns true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    /// The prefix kind: space, line comment, or long comment.
    pub kind: TokenKind,
    /// The bytes of the prefix.
    pub bytes: EcoVec<u8>,
}

impl Token {
    /// Creates a placeholder for an absent optional token.
    #[must_use]
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Returns the offset at the start of the token, including its prefix.
    /// Invalid tokens report 0.
    #[must_use]
    pub fn start_offset(&self) -> usize {
        if !self.kind.is_valid() {
            return 0;
        }
        self.offset
            - self
                .prefix
                .iter()
                .map(|p| p.bytes.len())
                .sum::<usize>()
    }

    /// Returns the offset following the end of the token. Invalid tokens
    /// report 0.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        if !self.kind.is_valid() {
            return 0;
        }
        self.offset + self.bytes.len()
    }
}

/// A node representing an entire file.
#[derive(Debug, Clone)]
pub struct File {
    /// Information about the file: its name and line offsets. Shared with
    /// the scanner that produced the tree and with the reflow pass.
    pub info: Arc<SourceFile>,
    /// The top-level block of the file.
    pub body: Block,
    /// The EOF token, which owns any trailing trivia.
    pub eof_token: Token,
}

/// A Lua block: a sequence of statements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// Zero or more statements.
    pub items: Vec<Stmt>,
    /// One separator slot per statement: a semicolon, or invalid when
    /// absent. Always the same length as `items`.
    pub seps: Vec<Token>,
}

impl Block {
    /// Returns the combined length of items and separators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + self.seps.len()
    }

    /// Returns whether the block has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A list of one or more expressions separated by commas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExprList {
    pub items: Vec<Expr>,
    /// Comma separators; one fewer than `items`.
    pub seps: Vec<Token>,
}

/// A list of one or more names separated by commas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameList {
    /// Name tokens.
    pub items: Vec<Token>,
    /// Comma separators; one fewer than `items`.
    pub seps: Vec<Token>,
}

/// A list of entries in a table constructor. The trailing separator is
/// optional, so `seps` holds as many as `items`, or one fewer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryList {
    pub items: Vec<Entry>,
    /// Comma or semicolon separators.
    pub seps: Vec<Token>,
}

/// The dot-separated name chain of a function statement, optionally
/// followed by `: method`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FuncNameList {
    /// Name tokens; each successive name is a field of the previous value.
    pub items: Vec<Token>,
    /// Dot separators; one fewer than `items`.
    pub seps: Vec<Token>,
    /// The colon preceding the method name; invalid when there is none.
    pub colon_token: Token,
    /// The method name; invalid when there is none.
    pub method_token: Token,
}

impl ExprList {
    /// Returns the combined length of items and separators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + self.seps.len()
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl NameList {
    /// Returns the combined length of items and separators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + self.seps.len()
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl EntryList {
    /// Returns the combined length of items and separators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + self.seps.len()
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FuncNameList {
    /// Returns the combined length of names, separators, and the method
    /// suffix if present.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut n = self.items.len() + self.seps.len();
        if self.colon_token.kind.is_valid() {
            n += 2;
        }
        n
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Expressions

/// A Lua expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(NumberExpr),
    String(StringExpr),
    Nil(NilExpr),
    Bool(BoolExpr),
    Vararg(VarargExpr),
    /// A variable name in value position.
    Variable(VariableExpr),
    Unop(UnopExpr),
    Binop(BinopExpr),
    Paren(ParenExpr),
    Table(TableCtor),
    /// An anonymous function expression.
    Function(FunctionExpr),
    /// Dot field access: `value.name`.
    Field(FieldExpr),
    /// Bracket index access: `value[index]`.
    Index(IndexExpr),
    /// Method call: `value:name(args)`.
    Method(MethodExpr),
    /// Function call: `value(args)`.
    Call(CallExpr),
}

impl Expr {
    /// Returns whether the expression is a call (plain or method), which is
    /// the only expression form that can stand as a statement.
    #[must_use]
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Method(_) | Self::Call(_))
    }
}

/// A number literal expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberExpr {
    pub number_token: Token,
}

/// A string literal expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringExpr {
    pub string_token: Token,
}

/// A `nil` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NilExpr {
    pub nil_token: Token,
}

/// A boolean literal expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolExpr {
    pub bool_token: Token,
}

/// A `...` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarargExpr {
    pub vararg_token: Token,
}

/// A variable name used as an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableExpr {
    pub name_token: Token,
}

/// A unary operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnopExpr {
    pub unop_token: Token,
    pub operand: Box<Expr>,
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinopExpr {
    pub left: Box<Expr>,
    pub binop_token: Token,
    pub right: Box<Expr>,
}

/// An expression enclosed in parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenExpr {
    pub lparen_token: Token,
    pub value: Box<Expr>,
    pub rparen_token: Token,
}

/// A table constructor expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCtor {
    pub lbrace_token: Token,
    pub entries: EntryList,
    pub rbrace_token: Token,
}

/// A function body with its parameters, used by the anonymous expression
/// form and embedded in the `local function` and `function` statements.
///
/// The vararg slots encode three shapes: no vararg (both invalid), vararg
/// only (`vararg_token` valid, separator invalid), and vararg after named
/// parameters (both valid, separator a comma).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionExpr {
    pub func_token: Token,
    pub lparen_token: Token,
    /// Named parameters; `None` when the function declares none.
    pub params: Option<NameList>,
    /// The comma between the last named parameter and `...`; invalid
    /// unless both are present.
    pub vararg_sep_token: Token,
    /// The `...` token; invalid when the function takes no varargs.
    pub vararg_token: Token,
    pub rparen_token: Token,
    pub body: Block,
    pub end_token: Token,
}

/// A field access: `value.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpr {
    pub value: Box<Expr>,
    pub dot_token: Token,
    pub name_token: Token,
}

/// An index access: `value[index]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpr {
    pub value: Box<Expr>,
    pub lbrack_token: Token,
    pub index: Box<Expr>,
    pub rbrack_token: Token,
}

/// A method call: `value:name(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodExpr {
    pub value: Box<Expr>,
    pub colon_token: Token,
    pub name_token: Token,
    pub args: Args,
}

/// A function call: `value(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub value: Box<Expr>,
    pub args: Args,
}

// ---------------------------------------------------------------------------
// Table entries and call arguments

/// An entry of a table constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// `[key] = value`
    Index(IndexEntry),
    /// `name = value`
    Field(FieldEntry),
    /// A positional `value`
    Value(ValueEntry),
}

/// A `[key] = value` table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub lbrack_token: Token,
    pub key: Expr,
    pub rbrack_token: Token,
    pub assign_token: Token,
    pub value: Expr,
}

/// A `name = value` table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name_token: Token,
    pub assign_token: Token,
    pub value: Expr,
}

/// A positional table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueEntry {
    pub value: Expr,
}

/// The arguments of a function or method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    /// A parenthesized expression list.
    List(ListArgs),
    /// A single table constructor.
    Table(TableArg),
    /// A single string literal.
    String(StringArg),
}

/// Parenthesized call arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    pub lparen_token: Token,
    /// The argument expressions; `None` for an empty call.
    pub values: Option<ExprList>,
    pub rparen_token: Token,
}

/// A table constructor as the sole call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableArg {
    pub value: TableCtor,
}

/// A string literal as the sole call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringArg {
    pub value: StringExpr,
}

// ---------------------------------------------------------------------------
// Statements

/// A Lua statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Do(DoStmt),
    Assign(AssignStmt),
    Call(CallStmt),
    If(IfStmt),
    NumericFor(NumericForStmt),
    GenericFor(GenericForStmt),
    While(WhileStmt),
    Repeat(RepeatStmt),
    LocalVar(LocalVarStmt),
    LocalFunction(LocalFunctionStmt),
    Function(FunctionStmt),
    Break(BreakStmt),
    Return(ReturnStmt),
}

/// A `do ... end` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoStmt {
    pub do_token: Token,
    pub body: Block,
    pub end_token: Token,
}

/// An assignment of one or more values to one or more variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignStmt {
    pub left: ExprList,
    pub assign_token: Token,
    pub right: ExprList,
}

/// A call expression used as a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStmt {
    /// The call; always an [`Expr::Call`] or [`Expr::Method`].
    pub call: Expr,
}

/// An `if .. then .. end` statement with its elseif/else clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub if_token: Token,
    pub cond: Expr,
    pub then_token: Token,
    pub body: Block,
    pub else_if: Vec<ElseIfClause>,
    pub else_clause: Option<ElseClause>,
    pub end_token: Token,
}

/// An `elseif .. then` clause within an `if` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseIfClause {
    pub else_if_token: Token,
    pub cond: Expr,
    pub then_token: Token,
    pub body: Block,
}

/// An `else` clause within an `if` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseClause {
    pub else_token: Token,
    pub body: Block,
}

/// A numeric `for` statement:
/// `for name = min, max [, step] do body end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericForStmt {
    pub for_token: Token,
    /// The control variable.
    pub name_token: Token,
    pub assign_token: Token,
    pub min: Expr,
    /// The comma between the lower and upper bound.
    pub max_sep_token: Token,
    pub max: Expr,
    /// The comma before the step; invalid when the step is absent.
    pub step_sep_token: Token,
    /// The step expression; present exactly when `step_sep_token` is a
    /// comma.
    pub step: Option<Expr>,
    pub do_token: Token,
    pub body: Block,
    pub end_token: Token,
}

/// A generic `for` statement: `for names in iterator do body end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericForStmt {
    pub for_token: Token,
    pub names: NameList,
    pub in_token: Token,
    pub iterator: ExprList,
    pub do_token: Token,
    pub body: Block,
    pub end_token: Token,
}

/// A `while .. do .. end` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub while_token: Token,
    pub cond: Expr,
    pub do_token: Token,
    pub body: Block,
    pub end_token: Token,
}

/// A `repeat .. until ..` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatStmt {
    pub repeat_token: Token,
    pub body: Block,
    pub until_token: Token,
    pub cond: Expr,
}

/// A `local` variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVarStmt {
    pub local_token: Token,
    pub names: NameList,
    /// The `=`; invalid exactly when `values` is `None`.
    pub assign_token: Token,
    pub values: Option<ExprList>,
}

/// A `local function name ...` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFunctionStmt {
    pub local_token: Token,
    /// The function name. Lexically located after `func.func_token`.
    pub name_token: Token,
    pub func: FunctionExpr,
}

/// A `function a.b.c:method ...` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionStmt {
    /// The function name chain. Lexically located after `func.func_token`.
    pub name: FuncNameList,
    pub func: FunctionExpr,
}

/// A `break` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakStmt {
    pub break_token: Token,
}

/// A `return` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    pub return_token: Token,
    /// The returned expressions; `None` when the statement is bare.
    pub values: Option<ExprList>,
}

// ---------------------------------------------------------------------------
// Token endpoints

impl File {
    /// Returns the first token of the file, or the EOF token when the body
    /// is empty.
    #[must_use]
    pub fn first_token(&self) -> &Token {
        self.body.first_token().unwrap_or(&self.eof_token)
    }

    /// Returns the last token of the file, which is always the EOF token.
    #[must_use]
    pub fn last_token(&self) -> &Token {
        &self.eof_token
    }

    /// Returns the offset at which the file's content starts.
    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.first_token().start_offset()
    }

    /// Returns the offset following the file's content.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.last_token().end_offset()
    }
}

impl Block {
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        self.items.first().map(Stmt::first_token)
    }

    #[must_use]
    pub fn last_token(&self) -> Option<&Token> {
        let last = self.items.len().checked_sub(1)?;
        match self.seps.get(last) {
            Some(sep) if sep.kind.is_valid() => Some(sep),
            _ => Some(self.items[last].last_token()),
        }
    }
}

impl ExprList {
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        self.items.first().map(Expr::first_token)
    }

    #[must_use]
    pub fn last_token(&self) -> Option<&Token> {
        self.items.last().map(Expr::last_token)
    }
}

impl NameList {
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        self.items.first()
    }

    #[must_use]
    pub fn last_token(&self) -> Option<&Token> {
        self.items.last()
    }
}

impl EntryList {
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        self.items.first().map(Entry::first_token)
    }

    #[must_use]
    pub fn last_token(&self) -> Option<&Token> {
        let last = self.items.len().checked_sub(1)?;
        if self.seps.len() == self.items.len() {
            self.seps.last()
        } else {
            Some(self.items[last].last_token())
        }
    }
}

impl FuncNameList {
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        self.items.first()
    }

    #[must_use]
    pub fn last_token(&self) -> Option<&Token> {
        if self.method_token.kind.is_valid() {
            Some(&self.method_token)
        } else {
            self.items.last()
        }
    }
}

impl Expr {
    /// Returns the first token of the expression.
    #[must_use]
    pub fn first_token(&self) -> &Token {
        match self {
            Self::Number(e) => &e.number_token,
            Self::String(e) => &e.string_token,
            Self::Nil(e) => &e.nil_token,
            Self::Bool(e) => &e.bool_token,
            Self::Vararg(e) => &e.vararg_token,
            Self::Variable(e) => &e.name_token,
            Self::Unop(e) => &e.unop_token,
            Self::Binop(e) => e.left.first_token(),
            Self::Paren(e) => &e.lparen_token,
            Self::Table(e) => &e.lbrace_token,
            Self::Function(e) => &e.func_token,
            Self::Field(e) => e.value.first_token(),
            Self::Index(e) => e.value.first_token(),
            Self::Method(e) => e.value.first_token(),
            Self::Call(e) => e.value.first_token(),
        }
    }

    /// Returns the last token of the expression.
    #[must_use]
    pub fn last_token(&self) -> &Token {
        match self {
            Self::Number(e) => &e.number_token,
            Self::String(e) => &e.string_token,
            Self::Nil(e) => &e.nil_token,
            Self::Bool(e) => &e.bool_token,
            Self::Vararg(e) => &e.vararg_token,
            Self::Variable(e) => &e.name_token,
            Self::Unop(e) => e.operand.last_token(),
            Self::Binop(e) => e.right.last_token(),
            Self::Paren(e) => &e.rparen_token,
            Self::Table(e) => &e.rbrace_token,
            Self::Function(e) => &e.end_token,
            Self::Field(e) => &e.name_token,
            Self::Index(e) => &e.rbrack_token,
            Self::Method(e) => e.args.last_token(),
            Self::Call(e) => e.args.last_token(),
        }
    }

    /// Returns the offset at the start of the expression, prefix included.
    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.first_token().start_offset()
    }

    /// Returns the offset following the end of the expression.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.last_token().end_offset()
    }
}

impl Entry {
    #[must_use]
    pub fn first_token(&self) -> &Token {
        match self {
            Self::Index(e) => &e.lbrack_token,
            Self::Field(e) => &e.name_token,
            Self::Value(e) => e.value.first_token(),
        }
    }

    #[must_use]
    pub fn last_token(&self) -> &Token {
        match self {
            Self::Index(e) => e.value.last_token(),
            Self::Field(e) => e.value.last_token(),
            Self::Value(e) => e.value.last_token(),
        }
    }
}

impl Args {
    #[must_use]
    pub fn first_token(&self) -> &Token {
        match self {
            Self::List(a) => &a.lparen_token,
            Self::Table(a) => &a.value.lbrace_token,
            Self::String(a) => &a.value.string_token,
        }
    }

    #[must_use]
    pub fn last_token(&self) -> &Token {
        match self {
            Self::List(a) => &a.rparen_token,
            Self::Table(a) => &a.value.rbrace_token,
            Self::String(a) => &a.value.string_token,
        }
    }
}

impl Stmt {
    /// Returns the first token of the statement.
    #[must_use]
    pub fn first_token(&self) -> &Token {
        match self {
            Self::Do(s) => &s.do_token,
            Self::Assign(s) => s
                .left
                .first_token()
                .unwrap_or(&s.assign_token),
            Self::Call(s) => s.call.first_token(),
            Self::If(s) => &s.if_token,
            Self::NumericFor(s) => &s.for_token,
            Self::GenericFor(s) => &s.for_token,
            Self::While(s) => &s.while_token,
            Self::Repeat(s) => &s.repeat_token,
            Self::LocalVar(s) => &s.local_token,
            Self::LocalFunction(s) => &s.local_token,
            Self::Function(s) => &s.func.func_token,
            Self::Break(s) => &s.break_token,
            Self::Return(s) => &s.return_token,
        }
    }

    /// Returns the last token of the statement.
    #[must_use]
    pub fn last_token(&self) -> &Token {
        match self {
            Self::Do(s) => &s.end_token,
            Self::Assign(s) => s
                .right
                .last_token()
                .unwrap_or(&s.assign_token),
            Self::Call(s) => s.call.last_token(),
            Self::If(s) => &s.end_token,
            Self::NumericFor(s) => &s.end_token,
            Self::GenericFor(s) => &s.end_token,
            Self::While(s) => &s.end_token,
            Self::Repeat(s) => s.cond.last_token(),
            Self::LocalVar(s) => match &s.values {
                Some(values) => values.last_token().unwrap_or(&s.assign_token),
                None => s.names.last_token().unwrap_or(&s.local_token),
            },
            Self::LocalFunction(s) => &s.func.end_token,
            Self::Function(s) => &s.func.end_token,
            Self::Break(s) => &s.break_token,
            Self::Return(s) => match &s.values {
                Some(values) => values.last_token().unwrap_or(&s.return_token),
                None => &s.return_token,
            },
        }
    }

    /// Returns the offset at the start of the statement, prefix included.
    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.first_token().start_offset()
    }

    /// Returns the offset following the end of the statement.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.last_token().end_offset()
    }
}

// ---------------------------------------------------------------------------
// Validity

fn is_kind(tok: &Token, kind: TokenKind) -> bool {
    tok.kind == kind
}

fn is_kind2(tok: &Token, a: TokenKind, b: TokenKind) -> bool {
    tok.kind == a || tok.kind == b
}

impl File {
    /// Returns whether the node is well-formed, child nodes excluded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_kind(&self.eof_token, TokenKind::Eof)
    }
}

impl Block {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.seps.len() == self.items.len()
            && self
                .seps
                .iter()
                .all(|sep| is_kind2(sep, TokenKind::Semicolon, TokenKind::Invalid))
    }
}

impl ExprList {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.items.is_empty()
            && self.seps.len() == self.items.len() - 1
            && self.seps.iter().all(|sep| is_kind(sep, TokenKind::Comma))
    }
}

impl NameList {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.items.is_empty()
            && self.seps.len() == self.items.len() - 1
            && self.items.iter().all(|name| is_kind(name, TokenKind::Name))
            && self.seps.iter().all(|sep| is_kind(sep, TokenKind::Comma))
    }
}

impl EntryList {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (self.seps.len() == self.items.len() || self.items.len() == self.seps.len() + 1)
            && self
                .seps
                .iter()
                .all(|sep| is_kind2(sep, TokenKind::Comma, TokenKind::Semicolon))
    }
}

impl FuncNameList {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.items.is_empty() || self.seps.len() != self.items.len() - 1 {
            return false;
        }
        if !self.items.iter().all(|name| is_kind(name, TokenKind::Name)) {
            return false;
        }
        if !self.seps.iter().all(|sep| is_kind(sep, TokenKind::Dot)) {
            return false;
        }
        // The colon and method come in pairs.
        if is_kind(&self.colon_token, TokenKind::Colon) {
            is_kind(&self.method_token, TokenKind::Name)
        } else if is_kind(&self.colon_token, TokenKind::Invalid) {
            is_kind(&self.method_token, TokenKind::Invalid)
        } else {
            false
        }
    }
}

impl Expr {
    /// Returns whether the node is well-formed, child nodes excluded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Number(e) => e.number_token.kind.is_number(),
            Self::String(e) => e.string_token.kind.is_string(),
            Self::Nil(e) => is_kind(&e.nil_token, TokenKind::Nil),
            Self::Bool(e) => e.bool_token.kind.is_bool(),
            Self::Vararg(e) => is_kind(&e.vararg_token, TokenKind::Vararg),
            Self::Variable(e) => is_kind(&e.name_token, TokenKind::Name),
            Self::Unop(e) => e.unop_token.kind.is_unary(),
            Self::Binop(e) => e.binop_token.kind.is_binary(),
            Self::Paren(e) => {
                is_kind(&e.lparen_token, TokenKind::LParen)
                    && is_kind(&e.rparen_token, TokenKind::RParen)
            }
            Self::Table(e) => e.is_valid(),
            Self::Function(e) => e.is_valid(),
            Self::Field(e) => {
                is_kind(&e.dot_token, TokenKind::Dot) && is_kind(&e.name_token, TokenKind::Name)
            }
            Self::Index(e) => {
                is_kind(&e.lbrack_token, TokenKind::LBrack)
                    && is_kind(&e.rbrack_token, TokenKind::RBrack)
            }
            Self::Method(e) => {
                is_kind(&e.colon_token, TokenKind::Colon)
                    && is_kind(&e.name_token, TokenKind::Name)
            }
            Self::Call(_) => true,
        }
    }
}

impl TableCtor {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_kind(&self.lbrace_token, TokenKind::LBrace)
            && is_kind(&self.rbrace_token, TokenKind::RBrace)
    }
}

impl FunctionExpr {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if !(is_kind(&self.func_token, TokenKind::Function)
            && is_kind(&self.lparen_token, TokenKind::LParen)
            && is_kind(&self.rparen_token, TokenKind::RParen)
            && is_kind(&self.end_token, TokenKind::End))
        {
            return false;
        }
        if is_kind(&self.vararg_token, TokenKind::Vararg) {
            if self.params.is_some() {
                is_kind(&self.vararg_sep_token, TokenKind::Comma)
            } else {
                is_kind(&self.vararg_sep_token, TokenKind::Invalid)
            }
        } else if is_kind(&self.vararg_token, TokenKind::Invalid) {
            is_kind(&self.vararg_sep_token, TokenKind::Invalid)
        } else {
            false
        }
    }
}

impl Entry {
    /// Returns whether the node is well-formed, child nodes excluded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Index(e) => {
                is_kind(&e.lbrack_token, TokenKind::LBrack)
                    && is_kind(&e.rbrack_token, TokenKind::RBrack)
                    && is_kind(&e.assign_token, TokenKind::Assign)
            }
            Self::Field(e) => {
                is_kind(&e.name_token, TokenKind::Name)
                    && is_kind(&e.assign_token, TokenKind::Assign)
            }
            Self::Value(_) => true,
        }
    }
}

impl Args {
    /// Returns whether the node is well-formed, child nodes excluded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::List(a) => {
                is_kind(&a.lparen_token, TokenKind::LParen)
                    && is_kind(&a.rparen_token, TokenKind::RParen)
            }
            Self::Table(a) => a.value.is_valid(),
            Self::String(a) => a.value.string_token.kind.is_string(),
        }
    }
}

impl Stmt {
    /// Returns whether the node is well-formed, child nodes excluded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Do(s) => {
                is_kind(&s.do_token, TokenKind::Do) && is_kind(&s.end_token, TokenKind::End)
            }
            Self::Assign(s) => s.is_valid(),
            Self::Call(s) => s.call.is_call(),
            Self::If(s) => {
                is_kind(&s.if_token, TokenKind::If)
                    && is_kind(&s.then_token, TokenKind::Then)
                    && is_kind(&s.end_token, TokenKind::End)
            }
            Self::NumericFor(s) => s.is_valid(),
            Self::GenericFor(s) => s.is_valid(),
            Self::While(s) => {
                is_kind(&s.while_token, TokenKind::While)
                    && is_kind(&s.do_token, TokenKind::Do)
                    && is_kind(&s.end_token, TokenKind::End)
            }
            Self::Repeat(s) => {
                is_kind(&s.repeat_token, TokenKind::Repeat)
                    && is_kind(&s.until_token, TokenKind::Until)
            }
            Self::LocalVar(s) => {
                if !is_kind(&s.local_token, TokenKind::Local) {
                    return false;
                }
                // The assign token and the values come in pairs.
                if is_kind(&s.assign_token, TokenKind::Assign) {
                    s.values.is_some()
                } else if is_kind(&s.assign_token, TokenKind::Invalid) {
                    s.values.is_none()
                } else {
                    false
                }
            }
            Self::LocalFunction(s) => {
                is_kind(&s.local_token, TokenKind::Local)
                    && is_kind(&s.name_token, TokenKind::Name)
            }
            Self::Function(_) => true,
            Self::Break(s) => is_kind(&s.break_token, TokenKind::Break),
            Self::Return(s) => is_kind(&s.return_token, TokenKind::Return),
        }
    }
}

impl ElseIfClause {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_kind(&self.else_if_token, TokenKind::ElseIf)
            && is_kind(&self.then_token, TokenKind::Then)
    }
}

impl ElseClause {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_kind(&self.else_token, TokenKind::Else)
    }
}

impl NumericForStmt {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if !(is_kind(&self.for_token, TokenKind::For)
            && is_kind(&self.name_token, TokenKind::Name)
            && is_kind(&self.assign_token, TokenKind::Assign)
            && is_kind(&self.max_sep_token, TokenKind::Comma)
            && is_kind(&self.do_token, TokenKind::Do)
            && is_kind(&self.end_token, TokenKind::End))
        {
            return false;
        }
        // The step separator and the step come in pairs.
        if is_kind(&self.step_sep_token, TokenKind::Comma) {
            self.step.is_some()
        } else if is_kind(&self.step_sep_token, TokenKind::Invalid) {
            self.step.is_none()
        } else {
            false
        }
    }
}

impl GenericForStmt {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_kind(&self.for_token, TokenKind::For)
            && is_kind(&self.in_token, TokenKind::In)
            && is_kind(&self.do_token, TokenKind::Do)
            && is_kind(&self.end_token, TokenKind::End)
    }
}

impl AssignStmt {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_kind(&self.assign_token, TokenKind::Assign)
    }
}

// ---------------------------------------------------------------------------
// Literal values

impl NumberExpr {
    /// Parses the token's content into a number value. Returns `None` when
    /// the bytes do not form a valid literal of the token's kind.
    #[must_use]
    pub fn parse_value(&self) -> Option<f64> {
        match self.number_token.kind {
            TokenKind::NumberFloat => std::str::from_utf8(&self.number_token.bytes)
                .ok()?
                .parse()
                .ok(),
            TokenKind::NumberHex => {
                let digits = self.number_token.bytes.get(2..)?;
                let digits = std::str::from_utf8(digits).ok()?;
                u32::from_str_radix(digits, 16).ok().map(f64::from)
            }
            _ => None,
        }
    }

    /// Formats the absolute value of `v` into the token's bytes, keeping
    /// the token's kind: the shortest float spelling for a float token, a
    /// `0x` spelling for a hex token.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "hex literals are defined as 32-bit unsigned values"
    )]
    pub fn format_value(&mut self, v: f64) {
        let v = v.abs();
        match self.number_token.kind {
            TokenKind::NumberFloat => {
                self.number_token.bytes = EcoVec::from(format!("{v}").as_bytes());
            }
            TokenKind::NumberHex => {
                self.number_token.bytes =
                    EcoVec::from(format!("0x{:x}", v as u32).as_bytes());
            }
            _ => {}
        }
    }
}

/// Decodes the content of a quoted string literal.
fn parse_quoted_string(b: &[u8]) -> Vec<u8> {
    if b.len() < 2 {
        return Vec::new();
    }
    // Trim the quotes.
    let b = &b[1..b.len() - 1];
    let mut out = Vec::with_capacity(b.len());
    let mut i = 0;
    while i < b.len() {
        let mut ch = b[i];
        if ch == b'\\' && i + 1 < b.len() {
            i += 1;
            ch = b[i];
            match ch {
                b'a' => ch = 0x07,
                b'b' => ch = 0x08,
                b'f' => ch = 0x0c,
                b'n' => ch = b'\n',
                b'r' => ch = b'\r',
                b't' => ch = b'\t',
                b'v' => ch = 0x0b,
                b'0'..=b'9' => {
                    let mut n = 0u16;
                    let mut digits = 0;
                    while digits < 3 && i < b.len() && b[i].is_ascii_digit() {
                        n = n * 10 + u16::from(b[i] - b'0');
                        i += 1;
                        digits += 1;
                    }
                    // Overflow was already reported by the scanner.
                    out.push(n as u8);
                    continue;
                }
                _ => {}
            }
        }
        out.push(ch);
        i += 1;
    }
    out
}

/// Decodes the content of a long string literal.
fn parse_long_string(b: &[u8]) -> Vec<u8> {
    // Count the level of the opening bracket.
    let eq = b.get(1..).map_or(0, |rest| {
        rest.iter().take_while(|&&c| c == b'=').count()
    });
    let start = (eq + 2).min(b.len());
    let end = b.len().saturating_sub(eq + 2).max(start);
    let mut content = &b[start..end];
    // One leading newline is not part of the value; a two-character mixed
    // newline counts as one.
    if content.first().is_some_and(|&c| c == b'\n' || c == b'\r') {
        let mut skip = 1;
        if content.len() > 1
            && (content[1] == b'\n' || content[1] == b'\r')
            && content[1] != content[0]
        {
            skip = 2;
        }
        content = &content[skip..];
    }
    content.to_vec()
}

/// Encodes a value as a quoted string literal: double quotes around the
/// content, with quotes, backslashes, newlines and NUL escaped.
fn format_quoted_string(src: &[u8]) -> EcoVec<u8> {
    let mut out = EcoVec::with_capacity(src.len() + 2);
    out.push(b'"');
    for &c in src {
        match c {
            0 => {
                out.push(b'\\');
                out.push(b'0');
            }
            b'\n' | b'"' | b'\\' => {
                out.push(b'\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push(b'"');
    out
}

/// Encodes a value in the shortest long brackets that do not collide with
/// its content, optionally with a leading newline (which the scanner will
/// skip when reading the value back).
fn format_long_string(src: &[u8], leading_newline: bool) -> EcoVec<u8> {
    // Find the smallest closing level absent from the content. A trailing
    // `]=*` run collides too: the closing bracket would complete it.
    let mut eq = 0;
    'level: loop {
        let mut i = 0;
        while i < src.len() {
            if src[i] == b']' {
                let run = src[i + 1..].iter().take_while(|&&c| c == b'=').count();
                if run == eq && matches!(src.get(i + 1 + run), Some(&b']') | None) {
                    eq += 1;
                    continue 'level;
                }
                i += 1 + run;
            } else {
                i += 1;
            }
        }
        break;
    }

    let newline = leading_newline || src.first().is_some_and(|&c| c == b'\n' || c == b'\r');
    let mut out = EcoVec::with_capacity(src.len() + 2 * (eq + 2) + 1);
    out.push(b'[');
    for _ in 0..eq {
        out.push(b'=');
    }
    out.push(b'[');
    if newline {
        out.push(b'\n');
    }
    out.extend_from_slice(src);
    out.push(b']');
    for _ in 0..eq {
        out.push(b'=');
    }
    out.push(b']');
    out
}

impl StringExpr {
    /// Parses the token's content into the string value it denotes: quotes
    /// or long brackets stripped, escapes decoded, and the leading newline
    /// of a long string skipped. Returns `None` for a non-string token.
    #[must_use]
    pub fn parse_value(&self) -> Option<Vec<u8>> {
        match self.string_token.kind {
            TokenKind::String => Some(parse_quoted_string(&self.string_token.bytes)),
            TokenKind::LongString => Some(parse_long_string(&self.string_token.bytes)),
            _ => None,
        }
    }

    /// Formats a value into the token's bytes, keeping the token's kind:
    /// a safely escaped quoted string, or the shortest non-colliding long
    /// brackets. For a long string, `leading_newline` requests a cosmetic
    /// newline after the opening bracket.
    pub fn format_value(&mut self, value: &[u8], leading_newline: bool) {
        match self.string_token.kind {
            TokenKind::String => {
                self.string_token.bytes = format_quoted_string(value);
            }
            TokenKind::LongString => {
                self.string_token.bytes = format_long_string(value, leading_newline);
            }
            _ => {}
        }
    }
}

impl BoolExpr {
    /// Returns the boolean value of the token, or `None` for a non-boolean
    /// token.
    #[must_use]
    pub fn parse_value(&self) -> Option<bool> {
        match self.bool_token.kind {
            TokenKind::True => Some(true),
            TokenKind::False => Some(false),
            _ => None,
        }
    }

    /// Sets the kind and bytes of the token from a boolean value.
    pub fn format_value(&mut self, v: bool) {
        self.bool_token.kind = if v { TokenKind::True } else { TokenKind::False };
        self.bool_token.bytes = EcoVec::from(self.bool_token.kind.to_string().as_bytes());
    }
}
