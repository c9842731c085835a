// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement parsing.
//!
//! Statements dispatch on the current token kind. Anything that is not a
//! keyword-led statement is an expression statement: a primary expression
//! that either is a call (and stands alone) or begins the left side of a
//! multiple assignment. `return` and `break` are "last" statements — they
//! terminate the enclosing block.

use crate::ast::{
    AssignStmt, Block, BreakStmt, CallStmt, DoStmt, ElseClause, ElseIfClause, ExprList,
    FuncNameList, FunctionExpr, FunctionStmt, GenericForStmt, IfStmt, LocalFunctionStmt,
    LocalVarStmt, NameList, NumericForStmt, RepeatStmt, ReturnStmt, Stmt, Token, WhileStmt,
};
use crate::source_analysis::{SyntaxError, SyntaxErrorKind, TokenKind};

use super::Parser;

/// Which production a function body is being parsed for. The name shapes
/// differ: none for an expression, a single name for `local function`, and
/// a dotted chain with an optional method for a `function` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionForm {
    Expr,
    Local,
    Stmt,
}

impl Parser<'_> {
    /// Parses a block terminated by the given token kind. The terminator is
    /// not consumed.
    fn parse_block_body(&mut self, term: TokenKind) -> Result<Block, SyntaxError> {
        let block = self.parse_block()?;
        self.expect(term)?;
        Ok(block)
    }

    /// Parses a `do ... end` statement.
    fn parse_do_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let do_token = self.expect_token(TokenKind::Do)?;
        let body = self.parse_block_body(TokenKind::End)?;
        let end_token = self.expect_token(TokenKind::End)?;
        Ok(Stmt::Do(DoStmt {
            do_token,
            body,
            end_token,
        }))
    }

    /// Parses a `while` statement.
    fn parse_while_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let while_token = self.expect_token(TokenKind::While)?;
        let cond = self.parse_expr()?;
        let do_token = self.expect_token(TokenKind::Do)?;
        let body = self.parse_block_body(TokenKind::End)?;
        let end_token = self.expect_token(TokenKind::End)?;
        Ok(Stmt::While(WhileStmt {
            while_token,
            cond,
            do_token,
            body,
            end_token,
        }))
    }

    /// Parses a `repeat` statement.
    fn parse_repeat_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let repeat_token = self.expect_token(TokenKind::Repeat)?;
        let body = self.parse_block_body(TokenKind::Until)?;
        let until_token = self.expect_token(TokenKind::Until)?;
        let cond = self.parse_expr()?;
        Ok(Stmt::Repeat(RepeatStmt {
            repeat_token,
            body,
            until_token,
            cond,
        }))
    }

    /// Parses an `if` statement with its clauses.
    fn parse_if_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let if_token = self.expect_token(TokenKind::If)?;
        let cond = self.parse_expr()?;
        let then_token = self.expect_token(TokenKind::Then)?;
        let body = self.parse_block()?;
        let mut else_if = Vec::new();
        while self.kind() == TokenKind::ElseIf {
            let else_if_token = self.expect_token(TokenKind::ElseIf)?;
            let cond = self.parse_expr()?;
            let then_token = self.expect_token(TokenKind::Then)?;
            let body = self.parse_block()?;
            else_if.push(ElseIfClause {
                else_if_token,
                cond,
                then_token,
                body,
            });
        }
        let else_clause = if self.kind() == TokenKind::Else {
            Some(ElseClause {
                else_token: self.expect_token(TokenKind::Else)?,
                body: self.parse_block()?,
            })
        } else {
            None
        };
        let end_token = self.expect_token(TokenKind::End)?;
        Ok(Stmt::If(IfStmt {
            if_token,
            cond,
            then_token,
            body,
            else_if,
            else_clause,
            end_token,
        }))
    }

    /// Parses a numeric or generic `for` statement. The branch is decided
    /// by the token after the first name: `=` for numeric, `,` or `in` for
    /// generic.
    fn parse_for_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let for_token = self.expect_token(TokenKind::For)?;
        let name = self.expect_token(TokenKind::Name)?;
        match self.kind() {
            TokenKind::Assign => {
                let assign_token = self.expect_token(TokenKind::Assign)?;
                let min = self.parse_expr()?;
                let max_sep_token = self.expect_token(TokenKind::Comma)?;
                let max = self.parse_expr()?;
                let (step_sep_token, step) = if self.kind() == TokenKind::Comma {
                    (self.expect_token(TokenKind::Comma)?, Some(self.parse_expr()?))
                } else {
                    (Token::invalid(), None)
                };
                let do_token = self.expect_token(TokenKind::Do)?;
                let body = self.parse_block_body(TokenKind::End)?;
                let end_token = self.expect_token(TokenKind::End)?;
                Ok(Stmt::NumericFor(NumericForStmt {
                    for_token,
                    name_token: name,
                    assign_token,
                    min,
                    max_sep_token,
                    max,
                    step_sep_token,
                    step,
                    do_token,
                    body,
                    end_token,
                }))
            }
            TokenKind::Comma | TokenKind::In => {
                let mut names = NameList {
                    items: vec![name],
                    seps: Vec::new(),
                };
                while self.kind() == TokenKind::Comma {
                    names.seps.push(self.token_next());
                    names.items.push(self.expect_token(TokenKind::Name)?);
                }
                let in_token = self.expect_token(TokenKind::In)?;
                let iterator = self.parse_expr_list()?;
                let do_token = self.expect_token(TokenKind::Do)?;
                let body = self.parse_block_body(TokenKind::End)?;
                let end_token = self.expect_token(TokenKind::End)?;
                Ok(Stmt::GenericFor(GenericForStmt {
                    for_token,
                    names,
                    in_token,
                    iterator,
                    do_token,
                    body,
                    end_token,
                }))
            }
            _ => self.error(self.state.off, SyntaxErrorKind::ForAssignOrInExpected),
        }
    }

    /// Parses a function body, with a name shaped by `form`.
    pub(super) fn parse_function(
        &mut self,
        form: FunctionForm,
    ) -> Result<(FunctionExpr, FuncNameList), SyntaxError> {
        let func_token = self.expect_token(TokenKind::Function)?;
        let mut names = FuncNameList::default();
        if form != FunctionForm::Expr {
            names.items.push(self.expect_token(TokenKind::Name)?);
            if form == FunctionForm::Stmt {
                while self.kind() == TokenKind::Dot {
                    names.seps.push(self.token_next());
                    names.items.push(self.expect_token(TokenKind::Name)?);
                }
                if self.kind() == TokenKind::Colon {
                    names.colon_token = self.token_next();
                    names.method_token = self.expect_token(TokenKind::Name)?;
                }
            }
        }

        let lparen_token = self.expect_token(TokenKind::LParen)?;
        let mut params: Option<NameList> = None;
        let mut vararg_sep_token = Token::invalid();
        let mut vararg_token = Token::invalid();
        if self.kind() == TokenKind::Name {
            let mut list = NameList {
                items: vec![self.expect_token(TokenKind::Name)?],
                seps: Vec::new(),
            };
            while self.kind() == TokenKind::Comma {
                let sep = self.token_next();
                if self.kind() == TokenKind::Vararg {
                    vararg_sep_token = sep;
                    vararg_token = self.token_next();
                    break;
                }
                list.seps.push(sep);
                list.items.push(self.expect_token(TokenKind::Name)?);
            }
            params = Some(list);
        } else if self.kind() == TokenKind::Vararg {
            vararg_token = self.token_next();
        }
        let rparen_token = self.expect_token(TokenKind::RParen)?;
        let body = self.parse_block_body(TokenKind::End)?;
        let end_token = self.expect_token(TokenKind::End)?;

        Ok((
            FunctionExpr {
                func_token,
                lparen_token,
                params,
                vararg_sep_token,
                vararg_token,
                rparen_token,
                body,
                end_token,
            },
            names,
        ))
    }

    /// Parses a `local` statement: either a local function or a local
    /// variable list.
    fn parse_local_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let local_token = self.expect_token(TokenKind::Local)?;
        if self.kind() == TokenKind::Function {
            let (func, mut names) = self.parse_function(FunctionForm::Local)?;
            let name_token = names.items.pop().unwrap_or_default();
            return Ok(Stmt::LocalFunction(LocalFunctionStmt {
                local_token,
                name_token,
                func,
            }));
        }
        let mut names = NameList {
            items: vec![self.expect_token(TokenKind::Name)?],
            seps: Vec::new(),
        };
        while self.kind() == TokenKind::Comma {
            names.seps.push(self.token_next());
            names.items.push(self.expect_token(TokenKind::Name)?);
        }
        let (assign_token, values) = if self.kind() == TokenKind::Assign {
            (self.token_next(), Some(self.parse_expr_list()?))
        } else {
            (Token::invalid(), None)
        };
        Ok(Stmt::LocalVar(LocalVarStmt {
            local_token,
            names,
            assign_token,
            values,
        }))
    }

    /// Parses a `function name ...` statement.
    fn parse_function_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let (func, name) = self.parse_function(FunctionForm::Stmt)?;
        Ok(Stmt::Function(FunctionStmt { name, func }))
    }

    /// Parses a `return` statement. The expression list is present unless
    /// the statement is followed by a block terminator or a semicolon.
    fn parse_return_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let return_token = self.expect_token(TokenKind::Return)?;
        if self.is_block_follow() || self.kind() == TokenKind::Semicolon {
            return Ok(Stmt::Return(ReturnStmt {
                return_token,
                values: None,
            }));
        }
        let values = Some(self.parse_expr_list()?);
        Ok(Stmt::Return(ReturnStmt {
            return_token,
            values,
        }))
    }

    /// Parses an expression statement: a call, or an assignment.
    fn parse_expr_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let expr = self.parse_primary_expr()?;
        if expr.is_call() {
            return Ok(Stmt::Call(CallStmt { call: expr }));
        }

        let mut left = ExprList {
            items: vec![expr],
            seps: Vec::new(),
        };
        while self.kind() == TokenKind::Comma {
            left.seps.push(self.token_next());
            let expr = self.parse_primary_expr()?;
            if expr.is_call() {
                // A call cannot be assigned to.
                return self.error(self.state.off, SyntaxErrorKind::BadAssignTarget);
            }
            left.items.push(expr);
        }
        let assign_token = self.expect_token(TokenKind::Assign)?;
        let right = self.parse_expr_list()?;
        Ok(Stmt::Assign(AssignStmt {
            left,
            assign_token,
            right,
        }))
    }

    /// Parses one statement. The returned flag is true for statements that
    /// must be the last in their block.
    fn parse_stmt(&mut self) -> Result<(Stmt, bool), SyntaxError> {
        let stmt = match self.kind() {
            TokenKind::Do => self.parse_do_stmt()?,
            TokenKind::While => self.parse_while_stmt()?,
            TokenKind::Repeat => self.parse_repeat_stmt()?,
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::Function => self.parse_function_stmt()?,
            TokenKind::Local => self.parse_local_stmt()?,
            TokenKind::Return => return Ok((self.parse_return_stmt()?, true)),
            TokenKind::Break => {
                let break_token = self.expect_token(TokenKind::Break)?;
                return Ok((Stmt::Break(BreakStmt { break_token }), true));
            }
            _ => self.parse_expr_stmt()?,
        };
        Ok((stmt, false))
    }

    /// Parses a sequence of statements up to a block terminator. Each
    /// statement gets a separator slot, invalid when no semicolon follows.
    pub(super) fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let mut block = Block::default();
        let mut last = false;
        while !last && !self.is_block_follow() {
            let stmt;
            (stmt, last) = self.parse_stmt()?;
            block.items.push(stmt);
            let sep = if self.kind() == TokenKind::Semicolon {
                self.token_next()
            } else {
                Token::invalid()
            };
            block.seps.push(sep);
        }
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use crate::ast::Expr;

    fn parse_stmt(src: &[u8]) -> Stmt {
        let (file, err) = parse("stmt.lua", src);
        assert!(err.is_none(), "unexpected error in {:?}: {err:?}", src);
        file.body
            .items
            .into_iter()
            .next()
            .expect("expected one statement")
    }

    fn parse_err(src: &[u8]) -> SyntaxErrorKind {
        let (_, err) = parse("stmt.lua", src);
        err.expect("expected an error").kind
    }

    #[test]
    fn numeric_for_shapes() {
        let Stmt::NumericFor(stmt) = parse_stmt(b"for i = 1, 10 do end") else {
            panic!("expected numeric for");
        };
        assert_eq!(stmt.name_token.bytes.as_slice(), b"i");
        assert_eq!(stmt.step_sep_token.kind, TokenKind::Invalid);
        assert!(stmt.step.is_none());
        assert!(stmt.is_valid());

        let Stmt::NumericFor(stmt) = parse_stmt(b"for i = 1, 10, 2 do end") else {
            panic!("expected numeric for");
        };
        assert_eq!(stmt.step_sep_token.kind, TokenKind::Comma);
        assert!(stmt.step.is_some());
        assert!(stmt.is_valid());
    }

    #[test]
    fn generic_for_collects_names() {
        let Stmt::GenericFor(stmt) = parse_stmt(b"for k, v in pairs(t) do end") else {
            panic!("expected generic for");
        };
        assert_eq!(stmt.names.items.len(), 2);
        assert_eq!(stmt.iterator.items.len(), 1);
        assert!(stmt.is_valid());
    }

    #[test]
    fn for_head_requires_assign_or_in() {
        assert_eq!(
            parse_err(b"for x do end"),
            SyntaxErrorKind::ForAssignOrInExpected
        );
    }

    #[test]
    fn local_function_enables_one_name() {
        let Stmt::LocalFunction(stmt) = parse_stmt(b"local function f(a, ...) end") else {
            panic!("expected local function");
        };
        assert_eq!(stmt.name_token.bytes.as_slice(), b"f");
        assert_eq!(stmt.func.vararg_sep_token.kind, TokenKind::Comma);
        assert_eq!(stmt.func.vararg_token.kind, TokenKind::Vararg);
        assert!(stmt.func.is_valid());
    }

    #[test]
    fn function_stmt_name_chain() {
        let Stmt::Function(stmt) = parse_stmt(b"function a.b.c:m() end") else {
            panic!("expected function statement");
        };
        assert_eq!(stmt.name.items.len(), 3);
        assert_eq!(stmt.name.seps.len(), 2);
        assert_eq!(stmt.name.colon_token.kind, TokenKind::Colon);
        assert_eq!(stmt.name.method_token.bytes.as_slice(), b"m");
        assert!(stmt.name.is_valid());

        let Stmt::Function(stmt) = parse_stmt(b"function f() end") else {
            panic!("expected function statement");
        };
        assert_eq!(stmt.name.items.len(), 1);
        assert_eq!(stmt.name.colon_token.kind, TokenKind::Invalid);
        assert!(stmt.name.is_valid());
    }

    #[test]
    fn vararg_only_parameters() {
        let Stmt::Function(stmt) = parse_stmt(b"function f(...) end") else {
            panic!("expected function statement");
        };
        assert!(stmt.func.params.is_none());
        assert_eq!(stmt.func.vararg_token.kind, TokenKind::Vararg);
        assert_eq!(stmt.func.vararg_sep_token.kind, TokenKind::Invalid);
        assert!(stmt.func.is_valid());
    }

    #[test]
    fn return_without_values() {
        let Stmt::Return(stmt) = parse_stmt(b"return") else {
            panic!("expected return");
        };
        assert!(stmt.values.is_none());

        let Stmt::Return(stmt) = parse_stmt(b"return;") else {
            panic!("expected return");
        };
        assert!(stmt.values.is_none());

        let Stmt::Return(stmt) = parse_stmt(b"return 1, 2") else {
            panic!("expected return");
        };
        assert_eq!(stmt.values.map(|v| v.items.len()), Some(2));
    }

    #[test]
    fn return_terminates_block() {
        let (_, err) = parse("stmt.lua", b"return 1\nx = 2");
        // The statement after `return` is unreachable; the parser stops the
        // block and then trips over the trailing tokens.
        assert!(err.is_some());
    }

    #[test]
    fn call_statement_vs_assignment() {
        let Stmt::Call(stmt) = parse_stmt(b"f(1)") else {
            panic!("expected call statement");
        };
        assert!(stmt.call.is_call());

        let Stmt::Call(stmt) = parse_stmt(b"t:m'arg'") else {
            panic!("expected method call statement");
        };
        assert!(matches!(stmt.call, Expr::Method(_)));

        let Stmt::Assign(stmt) = parse_stmt(b"a, b.c = 1, 2") else {
            panic!("expected assignment");
        };
        assert_eq!(stmt.left.items.len(), 2);
        assert_eq!(stmt.right.items.len(), 2);
        assert!(stmt.is_valid());
    }

    #[test]
    fn call_in_assignment_left_side_is_rejected() {
        assert_eq!(parse_err(b"a, f() = 1"), SyntaxErrorKind::BadAssignTarget);
    }

    #[test]
    fn bare_name_needs_assignment() {
        assert_eq!(
            parse_err(b"x"),
            SyntaxErrorKind::TokenExpected(TokenKind::Assign)
        );
    }
}
