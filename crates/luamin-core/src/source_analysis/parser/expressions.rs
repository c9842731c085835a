// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing.
//!
//! Expressions are parsed by [`Parser::parse_subexpr`], a Pratt loop over
//! the binary-operator priorities of [`TokenKind::precedence`]: an operator
//! is consumed while its left priority exceeds the caller's limit, and its
//! right side is parsed with the operator's right priority as the new
//! limit. `^` and `..` have a lower right priority than left, which makes
//! them right-associative.
//!
//! Primary expressions (a parenthesized expression or a name followed by a
//! chain of field/index/method/call suffixes) are shared with statement
//! parsing: an expression statement starts as a primary expression and is
//! then classified as a call or as the left side of an assignment.

use crate::ast::{
    Args, BinopExpr, BoolExpr, CallExpr, Entry, EntryList, Expr, ExprList, FieldEntry, FieldExpr,
    IndexEntry, IndexExpr, ListArgs, MethodExpr, NilExpr, NumberExpr, ParenExpr, StringArg,
    StringExpr, TableArg, TableCtor, UnopExpr, ValueEntry, VarargExpr, VariableExpr,
};
use crate::source_analysis::token::UNARY_PRECEDENCE;
use crate::source_analysis::{SyntaxError, SyntaxErrorKind, TokenKind};

use super::{FunctionForm, Parser};

impl Parser<'_> {
    /// Parses a number literal.
    pub(super) fn parse_number(&mut self) -> Result<NumberExpr, SyntaxError> {
        if !self.kind().is_number() {
            return self.error(
                self.state.off,
                SyntaxErrorKind::TokenExpected(TokenKind::NumberFloat),
            );
        }
        Ok(NumberExpr {
            number_token: self.token_next(),
        })
    }

    /// Parses a string literal.
    pub(super) fn parse_string(&mut self) -> Result<StringExpr, SyntaxError> {
        if !self.kind().is_string() {
            return self.error(
                self.state.off,
                SyntaxErrorKind::TokenExpected(TokenKind::String),
            );
        }
        Ok(StringExpr {
            string_token: self.token_next(),
        })
    }

    /// Parses a simple expression: a literal, table constructor, anonymous
    /// function, or a primary expression.
    fn parse_simple_expr(&mut self) -> Result<Expr, SyntaxError> {
        match self.kind() {
            TokenKind::NumberFloat | TokenKind::NumberHex => {
                Ok(Expr::Number(self.parse_number()?))
            }
            TokenKind::String | TokenKind::LongString => Ok(Expr::String(self.parse_string()?)),
            TokenKind::Nil => Ok(Expr::Nil(NilExpr {
                nil_token: self.token_next(),
            })),
            TokenKind::True | TokenKind::False => Ok(Expr::Bool(BoolExpr {
                bool_token: self.token_next(),
            })),
            TokenKind::Vararg => Ok(Expr::Vararg(VarargExpr {
                vararg_token: self.token_next(),
            })),
            TokenKind::LBrace => Ok(Expr::Table(self.parse_table_ctor()?)),
            TokenKind::Function => {
                let (func, _) = self.parse_function(FunctionForm::Expr)?;
                Ok(Expr::Function(func))
            }
            _ => self.parse_primary_expr(),
        }
    }

    /// Recursively builds an expression chain, consuming binary operators
    /// whose left priority exceeds `limit`.
    fn parse_subexpr(&mut self, limit: u8) -> Result<Expr, SyntaxError> {
        let mut expr = if self.kind().is_unary() {
            let unop_token = self.token_next();
            let operand = self.parse_subexpr(UNARY_PRECEDENCE)?;
            Expr::Unop(UnopExpr {
                unop_token,
                operand: Box::new(operand),
            })
        } else {
            self.parse_simple_expr()?
        };

        while self.kind().is_binary() {
            let Some((left, right)) = self.kind().precedence() else {
                break;
            };
            if left <= limit {
                break;
            }
            let binop_token = self.token_next();
            expr = Expr::Binop(BinopExpr {
                left: Box::new(expr),
                binop_token,
                right: Box::new(self.parse_subexpr(right)?),
            });
        }

        Ok(expr)
    }

    /// Begins parsing an expression chain.
    pub(super) fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_subexpr(0)
    }

    /// Parses a comma-separated list of one or more expressions.
    pub(super) fn parse_expr_list(&mut self) -> Result<ExprList, SyntaxError> {
        let mut list = ExprList {
            items: vec![self.parse_expr()?],
            seps: Vec::new(),
        };
        while self.kind() == TokenKind::Comma {
            list.seps.push(self.token_next());
            list.items.push(self.parse_expr()?);
        }
        Ok(list)
    }

    /// Parses the expression that begins a primary expression: a
    /// parenthesized expression or a variable name.
    fn parse_prefix_expr(&mut self) -> Result<Expr, SyntaxError> {
        match self.kind() {
            TokenKind::LParen => {
                let lparen_token = self.token_next();
                let value = Box::new(self.parse_expr()?);
                let rparen_token = self.expect_token(TokenKind::RParen)?;
                Ok(Expr::Paren(ParenExpr {
                    lparen_token,
                    value,
                    rparen_token,
                }))
            }
            TokenKind::Name => Ok(Expr::Variable(VariableExpr {
                name_token: self.token_next(),
            })),
            _ => self.error(self.state.off, SyntaxErrorKind::UnexpectedSymbol),
        }
    }

    /// Parses a primary expression: a prefix expression followed by any
    /// number of field, method, index, and call suffixes.
    pub(super) fn parse_primary_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_prefix_expr()?;
        loop {
            match self.kind() {
                TokenKind::Dot => {
                    let dot_token = self.token_next();
                    let name_token = self.expect_token(TokenKind::Name)?;
                    expr = Expr::Field(FieldExpr {
                        value: Box::new(expr),
                        dot_token,
                        name_token,
                    });
                }
                TokenKind::Colon => {
                    let colon_token = self.token_next();
                    let name_token = self.expect_token(TokenKind::Name)?;
                    let args = self.parse_func_args()?;
                    expr = Expr::Method(MethodExpr {
                        value: Box::new(expr),
                        colon_token,
                        name_token,
                        args,
                    });
                }
                TokenKind::LBrack => {
                    let lbrack_token = self.token_next();
                    let index = Box::new(self.parse_expr()?);
                    let rbrack_token = self.expect_token(TokenKind::RBrack)?;
                    expr = Expr::Index(IndexExpr {
                        value: Box::new(expr),
                        lbrack_token,
                        index,
                        rbrack_token,
                    });
                }
                TokenKind::LBrace
                | TokenKind::LParen
                | TokenKind::String
                | TokenKind::LongString => {
                    let args = self.parse_func_args()?;
                    expr = Expr::Call(CallExpr {
                        value: Box::new(expr),
                        args,
                    });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Parses the arguments of a function call.
    fn parse_func_args(&mut self) -> Result<Args, SyntaxError> {
        match self.kind() {
            TokenKind::LParen => {
                let lparen_token = self.token_next();
                let mut values: Option<ExprList> = None;
                while self.kind() != TokenKind::RParen {
                    let list = values.get_or_insert_with(ExprList::default);
                    list.items.push(self.parse_expr()?);
                    if self.kind() == TokenKind::Comma {
                        list.seps.push(self.token_next());
                    } else {
                        break;
                    }
                }
                let rparen_token = self.expect_token(TokenKind::RParen)?;
                Ok(Args::List(ListArgs {
                    lparen_token,
                    values,
                    rparen_token,
                }))
            }
            TokenKind::LBrace => Ok(Args::Table(TableArg {
                value: self.parse_table_ctor()?,
            })),
            TokenKind::String | TokenKind::LongString => Ok(Args::String(StringArg {
                value: self.parse_string()?,
            })),
            _ => self.error(self.state.off, SyntaxErrorKind::FunctionArgsExpected),
        }
    }

    /// Parses a table constructor.
    pub(super) fn parse_table_ctor(&mut self) -> Result<TableCtor, SyntaxError> {
        let lbrace_token = self.expect_token(TokenKind::LBrace)?;
        let mut entries = EntryList::default();
        while self.kind() != TokenKind::RBrace {
            let entry = if self.kind() == TokenKind::LBrack {
                let lbrack_token = self.token_next();
                let key = self.parse_expr()?;
                let rbrack_token = self.expect_token(TokenKind::RBrack)?;
                let assign_token = self.expect_token(TokenKind::Assign)?;
                let value = self.parse_expr()?;
                Entry::Index(IndexEntry {
                    lbrack_token,
                    key,
                    rbrack_token,
                    assign_token,
                    value,
                })
            } else {
                // The only use of lookahead: `name =` starts a field entry,
                // while a bare `name` is the start of a value expression.
                self.lookahead();
                if self.kind() == TokenKind::Name && self.lookahead_is(TokenKind::Assign) {
                    let name_token = self.expect_token(TokenKind::Name)?;
                    let assign_token = self.expect_token(TokenKind::Assign)?;
                    let value = self.parse_expr()?;
                    Entry::Field(FieldEntry {
                        name_token,
                        assign_token,
                        value,
                    })
                } else {
                    Entry::Value(ValueEntry {
                        value: self.parse_expr()?,
                    })
                }
            };
            entries.items.push(entry);
            if matches!(self.kind(), TokenKind::Comma | TokenKind::Semicolon) {
                entries.seps.push(self.token_next());
            } else {
                break;
            }
        }
        let rbrace_token = self.expect_token(TokenKind::RBrace)?;
        Ok(TableCtor {
            lbrace_token,
            entries,
            rbrace_token,
        })
    }
}
