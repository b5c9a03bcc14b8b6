//! Statement parsing.
//!
//! The dangling `else` binds to the nearest unmatched `then` simply because
//! `parse_if` consumes an `else` immediately when one is present. Empty
//! statements (`;;`, `; end`) parse to `None` and are dropped from statement
//! lists.

use pasc_lex::TokenKind;

use crate::ast::{CaseArm, Expr, ForDirection, Stmt};
use crate::types::literal_starts;
use crate::{Parser, Result};

impl Parser {
    /// Parses a `;`-separated statement list, dropping empty statements.
    pub(crate) fn parse_statement_list(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        if let Some(stmt) = self.parse_statement()? {
            stmts.push(stmt);
        }
        while self.eat(&TokenKind::Semicolon) {
            if let Some(stmt) = self.parse_statement()? {
                stmts.push(stmt);
            }
        }
        Ok(stmts)
    }

    /// Parses one statement, or `None` for the empty statement.
    fn parse_statement(&mut self) -> Result<Option<Stmt>> {
        let stmt = match self.peek_kind() {
            Some(TokenKind::Begin) => {
                self.advance();
                let stmts = self.parse_statement_list()?;
                self.expect(&TokenKind::End)?;
                Stmt::Compound(stmts)
            },
            Some(TokenKind::If) => self.parse_if()?,
            Some(TokenKind::While) => {
                self.advance();
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::Do)?;
                let body = self.parse_statement_or_empty()?;
                Stmt::While {
                    cond,
                    body: Box::new(body),
                }
            },
            Some(TokenKind::Repeat) => {
                self.advance();
                let body = self.parse_statement_list()?;
                self.expect(&TokenKind::Until)?;
                let cond = self.parse_expr()?;
                Stmt::Repeat { body, cond }
            },
            Some(TokenKind::For) => self.parse_for()?,
            Some(TokenKind::Case) => self.parse_case()?,
            Some(TokenKind::With) => {
                self.advance();
                let mut vars = vec![self.parse_variable()?];
                while self.eat(&TokenKind::Comma) {
                    vars.push(self.parse_variable()?);
                }
                self.expect(&TokenKind::Do)?;
                let body = self.parse_statement_or_empty()?;
                Stmt::With {
                    vars,
                    body: Box::new(body),
                }
            },
            Some(TokenKind::Goto) => {
                self.advance();
                Stmt::Goto(self.expect_int()?)
            },
            Some(TokenKind::Int(_)) if self.peek_kind_at(1) == Some(&TokenKind::Colon) => {
                let label = self.expect_int()?;
                self.expect(&TokenKind::Colon)?;
                let stmt = self.parse_statement_or_empty()?;
                Stmt::Labeled {
                    label,
                    stmt: Box::new(stmt),
                }
            },
            Some(TokenKind::Ident(_)) => self.parse_assign_or_call()?,
            _ => return Ok(None),
        };
        Ok(Some(stmt))
    }

    /// Like [`Self::parse_statement`], substituting an empty compound for
    /// the empty statement (loop and `with` bodies need a node).
    fn parse_statement_or_empty(&mut self) -> Result<Stmt> {
        Ok(self
            .parse_statement()?
            .unwrap_or(Stmt::Compound(Vec::new())))
    }

    /// `if expr then statement [else statement]`
    fn parse_if(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::If)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::Then)?;
        let then_branch = self.parse_statement_or_empty()?;

        let else_branch = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement_or_empty()?))
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    /// `for ID := expr (to|downto) expr do statement`
    fn parse_for(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::For)?;
        let var = self.expect_ident()?;
        self.expect(&TokenKind::Assign)?;
        let from = self.parse_expr()?;

        let direction = if self.eat(&TokenKind::To) {
            ForDirection::To
        } else if self.eat(&TokenKind::Downto) {
            ForDirection::Downto
        } else {
            return Err(self.unexpected());
        };

        let to = self.parse_expr()?;
        self.expect(&TokenKind::Do)?;
        let body = self.parse_statement_or_empty()?;

        Ok(Stmt::For {
            var,
            from,
            to,
            direction,
            body: Box::new(body),
        })
    }

    /// `case expr of (constant_list : statement_list ;)+ end`
    ///
    /// A statement list inside an arm ends when, after a `;`, the lookahead
    /// is `end` or a constant (the labels of the next arm).
    fn parse_case(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::Case)?;
        let scrutinee = self.parse_expr()?;
        self.expect(&TokenKind::Of)?;

        let mut arms = Vec::new();
        loop {
            let mut labels = vec![self.parse_literal()?];
            while self.eat(&TokenKind::Comma) {
                labels.push(self.parse_literal()?);
            }
            self.expect(&TokenKind::Colon)?;

            let mut body = Vec::new();
            if let Some(stmt) = self.parse_statement()? {
                body.push(stmt);
            }
            while self.eat(&TokenKind::Semicolon) {
                if self.arm_boundary() {
                    break;
                }
                if let Some(stmt) = self.parse_statement()? {
                    body.push(stmt);
                }
            }
            arms.push(CaseArm { labels, body });

            if self.eat(&TokenKind::End) {
                return Ok(Stmt::Case { scrutinee, arms });
            }
        }
    }

    /// True when the lookahead closes a case arm: `end` or the next arm's
    /// leading constant.
    fn arm_boundary(&self) -> bool {
        match self.peek_kind() {
            Some(TokenKind::End) => true,
            Some(kind) => literal_starts(kind),
            None => true,
        }
    }

    /// Assignment or procedure call, both starting with an identifier.
    ///
    /// `ID (…)` is a call with arguments; `ID` followed by `:=`, `[`, or `.`
    /// is the left-hand side of an assignment; a bare `ID` is a call without
    /// arguments.
    fn parse_assign_or_call(&mut self) -> Result<Stmt> {
        let name = self.expect_ident()?;

        match self.peek_kind() {
            Some(TokenKind::LParen) => {
                self.advance();
                let args = if self.check(&TokenKind::RParen) {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                self.expect(&TokenKind::RParen)?;
                Ok(Stmt::Call { name, args })
            },
            Some(TokenKind::Assign | TokenKind::LBracket | TokenKind::Dot) => {
                let target = self.parse_variable_suffixes(Expr::Var(name))?;
                self.expect(&TokenKind::Assign)?;
                let value = self.parse_expr()?;
                Ok(Stmt::Assign { target, value })
            },
            _ => Ok(Stmt::Call {
                name,
                args: Vec::new(),
            }),
        }
    }

    /// `variable := ID ([expr_list] | .ID)*`, an lvalue path.
    pub(crate) fn parse_variable(&mut self) -> Result<Expr> {
        let name = self.expect_ident()?;
        self.parse_variable_suffixes(Expr::Var(name))
    }

    /// Applies `[…]` and `.field` suffixes to a base lvalue.
    pub(crate) fn parse_variable_suffixes(&mut self, mut base: Expr) -> Result<Expr> {
        loop {
            match self.peek_kind() {
                Some(TokenKind::LBracket) => {
                    self.advance();
                    let indices = self.parse_expr_list()?;
                    self.expect(&TokenKind::RBracket)?;
                    base = Expr::Index {
                        base: Box::new(base),
                        indices,
                    };
                },
                Some(TokenKind::Dot) => {
                    self.advance();
                    let name = self.expect_ident()?;
                    base = Expr::Field {
                        base: Box::new(base),
                        name,
                    };
                },
                _ => return Ok(base),
            }
        }
    }
}
