//! Expression parsing (Pratt / top-down operator precedence).
//!
//! # Precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|--------------------------------|---------------|
//! | 1 | `:` (write format) | Left |
//! | 2 | `or` | Left |
//! | 3 | `and` | Left |
//! | 4 | `not` | Right (prefix) |
//! | 5 | `=`, `<>`, `<`, `<=`, `>`, `>=`, `in` | Left |
//! | 6 | `+`, `-` | Left |
//! | 7 | `*`, `/`, `div`, `mod` | Left |

use pasc_lex::TokenKind;
use pasc_util::Symbol;

use crate::ast::{BinOp, Expr};
use crate::{Parser, Result};

/// Binding power levels. Higher numbers bind tighter; left-associative
/// operators use `(bp, bp + 1)` as their (left, right) pair.
pub(crate) mod bp {
    /// Minimum binding power (start of expression).
    pub const MIN: u8 = 0;

    /// Write format operator `:`.
    pub const FORMAT: u8 = 2;

    /// Logical `or`.
    pub const OR: u8 = 4;

    /// Logical `and`.
    pub const AND: u8 = 6;

    /// Prefix `not` (operand binding power).
    pub const NOT: u8 = 9;

    /// Relational: `=`, `<>`, `<`, `<=`, `>`, `>=`, `in`.
    pub const RELATIONAL: u8 = 10;

    /// Additive: `+`, `-`.
    pub const ADDITIVE: u8 = 12;

    /// Multiplicative: `*`, `/`, `div`, `mod`.
    pub const MULTIPLICATIVE: u8 = 14;
}

/// Maps an infix token to its operator and binding powers.
fn infix_binding(kind: &TokenKind) -> Option<(BinOp, u8, u8)> {
    let (op, lbp) = match kind {
        TokenKind::Or => (BinOp::Or, bp::OR),
        TokenKind::And => (BinOp::And, bp::AND),
        TokenKind::Eq => (BinOp::Eq, bp::RELATIONAL),
        TokenKind::Ne => (BinOp::Ne, bp::RELATIONAL),
        TokenKind::Lt => (BinOp::Lt, bp::RELATIONAL),
        TokenKind::Le => (BinOp::Le, bp::RELATIONAL),
        TokenKind::Gt => (BinOp::Gt, bp::RELATIONAL),
        TokenKind::Ge => (BinOp::Ge, bp::RELATIONAL),
        TokenKind::In => (BinOp::In, bp::RELATIONAL),
        TokenKind::Plus => (BinOp::Add, bp::ADDITIVE),
        TokenKind::Minus => (BinOp::Sub, bp::ADDITIVE),
        TokenKind::Star => (BinOp::Mul, bp::MULTIPLICATIVE),
        TokenKind::Slash => (BinOp::Divide, bp::MULTIPLICATIVE),
        TokenKind::Div => (BinOp::Div, bp::MULTIPLICATIVE),
        TokenKind::Mod => (BinOp::Mod, bp::MULTIPLICATIVE),
        _ => return None,
    };
    Some((op, lbp, lbp + 1))
}

impl Parser {
    /// Parses a complete expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(bp::MIN)
    }

    /// `expression (, expression)*`
    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    /// Pratt core: parses an expression consuming only operators whose left
    /// binding power is at least `min_bp`.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(kind) = self.peek_kind() else { break };

            if *kind == TokenKind::Colon {
                if bp::FORMAT < min_bp {
                    break;
                }
                self.advance();
                let rhs = self.parse_expr_bp(bp::FORMAT + 1)?;
                lhs = fold_format(lhs, rhs);
                continue;
            }

            let Some((op, lbp, rbp)) = infix_binding(kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }

            self.advance();
            let rhs = self.parse_expr_bp(rbp)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    /// Parses a prefix expression: literal, variable path, call,
    /// parenthesized subexpression, set constructor, or `not`.
    fn parse_prefix(&mut self) -> Result<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Not) => {
                self.advance();
                let operand = self.parse_expr_bp(bp::NOT)?;
                Ok(Expr::Not(Box::new(operand)))
            },
            Some(TokenKind::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            },
            Some(TokenKind::LBracket) => {
                self.advance();
                let elems = if self.check(&TokenKind::RBracket) {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                self.expect(&TokenKind::RBracket)?;
                Ok(Expr::SetLit(elems))
            },
            Some(TokenKind::Ident(_)) => {
                let name = self.expect_ident()?;
                if self.eat(&TokenKind::LParen) {
                    let args = if self.check(&TokenKind::RParen) {
                        Vec::new()
                    } else {
                        self.parse_expr_list()?
                    };
                    self.expect(&TokenKind::RParen)?;
                    Ok(Expr::Call { name, args })
                } else {
                    self.parse_variable_suffixes(Expr::Var(name))
                }
            },
            // `integer(x)` / `real(x)` casts: type names in call position.
            Some(TokenKind::TypeName(simple)) => {
                let name = Symbol::intern(simple.keyword());
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let args = self.parse_expr_list()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::Call { name, args })
            },
            Some(kind) if crate::types::literal_starts(kind) => {
                Ok(Expr::Const(self.parse_literal()?))
            },
            _ => Err(self.unexpected()),
        }
    }
}

/// Folds a `:` application into a format node.
///
/// `a : w` makes a two-field format; a second application onto a format node
/// without precision fills the third field, so `a : w : p` becomes one node.
fn fold_format(lhs: Expr, rhs: Expr) -> Expr {
    match lhs {
        Expr::Format {
            expr,
            width,
            precision: None,
        } => Expr::Format {
            expr,
            width,
            precision: Some(Box::new(rhs)),
        },
        other => Expr::Format {
            expr: Box::new(other),
            width: Box::new(rhs),
            precision: None,
        },
    }
}
