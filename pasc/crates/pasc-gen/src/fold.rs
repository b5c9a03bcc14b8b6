//! Compile-time constant evaluation.
//!
//! Array bounds (and the constants they reference) must fold to values
//! before any code is emitted. The folder supports the four literal kinds,
//! named constant references, and the arithmetic operators
//! `+ - * / div mod` over numeric operands. Anything else is rejected.

use pasc_par::{BinOp, Expr, Lit};
use pasc_util::Symbol;
use rustc_hash::FxHashMap;

use crate::error::{GenError, Result};

/// A folded constant value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Folded {
    Int(i64),
    Real(f64),
    Bool(bool),
    Char(char),
}

/// Folds a constant expression, resolving names through `consts`.
pub fn fold_const(expr: &Expr, consts: &FxHashMap<Symbol, Expr>) -> Result<Folded> {
    match expr {
        Expr::Const(Lit::Int(value)) => Ok(Folded::Int(*value)),
        Expr::Const(Lit::Real(value)) => Ok(Folded::Real(*value)),
        Expr::Const(Lit::Bool(value)) => Ok(Folded::Bool(*value)),
        Expr::Const(Lit::Char(value)) => Ok(Folded::Char(*value)),
        Expr::Const(_) => Err(GenError::NonConstant),
        Expr::Var(name) => {
            let referenced = consts
                .get(name)
                .ok_or(GenError::UndefinedConstant { name: *name })?;
            fold_const(referenced, consts)
        },
        Expr::Binary { op, lhs, rhs } => {
            let lhs = fold_const(lhs, consts)?;
            let rhs = fold_const(rhs, consts)?;
            fold_binop(*op, lhs, rhs)
        },
        _ => Err(GenError::NonConstant),
    }
}

/// Folds a constant expression that must be an integer (array bounds).
pub fn fold_int(expr: &Expr, consts: &FxHashMap<Symbol, Expr>) -> Result<i64> {
    match fold_const(expr, consts)? {
        Folded::Int(value) => Ok(value),
        _ => Err(GenError::NonIntegerBound),
    }
}

fn fold_binop(op: BinOp, lhs: Folded, rhs: Folded) -> Result<Folded> {
    use Folded::{Int, Real};

    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul => match (lhs, rhs) {
            (Int(a), Int(b)) => Ok(Int(apply_int(op, a, b))),
            (a, b) => {
                let (a, b) = (as_real(a)?, as_real(b)?);
                Ok(Real(apply_real(op, a, b)))
            },
        },
        BinOp::Divide => {
            let (a, b) = (as_real(lhs)?, as_real(rhs)?);
            Ok(Real(a / b))
        },
        BinOp::Div => match (lhs, rhs) {
            (Int(a), Int(b)) => Ok(Int(a.div_euclid(b))),
            _ => Err(GenError::UnsupportedConstOperator { op: "div" }),
        },
        BinOp::Mod => match (lhs, rhs) {
            (Int(a), Int(b)) => Ok(Int(a.rem_euclid(b))),
            _ => Err(GenError::UnsupportedConstOperator { op: "mod" }),
        },
        other => Err(GenError::UnsupportedConstOperator {
            op: other.lexeme(),
        }),
    }
}

fn apply_int(op: BinOp, a: i64, b: i64) -> i64 {
    match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        _ => unreachable!("only additive/multiplicative reach here"),
    }
}

fn apply_real(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        _ => unreachable!("only additive/multiplicative reach here"),
    }
}

fn as_real(value: Folded) -> Result<f64> {
    match value {
        Folded::Int(v) => Ok(v as f64),
        Folded::Real(v) => Ok(v),
        _ => Err(GenError::NonConstant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i64) -> Expr {
        Expr::Const(Lit::Int(v))
    }

    fn binop(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    #[test]
    fn test_fold_literals() {
        let consts = FxHashMap::default();
        assert_eq!(fold_const(&lit(42), &consts), Ok(Folded::Int(42)));
        assert_eq!(
            fold_const(&Expr::Const(Lit::Bool(true)), &consts),
            Ok(Folded::Bool(true))
        );
        assert_eq!(
            fold_const(&Expr::Const(Lit::Char('a')), &consts),
            Ok(Folded::Char('a'))
        );
    }

    #[test]
    fn test_fold_arithmetic() {
        let consts = FxHashMap::default();
        let expr = binop(BinOp::Add, lit(2), binop(BinOp::Mul, lit(3), lit(4)));
        assert_eq!(fold_const(&expr, &consts), Ok(Folded::Int(14)));

        let expr = binop(BinOp::Div, lit(7), lit(2));
        assert_eq!(fold_const(&expr, &consts), Ok(Folded::Int(3)));

        let expr = binop(BinOp::Mod, lit(7), lit(2));
        assert_eq!(fold_const(&expr, &consts), Ok(Folded::Int(1)));
    }

    #[test]
    fn test_fold_real_division() {
        let consts = FxHashMap::default();
        let expr = binop(BinOp::Divide, lit(7), lit(2));
        assert_eq!(fold_const(&expr, &consts), Ok(Folded::Real(3.5)));
    }

    #[test]
    fn test_fold_named_constant() {
        let mut consts = FxHashMap::default();
        consts.insert(Symbol::intern("n"), lit(5));
        let expr = binop(BinOp::Add, Expr::Var(Symbol::intern("n")), lit(1));
        assert_eq!(fold_const(&expr, &consts), Ok(Folded::Int(6)));
    }

    #[test]
    fn test_fold_chained_constant_reference() {
        let mut consts = FxHashMap::default();
        consts.insert(Symbol::intern("a"), lit(3));
        consts.insert(Symbol::intern("b"), Expr::Var(Symbol::intern("a")));
        assert_eq!(
            fold_int(&Expr::Var(Symbol::intern("b")), &consts),
            Ok(3)
        );
    }

    #[test]
    fn test_undefined_constant() {
        let consts = FxHashMap::default();
        assert_eq!(
            fold_const(&Expr::Var(Symbol::intern("nada")), &consts),
            Err(GenError::UndefinedConstant {
                name: Symbol::intern("nada")
            })
        );
    }

    #[test]
    fn test_non_constant_rejected() {
        let consts = FxHashMap::default();
        let call = Expr::Call {
            name: Symbol::intern("f"),
            args: vec![],
        };
        assert_eq!(fold_const(&call, &consts), Err(GenError::NonConstant));
    }

    #[test]
    fn test_relational_operator_rejected() {
        let consts = FxHashMap::default();
        let expr = binop(BinOp::Lt, lit(1), lit(2));
        assert_eq!(
            fold_const(&expr, &consts),
            Err(GenError::UnsupportedConstOperator { op: "<" })
        );
    }

    #[test]
    fn test_fold_int_rejects_real() {
        let consts = FxHashMap::default();
        assert_eq!(
            fold_int(&Expr::Const(Lit::Real(1.5)), &consts),
            Err(GenError::NonIntegerBound)
        );
    }
}
