//! Type-expression parsing.

use pasc_lex::TokenKind;

use crate::ast::{Expr, Lit, TypeExpr, VarGroup, VariantArm, VariantPart};
use crate::{Parser, Result};

impl Parser {
    /// Parses a type expression.
    ///
    /// The alternatives are distinguished by their first token: `packed`, a
    /// simple type name, an identifier (type alias), `array`, `(` (enum),
    /// `record`, `set`, `file`, or a constant (subrange `lo..hi`).
    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr> {
        match self.peek_kind() {
            Some(TokenKind::Packed) => {
                self.advance();
                Ok(TypeExpr::Packed(Box::new(self.parse_type()?)))
            },
            Some(TokenKind::TypeName(simple)) => {
                let simple = *simple;
                self.advance();
                if self.eat(&TokenKind::LBracket) {
                    let len = self.parse_const_operand()?;
                    self.expect(&TokenKind::RBracket)?;
                    Ok(TypeExpr::ShortString {
                        base: simple,
                        len: Box::new(len),
                    })
                } else {
                    Ok(TypeExpr::Simple(simple))
                }
            },
            Some(TokenKind::Ident(_)) => Ok(TypeExpr::Named(self.expect_ident()?)),
            Some(TokenKind::Array) => self.parse_array_type(),
            Some(TokenKind::LParen) => {
                self.advance();
                let names = self.parse_ident_list()?;
                self.expect(&TokenKind::RParen)?;
                Ok(TypeExpr::Enum(names))
            },
            Some(TokenKind::Record) => self.parse_record_type(),
            Some(TokenKind::Set) => {
                self.advance();
                self.expect(&TokenKind::Of)?;
                Ok(TypeExpr::Set(Box::new(self.parse_type()?)))
            },
            Some(TokenKind::File) => {
                self.advance();
                self.expect(&TokenKind::Of)?;
                Ok(TypeExpr::File(Box::new(self.parse_type()?)))
            },
            Some(kind) if literal_starts(kind) => {
                let lo = Expr::Const(self.parse_literal()?);
                self.expect(&TokenKind::DotDot)?;
                let hi = Expr::Const(self.parse_literal()?);
                Ok(TypeExpr::Subrange(Box::new(lo), Box::new(hi)))
            },
            _ => Err(self.unexpected()),
        }
    }

    /// `array of T` or `array [r1, r2, …] of T`.
    fn parse_array_type(&mut self) -> Result<TypeExpr> {
        self.expect(&TokenKind::Array)?;

        if self.eat(&TokenKind::Of) {
            return Ok(TypeExpr::OpenArray(Box::new(self.parse_type()?)));
        }

        self.expect(&TokenKind::LBracket)?;
        let mut ranges = vec![self.parse_range()?];
        while self.eat(&TokenKind::Comma) {
            ranges.push(self.parse_range()?);
        }
        self.expect(&TokenKind::RBracket)?;
        self.expect(&TokenKind::Of)?;
        let elem = self.parse_type()?;

        Ok(TypeExpr::Array {
            ranges,
            elem: Box::new(elem),
        })
    }

    /// `const_expr .. const_expr`; bounds are literals or named constants.
    fn parse_range(&mut self) -> Result<(Expr, Expr)> {
        let lo = self.parse_const_operand()?;
        self.expect(&TokenKind::DotDot)?;
        let hi = self.parse_const_operand()?;
        Ok((lo, hi))
    }

    /// A constant operand: a literal, or a reference to a named constant.
    pub(crate) fn parse_const_operand(&mut self) -> Result<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Ident(_)) => Ok(Expr::Var(self.expect_ident()?)),
            Some(kind) if literal_starts(kind) => Ok(Expr::Const(self.parse_literal()?)),
            _ => Err(self.unexpected()),
        }
    }

    /// `record field_list [variant_part] end`.
    fn parse_record_type(&mut self) -> Result<TypeExpr> {
        self.expect(&TokenKind::Record)?;

        let mut fields: Vec<VarGroup> = Vec::new();
        while matches!(self.peek_kind(), Some(TokenKind::Ident(_))) {
            fields.push(self.parse_var_group()?);
        }

        let variant = if self.check(&TokenKind::Case) {
            Some(self.parse_variant_part()?)
        } else {
            None
        };

        self.expect(&TokenKind::End)?;
        Ok(TypeExpr::Record { fields, variant })
    }

    /// `case ID : TYPE of (constant : ( field_list ) ;)+`
    fn parse_variant_part(&mut self) -> Result<VariantPart> {
        self.expect(&TokenKind::Case)?;
        let tag = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;

        let tag_type = match self.peek_kind() {
            Some(TokenKind::TypeName(simple)) => {
                let simple = *simple;
                self.advance();
                simple
            },
            _ => return Err(self.unexpected()),
        };
        self.expect(&TokenKind::Of)?;

        let mut arms = Vec::new();
        loop {
            let label = self.parse_literal()?;
            self.expect(&TokenKind::Colon)?;
            self.expect(&TokenKind::LParen)?;

            let mut fields = Vec::new();
            while matches!(self.peek_kind(), Some(TokenKind::Ident(_))) {
                fields.push(self.parse_var_group()?);
            }
            self.expect(&TokenKind::RParen)?;
            self.expect(&TokenKind::Semicolon)?;
            arms.push(VariantArm { label, fields });

            if !matches!(self.peek_kind(), Some(kind) if literal_starts(kind)) {
                return Ok(VariantPart {
                    tag,
                    tag_type,
                    arms,
                });
            }
        }
    }

    /// Consumes a literal token into a [`Lit`].
    pub(crate) fn parse_literal(&mut self) -> Result<Lit> {
        let lit = match self.peek_kind() {
            Some(TokenKind::Int(v)) => Lit::Int(*v),
            Some(TokenKind::Real(v)) => Lit::Real(*v),
            Some(TokenKind::Bool(v)) => Lit::Bool(*v),
            Some(TokenKind::CharLit(c)) => Lit::Char(*c),
            Some(TokenKind::Str(s)) => Lit::Str(*s),
            Some(TokenKind::Nil) => Lit::Nil,
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        Ok(lit)
    }
}

/// True when `kind` can start a constant literal.
pub(crate) fn literal_starts(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Int(_)
            | TokenKind::Real(_)
            | TokenKind::Bool(_)
            | TokenKind::CharLit(_)
            | TokenKind::Str(_)
            | TokenKind::Nil
    )
}

#[cfg(test)]
mod tests {
    use pasc_lex::SimpleType;
    use pasc_util::{Handler, Symbol};

    use crate::ast::{Decl, Expr, Lit, TypeExpr};
    use crate::parse_source;

    fn first_var_type(source: &str) -> TypeExpr {
        let mut handler = Handler::new();
        let program = parse_source(source, &mut handler).unwrap();
        let Decl::Vars(groups) = &program.block.decls[0] else {
            panic!("expected var section");
        };
        groups[0].ty.clone()
    }

    #[test]
    fn test_array_type() {
        let ty = first_var_type("program p; var v: array[1..3] of integer; begin end.");
        let TypeExpr::Array { ranges, elem } = ty else {
            panic!("expected array type");
        };
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].0, Expr::Const(Lit::Int(1)));
        assert_eq!(ranges[0].1, Expr::Const(Lit::Int(3)));
        assert_eq!(*elem, TypeExpr::Simple(SimpleType::Integer));
    }

    #[test]
    fn test_array_bounds_may_be_named_constants() {
        let ty = first_var_type(
            "program p; const n = 5; var v: array[1..n] of integer; begin end.",
        );
        let TypeExpr::Array { ranges, .. } = ty else {
            panic!("expected array type");
        };
        assert_eq!(ranges[0].1, Expr::Var(Symbol::intern("n")));
    }

    #[test]
    fn test_multi_dimensional_array() {
        let ty = first_var_type(
            "program p; var m: array[1..2, 1..3] of real; begin end.",
        );
        let TypeExpr::Array { ranges, .. } = ty else {
            panic!("expected array type");
        };
        assert_eq!(ranges.len(), 2);
    }

    #[test]
    fn test_open_array() {
        let ty = first_var_type("program p; var v: array of char; begin end.");
        assert_eq!(
            ty,
            TypeExpr::OpenArray(Box::new(TypeExpr::Simple(SimpleType::Char)))
        );
    }

    #[test]
    fn test_enum_and_set_and_file() {
        let ty = first_var_type("program p; var c: (norte, sul); begin end.");
        assert_eq!(
            ty,
            TypeExpr::Enum(vec![Symbol::intern("norte"), Symbol::intern("sul")])
        );

        let ty = first_var_type("program p; var s: set of char; begin end.");
        assert_eq!(ty, TypeExpr::Set(Box::new(TypeExpr::Simple(SimpleType::Char))));

        let ty = first_var_type("program p; var f: file of integer; begin end.");
        assert_eq!(
            ty,
            TypeExpr::File(Box::new(TypeExpr::Simple(SimpleType::Integer)))
        );
    }

    #[test]
    fn test_subrange() {
        let ty = first_var_type("program p; var d: 1..31; begin end.");
        assert_eq!(
            ty,
            TypeExpr::Subrange(
                Box::new(Expr::Const(Lit::Int(1))),
                Box::new(Expr::Const(Lit::Int(31)))
            )
        );
    }

    #[test]
    fn test_packed_and_short_string() {
        let ty = first_var_type("program p; var s: packed char[8]; begin end.");
        let TypeExpr::Packed(inner) = ty else {
            panic!("expected packed type");
        };
        assert_eq!(
            *inner,
            TypeExpr::ShortString {
                base: SimpleType::Char,
                len: Box::new(Expr::Const(Lit::Int(8))),
            }
        );
    }

    #[test]
    fn test_record_type() {
        let ty = first_var_type(
            "program p; var r: record x: integer; y: real; end; begin end.",
        );
        let TypeExpr::Record { fields, variant } = ty else {
            panic!("expected record type");
        };
        assert_eq!(fields.len(), 2);
        assert!(variant.is_none());
    }

    #[test]
    fn test_record_with_variant_part() {
        let ty = first_var_type(
            "program p; var r: record x: integer; case k: integer of 1: (a: real;); 2: (b: char;); end; begin end.",
        );
        let TypeExpr::Record { variant, .. } = ty else {
            panic!("expected record type");
        };
        let variant = variant.expect("variant part");
        assert_eq!(variant.tag, Symbol::intern("k"));
        assert_eq!(variant.arms.len(), 2);
    }

    #[test]
    fn test_named_type() {
        let ty = first_var_type(
            "program p; type vetor = array[1..4] of integer; var v: vetor; begin end.",
        );
        assert_eq!(ty, TypeExpr::Named(Symbol::intern("vetor")));
    }
}
