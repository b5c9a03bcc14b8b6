//! Declaration sections: `const`, `type`, `label`, `var`, and subprograms.
//!
//! Sections may repeat and appear in any order before the `begin` of a
//! block. Inside a section, items run while the lookahead is an identifier
//! (or an integer, for `label`), since every section and `begin` start with
//! a keyword.

use pasc_lex::TokenKind;

use crate::ast::{ConstDef, Decl, FunctionDecl, Param, ParamMode, ProcedureDecl, TypeDef, VarGroup};
use crate::{Parser, Result};

impl Parser {
    /// Parses zero or more declaration sections.
    pub(crate) fn parse_declarations(&mut self) -> Result<Vec<Decl>> {
        let mut decls = Vec::new();
        loop {
            let decl = match self.peek_kind() {
                Some(TokenKind::Const) => self.parse_const_section()?,
                Some(TokenKind::Type) => self.parse_type_section()?,
                Some(TokenKind::Label) => self.parse_label_section()?,
                Some(TokenKind::Var) => self.parse_var_section()?,
                Some(TokenKind::Function) => self.parse_function()?,
                Some(TokenKind::Procedure) => self.parse_procedure()?,
                _ => return Ok(decls),
            };
            decls.push(decl);
        }
    }

    /// `const (ID = expression ;)+`
    fn parse_const_section(&mut self) -> Result<Decl> {
        self.expect(&TokenKind::Const)?;

        let mut defs = Vec::new();
        loop {
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expr()?;
            self.expect(&TokenKind::Semicolon)?;
            defs.push(ConstDef { name, value });

            if !matches!(self.peek_kind(), Some(TokenKind::Ident(_))) {
                return Ok(Decl::Consts(defs));
            }
        }
    }

    /// `type (ID = type ;)+`
    fn parse_type_section(&mut self) -> Result<Decl> {
        self.expect(&TokenKind::Type)?;

        let mut defs = Vec::new();
        loop {
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Eq)?;
            let ty = self.parse_type()?;
            self.expect(&TokenKind::Semicolon)?;
            defs.push(TypeDef { name, ty });

            if !matches!(self.peek_kind(), Some(TokenKind::Ident(_))) {
                return Ok(Decl::Types(defs));
            }
        }
    }

    /// `label INTEGER (, INTEGER)* ;`
    fn parse_label_section(&mut self) -> Result<Decl> {
        self.expect(&TokenKind::Label)?;

        let mut labels = vec![self.expect_int()?];
        while self.eat(&TokenKind::Comma) {
            labels.push(self.expect_int()?);
        }
        self.expect(&TokenKind::Semicolon)?;
        Ok(Decl::Labels(labels))
    }

    /// `var (ID_LIST : type ;)+`
    pub(crate) fn parse_var_section(&mut self) -> Result<Decl> {
        self.expect(&TokenKind::Var)?;

        let mut groups = vec![self.parse_var_group()?];
        while matches!(self.peek_kind(), Some(TokenKind::Ident(_))) {
            groups.push(self.parse_var_group()?);
        }
        Ok(Decl::Vars(groups))
    }

    /// `ID_LIST : type ;`
    pub(crate) fn parse_var_group(&mut self) -> Result<VarGroup> {
        let names = self.parse_ident_list()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(VarGroup { names, ty })
    }

    /// `ID (, ID)*`
    pub(crate) fn parse_ident_list(&mut self) -> Result<Vec<pasc_util::Symbol>> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    /// `function ID ( params ) : type ; block ;`
    fn parse_function(&mut self) -> Result<Decl> {
        self.expect(&TokenKind::Function)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;
        let return_type = self.parse_type()?;
        self.expect(&TokenKind::Semicolon)?;
        let block = self.parse_block()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Decl::Function(FunctionDecl {
            name,
            params,
            return_type,
            block,
        }))
    }

    /// `procedure ID ( params ) ; block ;`
    fn parse_procedure(&mut self) -> Result<Decl> {
        self.expect(&TokenKind::Procedure)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Semicolon)?;
        let block = self.parse_block()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Decl::Procedure(ProcedureDecl {
            name,
            params,
            block,
        }))
    }

    /// Possibly-empty `;`-separated parameter groups.
    fn parse_params(&mut self) -> Result<Vec<Param>> {
        if self.check(&TokenKind::RParen) {
            return Ok(Vec::new());
        }

        let mut params = vec![self.parse_param()?];
        while self.eat(&TokenKind::Semicolon) {
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    /// `[var|const] ID_LIST : type`
    fn parse_param(&mut self) -> Result<Param> {
        let mode = if self.eat(&TokenKind::Var) {
            ParamMode::Var
        } else if self.eat(&TokenKind::Const) {
            ParamMode::Const
        } else {
            ParamMode::Value
        };

        let names = self.parse_ident_list()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(Param { mode, names, ty })
    }
}
