//! pasc-sem - Semantic analyzer.
//!
//! Walks the AST produced by `pasc-par`, maintaining a scope tree and the
//! enclosing function (for return-value writes). The analyzer checks the
//! static semantics of the language: declaration-before-use, one definition
//! per scope, the type rules of every operator and statement, subprogram
//! arity and argument types, and the two permitted coercions
//! (`integer → real`, `array of char ↔ texto`).
//!
//! Analysis is fatal-on-first-error; the checked AST itself is not rewritten.

pub mod error;
pub mod scope;
pub mod types;

pub use error::{Result, SemError};
pub use scope::{BuiltinFn, BuiltinProc, ParamSig, ScopeTree, SymKind, SymbolInfo};
pub use types::Ty;

use indexmap::IndexMap;
use pasc_lex::SimpleType;
use pasc_par::{
    Block, Decl, Expr, Lit, Program, Stmt, TypeExpr, VarGroup, VariantPart,
};
use pasc_util::Symbol;

/// Maps a simple type name to its normalized type.
fn simple_ty(simple: SimpleType) -> Ty {
    match simple {
        SimpleType::Integer => Ty::Integer,
        SimpleType::Real => Ty::Real,
        SimpleType::Boolean => Ty::Boolean,
        SimpleType::Char => Ty::Char,
    }
}

/// The type of a literal.
fn lit_type(lit: &Lit) -> Result<Ty> {
    match lit {
        Lit::Int(_) => Ok(Ty::Integer),
        Lit::Real(_) => Ok(Ty::Real),
        Lit::Bool(_) => Ok(Ty::Boolean),
        Lit::Char(_) => Ok(Ty::Char),
        Lit::Str(_) => Ok(Ty::Texto),
        Lit::Nil => Err(SemError::NilLiteral),
    }
}

/// The semantic analyzer.
pub struct SemanticAnalyzer {
    scopes: ScopeTree,
    /// Name and return type of the enclosing function, when inside one.
    current_function: Option<(Symbol, Ty)>,
    /// Counter for synthesized anonymous-record type names.
    record_counter: u32,
}

impl SemanticAnalyzer {
    /// Creates an analyzer with the built-ins bound in the global scope.
    pub fn new() -> Self {
        let mut scopes = ScopeTree::new();

        let procs = [
            ("write", BuiltinProc::Write),
            ("writeln", BuiltinProc::Writeln),
            ("read", BuiltinProc::Read),
            ("readln", BuiltinProc::Readln),
            ("rewrite", BuiltinProc::Rewrite),
            ("assign", BuiltinProc::Assign),
            ("close", BuiltinProc::Close),
        ];
        for (name, builtin) in procs {
            scopes
                .define(Symbol::intern(name), SymKind::BuiltinProc(builtin))
                .expect("builtin names are distinct");
        }

        let fns = [
            ("length", BuiltinFn::Length),
            ("high", BuiltinFn::High),
            ("chr", BuiltinFn::Chr),
        ];
        for (name, builtin) in fns {
            scopes
                .define(Symbol::intern(name), SymKind::BuiltinFn(builtin))
                .expect("builtin names are distinct");
        }

        Self {
            scopes,
            current_function: None,
            record_counter: 0,
        }
    }

    /// Checks a whole program.
    pub fn analyze(&mut self, program: &Program) -> Result<()> {
        self.visit_block(&program.block)
    }

    /// The scope tree, exposed for resolution-invariant tests.
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    fn visit_block(&mut self, block: &Block) -> Result<()> {
        for decl in &block.decls {
            self.visit_decl(decl)?;
        }
        for stmt in &block.body {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn visit_decl(&mut self, decl: &Decl) -> Result<()> {
        match decl {
            Decl::Consts(defs) => {
                for def in defs {
                    if self.scopes.defined_here(def.name) {
                        return Err(SemError::DuplicateConstant { name: def.name });
                    }
                    let ty = self.visit_expr(&def.value)?;
                    self.scopes.define(def.name, SymKind::Constant(ty))?;
                }
                Ok(())
            },
            Decl::Types(defs) => {
                for def in defs {
                    match &def.ty {
                        TypeExpr::Record { fields, variant } => {
                            let map = self.record_field_map(fields, variant)?;
                            self.scopes.define(def.name, SymKind::RecordType(map))?;
                        },
                        other => {
                            let ty = self.normalize_type(other)?;
                            self.scopes.define(def.name, SymKind::TypeAlias(ty))?;
                        },
                    }
                }
                Ok(())
            },
            Decl::Labels(labels) => {
                for label in labels {
                    let name = Symbol::intern(&label.to_string());
                    self.scopes.define(name, SymKind::Label)?;
                }
                Ok(())
            },
            Decl::Vars(groups) => {
                for group in groups {
                    let ty = self.normalize_type(&group.ty)?;
                    for name in &group.names {
                        self.scopes.define(*name, SymKind::Variable(ty.clone()))?;
                    }
                }
                Ok(())
            },
            Decl::Function(func) => {
                let params = self.resolve_params(&func.params)?;
                let return_type = self.normalize_type(&func.return_type)?;
                self.scopes.define(
                    func.name,
                    SymKind::Function {
                        params: params.clone(),
                        return_type: return_type.clone(),
                    },
                )?;

                self.scopes.enter_scope();
                let saved = self
                    .current_function
                    .replace((func.name, return_type));
                let result = self.define_params_and_visit(&params, &func.block);
                self.current_function = saved;
                self.scopes.exit_scope();
                result
            },
            Decl::Procedure(proc) => {
                let params = self.resolve_params(&proc.params)?;
                self.scopes.define(
                    proc.name,
                    SymKind::Procedure {
                        params: params.clone(),
                    },
                )?;

                self.scopes.enter_scope();
                let saved = self.current_function.take();
                let result = self.define_params_and_visit(&params, &proc.block);
                self.current_function = saved;
                self.scopes.exit_scope();
                result
            },
        }
    }

    fn define_params_and_visit(&mut self, params: &[ParamSig], block: &Block) -> Result<()> {
        for sig in params {
            self.scopes
                .define(sig.name, SymKind::Variable(sig.ty.clone()))?;
        }
        self.visit_block(block)
    }

    /// Normalizes parameter groups into a flat, ordered signature list.
    fn resolve_params(&mut self, params: &[pasc_par::Param]) -> Result<Vec<ParamSig>> {
        let mut sigs = Vec::new();
        for param in params {
            let ty = self.normalize_type(&param.ty)?;
            for name in &param.names {
                sigs.push(ParamSig {
                    name: *name,
                    ty: ty.clone(),
                    mode: param.mode,
                });
            }
        }
        Ok(sigs)
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Normalizes a source type expression into the type algebra.
    ///
    /// Inline enum types define their constants in the current scope;
    /// anonymous record types register a synthesized record-type symbol so
    /// that field access has a field map to consult.
    fn normalize_type(&mut self, ty: &TypeExpr) -> Result<Ty> {
        match ty {
            TypeExpr::Simple(simple) => Ok(simple_ty(*simple)),
            TypeExpr::Named(name) => match self.scopes.resolve(*name) {
                Some(info) => match &info.kind {
                    SymKind::TypeAlias(ty) => Ok(ty.clone()),
                    SymKind::RecordType(_) => Ok(Ty::Record(*name)),
                    _ => Err(SemError::NotAType { name: *name }),
                },
                None => Err(SemError::Undeclared { name: *name }),
            },
            TypeExpr::Array { ranges, elem } => {
                let mut ty = self.normalize_type(elem)?;
                for _ in ranges {
                    ty = Ty::Array(Box::new(ty));
                }
                Ok(ty)
            },
            TypeExpr::OpenArray(elem) => {
                Ok(Ty::Array(Box::new(self.normalize_type(elem)?)))
            },
            TypeExpr::Enum(names) => {
                for name in names {
                    self.scopes.define(*name, SymKind::EnumValue(Ty::Enum))?;
                }
                Ok(Ty::Enum)
            },
            TypeExpr::Subrange(_, _) => Ok(Ty::Integer),
            TypeExpr::Packed(inner) => self.normalize_type(inner),
            TypeExpr::ShortString { .. } => Ok(Ty::Texto),
            TypeExpr::Set(elem) => Ok(Ty::Set(Box::new(self.normalize_type(elem)?))),
            TypeExpr::File(elem) => Ok(Ty::File(Box::new(self.normalize_type(elem)?))),
            TypeExpr::Record { fields, variant } => {
                let map = self.record_field_map(fields, variant)?;
                self.record_counter += 1;
                let rec_name = Symbol::intern(&format!("$record{}", self.record_counter));
                self.scopes.define(rec_name, SymKind::RecordType(map))?;
                Ok(Ty::Record(rec_name))
            },
        }
    }

    /// Builds a record's field map, including the variant tag and the fields
    /// of every variant arm (all variants are statically accessible).
    fn record_field_map(
        &mut self,
        fields: &[VarGroup],
        variant: &Option<VariantPart>,
    ) -> Result<IndexMap<Symbol, Ty>> {
        let mut map = IndexMap::new();

        let insert = |map: &mut IndexMap<Symbol, Ty>, name: Symbol, ty: Ty| {
            if map.insert(name, ty).is_some() {
                Err(SemError::DuplicateDeclaration { name })
            } else {
                Ok(())
            }
        };

        for group in fields {
            let ty = self.normalize_type(&group.ty)?;
            for name in &group.names {
                insert(&mut map, *name, ty.clone())?;
            }
        }

        if let Some(variant) = variant {
            insert(&mut map, variant.tag, simple_ty(variant.tag_type))?;
            for arm in &variant.arms {
                for group in &arm.fields {
                    let ty = self.normalize_type(&group.ty)?;
                    for name in &group.names {
                        insert(&mut map, *name, ty.clone())?;
                    }
                }
            }
        }

        Ok(map)
    }

    /// The field map of a record-type symbol.
    fn record_fields(&self, rec_name: Symbol) -> Result<IndexMap<Symbol, Ty>> {
        match self.scopes.resolve(rec_name) {
            Some(SymbolInfo {
                kind: SymKind::RecordType(fields),
                ..
            }) => Ok(fields.clone()),
            _ => Err(SemError::Undeclared { name: rec_name }),
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign { target, value } => self.visit_assign(target, value),
            Stmt::Call { name, args } => {
                self.visit_call(*name, args)?;
                Ok(())
            },
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let ty = self.visit_expr(cond)?;
                if ty != Ty::Boolean {
                    return Err(SemError::IfCondition { ty });
                }
                self.visit_stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.visit_stmt(else_branch)?;
                }
                Ok(())
            },
            Stmt::While { cond, body } => {
                let ty = self.visit_expr(cond)?;
                if ty != Ty::Boolean {
                    return Err(SemError::WhileCondition { ty });
                }
                self.visit_stmt(body)
            },
            Stmt::Repeat { body, cond } => {
                for stmt in body {
                    self.visit_stmt(stmt)?;
                }
                let ty = self.visit_expr(cond)?;
                if ty != Ty::Boolean {
                    return Err(SemError::RepeatCondition { ty });
                }
                Ok(())
            },
            Stmt::For {
                var, from, to, body, ..
            } => {
                match self.scopes.resolve(*var) {
                    None => return Err(SemError::Undeclared { name: *var }),
                    Some(info) => match &info.kind {
                        SymKind::Variable(Ty::Integer) => {},
                        SymKind::Variable(ty) => {
                            return Err(SemError::ForVarNotInteger {
                                name: *var,
                                ty: ty.clone(),
                            })
                        },
                        _ => return Err(SemError::NotAVariable { name: *var }),
                    },
                }

                let ty = self.visit_expr(from)?;
                if ty != Ty::Integer {
                    return Err(SemError::ForStartNotInteger { ty });
                }
                let ty = self.visit_expr(to)?;
                if ty != Ty::Integer {
                    return Err(SemError::ForEndNotInteger { ty });
                }
                self.visit_stmt(body)
            },
            Stmt::Case { scrutinee, arms } => {
                let scrutinee_ty = self.visit_expr(scrutinee)?;
                for arm in arms {
                    for label in &arm.labels {
                        let label_ty = lit_type(label)?;
                        if label_ty != scrutinee_ty {
                            return Err(SemError::CaseLabelType {
                                expected: scrutinee_ty,
                                got: label_ty,
                            });
                        }
                    }
                    for stmt in &arm.body {
                        self.visit_stmt(stmt)?;
                    }
                }
                Ok(())
            },
            Stmt::With { vars, body } => self.visit_with(vars, body),
            Stmt::Goto(label) => self.check_label(*label),
            Stmt::Labeled { label, stmt } => {
                self.check_label(*label)?;
                self.visit_stmt(stmt)
            },
            Stmt::Compound(stmts) => {
                for stmt in stmts {
                    self.visit_stmt(stmt)?;
                }
                Ok(())
            },
        }
    }

    fn visit_assign(&mut self, target: &Expr, value: &Expr) -> Result<()> {
        // A bare variable naming the enclosing function is a return-value
        // write, checked against the declared return type.
        if let Expr::Var(name) = target {
            if let Some((fn_name, return_type)) = self.current_function.clone() {
                if *name == fn_name {
                    let got = self.visit_expr(value)?;
                    if !return_type.assignable_from(&got) {
                        return Err(SemError::ReturnTypeMismatch {
                            name: fn_name,
                            expected: return_type,
                            got,
                        });
                    }
                    return Ok(());
                }
            }
        }

        let var_ty = self.visit_lvalue(target)?;
        let expr_ty = self.visit_expr(value)?;
        if !var_ty.assignable_from(&expr_ty) {
            return Err(SemError::AssignTypeMismatch { var_ty, expr_ty });
        }
        Ok(())
    }

    /// Types an assignable path: a variable, or index/field chains off one.
    fn visit_lvalue(&mut self, expr: &Expr) -> Result<Ty> {
        match expr {
            Expr::Var(name) => match self.scopes.resolve(*name) {
                Some(info) => match &info.kind {
                    SymKind::Variable(ty) => Ok(ty.clone()),
                    _ => Err(SemError::NotAVariable { name: *name }),
                },
                None => Err(SemError::Undeclared { name: *name }),
            },
            Expr::Index { .. } | Expr::Field { .. } => self.visit_expr(expr),
            _ => Err(SemError::NotAVariable {
                name: Symbol::intern("<expressão>"),
            }),
        }
    }

    fn visit_with(&mut self, vars: &[Expr], body: &Stmt) -> Result<()> {
        let mut field_sets = Vec::new();
        for var in vars {
            let ty = self.visit_expr(var)?;
            let Ty::Record(rec_name) = ty else {
                return Err(SemError::WithRequiresRecord { ty });
            };
            field_sets.push(self.record_fields(rec_name)?);
        }

        self.scopes.enter_scope();
        // Listing order is outermost-to-innermost: a later record's fields
        // shadow an earlier one's.
        for fields in field_sets {
            for (name, ty) in fields {
                self.scopes.shadow(name, SymKind::Variable(ty));
            }
        }
        let result = self.visit_stmt(body);
        self.scopes.exit_scope();
        result
    }

    fn check_label(&self, label: i64) -> Result<()> {
        let name = Symbol::intern(&label.to_string());
        match self.scopes.resolve(name) {
            Some(SymbolInfo {
                kind: SymKind::Label,
                ..
            }) => Ok(()),
            _ => Err(SemError::UndeclaredLabel { label }),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn visit_expr(&mut self, expr: &Expr) -> Result<Ty> {
        match expr {
            Expr::Const(lit) => lit_type(lit),
            Expr::Var(name) => match self.scopes.resolve(*name) {
                Some(info) => match &info.kind {
                    SymKind::Variable(ty)
                    | SymKind::Constant(ty)
                    | SymKind::EnumValue(ty) => Ok(ty.clone()),
                    _ => Err(SemError::NotAVariable { name: *name }),
                },
                None => Err(SemError::Undeclared { name: *name }),
            },
            Expr::Index { base, indices } => {
                let mut ty = self.visit_expr(base)?;
                for index in indices {
                    let index_ty = self.visit_expr(index)?;
                    if index_ty != Ty::Integer {
                        return Err(SemError::IndexNotInteger { ty: index_ty });
                    }
                    ty = match ty {
                        Ty::Array(elem) => *elem,
                        other => return Err(SemError::IndexNonArray { ty: other }),
                    };
                }
                Ok(ty)
            },
            Expr::Field { base, name } => {
                let base_ty = self.visit_expr(base)?;
                let Ty::Record(rec_name) = base_ty else {
                    return Err(SemError::FieldOnNonRecord { ty: base_ty });
                };
                let fields = self.record_fields(rec_name)?;
                fields
                    .get(name)
                    .cloned()
                    .ok_or(SemError::UnknownField {
                        record: rec_name,
                        field: *name,
                    })
            },
            Expr::Binary { op, lhs, rhs } => self.visit_binop(*op, lhs, rhs),
            Expr::Not(operand) => {
                let ty = self.visit_expr(operand)?;
                if ty != Ty::Boolean {
                    return Err(SemError::NotOperand { ty });
                }
                Ok(Ty::Boolean)
            },
            Expr::Call { name, args } => match self.visit_call(*name, args)? {
                Some(ty) => Ok(ty),
                None => Err(SemError::ProcedureInExpression { name: *name }),
            },
            Expr::SetLit(elems) => {
                if elems.is_empty() {
                    return Err(SemError::EmptySetLiteral);
                }
                let first = self.visit_expr(&elems[0])?;
                for elem in &elems[1..] {
                    let ty = self.visit_expr(elem)?;
                    if ty != first {
                        return Err(SemError::SetElementMismatch { first, other: ty });
                    }
                }
                Ok(Ty::Set(Box::new(first)))
            },
            Expr::Format {
                expr,
                width,
                precision,
            } => {
                let width_ty = self.visit_expr(width)?;
                if width_ty != Ty::Integer {
                    return Err(SemError::FormatWidth { ty: width_ty });
                }
                if let Some(precision) = precision {
                    let precision_ty = self.visit_expr(precision)?;
                    if precision_ty != Ty::Integer {
                        return Err(SemError::FormatWidth { ty: precision_ty });
                    }
                }
                self.visit_expr(expr)
            },
        }
    }

    fn visit_binop(&mut self, op: pasc_par::BinOp, lhs: &Expr, rhs: &Expr) -> Result<Ty> {
        use pasc_par::BinOp;

        let lhs_ty = self.visit_expr(lhs)?;
        let rhs_ty = self.visit_expr(rhs)?;

        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Divide => {
                if !lhs_ty.is_numeric() || !rhs_ty.is_numeric() {
                    return Err(SemError::ArithOperandTypes {
                        op: op.lexeme(),
                        lhs: lhs_ty,
                        rhs: rhs_ty,
                    });
                }
                if lhs_ty == Ty::Real || rhs_ty == Ty::Real || op == BinOp::Divide {
                    Ok(Ty::Real)
                } else {
                    Ok(Ty::Integer)
                }
            },
            BinOp::Div | BinOp::Mod => {
                if lhs_ty != Ty::Integer || rhs_ty != Ty::Integer {
                    let op = if op == BinOp::Div { "DIV" } else { "MOD" };
                    return Err(SemError::DivRequiresIntegers {
                        op,
                        lhs: lhs_ty,
                        rhs: rhs_ty,
                    });
                }
                Ok(Ty::Integer)
            },
            BinOp::Eq | BinOp::Ne => {
                if lhs_ty.is_numeric() && rhs_ty.is_numeric() {
                    return Ok(Ty::Boolean);
                }
                if lhs_ty != rhs_ty {
                    return Err(SemError::EqualityIncompatible {
                        op: op.lexeme(),
                        lhs: lhs_ty,
                        rhs: rhs_ty,
                    });
                }
                match lhs_ty {
                    Ty::Boolean | Ty::Char | Ty::Texto | Ty::Set(_) => Ok(Ty::Boolean),
                    other => Err(SemError::EqualityUnsupported {
                        op: op.lexeme(),
                        ty: other,
                    }),
                }
            },
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                if lhs_ty.is_numeric() && rhs_ty.is_numeric() {
                    return Ok(Ty::Boolean);
                }
                if lhs_ty == rhs_ty && matches!(lhs_ty, Ty::Char | Ty::Texto) {
                    return Ok(Ty::Boolean);
                }
                Err(SemError::OrderingUnsupported {
                    op: op.lexeme(),
                    lhs: lhs_ty,
                    rhs: rhs_ty,
                })
            },
            BinOp::In => match rhs_ty {
                Ty::Set(elem) => {
                    if lhs_ty == *elem {
                        Ok(Ty::Boolean)
                    } else {
                        Err(SemError::InElementMismatch {
                            elem: *elem,
                            ty: lhs_ty,
                        })
                    }
                },
                other => Err(SemError::InRequiresSet { ty: other }),
            },
            BinOp::And | BinOp::Or => {
                if lhs_ty != Ty::Boolean || rhs_ty != Ty::Boolean {
                    let op = if op == BinOp::And { "AND" } else { "OR" };
                    return Err(SemError::LogicalOperands {
                        op,
                        lhs: lhs_ty,
                        rhs: rhs_ty,
                    });
                }
                Ok(Ty::Boolean)
            },
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Checks a call and returns the result type (`None` for procedures).
    ///
    /// `integer(x)` and `real(x)` are casts, as is a call through any user
    /// type alias; the built-ins have their signatures checked specifically;
    /// user subprograms check arity and per-argument compatibility.
    fn visit_call(&mut self, name: Symbol, args: &[Expr]) -> Result<Option<Ty>> {
        if name == Symbol::intern("integer") || name == Symbol::intern("real") {
            return self.visit_cast(name, args);
        }

        let Some(info) = self.scopes.resolve(name) else {
            return Err(SemError::Undeclared { name });
        };
        let kind = info.kind.clone();

        match kind {
            SymKind::BuiltinFn(BuiltinFn::Length) => {
                if args.len() != 1 {
                    return Err(SemError::LengthArity { got: args.len() });
                }
                let ty = self.visit_expr(&args[0])?;
                if !matches!(ty, Ty::Array(_)) {
                    return Err(SemError::LengthRequiresArray { ty });
                }
                Ok(Some(Ty::Integer))
            },
            SymKind::BuiltinFn(BuiltinFn::High) => {
                if args.len() != 1 {
                    return Err(SemError::HighArity { got: args.len() });
                }
                let ty = self.visit_expr(&args[0])?;
                if !matches!(ty, Ty::Array(_)) {
                    return Err(SemError::HighRequiresArray { ty });
                }
                Ok(Some(Ty::Integer))
            },
            SymKind::BuiltinFn(BuiltinFn::Chr) => {
                if args.len() != 1 {
                    return Err(SemError::ChrArity { got: args.len() });
                }
                let ty = self.visit_expr(&args[0])?;
                if ty != Ty::Integer {
                    return Err(SemError::ChrRequiresInteger { ty });
                }
                Ok(Some(Ty::Char))
            },
            SymKind::BuiltinProc(BuiltinProc::Write | BuiltinProc::Writeln) => {
                for arg in args {
                    self.visit_expr(arg)?;
                }
                Ok(None)
            },
            SymKind::BuiltinProc(BuiltinProc::Read | BuiltinProc::Readln) => {
                for arg in args {
                    match arg {
                        Expr::Var(_) | Expr::Index { .. } | Expr::Field { .. } => {
                            self.visit_lvalue(arg)?;
                        },
                        _ => return Err(SemError::ReadTargetRequired { name }),
                    }
                }
                Ok(None)
            },
            SymKind::BuiltinProc(BuiltinProc::Rewrite | BuiltinProc::Close) => {
                if args.len() != 1 {
                    return Err(SemError::ArityMismatch {
                        name,
                        expected: 1,
                        got: args.len(),
                    });
                }
                let ty = self.visit_expr(&args[0])?;
                if !matches!(ty, Ty::File(_)) {
                    return Err(SemError::FileArgRequired { name, ty });
                }
                Ok(None)
            },
            SymKind::BuiltinProc(BuiltinProc::Assign) => {
                if args.len() != 2 {
                    return Err(SemError::ArityMismatch {
                        name,
                        expected: 2,
                        got: args.len(),
                    });
                }
                let file_ty = self.visit_expr(&args[0])?;
                if !matches!(file_ty, Ty::File(_)) {
                    return Err(SemError::FileArgRequired { name, ty: file_ty });
                }
                let name_ty = self.visit_expr(&args[1])?;
                if !Ty::Texto.assignable_from(&name_ty) {
                    return Err(SemError::AssignNameRequired { ty: name_ty });
                }
                Ok(None)
            },
            SymKind::Function {
                params,
                return_type,
            } => {
                self.check_args(name, &params, args)?;
                Ok(Some(return_type))
            },
            SymKind::Procedure { params } => {
                self.check_args(name, &params, args)?;
                Ok(None)
            },
            SymKind::TypeAlias(ty) => {
                if args.len() != 1 {
                    return Err(SemError::CastArity {
                        name,
                        got: args.len(),
                    });
                }
                self.visit_expr(&args[0])?;
                Ok(Some(ty))
            },
            _ => Err(SemError::NotCallable { name }),
        }
    }

    /// `integer(x)` / `real(x)`: arity 1 over a numeric operand.
    fn visit_cast(&mut self, name: Symbol, args: &[Expr]) -> Result<Option<Ty>> {
        if args.len() != 1 {
            return Err(SemError::CastArity {
                name,
                got: args.len(),
            });
        }
        let ty = self.visit_expr(&args[0])?;
        if !ty.is_numeric() {
            return Err(SemError::CastOperand { name, ty });
        }
        if name == Symbol::intern("integer") {
            Ok(Some(Ty::Integer))
        } else {
            Ok(Some(Ty::Real))
        }
    }

    fn check_args(&mut self, name: Symbol, params: &[ParamSig], args: &[Expr]) -> Result<()> {
        if params.len() != args.len() {
            return Err(SemError::ArityMismatch {
                name,
                expected: params.len(),
                got: args.len(),
            });
        }
        for (sig, arg) in params.iter().zip(args) {
            let got = self.visit_expr(arg)?;
            if !sig.ty.assignable_from(&got) {
                return Err(SemError::ArgTypeMismatch {
                    param: sig.name,
                    expected: sig.ty.clone(),
                    got,
                });
            }
        }
        Ok(())
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasc_util::Handler;

    fn analyze(source: &str) -> Result<()> {
        let mut handler = Handler::new();
        let program = pasc_par::parse_source(source, &mut handler).expect("parse failed");
        assert!(!handler.has_errors());
        SemanticAnalyzer::new().analyze(&program)
    }

    #[test]
    fn test_accepts_sum_program() {
        analyze(
            "program s; var a, b, s: integer; begin read(a); read(b); s := a + b; writeln(s) end.",
        )
        .unwrap();
    }

    #[test]
    fn test_boolean_assigned_integer_is_rejected() {
        let err = analyze("program e; var b: boolean; begin b := 1 end.").unwrap_err();
        assert_eq!(
            err,
            SemError::AssignTypeMismatch {
                var_ty: Ty::Boolean,
                expr_ty: Ty::Integer,
            }
        );
        assert_eq!(
            err.to_string(),
            "Tipos incompatíveis: variável é BOOLEAN, mas expressão é INTEGER."
        );
    }

    #[test]
    fn test_undeclared_variable() {
        let err = analyze("program e; begin x := 1 end.").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Variável 'x' usada mas não declarada."
        );
    }

    #[test]
    fn test_duplicate_declaration_in_scope() {
        let err =
            analyze("program e; var x: integer; x: real; begin end.").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Variável 'x' já foi declarada neste escopo."
        );
    }

    #[test]
    fn test_shadowing_across_scopes_is_allowed() {
        analyze(
            "program p; var x: integer;
             procedure q(x: real); begin x := 1.5 end;
             begin x := 1; q(2.0) end.",
        )
        .unwrap();
    }

    #[test]
    fn test_if_condition_must_be_boolean() {
        let err = analyze("program e; var x: integer; begin if x then x := 1 end.")
            .unwrap_err();
        assert_eq!(err, SemError::IfCondition { ty: Ty::Integer });
    }

    #[test]
    fn test_for_control_must_be_integer() {
        let err = analyze(
            "program e; var x: real; begin for x := 1 to 3 do writeln(1) end.",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::ForVarNotInteger { .. }));

        let err = analyze(
            "program e; var i: integer; begin for i := 1.0 to 3 do writeln(1) end.",
        )
        .unwrap_err();
        assert_eq!(err, SemError::ForStartNotInteger { ty: Ty::Real });
    }

    #[test]
    fn test_arith_result_types() {
        // `/` promotes to real even over integers, so assigning to an
        // integer must fail.
        let err = analyze(
            "program e; var a: integer; begin a := 6 / 2 end.",
        )
        .unwrap_err();
        assert_eq!(
            err,
            SemError::AssignTypeMismatch {
                var_ty: Ty::Integer,
                expr_ty: Ty::Real,
            }
        );

        analyze("program p; var a: integer; begin a := 6 div 2 + 6 mod 4 end.").unwrap();
    }

    #[test]
    fn test_div_requires_integers() {
        let err = analyze("program e; var x: real; begin x := x div 2 end.").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operador 'DIV' requer dois inteiros, mas recebeu REAL e INTEGER."
        );
    }

    #[test]
    fn test_integer_to_real_coercion_points() {
        analyze("program p; var x: real; begin x := 1 end.").unwrap();
        analyze(
            "program p; function f(x: real): real; begin f := x end;
             var y: real; begin y := f(2) end.",
        )
        .unwrap();
    }

    #[test]
    fn test_function_call_arity_and_types() {
        let err = analyze(
            "program e; function sq(x: integer): integer; begin sq := x * x end;
             var y: integer; begin y := sq(1, 2) end.",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'sq' espera 1 argumentos, mas recebeu 2."
        );

        let err = analyze(
            "program e; function sq(x: integer): integer; begin sq := x * x end;
             var y: integer; begin y := sq(true) end.",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::ArgTypeMismatch { .. }));
    }

    #[test]
    fn test_recursive_function_resolves() {
        analyze(
            "program p;
             function fact(n: integer): integer;
             begin
               if n <= 1 then fact := 1 else fact := n * fact(n - 1)
             end;
             var r: integer;
             begin r := fact(5) end.",
        )
        .unwrap();
    }

    #[test]
    fn test_return_type_mismatch() {
        let err = analyze(
            "program e; function f(x: integer): integer; begin f := true end;
             begin end.",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::ReturnTypeMismatch { .. }));
    }

    #[test]
    fn test_array_indexing() {
        analyze(
            "program p; var v: array[1..3] of integer; i: integer;
             begin v[1] := 10; i := v[2] end.",
        )
        .unwrap();

        let err = analyze(
            "program e; var x: integer; begin x := x[1] end.",
        )
        .unwrap_err();
        assert_eq!(err, SemError::IndexNonArray { ty: Ty::Integer });

        let err = analyze(
            "program e; var v: array[1..3] of integer; begin v[true] := 1 end.",
        )
        .unwrap_err();
        assert_eq!(err, SemError::IndexNotInteger { ty: Ty::Boolean });
    }

    #[test]
    fn test_multi_dimensional_indexing() {
        analyze(
            "program p; var m: array[1..2, 1..3] of integer;
             begin m[1, 2] := 5 end.",
        )
        .unwrap();
    }

    #[test]
    fn test_record_fields() {
        analyze(
            "program p; type ponto = record x, y: integer; end;
             var r: ponto;
             begin r.x := 1; r.y := r.x + 1 end.",
        )
        .unwrap();

        let err = analyze(
            "program e; type ponto = record x: integer; end;
             var r: ponto;
             begin r.z := 1 end.",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::UnknownField { .. }));
    }

    #[test]
    fn test_with_opens_record_fields() {
        analyze(
            "program p; type ponto = record x, y: integer; end;
             var r: ponto;
             begin with r do begin x := 1; y := x + 1 end end.",
        )
        .unwrap();

        let err = analyze(
            "program e; var n: integer; begin with n do n := 1 end.",
        )
        .unwrap_err();
        assert_eq!(err, SemError::WithRequiresRecord { ty: Ty::Integer });
    }

    #[test]
    fn test_builtin_length_and_chr() {
        analyze(
            "program p; var v: array[1..3] of integer; n: integer; c: char;
             begin n := length(v); n := high(v); c := chr(65) end.",
        )
        .unwrap();

        let err = analyze(
            "program e; var n: integer; begin n := length(n) end.",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Função 'length' requer ARRAY, mas recebeu INTEGER."
        );
    }

    #[test]
    fn test_casts() {
        analyze(
            "program p; var x: real; n: integer;
             begin x := real(n); n := integer(x) end.",
        )
        .unwrap();

        let err = analyze(
            "program e; var b: boolean; x: real; begin x := real(b) end.",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::CastOperand { .. }));
    }

    #[test]
    fn test_type_alias_cast() {
        analyze(
            "program p; type idade = 0..150; var n: integer;
             begin n := idade(7) end.",
        )
        .unwrap();
    }

    #[test]
    fn test_in_operator() {
        analyze(
            "program p; var c: char; b: boolean;
             begin b := c in ['a', 'b'] end.",
        )
        .unwrap();

        let err = analyze(
            "program e; var n: integer; b: boolean;
             begin b := n in ['a'] end.",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::InElementMismatch { .. }));
    }

    #[test]
    fn test_case_label_types() {
        analyze(
            "program p; var n: integer; begin case n of 1: n := 2; 2: n := 3; end end.",
        )
        .unwrap();

        let err = analyze(
            "program e; var n: integer; begin case n of 'a': n := 2; end end.",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::CaseLabelType { .. }));
    }

    #[test]
    fn test_labels_and_goto() {
        analyze("program p; label 1; var n: integer; begin 1: n := 0; goto 1 end.")
            .unwrap();

        let err = analyze("program e; begin goto 9 end.").unwrap_err();
        assert_eq!(err, SemError::UndeclaredLabel { label: 9 });
    }

    #[test]
    fn test_texto_char_array_coercion() {
        analyze(
            "program p; var s: array of char; begin s := 'ola' end.",
        )
        .unwrap();
    }

    #[test]
    fn test_file_builtins() {
        analyze(
            "program p; var f: file of integer;
             begin assign(f, 'dados.txt'); rewrite(f); close(f) end.",
        )
        .unwrap();

        let err = analyze(
            "program e; var n: integer; begin close(n) end.",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::FileArgRequired { .. }));
    }

    #[test]
    fn test_read_requires_variable_targets() {
        let err = analyze("program e; begin read(1) end.").unwrap_err();
        assert!(matches!(err, SemError::ReadTargetRequired { .. }));
    }

    #[test]
    fn test_format_width_must_be_integer() {
        analyze(
            "program p; var x: real; begin writeln(x : 8 : 2) end.",
        )
        .unwrap();

        let err = analyze(
            "program e; var x: real; begin writeln(x : true) end.",
        )
        .unwrap_err();
        assert_eq!(err, SemError::FormatWidth { ty: Ty::Boolean });
    }

    #[test]
    fn test_enum_values_are_defined() {
        analyze(
            "program p; type cor = (verde, azul); var c: cor;
             begin c := verde end.",
        )
        .unwrap();
    }
}
