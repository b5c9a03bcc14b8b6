//! pasc-gen - SVM code generator.
//!
//! Lowers a checked AST to the textual stack-VM assembly dialect. Emission
//! runs in four phases:
//!
//! 1. **Symbol-table build**: one pass over the top-level declarations
//!    harvesting type aliases, constants (folded eagerly where bounds need
//!    them), subroutine signatures, and variable slots. Array globals
//!    allocate their heap backing in the prologue (`PUSHI n; ALLOCN;
//!    STOREG k`).
//! 2. **Program body**: `START`, the statement list, `STOP`.
//! 3. **Subprogram bodies**: label, scoped symbol-table snapshot with
//!    parameters as frame locals, body, epilogue, `RETURN`.
//! 4. **Flush**: the instruction buffer is the result.
//!
//! The generator keeps its own slot tables and does not consult the
//! semantic analyzer; the driver guarantees analysis ran first.

pub mod error;
pub mod expr;
pub mod fold;
pub mod stmt;

pub use error::{GenError, Result};

use indexmap::IndexMap;
use pasc_lex::SimpleType;
use pasc_par::{Block, Decl, FunctionDecl, ProcedureDecl, Program, TypeExpr};
use pasc_util::Symbol;
use rustc_hash::FxHashMap;

/// A storage slot descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Scalar global at a numbered offset.
    Global { offset: usize, is_char: bool },
    /// Scalar frame local (parameters, result slot, body locals).
    Local { offset: usize, is_char: bool },
    /// Array global: offset of the backing pointer, declared low bound,
    /// element count, and whether elements are chars (for `read`).
    Array {
        offset: usize,
        low: i64,
        size: i64,
        char_elem: bool,
    },
    /// Named constant, lowered by re-emitting its expression.
    Const(pasc_par::Expr),
}

/// A registered subroutine: its label and argument count.
#[derive(Debug, Clone, PartialEq)]
pub struct Subroutine {
    pub label: String,
    pub nargs: usize,
}

/// The code generator.
pub struct CodeGenerator {
    /// Name → slot. Snapshotted and rebound around subprogram bodies.
    symtab: FxHashMap<Symbol, Slot>,
    /// Named constants, for the folder.
    consts: FxHashMap<Symbol, pasc_par::Expr>,
    /// Subroutine registry in declaration order.
    subroutines: IndexMap<Symbol, Subroutine>,
    /// Type aliases harvested from `type` sections.
    types: FxHashMap<Symbol, TypeExpr>,
    /// Append-only instruction buffer.
    code: Vec<String>,
    /// Next free global offset.
    offset: usize,
    /// Monotonic counter for control-flow labels.
    label_counter: usize,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            symtab: FxHashMap::default(),
            consts: FxHashMap::default(),
            subroutines: IndexMap::new(),
            types: FxHashMap::default(),
            code: Vec::new(),
            offset: 0,
            label_counter: 0,
        }
    }

    /// Lowers a program to its instruction list.
    pub fn generate(mut self, program: &Program) -> Result<Vec<String>> {
        self.build_symtab(&program.block)?;

        self.emit("START");
        for stmt in &program.block.body {
            self.gen_stmt(stmt)?;
        }
        self.emit("STOP");

        for decl in &program.block.decls {
            match decl {
                Decl::Function(func) => self.gen_function(func)?,
                Decl::Procedure(proc) => self.gen_procedure(proc)?,
                _ => {},
            }
        }

        Ok(self.code)
    }

    /// Appends one instruction (or label) line.
    pub(crate) fn emit(&mut self, instr: impl Into<String>) {
        self.code.push(instr.into());
    }

    /// Allocates the next control-flow label counter value.
    pub(crate) fn next_label(&mut self) -> usize {
        let value = self.label_counter;
        self.label_counter += 1;
        value
    }

    pub(crate) fn slot(&self, name: Symbol) -> Option<Slot> {
        self.symtab.get(&name).cloned()
    }

    pub(crate) fn consts(&self) -> &FxHashMap<Symbol, pasc_par::Expr> {
        &self.consts
    }

    pub(crate) fn subroutine(&self, name: Symbol) -> Option<Subroutine> {
        self.subroutines.get(&name).cloned()
    }

    // =========================================================================
    // Phase 1: symbol-table build
    // =========================================================================

    fn build_symtab(&mut self, block: &Block) -> Result<()> {
        // Type aliases first: variable declarations resolve through them.
        for decl in &block.decls {
            if let Decl::Types(defs) = decl {
                for def in defs {
                    self.types.insert(def.name, def.ty.clone());
                }
            }
        }

        // Constants next: array bounds fold through them.
        for decl in &block.decls {
            if let Decl::Consts(defs) = decl {
                for def in defs {
                    self.consts.insert(def.name, def.value.clone());
                    self.symtab.insert(def.name, Slot::Const(def.value.clone()));
                }
            }
        }

        // Subroutine registry: label is the uppercased name, arity counts
        // parameter names across groups.
        for decl in &block.decls {
            match decl {
                Decl::Function(func) => {
                    self.register_subroutine(func.name, &func.params);
                },
                Decl::Procedure(proc) => {
                    self.register_subroutine(proc.name, &proc.params);
                },
                _ => {},
            }
        }

        // Globals: one offset per scalar, arrays also allocate their backing
        // in the prologue.
        for decl in &block.decls {
            if let Decl::Vars(groups) = decl {
                for group in groups {
                    let ty = self.resolve_alias(&group.ty);
                    for name in &group.names {
                        self.declare_global(*name, &ty)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn register_subroutine(&mut self, name: Symbol, params: &[pasc_par::Param]) {
        let nargs = params.iter().map(|p| p.names.len()).sum();
        let label = name.as_str().to_uppercase();
        self.subroutines.insert(name, Subroutine { label, nargs });
    }

    fn declare_global(&mut self, name: Symbol, ty: &TypeExpr) -> Result<()> {
        match ty {
            TypeExpr::Array { ranges, elem } => {
                if ranges.len() != 1 {
                    return Err(GenError::MultiDimArray);
                }
                let low = fold::fold_int(&ranges[0].0, &self.consts)?;
                let high = fold::fold_int(&ranges[0].1, &self.consts)?;
                let size = high - low + 1;

                self.emit(format!("PUSHI {size}"));
                self.emit("ALLOCN");
                self.emit(format!("STOREG {}", self.offset));

                self.symtab.insert(
                    name,
                    Slot::Array {
                        offset: self.offset,
                        low,
                        size,
                        char_elem: self.is_char_type(elem),
                    },
                );
                self.offset += 1;
            },
            other => {
                let is_char = self.is_char_type(other);
                self.symtab.insert(
                    name,
                    Slot::Global {
                        offset: self.offset,
                        is_char,
                    },
                );
                self.offset += 1;
            },
        }
        Ok(())
    }

    /// Follows `type` aliases down to a structural type expression.
    fn resolve_alias(&self, ty: &TypeExpr) -> TypeExpr {
        let mut current = ty.clone();
        let mut fuel = 32;
        while let TypeExpr::Named(name) = &current {
            match self.types.get(name) {
                Some(resolved) if fuel > 0 => {
                    fuel -= 1;
                    current = resolved.clone();
                },
                _ => break,
            }
        }
        current
    }

    /// True when a (possibly aliased) type is `char`; `read` destinations
    /// of that type convert with `CHARAT` instead of `ATOI`.
    fn is_char_type(&self, ty: &TypeExpr) -> bool {
        matches!(
            self.resolve_alias(ty),
            TypeExpr::Simple(SimpleType::Char)
        )
    }

    // =========================================================================
    // Phase 3: subprogram bodies
    // =========================================================================

    /// Emits a function body.
    ///
    /// Parameters bind to frame locals `0..nargs` in declaration order; the
    /// function's own name binds to local `nargs`, the result slot, so a
    /// source assignment to it is an ordinary `STOREL nargs`. The epilogue
    /// pushes the slot and returns.
    fn gen_function(&mut self, func: &FunctionDecl) -> Result<()> {
        let sub = self
            .subroutine(func.name)
            .ok_or(GenError::UnknownCallee { name: func.name })?;
        self.emit(format!("{}:", sub.label));

        let saved_symtab = self.symtab.clone();
        let saved_consts = self.consts.clone();

        let nargs = self.bind_params(&func.params);
        self.symtab.insert(
            func.name,
            Slot::Local {
                offset: nargs,
                is_char: false,
            },
        );
        self.bind_body_locals(&func.block, nargs + 1)?;

        for stmt in &func.block.body {
            self.gen_stmt(stmt)?;
        }
        self.emit(format!("PUSHL {nargs}"));
        self.emit("RETURN");

        self.symtab = saved_symtab;
        self.consts = saved_consts;
        Ok(())
    }

    /// Emits a procedure body: parameters as locals, then `RETURN`.
    fn gen_procedure(&mut self, proc: &ProcedureDecl) -> Result<()> {
        let sub = self
            .subroutine(proc.name)
            .ok_or(GenError::UnknownCallee { name: proc.name })?;
        self.emit(format!("{}:", sub.label));

        let saved_symtab = self.symtab.clone();
        let saved_consts = self.consts.clone();

        let nargs = self.bind_params(&proc.params);
        self.bind_body_locals(&proc.block, nargs)?;

        for stmt in &proc.block.body {
            self.gen_stmt(stmt)?;
        }
        self.emit("RETURN");

        self.symtab = saved_symtab;
        self.consts = saved_consts;
        Ok(())
    }

    /// Binds parameter names to locals `0..n` in declaration order.
    fn bind_params(&mut self, params: &[pasc_par::Param]) -> usize {
        let mut local = 0usize;
        for param in params {
            let is_char = self.is_char_type(&param.ty);
            for name in &param.names {
                self.symtab.insert(
                    *name,
                    Slot::Local {
                        offset: local,
                        is_char,
                    },
                );
                local += 1;
            }
        }
        local
    }

    /// Binds a subprogram block's own declarations: scalar locals take frame
    /// slots from `first_local` upward; constants join the fold tables.
    fn bind_body_locals(&mut self, block: &Block, first_local: usize) -> Result<()> {
        let mut next_local = first_local;
        for decl in &block.decls {
            match decl {
                Decl::Vars(groups) => {
                    for group in groups {
                        let ty = self.resolve_alias(&group.ty);
                        for name in &group.names {
                            if matches!(ty, TypeExpr::Array { .. } | TypeExpr::OpenArray(_)) {
                                return Err(GenError::LocalArray { name: *name });
                            }
                            let is_char = self.is_char_type(&ty);
                            self.symtab.insert(
                                *name,
                                Slot::Local {
                                    offset: next_local,
                                    is_char,
                                },
                            );
                            next_local += 1;
                        }
                    }
                },
                Decl::Consts(defs) => {
                    for def in defs {
                        self.consts.insert(def.name, def.value.clone());
                        self.symtab.insert(def.name, Slot::Const(def.value.clone()));
                    }
                },
                Decl::Types(defs) => {
                    for def in defs {
                        self.types.insert(def.name, def.ty.clone());
                    }
                },
                Decl::Labels(_) => {},
                Decl::Function(_) | Decl::Procedure(_) => {
                    return Err(GenError::NestedSubprogram);
                },
            }
        }
        Ok(())
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
