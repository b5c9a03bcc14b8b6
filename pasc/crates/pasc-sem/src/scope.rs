//! Scope tree for name resolution.
//!
//! Scopes form a tree held in one arena vector; a scope refers to its parent
//! by index, so the back-reference carries no ownership (the tree is
//! acyclic by construction). Resolution walks the parent chain; definition
//! touches only the current scope, which is what allows shadowing.

use indexmap::IndexMap;
use pasc_par::ParamMode;
use pasc_util::Symbol;
use rustc_hash::FxHashMap;

use crate::error::{Result, SemError};
use crate::types::Ty;

/// Index of a scope in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A resolved parameter signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSig {
    pub name: Symbol,
    pub ty: Ty,
    pub mode: ParamMode,
}

/// Built-in procedures, implemented directly by the code generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinProc {
    Write,
    Writeln,
    Read,
    Readln,
    Rewrite,
    Assign,
    Close,
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFn {
    Length,
    High,
    Chr,
}

/// What a bound name denotes.
#[derive(Debug, Clone, PartialEq)]
pub enum SymKind {
    Variable(Ty),
    Constant(Ty),
    Function {
        params: Vec<ParamSig>,
        return_type: Ty,
    },
    Procedure {
        params: Vec<ParamSig>,
    },
    TypeAlias(Ty),
    /// A record type with its field map (declaration order preserved).
    RecordType(IndexMap<Symbol, Ty>),
    /// A constant of an enumerated type.
    EnumValue(Ty),
    Label,
    BuiltinProc(BuiltinProc),
    BuiltinFn(BuiltinFn),
}

/// A bound entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInfo {
    pub name: Symbol,
    pub kind: SymKind,
}

/// One scope: bindings plus a parent link.
#[derive(Debug)]
struct Scope {
    bindings: FxHashMap<Symbol, SymbolInfo>,
    parent: Option<ScopeId>,
}

/// The scope tree.
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// Creates a tree holding only the (empty) global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                bindings: FxHashMap::default(),
                parent: None,
            }],
            current: ScopeId(0),
        }
    }

    /// Opens a child of the current scope and makes it current.
    pub fn enter_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            bindings: FxHashMap::default(),
            parent: Some(self.current),
        });
        self.current = id;
        id
    }

    /// Returns to the parent of the current scope.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.index()].parent {
            self.current = parent;
        }
    }

    /// Binds `name` in the current scope; rebinding it there is an error.
    pub fn define(&mut self, name: Symbol, kind: SymKind) -> Result<()> {
        let scope = &mut self.scopes[self.current.index()];
        if scope.bindings.contains_key(&name) {
            return Err(SemError::DuplicateDeclaration { name });
        }
        scope.bindings.insert(name, SymbolInfo { name, kind });
        Ok(())
    }

    /// True when `name` is bound in the current scope itself.
    pub fn defined_here(&self, name: Symbol) -> bool {
        self.scopes[self.current.index()].bindings.contains_key(&name)
    }

    /// Binds `name` in the current scope, replacing any existing binding.
    ///
    /// Only `with` uses this: when two listed records share a field name,
    /// the later record wins, as its fields are the innermost.
    pub fn shadow(&mut self, name: Symbol, kind: SymKind) {
        let scope = &mut self.scopes[self.current.index()];
        scope.bindings.insert(name, SymbolInfo { name, kind });
    }

    /// Resolves `name`, walking the parent chain.
    pub fn resolve(&self, name: Symbol) -> Option<&SymbolInfo> {
        let mut id = self.current;
        loop {
            let scope = &self.scopes[id.index()];
            if let Some(info) = scope.bindings.get(&name) {
                return Some(info);
            }
            id = scope.parent?;
        }
    }

    /// Like [`Self::resolve`], reporting the scope that bound the name.
    /// Used by tests establishing the single-definition invariant.
    pub fn resolve_with_scope(&self, name: Symbol) -> Option<(ScopeId, &SymbolInfo)> {
        let mut id = self.current;
        loop {
            let scope = &self.scopes[id.index()];
            if let Some(info) = scope.bindings.get(&name) {
                return Some((id, info));
            }
            id = scope.parent?;
        }
    }

    /// The current scope id.
    pub fn current(&self) -> ScopeId {
        self.current
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn test_define_and_resolve() {
        let mut tree = ScopeTree::new();
        tree.define(sym("x"), SymKind::Variable(Ty::Integer)).unwrap();

        let info = tree.resolve(sym("x")).unwrap();
        assert_eq!(info.kind, SymKind::Variable(Ty::Integer));
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut tree = ScopeTree::new();
        tree.define(sym("x"), SymKind::Variable(Ty::Integer)).unwrap();
        assert_eq!(
            tree.define(sym("x"), SymKind::Variable(Ty::Real)),
            Err(SemError::DuplicateDeclaration { name: sym("x") })
        );
    }

    #[test]
    fn test_shadowing_resolves_to_innermost() {
        let mut tree = ScopeTree::new();
        tree.define(sym("x"), SymKind::Variable(Ty::Integer)).unwrap();

        let inner = tree.enter_scope();
        tree.define(sym("x"), SymKind::Variable(Ty::Real)).unwrap();

        let (found_in, info) = tree.resolve_with_scope(sym("x")).unwrap();
        assert_eq!(found_in, inner);
        assert_eq!(info.kind, SymKind::Variable(Ty::Real));

        tree.exit_scope();
        let info = tree.resolve(sym("x")).unwrap();
        assert_eq!(info.kind, SymKind::Variable(Ty::Integer));
    }

    #[test]
    fn test_resolution_walks_parents() {
        let mut tree = ScopeTree::new();
        tree.define(sym("global"), SymKind::Variable(Ty::Boolean))
            .unwrap();
        tree.enter_scope();
        tree.enter_scope();
        assert!(tree.resolve(sym("global")).is_some());
        assert!(tree.resolve(sym("inexistente")).is_none());
    }

    #[test]
    fn test_sibling_scopes_do_not_leak() {
        let mut tree = ScopeTree::new();
        tree.enter_scope();
        tree.define(sym("local"), SymKind::Variable(Ty::Integer))
            .unwrap();
        tree.exit_scope();

        tree.enter_scope();
        assert!(tree.resolve(sym("local")).is_none());
    }
}
