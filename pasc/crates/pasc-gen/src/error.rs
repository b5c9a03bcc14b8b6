//! Error types for SVM code generation.

use pasc_util::Symbol;
use thiserror::Error;

/// Error type for code generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    /// A constant name referenced in a foldable position is not defined.
    #[error("Constante não definida: {name}")]
    UndefinedConstant { name: Symbol },

    /// An expression required to fold at compile time does not.
    #[error("Expressão constante não suportada.")]
    NonConstant,

    /// A non-arithmetic operator inside a constant expression.
    #[error("Operador constante não suportado: {op}")]
    UnsupportedConstOperator { op: &'static str },

    /// An array bound folded to a non-integer.
    #[error("Limite de array deve ser inteiro.")]
    NonIntegerBound,

    /// Callee is not a registered subroutine.
    #[error("Chamada não declarada: {name}")]
    UnknownCallee { name: Symbol },

    /// Argument count does not match the registered arity.
    #[error("{name} espera {expected} args, recebeu {got}")]
    CallArity {
        name: Symbol,
        expected: usize,
        got: usize,
    },

    /// Operator with no lowering for its operand shapes.
    #[error("Operador não suportado: {op}")]
    UnsupportedOperator { op: &'static str },

    /// Assignment to something without a storage slot.
    #[error("Atribuição inválida: {name}")]
    InvalidAssign { name: Symbol },

    /// Assignment target that is not a variable path.
    #[error("Destino de atribuição inválido.")]
    InvalidAssignTarget,

    /// Name without a usable slot in an expression position.
    #[error("Variável ou uso incorreto: {name}")]
    VariableMisuse { name: Symbol },

    /// A `read` destination that is not in the symbol table.
    #[error("Variável não encontrada: {name}")]
    UnknownVariable { name: Symbol },

    /// Indexing a name that has no array slot.
    #[error("Uso incorreto: {name} não é array")]
    NotAnArray { name: Symbol },

    /// `read`/`readln` argument that is not a variable or array element.
    #[error("{name} requer variáveis ou arrays")]
    ReadTarget { name: Symbol },

    /// A cast call with the wrong arity.
    #[error("{name}() espera 1 argumento")]
    CastArity { name: Symbol },

    // The SVM dialect has no addressing for these constructs; the front-end
    // accepts them, emission rejects them.
    #[error("Instrução 'with' não suportada na geração de código.")]
    WithUnsupported,

    #[error("Registos não suportados na geração de código.")]
    RecordUnsupported,

    #[error("Conjuntos não suportados na geração de código.")]
    SetUnsupported,

    #[error("Ficheiros não suportados na geração de código.")]
    FileUnsupported,

    #[error("Arrays multidimensionais não suportados na geração de código.")]
    MultiDimArray,

    #[error("Array local '{name}' não suportado na geração de código.")]
    LocalArray { name: Symbol },

    #[error("Subprogramas aninhados não suportados na geração de código.")]
    NestedSubprogram,

    #[error("Literal 'nil' não suportado na geração de código.")]
    NilUnsupported,
}

/// Result type alias for code generation operations.
pub type Result<T> = std::result::Result<T, GenError>;
