//! Semantic errors.
//!
//! Messages are user-facing Portuguese diagnostics. Any of them aborts the
//! pipeline; there is no recovery after the first semantic fault.

use pasc_util::Symbol;
use thiserror::Error;

use crate::types::Ty;

/// Error type for semantic analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemError {
    #[error("Variável '{name}' já foi declarada neste escopo.")]
    DuplicateDeclaration { name: Symbol },

    #[error("Variável '{name}' usada mas não declarada.")]
    Undeclared { name: Symbol },

    #[error("Constante '{name}' já declarada.")]
    DuplicateConstant { name: Symbol },

    #[error("'{name}' não é uma variável.")]
    NotAVariable { name: Symbol },

    #[error("'{name}' não é um tipo.")]
    NotAType { name: Symbol },

    #[error("'{name}' não é função nem procedimento.")]
    NotCallable { name: Symbol },

    #[error("Tipos incompatíveis: variável é {var_ty}, mas expressão é {expr_ty}.")]
    AssignTypeMismatch { var_ty: Ty, expr_ty: Ty },

    #[error("Valor de retorno de '{name}' deve ser {expected}, mas é {got}.")]
    ReturnTypeMismatch {
        name: Symbol,
        expected: Ty,
        got: Ty,
    },

    #[error("Operador '{op}' só pode ser aplicado a tipos numéricos, mas recebeu {lhs} e {rhs}.")]
    ArithOperandTypes { op: &'static str, lhs: Ty, rhs: Ty },

    #[error("Operador '{op}' requer dois inteiros, mas recebeu {lhs} e {rhs}.")]
    DivRequiresIntegers { op: &'static str, lhs: Ty, rhs: Ty },

    #[error("Comparação '{op}' requer operandos compatíveis, mas recebeu {lhs} e {rhs}.")]
    EqualityIncompatible { op: &'static str, lhs: Ty, rhs: Ty },

    #[error("Operador '{op}' não suportado para tipo {ty}.")]
    EqualityUnsupported { op: &'static str, ty: Ty },

    #[error("Operador relacional '{op}' não suportado para tipos {lhs} e {rhs}.")]
    OrderingUnsupported { op: &'static str, lhs: Ty, rhs: Ty },

    #[error("Operador lógico '{op}' requer dois operandos BOOLEAN, mas recebeu {lhs} e {rhs}.")]
    LogicalOperands { op: &'static str, lhs: Ty, rhs: Ty },

    #[error("Operador 'not' requer um operando BOOLEAN, mas recebeu {ty}.")]
    NotOperand { ty: Ty },

    #[error("Operador 'in' requer um conjunto à direita, mas recebeu {ty}.")]
    InRequiresSet { ty: Ty },

    #[error("Operador 'in' requer elemento do tipo {elem}, mas recebeu {ty}.")]
    InElementMismatch { elem: Ty, ty: Ty },

    #[error("A condição do IF deve ser BOOLEAN, mas foi {ty}.")]
    IfCondition { ty: Ty },

    #[error("Condição de WHILE deve ser BOOLEAN, mas é {ty}.")]
    WhileCondition { ty: Ty },

    #[error("Condição de REPEAT deve ser BOOLEAN, mas é {ty}.")]
    RepeatCondition { ty: Ty },

    #[error("Variável de controlo do FOR '{name}' deve ser INTEGER, mas é {ty}.")]
    ForVarNotInteger { name: Symbol, ty: Ty },

    #[error("Expressão inicial do FOR deve ser INTEGER, mas é {ty}.")]
    ForStartNotInteger { ty: Ty },

    #[error("Expressão final do FOR deve ser INTEGER, mas é {ty}.")]
    ForEndNotInteger { ty: Ty },

    #[error("Tentativa de indexar uma variável que não é um array: {ty}")]
    IndexNonArray { ty: Ty },

    #[error("Índice de array deve ser INTEGER, mas é {ty}.")]
    IndexNotInteger { ty: Ty },

    #[error("Acesso a campo requer um registo, mas recebeu {ty}.")]
    FieldOnNonRecord { ty: Ty },

    #[error("Campo '{field}' não existe no registo '{record}'.")]
    UnknownField { record: Symbol, field: Symbol },

    #[error("'{name}' espera {expected} argumentos, mas recebeu {got}.")]
    ArityMismatch {
        name: Symbol,
        expected: usize,
        got: usize,
    },

    #[error("Argumento para '{param}' deve ser {expected}, mas recebeu {got}.")]
    ArgTypeMismatch {
        param: Symbol,
        expected: Ty,
        got: Ty,
    },

    #[error("Função 'length' espera 1 argumento, mas recebeu {got}.")]
    LengthArity { got: usize },

    #[error("Função 'length' requer ARRAY, mas recebeu {ty}.")]
    LengthRequiresArray { ty: Ty },

    #[error("Função 'high' espera 1 argumento, mas recebeu {got}.")]
    HighArity { got: usize },

    #[error("Função 'high' requer ARRAY, mas recebeu {ty}.")]
    HighRequiresArray { ty: Ty },

    #[error("Função 'chr' espera 1 argumento, mas recebeu {got}.")]
    ChrArity { got: usize },

    #[error("Função 'chr' requer INTEGER, mas recebeu {ty}.")]
    ChrRequiresInteger { ty: Ty },

    #[error("Conversão '{name}' espera 1 argumento, mas recebeu {got}.")]
    CastArity { name: Symbol, got: usize },

    #[error("Conversão '{name}' requer operando numérico, mas recebeu {ty}.")]
    CastOperand { name: Symbol, ty: Ty },

    #[error("Procedimento '{name}' requer uma variável FILE, mas recebeu {ty}.")]
    FileArgRequired { name: Symbol, ty: Ty },

    #[error("Procedimento 'assign' requer um nome TEXTO, mas recebeu {ty}.")]
    AssignNameRequired { ty: Ty },

    #[error("Procedimento '{name}' requer variáveis como argumentos.")]
    ReadTargetRequired { name: Symbol },

    #[error("Procedimento '{name}' não devolve valor.")]
    ProcedureInExpression { name: Symbol },

    #[error("Label '{label}' não declarado.")]
    UndeclaredLabel { label: i64 },

    #[error("WITH requer variáveis de tipo RECORD, mas recebeu {ty}.")]
    WithRequiresRecord { ty: Ty },

    #[error("Etiqueta de CASE deve ser {expected}, mas é {got}.")]
    CaseLabelType { expected: Ty, got: Ty },

    #[error("Largura de formato deve ser INTEGER, mas é {ty}.")]
    FormatWidth { ty: Ty },

    #[error("Conjunto vazio não é suportado.")]
    EmptySetLiteral,

    #[error("Elementos de conjunto devem ter o mesmo tipo: {first} e {other}.")]
    SetElementMismatch { first: Ty, other: Ty },

    #[error("Literal 'nil' não suportado neste contexto.")]
    NilLiteral,
}

/// Result type alias for semantic analysis.
pub type Result<T> = std::result::Result<T, SemError>;
