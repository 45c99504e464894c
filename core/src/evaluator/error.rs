//! Runtime evaluation errors.
//!
//! These are failures of the arithmetic itself. Anything wrong with the
//! formula text (including names missing from the bindings) is a
//! `FormulaSyntaxError` instead.

use thiserror::Error;

use crate::parser::Span;

/// Why evaluation of a well-formed formula failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeErrorKind {
    /// The divisor of `/` evaluated to zero (of either sign).
    #[error("division by zero")]
    DivisionByZero,

    /// A literal or intermediate result is not a finite `f64`.
    #[error("numeric overflow")]
    Overflow,

    /// The tree walk went deeper than the configured limit.
    #[error("evaluation depth {depth} exceeds maximum of {max_depth}")]
    DepthExceeded { depth: usize, max_depth: usize },
}

/// Runtime failure while evaluating a formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Evaluation failed: {kind}")]
pub struct FormulaRuntimeError {
    pub kind: RuntimeErrorKind,
    /// Byte range of the sub-expression that failed, for rendering.
    pub span: Option<Span>,
}

impl FormulaRuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }
}

impl From<RuntimeErrorKind> for FormulaRuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        Self { kind, span: None }
    }
}
