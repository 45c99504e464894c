use thiserror::Error;

use crate::evaluator::FormulaRuntimeError;
use crate::parser::{FormulaSyntaxError, Span};

/// Any failure of `evaluate_formula`.
///
/// Match on the variant to handle syntax and runtime failures separately, or
/// treat both alike through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error(transparent)]
    Syntax(#[from] FormulaSyntaxError),

    #[error(transparent)]
    Runtime(#[from] FormulaRuntimeError),
}

impl FormulaError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, FormulaError::Syntax(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, FormulaError::Runtime(_))
    }

    /// Byte range of the offending text, when one is known.
    pub fn span(&self) -> Option<&Span> {
        match self {
            FormulaError::Syntax(err) => Some(&err.span),
            FormulaError::Runtime(err) => err.span.as_ref(),
        }
    }
}
