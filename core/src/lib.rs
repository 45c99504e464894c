//! Restricted arithmetic formula evaluation.
//!
//! A formula is a short piece of text combining numbers, bound variables, the
//! operators `+ - * /`, unary `-` and parentheses. Anything else is rejected
//! with a positioned syntax error before evaluation starts.
//!
//! ```
//! use batpy_core::evaluate_formula;
//!
//! assert_eq!(evaluate_formula("1 + 2 * (3.0 / 4.0) - 0.5 + 40", None).unwrap(), 42.0);
//! assert!(evaluate_formula("1 ** 42", None).unwrap_err().is_syntax());
//! assert!(evaluate_formula("42/0", None).unwrap_err().is_runtime());
//! ```

pub mod bindings;
pub mod chunk;
pub mod errors;
pub mod evaluator;
pub mod options;
pub mod parser;

pub use bindings::{BindingError, BindingValue, Bindings};
pub use chunk::{
    CellSource, CellTable, CellValue, Chunk, ChunkError, ChunkSource, assemble_formula,
    evaluate_chunks, evaluate_chunks_with_options,
};
pub use errors::FormulaError;
pub use evaluator::{
    Evaluator, FormulaRuntimeError, RuntimeErrorKind, evaluate_formula,
    evaluate_formula_with_options,
};
pub use options::{DEFAULT_MAX_DEPTH, EvaluatorOptions, MAX_FORMULA_LENGTH};
pub use parser::{FormulaSyntaxError, Span, SyntaxErrorKind};
