//! Tree-walking evaluator for formulas.
//!
//! The evaluator walks a `ParsedExpr` and produces a single `f64`.
//!
//! ## Design Principles
//!
//! - **Never panic**: Every failure is a `FormulaError`
//! - **Stack-safe**: Depth tracking bounds the recursion of the walk
//! - **Stateless**: Each call builds its own arena; nothing is shared between calls
//!
//! ## Example
//!
//! ```
//! use batpy_core::{Bindings, evaluate_formula};
//!
//! let bindings = Bindings::from_pairs([("a", 1274), ("b", 3), ("c", 91)]).unwrap();
//! assert_eq!(evaluate_formula("a * b / c", Some(&bindings)).unwrap(), 42.0);
//! ```

mod error;
mod eval;
mod operators;


pub use error::{FormulaRuntimeError, RuntimeErrorKind};
pub use eval::Evaluator;

use bumpalo::Bump;

use crate::{bindings::Bindings, errors::FormulaError, options::EvaluatorOptions, parser};

/// Evaluate `formula` with the default limits.
///
/// `bindings` supplies values for variables; `None` means no variables are
/// bound, so any name in the formula is an error.
pub fn evaluate_formula(formula: &str, bindings: Option<&Bindings>) -> Result<f64, FormulaError> {
    evaluate_formula_with_options(formula, bindings, &EvaluatorOptions::default())
}

/// Evaluate `formula` with custom limits.
///
/// Syntax errors (including the length guard and undefined variables) are
/// returned as `FormulaError::Syntax`; arithmetic failures as
/// `FormulaError::Runtime`.
pub fn evaluate_formula_with_options(
    formula: &str,
    bindings: Option<&Bindings>,
    options: &EvaluatorOptions,
) -> Result<f64, FormulaError> {
    tracing::debug!(formula, "evaluating formula");

    let no_bindings = Bindings::new();
    let bindings = bindings.unwrap_or(&no_bindings);

    let arena = Bump::new();
    let result = parser::parse_with_limits(&arena, formula, options)
        .map_err(FormulaError::from)
        .and_then(|parsed| Evaluator::new(options.clone(), parsed, bindings).eval());

    match &result {
        Ok(value) => tracing::trace!(value, "formula evaluated"),
        Err(error) => tracing::debug!(%error, "formula evaluation failed"),
    }
    result
}
