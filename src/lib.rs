//! batpy - Restricted arithmetic formulas for battery-costing workbooks
//!
//! # Overview
//!
//! Values copied between spreadsheet-driven models are often described by a
//! small formula: a few numbers, some named quantities and the four basic
//! arithmetic operators. This crate evaluates such formulas safely. Only
//! numeric literals, bound variables, `+ - * /`, unary `-` and parentheses are
//! accepted; everything else is a positioned syntax error.
//!
//! # Quick Start
//!
//! ```
//! use batpy::{Bindings, evaluate_formula};
//!
//! let bindings = Bindings::from_pairs([("a", 1274), ("b", 3), ("c", 91)]).unwrap();
//! assert_eq!(evaluate_formula("a * b / c", Some(&bindings)).unwrap(), 42.0);
//! ```
//!
//! # Errors
//!
//! Evaluation either returns one finite `f64` or fails with a [`FormulaError`]:
//!
//! 1. **Syntax** (`FormulaError::Syntax`): unsupported or malformed input,
//!    formulas over 255 characters, undefined variables. Carries a 1-based
//!    line and column.
//! 2. **Runtime** (`FormulaError::Runtime`): division by zero or a result
//!    that is not finite.
//!
//! Use [`render_error`] to print either kind with the formula underlined.
//!
//! # Chunks
//!
//! Workbook configurations describe formulas as lists of chunks that mix
//! literal text with cell references. See [`assemble_formula`] and
//! [`evaluate_chunks`].

pub use batpy_core::{
    BindingError, BindingValue, Bindings, CellSource, CellTable, CellValue, Chunk, ChunkError,
    ChunkSource, DEFAULT_MAX_DEPTH, EvaluatorOptions, FormulaError, FormulaRuntimeError,
    FormulaSyntaxError, MAX_FORMULA_LENGTH, RuntimeErrorKind, Span, SyntaxErrorKind,
    assemble_formula, evaluate_chunks, evaluate_chunks_with_options, evaluate_formula,
    evaluate_formula_with_options,
};

mod error_renderer;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
