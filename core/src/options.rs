//! Configuration options for formula evaluation.

/// Maximum number of characters accepted in a formula.
pub const MAX_FORMULA_LENGTH: usize = 255;

/// Default limit for parse nesting and tree-walk depth.
///
/// Every tree level consumes at least one character, so no formula within
/// `MAX_FORMULA_LENGTH` reaches it.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Limits applied while parsing and evaluating a formula.
///
/// # Example
///
/// ```
/// use batpy_core::EvaluatorOptions;
///
/// let options = EvaluatorOptions {
///     max_length: 1024,
///     ..EvaluatorOptions::default()
/// };
/// assert_eq!(options.max_depth, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Maximum formula length in characters. Longer formulas are rejected
    /// before parsing.
    ///
    /// Default: 255
    pub max_length: usize,

    /// Maximum nesting (open parentheses plus chained unary `-`) accepted by
    /// the parser, and maximum depth of the tree walk.
    ///
    /// Default: 256
    pub max_depth: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_length: MAX_FORMULA_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
