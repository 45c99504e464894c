mod parsed_expr;
pub mod parser;
mod syntax;
pub mod error;

// Re-export the parser and rule enum for external use
pub use parser::FormulaParser;
pub use parser::Rule;
pub use parser::parse;
pub use parser::parse_with_limits;

pub use parsed_expr::{Expr, ExprKind, ParsedExpr};
pub use syntax::{BinaryOp, Span, UnaryOp, byte_offset_to_char_offset, line_col};
pub use error::{FormulaSyntaxError, SyntaxErrorKind};
