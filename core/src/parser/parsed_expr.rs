use crate::parser::{BinaryOp, Span, UnaryOp};

/// A parsed formula together with the source it was parsed from.
///
/// The source is kept so that errors raised while walking the tree can be
/// positioned in lines and character columns.
#[derive(Debug, Clone, Copy)]
pub struct ParsedExpr<'a> {
    pub expr: &'a Expr<'a>,
    pub source: &'a str,
}

/// A node of the formula syntax tree, allocated in a `bumpalo::Bump` arena.
///
/// Only numbers, identifiers, `+ - * /`, unary `-` and parentheses exist in
/// the formula language, so no other kind of node can be represented.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub span: Span,
}

#[derive(Clone, PartialEq)]
pub enum ExprKind<'a> {
    Number(f64),
    Ident(&'a str),
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Unary {
        op: UnaryOp,
        expr: &'a Expr<'a>,
    },
    Grouped(&'a Expr<'a>),
}

impl<'a> Expr<'a> {
    /// Strips any number of enclosing parentheses.
    #[cfg(test)]
    pub(crate) fn ungrouped(&self) -> &Expr<'a> {
        let mut expr = self;
        while let ExprKind::Grouped(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }
}

impl<'a> core::fmt::Debug for ExprKind<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExprKind::Number(value) => write!(f, "Number({value:?})"),
            ExprKind::Ident(name) => write!(f, "Ident({name})"),
            ExprKind::Binary { op, left, right } => f
                .debug_struct("Binary")
                .field("op", op)
                .field("left", &left.kind)
                .field("right", &right.kind)
                .finish(),
            ExprKind::Unary { op, expr } => f
                .debug_struct("Unary")
                .field("op", op)
                .field("expr", &expr.kind)
                .finish(),
            ExprKind::Grouped(expr) => f.debug_tuple("Grouped").field(&expr.kind).finish(),
        }
    }
}

/// Renders the tree back to formula text with every operation parenthesized.
impl core::fmt::Display for Expr<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            ExprKind::Number(value) => write!(f, "{value:?}"),
            ExprKind::Ident(name) => f.write_str(name),
            ExprKind::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            ExprKind::Unary { op, expr } => write!(f, "({op}{expr})"),
            ExprKind::Grouped(expr) => write!(f, "{expr}"),
        }
    }
}
