//! Core evaluation logic.

use crate::{
    bindings::Bindings,
    errors::FormulaError,
    evaluator::{FormulaRuntimeError, RuntimeErrorKind, operators},
    options::EvaluatorOptions,
    parser::{Expr, ExprKind, FormulaSyntaxError, ParsedExpr, SyntaxErrorKind},
};

/// Evaluator for parsed formulas.
pub struct Evaluator<'a, 'b> {
    options: EvaluatorOptions,
    /// The formula being evaluated (its source is used for error positions).
    parsed: ParsedExpr<'a>,
    bindings: &'b Bindings,
    depth: usize,
}

impl<'a, 'b> Evaluator<'a, 'b> {
    pub fn new(options: EvaluatorOptions, parsed: ParsedExpr<'a>, bindings: &'b Bindings) -> Self {
        Self {
            options,
            parsed,
            bindings,
            depth: 0,
        }
    }

    /// Evaluate the formula to a single finite `f64`.
    pub fn eval(&mut self) -> Result<f64, FormulaError> {
        self.eval_expr(self.parsed.expr)
    }

    fn syntax_error(&self, expr: &Expr<'a>, kind: SyntaxErrorKind) -> FormulaError {
        FormulaSyntaxError::at(self.parsed.source, expr.span.clone(), kind).into()
    }

    fn runtime_error(&self, expr: &Expr<'a>, kind: RuntimeErrorKind) -> FormulaError {
        FormulaRuntimeError::new(kind, Some(expr.span.clone())).into()
    }

    /// Evaluate an expression node.
    fn eval_expr(&mut self, expr: &'a Expr<'a>) -> Result<f64, FormulaError> {
        // Check depth before recursing
        if self.depth >= self.options.max_depth {
            return Err(self.runtime_error(
                expr,
                RuntimeErrorKind::DepthExceeded {
                    depth: self.depth + 1,
                    max_depth: self.options.max_depth,
                },
            ));
        }

        self.depth += 1;
        let result = self.eval_expr_inner(expr);
        self.depth -= 1;

        result
    }

    /// Inner evaluation logic (no depth tracking).
    fn eval_expr_inner(&mut self, expr: &'a Expr<'a>) -> Result<f64, FormulaError> {
        match &expr.kind {
            ExprKind::Number(value) => {
                operators::finite(*value).map_err(|kind| self.runtime_error(expr, kind))
            }

            ExprKind::Ident(name) => self.bindings.get(name).ok_or_else(|| {
                self.syntax_error(
                    expr,
                    SyntaxErrorKind::UndefinedVariable {
                        name: name.to_string(),
                    },
                )
            }),

            ExprKind::Binary { op, left, right } => {
                // Left before right: the first failure is the one reported.
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                operators::eval_binary(*op, left, right).map_err(|kind| self.runtime_error(expr, kind))
            }

            ExprKind::Unary { op, expr: operand } => {
                let operand = self.eval_expr(operand)?;
                Ok(operators::eval_unary(*op, operand))
            }

            ExprKind::Grouped(inner) => self.eval_expr(inner),
        }
    }
}
