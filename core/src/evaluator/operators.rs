//! Binary and unary operator implementations.

use crate::{
    evaluator::RuntimeErrorKind,
    parser::{BinaryOp, UnaryOp},
};

/// Evaluate a binary operation on two floats.
///
/// Unlike plain IEEE 754 arithmetic, a zero divisor and any non-finite result
/// are errors rather than `inf` or `nan`.
pub(super) fn eval_binary(op: BinaryOp, left: f64, right: f64) -> Result<f64, RuntimeErrorKind> {
    let result = match op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => {
            if right == 0.0 {
                return Err(RuntimeErrorKind::DivisionByZero);
            }
            left / right
        }
    };
    finite(result)
}

pub(super) fn eval_unary(op: UnaryOp, operand: f64) -> f64 {
    match op {
        UnaryOp::Neg => -operand,
    }
}

pub(super) fn finite(value: f64) -> Result<f64, RuntimeErrorKind> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RuntimeErrorKind::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        assert_eq!(eval_binary(BinaryOp::Add, 2.0, 3.0).unwrap(), 5.0);
        assert_eq!(eval_binary(BinaryOp::Add, -5.0, 3.0).unwrap(), -2.0);
    }

    #[test]
    fn test_sub() {
        assert_eq!(eval_binary(BinaryOp::Sub, 10.0, 4.0).unwrap(), 6.0);
        assert_eq!(eval_binary(BinaryOp::Sub, 3.0, 10.0).unwrap(), -7.0);
    }

    #[test]
    fn test_mul() {
        assert_eq!(eval_binary(BinaryOp::Mul, 3.0, 4.0).unwrap(), 12.0);
        assert_eq!(eval_binary(BinaryOp::Mul, -2.0, 5.0).unwrap(), -10.0);
    }

    #[test]
    fn test_div_is_true_division() {
        assert_eq!(eval_binary(BinaryOp::Div, 7.0, 2.0).unwrap(), 3.5);
        assert_eq!(eval_binary(BinaryOp::Div, 10.0, 3.0).unwrap(), 10.0 / 3.0);
    }

    #[test]
    fn test_div_by_zero() {
        assert_eq!(
            eval_binary(BinaryOp::Div, 10.0, 0.0),
            Err(RuntimeErrorKind::DivisionByZero)
        );
        assert_eq!(
            eval_binary(BinaryOp::Div, 10.0, -0.0),
            Err(RuntimeErrorKind::DivisionByZero)
        );
        assert_eq!(
            eval_binary(BinaryOp::Div, 0.0, 0.0),
            Err(RuntimeErrorKind::DivisionByZero)
        );
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            eval_binary(BinaryOp::Mul, f64::MAX, 2.0),
            Err(RuntimeErrorKind::Overflow)
        );
        assert_eq!(
            eval_binary(BinaryOp::Add, f64::MAX, f64::MAX),
            Err(RuntimeErrorKind::Overflow)
        );
        assert_eq!(
            eval_binary(BinaryOp::Div, f64::MAX, 0.5),
            Err(RuntimeErrorKind::Overflow)
        );
    }

    #[test]
    fn test_neg() {
        assert_eq!(eval_unary(UnaryOp::Neg, 42.0), -42.0);
        assert_eq!(eval_unary(UnaryOp::Neg, -1.5), 1.5);
    }
}
