//! Operator arithmetic over const values
//!
//! Comparison and logical operators produce integral 0/1, matching the
//! language's self-determined result types. Mixed integer/real operands
//! promote to real.

use crate::{ConstError, ConstValue};
use sk_span::SourceLocation;
use sk_syntax::{BinaryOp, UnaryOp};

fn op_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::LogicalAnd => "&&",
        BinaryOp::LogicalOr => "||",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::Assign => "=",
    }
}

fn unary_op_name(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::LogicalNot => "!",
        UnaryOp::BitNot => "~",
        UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
        UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
    }
}

fn bool_value(value: bool) -> ConstValue {
    ConstValue::Int(i64::from(value))
}

/// Evaluates a binary operation over two const values
///
/// # Errors
///
/// Returns `ConstError` on division by zero, overflow, or operand types the
/// operator does not accept. A bad operand short-circuits to `Bad` without
/// an error, so one failure is not diagnosed repeatedly.
pub fn eval_binary(
    op: BinaryOp,
    lhs: ConstValue,
    rhs: ConstValue,
    location: SourceLocation,
) -> Result<ConstValue, ConstError> {
    if lhs.is_bad() || rhs.is_bad() {
        return Ok(ConstValue::Bad);
    }

    // Mixed integral/real arithmetic promotes to real.
    let (lhs, rhs) = match (lhs, rhs) {
        #[allow(clippy::cast_precision_loss)]
        (ConstValue::Int(a), ConstValue::Real(b)) => {
            (ConstValue::Real(a as f64), ConstValue::Real(b))
        }
        #[allow(clippy::cast_precision_loss)]
        (ConstValue::Real(a), ConstValue::Int(b)) => {
            (ConstValue::Real(a), ConstValue::Real(b as f64))
        }
        other => other,
    };

    match (op, &lhs, &rhs) {
        // Integral arithmetic
        (BinaryOp::Add, ConstValue::Int(a), ConstValue::Int(b)) => a
            .checked_add(*b)
            .map(ConstValue::Int)
            .ok_or(ConstError::Overflow { location }),
        (BinaryOp::Sub, ConstValue::Int(a), ConstValue::Int(b)) => a
            .checked_sub(*b)
            .map(ConstValue::Int)
            .ok_or(ConstError::Overflow { location }),
        (BinaryOp::Mul, ConstValue::Int(a), ConstValue::Int(b)) => a
            .checked_mul(*b)
            .map(ConstValue::Int)
            .ok_or(ConstError::Overflow { location }),
        (BinaryOp::Div, ConstValue::Int(a), ConstValue::Int(b)) => {
            if *b == 0 {
                Err(ConstError::DivisionByZero { location })
            } else {
                a.checked_div(*b)
                    .map(ConstValue::Int)
                    .ok_or(ConstError::Overflow { location })
            }
        }
        (BinaryOp::Mod, ConstValue::Int(a), ConstValue::Int(b)) => {
            if *b == 0 {
                Err(ConstError::DivisionByZero { location })
            } else {
                a.checked_rem(*b)
                    .map(ConstValue::Int)
                    .ok_or(ConstError::Overflow { location })
            }
        }

        // Real arithmetic
        (BinaryOp::Add, ConstValue::Real(a), ConstValue::Real(b)) => Ok(ConstValue::Real(a + b)),
        (BinaryOp::Sub, ConstValue::Real(a), ConstValue::Real(b)) => Ok(ConstValue::Real(a - b)),
        (BinaryOp::Mul, ConstValue::Real(a), ConstValue::Real(b)) => Ok(ConstValue::Real(a * b)),
        (BinaryOp::Div, ConstValue::Real(a), ConstValue::Real(b)) => {
            if *b == 0.0 {
                Err(ConstError::DivisionByZero { location })
            } else {
                Ok(ConstValue::Real(a / b))
            }
        }

        // Comparisons
        (BinaryOp::Eq, ConstValue::Int(a), ConstValue::Int(b)) => Ok(bool_value(a == b)),
        (BinaryOp::Ne, ConstValue::Int(a), ConstValue::Int(b)) => Ok(bool_value(a != b)),
        (BinaryOp::Lt, ConstValue::Int(a), ConstValue::Int(b)) => Ok(bool_value(a < b)),
        (BinaryOp::Le, ConstValue::Int(a), ConstValue::Int(b)) => Ok(bool_value(a <= b)),
        (BinaryOp::Gt, ConstValue::Int(a), ConstValue::Int(b)) => Ok(bool_value(a > b)),
        (BinaryOp::Ge, ConstValue::Int(a), ConstValue::Int(b)) => Ok(bool_value(a >= b)),

        #[allow(clippy::float_cmp)]
        (BinaryOp::Eq, ConstValue::Real(a), ConstValue::Real(b)) => Ok(bool_value(a == b)),
        #[allow(clippy::float_cmp)]
        (BinaryOp::Ne, ConstValue::Real(a), ConstValue::Real(b)) => Ok(bool_value(a != b)),
        (BinaryOp::Lt, ConstValue::Real(a), ConstValue::Real(b)) => Ok(bool_value(a < b)),
        (BinaryOp::Le, ConstValue::Real(a), ConstValue::Real(b)) => Ok(bool_value(a <= b)),
        (BinaryOp::Gt, ConstValue::Real(a), ConstValue::Real(b)) => Ok(bool_value(a > b)),
        (BinaryOp::Ge, ConstValue::Real(a), ConstValue::Real(b)) => Ok(bool_value(a >= b)),

        (BinaryOp::Eq, ConstValue::Str(a), ConstValue::Str(b)) => Ok(bool_value(a == b)),
        (BinaryOp::Ne, ConstValue::Str(a), ConstValue::Str(b)) => Ok(bool_value(a != b)),

        // Logical operators work on anything with truthiness
        (BinaryOp::LogicalAnd | BinaryOp::LogicalOr, _, _) => {
            match (lhs.truthy(), rhs.truthy()) {
                (Some(a), Some(b)) => Ok(bool_value(if op == BinaryOp::LogicalAnd {
                    a && b
                } else {
                    a || b
                })),
                _ => Err(ConstError::InvalidOperands {
                    op: op_name(op),
                    lhs: lhs.type_name(),
                    rhs: rhs.type_name(),
                    location,
                }),
            }
        }

        // Bitwise and shift operators are integral only
        (BinaryOp::BitAnd, ConstValue::Int(a), ConstValue::Int(b)) => Ok(ConstValue::Int(a & b)),
        (BinaryOp::BitOr, ConstValue::Int(a), ConstValue::Int(b)) => Ok(ConstValue::Int(a | b)),
        (BinaryOp::BitXor, ConstValue::Int(a), ConstValue::Int(b)) => Ok(ConstValue::Int(a ^ b)),
        (BinaryOp::Shl, ConstValue::Int(a), ConstValue::Int(b)) => {
            if !(0..64).contains(b) {
                Err(ConstError::Overflow { location })
            } else {
                let shift = u32::try_from(*b).map_err(|_| ConstError::Overflow { location })?;
                a.checked_shl(shift)
                    .map(ConstValue::Int)
                    .ok_or(ConstError::Overflow { location })
            }
        }
        (BinaryOp::Shr, ConstValue::Int(a), ConstValue::Int(b)) => {
            if !(0..64).contains(b) {
                Err(ConstError::Overflow { location })
            } else {
                let shift = u32::try_from(*b).map_err(|_| ConstError::Overflow { location })?;
                a.checked_shr(shift)
                    .map(ConstValue::Int)
                    .ok_or(ConstError::Overflow { location })
            }
        }

        _ => Err(ConstError::InvalidOperands {
            op: op_name(op),
            lhs: lhs.type_name(),
            rhs: rhs.type_name(),
            location,
        }),
    }
}

/// Evaluates a unary operation over a const value
///
/// # Errors
///
/// Returns `ConstError` for overflow or operand types the operator does not
/// accept. The increment/decrement forms are never constant expressions;
/// the generate-loop engine applies them to its iteration value directly.
pub fn eval_unary(
    op: UnaryOp,
    operand: ConstValue,
    location: SourceLocation,
) -> Result<ConstValue, ConstError> {
    if operand.is_bad() {
        return Ok(ConstValue::Bad);
    }

    match (op, &operand) {
        (UnaryOp::Neg, ConstValue::Int(value)) => value
            .checked_neg()
            .map(ConstValue::Int)
            .ok_or(ConstError::Overflow { location }),
        (UnaryOp::Neg, ConstValue::Real(value)) => Ok(ConstValue::Real(-value)),
        (UnaryOp::LogicalNot, _) => match operand.truthy() {
            Some(value) => Ok(bool_value(!value)),
            None => Err(ConstError::InvalidOperands {
                op: unary_op_name(op),
                lhs: operand.type_name(),
                rhs: "-",
                location,
            }),
        },
        (UnaryOp::BitNot, ConstValue::Int(value)) => Ok(ConstValue::Int(!value)),
        _ => Err(ConstError::InvalidOperands {
            op: unary_op_name(op),
            lhs: operand.type_name(),
            rhs: "-",
            location,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::NONE
    }

    #[test]
    fn integral_arithmetic() {
        assert_eq!(
            eval_binary(BinaryOp::Add, ConstValue::Int(2), ConstValue::Int(3), loc()).unwrap(),
            ConstValue::Int(5)
        );
        assert_eq!(
            eval_binary(BinaryOp::Mod, ConstValue::Int(7), ConstValue::Int(4), loc()).unwrap(),
            ConstValue::Int(3)
        );
    }

    #[test]
    fn comparisons_yield_zero_or_one() {
        assert_eq!(
            eval_binary(BinaryOp::Lt, ConstValue::Int(1), ConstValue::Int(3), loc()).unwrap(),
            ConstValue::Int(1)
        );
        assert_eq!(
            eval_binary(BinaryOp::Ge, ConstValue::Int(1), ConstValue::Int(3), loc()).unwrap(),
            ConstValue::Int(0)
        );
    }

    #[test]
    fn mixed_operands_promote_to_real() {
        assert_eq!(
            eval_binary(BinaryOp::Mul, ConstValue::Int(2), ConstValue::Real(1.5), loc()).unwrap(),
            ConstValue::Real(3.0)
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(matches!(
            eval_binary(BinaryOp::Div, ConstValue::Int(1), ConstValue::Int(0), loc()),
            Err(ConstError::DivisionByZero { .. })
        ));
        assert!(matches!(
            eval_binary(BinaryOp::Mod, ConstValue::Int(1), ConstValue::Int(0), loc()),
            Err(ConstError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn overflow_is_detected() {
        assert!(matches!(
            eval_binary(
                BinaryOp::Add,
                ConstValue::Int(i64::MAX),
                ConstValue::Int(1),
                loc()
            ),
            Err(ConstError::Overflow { .. })
        ));
        assert!(matches!(
            eval_unary(UnaryOp::Neg, ConstValue::Int(i64::MIN), loc()),
            Err(ConstError::Overflow { .. })
        ));
    }

    #[test]
    fn bad_short_circuits_without_error() {
        assert_eq!(
            eval_binary(BinaryOp::Add, ConstValue::Bad, ConstValue::Int(1), loc()).unwrap(),
            ConstValue::Bad
        );
        assert_eq!(
            eval_unary(UnaryOp::Neg, ConstValue::Bad, loc()).unwrap(),
            ConstValue::Bad
        );
    }

    #[test]
    fn assignment_is_not_a_constant_operator() {
        assert!(eval_binary(
            BinaryOp::Assign,
            ConstValue::Int(1),
            ConstValue::Int(2),
            loc()
        )
        .is_err());
    }
}
