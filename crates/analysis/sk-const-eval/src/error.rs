//! Const evaluation errors

use sk_span::SourceLocation;
use thiserror::Error;

/// Errors that can occur while evaluating a constant expression
#[derive(Debug, Clone, Error)]
pub enum ConstError {
    /// Division or modulus by zero
    #[error("division by zero")]
    DivisionByZero {
        /// Location of the operation
        location: SourceLocation,
    },

    /// Integer overflow
    #[error("arithmetic overflow")]
    Overflow {
        /// Location of the operation
        location: SourceLocation,
    },

    /// Operator applied to operand types it does not accept
    #[error("operator `{op}` is not valid for {lhs} and {rhs} operands")]
    InvalidOperands {
        /// Operator rendering
        op: &'static str,
        /// Left (or only) operand type
        lhs: &'static str,
        /// Right operand type
        rhs: &'static str,
        /// Location of the operation
        location: SourceLocation,
    },

    /// Value cannot be converted to the requested type
    #[error("cannot convert {from} value to {to}")]
    InvalidConversion {
        /// Source type
        from: &'static str,
        /// Target type
        to: &'static str,
        /// Location of the conversion
        location: SourceLocation,
    },
}

impl ConstError {
    /// The location the error should be reported at
    #[must_use]
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::DivisionByZero { location }
            | Self::Overflow { location }
            | Self::InvalidOperands { location, .. }
            | Self::InvalidConversion { location, .. } => *location,
        }
    }
}
