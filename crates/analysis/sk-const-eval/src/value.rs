//! Const value representation

use crate::ConstError;
use sk_span::SourceLocation;

/// A compile-time constant value
///
/// `Bad` is the recovery sentinel required by the error-handling policy:
/// failed binding, failed conversion, and dependency cycles all produce it,
/// and it propagates through further evaluation without re-diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    /// Integer constant
    Int(i64),
    /// Real (floating-point) constant
    Real(f64),
    /// String constant
    Str(String),
    /// The bad sentinel
    Bad,
}

impl ConstValue {
    /// Returns true if this is the bad sentinel
    #[must_use]
    pub fn is_bad(&self) -> bool {
        matches!(self, Self::Bad)
    }

    /// Returns the integer value if this is an integer
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the real value if this is a real
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean interpretation for conditions. `None` when the value has no
    /// truthiness (bad sentinel, strings).
    #[must_use]
    pub fn truthy(&self) -> Option<bool> {
        match self {
            Self::Int(value) => Some(*value != 0),
            Self::Real(value) => Some(*value != 0.0),
            Self::Str(_) | Self::Bad => None,
        }
    }

    /// Human-readable type name for diagnostics
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integral",
            Self::Real(_) => "real",
            Self::Str(_) => "string",
            Self::Bad => "<error>",
        }
    }

    /// Convert to an integral type of the given width and signedness,
    /// wrapping and sign- or zero-extending as the language requires.
    /// Reals round to the nearest integer first.
    pub fn convert_to_integral(
        self,
        width: u32,
        signed: bool,
        location: SourceLocation,
    ) -> Result<ConstValue, ConstError> {
        let raw = match self {
            Self::Int(value) => value,
            #[allow(clippy::cast_possible_truncation)]
            Self::Real(value) => value.round() as i64,
            Self::Str(_) => {
                return Err(ConstError::InvalidConversion {
                    from: "string",
                    to: "integral",
                    location,
                })
            }
            Self::Bad => return Ok(Self::Bad),
        };

        if width >= 64 {
            return Ok(Self::Int(raw));
        }

        let mask = (1i64 << width) - 1;
        let truncated = raw & mask;
        let value = if signed && truncated & (1i64 << (width - 1)) != 0 {
            truncated | !mask
        } else {
            truncated
        };
        Ok(Self::Int(value))
    }

    /// Convert to a real value
    pub fn convert_to_real(self, location: SourceLocation) -> Result<ConstValue, ConstError> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(value) => Ok(Self::Real(value as f64)),
            Self::Real(_) => Ok(self),
            Self::Str(_) => Err(ConstError::InvalidConversion {
                from: "string",
                to: "real",
                location,
            }),
            Self::Bad => Ok(Self::Bad),
        }
    }

    /// Convert to a string value
    pub fn convert_to_string(self, location: SourceLocation) -> Result<ConstValue, ConstError> {
        match self {
            Self::Str(_) => Ok(self),
            Self::Bad => Ok(Self::Bad),
            other => Err(ConstError::InvalidConversion {
                from: other.type_name(),
                to: "string",
                location,
            }),
        }
    }
}
