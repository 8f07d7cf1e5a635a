//! Diagnostic codes and the accumulating diagnostics sink
//!
//! The semantic core never aborts: every error is reported here and
//! recovered locally with a bad sentinel. Callers inspect the accumulated
//! diagnostics when compilation finishes and decide how to proceed.

use sk_span::SourceLocation;
use thiserror::Error;

/// The closed set of diagnostic codes surfaced by the semantic core,
/// including the codes delegated from constant evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DiagCode {
    #[error("use of undeclared identifier")]
    UndeclaredIdentifier,
    #[error("duplicate definition")]
    DuplicateDefinition,
    #[error("unknown package")]
    MissingPackage,
    #[error("no such name in package")]
    MissingImportedMember,
    #[error("cyclic dependency")]
    CyclicDependency,
    #[error("cannot override a local parameter")]
    ParamOverrideOfLocal,
    #[error("parameter has no default and no override")]
    MissingRequiredParameter,
    #[error("generate loop condition does not depend on its iteration variable")]
    GenerateLoopNonTerminating,
    #[error("generate loop exceeds the iteration limit")]
    GenerateLoopTooManyIterations,
    #[error("symbol is not of the expected kind")]
    KindMismatch,
    #[error("expression is not constant")]
    NotConstant,
    #[error("division by zero in constant expression")]
    DivisionByZero,
    #[error("arithmetic overflow in constant expression")]
    ArithmeticOverflow,
    #[error("value is not convertible to the target type")]
    TypeMismatch,
}

/// One reported diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: DiagCode,
    pub location: SourceLocation,
    /// Optional human-oriented detail (names involved, limits, ...)
    pub detail: Option<String>,
}

impl Diagnostic {
    /// Convert to a codespan diagnostic for rendering. The caller supplies
    /// the codespan file id for the diagnostic's source file; synthetic
    /// locations render without a label.
    pub fn to_codespan(&self, file_id: usize) -> codespan_reporting::diagnostic::Diagnostic<usize> {
        use codespan_reporting::diagnostic::{Diagnostic, Label};

        let message = match &self.detail {
            Some(detail) => format!("{}: {}", self.code, detail),
            None => self.code.to_string(),
        };

        let mut diag = Diagnostic::error().with_message(message);
        if self.location.is_valid() {
            let offset = self.location.offset() as usize;
            diag = diag.with_labels(vec![Label::primary(file_id, offset..offset + 1)]);
        }
        diag
    }
}

/// The accumulating sink
#[derive(Debug, Default)]
pub struct Diagnostics {
    diags: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, code: DiagCode, location: SourceLocation) {
        self.diags.push(Diagnostic {
            code,
            location,
            detail: None,
        });
    }

    pub fn report_with(&mut self, code: DiagCode, location: SourceLocation, detail: String) {
        self.diags.push(Diagnostic {
            code,
            location,
            detail: Some(detail),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diags.iter()
    }

    /// Number of diagnostics reported with the given code. Tests use this
    /// for the "diagnosed exactly once" properties.
    #[must_use]
    pub fn count_of(&self, code: DiagCode) -> usize {
        self.diags.iter().filter(|d| d.code == code).count()
    }
}
