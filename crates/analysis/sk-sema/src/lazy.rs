//! Lazy binding cells
//!
//! Declaring a symbol is always safe; binding its type, initializer, or body
//! may recurse into other symbols and fail. Lazy cells separate the two: a
//! cell starts out holding a syntax reference and transitions at most once to
//! the resolved semantic reference. The in-progress marker turns re-entrant
//! evaluation into an observable cycle instead of infinite recursion.

use crate::bind::{BoundExprId, StatementId};
use crate::symbol::SymbolId;
use sk_const_eval::ConstValue;
use sk_syntax::{DataTypeId, ExprId, StmtId};

/// A cell holding either an unresolved syntax reference or its resolved
/// semantic counterpart.
#[derive(Debug, Clone)]
pub enum Lazy<R, S> {
    /// Not yet evaluated
    Syntax(S),
    /// Evaluation in progress; observing this state is a cycle
    Resolving,
    /// Evaluated; terminal until the containing scope is rebuilt
    Resolved(R),
}

/// What the caller of [`Lazy::probe`] should do next
pub enum LazyProbe<R, S> {
    /// Already resolved; here is the value
    Done(R),
    /// Caller must evaluate this syntax and then call [`Lazy::finish`]
    Evaluate(S),
    /// The cell was already being evaluated: a cyclic dependency
    Cycle,
}

impl<R: Clone, S: Clone> Lazy<R, S> {
    pub fn from_syntax(syntax: S) -> Self {
        Self::Syntax(syntax)
    }

    pub fn resolved(result: R) -> Self {
        Self::Resolved(result)
    }

    /// Begin an evaluation. If the cell holds syntax it is marked as
    /// resolving and the syntax is handed back for evaluation.
    pub fn probe(&mut self) -> LazyProbe<R, S> {
        match self {
            Self::Resolved(result) => LazyProbe::Done(result.clone()),
            Self::Resolving => LazyProbe::Cycle,
            Self::Syntax(_) => {
                let Self::Syntax(syntax) = std::mem::replace(self, Self::Resolving) else {
                    unreachable!()
                };
                LazyProbe::Evaluate(syntax)
            }
        }
    }

    /// Store an evaluation result. A cell that is already resolved keeps its
    /// first value, so the unresolved-to-resolved transition happens at most
    /// once even when a cycle forced an early sentinel into the cell.
    pub fn finish(&mut self, result: R) {
        if !matches!(self, Self::Resolved(_)) {
            *self = Self::Resolved(result);
        }
    }

    /// The resolved value, if evaluation has completed.
    pub fn peek(&self) -> Option<&R> {
        match self {
            Self::Resolved(result) => Some(result),
            _ => None,
        }
    }
}

/// Data type syntax resolving to a type symbol
pub type LazyType = Lazy<SymbolId, DataTypeId>;
/// Expression syntax resolving to a constant value
pub type LazyConstant = Lazy<ConstValue, ExprId>;
/// Expression syntax resolving to a bound expression
pub type LazyInitializer = Lazy<BoundExprId, ExprId>;
/// Statement syntax resolving to a bound statement
pub type LazyStatement = Lazy<StatementId, StmtId>;
/// A statement list resolving to one bound list statement
pub type LazyStatementList = Lazy<StatementId, Vec<StmtId>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_marks_resolving_and_hands_back_syntax() {
        let mut cell: Lazy<i32, &str> = Lazy::from_syntax("expr");
        match cell.probe() {
            LazyProbe::Evaluate(syntax) => assert_eq!(syntax, "expr"),
            _ => panic!("expected syntax"),
        }
        assert!(matches!(cell.probe(), LazyProbe::Cycle));
        cell.finish(7);
        match cell.probe() {
            LazyProbe::Done(value) => assert_eq!(value, 7),
            _ => panic!("expected resolved value"),
        }
    }

    #[test]
    fn first_finish_wins() {
        let mut cell: Lazy<i32, &str> = Lazy::from_syntax("expr");
        let _ = cell.probe();
        cell.finish(1);
        cell.finish(2);
        assert_eq!(cell.peek(), Some(&1));
    }

    #[test]
    fn seeded_cells_are_done_immediately() {
        let mut cell: Lazy<i32, &str> = Lazy::resolved(3);
        assert!(matches!(cell.probe(), LazyProbe::Done(3)));
    }
}
