//! Function and operator data.

use crate::intrinsics::HostOp;

/// Positional role of an operator relative to its operands.
///
/// Only infix (`Mid`) application is implemented; the other fixities are
/// accepted on definitions but applying one is a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Fixity {
    /// `++i`
    Pre,
    /// `a + b`
    Mid,
    /// `i++`
    Post,
    /// `[i]`
    Sur,
}

#[derive(Debug)]
pub(crate) struct FunctionData {
    pub body: FunctionBody,
}

#[derive(Debug, Clone)]
pub(crate) enum FunctionBody {
    /// Host-implemented behavior, dispatched by `match` at call time.
    Host(HostOp),
    /// Captured token lines of a source-defined function.
    ///
    /// Bodies are stored but never executed; calling one is an error
    /// until expression-body execution is defined.
    Captured(Vec<Vec<String>>),
}

/// An operator is a function with a reduction priority and a fixity.
///
/// Priority is descending: 1 binds tightest (member access, surround),
/// 14 loosest (assignment), following the C operator priority model.
/// Operator names carry the literal `operator` prefix followed by the
/// symbol, e.g. `operator+=`.
#[derive(Debug)]
pub(crate) struct OperatorData {
    pub func: FunctionData,
    pub priority: u8,
    pub fixity: Fixity,
}

/// Name prefix shared by every operator.
pub(crate) const OPERATOR_PREFIX: &str = "operator";
