use std::{fmt, io};

/// What went wrong while evaluating a single line.
///
/// Keeping the kinds distinct lets callers react to specific failures
/// (unknown directive vs. unresolved symbol) without string matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// First token of a statement did not resolve in the scope chain.
    UnresolvedSymbol,
    /// Directive verb is not present in the directive table.
    UnknownDirective,
    /// Reduction found no operator to apply in a multi-element expression.
    MissingOperator,
    /// An infix operator sat at the edge of the expression, or the
    /// expression reduced to an operator instead of a value.
    MissingOperand,
    /// The operator's fixity (prefix, postfix, surround) has no defined
    /// application semantics yet.
    UnsupportedFixity,
    /// Runtime payload of an operand does not match what the operator
    /// overload expects.
    TypeMismatch,
    /// Member access named a sub-instance the receiver does not have.
    UnknownMember,
    /// A `}` appeared with no scope block left to close.
    ScopeUnderflow,
    /// The `expr` intrinsic is reserved and cannot be instantiated.
    ReservedType,
    /// A literal matched an intrinsic type but its payload failed to parse.
    MalformedLiteral,
    /// A declaration or `class` line is missing the declared name.
    MissingName,
    /// A directive is missing its quoted argument.
    MissingArgument,
    /// Parentheses of the expression do not balance.
    UnbalancedParens,
    /// A source-defined function body was invoked; execution is reserved.
    ExtrinsicCall,
    /// The expression contains no tokens to evaluate.
    EmptyExpression,
}

/// A line-level evaluation failure: the kind plus the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub kind: ErrorKind,
    pub token: String,
}

impl LineError {
    pub(crate) fn new(kind: ErrorKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            token: token.into(),
        }
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = &self.token;
        match self.kind {
            ErrorKind::UnresolvedSymbol => write!(f, "unresolved symbol `{token}`"),
            ErrorKind::UnknownDirective => write!(f, "unknown directive `{token}`"),
            ErrorKind::MissingOperator => write!(f, "no operator left to reduce near `{token}`"),
            ErrorKind::MissingOperand => write!(f, "operator `{token}` is missing an operand"),
            ErrorKind::UnsupportedFixity => {
                write!(f, "operator `{token}` has a fixity without defined semantics")
            }
            ErrorKind::TypeMismatch => write!(f, "operand `{token}` has an incompatible type"),
            ErrorKind::UnknownMember => write!(f, "unknown member `{token}`"),
            ErrorKind::ScopeUnderflow => write!(f, "`}}` closes a scope that was never opened"),
            ErrorKind::ReservedType => write!(f, "type `{token}` is reserved"),
            ErrorKind::MalformedLiteral => write!(f, "malformed literal `{token}`"),
            ErrorKind::MissingName => write!(f, "`{token}` declaration is missing a name"),
            ErrorKind::MissingArgument => write!(f, "directive `{token}` is missing its argument"),
            ErrorKind::UnbalancedParens => write!(f, "unbalanced parentheses near `{token}`"),
            ErrorKind::ExtrinsicCall => {
                write!(f, "function `{token}` has a source-defined body and cannot be called")
            }
            ErrorKind::EmptyExpression => write!(f, "expression is empty"),
        }
    }
}

impl std::error::Error for LineError {}

/// Error type for parsing, separating I/O failures from line-level
/// evaluation failures.
///
/// Evaluation stops at the first failing line; no partial results are
/// returned. The `Line` variant identifies the source file (when known),
/// the 1-based line number, and the offending token.
#[derive(Debug)]
pub enum ConfError {
    /// Reading a source file failed.
    Io(io::Error),
    /// A line failed to evaluate.
    Line {
        file: Option<String>,
        line: usize,
        error: LineError,
    },
}

impl ConfError {
    pub(crate) fn at(file: Option<&str>, line: usize, error: LineError) -> Self {
        Self::Line {
            file: file.map(str::to_owned),
            line,
            error,
        }
    }
}

impl fmt::Display for ConfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Line {
                file: Some(file),
                line,
                error,
            } => write!(f, "{file}:{line}: {error}"),
            Self::Line {
                file: None, line, error, ..
            } => write!(f, "line {line}: {error}"),
        }
    }
}

impl std::error::Error for ConfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Line { error, .. } => Some(error),
        }
    }
}

impl From<io::Error> for ConfError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
