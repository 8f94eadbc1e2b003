use std::fmt;

use crate::lang::token::Operator;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while interpreting one statement.
///
/// All of these abort the current statement only; the namespace is left
/// exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input the tokenizer or the declaration parser cannot make sense of.
    Syntax {
        /// What was wrong with it.
        details: String,
    },
    /// An operand name with no binding in scope.
    UnknownIdentifier {
        /// The name that failed to resolve.
        name: String,
    },
    /// A declaration or assignment that would cross the variable/function
    /// namespace.
    NameCollision {
        /// The contested name.
        name: String,
        /// What the name is already bound to, "variable" or "function".
        existing: &'static str,
    },
    /// Two parameters of one declaration sharing a name.
    DuplicateParameter {
        /// The repeated name.
        name: String,
    },
    /// An expression that does not reduce to exactly one value.
    InvalidExpression {
        /// Which structural rule was broken.
        details: String,
    },
    /// A binary operator outside the arithmetic set reaching evaluation.
    UnsupportedOperator {
        /// The offending operator.
        op: Operator,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax { details } => write!(f, "Syntax error: {}", details),
            Error::UnknownIdentifier { name } => {
                write!(f, "Unknown identifier: no binding named '{}'", name)
            }
            Error::NameCollision { name, existing } => {
                write!(f, "There is already a {} named '{}'", existing, name)
            }
            Error::DuplicateParameter { name } => {
                write!(f, "There is already a parameter named '{}'", name)
            }
            Error::InvalidExpression { details } => {
                write!(f, "Invalid expression: {}", details)
            }
            Error::UnsupportedOperator { op } => {
                write!(f, "Operator '{}' is not supported here", op)
            }
        }
    }
}

impl std::error::Error for Error {}
