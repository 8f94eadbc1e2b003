//! An interactive calculator with user-defined functions.
//!
//! One statement per call: an expression, a variable assignment, or a
//! declaration of the form `fn name params => body`. Function application
//! is positional juxtaposition (`add 1 2`); arity is resolved during
//! compilation to postfix, so no argument parentheses or commas are needed.

pub mod lang;

pub use lang::error::{Error, Result};
pub use lang::runtime::Runtime;
