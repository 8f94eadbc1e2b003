use std::fmt;

use lazy_static::lazy_static;

use crate::lang::error::{Error, Result};

/// The binary operators the language knows about.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    /// `=`
    Assign,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
}

impl Operator {
    /// Binding strength. A higher level binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Assign => 0,
            Operator::Plus | Operator::Minus => 1,
            Operator::Multiply | Operator::Divide | Operator::Modulo => 2,
        }
    }

    /// `x = y = 3` must group as `x = (y = 3)`
    pub fn right_associative(&self) -> bool {
        matches!(self, Operator::Assign)
    }

    /// Apply the operator to two already-resolved values.
    ///
    /// Assignment never gets here: its left side is a name, not a value, so
    /// the evaluator handles it before resolution.
    pub fn apply(&self, lhs: f64, rhs: f64) -> Result<f64> {
        match self {
            Operator::Plus => Ok(lhs + rhs),
            Operator::Minus => Ok(lhs - rhs),
            Operator::Multiply => Ok(lhs * rhs),
            Operator::Divide => Ok(lhs / rhs),
            Operator::Modulo => Ok(lhs % rhs),
            Operator::Assign => Err(Error::UnsupportedOperator { op: *self }),
        }
    }

    pub fn op_str(&self) -> &str {
        match self {
            Operator::Assign => "=",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op_str())
    }
}

lazy_static! {
    /// Every operator, lowest precedence first. The REPL's `help` output is
    /// generated from this.
    pub static ref OPERATORS: Vec<Operator> = vec![
        Operator::Assign,
        Operator::Plus,
        Operator::Minus,
        Operator::Multiply,
        Operator::Divide,
        Operator::Modulo,
    ];
}

#[derive(Debug, PartialEq, Hash, PartialOrd, Ord, Eq, Clone)]
pub struct Identifier(pub String);

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One lexical token of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Identifier(Identifier),
    Operator(Operator),
    OpenParen,
    CloseParen,
    /// `fn`, opening a declaration
    Fn,
    /// `=>`, separating a declaration's parameters from its body
    Arrow,
}

#[test]
fn test_precedence_ladder() {
    // OPERATORS is ordered lowest-binding first
    let mut last = 0;
    for op in &*OPERATORS {
        assert!(op.precedence() >= last);
        last = op.precedence();
    }

    assert!(Operator::Multiply.precedence() > Operator::Plus.precedence());
    assert!(Operator::Plus.precedence() > Operator::Assign.precedence());
    assert!(Operator::Assign.right_associative());
    assert!(!Operator::Minus.right_associative());
}

#[test]
fn test_apply() {
    assert_eq!(Operator::Plus.apply(2.0, 3.0).unwrap(), 5.0);
    assert_eq!(Operator::Minus.apply(2.0, 3.0).unwrap(), -1.0);
    assert_eq!(Operator::Multiply.apply(2.0, 3.0).unwrap(), 6.0);
    assert_eq!(Operator::Divide.apply(3.0, 2.0).unwrap(), 1.5);
    assert_eq!(Operator::Modulo.apply(7.0, 4.0).unwrap(), 3.0);
    assert!(Operator::Assign.apply(1.0, 2.0).is_err());
}
