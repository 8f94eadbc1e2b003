//! Static checks on compiled postfix sequences.
//!
//! Both checks run before any evaluation, so the stack machine can assume
//! its input is structurally sound: `is_well_formed` guards top-level
//! expressions, and both it and `check_body` guard function bodies at
//! declaration time.

use crate::lang::compile::Postfix;
use crate::lang::error::{Error, Result};
use crate::lang::token::Identifier;
use crate::lang::variables::Bindings;

/// Whether a postfix sequence reduces to exactly one value.
///
/// Replays the compiler's arity bookkeeping independently: each slot
/// consumes its arity off a simulated stack and produces one value. Going
/// negative means an operator or call would underflow; ending anywhere but
/// one means dangling operands.
pub fn is_well_formed(postfix: &[Postfix], bindings: &Bindings) -> bool {
    let mut depth: i64 = 0;

    for slot in postfix {
        let consumed = match slot {
            Postfix::Number(_) | Postfix::Name(_) => 0,
            Postfix::BinOp(_) => 2,
            Postfix::Call(name) => match bindings.function(name) {
                Some(def) => def.arity() as i64,
                None => return false,
            },
        };

        depth -= consumed;
        if depth < 0 {
            return false;
        }
        depth += 1;
    }

    depth == 1
}

/// A declaration body may only lean on numeric literals and its own
/// parameters.
///
/// Calls to already-declared functions are `Call` slots by the time the body
/// is compiled, so they pass without being named here.
pub fn check_body(body: &[Postfix], params: &[Identifier]) -> Result<()> {
    for slot in body {
        if let Postfix::Name(name) = slot {
            if !params.contains(name) {
                return Err(Error::InvalidExpression {
                    details: format!("function body references unknown name '{}'", name),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
use crate::lang::token::Operator;
#[cfg(test)]
use crate::lang::variables::FunctionDef;

#[cfg(test)]
fn ident(name: &str) -> Identifier {
    Identifier(name.to_string())
}

#[test]
fn test_well_formed() {
    let mut bindings = Bindings::new();
    bindings
        .declare(
            ident("add"),
            FunctionDef {
                params: vec![ident("a"), ident("b")],
                body: vec![
                    Postfix::Name(ident("a")),
                    Postfix::Name(ident("b")),
                    Postfix::BinOp(Operator::Plus),
                ],
            },
        )
        .unwrap();

    let tests = vec![
        (vec![Postfix::Number(1.0)], true),
        (
            vec![
                Postfix::Number(1.0),
                Postfix::Number(2.0),
                Postfix::BinOp(Operator::Plus),
            ],
            true,
        ),
        (
            vec![
                Postfix::Number(1.0),
                Postfix::Number(2.0),
                Postfix::Call(ident("add")),
            ],
            true,
        ),
        // dangling operand
        (vec![Postfix::Number(1.0), Postfix::Number(2.0)], false),
        // underflow: operator before its operands are complete
        (
            vec![
                Postfix::Number(1.0),
                Postfix::BinOp(Operator::Minus),
                Postfix::Number(2.0),
            ],
            false,
        ),
        // function starved of arguments
        (vec![Postfix::Number(1.0), Postfix::Call(ident("add"))], false),
        // empty input is not an expression
        (vec![], false),
        // call against nothing in the namespace
        (vec![Postfix::Call(ident("ghost"))], false),
    ];

    for (postfix, expected) in tests {
        assert_eq!(
            is_well_formed(&postfix, &bindings),
            expected,
            "postfix: {:?}",
            postfix
        );
    }
}

#[test]
fn test_check_body() {
    let params = vec![ident("a"), ident("b")];

    let ok = vec![
        Postfix::Name(ident("a")),
        Postfix::Number(2.0),
        Postfix::BinOp(Operator::Multiply),
        Postfix::Name(ident("b")),
        Postfix::BinOp(Operator::Plus),
    ];
    assert!(check_body(&ok, &params).is_ok());

    let foreign = vec![Postfix::Name(ident("a")), Postfix::Name(ident("x"))];
    assert!(matches!(
        check_body(&foreign, &params),
        Err(Error::InvalidExpression { .. })
    ));
}
