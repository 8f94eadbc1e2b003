//! Infix to postfix compilation.
//!
//! This is a shunting-yard pass extended with one extra working area: a
//! pending-function-arity stack. A function name does not go to the output
//! when it is seen; it waits until the scan has produced exactly as many
//! operands as the function's declared parameter count, then its call is
//! appended. That is what lets `f 1 g 2 3` mean `f(1, g(2, 3))` with no
//! argument parentheses or commas: the function named nearest the operands
//! saturates first.
//!
//! Note that saturation counts bare operands, not grouped expressions, so a
//! parenthesized argument works only when it contains a single operand. A
//! multi-operand group feeds the counter early and the result fails the
//! well-formedness check downstream.

use crate::lang::error::{Error, Result};
use crate::lang::token::{Identifier, Operator, Token};
use crate::lang::variables::Bindings;

/// One slot of a compiled postfix sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Postfix {
    Number(f64),
    /// Variable or parameter reference; stays a name until the point of use
    Name(Identifier),
    /// Function application, consuming the function's declared arity of
    /// preceding operands
    Call(Identifier),
    BinOp(Operator),
}

/// Entries on the operator stack. Open parens sit inline so a `)` knows
/// where to stop popping.
enum StackOp {
    Op(Operator),
    OpenParen,
}

/// Feed one produced operand to the functions still waiting for arguments.
///
/// The top counter drops by one; a function that reaches zero has received
/// its full argument list, so its call is emitted and the operand it just
/// became feeds the next function up.
fn saturate(pending: &mut Vec<(Identifier, usize)>, output: &mut Vec<Postfix>) {
    while let Some(top) = pending.last_mut() {
        top.1 -= 1;
        if top.1 > 0 {
            break;
        }

        let (name, _) = pending.pop().expect("pending top vanished");
        output.push(Postfix::Call(name));
    }
}

/// Compile an infix token sequence to postfix.
///
/// `bindings` decides which identifiers are function applications and what
/// their arity is; everything else about the namespace is irrelevant here.
/// The output encodes precedence, associativity, grouping, and call arity,
/// but is not guaranteed to be well-formed -- that is the job of
/// `semantics::is_well_formed`.
pub fn compile(tokens: &[Token], bindings: &Bindings) -> Result<Vec<Postfix>> {
    let mut output: Vec<Postfix> = Vec::new();
    let mut operators: Vec<StackOp> = Vec::new();
    let mut pending: Vec<(Identifier, usize)> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(n) => {
                output.push(Postfix::Number(*n));
                saturate(&mut pending, &mut output);
            }
            Token::Identifier(name) => {
                match bindings.function(name) {
                    Some(def) if def.arity() > 0 => {
                        // applies to the next `arity` operands the scan produces
                        pending.push((name.clone(), def.arity()));
                    }
                    Some(_) => {
                        // zero-arity calls are complete the moment they are named
                        output.push(Postfix::Call(name.clone()));
                        saturate(&mut pending, &mut output);
                    }
                    None => {
                        output.push(Postfix::Name(name.clone()));
                        saturate(&mut pending, &mut output);
                    }
                }
            }
            Token::OpenParen => operators.push(StackOp::OpenParen),
            Token::CloseParen => loop {
                match operators.pop() {
                    Some(StackOp::OpenParen) => break,
                    Some(StackOp::Op(op)) => output.push(Postfix::BinOp(op)),
                    None => {
                        return Err(Error::Syntax {
                            details: "unmatched ')'".to_string(),
                        })
                    }
                }
            },
            Token::Operator(op) => {
                while let Some(StackOp::Op(top)) = operators.last() {
                    if top.precedence() >= op.precedence() && !op.right_associative() {
                        output.push(Postfix::BinOp(*top));
                        operators.pop();
                    } else {
                        break;
                    }
                }

                operators.push(StackOp::Op(*op));
            }
            Token::Fn => {
                return Err(Error::Syntax {
                    details: "'fn' is only valid at the start of a declaration".to_string(),
                })
            }
            Token::Arrow => {
                return Err(Error::Syntax {
                    details: "'=>' is only valid in a declaration".to_string(),
                })
            }
        }
    }

    // unsaturated functions drain innermost first; the checker will flag the
    // missing arguments
    for (name, _) in pending.into_iter().rev() {
        output.push(Postfix::Call(name));
    }

    for op in operators.into_iter().rev() {
        match op {
            StackOp::Op(op) => output.push(Postfix::BinOp(op)),
            StackOp::OpenParen => {
                return Err(Error::Syntax {
                    details: "unmatched '('".to_string(),
                })
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
use crate::lang::parse::tokenize;
#[cfg(test)]
use crate::lang::variables::FunctionDef;

#[cfg(test)]
fn ident(name: &str) -> Identifier {
    Identifier(name.to_string())
}

/// Bindings with functions of the given arities; the bodies never run.
#[cfg(test)]
fn functions(arities: &[(&str, usize)]) -> Bindings {
    let mut bindings = Bindings::new();
    for (name, arity) in arities {
        let params = (0..*arity).map(|i| ident(&format!("p{}", i))).collect();
        bindings
            .declare(
                ident(name),
                FunctionDef {
                    params,
                    body: vec![Postfix::Number(0.0)],
                },
            )
            .unwrap();
    }

    bindings
}

#[cfg(test)]
fn compile_str(input: &str, bindings: &Bindings) -> Vec<Postfix> {
    compile(&tokenize(input).unwrap(), bindings).unwrap()
}

#[test]
fn test_precedence_and_grouping() {
    let bindings = Bindings::new();
    let tests = vec![
        (
            "2 + 3 * 4",
            vec![
                Postfix::Number(2.0),
                Postfix::Number(3.0),
                Postfix::Number(4.0),
                Postfix::BinOp(Operator::Multiply),
                Postfix::BinOp(Operator::Plus),
            ],
        ),
        (
            "(2 + 3) * 4",
            vec![
                Postfix::Number(2.0),
                Postfix::Number(3.0),
                Postfix::BinOp(Operator::Plus),
                Postfix::Number(4.0),
                Postfix::BinOp(Operator::Multiply),
            ],
        ),
        (
            // equal precedence folds left
            "8 - 4 - 2",
            vec![
                Postfix::Number(8.0),
                Postfix::Number(4.0),
                Postfix::BinOp(Operator::Minus),
                Postfix::Number(2.0),
                Postfix::BinOp(Operator::Minus),
            ],
        ),
        (
            // assignment folds right
            "x = y = 3",
            vec![
                Postfix::Name(ident("x")),
                Postfix::Name(ident("y")),
                Postfix::Number(3.0),
                Postfix::BinOp(Operator::Assign),
                Postfix::BinOp(Operator::Assign),
            ],
        ),
    ];

    for (input, expected) in tests {
        assert_eq!(compile_str(input, &bindings), expected, "input: {:?}", input);
    }
}

#[test]
fn test_function_saturation() {
    let bindings = functions(&[("f1", 2), ("f2", 3)]);

    assert_eq!(
        compile_str("f2 f2 1 2 3 f1 4 5 f1 6 7", &bindings),
        vec![
            Postfix::Number(1.0),
            Postfix::Number(2.0),
            Postfix::Number(3.0),
            Postfix::Call(ident("f2")),
            Postfix::Number(4.0),
            Postfix::Number(5.0),
            Postfix::Call(ident("f1")),
            Postfix::Number(6.0),
            Postfix::Number(7.0),
            Postfix::Call(ident("f1")),
            Postfix::Call(ident("f2")),
        ]
    );
}

#[test]
fn test_zero_arity_saturates_pending() {
    let mut bindings = functions(&[("wrap", 1)]);
    bindings
        .declare(
            ident("zero"),
            FunctionDef {
                params: vec![],
                body: vec![Postfix::Number(0.0)],
            },
        )
        .unwrap();

    assert_eq!(
        compile_str("wrap zero", &bindings),
        vec![Postfix::Call(ident("zero")), Postfix::Call(ident("wrap"))]
    );
}

#[test]
fn test_unsaturated_function_drains() {
    // not enough arguments: the call still drains, and the sequence is left
    // for the well-formedness check to reject
    let bindings = functions(&[("f1", 2)]);
    assert_eq!(
        compile_str("f1 1", &bindings),
        vec![Postfix::Number(1.0), Postfix::Call(ident("f1"))]
    );
}

#[test]
fn test_paren_mismatches() {
    let bindings = Bindings::new();
    for input in ["(1 + 2", ")", "1 + 2)"] {
        let tokens = tokenize(input).unwrap();
        assert!(
            matches!(compile(&tokens, &bindings), Err(Error::Syntax { .. })),
            "input: {:?}",
            input
        );
    }
}

#[test]
fn test_declaration_tokens_rejected_in_expressions() {
    let bindings = Bindings::new();
    for input in ["1 + fn", "a => b"] {
        let tokens = tokenize(input).unwrap();
        assert!(
            matches!(compile(&tokens, &bindings), Err(Error::Syntax { .. })),
            "input: {:?}",
            input
        );
    }
}
