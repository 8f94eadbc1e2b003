use crate::lang::compile::compile;
use crate::lang::error::{Error, Result};
use crate::lang::eval::Eval;
use crate::lang::parse::tokenize;
use crate::lang::semantics::{check_body, is_well_formed};
use crate::lang::token::{Identifier, Token};
use crate::lang::variables::{Binding, Bindings, FunctionDef};

/// One interpreter instance: the variable/function namespace plus the entry
/// point that runs a single statement against it.
///
/// Instances are fully independent; there is no shared state behind them.
pub struct Runtime {
    bindings: Bindings,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            bindings: Bindings::new(),
        }
    }

    /// Run one textual statement.
    ///
    /// Declarations and blank lines produce no value; expressions and
    /// assignments produce exactly one. A failed statement leaves the
    /// namespace untouched.
    pub fn interpret(&mut self, line: &str) -> Result<Option<f64>> {
        let tokens = tokenize(line)?;

        match tokens.first() {
            None => Ok(None),
            Some(Token::Fn) => {
                self.declare(&tokens[1..])?;
                Ok(None)
            }
            Some(_) => {
                let postfix = compile(&tokens, &self.bindings)?;

                // a single operand resolves directly; everything else must
                // prove it reduces to one value before side effects may run
                if postfix.len() != 1 && !is_well_formed(&postfix, &self.bindings) {
                    return Err(Error::InvalidExpression {
                        details: "expression does not reduce to a single value".to_string(),
                    });
                }

                Eval::new(&mut self.bindings).eval(&postfix).map(Some)
            }
        }
    }

    /// `fn <name> <params...> => <body>` (the leading `fn` is already
    /// stripped).
    ///
    /// The body is compiled against the namespace as it exists right now, so
    /// it can call previously declared functions but never itself.
    fn declare(&mut self, decl: &[Token]) -> Result<()> {
        let name = match decl.first() {
            Some(Token::Identifier(name)) => name.clone(),
            _ => {
                return Err(Error::Syntax {
                    details: "expected a function name after 'fn'".to_string(),
                })
            }
        };

        if let Some(Binding::Variable(_)) = self.bindings.get(&name) {
            return Err(Error::NameCollision {
                name: name.to_string(),
                existing: "variable",
            });
        }

        let mut params: Vec<Identifier> = Vec::new();
        let mut rest = &decl[1..];
        loop {
            match rest.first() {
                Some(Token::Identifier(param)) => {
                    if params.contains(param) {
                        return Err(Error::DuplicateParameter {
                            name: param.to_string(),
                        });
                    }
                    params.push(param.clone());
                    rest = &rest[1..];
                }
                Some(Token::Arrow) => {
                    rest = &rest[1..];
                    break;
                }
                _ => {
                    return Err(Error::Syntax {
                        details: "expected a parameter name or '=>'".to_string(),
                    })
                }
            }
        }

        let body = compile(rest, &self.bindings)?;
        check_body(&body, &params)?;
        if !is_well_formed(&body, &self.bindings) {
            return Err(Error::InvalidExpression {
                details: "function body does not reduce to a single value".to_string(),
            });
        }

        self.bindings.declare(name, FunctionDef { params, body })
    }
}

#[test]
fn test_expressions() {
    let tests = vec![
        ("7", 7.0),
        ("2.5 + 2.5", 5.0),
        ("1 + 1", 2.0),
        ("2 - 1", 1.0),
        ("2 * 3", 6.0),
        ("8 / 4", 2.0),
        ("7 % 4", 3.0),
        ("4 + 2 * 3", 10.0),
        ("(4 + 2) * 3", 18.0),
        ("4 / 2 * 3", 6.0),
        ("7 % 2 * 8", 8.0),
    ];

    for (input, expected) in tests {
        let mut runtime = Runtime::new();
        match runtime.interpret(input) {
            Ok(Some(value)) => assert_eq!(value, expected, "input: {:?}", input),
            other => panic!("input {:?} produced {:?}", input, other),
        }
    }
}

#[test]
fn test_blank_input() {
    let mut runtime = Runtime::new();
    assert_eq!(runtime.interpret("").unwrap(), None);
    assert_eq!(runtime.interpret("   ").unwrap(), None);
}

#[test]
fn test_assignment() {
    let mut runtime = Runtime::new();

    assert_eq!(runtime.interpret("x = 5").unwrap(), Some(5.0));
    assert_eq!(runtime.interpret("x").unwrap(), Some(5.0));
    assert_eq!(runtime.interpret("x = x + 1").unwrap(), Some(6.0));
    assert_eq!(runtime.interpret("x").unwrap(), Some(6.0));

    // chained assignment binds right
    assert_eq!(runtime.interpret("y = z = 3").unwrap(), Some(3.0));
    assert_eq!(runtime.interpret("y").unwrap(), Some(3.0));
    assert_eq!(runtime.interpret("z").unwrap(), Some(3.0));
}

#[test]
fn test_declaration_and_application() {
    let mut runtime = Runtime::new();

    assert_eq!(runtime.interpret("fn add a b => a + b").unwrap(), None);
    assert_eq!(runtime.interpret("add 2 3").unwrap(), Some(5.0));
    assert_eq!(runtime.interpret("add 2 3 + add 4 5").unwrap(), Some(14.0));
}

#[test]
fn test_dangling_operands_rejected() {
    let mut runtime = Runtime::new();

    // no unary minus: `- 4` is an operator missing its left operand
    for input in ["1 2", "2 -", "+", "1 + + 2", "6 + -(4)"] {
        assert!(
            matches!(
                runtime.interpret(input),
                Err(Error::InvalidExpression { .. })
            ),
            "input: {:?}",
            input
        );
    }
}

#[test]
fn test_unknown_identifier() {
    let mut runtime = Runtime::new();

    match runtime.interpret("y + 7") {
        Err(Error::UnknownIdentifier { name }) => assert_eq!(name, "y"),
        other => panic!("expected unknown identifier, got {:?}", other),
    }
}

#[test]
fn test_declaration_errors() {
    let mut runtime = Runtime::new();
    runtime.interpret("x = 5").unwrap();

    assert!(matches!(
        runtime.interpret("fn x a => a"),
        Err(Error::NameCollision { .. })
    ));
    assert!(matches!(
        runtime.interpret("fn twice a a => a + a"),
        Err(Error::DuplicateParameter { .. })
    ));
    assert!(matches!(
        runtime.interpret("fn leak a => a + b"),
        Err(Error::InvalidExpression { .. })
    ));
    assert!(matches!(
        runtime.interpret("fn short a => a +"),
        Err(Error::InvalidExpression { .. })
    ));
    assert!(matches!(
        runtime.interpret("fn"),
        Err(Error::Syntax { .. })
    ));
    assert!(matches!(
        runtime.interpret("fn headless => "),
        Err(Error::InvalidExpression { .. })
    ));

    // none of the failures registered anything
    assert!(matches!(
        runtime.interpret("twice 2"),
        Err(Error::UnknownIdentifier { .. })
    ));
}

#[test]
fn test_assignment_to_function_name() {
    let mut runtime = Runtime::new();
    runtime.interpret("fn add a b => a + b").unwrap();

    assert!(matches!(
        runtime.interpret("add = 4"),
        Err(Error::NameCollision { .. })
    ));
}

#[test]
fn test_function_redeclaration_overwrites() {
    let mut runtime = Runtime::new();

    runtime.interpret("fn inc a => a + 1").unwrap();
    assert_eq!(runtime.interpret("inc 1").unwrap(), Some(2.0));

    runtime.interpret("fn inc a => a + 10").unwrap();
    assert_eq!(runtime.interpret("inc 1").unwrap(), Some(11.0));
}

#[test]
fn test_zero_arity_functions() {
    let mut runtime = Runtime::new();

    runtime.interpret("fn tau => 6.28").unwrap();
    assert_eq!(runtime.interpret("tau").unwrap(), Some(6.28));
    assert_eq!(runtime.interpret("tau + 1").unwrap(), Some(7.28));
}

#[test]
fn test_functions_can_call_declared_functions() {
    let mut runtime = Runtime::new();

    runtime.interpret("fn add a b => a + b").unwrap();
    runtime.interpret("fn inc x => add x 1").unwrap();
    assert_eq!(runtime.interpret("inc 5").unwrap(), Some(6.0));
}
