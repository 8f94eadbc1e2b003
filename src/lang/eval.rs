use std::collections::BTreeMap;

use crate::lang::compile::Postfix;
use crate::lang::error::{Error, Result};
use crate::lang::token::{Identifier, Operator};
use crate::lang::variables::{Binding, Bindings};

/// Positional parameter bindings for one function invocation.
type Frame = BTreeMap<Identifier, f64>;

/// A stack slot during postfix evaluation.
///
/// Names stay unresolved on the stack so assignment can see its target;
/// they resolve to numbers only at the point of use.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Name(Identifier),
}

/// Stack machine for one compiled sequence.
///
/// Each call to `eval` runs against the live namespace but stages its
/// assignments locally; the registry only changes if the whole evaluation
/// succeeds, so a failing statement cannot leave half of itself behind.
pub struct Eval<'a> {
    bindings: &'a mut Bindings,
    staged: BTreeMap<Identifier, f64>,
}

impl<'a> Eval<'a> {
    /// Resolution order: current frame, then assignments staged by this
    /// evaluation, then the registry.
    fn resolve(&self, operand: &Operand, frame: &Frame) -> Result<f64> {
        match operand {
            Operand::Number(n) => Ok(*n),
            Operand::Name(name) => frame
                .get(name)
                .or_else(|| self.staged.get(name))
                .copied()
                .or_else(|| self.bindings.variable(name))
                .ok_or_else(|| Error::UnknownIdentifier {
                    name: name.to_string(),
                }),
        }
    }

    fn assign(&mut self, target: Operand, value: f64, frame: &Frame) -> Result<f64> {
        let name = match target {
            Operand::Name(name) => name,
            Operand::Number(n) => {
                return Err(Error::InvalidExpression {
                    details: format!("cannot assign to '{}'", n),
                })
            }
        };

        // parameters are read-only
        if frame.contains_key(&name) {
            return Err(Error::InvalidExpression {
                details: format!("cannot assign to parameter '{}'", name),
            });
        }

        if let Some(Binding::Function(_)) = self.bindings.get(&name) {
            return Err(Error::NameCollision {
                name: name.to_string(),
                existing: "function",
            });
        }

        self.staged.insert(name, value);
        Ok(value)
    }

    /// Pop the call's arguments, bind them positionally into a fresh frame,
    /// and run the precompiled body under it.
    fn invoke(&mut self, name: &Identifier, stack: &mut Vec<Operand>, frame: &Frame) -> Result<f64> {
        let def = match self.bindings.function(name) {
            Some(def) => def.clone(),
            None => {
                return Err(Error::UnknownIdentifier {
                    name: name.to_string(),
                })
            }
        };

        let at = stack
            .len()
            .checked_sub(def.arity())
            .ok_or_else(|| Error::InvalidExpression {
                details: format!("function '{}' expects {} arguments", name, def.arity()),
            })?;

        // arguments were pushed left to right and resolve in the caller's frame
        let mut locals = Frame::new();
        for (param, arg) in def.params.iter().zip(stack.split_off(at)) {
            let value = self.resolve(&arg, frame)?;
            locals.insert(param.clone(), value);
        }

        self.eval_postfix(&def.body, &locals)
    }

    fn eval_postfix(&mut self, postfix: &[Postfix], frame: &Frame) -> Result<f64> {
        let mut stack: Vec<Operand> = Vec::new();

        for slot in postfix {
            match slot {
                Postfix::Number(n) => stack.push(Operand::Number(*n)),
                Postfix::Name(name) => stack.push(Operand::Name(name.clone())),
                Postfix::Call(name) => {
                    let value = self.invoke(name, &mut stack, frame)?;
                    stack.push(Operand::Number(value));
                }
                Postfix::BinOp(op) => {
                    let rhs = stack.pop().ok_or_else(|| missing_operands(*op))?;
                    let lhs = stack.pop().ok_or_else(|| missing_operands(*op))?;

                    let value = if *op == Operator::Assign {
                        let rhs = self.resolve(&rhs, frame)?;
                        self.assign(lhs, rhs, frame)?
                    } else {
                        let lhs = self.resolve(&lhs, frame)?;
                        let rhs = self.resolve(&rhs, frame)?;
                        op.apply(lhs, rhs)?
                    };

                    stack.push(Operand::Number(value));
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(operand), true) => self.resolve(&operand, frame),
            _ => Err(Error::InvalidExpression {
                details: "expression does not reduce to a single value".to_string(),
            }),
        }
    }

    pub fn new(bindings: &'a mut Bindings) -> Self {
        Self {
            bindings,
            staged: BTreeMap::new(),
        }
    }

    /// Evaluate one compiled sequence to a number.
    ///
    /// A sequence of exactly one operand resolves directly; this is the path
    /// that serves bare numbers, bare variable reads, and bare zero-argument
    /// calls. Staged assignments land in the registry only on success.
    pub fn eval(mut self, postfix: &[Postfix]) -> Result<f64> {
        let value = self.eval_postfix(postfix, &Frame::new())?;

        let Eval { bindings, staged } = self;
        for (name, value) in staged {
            bindings.assign(name, value)?;
        }

        Ok(value)
    }
}

fn missing_operands(op: Operator) -> Error {
    Error::InvalidExpression {
        details: format!("operator '{}' is missing operands", op),
    }
}

#[cfg(test)]
use crate::lang::variables::FunctionDef;

#[cfg(test)]
fn ident(name: &str) -> Identifier {
    Identifier(name.to_string())
}

#[test]
fn test_stack_order() {
    // left operand is pushed first: 10 2 / is 10 / 2
    let mut bindings = Bindings::new();
    let postfix = vec![
        Postfix::Number(10.0),
        Postfix::Number(2.0),
        Postfix::BinOp(Operator::Divide),
    ];

    assert_eq!(Eval::new(&mut bindings).eval(&postfix).unwrap(), 5.0);
}

#[test]
fn test_assignment_commits_on_success() {
    let mut bindings = Bindings::new();
    let postfix = vec![
        Postfix::Name(ident("x")),
        Postfix::Number(5.0),
        Postfix::BinOp(Operator::Assign),
    ];

    assert_eq!(Eval::new(&mut bindings).eval(&postfix).unwrap(), 5.0);
    assert_eq!(bindings.variable(&ident("x")), Some(5.0));
}

#[test]
fn test_failed_evaluation_discards_staged_assignments() {
    let mut bindings = Bindings::new();
    bindings.assign(ident("x"), 10.0).unwrap();

    // (x = 3) + ghost -- the inner assignment runs, then resolution fails
    let postfix = vec![
        Postfix::Name(ident("x")),
        Postfix::Number(3.0),
        Postfix::BinOp(Operator::Assign),
        Postfix::Name(ident("ghost")),
        Postfix::BinOp(Operator::Plus),
    ];

    match Eval::new(&mut bindings).eval(&postfix) {
        Err(Error::UnknownIdentifier { name }) => assert_eq!(name, "ghost"),
        other => panic!("expected unknown identifier, got {:?}", other),
    }

    assert_eq!(bindings.variable(&ident("x")), Some(10.0));
}

#[test]
fn test_staged_assignment_visible_within_evaluation() {
    let mut bindings = Bindings::new();

    // x = 4, then read x back in the same expression: (x = 4) + x
    let postfix = vec![
        Postfix::Name(ident("x")),
        Postfix::Number(4.0),
        Postfix::BinOp(Operator::Assign),
        Postfix::Name(ident("x")),
        Postfix::BinOp(Operator::Plus),
    ];

    assert_eq!(Eval::new(&mut bindings).eval(&postfix).unwrap(), 8.0);
    assert_eq!(bindings.variable(&ident("x")), Some(4.0));
}

#[test]
fn test_call_frames_are_isolated() {
    let mut bindings = Bindings::new();
    bindings.assign(ident("a"), 100.0).unwrap();
    bindings
        .declare(
            ident("double"),
            FunctionDef {
                params: vec![ident("a")],
                body: vec![
                    Postfix::Name(ident("a")),
                    Postfix::Number(2.0),
                    Postfix::BinOp(Operator::Multiply),
                ],
            },
        )
        .unwrap();

    // the parameter shadows the global inside the body only
    let postfix = vec![Postfix::Number(3.0), Postfix::Call(ident("double"))];
    assert_eq!(Eval::new(&mut bindings).eval(&postfix).unwrap(), 6.0);
    assert_eq!(bindings.variable(&ident("a")), Some(100.0));
}

#[test]
fn test_parameters_are_read_only() {
    let mut bindings = Bindings::new();
    bindings
        .declare(
            ident("sneak"),
            FunctionDef {
                params: vec![ident("a")],
                body: vec![
                    Postfix::Name(ident("a")),
                    Postfix::Number(1.0),
                    Postfix::BinOp(Operator::Assign),
                ],
            },
        )
        .unwrap();

    let postfix = vec![Postfix::Number(3.0), Postfix::Call(ident("sneak"))];
    assert!(matches!(
        Eval::new(&mut bindings).eval(&postfix),
        Err(Error::InvalidExpression { .. })
    ));
}

#[test]
fn test_assignment_target_must_be_a_name() {
    let mut bindings = Bindings::new();
    let postfix = vec![
        Postfix::Number(1.0),
        Postfix::Number(2.0),
        Postfix::BinOp(Operator::Assign),
    ];

    assert!(matches!(
        Eval::new(&mut bindings).eval(&postfix),
        Err(Error::InvalidExpression { .. })
    ));
}

#[test]
fn test_float_division_does_not_trap() {
    let mut bindings = Bindings::new();
    let postfix = vec![
        Postfix::Number(1.0),
        Postfix::Number(0.0),
        Postfix::BinOp(Operator::Divide),
    ];

    assert_eq!(
        Eval::new(&mut bindings).eval(&postfix).unwrap(),
        f64::INFINITY
    );
}
