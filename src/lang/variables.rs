use std::collections::BTreeMap;

use crate::lang::compile::Postfix;
use crate::lang::error::{Error, Result};
use crate::lang::token::Identifier;

/// A user-declared function: ordered parameter names plus the body, compiled
/// to postfix once at declaration time and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub params: Vec<Identifier>,
    pub body: Vec<Postfix>,
}

impl FunctionDef {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// What a name is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Variable(f64),
    Function(FunctionDef),
}

/// The interpreter's namespace.
///
/// Variables and functions share one registry, so a name can never mean both
/// at once; the cross-kind checks happen here, at bind time, and nothing
/// downstream has to re-check.
pub struct Bindings {
    inner: BTreeMap<Identifier, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings {
            inner: BTreeMap::default(),
        }
    }

    pub fn get(&self, name: &Identifier) -> Option<&Binding> {
        self.inner.get(name)
    }

    pub fn variable(&self, name: &Identifier) -> Option<f64> {
        match self.inner.get(name) {
            Some(Binding::Variable(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn function(&self, name: &Identifier) -> Option<&FunctionDef> {
        match self.inner.get(name) {
            Some(Binding::Function(def)) => Some(def),
            _ => None,
        }
    }

    /// Bind a variable. Re-assignment overwrites; taking a function's name
    /// is an error.
    pub fn assign(&mut self, name: Identifier, value: f64) -> Result<()> {
        if let Some(Binding::Function(_)) = self.inner.get(&name) {
            return Err(Error::NameCollision {
                name: name.to_string(),
                existing: "function",
            });
        }

        self.inner.insert(name, Binding::Variable(value));
        Ok(())
    }

    /// Bind a function. Redeclaring a function overwrites the old
    /// definition; taking a variable's name is an error.
    pub fn declare(&mut self, name: Identifier, def: FunctionDef) -> Result<()> {
        if let Some(Binding::Variable(_)) = self.inner.get(&name) {
            return Err(Error::NameCollision {
                name: name.to_string(),
                existing: "variable",
            });
        }

        self.inner.insert(name, Binding::Function(def));
        Ok(())
    }
}

#[cfg(test)]
fn ident(name: &str) -> Identifier {
    Identifier(name.to_string())
}

#[test]
fn test_assignment_overwrites() {
    let mut bindings = Bindings::new();
    bindings.assign(ident("x"), 1.0).unwrap();
    bindings.assign(ident("x"), 2.0).unwrap();

    assert_eq!(bindings.variable(&ident("x")), Some(2.0));
    assert_eq!(bindings.variable(&ident("y")), None);
}

#[test]
fn test_cross_kind_collisions() {
    let nop = FunctionDef {
        params: vec![],
        body: vec![Postfix::Number(0.0)],
    };

    let mut bindings = Bindings::new();
    bindings.assign(ident("x"), 1.0).unwrap();
    bindings.declare(ident("f"), nop.clone()).unwrap();

    match bindings.declare(ident("x"), nop.clone()) {
        Err(Error::NameCollision { name, existing }) => {
            assert_eq!(name, "x");
            assert_eq!(existing, "variable");
        }
        _ => panic!("expected a name collision"),
    }

    match bindings.assign(ident("f"), 3.0) {
        Err(Error::NameCollision { name, existing }) => {
            assert_eq!(name, "f");
            assert_eq!(existing, "function");
        }
        _ => panic!("expected a name collision"),
    }

    // same-kind redeclaration is an overwrite, not an error
    let other = FunctionDef {
        params: vec![ident("a")],
        body: vec![Postfix::Name(ident("a"))],
    };
    bindings.declare(ident("f"), other.clone()).unwrap();
    assert_eq!(bindings.function(&ident("f")), Some(&other));
}
