//! Whole-session tests through the public API.

use fncalc::{Error, Runtime};

fn eval(runtime: &mut Runtime, input: &str) -> f64 {
    match runtime.interpret(input) {
        Ok(Some(value)) => value,
        other => panic!("input {:?} produced {:?}", input, other),
    }
}

fn declare(runtime: &mut Runtime, input: &str) {
    match runtime.interpret(input) {
        Ok(None) => (),
        other => panic!("declaration {:?} produced {:?}", input, other),
    }
}

#[test]
fn test_session_basics() {
    let mut runtime = Runtime::new();

    assert_eq!(eval(&mut runtime, "1 + 1"), 2.0);
    assert_eq!(eval(&mut runtime, "4 + 2 * 3"), 10.0);
    assert_eq!(eval(&mut runtime, "(4 + 2) * 3"), 18.0);
    assert_eq!(eval(&mut runtime, "x = 5"), 5.0);
    assert_eq!(eval(&mut runtime, "x"), 5.0);
    assert_eq!(eval(&mut runtime, "x = x + 1"), 6.0);
    assert_eq!(eval(&mut runtime, "x / 2 + x"), 9.0);
}

#[test]
fn test_nested_function_application() {
    let mut runtime = Runtime::new();

    declare(&mut runtime, "fn f1 a1 a2 => a1 * a2");
    declare(&mut runtime, "fn f2 a1 a2 a3 => a1 * a2 * a3");

    // f2(f2(1, 2, 3), f1(4, 5), f1(6, 7)) = 6 * 20 * 42
    assert_eq!(eval(&mut runtime, "f2 f2 1 2 3 f1 4 5 f1 6 7"), 5040.0);
}

#[test]
fn test_functions_mixed_with_grouping() {
    let mut runtime = Runtime::new();

    declare(&mut runtime, "fn avg a b c => (a + b + c) / 3");
    declare(&mut runtime, "fn add a b => a + b");
    declare(&mut runtime, "fn sub a b => a - b");

    // avg(3, add(6, 2), sub(3, 2)) = 12 / 3
    assert_eq!(eval(&mut runtime, "3 + avg 3 add 6 2 sub 3 2"), 7.0);
}

#[test]
fn test_functions_see_arguments_not_globals() {
    let mut runtime = Runtime::new();

    declare(&mut runtime, "fn scale a b => a * b");
    assert_eq!(eval(&mut runtime, "a = 10"), 10.0);
    assert_eq!(eval(&mut runtime, "scale 2 3"), 6.0);
    assert_eq!(eval(&mut runtime, "a"), 10.0);

    // arguments may themselves be variables
    assert_eq!(eval(&mut runtime, "scale a 4"), 40.0);
}

#[test]
fn test_error_kinds() {
    let mut runtime = Runtime::new();
    declare(&mut runtime, "fn add a b => a + b");
    assert_eq!(eval(&mut runtime, "x = 1"), 1.0);

    let cases: Vec<(&str, fn(&Error) -> bool)> = vec![
        ("ghost + 1", |e| {
            matches!(e, Error::UnknownIdentifier { .. })
        }),
        ("fn x a => a", |e| matches!(e, Error::NameCollision { .. })),
        ("add = 2", |e| matches!(e, Error::NameCollision { .. })),
        ("fn dup a a => a", |e| {
            matches!(e, Error::DuplicateParameter { .. })
        }),
        ("1 2", |e| matches!(e, Error::InvalidExpression { .. })),
        ("add 1", |e| matches!(e, Error::InvalidExpression { .. })),
        ("fn leak a => a + b", |e| {
            matches!(e, Error::InvalidExpression { .. })
        }),
        ("1 $ 2", |e| matches!(e, Error::Syntax { .. })),
        ("(1 + 2", |e| matches!(e, Error::Syntax { .. })),
    ];

    for (input, check) in cases {
        match runtime.interpret(input) {
            Err(e) => assert!(check(&e), "input {:?} produced {}", input, e),
            Ok(v) => panic!("input {:?} unexpectedly produced {:?}", input, v),
        }
    }
}

#[test]
fn test_failures_leave_state_unchanged() {
    let mut runtime = Runtime::new();
    assert_eq!(eval(&mut runtime, "x = 10"), 10.0);

    // the inner assignment executes before the failure, but must not stick
    assert!(runtime.interpret("(x = 3) + ghost").is_err());
    assert_eq!(eval(&mut runtime, "x"), 10.0);

    // a failed declaration registers nothing
    assert!(runtime.interpret("fn broken a => a + ghost").is_err());
    assert!(matches!(
        runtime.interpret("broken 1"),
        Err(Error::UnknownIdentifier { .. })
    ));
}

#[test]
fn test_division_and_modulo_follow_ieee754() {
    let mut runtime = Runtime::new();

    assert_eq!(eval(&mut runtime, "1 / 0"), f64::INFINITY);
    assert!(eval(&mut runtime, "0 / 0").is_nan());
    assert!(eval(&mut runtime, "1 % 0").is_nan());
}

#[test]
fn test_independent_runtimes() {
    let mut first = Runtime::new();
    let mut second = Runtime::new();

    assert_eq!(eval(&mut first, "x = 1"), 1.0);
    assert!(matches!(
        second.interpret("x"),
        Err(Error::UnknownIdentifier { .. })
    ));
}
