//! Tokenizer for one line of input.
//!
//! The language is flat enough that the lexer produces a token sequence, not
//! a tree; precedence and grouping are resolved later by the compiler's
//! single scan.
//!
//! Developer notes:
//!
//! * Rule order matters. `=>` must be tried before the operator rule,
//!   otherwise `=` is taken and the parser chokes on the `>`.
//!
//! * Keywords are carved out of the identifier rule (`fn` lexes as its own
//!   token), so a declaration can never be mistaken for an expression.

use std::str::FromStr;

use pom::parser::{end, is_a, one_of, sym, tag, Parser};

use crate::lang::error::{Error, Result};
use crate::lang::token::{Identifier, Operator, Token};

fn space<'a>() -> Parser<'a, char, ()> {
    one_of(" \t\r\n").repeat(0..).discard()
}

/// Numeric literals: `12`, `12.5`, `.5`. A trailing dot (`12.`) is not a
/// number.
fn number<'a>() -> Parser<'a, char, Token> {
    let digits = || is_a(|c: char| c.is_ascii_digit()).repeat(1..).discard();
    let with_integer_part = digits() - (sym('.') - digits()).opt();
    let fraction_only = (sym('.') - digits()).discard();

    (with_integer_part | fraction_only)
        .collect()
        .map(String::from_iter)
        .convert(|s| f64::from_str(&s))
        .map(Token::Number)
}

fn ident<'a>() -> Parser<'a, char, Token> {
    let word = is_a(|c: char| c.is_ascii_alphabetic() || c == '_')
        + is_a(|c: char| c.is_ascii_alphanumeric() || c == '_').repeat(0..);

    word.collect()
        .map(String::from_iter)
        .map(|s: String| match s.as_str() {
            "fn" => Token::Fn,
            _ => Token::Identifier(Identifier(s)),
        })
}

fn operator<'a>() -> Parser<'a, char, Token> {
    one_of("=+-*/%").map(|c| {
        let op = match c {
            '=' => Operator::Assign,
            '+' => Operator::Plus,
            '-' => Operator::Minus,
            '*' => Operator::Multiply,
            '/' => Operator::Divide,
            '%' => Operator::Modulo,
            _ => panic!("Unhandled operator: {}", c),
        };

        Token::Operator(op)
    })
}

fn paren<'a>() -> Parser<'a, char, Token> {
    sym('(').map(|_| Token::OpenParen) | sym(')').map(|_| Token::CloseParen)
}

fn token<'a>() -> Parser<'a, char, Token> {
    // NB: `=>` before `=`
    tag("=>").map(|_| Token::Arrow) | operator() | paren() | number() | ident()
}

/// Tokenize one statement.
///
/// Consumes the whole line; anything the rules above cannot claim is a
/// syntax error. Blank input tokenizes to an empty sequence.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let input: Vec<char> = input.chars().collect();
    let line = space() * (token() - space()).repeat(0..) - end();

    line.parse(&input).map_err(|e| Error::Syntax {
        details: e.to_string(),
    })
}

#[test]
fn test_tokenize_expressions() {
    let tests = vec![
        ("", vec![]),
        ("   ", vec![]),
        ("7", vec![Token::Number(7.0)]),
        ("2.5", vec![Token::Number(2.5)]),
        (".5", vec![Token::Number(0.5)]),
        (
            "1 + 2",
            vec![
                Token::Number(1.0),
                Token::Operator(Operator::Plus),
                Token::Number(2.0),
            ],
        ),
        (
            "(x_1*2)%3",
            vec![
                Token::OpenParen,
                Token::Identifier(Identifier("x_1".to_string())),
                Token::Operator(Operator::Multiply),
                Token::Number(2.0),
                Token::CloseParen,
                Token::Operator(Operator::Modulo),
                Token::Number(3.0),
            ],
        ),
        (
            "x = 13 + (y / 2)",
            vec![
                Token::Identifier(Identifier("x".to_string())),
                Token::Operator(Operator::Assign),
                Token::Number(13.0),
                Token::Operator(Operator::Plus),
                Token::OpenParen,
                Token::Identifier(Identifier("y".to_string())),
                Token::Operator(Operator::Divide),
                Token::Number(2.0),
                Token::CloseParen,
            ],
        ),
    ];

    for (input, expected) in tests {
        assert_eq!(tokenize(input).unwrap(), expected, "input: {:?}", input);
    }
}

#[test]
fn test_tokenize_declaration() {
    assert_eq!(
        tokenize("fn avg a b => (a + b) / 2").unwrap(),
        vec![
            Token::Fn,
            Token::Identifier(Identifier("avg".to_string())),
            Token::Identifier(Identifier("a".to_string())),
            Token::Identifier(Identifier("b".to_string())),
            Token::Arrow,
            Token::OpenParen,
            Token::Identifier(Identifier("a".to_string())),
            Token::Operator(Operator::Plus),
            Token::Identifier(Identifier("b".to_string())),
            Token::CloseParen,
            Token::Operator(Operator::Divide),
            Token::Number(2.0),
        ]
    );

    // `fnord` is an identifier, not the keyword plus junk
    assert_eq!(
        tokenize("fnord").unwrap(),
        vec![Token::Identifier(Identifier("fnord".to_string()))]
    );
}

#[test]
fn test_tokenize_rejects_junk() {
    for input in ["1 @ 2", "12.", "\"quoted\"", "a & b"] {
        assert!(tokenize(input).is_err(), "input: {:?}", input);
    }
}
