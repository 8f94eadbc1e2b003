use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Helper, Highlighter, Hinter, Result};

/// Helper that extends the editor
///
/// Currently only implements the `Validator` trait to trigger multiline
/// editing while the input has more `(` than `)`.
#[derive(Completer, Helper, Highlighter, Hinter)]
pub struct ReplHelper {}

impl ReplHelper {
    pub fn new() -> Self {
        ReplHelper {}
    }
}

impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> Result<ValidationResult> {
        if open_parens(ctx.input()) > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Count of `(` not yet matched by `)`. Never negative; a stray `)` is the
/// interpreter's problem, not the line editor's.
fn open_parens(input: &str) -> u32 {
    let mut depth: u32 = 0;
    for c in input.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => (),
        }
    }

    depth
}

#[test]
fn test_open_parens() {
    assert_eq!(open_parens("1 + 2"), 0);
    assert_eq!(open_parens("(1 + 2)"), 0);
    assert_eq!(open_parens("(1 + (2"), 2);
    assert_eq!(open_parens("((1) + 2"), 1);
    assert_eq!(open_parens(")("), 1);
    assert_eq!(open_parens("1)"), 0);
}
