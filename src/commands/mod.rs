use crate::ast::Statement;
use crate::error::{FnlError, Result};
use crate::evaluator::{Evaluator, Flow};
use crate::parser;

// ---------------------------------------------------------------------------
// Core trait
// ---------------------------------------------------------------------------

/// Implement this trait to add a built-in FNL command.
///
/// `stmt.args` holds the raw argument tokens; a command compiles whatever
/// expressions it needs through [`Evaluator::evaluate`]. Block commands find
/// their body between the `{` and `}` markers the parser leaves in `args`.
///
/// Return [`Flow::Break`] to stop the body that is running this statement.
/// Errors halt the run; the evaluator reports them.
pub trait Command {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow>;
}

// ---------------------------------------------------------------------------
// Built-in modules
// ---------------------------------------------------------------------------

pub mod break_fn; // break
pub mod comment;  // #
pub mod eval;     // eval
pub mod exit;     // exit
pub mod func;     // func
pub mod if_fn;    // if
pub mod log;      // log
pub mod loop_fn;  // loop
pub mod rend;     // rend
pub mod store;    // fnl:idbSet
pub mod var;      // var
pub mod while_fn; // while

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Register every built-in command with the evaluator.
///
/// Any other command name is treated as a call of a user-defined function.
pub fn register_all(evaluator: &mut Evaluator<'_>) {
    break_fn::register(evaluator);
    comment::register(evaluator);
    eval::register(evaluator);
    exit::register(evaluator);
    func::register(evaluator);
    if_fn::register(evaluator);
    log::register(evaluator);
    loop_fn::register(evaluator);
    rend::register(evaluator);
    store::register(evaluator);
    var::register(evaluator);
    while_fn::register(evaluator);
}

// ---------------------------------------------------------------------------
// Block helpers
// ---------------------------------------------------------------------------

/// Tokens before the `{` marker, plus the marker's position.
pub(crate) fn block_head<'s>(stmt: &'s Statement, missing_open: &str) -> Result<(&'s [String], usize)> {
    let open = stmt
        .block_open()
        .ok_or_else(|| FnlError::syntax(stmt.line, missing_open))?;
    Ok((&stmt.args[..open], open))
}

/// Split the body of a block command into statements.
pub(crate) fn block_body(stmt: &Statement, open: usize) -> Result<Vec<Statement>> {
    let text = stmt
        .block_body(open)
        .ok_or_else(|| FnlError::syntax(stmt.line, "Function body must be wrapped in { }"))?;
    parser::parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(command: &str, args: &[&str]) -> Statement {
        Statement::new(command, args.iter().map(|s| s.to_string()).collect(), 4)
    }

    #[test]
    fn head_and_body() {
        let s = stmt("if", &["x", "==", "1", "{", "log 1; log 2", "}"]);
        let (head, open) = block_head(&s, "missing").unwrap();
        assert_eq!(head, ["x", "==", "1"]);
        let body = block_body(&s, open).unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(body[1].line, 2);
    }

    #[test]
    fn missing_markers() {
        let s = stmt("loop", &["3", "log", "1"]);
        assert_eq!(
            block_head(&s, "Missing '{' in loop statement").unwrap_err().to_string(),
            "Missing '{' in loop statement. Line: 4"
        );

        let s = stmt("loop", &["3", "{", "log 1"]);
        assert_eq!(
            block_body(&s, 1).unwrap_err().to_string(),
            "Function body must be wrapped in { }. Line: 4"
        );
    }
}
