/// `if`: run a block when its condition is truthy.
///
/// ```fnl
/// if ref:lives < 1 { log "game over"; exit 0 }
/// ```
///
/// The body runs against the current environment, so bindings made inside
/// it stay visible afterwards. A `break` in the body skips the rest of the
/// body and nothing else.
use crate::ast::Statement;
use crate::commands::{block_body, block_head, Command};
use crate::error::{FnlError, Result};
use crate::evaluator::{Evaluator, Flow};

pub struct IfFn;

impl Command for IfFn {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        if stmt.args.len() < 3 {
            return Err(FnlError::syntax(stmt.line, "If statement and body required"));
        }
        let (condition, open) = block_head(stmt, "Missing '{' in if statement")?;

        if !evaluator.evaluate(condition, stmt.line)?.is_truthy() {
            return Ok(Flow::Next);
        }

        let body = block_body(stmt, open)?;
        evaluator.with_depth(stmt.line, |ev| ev.run_body(&body))?;
        Ok(Flow::Next)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("if", IfFn);
}
