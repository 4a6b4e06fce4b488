/// `while`: run a block for as long as its condition stays truthy.
///
/// ```fnl
/// var i = 0
/// while ref:i < 3 { log ref:i; var i = ref:i + 1 }
/// ```
///
/// The condition is recompiled before every iteration, so it sees variables
/// the body has changed. It is checked once on its own and then again before
/// the first iteration, so a condition with side effects (`ref:a pop`) runs
/// them twice up front. `break` ends the current iteration only.
use crate::ast::Statement;
use crate::commands::{block_body, block_head, Command};
use crate::error::{FnlError, Result};
use crate::evaluator::{Evaluator, Flow};

pub struct While;

impl Command for While {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        if stmt.args.len() < 3 {
            return Err(FnlError::syntax(stmt.line, "Loop amount and body required"));
        }
        let (condition, open) = block_head(stmt, "Missing '{' in loop statement")?;

        if !evaluator.evaluate(condition, stmt.line)?.is_truthy() {
            return Ok(Flow::Next);
        }

        let body = block_body(stmt, open)?;
        evaluator.with_depth(stmt.line, |ev| -> Result<()> {
            while !ev.state().is_halted() && ev.evaluate(condition, stmt.line)?.is_truthy() {
                ev.run_body(&body);
            }
            Ok(())
        })??;
        Ok(Flow::Next)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("while", While);
}
