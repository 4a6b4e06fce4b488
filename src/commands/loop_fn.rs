/// `loop`: run a block a fixed number of times.
///
/// ```fnl
/// loop 3 { log "hi" }
/// ```
///
/// The count is evaluated once and read with `parseFloat` rules, so a
/// fractional count such as `2.5` runs three times. A count that is not a
/// number runs nothing. `break` ends the current pass through the body, not
/// the loop.
use crate::ast::Statement;
use crate::commands::{block_body, block_head, Command};
use crate::error::{FnlError, Result};
use crate::evaluator::{Evaluator, Flow};
use crate::value::parse_float_prefix;

pub struct Loop;

impl Command for Loop {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        if stmt.args.len() < 3 {
            return Err(FnlError::syntax(stmt.line, "Loop amount and body required"));
        }
        let (count_expr, open) = block_head(stmt, "Missing '{' in loop statement")?;

        let count = evaluator.evaluate(count_expr, stmt.line)?;
        let count = parse_float_prefix(&count.to_js_string());
        if count <= 0.0 {
            return Ok(Flow::Next);
        }

        let body = block_body(stmt, open)?;
        evaluator.with_depth(stmt.line, |ev| {
            let mut i = 0.0;
            while i < count && !ev.state().is_halted() {
                // Break only cuts the current iteration short.
                ev.run_body(&body);
                i += 1.0;
            }
        })?;
        Ok(Flow::Next)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("loop", Loop);
}
