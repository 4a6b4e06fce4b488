/// `log`: evaluate all arguments as one expression and write the result to
/// the output sink.
///
/// ```fnl
/// log "score: " + ref:score
/// ```
use crate::ast::Statement;
use crate::commands::Command;
use crate::error::{FnlError, Result};
use crate::evaluator::{Evaluator, Flow};

pub struct Log;

impl Command for Log {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        if stmt.args.is_empty() {
            return Err(FnlError::semantic(
                stmt.line,
                "At least one argument required for log",
            ));
        }
        let text = evaluator.evaluate(&stmt.args, stmt.line)?.render();
        evaluator.host().output.write_log(&text);
        Ok(Flow::Next)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("log", Log);
}
