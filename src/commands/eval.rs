/// `eval`: run text produced at runtime as a program.
///
/// ```fnl
/// var src = "log 1 + 1"
/// eval ref:src
/// ```
///
/// The program shares the caller's environment but starts its own depth
/// count at zero, so recursion through `eval` is not limited by the depth
/// guard. A `null` result runs nothing.
use crate::ast::Statement;
use crate::commands::Command;
use crate::error::{FnlError, Result};
use crate::evaluator::{Evaluator, Flow};
use crate::value::Value;

pub struct Eval;

impl Command for Eval {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        if stmt.args.is_empty() {
            return Err(FnlError::semantic(stmt.line, "1 or more inputs expected"));
        }
        let source = match evaluator.evaluate(&stmt.args, stmt.line)? {
            Value::Null => return Ok(Flow::Next),
            Value::String(source) => source,
            other => other.to_js_string(),
        };
        evaluator.run_nested(&source);
        Ok(Flow::Next)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("eval", Eval);
}
