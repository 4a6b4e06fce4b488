/// `exit`: halt the run.
///
/// The first argument token is kept verbatim as the halt payload and only
/// turned into a number for the exit code (`exit 2.6` exits with 3,
/// `exit abc` with 0). Without an argument the payload is `0`.
use crate::ast::Statement;
use crate::commands::Command;
use crate::error::Result;
use crate::evaluator::{Evaluator, Flow};

pub struct Exit;

impl Command for Exit {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        let payload = stmt.args.first().map(String::as_str).unwrap_or("0");
        tracing::debug!(payload, line = stmt.line, "exit");
        evaluator.state_mut().halt(payload);
        Ok(Flow::Next)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("exit", Exit);
}
