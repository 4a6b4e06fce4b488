/// `fnl:idbSet`: write a value to the durable store.
///
/// Key and value are one token each. Read it back with `fnl:idbGet`.
///
/// ```fnl
/// fnl:idbSet "best" ref:score
/// ```
use crate::ast::Statement;
use crate::commands::Command;
use crate::error::{FnlError, Result};
use crate::evaluator::{Evaluator, Flow};

pub struct StoreSet;

impl Command for StoreSet {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        if stmt.args.len() < 2 {
            return Err(FnlError::semantic(stmt.line, "2 inputs expected"));
        }
        let key = evaluator.evaluate(&stmt.args[..1], stmt.line)?.to_js_string();
        let value = evaluator.evaluate(&stmt.args[1..2], stmt.line)?;

        evaluator
            .host()
            .store
            .put(&key, &value)
            .map_err(|e| FnlError::external(stmt.line, format!("Failed to store '{key}': {e}")))?;
        Ok(Flow::Next)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("fnl:idbSet", StoreSet);
}
