/// `break`: stop the body that is currently running.
///
/// Inside `loop`/`while` this skips the rest of the current iteration; the
/// loop goes on. Inside an `if` body it skips the rest of that body only. At
/// the top level it does nothing.
use crate::ast::Statement;
use crate::commands::Command;
use crate::error::Result;
use crate::evaluator::{Evaluator, Flow};

pub struct Break;

impl Command for Break {
    fn call(&self, _evaluator: &mut Evaluator<'_>, _stmt: &Statement) -> Result<Flow> {
        Ok(Flow::Break)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("break", Break);
}
