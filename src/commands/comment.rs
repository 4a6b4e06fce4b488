/// `#`: comment line; the rest of the statement is ignored.
///
/// ```fnl
/// # draw the background first
/// ```
use crate::ast::Statement;
use crate::commands::Command;
use crate::error::Result;
use crate::evaluator::{Evaluator, Flow};

pub struct Comment;

impl Command for Comment {
    fn call(&self, _evaluator: &mut Evaluator<'_>, _stmt: &Statement) -> Result<Flow> {
        Ok(Flow::Next)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("#", Comment);
}
