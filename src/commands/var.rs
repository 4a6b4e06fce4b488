/// `var`: bind a variable in the current environment.
///
/// `=` and `==` are both accepted as the assignment operator.
///
/// ```fnl
/// var total = ref:total + 1
/// var names == ["a","b"]
/// ```
use crate::ast::Statement;
use crate::commands::Command;
use crate::error::{FnlError, Result};
use crate::evaluator::{Evaluator, Flow};

pub struct Var;

impl Command for Var {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        let [name, op, expr @ ..] = stmt.args.as_slice() else {
            return Err(FnlError::syntax(stmt.line, "Expression expected"));
        };
        if expr.is_empty() {
            return Err(FnlError::syntax(stmt.line, "Expression expected"));
        }
        if op != "=" && op != "==" {
            return Err(FnlError::syntax(stmt.line, "Assignment operator expected"));
        }

        let value = evaluator.evaluate(expr, stmt.line)?;
        evaluator.env_mut().set(name.clone(), value);
        Ok(Flow::Next)
    }
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("var", Var);
}
