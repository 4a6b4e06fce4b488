//! Postfix evaluation against an operand stack.
//!
//! Variable references stay unresolved on the stack until an operator needs
//! their value, because the array operators mutate the binding itself.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::compiler::{CompiledExpression, Item, Operator};
use crate::environment::Environment;
use crate::error::{FnlError, Result};
use crate::value::{ArrayRef, Value};

enum Operand {
    Value(Value),
    Ref(String),
}

impl Operand {
    fn resolve(self, env: &Environment) -> Value {
        match self {
            Operand::Value(v) => v,
            Operand::Ref(name) => env.resolve(&name),
        }
    }
}

pub fn evaluate(expr: &CompiledExpression, env: &Environment, line: usize) -> Result<Value> {
    let mut stack: Vec<Operand> = Vec::with_capacity(expr.items.len());

    for item in &expr.items {
        match item {
            Item::Literal(v) => stack.push(Operand::Value(v.clone())),
            Item::VarRef(name) => stack.push(Operand::Ref(name.clone())),
            Item::Operator(op) => apply(*op, &mut stack, env, line)?,
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(result), true) => Ok(result.resolve(env)),
        _ => Err(FnlError::syntax(
            line,
            "Invalid expression (stack not reduced to single result)",
        )),
    }
}

fn apply(op: Operator, stack: &mut Vec<Operand>, env: &Environment, line: usize) -> Result<()> {
    match op {
        Operator::Push => {
            if stack.len() < 2 {
                return Err(FnlError::semantic(line, "push requires [arrayVar, value]"));
            }
            let value = pop(stack).resolve(env);
            let items = target_array(pop(stack), op, env, line)?;
            items.borrow_mut().push(value);
            stack.push(Operand::Value(Value::Array(items)));
        }
        Operator::Pop => {
            if stack.is_empty() {
                return Err(FnlError::semantic(line, "pop requires [arrayVar]"));
            }
            let items = target_array(pop(stack), op, env, line)?;
            let last = items.borrow_mut().pop().unwrap_or(Value::Null);
            stack.push(Operand::Value(last));
        }
        Operator::Slice => {
            if stack.len() < 3 {
                return Err(FnlError::semantic(line, "slice requires [array, start, end]"));
            }
            let end = pop(stack).resolve(env).to_number();
            let start = pop(stack).resolve(env).to_number();
            let items = target_array(pop(stack), op, env, line)?;
            let copy = {
                let items = items.borrow();
                let from = relative_index(start, items.len());
                let to = relative_index(end, items.len());
                items.get(from..to.max(from)).unwrap_or_default().to_vec()
            };
            stack.push(Operand::Value(Value::array(copy)));
        }
        Operator::Splice => {
            if stack.len() < 3 {
                return Err(FnlError::semantic(
                    line,
                    "splice requires [array, start, deleteCount]",
                ));
            }
            let delete_count = pop(stack).resolve(env).to_number();
            let start = pop(stack).resolve(env).to_number();
            let items = target_array(pop(stack), op, env, line)?;
            {
                let mut items = items.borrow_mut();
                let from = relative_index(start, items.len());
                let count = clamp_count(delete_count, items.len() - from);
                items.drain(from..from + count);
            }
            stack.push(Operand::Value(Value::Array(items)));
        }
        _ => {
            if stack.len() < 2 {
                return Err(FnlError::semantic(
                    line,
                    format!("Not enough operands for '{}'", op.symbol()),
                ));
            }
            let b = pop(stack).resolve(env);
            let a = pop(stack).resolve(env);
            stack.push(Operand::Value(binary(op, &a, &b)));
        }
    }
    Ok(())
}

/// Apply an arithmetic or comparison operator to two resolved values.
pub fn binary(op: Operator, a: &Value, b: &Value) -> Value {
    let ordering = || a.loose_cmp(b);
    match op {
        Operator::Add => match (a, b) {
            (Value::Number(x), Value::Number(y)) => Value::Number(x + y),
            _ => Value::String(a.to_js_string() + &b.to_js_string()),
        },
        Operator::Sub => Value::Number(a.to_number() - b.to_number()),
        Operator::Mul => Value::Number(a.to_number() * b.to_number()),
        Operator::Div => Value::Number(a.to_number() / b.to_number()),
        Operator::Eq => Value::Bool(a.loose_eq(b)),
        Operator::Ne => Value::Bool(!a.loose_eq(b)),
        Operator::Lt => Value::Bool(ordering() == Some(Ordering::Less)),
        Operator::Gt => Value::Bool(ordering() == Some(Ordering::Greater)),
        Operator::Le => Value::Bool(matches!(ordering(), Some(Ordering::Less | Ordering::Equal))),
        Operator::Ge => Value::Bool(matches!(
            ordering(),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        Operator::Push | Operator::Pop | Operator::Slice | Operator::Splice => Value::Null,
    }
}

fn pop(stack: &mut Vec<Operand>) -> Operand {
    stack.pop().unwrap_or(Operand::Value(Value::Null))
}

fn target_array(target: Operand, op: Operator, env: &Environment, line: usize) -> Result<ArrayRef> {
    let Operand::Ref(name) = target else {
        return Err(FnlError::semantic(
            line,
            format!("{} target must be a var reference", op.symbol()),
        ));
    };
    match env.get(&name) {
        Some(Value::Array(items)) => Ok(Rc::clone(items)),
        _ => Err(FnlError::semantic(
            line,
            format!("Variable '{}' is not an array", name),
        )),
    }
}

/// Index argument of `slice`/`splice`: truncated toward zero, negative values
/// count from the end, and the result is clamped to `0..=len`.
fn relative_index(n: f64, len: usize) -> usize {
    let n = if n.is_nan() { 0.0 } else { n.trunc() };
    let len_f = len as f64;
    if n < 0.0 {
        (len_f + n).max(0.0) as usize
    } else {
        n.min(len_f) as usize
    }
}

fn clamp_count(n: f64, available: usize) -> usize {
    if n.is_nan() || n <= 0.0 {
        return 0;
    }
    n.trunc().min(available as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Item::{Literal, VarRef};

    fn op(symbol: &str) -> Item {
        Item::Operator(Operator::from_symbol(symbol).unwrap())
    }

    fn num(n: f64) -> Item {
        Literal(Value::Number(n))
    }

    fn expr(items: Vec<Item>) -> CompiledExpression {
        CompiledExpression { items }
    }

    fn numbers(ns: &[f64]) -> Value {
        Value::array(ns.iter().map(|n| Value::Number(*n)).collect())
    }

    #[test]
    fn arithmetic_and_comparison() {
        let env = Environment::new();
        let sum = expr(vec![num(1.0), num(2.0), op("+"), num(3.0), op("==")]);
        assert_eq!(evaluate(&sum, &env, 1).unwrap(), Value::Bool(true));

        let concat = expr(vec![Literal(Value::str("a")), num(1.0), op("+")]);
        assert_eq!(evaluate(&concat, &env, 1).unwrap(), Value::str("a1"));

        let coerced = expr(vec![Literal(Value::str("6")), num(2.0), op("/")]);
        assert_eq!(evaluate(&coerced, &env, 1).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn var_refs_resolve_for_binary_operators() {
        let mut env = Environment::new();
        env.set("x", Value::Number(5.0));
        let e = expr(vec![VarRef("x".into()), num(1.0), op("-")]);
        assert_eq!(evaluate(&e, &env, 1).unwrap(), Value::Number(4.0));

        let lone = expr(vec![VarRef("x".into())]);
        assert_eq!(evaluate(&lone, &env, 1).unwrap(), Value::Number(5.0));
    }

    #[test]
    fn push_mutates_the_binding() {
        let mut env = Environment::new();
        env.set("a", numbers(&[1.0, 2.0]));
        let e = expr(vec![VarRef("a".into()), num(3.0), op("push")]);
        let result = evaluate(&e, &env, 1).unwrap();
        assert_eq!(result, numbers(&[1.0, 2.0, 3.0]));
        assert_eq!(env.resolve("a"), numbers(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn pop_returns_last_element() {
        let mut env = Environment::new();
        env.set("a", numbers(&[1.0, 2.0]));
        let e = expr(vec![VarRef("a".into()), op("pop")]);
        assert_eq!(evaluate(&e, &env, 1).unwrap(), Value::Number(2.0));
        assert_eq!(env.resolve("a"), numbers(&[1.0]));

        env.set("empty", numbers(&[]));
        let e = expr(vec![VarRef("empty".into()), op("pop")]);
        assert_eq!(evaluate(&e, &env, 1).unwrap(), Value::Null);
    }

    #[test]
    fn slice_copies_without_mutating() {
        let mut env = Environment::new();
        env.set("a", numbers(&[1.0, 2.0, 3.0, 4.0]));
        let e = expr(vec![VarRef("a".into()), num(1.0), num(3.0), op("slice")]);
        assert_eq!(evaluate(&e, &env, 1).unwrap(), numbers(&[2.0, 3.0]));
        assert_eq!(env.resolve("a"), numbers(&[1.0, 2.0, 3.0, 4.0]));

        let negative = expr(vec![VarRef("a".into()), num(-2.0), num(10.0), op("slice")]);
        assert_eq!(evaluate(&negative, &env, 1).unwrap(), numbers(&[3.0, 4.0]));
    }

    #[test]
    fn splice_mutates_in_place() {
        let mut env = Environment::new();
        env.set("a", numbers(&[1.0, 2.0, 3.0, 4.0]));
        let e = expr(vec![VarRef("a".into()), num(1.0), num(2.0), op("splice")]);
        let result = evaluate(&e, &env, 1).unwrap();
        assert_eq!(result, numbers(&[1.0, 4.0]));
        assert_eq!(env.resolve("a"), numbers(&[1.0, 4.0]));
        match (result, env.resolve("a")) {
            (Value::Array(x), Value::Array(y)) => assert!(Rc::ptr_eq(&x, &y)),
            _ => panic!("expected arrays"),
        }
    }

    #[test]
    fn array_operators_need_an_array_binding() {
        let mut env = Environment::new();
        env.set("n", Value::Number(1.0));
        let e = expr(vec![VarRef("n".into()), num(1.0), op("push")]);
        assert_eq!(
            evaluate(&e, &env, 2).unwrap_err().to_string(),
            "Variable 'n' is not an array. Line: 2"
        );

        let e = expr(vec![num(1.0), num(1.0), op("push")]);
        assert_eq!(
            evaluate(&e, &env, 2).unwrap_err().to_string(),
            "push target must be a var reference. Line: 2"
        );
    }

    #[test]
    fn stack_depth_errors() {
        let env = Environment::new();
        let e = expr(vec![num(1.0), op("+")]);
        assert_eq!(
            evaluate(&e, &env, 1).unwrap_err().to_string(),
            "Not enough operands for '+'. Line: 1"
        );
        let e = expr(vec![num(1.0), num(2.0)]);
        assert!(evaluate(&e, &env, 1)
            .unwrap_err()
            .to_string()
            .starts_with("Invalid expression"));
    }

    #[test]
    fn relational_operators() {
        let a = Value::Number(1.0);
        let b = Value::Number(2.0);
        assert_eq!(binary(Operator::Lt, &a, &b), Value::Bool(true));
        assert_eq!(binary(Operator::Ge, &a, &b), Value::Bool(false));
        assert_eq!(binary(Operator::Le, &a, &a), Value::Bool(true));
        let nan = Value::str("x");
        assert_eq!(binary(Operator::Le, &nan, &a), Value::Bool(false));
        assert_eq!(binary(Operator::Gt, &nan, &a), Value::Bool(false));
    }
}
