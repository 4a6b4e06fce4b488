use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Statement;
use crate::value::Value;

/// Prefix under which functions are reachable from a `ref:` expression.
pub const FUNCTION_PREFIX: &str = "func:";

/// A user-defined function: parameter names plus its already-split body.
#[derive(Debug)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
}

/// The binding table threaded through interpretation.
///
/// Cloning an `Environment` produces a call frame: every binding is copied,
/// but arrays and records are copied as handles, so the callee and the caller
/// keep sharing the same containers.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: HashMap<String, Value>,
    functions: HashMap<String, Rc<FunctionDef>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Value of a variable reference. Unbound names read as `null`;
    /// `func:NAME` reads the function itself.
    pub fn resolve(&self, name: &str) -> Value {
        if let Some(value) = self.variables.get(name) {
            return value.clone();
        }
        name.strip_prefix(FUNCTION_PREFIX)
            .and_then(|f| self.functions.get(f))
            .map_or(Value::Null, |def| Value::Function(Rc::clone(def)))
    }

    pub fn define_function(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.clone(), Rc::new(def));
    }

    pub fn function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.functions.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_share_arrays_but_not_bindings() {
        let mut outer = Environment::new();
        outer.set("a", Value::array(vec![Value::Number(1.0)]));
        outer.set("n", Value::Number(1.0));

        let mut frame = outer.clone();
        if let Some(Value::Array(items)) = frame.get("a") {
            items.borrow_mut().push(Value::Number(2.0));
        }
        frame.set("n", Value::Number(99.0));

        assert_eq!(
            outer.resolve("a"),
            Value::array(vec![Value::Number(1.0), Value::Number(2.0)])
        );
        assert_eq!(outer.resolve("n"), Value::Number(1.0));
    }

    #[test]
    fn functions_resolve_through_prefix() {
        let mut env = Environment::new();
        env.define_function(FunctionDef {
            name: "add".into(),
            params: vec!["a".into(), "b".into()],
            body: Vec::new(),
        });
        assert!(matches!(env.resolve("func:add"), Value::Function(_)));
        assert_eq!(env.resolve("func:missing"), Value::Null);
        assert_eq!(env.resolve("nothing"), Value::Null);
    }
}
