/// `func`: declare a function in the current environment.
///
/// ```fnl
/// func add(a, b) { var r = ref:a + ref:b; log ref:r }
/// add(2, 3)
/// ```
///
/// The body is split into statements once, here; every call reuses them.
/// A function declared inside another function's body only lives in that
/// call's environment.
use crate::ast::Statement;
use crate::commands::{block_body, Command};
use crate::environment::FunctionDef;
use crate::error::{FnlError, Result};
use crate::evaluator::{is_word_char, Evaluator, Flow};

pub struct Func;

impl Command for Func {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        if stmt.args.len() < 3 {
            return Err(FnlError::syntax(stmt.line, "Function name and body required"));
        }

        let open = stmt.block_open();
        let head = stmt.args[..open.unwrap_or(stmt.args.len())].join(" ");
        let (name, params) = parse_signature(&head)
            .ok_or_else(|| FnlError::syntax(stmt.line, "Invalid function declaration"))?;

        let body = match open {
            Some(open) => block_body(stmt, open)?,
            None => {
                return Err(FnlError::syntax(
                    stmt.line,
                    "Function body must be wrapped in { }",
                ))
            }
        };

        tracing::debug!(name, params = params.len(), statements = body.len(), "declare function");
        evaluator.env_mut().define_function(FunctionDef {
            name: name.to_string(),
            params,
            body,
        });
        Ok(Flow::Next)
    }
}

/// `name(p1, p2)` → name plus trimmed, non-empty parameter names.
fn parse_signature(head: &str) -> Option<(&str, Vec<String>)> {
    let paren = head.find('(')?;
    let name = &head[..paren];
    if name.is_empty() || !name.chars().all(is_word_char) {
        return None;
    }
    let params = head[paren + 1..].strip_suffix(')')?;
    let params = params
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    Some((name, params))
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("func", Func);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures() {
        assert_eq!(
            parse_signature("add(a,b)"),
            Some(("add", vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(
            parse_signature("add(a, b)"),
            Some(("add", vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(parse_signature("tick()"), Some(("tick", vec![])));
    }

    #[test]
    fn rejected_signatures() {
        assert_eq!(parse_signature("add"), None);
        assert_eq!(parse_signature("add(a"), None);
        assert_eq!(parse_signature("(a)"), None);
        assert_eq!(parse_signature("my-fn(a)"), None);
    }
}
