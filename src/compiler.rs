//! Shunting-yard compilation of one expression into postfix items.
//!
//! Capability calls (`random`, `round`, `fnl:fetch`, …) are not operators:
//! they take the tokens right after them as one-token sub-expressions,
//! evaluate those immediately and leave a single literal in the output.

use crate::error::{FnlError, Result};
use crate::evaluator::Evaluator;
use crate::rpn;
use crate::value::{js_round, string_to_number, Value};

/// Prefixes that turn a name into a variable reference.
pub const REF_PREFIXES: [&str; 2] = ["ref:", "var:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Push,
    Pop,
    Slice,
    Splice,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "push" => Self::Push,
            "pop" => Self::Pop,
            "slice" => Self::Slice,
            "splice" => Self::Splice,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Push => "push",
            Self::Pop => "pop",
            Self::Slice => "slice",
            Self::Splice => "splice",
        }
    }

    /// Binding strength; every operator is left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Eq | Self::Ne | Self::Lt | Self::Gt | Self::Le | Self::Ge => 0,
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Push | Self::Pop | Self::Slice | Self::Splice => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Literal(Value),
    VarRef(String),
    Operator(Operator),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledExpression {
    pub items: Vec<Item>,
}

impl CompiledExpression {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Host queries that are resolved while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capability {
    Elapsed,
    Width,
    Height,
    StoreGet,
    Fetch,
    Random,
    Round,
}

impl Capability {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "fnl:performance" => Self::Elapsed,
            "fnl:width" => Self::Width,
            "fnl:height" | "fnl.height" => Self::Height,
            "fnl:idbGet" => Self::StoreGet,
            "fnl:fetch" => Self::Fetch,
            "random" => Self::Random,
            "round" => Self::Round,
            _ => return None,
        })
    }

    fn arity(self) -> usize {
        match self {
            Self::Elapsed | Self::Width | Self::Height => 0,
            Self::StoreGet | Self::Fetch | Self::Round => 1,
            Self::Random => 2,
        }
    }
}

enum Pending {
    Op(Operator),
    LParen,
}

pub fn compile(
    evaluator: &mut Evaluator<'_>,
    tokens: &[String],
    line: usize,
) -> Result<CompiledExpression> {
    let mut output = Vec::new();
    let mut ops: Vec<Pending> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_str();
        i += 1;

        let number = string_to_number(token);

        if !number.is_nan() {
            output.push(Item::Literal(Value::Number(number)));
        } else if token.starts_with('"') && token.ends_with('"') {
            let inner = token.get(1..token.len().saturating_sub(1)).unwrap_or_default();
            output.push(Item::Literal(Value::str(inner)));
        } else if let Some(cap) = Capability::from_token(token) {
            let args = tokens
                .get(i..i + cap.arity())
                .ok_or_else(|| FnlError::syntax(line, format!("Missing argument for '{token}'")))?;
            i += cap.arity();
            let value = resolve_capability(evaluator, cap, args, line)?;
            output.push(Item::Literal(value));
        } else if let Some(name) = REF_PREFIXES.iter().find_map(|p| token.strip_prefix(p)) {
            output.push(Item::VarRef(name.to_string()));
        } else if let Some(op) = Operator::from_symbol(token) {
            while let Some(Pending::Op(top)) = ops.last() {
                if top.precedence() < op.precedence() {
                    break;
                }
                output.push(Item::Operator(*top));
                ops.pop();
            }
            ops.push(Pending::Op(op));
        } else if token == "(" {
            ops.push(Pending::LParen);
        } else if token == ")" {
            loop {
                match ops.pop() {
                    Some(Pending::Op(op)) => output.push(Item::Operator(op)),
                    Some(Pending::LParen) => break,
                    None => return Err(FnlError::syntax(line, "Mismatched parentheses")),
                }
            }
        } else if (token.starts_with('{') && token.ends_with('}'))
            || (token.starts_with('[') && token.ends_with(']'))
        {
            let json: serde_json::Value = serde_json::from_str(token)
                .map_err(|_| FnlError::syntax(line, format!("Invalid JSON literal '{token}'")))?;
            output.push(Item::Literal(Value::from_json(&json)));
        } else if token == "true" {
            output.push(Item::Literal(Value::Bool(true)));
        } else if token == "false" {
            output.push(Item::Literal(Value::Bool(false)));
        } else if token == "null" {
            output.push(Item::Literal(Value::Null));
        } else if evaluator.env().contains(token) {
            output.push(Item::VarRef(token.to_string()));
        } else {
            return Err(FnlError::syntax(line, format!("Unknown token '{token}'")));
        }
    }

    while let Some(pending) = ops.pop() {
        match pending {
            Pending::Op(op) => output.push(Item::Operator(op)),
            Pending::LParen => return Err(FnlError::syntax(line, "Mismatched parentheses")),
        }
    }

    Ok(CompiledExpression { items: output })
}

fn resolve_capability(
    evaluator: &mut Evaluator<'_>,
    cap: Capability,
    args: &[String],
    line: usize,
) -> Result<Value> {
    tracing::trace!(?cap, line, "capability");
    match cap {
        Capability::Elapsed => Ok(Value::Number(evaluator.elapsed())),
        Capability::Width => Ok(Value::Number(evaluator.host().surface.width())),
        Capability::Height => Ok(Value::Number(evaluator.host().surface.height())),
        Capability::StoreGet => {
            let key = evaluator.evaluate(&args[..1], line)?.to_js_string();
            evaluator
                .host()
                .store
                .get(&key)
                .map(|found| found.unwrap_or(Value::Null))
                .map_err(|e| FnlError::external(line, format!("Failed to load '{key}': {e}")))
        }
        Capability::Fetch => {
            let mut url = evaluator.evaluate(&args[..1], line)?.to_js_string();
            if url.len() >= 2 && url.starts_with('"') && url.ends_with('"') {
                url = url[1..url.len() - 1].to_string();
            }
            match evaluator.host().network.request(&url) {
                Ok(response) => Ok(response.into_value()),
                Err(e) => {
                    tracing::debug!(url, error = %e, "fetch failed");
                    Err(FnlError::external(line, format!("Failed to fetch '{url}'")))
                }
            }
        }
        Capability::Random => {
            let min = evaluator.evaluate(&args[..1], line)?;
            let max = evaluator.evaluate(&args[1..2], line)?;
            let span = max.to_number() - min.to_number() + 1.0;
            let scaled = Value::Number(evaluator.host().random.draw() * span);
            Ok(rpn::binary(Operator::Add, &scaled, &min))
        }
        Capability::Round => {
            let n = evaluator.evaluate(&args[..1], line)?;
            Ok(Value::Number(js_round(n.to_number())))
        }
    }
}
