use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Statement;
use crate::commands::{self, Command};
use crate::compiler;
use crate::config::RunConfig;
use crate::environment::{Environment, FunctionDef, FUNCTION_PREFIX};
use crate::error::{FnlError, Result};
use crate::host::Host;
use crate::lexer;
use crate::parser;
use crate::rpn;
use crate::stack::ensure_sufficient_stack;
use crate::state::{ExecutionState, ERROR_EXIT};
use crate::value::Value;

/// What a statement asks of the body that is running it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    Break,
}

/// The interpreter context: current environment, halt/depth state, the
/// command registry and the host capabilities.
pub struct Evaluator<'h> {
    env: Environment,
    state: ExecutionState,
    commands: HashMap<String, Rc<dyn Command>>,
    host: &'h mut Host,
    started_at: f64,
}

impl<'h> Evaluator<'h> {
    pub fn new(host: &'h mut Host, config: &RunConfig) -> Self {
        let started_at = host.clock.now();
        let mut evaluator = Self {
            env: Environment::new(),
            state: ExecutionState::new(config.max_depth),
            commands: HashMap::new(),
            host,
            started_at,
        };
        commands::register_all(&mut evaluator);
        evaluator
    }

    // -----------------------------------------------------------------------
    // Command registry
    // -----------------------------------------------------------------------

    pub fn register<C: Command + 'static>(&mut self, name: &str, command: C) {
        self.commands.insert(name.to_string(), Rc::new(command));
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ExecutionState {
        &mut self.state
    }

    pub fn host(&mut self) -> &mut Host {
        &mut *self.host
    }

    /// Milliseconds since this evaluator was created.
    pub fn elapsed(&self) -> f64 {
        self.host.clock.now() - self.started_at
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Run source text as a top-level program. `break` is ignored here.
    pub fn run_program(&mut self, source: &str) {
        let stmts = match parser::parse(source) {
            Ok(stmts) => stmts,
            Err(e) => return self.fail(e),
        };
        for stmt in &stmts {
            if self.state.is_halted() {
                break;
            }
            if let Err(e) = self.execute_statement(stmt) {
                self.fail(e);
            }
        }
    }

    /// Run `source` as a nested program over the current environment with a
    /// depth counter of its own, starting from zero.
    pub fn run_nested(&mut self, source: &str) {
        let outer_depth = self.state.swap_depth(0);
        tracing::debug!(outer_depth, "nested program");
        self.run_program(source);
        self.state.swap_depth(outer_depth);
    }

    /// Run a block or function body. Stops after a `break` (reported as
    /// [`Flow::Break`]), after an error (which halts the run) or once the run
    /// has halted.
    pub fn run_body(&mut self, body: &[Statement]) -> Flow {
        ensure_sufficient_stack(|| {
            for stmt in body {
                if self.state.is_halted() {
                    break;
                }
                match self.execute_statement(stmt) {
                    Ok(Flow::Next) => {}
                    Ok(Flow::Break) => return Flow::Break,
                    Err(e) => {
                        self.fail(e);
                        break;
                    }
                }
            }
            Flow::Next
        })
    }

    pub fn execute_statement(&mut self, stmt: &Statement) -> Result<Flow> {
        tracing::trace!(command = %stmt.command, line = stmt.line, "statement");
        if let Some(command) = self.commands.get(&stmt.command).cloned() {
            return command.call(self, stmt);
        }
        self.call_function(stmt)
    }

    /// Compile and evaluate one expression. No tokens evaluates to `null`.
    pub fn evaluate(&mut self, tokens: &[String], line: usize) -> Result<Value> {
        let compiled = compiler::compile(self, tokens, line)?;
        if compiled.is_empty() {
            return Ok(Value::Null);
        }
        rpn::evaluate(&compiled, &self.env, line)
    }

    /// Run `f` as one more active block. The depth counter is restored
    /// whatever `f` returns; only crossing the ceiling fails.
    pub fn with_depth<R>(&mut self, line: usize, f: impl FnOnce(&mut Self) -> R) -> Result<R> {
        self.state.enter(line)?;
        tracing::trace!(depth = self.state.depth(), line, "enter block");
        let result = f(self);
        self.state.leave();
        Ok(result)
    }

    /// Report an error and halt the run with the error exit code.
    pub fn fail(&mut self, error: FnlError) {
        tracing::warn!(kind = error.kind(), "{}", error);
        self.host.output.write_error(&error.to_string());
        self.state.halt(ERROR_EXIT);
    }

    // -----------------------------------------------------------------------
    // User-defined functions
    // -----------------------------------------------------------------------

    #[tracing::instrument(level = "debug", skip_all, fields(call = %stmt.command, line = stmt.line))]
    fn call_function(&mut self, stmt: &Statement) -> Result<Flow> {
        let unknown = || FnlError::semantic(stmt.line, format!("Unknown command '{}'", stmt.command));

        let call = FunctionCall::parse(stmt).ok_or_else(unknown)?;
        let def = self.env.function(call.name).ok_or_else(unknown)?;

        self.with_depth(stmt.line, |ev| ev.invoke(&def, &call.args, stmt.line))??;
        Ok(Flow::Next)
    }

    /// Bind arguments into a copy of the current environment and run the
    /// body there. The caller's environment is restored afterwards; arrays
    /// and records reached through the copy are the caller's own.
    fn invoke(&mut self, def: &FunctionDef, args: &[Vec<String>], line: usize) -> Result<()> {
        let mut frame = self.env.clone();
        for (i, param) in def.params.iter().enumerate() {
            let value = match args.get(i) {
                Some(expr) => self.evaluate(expr, line)?,
                None => Value::Null,
            };
            frame.set(param.clone(), value);
        }

        let caller = std::mem::replace(&mut self.env, frame);
        self.run_body(&def.body);
        self.env = caller;
        Ok(())
    }
}

/// A call site: function name plus one token list per argument expression.
#[derive(Debug, PartialEq)]
struct FunctionCall<'s> {
    name: &'s str,
    args: Vec<Vec<String>>,
}

impl<'s> FunctionCall<'s> {
    /// Accepts `name(a, b + 1)`, `name a b` and the `func:name` spelling of
    /// either.
    fn parse(stmt: &'s Statement) -> Option<Self> {
        let command = stmt.command.as_str();
        let command = command.strip_prefix(FUNCTION_PREFIX).unwrap_or(command);

        let Some(paren) = command.find('(') else {
            return Some(Self {
                name: command,
                args: stmt.args.iter().map(|a| vec![a.clone()]).collect(),
            });
        };

        let name = &command[..paren];
        if name.is_empty() || !name.chars().all(is_word_char) {
            return None;
        }

        let mut text = command[paren + 1..].to_string();
        for arg in &stmt.args {
            text.push(' ');
            text.push_str(arg);
        }
        let inner = text.trim_end().strip_suffix(')')?;

        let args = if inner.trim().is_empty() {
            Vec::new()
        } else {
            split_arguments(inner)
                .into_iter()
                .map(lexer::split_words)
                .collect()
        };
        Some(Self { name, args })
    }
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split an argument list on commas that are not inside quotes or brackets.
fn split_arguments(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '(' | '[' | '{' if !quoted => depth += 1,
            ')' | ']' | '}' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(command: &str, args: &[&str]) -> Statement {
        Statement::new(command, args.iter().map(|s| s.to_string()).collect(), 1)
    }

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parenthesised_call() {
        let stmt = call("add(2,3)", &[]);
        let parsed = FunctionCall::parse(&stmt).unwrap();
        assert_eq!(parsed.name, "add");
        assert_eq!(parsed.args, vec![tokens(&["2"]), tokens(&["3"])]);
    }

    #[test]
    fn parenthesised_call_with_spaces_and_expressions() {
        let stmt = call("add(1", &["+", "1,", r#""a, b")"#]);
        let parsed = FunctionCall::parse(&stmt).unwrap();
        assert_eq!(parsed.args, vec![tokens(&["1", "+", "1"]), tokens(&[r#""a, b""#])]);
    }

    #[test]
    fn spaced_and_prefixed_calls() {
        let stmt = call("func:greet", &["\"bob\"", "ref:n"]);
        let parsed = FunctionCall::parse(&stmt).unwrap();
        assert_eq!(parsed.name, "greet");
        assert_eq!(parsed.args, vec![tokens(&["\"bob\""]), tokens(&["ref:n"])]);

        let stmt = call("noop()", &[]);
        assert_eq!(FunctionCall::parse(&stmt).unwrap().args, Vec::<Vec<String>>::new());
    }

    #[test]
    fn malformed_calls() {
        assert_eq!(FunctionCall::parse(&call("add(1,2", &[])), None);
        assert_eq!(FunctionCall::parse(&call("a-b(1)", &[])), None);
    }
}
