use crate::ast::Statement;
use crate::error::{FnlError, Result};
use crate::lexer;

/// Commands whose trailing `{ ... }` is captured as one opaque body argument.
const BLOCK_COMMANDS: [&str; 4] = ["if", "loop", "while", "func"];

/// Parse source text into statements.
///
/// Statement lines are numbered by their position in the split, starting at 1.
pub fn parse(source: &str) -> Result<Vec<Statement>> {
    lexer::split_statements(source)
        .iter()
        .enumerate()
        .map(|(idx, text)| parse_statement(text, idx + 1))
        .collect()
}

fn parse_statement(text: &str, line: usize) -> Result<Statement> {
    let first_word = text.split_whitespace().next().unwrap_or_default();

    if BLOCK_COMMANDS.contains(&first_word) {
        if let (Some(open), Some(close)) = (text.find('{'), text.rfind('}')) {
            return Ok(parse_block(text, open, close, line));
        }
    }

    let mut words = lexer::split_words(text).into_iter();
    let command = words
        .next()
        .ok_or_else(|| FnlError::syntax(line, "Missing command"))?;

    Ok(Statement::new(command, words.collect(), line))
}

/// Decompose `cmd head... { body }` into
/// `[head..., "{", body, "}"]` arguments.
fn parse_block(text: &str, open: usize, close: usize, line: usize) -> Statement {
    let mut head = text[..open].split_whitespace().map(str::to_string);
    let command = head.next().unwrap_or_default();
    let mut args: Vec<String> = head.collect();

    // A `}` before the first `{` swaps the bounds rather than failing.
    let (from, to) = if open < close {
        (open + 1, close)
    } else {
        (close, open + 1)
    };
    args.push("{".to_string());
    args.push(text[from..to].trim().to_string());
    args.push("}".to_string());

    Statement::new(command, args, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn three_plain_statements() {
        let stmts = parse("a;b\nc").unwrap();
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[2], Statement::new("c", vec![], 3));
    }

    #[test]
    fn block_body_is_one_argument() {
        let stmts = parse("if 1 { a;b }").unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].command, "if");
        assert_eq!(stmts[0].args, strings(&["1", "{", "a;b", "}"]));
    }

    #[test]
    fn func_declaration_shape() {
        let stmts = parse("func add(a,b) { var r = ref:a + ref:b; log ref:r }; add(2,3)").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(
            stmts[0].args,
            strings(&["add(a,b)", "{", "var r = ref:a + ref:b; log ref:r", "}"])
        );
        assert_eq!(stmts[1], Statement::new("add(2,3)", vec![], 2));
    }

    #[test]
    fn record_literals_are_not_blocks() {
        let stmts = parse(r#"var r = {"a":1}"#).unwrap();
        assert_eq!(stmts[0].args, strings(&["r", "=", r#"{"a":1}"#]));
    }

    #[test]
    fn statement_without_command_is_a_syntax_error() {
        let err = parse("log 1; \"").unwrap_err();
        assert_eq!(err.to_string(), "Missing command. Line: 2");
    }
}
