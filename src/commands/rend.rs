/// `rend`: draw on the surface.
///
/// Arguments are comma separated: a shape, a fill color, then one expression
/// per coordinate. Only the `sqr` shape exists; other shapes draw nothing.
///
/// ```fnl
/// rend "sqr", "#ff0000", 10, 10, fnl:width / 2, 40
/// ```
use crate::ast::Statement;
use crate::commands::Command;
use crate::error::{FnlError, Result};
use crate::evaluator::{Evaluator, Flow};
use crate::lexer;

pub struct Rend;

impl Command for Rend {
    fn call(&self, evaluator: &mut Evaluator<'_>, stmt: &Statement) -> Result<Flow> {
        let joined = stmt.args.join(" ");
        let parts: Vec<&str> = joined.split(',').map(str::trim).collect();

        if unquote(parts[0]) != "sqr" {
            tracing::debug!(shape = parts[0], "unsupported shape");
            return Ok(Flow::Next);
        }
        if parts.len() < 6 {
            return Err(FnlError::semantic(stmt.line, "6 inputs expected"));
        }

        evaluator.host().surface.set_fill_color(unquote(parts[1]));

        let mut rect = [0.0; 4];
        for (slot, part) in rect.iter_mut().zip(&parts[2..6]) {
            *slot = evaluator
                .evaluate(&lexer::split_words(part), stmt.line)?
                .to_number();
        }
        let [x, y, w, h] = rect;
        evaluator.host().surface.fill_rect(x, y, w, h);
        Ok(Flow::Next)
    }
}

/// Drop one leading and one trailing quote character, single or double.
fn unquote(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

pub fn register(eval: &mut Evaluator<'_>) {
    eval.register("rend", Rend);
}

#[cfg(test)]
mod tests {
    use super::unquote;

    #[test]
    fn quotes_are_stripped_independently() {
        assert_eq!(unquote("\"sqr\""), "sqr");
        assert_eq!(unquote("'red'"), "red");
        assert_eq!(unquote("\"red"), "red");
        assert_eq!(unquote("#00ff00"), "#00ff00");
    }
}
