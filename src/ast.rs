/// A single FNL statement, parsed from one logical line or one block command.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The command keyword (`var`, `if`, `log`, a function name, …).
    pub command: String,
    /// Raw argument tokens. Block commands carry `"{"`, the unsplit body text
    /// and `"}"` as their last three arguments.
    pub args: Vec<String>,
    /// 1-based index of the statement within the text it was split from.
    pub line: usize,
}

impl Statement {
    pub fn new(command: impl Into<String>, args: Vec<String>, line: usize) -> Self {
        Self {
            command: command.into(),
            args,
            line,
        }
    }

    /// Position of the first `{` marker among the arguments.
    pub fn block_open(&self) -> Option<usize> {
        self.args.iter().position(|a| a == "{")
    }

    /// Body text of a block command whose `{` marker sits at `open`.
    ///
    /// Returns `None` unless a `}` marker follows the body slot.
    pub fn block_body(&self, open: usize) -> Option<&str> {
        let close = self.args.iter().rposition(|a| a == "}")?;
        if close <= open {
            return None;
        }
        self.args.get(open + 1).map(String::as_str)
    }
}
