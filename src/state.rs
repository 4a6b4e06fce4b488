use crate::error::{FnlError, Result};
use crate::value::{js_round, parse_float_prefix};

/// Ceiling on simultaneously active block and function entries.
pub const MAX_DEPTH: usize = 5000;

/// Payload recorded when a run halts because of an error.
pub const ERROR_EXIT: &str = "1";

/// Halt signal plus the shared depth counter.
///
/// The halt payload is kept as the raw text it was given (`exit abc` records
/// `abc`) and only converted to a number when the run reports its exit code.
#[derive(Debug)]
pub struct ExecutionState {
    halt: Option<String>,
    depth: usize,
    max_depth: usize,
}

impl ExecutionState {
    pub fn new(max_depth: usize) -> Self {
        Self {
            halt: None,
            depth: 0,
            max_depth,
        }
    }

    pub fn reset(&mut self) {
        self.halt = None;
        self.depth = 0;
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    pub fn halt(&mut self, payload: impl Into<String>) {
        self.halt = Some(payload.into());
    }

    pub fn halt_payload(&self) -> Option<&str> {
        self.halt.as_deref()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Count one more active block. Past the ceiling this fails and the
    /// increment is left in place; the run halts anyway.
    pub fn enter(&mut self, line: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FnlError::RuntimeLimit {
                line,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Install a new depth counter value, returning the previous one.
    pub fn swap_depth(&mut self, depth: usize) -> usize {
        std::mem::replace(&mut self.depth, depth)
    }

    /// Exit code of the run: the halt payload rounded to an integer, or 0
    /// when the run finished normally or the payload is not numeric.
    pub fn exit_code(&self) -> i32 {
        let Some(payload) = &self.halt else {
            return 0;
        };
        let code = js_round(parse_float_prefix(payload));
        if code.is_nan() {
            0
        } else {
            code.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
        }
    }
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self::new(MAX_DEPTH)
    }
}
