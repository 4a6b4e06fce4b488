use thiserror::Error;

#[derive(Debug, Error)]
pub enum FnlError {
    #[error("{message}. Line: {line}")]
    Syntax { line: usize, message: String },
    #[error("{message}. Line: {line}")]
    Semantic { line: usize, message: String },
    #[error("Maximum recursion depth ({limit}) reached at line {line}")]
    RuntimeLimit { line: usize, limit: usize },
    #[error("{message}. Line: {line}")]
    External { line: usize, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FnlError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax { line, message: message.into() }
    }

    pub fn semantic(line: usize, message: impl Into<String>) -> Self {
        Self::Semantic { line, message: message.into() }
    }

    pub fn external(line: usize, message: impl Into<String>) -> Self {
        Self::External { line, message: message.into() }
    }

    /// Short category name, used by tracing output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "SyntaxError",
            Self::Semantic { .. } => "SemanticError",
            Self::RuntimeLimit { .. } => "RuntimeLimitError",
            Self::External { .. } => "ExternalError",
            Self::Io(_) => "IoError",
        }
    }
}

pub type Result<T> = std::result::Result<T, FnlError>;
