//! Error types for dockergen-dockerfile.

use thiserror::Error;

/// Malformed Dockerfile grammar: bad directives, dangling line
/// continuations, unterminated quotes or heredocs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line where the offending construct starts.
    pub line: usize,
    pub message: String,
}

/// A syntactically valid line that does not form a well-formed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct InstructionError {
    pub line: usize,
    /// Instruction keyword, upper-cased (`COPY`), or empty for file-level errors.
    pub instruction: String,
    pub message: String,
}

/// Either validation stage failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("failed to parse Dockerfile, {0}")]
    Parse(#[from] ParseError),

    #[error("failed to parse Dockerfile instructions, {0}")]
    Instruction(#[from] InstructionError),
}

impl ValidationError {
    /// Line the error points at.
    pub fn line(&self) -> usize {
        match self {
            ValidationError::Parse(e) => e.line,
            ValidationError::Instruction(e) => e.line,
        }
    }
}

pub(crate) fn parse_err(line: usize, message: impl Into<String>) -> ParseError {
    ParseError {
        line,
        message: message.into(),
    }
}
