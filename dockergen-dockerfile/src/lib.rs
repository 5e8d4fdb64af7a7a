//! # dockergen-dockerfile
//!
//! Syntax and instruction-level validation of Dockerfile text.
//!
//! [`validate`] runs two stages and stops at the first error:
//!
//! 1. [`syntax::parse`]: directives, comments, continuations, heredocs,
//!    flags and argument splitting. Fails with [`ParseError`].
//! 2. [`instructions::resolve`]: typed instructions grouped into stages.
//!    Fails with [`InstructionError`].
//!
//! Nothing is built or pulled, and `$VAR` references are not expanded.

pub mod error;
pub mod instructions;
pub mod syntax;

pub use error::{InstructionError, ParseError, ValidationError};
pub use instructions::{
    Command, CopyInstruction, Dockerfile, Healthcheck, HealthcheckConfig, Instruction, KeyValue,
    RunInstruction, Stage, StageRef,
};
pub use syntax::{Directives, SyntaxTree};

/// Check that `text` is a well-formed Dockerfile.
pub fn validate(text: &str) -> Result<Dockerfile, ValidationError> {
    let tree = syntax::parse(text)?;
    let dockerfile = instructions::resolve(&tree)?;
    Ok(dockerfile)
}

/// [`validate`] for raw bytes; invalid UTF-8 is replaced, not rejected.
pub fn validate_bytes(bytes: &[u8]) -> Result<Dockerfile, ValidationError> {
    validate(&String::from_utf8_lossy(bytes))
}
