//! Error types surfaced by the Firestarter pipeline.
//!
//! Each variant carries the offending source line so the one-line
//! `Display` rendering (`line N: ...`) the host prints is never more
//! than a `grep` away from the cause; this crate deliberately does not
//! pull in a snippet-rendering crate for that.

use thiserror::Error;

use crate::lexer::LexError;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Unexpected { line: u32, message: String },
    #[error("line {line}: unterminated block, expected {expected}")]
    UnterminatedBlock { line: u32, expected: &'static str },
    #[error("{0}")]
    Lex(String),
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("line {line}: label {name:?} is jumped to but never defined")]
    UndefinedLabel { name: String, line: u32 },
    #[error("label {0:?} is defined more than once")]
    DuplicateLabel(String),
    #[error("line {line}: break outside of a loop")]
    BreakOutsideLoop { line: u32 },
    #[error("line {line}: continue outside of a loop")]
    ContinueOutsideLoop { line: u32 },
}
