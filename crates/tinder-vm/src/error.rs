//! Runtime fatals (`TinderBurn`) and the custom error classes a host
//! library can raise.
//!
//! A `RuntimeError` is what a failing instruction produces; `class()`
//! is the name a script's `catch` clause matches against. Built-in
//! fatals all share the `"TinderBurn"` class (`catch "TinderBurn" at
//! h`); a library raising its own named error is caught under that
//! name instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("type error: {0}")]
    TypeError(String),
    #[error("division by zero")]
    DivideByZero,
    #[error("variable '{0}' is not defined")]
    MissingVariable(String),
    #[error("value at call position is not callable")]
    NotCallable,
    #[error("unknown library callable '{0}'")]
    UnknownCallable(String),
    #[error("indirect target '{0}' did not resolve to a name")]
    BadIndirectTarget(String),
    #[error("jump target '{0}' is not a valid label or line")]
    BadJumpTarget(String),
    #[error("constant '{0}' cannot be reassigned")]
    ConstAssignment(String),
    #[error("variable '{0}' is host-protected")]
    Protected(String),
    #[error("constant '{0}' is already defined")]
    AlreadyDefined(String),
    #[error("return with an empty return stack")]
    EmptyReturnStack,
    #[error("instruction fuel exhausted")]
    FuelExhausted,
    #[error("return stack depth exceeded the host-supplied limit")]
    StackOverflow,
    #[error("{message}")]
    Library { class: String, message: String },
}

impl RuntimeError {
    /// The name a `catch "<class>" at label` clause matches against.
    /// Every built-in fatal reports the one blanket class
    /// (`TinderBurn`); only host libraries raise a class of their own
    /// choosing.
    pub fn class(&self) -> &str {
        match self {
            RuntimeError::Library { class, .. } => class,
            _ => "TinderBurn",
        }
    }
}
