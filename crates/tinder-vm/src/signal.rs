//! The four control signals a Tinder script raises, plus the
//! per-`step` outcome: an explicit tagged variant a host matches on
//! instead of cross-function exception unwinding.

use tinder_core::Value;

use crate::error::RuntimeError;

/// Payload of an `import` instruction: library name, optional alias,
/// and an optional explicit symbol list (`from math import sqrt`
/// style vs. a bare `import math`).
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub library: String,
    pub alias: Option<String>,
    pub symbols: Option<Vec<String>>,
}

/// What happened during one `Interpreter::step` call.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Ran one instruction; the host should call `step`/`run` again
    /// without doing anything else first.
    Continue,
    /// The script hit `import`; host resolves `spec` and injects
    /// bindings into the Crucible before resuming.
    Imported(ImportSpec),
    /// The script hit `yield` or `input`; host may apply a resume
    /// carry to the Crucible before resuming.
    Yielded(Option<Value>),
    /// The script hit `stop`, or the program counter ran off the end
    /// of the line table. Terminal: the interpreter must not be
    /// stepped again.
    Halted,
    /// An uncaught runtime fatal. Terminal.
    Fatal(RuntimeError),
}

impl StepOutcome {
    /// `run` stops looping on anything but `Continue`.
    pub fn is_continue(&self) -> bool {
        matches!(self, StepOutcome::Continue)
    }
}
