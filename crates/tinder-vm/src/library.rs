//! The host callable interface: a host-provided function receives
//! `(env, positional_args...)` and returns a Value or raises one of
//! the signal kinds.
//!
//! The core treats libraries as entirely opaque; it neither resolves
//! names against a catalog on its own nor enforces permissions — the
//! host's `Library` impl owns both.

use tinder_core::{Crucible, Value};

use crate::signal::StepOutcome;

/// What a library callable produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The call completed; the value replaces the call-site expression.
    Value(Value),
    /// The call itself is a suspension point: any `call` into a host
    /// function may itself raise one of these. The
    /// enclosing instruction's `StepOutcome` becomes this signal
    /// verbatim; any partial expression around the call is discarded,
    /// since Tinder expressions have no resumable mid-evaluation
    /// state — the host re-enters at the next line, not mid-expression.
    Signal(StepOutcome),
}

/// A host-supplied catalog of callables, keyed by the flat dotted name
/// written in the script (`math.sqrt`, `login.attempt`, ...).
pub trait Library {
    fn call(&mut self, crucible: &mut Crucible, name: &str, args: Vec<Value>) -> CallOutcome;

    /// Whether `name` is safe for the compiler to fold at compile
    /// time: library functions are foldable only if the host marks
    /// them statically-safe. `tinder-vm`
    /// itself never consults this — it is read by the compiler, which
    /// does not have a running `Library` to ask, so a host wanting
    /// folding wires this catalog in at compile time via its own
    /// glue. Defaults to `false`: nothing folds unless a host opts in.
    fn is_pure(&self, name: &str) -> bool {
        let _ = name;
        false
    }
}

/// A `Library` with no callables, for scripts and tests that never
/// call out to the host.
#[derive(Debug, Default)]
pub struct EmptyLibrary;

impl Library for EmptyLibrary {
    fn call(&mut self, _crucible: &mut Crucible, name: &str, _args: Vec<Value>) -> CallOutcome {
        CallOutcome::Signal(StepOutcome::Fatal(crate::error::RuntimeError::UnknownCallable(name.to_string())))
    }
}
