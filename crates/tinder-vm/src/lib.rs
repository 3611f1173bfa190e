//! Instruction interpreter and expression evaluator for compiled Tinder
//! scripts.
//!
//! `Interpreter` executes a `CompiledScript` one instruction at a time
//! against a host-owned `Crucible`, suspending at the four signal kinds
//! a Tinder script can raise (`Imported`, `Yielded`, `Halted`,
//! `Fatal`). See `interpreter::Interpreter::step`/`run` for the
//! execution-loop contract and `signal::StepOutcome` for what a host
//! sees at each suspension.

mod error;
mod eval;
mod fuel;
mod interpreter;
mod library;
mod signal;
mod trace;

pub use error::RuntimeError;
pub use fuel::FuelLimits;
pub use interpreter::Interpreter;
pub use library::{CallOutcome, EmptyLibrary, Library};
pub use signal::{ImportSpec, StepOutcome};
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
