//! Step-by-step execution tracing.
//!
//! # Design: Zero-Cost Abstraction
//!
//! `NoopTracer`'s methods are `#[inline(always)]` empty bodies, so a
//! host that never asks for a trace pays nothing for the `Tracer`
//! calls threaded through `Interpreter::step` — the compiler elides
//! them along with their arguments.
//!
//! # Design: Tracer-Owned State
//!
//! Anything a trace needs beyond what the interpreter already tracks
//! (e.g. a running line count for the default verbosity's summary)
//! lives in the tracer, not in `Interpreter`, so the hot loop carries
//! no tracing-only fields.

use tinder_bytecode::{Instruction, Label};
use tinder_core::Interner;

use crate::signal::StepOutcome;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Instruction kind and line only.
    #[default]
    Default,
    /// Adds jump/call/return targets and catch installs.
    Verbose,
    /// Adds label-hit and signal detail.
    VeryVerbose,
}

/// Instrumentation hook for `Interpreter::step`. Every method is
/// called at a specific point during one step:
/// - `trace_instruction` — before evaluating the line's condition.
/// - `trace_condition` — after the condition (if any) is evaluated.
/// - `trace_jump` / `trace_call` / `trace_return` — on control transfer.
/// - `trace_label_hit` — when a `LabelHit` marker redirects the PC.
/// - `trace_catch_installed` — when a `Catch` instruction runs.
/// - `trace_interrupt` — when a fatal is caught by the interrupt table.
/// - `trace_signal` — after the step produces a non-`Continue` outcome.
pub trait Tracer {
    fn trace_instruction(&mut self, pc: u32, instruction: &Instruction);
    fn trace_condition(&mut self, taken: bool);
    fn trace_jump(&mut self, from: u32, to: u32);
    fn trace_call(&mut self, return_to: u32, depth: usize);
    fn trace_return(&mut self, to: u32, depth: usize);
    fn trace_label_hit(&mut self, label: Label, redirected: bool);
    fn trace_catch_installed(&mut self, error_class: &str, target: Label);
    fn trace_interrupt(&mut self, error_class: &str, target: Label);
    fn trace_signal(&mut self, outcome: &StepOutcome);
}

/// The tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_instruction(&mut self, _pc: u32, _instruction: &Instruction) {}
    #[inline(always)]
    fn trace_condition(&mut self, _taken: bool) {}
    #[inline(always)]
    fn trace_jump(&mut self, _from: u32, _to: u32) {}
    #[inline(always)]
    fn trace_call(&mut self, _return_to: u32, _depth: usize) {}
    #[inline(always)]
    fn trace_return(&mut self, _to: u32, _depth: usize) {}
    #[inline(always)]
    fn trace_label_hit(&mut self, _label: Label, _redirected: bool) {}
    #[inline(always)]
    fn trace_catch_installed(&mut self, _error_class: &str, _target: Label) {}
    #[inline(always)]
    fn trace_interrupt(&mut self, _error_class: &str, _target: Label) {}
    #[inline(always)]
    fn trace_signal(&mut self, _outcome: &StepOutcome) {}
}

/// Tracer that collects a human-readable execution trace.
pub struct PrintTracer<'s> {
    interner: &'s Interner,
    verbosity: Verbosity,
    lines: Vec<String>,
}

impl<'s> PrintTracer<'s> {
    pub fn new(interner: &'s Interner, verbosity: Verbosity) -> Self {
        Self { interner, verbosity, lines: Vec::new() }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn print(&self) {
        for line in &self.lines {
            println!("{line}");
        }
    }

    fn instruction_kind(instruction: &Instruction) -> &'static str {
        match instruction {
            Instruction::Write(_) => "write",
            Instruction::Call(..) => "call",
            Instruction::Set(..) | Instruction::SetMulti { .. } => "set",
            Instruction::Const(..) => "const",
            Instruction::Inc(_) => "inc",
            Instruction::Dec(_) => "dec",
            Instruction::Put(..) => "put",
            Instruction::Swap(..) => "swap",
            Instruction::Input(_) => "input",
            Instruction::Yield(_) => "yield",
            Instruction::Stop => "stop",
            Instruction::Jump(_) => "jump",
            Instruction::Return => "return",
            Instruction::Import(_) => "import",
            Instruction::Catch { .. } => "catch",
            Instruction::LabelHit(..) => "label",
        }
    }
}

impl Tracer for PrintTracer<'_> {
    fn trace_instruction(&mut self, pc: u32, instruction: &Instruction) {
        self.lines.push(format!("{:04} {}", pc, Self::instruction_kind(instruction)));
    }

    fn trace_condition(&mut self, taken: bool) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.lines.push(format!("  condition: {taken}"));
    }

    fn trace_jump(&mut self, from: u32, to: u32) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.lines.push(format!("  jump {from} -> {to}"));
    }

    fn trace_call(&mut self, return_to: u32, depth: usize) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.lines.push(format!("  call, return address {return_to} (depth {depth})"));
    }

    fn trace_return(&mut self, to: u32, depth: usize) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.lines.push(format!("  return -> {to} (depth {depth})"));
    }

    fn trace_label_hit(&mut self, label: Label, redirected: bool) {
        if self.verbosity != Verbosity::VeryVerbose {
            return;
        }
        self.lines.push(format!("  label {:?} redirected={redirected}", label));
    }

    fn trace_catch_installed(&mut self, error_class: &str, target: Label) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.lines.push(format!("  catch \"{error_class}\" -> {:?}", target));
    }

    fn trace_interrupt(&mut self, error_class: &str, target: Label) {
        self.lines.push(format!("  caught \"{error_class}\", jumping to {:?}", target));
    }

    fn trace_signal(&mut self, outcome: &StepOutcome) {
        if self.verbosity == Verbosity::VeryVerbose {
            self.lines.push(format!("  signal: {outcome:?}"));
        }
    }
}

impl PrintTracer<'_> {
    /// Resolves a symbol to its source name; only used by callers that
    /// already hold a `Symbol`, kept here rather than on `Tracer` so
    /// the trait stays symbol-agnostic for hosts with no interner.
    pub fn resolve(&self, sym: tinder_core::Symbol) -> &str {
        self.interner.resolve(sym)
    }
}
