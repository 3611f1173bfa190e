//! The instruction interpreter: program counter, return stack, and the
//! per-instruction execution contract.
//!
//! An `Interpreter` borrows its `CompiledScript` for its whole
//! lifetime and owns nothing else long-lived but its own run state
//! (PC, return stack, the live interrupt table, fuel spent so far). The
//! Crucible and the host `Library` are borrowed fresh on every
//! `step`/`run` call, so a host can suspend between calls for as long
//! as it likes without this type holding anything open.

use tinder_bytecode::instruction::{Instruction, JumpTarget, PutPosition, SetRhs};
use tinder_bytecode::{CompiledScript, InterruptTable, Label};
use tinder_core::crucible::{is_dunder, CrucibleError};
use tinder_core::{Crucible, Symbol, Value};

use crate::error::RuntimeError;
use crate::eval::{coerce_string, eval_expr, invoke};
use crate::fuel::FuelLimits;
use crate::library::Library;
use crate::signal::{ImportSpec, StepOutcome};
use crate::trace::{NoopTracer, Tracer};

/// Whether an instruction left the program counter alone (the common
/// case, advance by one) or set it directly (`Jump`/`Return`/a
/// redirecting `LabelHit`).
enum Flow {
    Advance,
    Jumped(u32),
}

pub struct Interpreter<'s> {
    script: &'s CompiledScript,
    pc: u32,
    return_stack: Vec<u32>,
    interrupts: InterruptTable,
    limits: FuelLimits,
    fuel_used: u64,
    /// Set by `Input` until the host calls `resume` with a value;
    /// `Input` itself carries no payload in `StepOutcome::Yielded`, so
    /// the target symbol has to live here across the suspend.
    pending_input: Option<Symbol>,
    /// True for exactly the one `step` immediately following a
    /// `Jump`/`Return`/redirected `LabelHit` — lets a `LabelHit`
    /// distinguish "reached by explicit jump" (no-op) from "reached by
    /// fallthrough" (apply its redirect).
    arrived_by_jump: bool,
}

impl<'s> Interpreter<'s> {
    pub fn new(script: &'s CompiledScript, limits: FuelLimits) -> Self {
        Self {
            script,
            pc: 0,
            return_stack: Vec::new(),
            interrupts: InterruptTable::new(),
            limits,
            fuel_used: 0,
            pending_input: None,
            arrived_by_jump: false,
        }
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn return_depth(&self) -> usize {
        self.return_stack.len()
    }

    pub fn fuel_used(&self) -> u64 {
        self.fuel_used
    }

    /// Applies a host-supplied resume value between suspensions. Only
    /// `Input`'s resume target is consumed here; a `Yielded` or
    /// `Imported` raised by anything else carries its own payload and
    /// needs no help from this method (the host applies `Imported`
    /// bindings straight into the Crucible it already owns).
    pub fn resume(&mut self, crucible: &mut Crucible, carry: Option<Value>) {
        if let Some(sym) = self.pending_input.take() {
            if let Some(value) = carry {
                let name = self.script.interner.resolve(sym).to_string();
                let _ = write_var(crucible, &name, value);
            }
        }
    }

    pub fn run(&mut self, crucible: &mut Crucible, library: &mut dyn Library) -> StepOutcome {
        self.run_with(crucible, library, &mut NoopTracer)
    }

    pub fn run_with<T: Tracer>(&mut self, crucible: &mut Crucible, library: &mut dyn Library, tracer: &mut T) -> StepOutcome {
        loop {
            let outcome = self.step_with(crucible, library, tracer);
            if !outcome.is_continue() {
                return outcome;
            }
        }
    }

    pub fn step(&mut self, crucible: &mut Crucible, library: &mut dyn Library) -> StepOutcome {
        self.step_with(crucible, library, &mut NoopTracer)
    }

    pub fn step_with<T: Tracer>(&mut self, crucible: &mut Crucible, library: &mut dyn Library, tracer: &mut T) -> StepOutcome {
        if self.fuel_used >= self.limits.instruction_fuel {
            return StepOutcome::Fatal(RuntimeError::FuelExhausted);
        }
        if self.pc as usize >= self.script.lines.len() {
            return StepOutcome::Halted;
        }
        self.fuel_used += 1;

        let idx = self.pc as usize;
        let line = &self.script.lines[idx];
        crucible.set_dunder("__LINE__", Value::Number(self.script.source_map[idx] as f64));
        crucible.set_dunder("__JUMPED__", Value::Boolean(false));
        tracer.trace_instruction(self.pc, &line.instruction);

        let arrived_by_jump = std::mem::take(&mut self.arrived_by_jump);

        if let Some(cond) = &line.condition {
            match eval_expr(cond, crucible, self.script, library) {
                Ok(value) => {
                    let taken = value.is_truthy();
                    tracer.trace_condition(taken);
                    crucible.set_dunder("__CONDITION__", Value::Boolean(taken));
                    if !taken {
                        self.pc += 1;
                        return StepOutcome::Continue;
                    }
                }
                Err(outcome) => return self.settle(outcome, tracer),
            }
        } else {
            crucible.set_dunder("__CONDITION__", Value::Boolean(true));
        }

        match self.exec(&line.instruction, arrived_by_jump, crucible, library, tracer) {
            Ok(Flow::Advance) => {
                self.pc += 1;
                StepOutcome::Continue
            }
            Ok(Flow::Jumped(to)) => {
                self.pc = to;
                StepOutcome::Continue
            }
            Err(outcome) => {
                // `Yielded`/`Imported` are resumable: the
                // host re-enters at the next PC, not the suspending
                // instruction itself. `Halted`/`Fatal` are terminal, so
                // leaving PC where it sits is harmless either way.
                if matches!(outcome, StepOutcome::Yielded(_) | StepOutcome::Imported(_)) {
                    self.pc += 1;
                }
                self.settle(outcome, tracer)
            }
        }
    }

    /// Consults the interrupt table for a fatal's error class; redirects
    /// the PC and swallows it if a handler is installed ("on any raised
    /// error whose kind is in the interrupt table, set PC
    /// to the mapped label and continue"), otherwise hands the outcome
    /// back unchanged.
    fn settle<T: Tracer>(&mut self, outcome: StepOutcome, tracer: &mut T) -> StepOutcome {
        if let StepOutcome::Fatal(err) = &outcome {
            if let Some(class_sym) = self.script.interner.find(err.class()) {
                if let Some(label) = self.interrupts.handler_for(class_sym) {
                    if let Some(line) = self.script.labels.line_for_label(label) {
                        tracer.trace_interrupt(err.class(), label);
                        self.pc = line;
                        self.arrived_by_jump = true;
                        return StepOutcome::Continue;
                    }
                }
            }
        }
        tracer.trace_signal(&outcome);
        outcome
    }

    fn push_return(&mut self, address: u32) -> Result<(), StepOutcome> {
        if self.return_stack.len() >= self.limits.return_stack_limit {
            return Err(StepOutcome::Fatal(RuntimeError::StackOverflow));
        }
        self.return_stack.push(address);
        Ok(())
    }

    fn refresh_stack_dunder(&self, crucible: &mut Crucible) {
        let depths = self.return_stack.iter().map(|&pc| Value::Number(pc as f64)).collect();
        crucible.set_dunder("__STACK__", Value::Sequence(depths));
    }

    #[allow(clippy::too_many_arguments)]
    fn exec<T: Tracer>(
        &mut self,
        instruction: &Instruction,
        arrived_by_jump: bool,
        crucible: &mut Crucible,
        library: &mut dyn Library,
        tracer: &mut T,
    ) -> Result<Flow, StepOutcome> {
        match instruction {
            Instruction::Write(expr) => {
                let value = eval_expr(expr, crucible, self.script, library)?;
                let rendered = coerce_string(&value);
                let current = crucible.get("out").and_then(Value::as_str).unwrap_or("").to_string();
                write_var(crucible, "out", Value::String(format!("{current}{rendered}\n")))?;
                Ok(Flow::Advance)
            }
            Instruction::Call(sym, args) => {
                let name = self.script.interner.resolve(*sym).to_string();
                let mut values = Vec::with_capacity(args.len());
                for a in args {
                    values.push(eval_expr(a, crucible, self.script, library)?);
                }
                invoke(&name, values, crucible, library)?;
                Ok(Flow::Advance)
            }
            Instruction::Set(sym, expr) => {
                let value = eval_expr(expr, crucible, self.script, library)?;
                let name = self.script.interner.resolve(*sym);
                write_var(crucible, name, value)?;
                Ok(Flow::Advance)
            }
            Instruction::SetMulti { names, rhs } => {
                let bindings = match rhs {
                    SetRhs::Values(values) => {
                        let mut evaluated = Vec::with_capacity(values.len());
                        for v in values {
                            evaluated.push(eval_expr(v, crucible, self.script, library)?);
                        }
                        zip_with_replication(names.len(), evaluated)
                    }
                    SetRhs::From(expr) => {
                        let value = eval_expr(expr, crucible, self.script, library)?;
                        unpack_from(names, &value, self.script)
                    }
                };
                for (sym, value) in names.iter().zip(bindings) {
                    let name = self.script.interner.resolve(*sym);
                    write_var(crucible, name, value)?;
                }
                Ok(Flow::Advance)
            }
            Instruction::Const(sym, expr) => {
                let value = eval_expr(expr, crucible, self.script, library)?;
                let name = self.script.interner.resolve(*sym);
                crucible.declare_const(name, value).map_err(|e| to_fatal(name, e))?;
                Ok(Flow::Advance)
            }
            Instruction::Inc(sym) | Instruction::Dec(sym) => {
                let name = self.script.interner.resolve(*sym);
                let current = crucible
                    .get(name)
                    .and_then(Value::as_number)
                    .ok_or_else(|| StepOutcome::Fatal(RuntimeError::TypeError(format!("'{name}' is not a number"))))?;
                let delta = if matches!(instruction, Instruction::Inc(_)) { 1.0 } else { -1.0 };
                write_var(crucible, name, Value::Number(current + delta))?;
                Ok(Flow::Advance)
            }
            Instruction::Put(sym, expr, position) => {
                let value = eval_expr(expr, crucible, self.script, library)?;
                let name = self.script.interner.resolve(*sym);
                let mut items = match crucible.get(name) {
                    Some(Value::Sequence(items)) => items.clone(),
                    Some(other) => {
                        return Err(StepOutcome::Fatal(RuntimeError::TypeError(format!(
                            "'{name}' is a {}, not a sequence",
                            other.type_name()
                        ))))
                    }
                    None => return Err(StepOutcome::Fatal(RuntimeError::MissingVariable(name.to_string()))),
                };
                match position {
                    PutPosition::Before => items.insert(0, value),
                    PutPosition::After => items.push(value),
                }
                write_var(crucible, name, Value::Sequence(items))?;
                Ok(Flow::Advance)
            }
            Instruction::Swap(a, b) => {
                let name_a = self.script.interner.resolve(*a).to_string();
                let name_b = self.script.interner.resolve(*b).to_string();
                let va = crucible
                    .get(&name_a)
                    .cloned()
                    .ok_or_else(|| StepOutcome::Fatal(RuntimeError::MissingVariable(name_a.clone())))?;
                let vb = crucible
                    .get(&name_b)
                    .cloned()
                    .ok_or_else(|| StepOutcome::Fatal(RuntimeError::MissingVariable(name_b.clone())))?;
                write_var(crucible, &name_a, vb)?;
                write_var(crucible, &name_b, va)?;
                Ok(Flow::Advance)
            }
            Instruction::Input(sym) => {
                self.pending_input = Some(*sym);
                Err(StepOutcome::Yielded(None))
            }
            Instruction::Yield(expr) => {
                let carry = match expr {
                    Some(e) => Some(eval_expr(e, crucible, self.script, library)?),
                    None => None,
                };
                Err(StepOutcome::Yielded(carry))
            }
            Instruction::Stop => Err(StepOutcome::Halted),
            Instruction::Jump(target) => {
                let to = self.resolve_jump_target(target, crucible, library)?;
                let return_to = self.pc + 1;
                self.push_return(return_to)?;
                self.refresh_stack_dunder(crucible);
                crucible.set_dunder("__JUMPED__", Value::Boolean(true));
                tracer.trace_jump(self.pc, to);
                tracer.trace_call(return_to, self.return_stack.len());
                self.arrived_by_jump = true;
                Ok(Flow::Jumped(to))
            }
            Instruction::Return => {
                let to = self.return_stack.pop().ok_or(StepOutcome::Fatal(RuntimeError::EmptyReturnStack))?;
                self.refresh_stack_dunder(crucible);
                tracer.trace_return(to, self.return_stack.len());
                self.arrived_by_jump = true;
                Ok(Flow::Jumped(to))
            }
            Instruction::Import(target) => {
                let spec = ImportSpec {
                    library: self.script.interner.resolve(target.library).to_string(),
                    alias: target.alias.map(|s| self.script.interner.resolve(s).to_string()),
                    symbols: target
                        .symbols
                        .as_ref()
                        .map(|syms| syms.iter().map(|s| self.script.interner.resolve(*s).to_string()).collect()),
                };
                tracing::info!(library = %spec.library, alias = ?spec.alias, "awaiting host import");
                Err(StepOutcome::Imported(spec))
            }
            Instruction::Catch { error_class, target } => {
                self.interrupts.install(*error_class, *target);
                tracer.trace_catch_installed(self.script.interner.resolve(*error_class), *target);
                Ok(Flow::Advance)
            }
            Instruction::LabelHit(label, fallback) => {
                let redirected = !arrived_by_jump && fallback.is_some();
                tracer.trace_label_hit(*label, redirected);
                if arrived_by_jump {
                    return Ok(Flow::Advance);
                }
                match fallback {
                    Some(fb) => {
                        let line = self
                            .script
                            .labels
                            .line_for_label(*fb)
                            .ok_or_else(|| StepOutcome::Fatal(RuntimeError::BadJumpTarget(format!("{fb:?}"))))?;
                        Ok(Flow::Jumped(line))
                    }
                    None => Ok(Flow::Advance),
                }
            }
        }
    }

    fn resolve_jump_target(&self, target: &JumpTarget, crucible: &mut Crucible, library: &mut dyn Library) -> Result<u32, StepOutcome> {
        match target {
            // An explicit jump straight at an or-label's primary is
            // always a plain jump to it; the or-redirect only ever
            // applies to fallthrough arrival (handled in `LabelHit`).
            JumpTarget::Direct(label) | JumpTarget::OrLabel { primary: label, .. } => self.line_for(*label),
            JumpTarget::Indirect(expr) => {
                let value = eval_expr(expr, crucible, self.script, library)?;
                self.resolve_named_target(&value)
            }
            JumpTarget::Keyed { key, cases, default } => {
                let key_value = eval_expr(key, crucible, self.script, library)?;
                for (case_expr, label) in cases {
                    let case_value = eval_expr(case_expr, crucible, self.script, library)?;
                    if case_value == key_value {
                        return self.line_for(*label);
                    }
                }
                match default {
                    Some(label) => self.line_for(*label),
                    None => Err(StepOutcome::Fatal(RuntimeError::BadJumpTarget(key_value.to_string()))),
                }
            }
        }
    }

    fn line_for(&self, label: Label) -> Result<u32, StepOutcome> {
        self.script
            .labels
            .line_for_label(label)
            .ok_or_else(|| StepOutcome::Fatal(RuntimeError::BadJumpTarget(format!("{label:?}"))))
    }

    fn resolve_named_target(&self, value: &Value) -> Result<u32, StepOutcome> {
        match value {
            Value::Number(n) => Ok(*n as u32),
            Value::String(name) => {
                let sym = self
                    .script
                    .interner
                    .find(name)
                    .ok_or_else(|| StepOutcome::Fatal(RuntimeError::BadJumpTarget(name.clone())))?;
                let label = self
                    .script
                    .labels
                    .label_for_name(sym)
                    .ok_or_else(|| StepOutcome::Fatal(RuntimeError::BadJumpTarget(name.clone())))?;
                self.line_for(label)
            }
            other => Err(StepOutcome::Fatal(RuntimeError::BadJumpTarget(other.to_string()))),
        }
    }
}

/// Routes a write through `set_dunder` for reserved names (the
/// compiler's own foreach/dunder-init lowering legitimately targets
/// `__ITER__`/`__INDEX__`/`__LENGTH__` via ordinary `Set`/`Inc`), and
/// through the normal constant/protected-checked `set` otherwise.
fn write_var(crucible: &mut Crucible, name: &str, value: Value) -> Result<(), StepOutcome> {
    if is_dunder(name) {
        crucible.set_dunder(name, value);
        Ok(())
    } else {
        crucible.set(name, value).map_err(|e| to_fatal(name, e))
    }
}

/// Zips `values` against `name_count` names left-to-right, replicating
/// the last value over any extra names (`Set names, values`'s
/// value-list form).
fn zip_with_replication(name_count: usize, values: Vec<Value>) -> Vec<Value> {
    let last = values.last().cloned().unwrap_or(Value::None);
    let mut out = Vec::with_capacity(name_count);
    for i in 0..name_count {
        out.push(values.get(i).cloned().unwrap_or_else(|| last.clone()));
    }
    out
}

/// `Set names from expr`'s unpack form: a sequence binds positionally,
/// a mapping binds each name by key; either way a missing slot becomes
/// `none` rather than a fatal.
fn unpack_from(names: &[Symbol], value: &Value, script: &CompiledScript) -> Vec<Value> {
    match value {
        Value::Sequence(items) => names.iter().enumerate().map(|(i, _)| items.get(i).cloned().unwrap_or(Value::None)).collect(),
        Value::Mapping(entries) => names
            .iter()
            .map(|sym| {
                let name = script.interner.resolve(*sym);
                entries
                    .iter()
                    .find(|(k, _)| k.as_str() == Some(name))
                    .map(|(_, v)| v.clone())
                    .unwrap_or(Value::None)
            })
            .collect(),
        _ => names.iter().map(|_| Value::None).collect(),
    }
}

fn to_fatal(name: &str, err: CrucibleError) -> StepOutcome {
    StepOutcome::Fatal(match err {
        CrucibleError::ConstAssignment => RuntimeError::ConstAssignment(name.to_string()),
        CrucibleError::ReservedName => RuntimeError::TypeError(format!("'{name}' is a reserved dunder name")),
        CrucibleError::AlreadyDefined => RuntimeError::AlreadyDefined(name.to_string()),
        CrucibleError::Protected => RuntimeError::Protected(name.to_string()),
    })
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod interpreter_tests;
