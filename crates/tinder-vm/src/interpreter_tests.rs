use super::*;
use tinder_bytecode::instruction::{Instruction, JumpTarget, Line};
use tinder_bytecode::{CompiledScript, Label};
use tinder_core::{Crucible, Interner};

use crate::library::EmptyLibrary;

fn push(script: &mut CompiledScript, instruction: Instruction, source_line: u32) {
    script.push_line(Line { instruction, condition: None, source_line }, source_line);
}

#[test]
fn linear_set_and_write_produces_the_expected_output() {
    let mut script = CompiledScript::new();
    let mut interner = Interner::new();
    let a = interner.intern("a");
    let mut consts = tinder_bytecode::ConstPool::new();
    let two = consts.intern(Value::Number(2.0));
    script.interner = interner;
    script.constants = consts;

    push(&mut script, Instruction::Set(a, Expr::Const(two)), 1);
    push(&mut script, Instruction::Write(Expr::Identifier(a)), 2);

    let mut crucible = Crucible::new();
    let mut library = EmptyLibrary;
    let mut interp = Interpreter::new(&script, FuelLimits::default());
    let outcome = interp.run(&mut crucible, &mut library);

    assert_eq!(outcome, StepOutcome::Halted);
    assert_eq!(crucible.get("out"), Some(&Value::String("2\n".to_string())));
}

#[test]
fn jump_pushes_a_return_address_and_return_pops_it() {
    let mut script = CompiledScript::new();
    let interner = Interner::new();
    script.interner = interner;

    // 0: jump #2
    // 1: write "skipped" (never reached)
    // 2: (landing site) return
    push(&mut script, Instruction::Jump(JumpTarget::Direct(Label(0))), 1);
    push(&mut script, Instruction::Stop, 2);
    push(&mut script, Instruction::Return, 3);
    script.labels.declare(script.interner.intern("target"), Label(0));
    script.labels.resolve(Label(0), 2);

    let mut crucible = Crucible::new();
    let mut library = EmptyLibrary;
    let mut interp = Interpreter::new(&script, FuelLimits::default());

    // Step through: jump (pc -> 2), return (pc -> 1, the pushed return address), stop.
    assert_eq!(interp.step(&mut crucible, &mut library), StepOutcome::Continue);
    assert_eq!(interp.pc(), 2);
    assert_eq!(interp.return_depth(), 1);
    assert_eq!(interp.step(&mut crucible, &mut library), StepOutcome::Continue);
    assert_eq!(interp.pc(), 1);
    assert_eq!(interp.return_depth(), 0);
    assert_eq!(interp.step(&mut crucible, &mut library), StepOutcome::Halted);
}

#[test]
fn returning_with_an_empty_stack_is_a_fatal() {
    let mut script = CompiledScript::new();
    script.interner = Interner::new();
    push(&mut script, Instruction::Return, 1);

    let mut crucible = Crucible::new();
    let mut library = EmptyLibrary;
    let mut interp = Interpreter::new(&script, FuelLimits::default());

    let outcome = interp.run(&mut crucible, &mut library);
    assert_eq!(outcome, StepOutcome::Fatal(RuntimeError::EmptyReturnStack));
}

#[test]
fn a_caught_fatal_redirects_the_pc_instead_of_propagating() {
    let mut script = CompiledScript::new();
    let mut interner = Interner::new();
    let class = interner.intern("TinderBurn");
    script.interner = interner;

    // 0: catch "TinderBurn" at #handler
    // 1: return (empty stack -> fatal, caught)
    // 2: (handler) stop
    push(&mut script, Instruction::Catch { error_class: class, target: Label(0) }, 1);
    push(&mut script, Instruction::Return, 2);
    push(&mut script, Instruction::Stop, 3);
    script.labels.declare(interner_dummy(), Label(0));
    script.labels.resolve(Label(0), 2);

    let mut crucible = Crucible::new();
    let mut library = EmptyLibrary;
    let mut interp = Interpreter::new(&script, FuelLimits::default());

    let outcome = interp.run(&mut crucible, &mut library);
    assert_eq!(outcome, StepOutcome::Halted);
}

fn interner_dummy() -> tinder_core::Symbol {
    let mut interner = Interner::new();
    interner.intern("handler")
}

#[test]
fn const_rewrite_is_fatal() {
    let mut script = CompiledScript::new();
    let mut interner = Interner::new();
    let max = interner.intern("MAX");
    let mut consts = tinder_bytecode::ConstPool::new();
    let five = consts.intern(Value::Number(5.0));
    let six = consts.intern(Value::Number(6.0));
    script.interner = interner;
    script.constants = consts;

    push(&mut script, Instruction::Const(max, Expr::Const(five)), 1);
    push(&mut script, Instruction::Set(max, Expr::Const(six)), 2);

    let mut crucible = Crucible::new();
    let mut library = EmptyLibrary;
    let mut interp = Interpreter::new(&script, FuelLimits::default());

    let outcome = interp.run(&mut crucible, &mut library);
    assert!(matches!(outcome, StepOutcome::Fatal(RuntimeError::ConstAssignment(_))));
}

#[test]
fn instruction_fuel_is_enforced() {
    let mut script = CompiledScript::new();
    script.interner = Interner::new();
    push(&mut script, Instruction::Jump(JumpTarget::Direct(Label(0))), 1);
    script.labels.resolve(Label(0), 0);

    let mut crucible = Crucible::new();
    let mut library = EmptyLibrary;
    let mut interp = Interpreter::new(&script, FuelLimits::new(5, 256));

    let outcome = interp.run(&mut crucible, &mut library);
    assert_eq!(outcome, StepOutcome::Fatal(RuntimeError::FuelExhausted));
}

#[test]
fn yield_resumes_at_the_next_line_instead_of_repeating_itself() {
    let mut script = CompiledScript::new();
    script.interner = Interner::new();
    push(&mut script, Instruction::Yield(None), 1);
    push(&mut script, Instruction::Stop, 2);

    let mut crucible = Crucible::new();
    let mut library = EmptyLibrary;
    let mut interp = Interpreter::new(&script, FuelLimits::default());

    assert_eq!(interp.run(&mut crucible, &mut library), StepOutcome::Yielded(None));
    assert_eq!(interp.pc(), 1);
    assert_eq!(interp.run(&mut crucible, &mut library), StepOutcome::Halted);
}

#[test]
fn input_suspends_and_resume_writes_the_named_variable() {
    let mut script = CompiledScript::new();
    let mut interner = Interner::new();
    let name = interner.intern("reply");
    script.interner = interner;
    push(&mut script, Instruction::Input(name), 1);
    push(&mut script, Instruction::Write(Expr::Identifier(name)), 2);

    let mut crucible = Crucible::new();
    let mut library = EmptyLibrary;
    let mut interp = Interpreter::new(&script, FuelLimits::default());

    assert_eq!(interp.run(&mut crucible, &mut library), StepOutcome::Yielded(None));
    interp.resume(&mut crucible, Some(Value::String("yes".into())));
    let outcome = interp.run(&mut crucible, &mut library);

    assert_eq!(outcome, StepOutcome::Halted);
    assert_eq!(crucible.get("out"), Some(&Value::String("yes\n".to_string())));
}
