//! Dunder initialization: at interpreter entry `__LINE__` is `0` and
//! `__STACK__` is empty, while the remaining dunders
//! (`__CONDITION__`, `__JUMPED__`, `__ITER__`, `__INDEX__`,
//! `__LENGTH__`) stay unset until the instruction that first uses them
//! writes them.

use tinder_bytecode::instruction::{Instruction, Line};
use tinder_bytecode::Expr;
use tinder_core::{Interner, Value};

use super::lower::Lowered;
use tinder_bytecode::constant::ConstPool;

pub const RESERVED_DUNDERS: &[&str] =
    &["__LINE__", "__CONDITION__", "__JUMPED__", "__ITER__", "__INDEX__", "__LENGTH__", "__STACK__"];

/// Prepends the two initializer lines ahead of `lowered.lines`,
/// shifting every already-resolved label line index to match.
pub fn prepend_dunder_init(lowered: &mut Lowered, interner: &mut Interner, consts: &mut ConstPool) {
    let line_sym = interner.intern("__LINE__");
    let stack_sym = interner.intern("__STACK__");
    let zero = consts.intern(Value::Number(0.0));
    let empty_stack = consts.intern(Value::Sequence(Vec::new()));

    let mut init = vec![
        Line { instruction: Instruction::Set(line_sym, Expr::Const(zero)), condition: None, source_line: 0 },
        Line { instruction: Instruction::Set(stack_sym, Expr::Const(empty_stack)), condition: None, source_line: 0 },
    ];
    let shift_by = init.len() as u32;

    lowered.labels.shift(shift_by);
    let mut source_map = vec![0u32; init.len()];
    source_map.append(&mut lowered.source_map);
    lowered.source_map = source_map;

    init.append(&mut lowered.lines);
    lowered.lines = init;
}

#[cfg(test)]
#[path = "dunders_tests.rs"]
mod dunders_tests;
