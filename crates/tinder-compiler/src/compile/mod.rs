//! Firestarter: turns a parsed [`crate::ast::Script`] into a
//! [`CompiledScript`] — desugar, fold, validate interpolation, then
//! prepend the dunder initializers.

mod dunders;
mod fold;
mod interpolate;
mod lower;

use tinder_bytecode::constant::ConstPool;
use tinder_bytecode::CompiledScript;
use tinder_core::Interner;

use crate::ast::Script;
use crate::error::CompileError;

pub fn compile_script(script: &Script, interner: &mut Interner, consts: &mut ConstPool) -> Result<CompiledScript, CompileError> {
    let mut lowered = lower::lower(script, interner, consts)?;
    fold::fold_lines(&mut lowered.lines, consts);
    interpolate::validate_lines(&lowered.lines, &*interner)?;
    dunders::prepend_dunder_init(&mut lowered, interner, consts);

    Ok(CompiledScript {
        lines: lowered.lines,
        labels: lowered.labels,
        constants: consts.clone(),
        source_map: lowered.source_map,
        interner: interner.clone(),
    })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
