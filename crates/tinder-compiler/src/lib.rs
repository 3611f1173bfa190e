//! Firestarter: the Tinder compiler.
//!
//! Wires the lexer, the recursive-descent parser, and the desugaring
//! pipeline in `compile` together behind a single [`compile`] entry
//! point. `grammar` additionally exposes Tinder's lexical atoms as a
//! plain `tinder_core::peg` grammar, independent of the hand-rolled
//! parser, so the generic PEG engine is exercised by something other
//! than its own unit tests.

pub mod ast;
pub mod compile;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;

use tinder_bytecode::constant::ConstPool;
use tinder_bytecode::CompiledScript;
use tinder_core::Interner;

pub use error::{CompileError, ParseError};

/// Compiles Tinder source text into an executable [`CompiledScript`].
pub fn compile(source: &str) -> Result<CompiledScript, CompileError> {
    let start = std::time::Instant::now();
    tracing::debug!(bytes = source.len(), "compiling script");
    let tokens = lexer::lex(source).map_err(ParseError::from)?;
    let mut interner = Interner::new();
    let mut consts = ConstPool::new();
    let script = parser::parse_script(&tokens, &mut interner, &mut consts)?;
    let compiled = compile::compile_script(&script, &mut interner, &mut consts);
    match &compiled {
        Ok(compiled) => tracing::info!(lines = compiled.lines.len(), elapsed_us = start.elapsed().as_micros() as u64, "compiled script"),
        Err(err) => tracing::warn!(%err, "compile failed"),
    }
    compiled
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod lib_tests;
