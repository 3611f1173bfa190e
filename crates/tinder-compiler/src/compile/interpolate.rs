//! Validates already-lowered `Expr::Interpolation` fragments.
//!
//! The lexer and parser already split `"[[NAME]]"` into literal and
//! lookup fragments (see `lexer::lex` and `parser::expr`); this pass
//! re-walks the compiled line list as a final invariant check that
//! every lookup fragment interned a non-empty name, the same way
//! `tinder-core::invariants` re-checks Crucible depth rather than
//! trusting call sites.

use tinder_bytecode::expr::InterpFragment;
use tinder_bytecode::instruction::{Instruction, JumpTarget, Line, SetRhs};
use tinder_bytecode::Expr;
use tinder_core::Interner;

use crate::error::CompileError;

pub fn validate_lines(lines: &[Line], interner: &Interner) -> Result<(), CompileError> {
    for line in lines {
        if let Some(cond) = &line.condition {
            validate_expr(cond, interner)?;
        }
        validate_instruction(&line.instruction, interner)?;
    }
    Ok(())
}

fn validate_instruction(instruction: &Instruction, interner: &Interner) -> Result<(), CompileError> {
    match instruction {
        Instruction::Write(e) | Instruction::Const(_, e) | Instruction::Set(_, e) => validate_expr(e, interner),
        Instruction::SetMulti { rhs, .. } => match rhs {
            SetRhs::Values(values) => values.iter().try_for_each(|v| validate_expr(v, interner)),
            SetRhs::From(e) => validate_expr(e, interner),
        },
        Instruction::Call(_, args) => args.iter().try_for_each(|a| validate_expr(a, interner)),
        Instruction::Put(_, v, _position) => validate_expr(v, interner),
        Instruction::Yield(Some(e)) => validate_expr(e, interner),
        Instruction::Jump(JumpTarget::Indirect(e)) => validate_expr(e, interner),
        Instruction::Jump(JumpTarget::Keyed { key, cases, .. }) => {
            validate_expr(key, interner)?;
            cases.iter().try_for_each(|(k, _)| validate_expr(k, interner))
        }
        _ => Ok(()),
    }
}

fn validate_expr(expr: &Expr, interner: &Interner) -> Result<(), CompileError> {
    match expr {
        Expr::Interpolation(fragments) => {
            for fragment in fragments {
                if let InterpFragment::Lookup(sym) = fragment {
                    if interner.resolve(*sym).is_empty() {
                        return Err(CompileError::Parse(crate::error::ParseError::Unexpected {
                            line: 0,
                            message: "interpolation lookup resolved to an empty name".into(),
                        }));
                    }
                }
            }
            Ok(())
        }
        Expr::UnOp(_, inner) | Expr::Group(inner) | Expr::Indirect(inner) | Expr::DotChain(inner, _) => {
            validate_expr(inner, interner)
        }
        Expr::BinOp(_, lhs, rhs) => {
            validate_expr(lhs, interner)?;
            validate_expr(rhs, interner)
        }
        Expr::Sequence(items) => items.iter().try_for_each(|i| validate_expr(i, interner)),
        Expr::Mapping(entries) => entries.iter().try_for_each(|(k, v)| {
            validate_expr(k, interner)?;
            validate_expr(v, interner)
        }),
        Expr::Call(_, args) => args.iter().try_for_each(|a| validate_expr(a, interner)),
        Expr::Const(_) | Expr::Identifier(_) => Ok(()),
    }
}

#[cfg(test)]
#[path = "interpolate_tests.rs"]
mod interpolate_tests;
