//! Constant folding: collapses `BinOp`/`UnOp` nodes whose operands are
//! already `Expr::Const` into a single folded constant, leaving
//! anything that reads a Crucible name or calls a function untouched
//! (those are never provably pure at compile time without a host
//! catalog of pure callables, which this core does not have access
//! to).

use tinder_bytecode::constant::ConstPool;
use tinder_bytecode::expr::{BinOp, UnOp};
use tinder_bytecode::instruction::{Instruction, JumpTarget, Line, SetRhs};
use tinder_bytecode::Expr;
use tinder_core::Value;

pub fn fold_lines(lines: &mut [Line], consts: &mut ConstPool) {
    for line in lines {
        if let Some(cond) = &mut line.condition {
            fold_expr(cond, consts);
        }
        fold_instruction(&mut line.instruction, consts);
    }
}

fn fold_instruction(instruction: &mut Instruction, consts: &mut ConstPool) {
    match instruction {
        Instruction::Write(e) | Instruction::Const(_, e) | Instruction::Set(_, e) => fold_expr(e, consts),
        Instruction::SetMulti { rhs, .. } => match rhs {
            SetRhs::Values(values) => values.iter_mut().for_each(|v| fold_expr(v, consts)),
            SetRhs::From(e) => fold_expr(e, consts),
        },
        Instruction::Call(_, args) => args.iter_mut().for_each(|a| fold_expr(a, consts)),
        Instruction::Put(_, v, _position) => fold_expr(v, consts),
        Instruction::Yield(Some(e)) => fold_expr(e, consts),
        Instruction::Jump(target) => fold_jump_target(target, consts),
        Instruction::Inc(_)
        | Instruction::Dec(_)
        | Instruction::Swap(_, _)
        | Instruction::Input(_)
        | Instruction::Yield(None)
        | Instruction::Stop
        | Instruction::Return
        | Instruction::Import(_)
        | Instruction::Catch { .. }
        | Instruction::LabelHit(_, _) => {}
    }
}

fn fold_jump_target(target: &mut JumpTarget, consts: &mut ConstPool) {
    match target {
        JumpTarget::Indirect(e) => fold_expr(e, consts),
        JumpTarget::Keyed { key, cases, .. } => {
            fold_expr(key, consts);
            for (case_key, _) in cases {
                fold_expr(case_key, consts);
            }
        }
        JumpTarget::Direct(_) | JumpTarget::OrLabel { .. } => {}
    }
}

/// Folds `expr` in place, replacing it with `Expr::Const` wherever
/// every operand below it is already a constant and the operator is
/// pure.
fn fold_expr(expr: &mut Expr, consts: &mut ConstPool) {
    match expr {
        Expr::UnOp(op, inner) => {
            fold_expr(inner, consts);
            if let Expr::Const(c) = inner.as_ref() {
                if let Some(folded) = fold_unary(*op, consts.get(*c)) {
                    *expr = Expr::Const(consts.intern(folded));
                }
            }
        }
        Expr::BinOp(op, lhs, rhs) => {
            fold_expr(lhs, consts);
            fold_expr(rhs, consts);
            if let (Expr::Const(l), Expr::Const(r)) = (lhs.as_ref(), rhs.as_ref()) {
                let (lv, rv) = (consts.get(*l).clone(), consts.get(*r).clone());
                if let Some(folded) = fold_binary(*op, &lv, &rv) {
                    *expr = Expr::Const(consts.intern(folded));
                }
            }
        }
        Expr::Group(inner) => {
            fold_expr(inner, consts);
            let folded = inner.as_ref().clone();
            if matches!(folded, Expr::Const(_)) {
                *expr = folded;
            }
        }
        Expr::Sequence(items) => items.iter_mut().for_each(|i| fold_expr(i, consts)),
        Expr::Mapping(entries) => entries.iter_mut().for_each(|(k, v)| {
            fold_expr(k, consts);
            fold_expr(v, consts);
        }),
        Expr::Indirect(inner) => fold_expr(inner, consts),
        Expr::DotChain(base, _) => fold_expr(base, consts),
        Expr::Call(_, args) => args.iter_mut().for_each(|a| fold_expr(a, consts)),
        Expr::Const(_) | Expr::Identifier(_) | Expr::Interpolation(_) => {}
    }
}

fn fold_unary(op: UnOp, value: &Value) -> Option<Value> {
    match (op, value) {
        (UnOp::Neg, Value::Number(n)) => Some(Value::Number(-n)),
        (UnOp::Not, v) => Some(Value::Boolean(!v.is_truthy())),
        _ => None,
    }
}

/// Folds a binary operator over two already-constant operands.
/// Division and modulo by zero are left unfolded so the VM raises the
/// fatal at the instruction that actually executes it, not silently at
/// compile time.
fn fold_binary(op: BinOp, lhs: &Value, rhs: &Value) -> Option<Value> {
    use BinOp::*;
    match (op, lhs, rhs) {
        (Add, Value::Number(a), Value::Number(b)) => Some(Value::Number(a + b)),
        (Add, Value::String(a), Value::String(b)) => Some(Value::String(format!("{a}{b}"))),
        (Sub, Value::Number(a), Value::Number(b)) => Some(Value::Number(a - b)),
        (Mul, Value::Number(a), Value::Number(b)) => Some(Value::Number(a * b)),
        (Div, Value::Number(a), Value::Number(b)) if *b != 0.0 => Some(Value::Number(a / b)),
        (Mod, Value::Number(a), Value::Number(b)) if *b != 0.0 => Some(Value::Number(a % b)),
        (Eq, a, b) => Some(Value::Boolean(a == b)),
        (Ne, a, b) => Some(Value::Boolean(a != b)),
        (Lt, Value::Number(a), Value::Number(b)) => Some(Value::Boolean(a < b)),
        (Le, Value::Number(a), Value::Number(b)) => Some(Value::Boolean(a <= b)),
        (Gt, Value::Number(a), Value::Number(b)) => Some(Value::Boolean(a > b)),
        (Ge, Value::Number(a), Value::Number(b)) => Some(Value::Boolean(a >= b)),
        (And, a, b) => Some(if a.is_truthy() { b.clone() } else { a.clone() }),
        (Or, a, b) => Some(if a.is_truthy() { a.clone() } else { b.clone() }),
        // `in`/`at`/`from` are left to the VM: folding them here would
        // duplicate the membership semantics in two places.
        _ => None,
    }
}

#[cfg(test)]
#[path = "fold_tests.rs"]
mod fold_tests;
