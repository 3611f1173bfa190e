//! Expression evaluation against a live Crucible.
//!
//! Every evaluation either produces a `Value` or bails out with a
//! `StepOutcome` — a fatal (bad types, missing variable) or a raw
//! signal surfaced through a library call that itself suspends. Either
//! way the caller in `interpreter.rs` threads the same `?` straight
//! through, since an expression has no resumable mid-evaluation state
//! (the host re-enters at the next line, never mid-expression).

use std::cmp::Ordering;

use tinder_bytecode::expr::{BinOp, InterpFragment, UnOp};
use tinder_bytecode::{CompiledScript, Expr};
use tinder_core::{Crucible, Interner, Symbol, Value};

use crate::error::RuntimeError;
use crate::library::{CallOutcome, Library};
use crate::signal::StepOutcome;

type EvalResult = Result<Value, StepOutcome>;

pub(crate) fn eval_expr(expr: &Expr, crucible: &mut Crucible, script: &CompiledScript, library: &mut dyn Library) -> EvalResult {
    match expr {
        Expr::Const(c) => Ok(script.constants.get(*c).clone()),
        Expr::Identifier(sym) => {
            let name = script.interner.resolve(*sym);
            crucible
                .get(name)
                .cloned()
                .ok_or_else(|| StepOutcome::Fatal(RuntimeError::MissingVariable(name.to_string())))
        }
        Expr::Indirect(inner) => {
            let target = eval_expr(inner, crucible, script, library)?;
            let name = target
                .as_str()
                .map(str::to_string)
                .or_else(|| target.as_number().map(|n| n.to_string()))
                .ok_or_else(|| StepOutcome::Fatal(RuntimeError::BadIndirectTarget(target.to_string())))?;
            crucible.get(&name).cloned().ok_or_else(|| StepOutcome::Fatal(RuntimeError::MissingVariable(name)))
        }
        Expr::DotChain(base, segments) => {
            let mut current = eval_expr(base, crucible, script, library)?;
            for seg in segments {
                if matches!(current, Value::Callable(_)) {
                    break;
                }
                current = dot_step(&current, *seg, &script.interner);
            }
            Ok(current)
        }
        Expr::Sequence(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval_expr(item, crucible, script, library)?);
            }
            Ok(Value::Sequence(values))
        }
        Expr::Mapping(entries) => {
            let mut values = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                let key = eval_expr(k, crucible, script, library)?;
                let value = eval_expr(v, crucible, script, library)?;
                values.push((key, value));
            }
            Ok(Value::Mapping(values))
        }
        Expr::UnOp(op, inner) => {
            let value = eval_expr(inner, crucible, script, library)?;
            eval_unop(*op, &value).map_err(StepOutcome::Fatal)
        }
        Expr::BinOp(op, lhs, rhs) => eval_binop(*op, lhs, rhs, crucible, script, library),
        Expr::Call(sym, args) => {
            let name = script.interner.resolve(*sym).to_string();
            let mut values = Vec::with_capacity(args.len());
            for a in args {
                values.push(eval_expr(a, crucible, script, library)?);
            }
            invoke(&name, values, crucible, library)
        }
        Expr::Group(inner) => eval_expr(inner, crucible, script, library),
        Expr::Interpolation(fragments) => {
            let mut rendered = String::new();
            for fragment in fragments {
                match fragment {
                    InterpFragment::Literal(s) => rendered.push_str(s),
                    InterpFragment::Lookup(sym) => {
                        let name = script.interner.resolve(*sym);
                        let value = crucible.get(name).cloned().unwrap_or(Value::None);
                        rendered.push_str(&coerce_string(&value));
                    }
                }
            }
            Ok(Value::String(rendered))
        }
    }
}

fn eval_binop(op: BinOp, lhs: &Expr, rhs: &Expr, crucible: &mut Crucible, script: &CompiledScript, library: &mut dyn Library) -> EvalResult {
    // `and`/`or` short-circuit: the right side is only evaluated (and
    // so only raises a missing-variable fatal, or a suspending call)
    // when it actually determines the result.
    if matches!(op, BinOp::And) {
        let l = eval_expr(lhs, crucible, script, library)?;
        return if l.is_truthy() { eval_expr(rhs, crucible, script, library) } else { Ok(l) };
    }
    if matches!(op, BinOp::Or) {
        let l = eval_expr(lhs, crucible, script, library)?;
        return if l.is_truthy() { Ok(l) } else { eval_expr(rhs, crucible, script, library) };
    }

    let l = eval_expr(lhs, crucible, script, library)?;
    let r = eval_expr(rhs, crucible, script, library)?;
    match op {
        BinOp::Add => match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            _ => Err(type_error("+", &l, &r)),
        },
        BinOp::Sub => numeric(&l, &r, |a, b| a - b, "-"),
        BinOp::Mul => numeric(&l, &r, |a, b| a * b, "*"),
        BinOp::Div => {
            let (a, b) = require_numbers(&l, &r, "//")?;
            if b == 0.0 {
                return Err(StepOutcome::Fatal(RuntimeError::DivideByZero));
            }
            Ok(Value::Number(a / b))
        }
        BinOp::Mod => {
            let (a, b) = require_numbers(&l, &r, "%")?;
            if b == 0.0 {
                return Err(StepOutcome::Fatal(RuntimeError::DivideByZero));
            }
            Ok(Value::Number(a % b))
        }
        BinOp::Eq => Ok(Value::Boolean(l == r)),
        BinOp::Ne => Ok(Value::Boolean(l != r)),
        BinOp::Lt => compare(&l, &r, |ord| ord == Ordering::Less),
        BinOp::Le => compare(&l, &r, |ord| ord != Ordering::Greater),
        BinOp::Gt => compare(&l, &r, |ord| ord == Ordering::Greater),
        BinOp::Ge => compare(&l, &r, |ord| ord != Ordering::Less),
        BinOp::In => Ok(eval_in(&l, &r)),
        BinOp::At => Ok(eval_at(&l, &r)),
        BinOp::From => Ok(eval_from(&l, &r)),
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    }
}

fn eval_unop(op: UnOp, value: &Value) -> Result<Value, RuntimeError> {
    match op {
        UnOp::Not => Ok(Value::Boolean(!value.is_truthy())),
        UnOp::Neg => value
            .as_number()
            .map(|n| Value::Number(-n))
            .ok_or_else(|| RuntimeError::TypeError(format!("cannot negate a {}", value.type_name()))),
    }
}

fn numeric(l: &Value, r: &Value, f: impl Fn(f64, f64) -> f64, op: &str) -> EvalResult {
    let (a, b) = require_numbers(l, r, op)?;
    Ok(Value::Number(f(a, b)))
}

fn require_numbers(l: &Value, r: &Value, op: &str) -> Result<(f64, f64), StepOutcome> {
    match (l.as_number(), r.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(type_error(op, l, r)),
    }
}

fn compare(l: &Value, r: &Value, accept: impl Fn(Ordering) -> bool) -> EvalResult {
    l.partial_cmp(r)
        .map(|ord| Value::Boolean(accept(ord)))
        .ok_or_else(|| StepOutcome::Fatal(RuntimeError::TypeError(format!("cannot compare a {} and a {}", l.type_name(), r.type_name()))))
}

fn type_error(op: &str, l: &Value, r: &Value) -> StepOutcome {
    StepOutcome::Fatal(RuntimeError::TypeError(format!("'{op}' does not apply to a {} and a {}", l.type_name(), r.type_name())))
}

/// `x in Y`: membership test. Returns `x` back (not a boolean) so
/// `if name in roster` and `set found to name in roster` both read
/// naturally, per the evaluator's "returns x or none" contract.
fn eval_in(x: &Value, y: &Value) -> Value {
    match y {
        Value::Sequence(items) => items.iter().any(|i| i == x).then(|| x.clone()).unwrap_or(Value::None),
        Value::Mapping(entries) => entries.iter().any(|(k, _)| k == x).then(|| x.clone()).unwrap_or(Value::None),
        Value::String(s) => match x.as_str() {
            Some(needle) if s.contains(needle) => x.clone(),
            _ => Value::None,
        },
        _ => Value::None,
    }
}

/// `x at Y`: the position (sequence index) or key (mapping) under
/// which `x` is stored as a *value*. The inverse of `from`.
fn eval_at(x: &Value, y: &Value) -> Value {
    match y {
        Value::Sequence(items) => items.iter().position(|i| i == x).map(|i| Value::Number(i as f64)).unwrap_or(Value::None),
        Value::Mapping(entries) => entries.iter().find(|(_, v)| v == x).map(|(k, _)| k.clone()).unwrap_or(Value::None),
        _ => Value::None,
    }
}

/// `x from Y`: the value stored at index/key `x`.
fn eval_from(x: &Value, y: &Value) -> Value {
    match y {
        Value::Sequence(items) => x.as_number().and_then(|n| items.get(n as usize).cloned()).unwrap_or(Value::None),
        Value::Mapping(entries) => entries.iter().find(|(k, _)| k == x).map(|(_, v)| v.clone()).unwrap_or(Value::None),
        _ => Value::None,
    }
}

/// Left-associative one-step dot access. A missing key past the base
/// identifier yields `none` rather than a fatal.
fn dot_step(value: &Value, seg: Symbol, interner: &Interner) -> Value {
    let name = interner.resolve(seg);
    match value {
        Value::Mapping(entries) => entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(name))
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::None),
        Value::Sequence(items) => name.parse::<usize>().ok().and_then(|i| items.get(i).cloned()).unwrap_or(Value::None),
        _ => Value::None,
    }
}

/// `none` renders as the empty string everywhere a value is coerced to
/// text (`write`, interpolation) rather than `Value`'s own `Display`
/// impl, which prints the literal word `none` for diagnostics.
pub(crate) fn coerce_string(value: &Value) -> String {
    match value {
        Value::None => String::new(),
        other => other.to_string(),
    }
}

/// Dispatches a flat callable name: VM-level intrinsics first (the
/// `len`/`__iter_*` helpers the compiler's foreach lowering emits),
/// then the host `Library` catalog. Shared by `Expr::Call` and the
/// bare `Instruction::Call` statement form.
pub(crate) fn invoke(name: &str, args: Vec<Value>, crucible: &mut Crucible, library: &mut dyn Library) -> EvalResult {
    if let Some(result) = call_intrinsic(name, &args) {
        return result.map_err(StepOutcome::Fatal);
    }
    match library.call(crucible, name, args) {
        CallOutcome::Value(v) => Ok(v),
        CallOutcome::Signal(outcome) => Err(outcome),
    }
}

fn call_intrinsic(name: &str, args: &[Value]) -> Option<Result<Value, RuntimeError>> {
    match name {
        "len" => Some(intrinsic_len(args)),
        "__iter_single" => Some(intrinsic_iter_single(args)),
        "__iter_key" => Some(intrinsic_iter_key(args)),
        "__iter_value" => Some(intrinsic_iter_value(args)),
        _ => None,
    }
}

fn intrinsic_len(args: &[Value]) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(Value::Sequence(items)) => Ok(Value::Number(items.len() as f64)),
        Some(Value::Mapping(entries)) => Ok(Value::Number(entries.len() as f64)),
        Some(Value::String(s)) => Ok(Value::Number(s.chars().count() as f64)),
        Some(other) => Err(RuntimeError::TypeError(format!("len: a {} has no length", other.type_name()))),
        None => Err(RuntimeError::TypeError("len: missing argument".into())),
    }
}

fn index_arg(args: &[Value]) -> Result<usize, RuntimeError> {
    args.get(1)
        .and_then(Value::as_number)
        .map(|n| n as usize)
        .ok_or_else(|| RuntimeError::TypeError("foreach cursor: missing numeric index".into()))
}

/// Binds the value for a given cursor position: the element for a
/// sequence, the value for a mapping.
fn intrinsic_iter_value(args: &[Value]) -> Result<Value, RuntimeError> {
    let index = index_arg(args)?;
    match args.first() {
        Some(Value::Sequence(items)) => Ok(items.get(index).cloned().unwrap_or(Value::None)),
        Some(Value::Mapping(entries)) => Ok(entries.get(index).map(|(_, v)| v.clone()).unwrap_or(Value::None)),
        Some(other) => Err(RuntimeError::TypeError(format!("foreach: cannot iterate a {}", other.type_name()))),
        None => Err(RuntimeError::TypeError("foreach: missing iterable".into())),
    }
}

/// Binds the key for a given cursor position: the index for a
/// sequence, the key for a mapping.
fn intrinsic_iter_key(args: &[Value]) -> Result<Value, RuntimeError> {
    let index = index_arg(args)?;
    match args.first() {
        Some(Value::Sequence(_)) => Ok(Value::Number(index as f64)),
        Some(Value::Mapping(entries)) => Ok(entries.get(index).map(|(k, _)| k.clone()).unwrap_or(Value::None)),
        Some(other) => Err(RuntimeError::TypeError(format!("foreach: cannot iterate a {}", other.type_name()))),
        None => Err(RuntimeError::TypeError("foreach: missing iterable".into())),
    }
}

/// Single-variable `foreach` binding: the element for a sequence, but
/// the *key* for a mapping, so iterating a mapping yields every key
/// exactly once.
fn intrinsic_iter_single(args: &[Value]) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(Value::Mapping(_)) => intrinsic_iter_key(args),
        _ => intrinsic_iter_value(args),
    }
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod eval_tests;
