//! A minimal host `Library` for the CLI: just enough callables
//! (`math.sqrt`, `string.upper`, ...) to run scripts that import a
//! library end to end.
//!
//! The real plugin catalog (canvas, text, login, realm) is an
//! external collaborator the core never sees beyond an opaque
//! callable value — this is that collaborator's stand-in for a
//! terminal-only host, not a reimplementation of any real plugin.

use tinder_core::{Crucible, Value};
use tinder_vm::{CallOutcome, Library, RuntimeError, StepOutcome};

#[derive(Debug, Default)]
pub struct StdLibrary;

impl Library for StdLibrary {
    fn call(&mut self, _crucible: &mut Crucible, name: &str, args: Vec<Value>) -> CallOutcome {
        match dispatch(name, &args) {
            Ok(value) => CallOutcome::Value(value),
            Err(err) => CallOutcome::Signal(StepOutcome::Fatal(err)),
        }
    }

    /// The whole catalog is pure: every callable here is a total
    /// function of its arguments with no Crucible or I/O side effect,
    /// so Firestarter's constant folding may evaluate calls into them
    /// at compile time.
    fn is_pure(&self, name: &str) -> bool {
        name.starts_with("math.") || name.starts_with("string.")
    }
}

fn dispatch(name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    match name {
        "math.sqrt" => Ok(Value::Number(number(args, 0, name)?.sqrt())),
        "math.abs" => Ok(Value::Number(number(args, 0, name)?.abs())),
        "math.floor" => Ok(Value::Number(number(args, 0, name)?.floor())),
        "math.ceil" => Ok(Value::Number(number(args, 0, name)?.ceil())),
        "math.round" => Ok(Value::Number(number(args, 0, name)?.round())),
        "math.pow" => Ok(Value::Number(number(args, 0, name)?.powf(number(args, 1, name)?))),
        "math.min" => Ok(Value::Number(number(args, 0, name)?.min(number(args, 1, name)?))),
        "math.max" => Ok(Value::Number(number(args, 0, name)?.max(number(args, 1, name)?))),
        "string.upper" => Ok(Value::String(text(args, 0, name)?.to_uppercase())),
        "string.lower" => Ok(Value::String(text(args, 0, name)?.to_lowercase())),
        "string.trim" => Ok(Value::String(text(args, 0, name)?.trim().to_string())),
        "string.len" => Ok(Value::Number(text(args, 0, name)?.chars().count() as f64)),
        _ => Err(RuntimeError::UnknownCallable(name.to_string())),
    }
}

fn number(args: &[Value], index: usize, name: &str) -> Result<f64, RuntimeError> {
    args.get(index)
        .and_then(Value::as_number)
        .ok_or_else(|| RuntimeError::TypeError(format!("{name}: expected a number at argument {index}")))
}

fn text<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a str, RuntimeError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| RuntimeError::TypeError(format!("{name}: expected a string at argument {index}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_sqrt_computes_exact_square_root() {
        let mut lib = StdLibrary;
        let mut crucible = Crucible::new();
        let outcome = lib.call(&mut crucible, "math.sqrt", vec![Value::Number(16.0)]);
        assert_eq!(outcome, CallOutcome::Value(Value::Number(4.0)));
    }

    #[test]
    fn unknown_callable_is_fatal() {
        let mut lib = StdLibrary;
        let mut crucible = Crucible::new();
        let outcome = lib.call(&mut crucible, "canvas.draw", vec![]);
        assert!(matches!(outcome, CallOutcome::Signal(StepOutcome::Fatal(RuntimeError::UnknownCallable(_)))));
    }

    #[test]
    fn string_helpers_are_flagged_pure_for_folding() {
        let lib = StdLibrary;
        assert!(lib.is_pure("string.upper"));
        assert!(lib.is_pure("math.pow"));
        assert!(!lib.is_pure("canvas.draw"));
    }
}
