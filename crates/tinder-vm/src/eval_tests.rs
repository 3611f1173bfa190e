use super::*;
use tinder_bytecode::expr::BinOp;
use tinder_core::{Crucible, Interner};

fn script_with(interner: Interner, constants: tinder_bytecode::ConstPool) -> CompiledScript {
    let mut script = CompiledScript::new();
    script.interner = interner;
    script.constants = constants;
    script
}

#[test]
fn identifier_lookup_reads_the_crucible() {
    let mut interner = Interner::new();
    let sym = interner.intern("health");
    let script = script_with(interner, tinder_bytecode::ConstPool::new());
    let mut crucible = Crucible::new();
    crucible.declare("health", Value::Number(10.0)).unwrap();
    let mut library = crate::library::EmptyLibrary;

    let result = eval_expr(&Expr::Identifier(sym), &mut crucible, &script, &mut library).unwrap();
    assert_eq!(result, Value::Number(10.0));
}

#[test]
fn identifier_lookup_of_an_undefined_name_is_fatal() {
    let mut interner = Interner::new();
    let sym = interner.intern("ghost");
    let script = script_with(interner, tinder_bytecode::ConstPool::new());
    let mut crucible = Crucible::new();
    let mut library = crate::library::EmptyLibrary;

    let err = eval_expr(&Expr::Identifier(sym), &mut crucible, &script, &mut library).unwrap_err();
    assert!(matches!(err, StepOutcome::Fatal(RuntimeError::MissingVariable(_))));
}

#[test]
fn indirect_lookup_of_an_undefined_target_is_fatal() {
    let mut interner = Interner::new();
    let pointer = interner.intern("which");
    let script = script_with(interner, tinder_bytecode::ConstPool::new());
    let mut crucible = Crucible::new();
    crucible.declare("which", Value::String("ghost".into())).unwrap();
    let mut library = crate::library::EmptyLibrary;

    let expr = Expr::Indirect(Box::new(Expr::Identifier(pointer)));
    let err = eval_expr(&expr, &mut crucible, &script, &mut library).unwrap_err();
    assert!(matches!(err, StepOutcome::Fatal(RuntimeError::MissingVariable(_))));
}

#[test]
fn dot_chain_past_the_first_segment_yields_none_on_a_missing_key() {
    let mut interner = Interner::new();
    let base = interner.intern("player");
    let missing = interner.intern("mana");
    let script = script_with(interner, tinder_bytecode::ConstPool::new());
    let mut crucible = Crucible::new();
    crucible
        .declare("player", Value::Mapping(vec![(Value::String("hp".into()), Value::Number(5.0))]))
        .unwrap();
    let mut library = crate::library::EmptyLibrary;

    let expr = Expr::DotChain(Box::new(Expr::Identifier(base)), vec![missing]);
    let result = eval_expr(&expr, &mut crucible, &script, &mut library).unwrap();
    assert_eq!(result, Value::None);
}

#[test]
fn in_returns_the_needle_when_present_in_a_sequence() {
    let l = Value::Number(2.0);
    let r = Value::Sequence(vec![Value::Number(1.0), Value::Number(2.0)]);
    assert_eq!(eval_in(&l, &r), Value::Number(2.0));
}

#[test]
fn in_returns_none_when_absent() {
    let l = Value::Number(3.0);
    let r = Value::Sequence(vec![Value::Number(1.0), Value::Number(2.0)]);
    assert_eq!(eval_in(&l, &r), Value::None);
}

#[test]
fn at_finds_the_index_of_a_sequence_value() {
    let l = Value::String("b".into());
    let r = Value::Sequence(vec![Value::String("a".into()), Value::String("b".into())]);
    assert_eq!(eval_at(&l, &r), Value::Number(1.0));
}

#[test]
fn from_looks_up_a_mapping_by_key() {
    let key = Value::String("hp".into());
    let mapping = Value::Mapping(vec![(Value::String("hp".into()), Value::Number(7.0))]);
    assert_eq!(eval_from(&key, &mapping), Value::Number(7.0));
}

#[test]
fn from_missing_key_yields_none() {
    let key = Value::String("mp".into());
    let mapping = Value::Mapping(vec![(Value::String("hp".into()), Value::Number(7.0))]);
    assert_eq!(eval_from(&key, &mapping), Value::None);
}

#[test]
fn coerce_string_renders_none_as_empty() {
    assert_eq!(coerce_string(&Value::None), "");
    assert_eq!(coerce_string(&Value::Number(4.0)), "4");
}

#[test]
fn len_intrinsic_counts_a_sequence() {
    let args = vec![Value::Sequence(vec![Value::Number(1.0), Value::Number(2.0)])];
    assert_eq!(invoke("len", args, &mut Crucible::new(), &mut crate::library::EmptyLibrary), Ok(Value::Number(2.0)));
}

#[test]
fn iter_single_binds_the_key_for_a_mapping() {
    let args = vec![
        Value::Mapping(vec![(Value::String("a".into()), Value::Number(1.0)), (Value::String("b".into()), Value::Number(2.0))]),
        Value::Number(1.0),
    ];
    let result = invoke("__iter_single", args, &mut Crucible::new(), &mut crate::library::EmptyLibrary).unwrap();
    assert_eq!(result, Value::String("b".into()));
}

#[test]
fn iter_single_binds_the_element_for_a_sequence() {
    let args = vec![Value::Sequence(vec![Value::Number(10.0), Value::Number(20.0)]), Value::Number(1.0)];
    let result = invoke("__iter_single", args, &mut Crucible::new(), &mut crate::library::EmptyLibrary).unwrap();
    assert_eq!(result, Value::Number(20.0));
}

#[test]
fn binop_and_short_circuits_without_evaluating_the_missing_right_side() {
    let mut interner = Interner::new();
    let ghost = interner.intern("ghost");
    let mut consts = tinder_bytecode::ConstPool::new();
    let false_const = consts.intern(Value::Boolean(false));
    let script = script_with(interner, consts);
    let mut crucible = Crucible::new();
    let mut library = crate::library::EmptyLibrary;

    let expr = Expr::BinOp(BinOp::And, Box::new(Expr::Const(false_const)), Box::new(Expr::Identifier(ghost)));
    let result = eval_expr(&expr, &mut crucible, &script, &mut library).unwrap();
    assert_eq!(result, Value::Boolean(false));
}
