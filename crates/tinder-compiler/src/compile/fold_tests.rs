use super::*;
use tinder_bytecode::expr::BinOp;
use tinder_core::Value;

#[test]
fn folds_pure_arithmetic_into_a_single_const() {
    let mut consts = ConstPool::new();
    let two = consts.intern(Value::Number(2.0));
    let three = consts.intern(Value::Number(3.0));
    let mut expr = Expr::BinOp(BinOp::Add, Box::new(Expr::Const(two)), Box::new(Expr::Const(three)));
    fold_expr(&mut expr, &mut consts);
    match expr {
        Expr::Const(c) => assert_eq!(*consts.get(c), Value::Number(5.0)),
        other => panic!("expected folded const, got {other:?}"),
    }
}

#[test]
fn leaves_identifier_reads_unfolded() {
    let mut consts = ConstPool::new();
    let one = consts.intern(Value::Number(1.0));
    let sym = tinder_core::Interner::new().intern("x");
    let mut expr = Expr::BinOp(BinOp::Add, Box::new(Expr::Identifier(sym)), Box::new(Expr::Const(one)));
    fold_expr(&mut expr, &mut consts);
    assert!(matches!(expr, Expr::BinOp(..)));
}

#[test]
fn leaves_division_by_zero_unfolded_for_the_vm_to_raise() {
    let mut consts = ConstPool::new();
    let n = consts.intern(Value::Number(1.0));
    let zero = consts.intern(Value::Number(0.0));
    let mut expr = Expr::BinOp(BinOp::Div, Box::new(Expr::Const(n)), Box::new(Expr::Const(zero)));
    fold_expr(&mut expr, &mut consts);
    assert!(matches!(expr, Expr::BinOp(..)));
}
