use super::*;

#[test]
fn crate_root_reexports_are_usable() {
    let mut c = Crucible::new();
    c.set("x", Value::Number(1.0)).unwrap();
    assert_eq!(c.get("x"), Some(&Value::Number(1.0)));

    let mut interner = Interner::new();
    let sym: Symbol = interner.intern("x");
    assert_eq!(interner.resolve(sym), "x");
}
