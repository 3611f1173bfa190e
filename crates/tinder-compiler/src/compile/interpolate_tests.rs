use super::*;

#[test]
fn accepts_a_well_formed_interpolation_lookup() {
    let mut interner = Interner::new();
    let sym = interner.intern("name");
    let line = Line {
        instruction: Instruction::Write(Expr::Interpolation(vec![InterpFragment::Lookup(sym)])),
        condition: None,
        source_line: 1,
    };
    assert!(validate_lines(&[line], &interner).is_ok());
}

#[test]
fn walks_nested_expressions_without_panicking() {
    let mut interner = Interner::new();
    let sym = interner.intern("hp");
    let line = Line {
        instruction: Instruction::Write(Expr::Group(Box::new(Expr::Interpolation(vec![
            InterpFragment::Literal("hp=".into()),
            InterpFragment::Lookup(sym),
        ])))),
        condition: None,
        source_line: 1,
    };
    assert!(validate_lines(&[line], &interner).is_ok());
}
