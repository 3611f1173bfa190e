use super::*;
use tinder_bytecode::module::LabelTable;

#[test]
fn prepend_shifts_resolved_labels_and_keeps_body_order() {
    let mut interner = Interner::new();
    let mut consts = ConstPool::new();
    let name = interner.intern("top");
    let mut labels = LabelTable::new();
    labels.declare(name, tinder_bytecode::label::Label(0));
    labels.resolve(tinder_bytecode::label::Label(0), 0);

    let body_line = Line { instruction: Instruction::Stop, condition: None, source_line: 1 };
    let mut lowered = Lowered { lines: vec![body_line], source_map: vec![1], labels };

    prepend_dunder_init(&mut lowered, &mut interner, &mut consts);

    assert_eq!(lowered.lines.len(), 3);
    assert_eq!(lowered.labels.line_for_label(tinder_bytecode::label::Label(0)), Some(2));
    assert!(matches!(lowered.lines[2].instruction, Instruction::Stop));
}
