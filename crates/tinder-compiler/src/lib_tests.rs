use super::*;

#[test]
fn compiles_a_linear_set_and_write_script() {
    let script = compile("set a = 2\nset b = a + 3\nwrite \"answer=[[b]]\"").unwrap();
    assert!(script.labels.is_total());
    assert!(script.lines.len() >= 3 + 2); // +2 for the dunder initializers
}

#[test]
fn compiles_the_to_assignment_form() {
    let script = compile("set a to 2\nset b to a + 3\nwrite \"answer=[[b]]\"").unwrap();
    assert!(script.labels.is_total());
    assert!(script.lines.len() >= 3 + 2);
}

#[test]
fn compiles_a_multi_name_set_with_value_replication() {
    let script = compile("set a, b, c = 1, 2").unwrap();
    let multi = script
        .lines
        .iter()
        .find(|l| matches!(l.instruction, tinder_bytecode::Instruction::SetMulti { .. }));
    assert!(multi.is_some());
}

#[test]
fn compiles_a_multi_name_set_from_unpack() {
    let script = compile("set q, n from choices").unwrap();
    let multi = script
        .lines
        .iter()
        .find(|l| matches!(l.instruction, tinder_bytecode::Instruction::SetMulti { .. }));
    assert!(multi.is_some());
}

#[test]
fn or_label_fallthrough_compiles_and_resolves_both_labels() {
    let script = compile("#end or retry\nstop\n#retry\nwrite \"again\"").unwrap();
    assert!(script.labels.is_total());
}

#[test]
fn const_rewrite_is_a_runtime_concern_not_a_compile_error() {
    let script = compile("const MAX = 5\nset MAX = 6");
    assert!(script.is_ok());
}

#[test]
fn break_outside_a_loop_is_a_compile_error() {
    let err = compile("break").unwrap_err();
    assert!(matches!(err, CompileError::BreakOutsideLoop { .. }));
}

#[test]
fn jump_to_an_undefined_label_is_a_compile_error() {
    let err = compile("jump #nowhere").unwrap_err();
    assert!(matches!(err, CompileError::UndefinedLabel { .. }));
}

#[test]
fn if_elseif_else_compiles_to_a_total_label_set() {
    let script = compile(
        "if x == 1\nwrite \"one\"\nelseif x == 2\nwrite \"two\"\nelse\nwrite \"other\"\nendif",
    )
    .unwrap();
    assert!(script.labels.is_total());
}

#[test]
fn foreach_loop_compiles_with_cursor_dunders_referenced() {
    let script = compile("foreach item in inventory\nwrite item\nendfor").unwrap();
    assert!(script.labels.is_total());
}

#[test]
fn two_variable_foreach_compiles_with_a_total_label_set() {
    let script = compile("foreach k, v in scores\nwrite k\nendfor").unwrap();
    assert!(script.labels.is_total());
}

#[test]
fn trailing_if_modifier_attaches_a_condition_to_the_line() {
    let script = compile("stop if x").unwrap();
    let has_guarded_stop =
        script.lines.iter().any(|l| matches!(l.instruction, tinder_bytecode::Instruction::Stop) && l.condition.is_some());
    assert!(has_guarded_stop);
}
