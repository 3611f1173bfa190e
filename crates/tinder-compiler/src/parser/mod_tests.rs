use super::*;
use crate::ast::Stmt;
use crate::lexer::lex;
use tinder_bytecode::constant::ConstPool;
use tinder_core::Interner;

fn parse(src: &str) -> Script {
    let tokens = lex(src).unwrap();
    let mut interner = Interner::new();
    let mut consts = ConstPool::new();
    parse_script(&tokens, &mut interner, &mut consts).unwrap()
}

#[test]
fn parses_a_set_statement() {
    let script = parse("set health = 10");
    assert!(matches!(script.as_slice(), [Stmt::Set { .. }]));
}

#[test]
fn parses_set_with_the_to_keyword() {
    let script = parse("set health to 10");
    match &script[0] {
        Stmt::Set { names, .. } => assert_eq!(names.as_slice(), ["health"]),
        other => panic!("expected Set, got {other:?}"),
    }
}

#[test]
fn parses_multi_name_set_with_value_replication() {
    let script = parse("set a, b, c = 1, 2");
    match &script[0] {
        Stmt::Set { names, rhs: crate::ast::SetRhs::Values(values), .. } => {
            assert_eq!(names.len(), 3);
            assert_eq!(values.len(), 2);
        }
        other => panic!("expected multi-name Set, got {other:?}"),
    }
}

#[test]
fn parses_set_from_unpack() {
    let script = parse("set q, n from choices");
    match &script[0] {
        Stmt::Set { names, rhs: crate::ast::SetRhs::From(_), .. } => assert_eq!(names.len(), 2),
        other => panic!("expected from-unpack Set, got {other:?}"),
    }
}

#[test]
fn parses_if_elseif_else_endif() {
    let script = parse(
        "if x == 1\nwrite \"one\"\nelseif x == 2\nwrite \"two\"\nelse\nwrite \"other\"\nendif",
    );
    match &script[0] {
        Stmt::If { branches, else_branch, .. } => {
            assert_eq!(branches.len(), 2);
            assert!(else_branch.is_some());
        }
        other => panic!("expected If, got {other:?}"),
    }
}

#[test]
fn parses_foreach_loop() {
    let script = parse("foreach item in inventory\nwrite item\nendfor");
    assert!(matches!(script.as_slice(), [Stmt::Foreach { .. }]));
}

#[test]
fn parses_for_loop() {
    let script = parse("for set i = 0; i < 10; inc i\nwrite i\nendfor");
    assert!(matches!(script.as_slice(), [Stmt::For { .. }]));
}

#[test]
fn parses_else_if_as_two_words() {
    let script = parse(
        "if x == 1\nwrite \"one\"\nelse if x == 2\nwrite \"two\"\nendif",
    );
    match &script[0] {
        Stmt::If { branches, .. } => assert_eq!(branches.len(), 2),
        other => panic!("expected If, got {other:?}"),
    }
}

#[test]
fn parses_keyed_jump() {
    let script = parse("jump @choice from {\n1: #A,\n_: #B,\n}");
    match &script[0] {
        Stmt::Jump { target: crate::ast::JumpSpec::Keyed { cases, default, .. }, .. } => {
            assert_eq!(cases.len(), 1);
            assert!(default.is_some());
        }
        other => panic!("expected keyed jump, got {other:?}"),
    }
}

#[test]
fn keyed_jump_strips_the_leading_at_from_its_key() {
    // `@choice from {...}` dispatches on `choice`'s own value; the `@`
    // marks a dynamic jump target, it doesn't add a second indirect
    // lookup the way a bare `jump @choice` would.
    let script = parse("jump @choice from {\n1: #A,\n_: #B,\n}");
    match &script[0] {
        Stmt::Jump { target: crate::ast::JumpSpec::Keyed { key, .. }, .. } => {
            assert!(matches!(key, Expr::Identifier(_)));
        }
        other => panic!("expected keyed jump, got {other:?}"),
    }
}

#[test]
fn unterminated_if_is_an_error() {
    let tokens = lex("if x\nwrite x").unwrap();
    let mut interner = Interner::new();
    let mut consts = ConstPool::new();
    assert!(parse_script(&tokens, &mut interner, &mut consts).is_err());
}

#[test]
fn dot_chain_access_parses() {
    let script = parse("write player.stats.hp");
    match &script[0] {
        Stmt::Write { value: Expr::DotChain(_, segments), .. } => assert_eq!(segments.len(), 2),
        other => panic!("expected dot chain, got {other:?}"),
    }
}
