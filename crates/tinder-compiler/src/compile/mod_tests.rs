use super::*;
use crate::lexer::lex;
use crate::parser::parse_script;

fn compile_source(src: &str) -> CompiledScript {
    let tokens = lex(src).unwrap();
    let mut interner = Interner::new();
    let mut consts = ConstPool::new();
    let script = parse_script(&tokens, &mut interner, &mut consts).unwrap();
    compile_script(&script, &mut interner, &mut consts).unwrap()
}

#[test]
fn dunder_initializers_lead_every_compiled_script() {
    let script = compile_source("write \"hi\"");
    assert!(matches!(
        script.lines[0].instruction,
        tinder_bytecode::Instruction::Set(_, tinder_bytecode::Expr::Const(_))
    ));
    assert!(matches!(
        script.lines[1].instruction,
        tinder_bytecode::Instruction::Set(_, tinder_bytecode::Expr::Const(_))
    ));
}

#[test]
fn constant_folding_collapses_pure_arithmetic_at_compile_time() {
    let script = compile_source("write 2 + 3");
    let folded = script.lines.iter().any(|l| match &l.instruction {
        tinder_bytecode::Instruction::Write(tinder_bytecode::Expr::Const(c)) => {
            *script.constants.get(*c) == tinder_core::Value::Number(5.0)
        }
        _ => false,
    });
    assert!(folded);
}
