//! The Tinder lexical grammar, expressed as data for `tinder_core::peg`.
//!
//! The production compiler pipeline (`lexer` + `parser`) is a
//! hand-rolled recursive-descent implementation for speed and
//! line-oriented error reporting, but the atoms of Tinder's lexical
//! grammar are also expressible — and tested here — as a plain
//! `GrammarDef`, proving the PEG engine is a genuine reusable
//! component and not a special case the compiler hard-codes around.

use tinder_core::grammar::{GrammarDef, PegExpr, Rule, RuleKind};
use tinder_core::Interner;

/// Builds a `GrammarDef` describing Tinder's numeric and identifier
/// atoms, interning rule names into `interner`.
pub fn lexical_atoms(interner: &mut Interner) -> GrammarDef {
    let digit = interner.intern("digit");
    let digits = interner.intern("digits");
    let number = interner.intern("number");
    let ident_start = interner.intern("ident_start");
    let ident_char = interner.intern("ident_char");
    let identifier = interner.intern("identifier");

    let digit_choice = PegExpr::Choice("0123456789".chars().map(|c| PegExpr::Literal(c.to_string())).collect());
    let alpha_choice = |chars: &str| -> PegExpr {
        PegExpr::Choice(chars.chars().map(|c| PegExpr::Literal(c.to_string())).collect())
    };
    let ascii_alpha_underscore: String = ('a'..='z').chain('A'..='Z').chain(std::iter::once('_')).collect();
    let ascii_alnum_underscore: String =
        ('a'..='z').chain('A'..='Z').chain('0'..='9').chain(std::iter::once('_')).collect();

    GrammarDef {
        rules: vec![
            Rule { name: digit, kind: RuleKind::Hidden, expr: digit_choice.clone() },
            Rule {
                name: digits,
                kind: RuleKind::Inline,
                expr: PegExpr::OneOrMore(Box::new(PegExpr::RuleRef(digit))),
            },
            Rule {
                name: number,
                kind: RuleKind::Strict,
                expr: PegExpr::Sequence(vec![
                    PegExpr::RuleRef(digits),
                    PegExpr::Optional(Box::new(PegExpr::Sequence(vec![
                        PegExpr::Literal(".".into()),
                        PegExpr::RuleRef(digits),
                    ]))),
                ]),
            },
            Rule { name: ident_start, kind: RuleKind::Hidden, expr: alpha_choice(&ascii_alpha_underscore) },
            Rule { name: ident_char, kind: RuleKind::Hidden, expr: alpha_choice(&ascii_alnum_underscore) },
            Rule {
                name: identifier,
                kind: RuleKind::Strict,
                expr: PegExpr::Sequence(vec![
                    PegExpr::RuleRef(ident_start),
                    PegExpr::ZeroOrMore(Box::new(PegExpr::RuleRef(ident_char))),
                ]),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinder_core::peg::parse;

    #[test]
    fn number_rule_matches_decimal_literal() {
        let mut interner = Interner::new();
        let grammar = lexical_atoms(&mut interner);
        let number = interner.intern("number");
        let tree = parse(&grammar, number, "42.5").unwrap();
        assert_eq!(tree.end, 4);
    }

    #[test]
    fn identifier_rule_matches_underscored_name() {
        let mut interner = Interner::new();
        let grammar = lexical_atoms(&mut interner);
        let identifier = interner.intern("identifier");
        let tree = parse(&grammar, identifier, "__LINE__ rest").unwrap();
        assert_eq!(tree.end, 8);
    }

    #[test]
    fn identifier_rule_rejects_leading_digit() {
        let mut interner = Interner::new();
        let grammar = lexical_atoms(&mut interner);
        let identifier = interner.intern("identifier");
        assert!(parse(&grammar, identifier, "9abc").is_err());
    }
}
