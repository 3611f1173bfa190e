//! A generic PEG evaluator.
//!
//! `parse` walks a [`GrammarDef`] against a source string starting from
//! a chosen rule, producing a [`ParseTree`] or a [`ParseError`]
//! reporting the furthest position any alternative reached before
//! failing (the usual "longest prefix" diagnostic for PEGs, since a
//! plain first-failure report tends to point at the wrong branch of an
//! ordered choice).
//!
//! Implicit whitespace skipping happens between the elements of a
//! `Sequence` belonging to a [`RuleKind::Normal`] rule; [`RuleKind::Strict`]
//! rules (and anything nested under one, until a normal rule is
//! entered again) see raw input instead.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::grammar::{GrammarDef, PegExpr, Rule, RuleKind};
use crate::interner::Symbol;

#[derive(Debug, Clone)]
pub struct ParseTree {
    pub rule: Symbol,
    pub start: usize,
    pub end: usize,
    pub children: Vec<ParseTree>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub position: usize,
    pub expected: Vec<String>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at byte {}: expected one of {:?}", self.position, self.expected)
    }
}

impl std::error::Error for ParseError {}

struct Ctx<'g, 's> {
    grammar: &'g GrammarDef,
    input: &'s str,
    furthest_fail: usize,
    furthest_expected: Vec<String>,
    regex_cache: HashMap<String, Regex>,
}

impl<'g, 's> Ctx<'g, 's> {
    fn record_fail(&mut self, pos: usize, expected: &str) {
        if pos > self.furthest_fail {
            self.furthest_fail = pos;
            self.furthest_expected.clear();
            self.furthest_expected.push(expected.to_string());
        } else if pos == self.furthest_fail {
            self.furthest_expected.push(expected.to_string());
        }
    }

    fn skip_ws(&self, pos: usize) -> usize {
        self.input[pos..]
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| pos + i)
            .unwrap_or(self.input.len())
    }

    fn compiled_regex(&mut self, pattern: &str) -> &Regex {
        if !self.regex_cache.contains_key(pattern) {
            let anchored = format!("^(?:{pattern})");
            let compiled = Regex::new(&anchored).unwrap_or_else(|err| panic!("grammar references invalid regex {pattern:?}: {err}"));
            self.regex_cache.insert(pattern.to_string(), compiled);
        }
        &self.regex_cache[pattern]
    }

    fn rule_by_name(&self, name: Symbol) -> &'g Rule {
        let idx = self
            .grammar
            .rule_index(name)
            .unwrap_or_else(|| panic!("grammar references undefined rule"));
        &self.grammar.rules[idx]
    }

    fn eval_rule(&mut self, rule: &'g Rule, pos: usize, strict: bool) -> Option<(usize, Vec<ParseTree>)> {
        let strict = strict || rule.kind == RuleKind::Strict;
        let (end, children) = self.eval_expr(&rule.expr, pos, strict)?;
        Some((end, children))
    }

    fn eval_expr(&mut self, expr: &'g PegExpr, pos: usize, strict: bool) -> Option<(usize, Vec<ParseTree>)> {
        match expr {
            PegExpr::Literal(lit) => {
                if self.input[pos..].starts_with(lit.as_str()) {
                    Some((pos + lit.len(), vec![]))
                } else {
                    self.record_fail(pos, &format!("{lit:?}"));
                    None
                }
            }
            PegExpr::Regex(pattern) => {
                let re = self.compiled_regex(pattern);
                match re.find(&self.input[pos..]) {
                    Some(m) => Some((pos + m.end(), vec![])),
                    None => {
                        self.record_fail(pos, &format!("/{pattern}/"));
                        None
                    }
                }
            }
            PegExpr::RuleRef(name) => {
                let rule = self.rule_by_name(*name);
                let (end, children) = self.eval_rule(rule, pos, strict)?;
                match rule.kind {
                    RuleKind::Hidden => Some((end, vec![])),
                    RuleKind::Inline => Some((end, children)),
                    RuleKind::Normal | RuleKind::Strict => Some((
                        end,
                        vec![ParseTree {
                            rule: *name,
                            start: pos,
                            end,
                            children,
                        }],
                    )),
                }
            }
            PegExpr::Choice(alts) => {
                for alt in alts {
                    if let Some(result) = self.eval_expr(alt, pos, strict) {
                        return Some(result);
                    }
                }
                None
            }
            PegExpr::Sequence(items) => {
                let mut cursor = pos;
                let mut out = vec![];
                for (i, item) in items.iter().enumerate() {
                    if i > 0 && !strict {
                        cursor = self.skip_ws(cursor);
                    }
                    let (end, mut children) = self.eval_expr(item, cursor, strict)?;
                    out.append(&mut children);
                    cursor = end;
                }
                Some((cursor, out))
            }
            PegExpr::And(inner) => {
                self.eval_expr(inner, pos, strict)?;
                Some((pos, vec![]))
            }
            PegExpr::Not(inner) => {
                if self.eval_expr(inner, pos, strict).is_some() {
                    self.record_fail(pos, "negative lookahead failed");
                    None
                } else {
                    Some((pos, vec![]))
                }
            }
            PegExpr::Optional(inner) => match self.eval_expr(inner, pos, strict) {
                Some(result) => Some(result),
                None => Some((pos, vec![])),
            },
            PegExpr::ZeroOrMore(inner) => {
                let mut cursor = pos;
                let mut out = vec![];
                loop {
                    let probe = if strict { cursor } else { self.skip_ws(cursor) };
                    match self.eval_expr(inner, probe, strict) {
                        Some((end, mut children)) if end > cursor || !children.is_empty() => {
                            out.append(&mut children);
                            cursor = end;
                        }
                        _ => break,
                    }
                }
                Some((cursor, out))
            }
            PegExpr::OneOrMore(inner) => {
                let (first_end, mut out) = self.eval_expr(inner, pos, strict)?;
                let mut cursor = first_end;
                loop {
                    let probe = if strict { cursor } else { self.skip_ws(cursor) };
                    match self.eval_expr(inner, probe, strict) {
                        Some((end, mut children)) if end > cursor || !children.is_empty() => {
                            out.append(&mut children);
                            cursor = end;
                        }
                        _ => break,
                    }
                }
                Some((cursor, out))
            }
            PegExpr::Group(inner) => self.eval_expr(inner, pos, strict),
        }
    }
}

/// Parses `input` against `grammar`, starting from the rule named
/// `start_rule`.
pub fn parse(grammar: &GrammarDef, start_rule: Symbol, input: &str) -> Result<ParseTree, ParseError> {
    let mut ctx = Ctx {
        grammar,
        input,
        furthest_fail: 0,
        furthest_expected: vec![],
        regex_cache: HashMap::new(),
    };
    let rule = ctx.rule_by_name(start_rule);
    match ctx.eval_rule(rule, 0, false) {
        Some((end, children)) => Ok(ParseTree {
            rule: start_rule,
            start: 0,
            end,
            children,
        }),
        None => Err(ParseError {
            position: ctx.furthest_fail,
            expected: ctx.furthest_expected,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interner;

    fn digits_grammar(interner: &mut Interner) -> (GrammarDef, Symbol) {
        let digit = interner.intern("digit");
        let number = interner.intern("number");
        let grammar = GrammarDef {
            rules: vec![
                Rule {
                    name: digit,
                    kind: RuleKind::Hidden,
                    expr: PegExpr::Choice(
                        "0123456789".chars().map(|c| PegExpr::Literal(c.to_string())).collect(),
                    ),
                },
                Rule {
                    name: number,
                    kind: RuleKind::Normal,
                    expr: PegExpr::OneOrMore(Box::new(PegExpr::RuleRef(digit))),
                },
            ],
        };
        (grammar, number)
    }

    #[test]
    fn matches_one_or_more_digits() {
        let mut interner = Interner::new();
        let (grammar, number) = digits_grammar(&mut interner);
        let tree = parse(&grammar, number, "42").unwrap();
        assert_eq!(tree.end, 2);
    }

    #[test]
    fn reports_furthest_failure_position() {
        let mut interner = Interner::new();
        let (grammar, number) = digits_grammar(&mut interner);
        let err = parse(&grammar, number, "").unwrap_err();
        assert_eq!(err.position, 0);
    }

    #[test]
    fn normal_rules_skip_whitespace_between_sequence_items() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let pair = interner.intern("pair");
        let grammar = GrammarDef {
            rules: vec![
                Rule { name: a, kind: RuleKind::Hidden, expr: PegExpr::Literal("a".into()) },
                Rule { name: b, kind: RuleKind::Hidden, expr: PegExpr::Literal("b".into()) },
                Rule {
                    name: pair,
                    kind: RuleKind::Normal,
                    expr: PegExpr::Sequence(vec![PegExpr::RuleRef(a), PegExpr::RuleRef(b)]),
                },
            ],
        };
        let tree = parse(&grammar, pair, "a   b").unwrap();
        assert_eq!(tree.end, 5);
    }

    #[test]
    fn regex_atom_matches_anchored_at_position() {
        let mut interner = Interner::new();
        let word = interner.intern("word");
        let grammar = GrammarDef {
            rules: vec![Rule { name: word, kind: RuleKind::Normal, expr: PegExpr::Regex("[a-zA-Z]+".into()) }],
        };
        let tree = parse(&grammar, word, "hello world").unwrap();
        assert_eq!(tree.end, 5);
        assert!(parse(&grammar, word, "  hello").is_err());
    }

    #[test]
    fn strict_rules_do_not_skip_whitespace() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let pair = interner.intern("pair");
        let grammar = GrammarDef {
            rules: vec![
                Rule { name: a, kind: RuleKind::Hidden, expr: PegExpr::Literal("a".into()) },
                Rule { name: b, kind: RuleKind::Hidden, expr: PegExpr::Literal("b".into()) },
                Rule {
                    name: pair,
                    kind: RuleKind::Strict,
                    expr: PegExpr::Sequence(vec![PegExpr::RuleRef(a), PegExpr::RuleRef(b)]),
                },
            ],
        };
        assert!(parse(&grammar, pair, "a b").is_err());
        assert!(parse(&grammar, pair, "ab").is_ok());
    }
}
