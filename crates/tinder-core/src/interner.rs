//! String interning for identifiers and constant strings.
//!
//! The parser and compiler both need cheap, comparable handles for
//! identifier names and string literals that recur across a script.
//! `Interner` hands out `Symbol`s backed by an `IndexMap` so iteration
//! order matches insertion order, which keeps compiled output
//! deterministic (see the determinism invariant in the data model).

use indexmap::IndexSet;

/// A cheap, `Copy` handle for an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Symbol(u32);

impl Symbol {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct Interner {
    strings: IndexSet<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `s`, returning the same `Symbol` for equal strings.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(idx) = self.strings.get_index_of(s) {
            return Symbol(idx as u32);
        }
        let (idx, _) = self.strings.insert_full(s.to_string());
        Symbol(idx as u32)
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings
            .get_index(sym.index())
            .expect("Symbol not produced by this Interner")
    }

    /// Looks up a string without interning it, for callers that only
    /// want to know whether it was already seen (e.g. matching a raised
    /// error's class name against an installed `catch` handler).
    pub fn find(&self, s: &str) -> Option<Symbol> {
        self.strings.get_index_of(s).map(|idx| Symbol(idx as u32))
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_returns_same_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern("health");
        let b = interner.intern("health");
        assert_eq!(a, b);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = Interner::new();
        let sym = interner.intern("__LINE__");
        assert_eq!(interner.resolve(sym), "__LINE__");
    }

    #[test]
    fn distinct_strings_get_distinct_symbols() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        assert_ne!(a, b);
    }

    #[test]
    fn find_does_not_intern_an_unseen_string() {
        let mut interner = Interner::new();
        interner.intern("health");
        assert_eq!(interner.find("mana"), None);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn find_locates_an_already_interned_string() {
        let mut interner = Interner::new();
        let sym = interner.intern("TinderBurn");
        assert_eq!(interner.find("TinderBurn"), Some(sym));
    }
}
