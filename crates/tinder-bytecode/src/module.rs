//! `CompiledScript`: the artifact the compiler hands the VM.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tinder_core::{Interner, Symbol};

use crate::constant::ConstPool;
use crate::instruction::Line;
use crate::label::Label;

/// Maps label names (and synthetic compiler-generated labels) to a
/// resolved line index. Built in the compiler's first label-resolution
/// pass and then treated as read-only by the VM.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LabelTable {
    by_name: IndexMap<Symbol, Label>,
    line_of: IndexMap<Label, u32>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: Symbol, label: Label) {
        self.by_name.insert(name, label);
    }

    pub fn resolve(&mut self, label: Label, line: u32) {
        self.line_of.insert(label, line);
    }

    pub fn label_for_name(&self, name: Symbol) -> Option<Label> {
        self.by_name.get(&name).copied()
    }

    pub fn line_for_label(&self, label: Label) -> Option<u32> {
        self.line_of.get(&label).copied()
    }

    /// Every declared label must resolve to a line: this is the
    /// "label totality" invariant, checked once at the end of
    /// compilation rather than on every jump at run time.
    pub fn is_total(&self) -> bool {
        self.by_name.values().all(|label| self.line_of.contains_key(label))
    }

    /// Shifts every resolved line index by `by`, used when lines are
    /// prepended ahead of the already-desugared body (dunder
    /// initializers).
    pub fn shift(&mut self, by: u32) {
        for line in self.line_of.values_mut() {
            *line += by;
        }
    }
}

/// The live interrupt (catch) table: which error classes currently
/// have a handler installed, and where that handler jumps to. Distinct
/// from `LabelTable` because catch handlers are installed and
/// superseded dynamically as the script runs, not fixed at compile
/// time.
#[derive(Debug, Default, Clone)]
pub struct InterruptTable {
    handlers: IndexMap<Symbol, Label>,
}

impl InterruptTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, error_class: Symbol, target: Label) {
        self.handlers.insert(error_class, target);
    }

    pub fn handler_for(&self, error_class: Symbol) -> Option<Label> {
        self.handlers.get(&error_class).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledScript {
    pub lines: Vec<Line>,
    pub labels: LabelTable,
    pub constants: ConstPool,
    /// `source_map[i]` is the 1-based source line that produced
    /// `lines[i]`, preserved even after desugaring collapses multiple
    /// source lines into one compiled line or expands one source line
    /// into several.
    pub source_map: Vec<u32>,
    /// Symbol table backing every `Symbol` referenced by `lines`, kept
    /// alongside the artifact so a host can resolve names for
    /// diagnostics without access to the compiler that produced it.
    pub interner: Interner,
}

impl CompiledScript {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            labels: LabelTable::new(),
            constants: ConstPool::new(),
            source_map: Vec::new(),
            interner: Interner::new(),
        }
    }

    pub fn push_line(&mut self, line: Line, source_line: u32) -> u32 {
        let idx = self.lines.len() as u32;
        self.lines.push(line);
        self.source_map.push(source_line);
        idx
    }

    /// Serializes the artifact to postcard's compact binary form, so a
    /// host can cache a compiled script to disk instead of recompiling
    /// the same source text on every run.
    pub fn to_postcard(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Inverse of [`to_postcard`](Self::to_postcard).
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

impl Default for CompiledScript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinder_core::Interner;

    #[test]
    fn label_table_totality_fails_until_resolved() {
        let mut interner = Interner::new();
        let name = interner.intern("loop_top");
        let mut table = LabelTable::new();
        let label = Label(0);
        table.declare(name, label);
        assert!(!table.is_total());
        table.resolve(label, 3);
        assert!(table.is_total());
    }

    #[test]
    fn interrupt_table_last_install_wins() {
        let mut interner = Interner::new();
        let class = interner.intern("io_error");
        let mut table = InterruptTable::new();
        table.install(class, Label(0));
        table.install(class, Label(1));
        assert_eq!(table.handler_for(class), Some(Label(1)));
    }

    #[test]
    fn compiled_script_round_trips_through_postcard() {
        let mut script = CompiledScript::new();
        let name = script.interner.intern("hp");
        let label = Label(0);
        script.labels.declare(name, label);
        script.labels.resolve(label, 0);

        let bytes = script.to_postcard().unwrap();
        let restored = CompiledScript::from_postcard(&bytes).unwrap();
        assert_eq!(restored.labels.label_for_name(name), Some(label));
        assert!(restored.labels.is_total());
    }
}
