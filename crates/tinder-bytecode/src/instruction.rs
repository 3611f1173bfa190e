//! The flat instruction set Firestarter emits and `tinder-vm` executes.
//!
//! Every instruction is a statement; expressions only ever appear as
//! operands. A `Line` pairs an `Instruction` with an optional guard
//! expression (the desugared form of `if`/`elseif`, see
//! `tinder-compiler::compile::desugar`) and the originating source line
//! number, which the interpreter copies into `__LINE__` before
//! evaluating the guard.

use serde::{Deserialize, Serialize};
use tinder_core::Symbol;

use crate::expr::Expr;
use crate::label::Label;

/// Where a `Jump` instruction sends control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JumpTarget {
    /// A target resolved at compile time.
    Direct(Label),
    /// `jump @expr` — the target name is computed at runtime and
    /// looked up in the script's label table by name.
    Indirect(Expr),
    /// `jump @expr from { key: label, ... }` — evaluate `expr`, use it
    /// as a mapping key into the listed label targets. `default` is
    /// the resolved target for the literal `_` catch-all key, when
    /// present; an unmatched key with no catch-all is a fatal error.
    Keyed {
        key: Expr,
        cases: Vec<(Expr, Label)>,
        default: Option<Label>,
    },
    /// An explicit `jump #A` where `#A` is an `#A or B` label. Always
    /// lands on `primary` itself — the `or` redirect only ever fires
    /// on natural fallthrough arrival, handled by `primary`'s own
    /// `LabelHit` marker, not here.
    OrLabel { primary: Label, fallback: Label },
}

/// Where a `put` statement inserts its value relative to the named
/// sequence's existing contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PutPosition {
    /// `put v before name` — insert at the head of the sequence.
    Before,
    /// `put v after name` — insert at the tail of the sequence.
    After,
}

/// The right-hand side of a `SetMulti` instruction — see `Set names,
/// values` in the interpreter contract: `Values` zips left-to-right
/// against the name list, replicating the last value over any extra
/// names; `From` unpacks a sequence or mapping, with missing slots
/// becoming `none`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SetRhs {
    Values(Vec<Expr>),
    From(Expr),
}

/// The fully-resolved payload of an `import` instruction. Library and
/// alias names are interned identifiers rather than expressions —
/// both `import math` and `from math import sqrt` always name the
/// library literally, never compute it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTarget {
    pub library: Symbol,
    pub alias: Option<Symbol>,
    pub symbols: Option<Vec<Symbol>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Instruction {
    /// Appends `expr`'s rendered value to the host output sink.
    Write(Expr),
    /// Calls a library callable for effect, discarding its result.
    Call(Symbol, Vec<Expr>),
    /// `set name = expr` — the single-name, single-value case, which
    /// covers the overwhelming majority of assignments and every
    /// dunder/cursor write the compiler emits on its own.
    Set(Symbol, Expr),
    /// `set a, b = v1, v2` / `set a, b from seq` — the general `Set
    /// names, values` form: more than one name, or an explicit `from`
    /// unpack. See `SetRhs`.
    SetMulti { names: Vec<Symbol>, rhs: SetRhs },
    /// `const name = expr` — declares an immutable Crucible slot.
    Const(Symbol, Expr),
    /// `name += 1` sugar.
    Inc(Symbol),
    /// `name -= 1` sugar.
    Dec(Symbol),
    /// `put v before/after name` — inserts at the head or tail of the
    /// sequence named `name`.
    Put(Symbol, Expr, PutPosition),
    /// Swaps the values of two Crucible slots.
    Swap(Symbol, Symbol),
    /// Suspends execution requesting a host-supplied value for `name`;
    /// resumes at the next instruction once the host writes it back
    /// and calls `run`/`step` again.
    Input(Symbol),
    /// Suspends execution, handing `expr`'s value to the host as the
    /// `Yielded` signal payload.
    Yield(Option<Expr>),
    /// Halts the script normally.
    Stop,
    Jump(JumpTarget),
    /// Returns to the caller's saved line, per the return-pairing
    /// invariant (every `Return` must be reached via a prior call that
    /// pushed a return address).
    Return,
    /// Requests that the host import another compiled script at this
    /// point; execution resumes in the current script once the host
    /// signals the import is complete.
    Import(ImportTarget),
    /// Installs (or replaces) a handler in the interrupt table: any
    /// fatal error in the named class that originates after this line
    /// and before the handler is superseded jumps to `target` instead
    /// of raising `TinderBurn`.
    Catch { error_class: Symbol, target: Label },
    /// A marker emitted at every label site. When `fallback` is
    /// `Some`, arriving here by straight-line fallthrough (not via an
    /// explicit jump to this label) redirects the PC to `fallback`
    /// instead of continuing to the next line — the `#A or B` form.
    /// Arriving via an explicit jump to this label is always a no-op.
    LabelHit(Label, Option<Label>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub instruction: Instruction,
    pub condition: Option<Expr>,
    pub source_line: u32,
}
