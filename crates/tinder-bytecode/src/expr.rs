//! The compiled expression tree.
//!
//! Operator precedence has already been resolved by the parser by the
//! time an `Expr` exists: `BinOp`/`UnOp` nesting directly encodes
//! evaluation order, so `tinder-vm`'s evaluator never reconsiders
//! precedence, only evaluates the tree it's given.

use serde::{Deserialize, Serialize};
use tinder_core::Symbol;

use crate::constant::Const;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// `in`: membership in a sequence/mapping/string.
    In,
    /// `at`: positional lookup, `seq at i`.
    At,
    /// `from`: keyed lookup, `mapping from expr`.
    From,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
}

/// A single fragment of a string-interpolation literal: either a
/// verbatim chunk of source text or an embedded `[[NAME]]` lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InterpFragment {
    Literal(String),
    Lookup(Symbol),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    Const(Const),
    Identifier(Symbol),
    /// `@expr` — the name to look up is itself computed at runtime.
    Indirect(Box<Expr>),
    /// A dot-chain access: `base.a.b.c`, stored as the base plus the
    /// ordered list of segment names. A missing key anywhere past the
    /// first segment resolves to `none`; a missing first segment
    /// (the base identifier itself) is a fatal `TinderBurn`.
    DotChain(Box<Expr>, Vec<Symbol>),
    Sequence(Vec<Expr>),
    Mapping(Vec<(Expr, Expr)>),
    UnOp(UnOp, Box<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    /// A library or user-defined callable invocation. The Crucible is
    /// passed implicitly by the VM, not listed among `args`.
    Call(Symbol, Vec<Expr>),
    Group(Box<Expr>),
    Interpolation(Vec<InterpFragment>),
}
