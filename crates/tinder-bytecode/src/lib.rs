//! The compiled-script artifact Firestarter produces and the VM runs.
//!
//! This crate owns `Instruction`, `Expr`, labels, the constant pool,
//! and `CompiledScript` itself — the boundary between compile time and
//! run time. It has no knowledge of Tinder source syntax; it only
//! knows the flat, already-desugared shape a script takes once
//! compiled.

pub mod constant;
pub mod expr;
pub mod instruction;
pub mod label;
pub mod module;

pub use constant::{Const, ConstPool};
pub use expr::Expr;
pub use instruction::{ImportTarget, Instruction, PutPosition};
pub use label::Label;
pub use module::{CompiledScript, InterruptTable, LabelTable};
