#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the Tinder compiler and runtime.
//!
//! Two independent layers live here:
//! - The **value model** (`value`) and **Crucible** environment
//!   (`crucible`) that every Tinder script reads and writes.
//! - A **generic PEG grammar engine** (`grammar`, `peg`) that the Tinder
//!   parser is the first, but not the only, consumer of.

mod interner;
mod invariants;

pub mod crucible;
pub mod grammar;
pub mod peg;
pub mod value;

pub use crucible::Crucible;
pub use interner::{Interner, Symbol};
pub use value::Value;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod lib_tests;
