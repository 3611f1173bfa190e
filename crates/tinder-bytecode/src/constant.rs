//! The constant pool.
//!
//! Literal values and constant-folded sub-expressions are hoisted into
//! the pool at compile time so instructions reference them by a small
//! index rather than carrying a `Value` inline. This keeps
//! `Instruction` cheap to copy and gives `ConstAssignment` a single
//! place to check immutability against.

use serde::{Deserialize, Serialize};
use tinder_core::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Const(pub u32);

impl Const {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ConstPool {
    values: Vec<Value>,
}

impl ConstPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a constant value, reusing an existing slot when an
    /// identical value (by `PartialEq`) is already present.
    pub fn intern(&mut self, value: Value) -> Const {
        if let Some(idx) = self.values.iter().position(|v| *v == value) {
            return Const(idx as u32);
        }
        self.values.push(value);
        Const((self.values.len() - 1) as u32)
    }

    pub fn get(&self, id: Const) -> &Value {
        &self.values[id.index()]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
