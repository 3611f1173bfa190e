//! The Crucible: Tinder's nested variable environment.
//!
//! A Crucible is a parent-chained stack of maps. Reads walk up the
//! chain until a slot is found; writes go to the innermost frame that
//! already defines the name, falling back to the innermost frame when
//! the name is new. Dunder names (`__LINE__`, `__CONDITION__`, ...) are
//! reserved: a script cannot declare a variable whose name starts with
//! a double underscore, but the interpreter writes them directly
//! through `set_dunder`.

use indexmap::IndexMap;
use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CrucibleError {
    #[error("variable is constant and cannot be reassigned")]
    ConstAssignment,
    #[error("dunder variables cannot be declared by a script")]
    ReservedName,
    #[error("constant already defined")]
    AlreadyDefined,
    #[error("variable is host-protected and cannot be written")]
    Protected,
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    constant: bool,
    protected: bool,
}

/// One level of nested scope (a loop body, an imported script, a
/// library call's local frame).
#[derive(Debug, Default, Clone)]
struct Frame {
    slots: IndexMap<String, Slot>,
}

#[derive(Debug, Clone)]
pub struct Crucible {
    frames: Vec<Frame>,
}

impl Default for Crucible {
    fn default() -> Self {
        Self::new()
    }
}

impl Crucible {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Pushes a fresh child frame (entering a loop body or import).
    pub fn push_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pops the innermost frame. No-op (and a bug if it happens) at the
    /// root: the interpreter must never pop past the initial frame.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        self.assert_not_empty();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Walks the frame chain from innermost to outermost, returning the
    /// first match. Absent names resolve to `Value::None` by the
    /// interpreter's contract, not here — callers decide that.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.slots.get(name).map(|slot| &slot.value))
    }

    /// Declares or overwrites `name` in the innermost frame.
    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), CrucibleError> {
        if is_dunder(name) {
            return Err(CrucibleError::ReservedName);
        }
        let frame = self.frames.last_mut().expect("Crucible always has a root frame");
        frame.slots.insert(
            name.to_string(),
            Slot {
                value,
                constant: false,
                protected: false,
            },
        );
        Ok(())
    }

    /// Declares a constant slot; later `set` calls on this name fail.
    /// Redeclaring a name already visible anywhere in the frame chain
    /// is itself a fatal error (`const` never silently rebinds).
    pub fn declare_const(&mut self, name: &str, value: Value) -> Result<(), CrucibleError> {
        if is_dunder(name) {
            return Err(CrucibleError::ReservedName);
        }
        if self.contains(name) {
            return Err(CrucibleError::AlreadyDefined);
        }
        let frame = self.frames.last_mut().expect("Crucible always has a root frame");
        frame.slots.insert(
            name.to_string(),
            Slot {
                value,
                constant: true,
                protected: false,
            },
        );
        Ok(())
    }

    /// Declares a host-protected slot: rejects every subsequent write,
    /// including `set_dunder`-style direct writes, until the frame it
    /// lives in is popped.
    pub fn declare_protected(&mut self, name: &str, value: Value) {
        let frame = self.frames.last_mut().expect("Crucible always has a root frame");
        frame.slots.insert(name.to_string(), Slot { value, constant: false, protected: true });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|frame| frame.slots.contains_key(name))
    }

    /// Writes to the nearest frame that already declares `name`,
    /// otherwise declares it fresh in the innermost frame (an
    /// undeclared `set` is how most Tinder scripts introduce state).
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), CrucibleError> {
        if is_dunder(name) {
            return Err(CrucibleError::ReservedName);
        }
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.slots.get_mut(name) {
                if slot.protected {
                    return Err(CrucibleError::Protected);
                }
                if slot.constant {
                    return Err(CrucibleError::ConstAssignment);
                }
                slot.value = value;
                return Ok(());
            }
        }
        self.declare(name, value)
    }

    /// Writes a dunder variable directly, bypassing the reserved-name
    /// check the interpreter itself is exempt from.
    pub fn set_dunder(&mut self, name: &str, value: Value) {
        debug_assert!(is_dunder(name), "set_dunder called with non-dunder name {name}");
        let frame = self.frames.last_mut().expect("Crucible always has a root frame");
        frame.slots.insert(
            name.to_string(),
            Slot {
                value,
                constant: false,
                protected: false,
            },
        );
    }

    pub fn is_const(&self, name: &str) -> bool {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.slots.get(name))
            .is_some_and(|slot| slot.constant)
    }
}

pub fn is_dunder(name: &str) -> bool {
    name.starts_with("__") && name.ends_with("__")
}

#[cfg(test)]
#[path = "crucible_tests.rs"]
mod crucible_tests;
