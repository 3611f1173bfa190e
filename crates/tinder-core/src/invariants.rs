//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::crucible::Crucible;

impl Crucible {
    /// Panics if the root frame has been popped past. Only ever called
    /// from debug assertions in the runtime crate, never from script
    /// execution paths.
    pub(crate) fn assert_not_empty(&self) {
        assert!(self.depth() >= 1, "Crucible: root frame missing, this is a bug");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_crucible_passes_the_invariant() {
        Crucible::new().assert_not_empty();
    }
}
