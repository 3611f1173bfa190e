//! Label handles.
//!
//! Labels are resolved to line indices in two passes during
//! compilation (see `tinder-compiler::compile::labels`): the first pass
//! assigns a `Label` to every `#Name` marker as it is desugared, the
//! second rewrites every jump target from a `Label` to its resolved
//! line index once all labels have been seen.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(pub u32);

impl Label {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
