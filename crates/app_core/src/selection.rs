//! Selection resolution
//!
//! Turns the focused entries of the containing view into the operand set an
//! action applies to.

use app_fs::vpath;
use std::collections::HashSet;

/// Base names focused in the containing view, in focus order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    focused: Vec<String>,
}

impl SelectionSet {
    pub fn new<I, S>(focused: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            focused: focused.into_iter().map(Into::into).collect(),
        }
    }

    pub fn focused(&self) -> &[String] {
        &self.focused
    }

    pub fn len(&self) -> usize {
        self.focused.len()
    }

    pub fn is_empty(&self) -> bool {
        self.focused.is_empty()
    }

    /// The target's base name is among the focused entries
    pub fn contains_target(&self, target: &str) -> bool {
        let name = vpath::basename(target);
        self.focused.iter().any(|entry| entry == name)
    }

    /// Single-selection mode: one focused entry, or the target is not focused
    pub fn is_single_selection(&self, target: &str) -> bool {
        self.focused.len() == 1 || !self.contains_target(target)
    }

    /// Absolute operand paths: the target first, then focused entries
    /// resolved against the target's directory, duplicates removed
    pub fn resolve(&self, target: &str) -> Vec<String> {
        if self.is_single_selection(target) {
            return vec![target.to_string()];
        }

        let directory = vpath::dirname(target);
        let mut seen = HashSet::new();

        std::iter::once(target.to_string())
            .chain(self.focused.iter().map(|entry| vpath::join(directory, entry)))
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }
}
