//! Ordered contribution pipeline
//!
//! Rules never mutate the menu directly. Each returns a `Contribution` that
//! the `MenuAssembler` places at the head or tail of the list in rule order,
//! so a later prepend surfaces above an earlier one.

use crate::menu::MenuEntry;
use std::collections::VecDeque;

/// Where a contribution lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Prepend,
    Append,
}

/// Entries produced by one rule
#[derive(Debug, Clone)]
pub struct Contribution {
    pub mode: Insertion,
    pub entries: Vec<MenuEntry>,
}

impl Contribution {
    pub fn prepend(entries: Vec<MenuEntry>) -> Self {
        Self {
            mode: Insertion::Prepend,
            entries,
        }
    }

    pub fn append(entries: Vec<MenuEntry>) -> Self {
        Self {
            mode: Insertion::Append,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates contributions and produces the final menu
#[derive(Debug, Default)]
pub struct MenuAssembler {
    entries: VecDeque<MenuEntry>,
}

impl MenuAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block; a prepended block keeps its internal order
    pub fn apply(&mut self, contribution: Contribution) {
        match contribution.mode {
            Insertion::Append => self.entries.extend(contribution.entries),
            Insertion::Prepend => {
                for entry in contribution.entries.into_iter().rev() {
                    self.entries.push_front(entry);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalized menu ready for rendering
    pub fn finish(self) -> Vec<MenuEntry> {
        normalize(self.entries.into())
    }
}

/// Drop leading separators. Idempotent.
pub fn normalize(mut entries: Vec<MenuEntry>) -> Vec<MenuEntry> {
    let leading = entries
        .iter()
        .take_while(|entry| entry.is_separator())
        .count();
    entries.drain(..leading);
    entries
}
