//! Ancestor chain of the current category and the per-request selection.

use std::collections::BTreeMap;

use crate::domain::entities::{CategoryRecord, CurrentItem};
use crate::domain::types::CategoryId;

/// Chain from the current category up to the root, keyed by level.
///
/// Iteration runs root first. The deepest entry is the category the chain was
/// resolved for; a broken parent reference leaves a partial chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTree {
    levels: BTreeMap<u32, CategoryRecord>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: CategoryRecord) {
        self.levels.insert(category.level, category);
    }

    pub fn get(&self, level: u32) -> Option<&CategoryRecord> {
        self.levels.get(&level)
    }

    pub fn contains_id(&self, id: CategoryId) -> bool {
        self.levels.values().any(|category| category.id == id)
    }

    pub fn deepest(&self) -> Option<&CategoryRecord> {
        self.levels.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Categories ordered from the root down to the deepest entry.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CategoryRecord> {
        self.levels.values()
    }

    pub fn levels(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.keys().copied()
    }
}

/// What the current page render is scoped to.
#[derive(Debug, Clone, Default)]
pub struct CurrentSelection {
    pub category: Option<CategoryRecord>,
    pub tree: CategoryTree,
    pub item: Option<CurrentItem>,
}

impl CurrentSelection {
    pub fn clear_category(&mut self) {
        self.category = None;
        self.tree = CategoryTree::new();
    }
}
