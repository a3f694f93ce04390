//! Chronological edit history across categorized polygon lists

use crate::geometry::PolygonId;

/// One committed polygon: which list it went to, and its identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry<C> {
    pub category: C,
    pub id: PolygonId,
}

/// Chronological log of commits
///
/// The log length always equals the total number of polygons across the
/// owning surface's lists; an entry is appended in the same operation that
/// appends its polygon.
#[derive(Debug, Clone)]
pub struct EditHistory<C> {
    entries: Vec<HistoryEntry<C>>,
}

impl<C> Default for EditHistory<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C: Copy + Eq> EditHistory<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: C, id: PolygonId) {
        self.entries.push(HistoryEntry { category, id });
    }

    pub fn pop(&mut self) -> Option<HistoryEntry<C>> {
        self.entries.pop()
    }

    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry<C>> {
        self.entries.last()
    }

    /// Drop the entry for a specific polygon
    pub fn remove(&mut self, id: PolygonId) -> Option<HistoryEntry<C>> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry<C>> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Number of entries of `category`
    #[must_use]
    pub fn count(&self, category: C) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .count()
    }

    /// Smallest index whose cumulative count of `category` equals `rank + 1`
    ///
    /// This is the history slot of the `rank`-th polygon (0-based) in that
    /// category's list.
    #[must_use]
    pub fn position_of_rank(&self, category: C, rank: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.category == category)
            .nth(rank)
            .map(|(index, _)| index)
    }

    #[must_use]
    pub fn position_of(&self, id: PolygonId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }
}
