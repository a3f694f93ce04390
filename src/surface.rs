//! Capture surfaces: lasso capture, categorized polygon lists and undo
//!
//! The mask-drawing surface and the result-editing surface are the same
//! engine instantiated with different category types. A surface with a
//! single category behaves like a plain polygon list with pop-last undo.

use crate::capture::{LassoCapture, PointerButton};
use crate::geometry::{Point, Polygon, PolygonId, PolygonList};
use crate::history::EditHistory;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Category tags a surface sorts its polygons into
///
/// `ALL` fixes the list order and therefore the hit-test order.
pub trait SurfaceCategory: Copy + Eq + std::fmt::Debug + 'static {
    const ALL: &'static [Self];

    /// Position of this category in `ALL`
    fn index(self) -> usize;
}

/// The only category of the mask-drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    Selected,
}

impl SurfaceCategory for Selection {
    const ALL: &'static [Self] = &[Self::Selected];

    fn index(self) -> usize {
        0
    }
}

/// Result-editing categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// Always keep the original pixels
    #[default]
    Include,
    /// Always clear the result pixels
    Remove,
}

impl SurfaceCategory for EditMode {
    const ALL: &'static [Self] = &[Self::Include, Self::Remove];

    fn index(self) -> usize {
        match self {
            Self::Include => 0,
            Self::Remove => 1,
        }
    }
}

impl std::fmt::Display for EditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Include => write!(f, "include"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Polygon removed by a hit-test deletion
#[derive(Debug, Clone, PartialEq)]
pub struct Deletion<C> {
    pub category: C,
    /// Index the polygon had in its category list
    pub index: usize,
    pub id: PolygonId,
}

/// One capture surface
#[derive(Debug, Clone)]
pub struct LassoSurface<C: SurfaceCategory> {
    lists: Vec<PolygonList>,
    history: EditHistory<C>,
    capture: LassoCapture<C>,
    next_id: u64,
}

impl<C: SurfaceCategory> Default for LassoSurface<C> {
    fn default() -> Self {
        Self {
            lists: C::ALL.iter().map(|_| PolygonList::new()).collect(),
            history: EditHistory::new(),
            capture: LassoCapture::new(),
            next_id: 0,
        }
    }
}

impl<C: SurfaceCategory> LassoSurface<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed polygons of one category
    #[must_use]
    pub fn list(&self, category: C) -> &PolygonList {
        // `lists` is built from `C::ALL`, so every index is present
        &self.lists[category.index()]
    }

    fn list_mut(&mut self, category: C) -> &mut PolygonList {
        &mut self.lists[category.index()]
    }

    #[must_use]
    pub fn history(&self) -> &EditHistory<C> {
        &self.history
    }

    /// Total committed polygons across all categories
    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.lists.iter().map(PolygonList::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygon_count() == 0
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }

    /// Stroke being drawn and the category it was started with
    #[must_use]
    pub fn in_progress(&self) -> Option<(&Polygon, C)> {
        self.capture.in_progress()
    }

    pub fn press(&mut self, button: PointerButton, point: Point, category: C) -> bool {
        let started = self.capture.begin(button, point, category);
        if started {
            debug!(category = ?category, x = point.x, y = point.y, "lasso capture started");
        }
        started
    }

    pub fn extend(&mut self, point: Point) -> bool {
        self.capture.extend(point)
    }

    /// Finish the stroke: commit polygon and history entry together
    pub fn release(&mut self) -> Option<PolygonId> {
        let was_drawing = self.capture.is_drawing();
        let Some((polygon, category)) = self.capture.finish() else {
            if was_drawing {
                debug!("degenerate lasso stroke discarded");
            }
            return None;
        };
        let id = PolygonId(self.next_id);
        let points = polygon.len();
        self.list_mut(category).try_push(id, polygon).ok()?;
        self.history.push(category, id);
        self.next_id += 1;
        debug!(category = ?category, %id, points, "lasso polygon committed");
        Some(id)
    }

    /// Remove the topmost polygon under `point`
    ///
    /// Lists are tested in `C::ALL` order, each most-recent first.
    pub fn delete_at(&mut self, point: Point) -> Option<Deletion<C>> {
        let (category, index) = C::ALL
            .iter()
            .find_map(|&category| self.list(category).hit_test(point).map(|i| (category, i)))?;

        debug_assert_eq!(
            self.history.position_of_rank(category, index),
            self.list(category)
                .get(index)
                .and_then(|entry| self.history.position_of(entry.id)),
        );

        let removed = self.list_mut(category).remove(index)?;
        self.history.remove(removed.id);
        debug!(category = ?category, index, id = %removed.id, "lasso polygon deleted");
        Some(Deletion {
            category,
            index,
            id: removed.id,
        })
    }

    /// Undo the most recent surviving commit
    pub fn undo_last(&mut self) -> Option<C> {
        let entry = self.history.pop()?;
        let removed = self.list_mut(entry.category).remove_id(entry.id);
        debug_assert!(removed.is_some(), "history entry without a polygon");
        debug!(category = ?entry.category, id = %entry.id, "lasso commit undone");
        Some(entry.category)
    }

    /// Empty every list and the history at once
    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
        self.history.clear();
        self.capture.reset();
    }
}
