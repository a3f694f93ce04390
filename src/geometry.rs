//! Lasso geometry: points, polygons and ordered polygon lists
//!
//! All coordinates here are display-space. Polygons are implicitly closed
//! (the last point connects back to the first) whenever they are filled or
//! hit-tested, and both operations use the nonzero winding rule.

use serde::{Deserialize, Serialize};

/// Minimum number of points a polygon needs to be filled or hit-tested
pub const MIN_POLYGON_POINTS: usize = 3;

/// A point in display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp into `[0, width] × [0, height]`
    #[must_use]
    pub fn clamped(self, width: f64, height: f64) -> Self {
        Self {
            x: self.x.clamp(0.0, width.max(0.0)),
            y: self.y.clamp(0.0, height.max(0.0)),
        }
    }

    /// Multiply both coordinates by `factor`
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An append-only freehand polygon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Start a polygon from its first point
    #[must_use]
    pub fn starting_at(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    #[must_use]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than three points: never filled, never hit-tested, never kept
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < MIN_POLYGON_POINTS
    }

    /// Closed edges `(a, b)` including the edge from the last point to the first
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let next = self.points.iter().cycle().skip(1);
        self.points.iter().zip(next).map(|(a, b)| (*a, *b))
    }

    /// Nonzero winding number of the closed polygon around `point`
    #[must_use]
    pub fn winding_number(&self, point: Point) -> i32 {
        let mut winding = 0;
        for (a, b) in self.edges() {
            if (a.y <= point.y) == (b.y <= point.y) {
                continue;
            }
            let t = (point.y - a.y) / (b.y - a.y);
            let x = a.x + t * (b.x - a.x);
            if x > point.x {
                winding += if b.y > a.y { 1 } else { -1 };
            }
        }
        winding
    }

    /// Point-in-closed-polygon test (nonzero rule); degenerate polygons contain nothing
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        !self.is_degenerate() && self.winding_number(point) != 0
    }

    /// Axis-aligned bounds as `(min, max)`
    #[must_use]
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }
}

/// Identity of a committed polygon, unique within its surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolygonId(pub u64);

impl std::fmt::Display for PolygonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A polygon that made it past commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedPolygon {
    pub id: PolygonId,
    pub polygon: Polygon,
}

/// Ordered committed polygons; list order is draw order
///
/// Every stored polygon has at least [`MIN_POLYGON_POINTS`] points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonList {
    entries: Vec<CommittedPolygon>,
}

impl PolygonList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a polygon, refusing degenerate ones
    ///
    /// Returns the polygon back when it was rejected.
    pub fn try_push(&mut self, id: PolygonId, polygon: Polygon) -> std::result::Result<(), Polygon> {
        if polygon.is_degenerate() {
            return Err(polygon);
        }
        self.entries.push(CommittedPolygon { id, polygon });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CommittedPolygon> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn last(&self) -> Option<&CommittedPolygon> {
        self.entries.last()
    }

    /// Committed entries in draw order
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &CommittedPolygon> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Polygons in draw order
    pub fn polygons(&self) -> impl DoubleEndedIterator<Item = &Polygon> + ExactSizeIterator {
        self.entries.iter().map(|entry| &entry.polygon)
    }

    /// Index of the topmost polygon containing `point`
    ///
    /// Tested most-recent first, so the later of two overlapping polygons wins.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|entry| entry.polygon.contains(point))
    }

    pub fn remove(&mut self, index: usize) -> Option<CommittedPolygon> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn remove_id(&mut self, id: PolygonId) -> Option<CommittedPolygon> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        self.remove(index)
    }

    pub fn pop(&mut self) -> Option<CommittedPolygon> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<Polygon> for PolygonList {
    /// Collect polygons with sequential ids, dropping degenerate ones
    fn from_iter<I: IntoIterator<Item = Polygon>>(iter: I) -> Self {
        let mut list = Self::new();
        let mut next_id = 0;
        for polygon in iter {
            if list.try_push(PolygonId(next_id), polygon).is_ok() {
                next_id += 1;
            }
        }
        list
    }
}
