//! Pointer-driven lasso capture
//!
//! `idle → drawing → committed → idle`. A primary press seeds a polygon,
//! every move appends a point, and release hands the polygon back when it
//! has more than two points. The category is fixed at press time.

use crate::geometry::{Point, Polygon};
use serde::{Deserialize, Serialize};

/// Pointer buttons as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    /// Left button / primary touch: starts a stroke
    Primary,
    /// Right button / context click: deletes under the pointer
    Secondary,
    /// Middle button and anything else
    Auxiliary,
}

#[derive(Debug, Clone)]
enum CaptureState<C> {
    Idle,
    Drawing { polygon: Polygon, category: C },
}

/// Single in-progress stroke for one surface
#[derive(Debug, Clone)]
pub struct LassoCapture<C> {
    state: CaptureState<C>,
}

impl<C> Default for LassoCapture<C> {
    fn default() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }
}

impl<C: Copy> LassoCapture<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, CaptureState::Drawing { .. })
    }

    /// Start drawing on a primary press; no-op while already drawing
    pub fn begin(&mut self, button: PointerButton, point: Point, category: C) -> bool {
        if button != PointerButton::Primary || self.is_drawing() {
            return false;
        }
        self.state = CaptureState::Drawing {
            polygon: Polygon::starting_at(point),
            category,
        };
        true
    }

    /// Append a point to the in-progress polygon
    pub fn extend(&mut self, point: Point) -> bool {
        match &mut self.state {
            CaptureState::Drawing { polygon, .. } => {
                polygon.push(point);
                true
            },
            CaptureState::Idle => false,
        }
    }

    /// Release: always returns to idle, yields the stroke if it is not degenerate
    pub fn finish(&mut self) -> Option<(Polygon, C)> {
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Drawing { polygon, category } if !polygon.is_degenerate() => {
                Some((polygon, category))
            },
            CaptureState::Drawing { .. } | CaptureState::Idle => None,
        }
    }

    /// Drop any in-progress stroke
    pub fn reset(&mut self) {
        self.state = CaptureState::Idle;
    }

    #[must_use]
    pub fn in_progress(&self) -> Option<(&Polygon, C)> {
        match &self.state {
            CaptureState::Drawing { polygon, category } => Some((polygon, *category)),
            CaptureState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_press_starts_drawing() {
        let mut capture = LassoCapture::new();
        assert!(!capture.begin(PointerButton::Secondary, Point::new(1.0, 1.0), 'a'));
        assert!(!capture.is_drawing());

        assert!(capture.begin(PointerButton::Primary, Point::new(1.0, 1.0), 'a'));
        assert!(capture.is_drawing());
        assert_eq!(capture.in_progress().map(|(p, _)| p.len()), Some(1));
    }

    #[test]
    fn test_second_press_is_ignored() {
        let mut capture = LassoCapture::new();
        capture.begin(PointerButton::Primary, Point::new(0.0, 0.0), 'a');
        capture.extend(Point::new(5.0, 0.0));
        assert!(!capture.begin(PointerButton::Primary, Point::new(9.0, 9.0), 'b'));
        let (poly, cat) = capture.in_progress().unwrap();
        assert_eq!(poly.len(), 2);
        assert_eq!(cat, 'a');
    }

    #[test]
    fn test_commit_requires_more_than_two_points() {
        let mut capture = LassoCapture::new();
        capture.begin(PointerButton::Primary, Point::new(0.0, 0.0), ());
        capture.extend(Point::new(5.0, 5.0));
        assert!(capture.finish().is_none());
        assert!(!capture.is_drawing());

        capture.begin(PointerButton::Primary, Point::new(0.0, 0.0), ());
        capture.extend(Point::new(5.0, 0.0));
        capture.extend(Point::new(5.0, 5.0));
        let (poly, ()) = capture.finish().unwrap();
        assert_eq!(poly.len(), 3);
        assert!(!capture.is_drawing());
    }

    #[test]
    fn test_moves_while_idle_are_ignored() {
        let mut capture: LassoCapture<()> = LassoCapture::new();
        assert!(!capture.extend(Point::new(1.0, 1.0)));
        assert!(capture.finish().is_none());
    }
}
