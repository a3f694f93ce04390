//! Display ↔ natural resolution scaling

use crate::geometry::Point;

/// A raster the engine draws into, and how display points map onto it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterTarget {
    pub width: u32,
    pub height: u32,
    /// Multiplier applied to display-space coordinates
    pub factor: f64,
}

impl RasterTarget {
    #[must_use]
    pub fn new(width: u32, height: u32, factor: f64) -> Self {
        Self {
            width,
            height,
            factor,
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Derived scale between an image's natural size and its bounded display size
///
/// `scale = min(1, max_display_width / natural_width)`; a zero-width image
/// has scale 1 and zero display size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleModel {
    natural: (u32, u32),
    max_display_width: u32,
    scale: f64,
    display: (u32, u32),
}

impl ScaleModel {
    #[must_use]
    pub fn new(natural_width: u32, natural_height: u32, max_display_width: u32) -> Self {
        let mut model = Self {
            natural: (natural_width, natural_height),
            max_display_width,
            scale: 1.0,
            display: (0, 0),
        };
        model.recompute();
        model
    }

    /// Model with no image loaded
    #[must_use]
    pub fn empty(max_display_width: u32) -> Self {
        Self::new(0, 0, max_display_width)
    }

    /// Point at a new natural size; idempotent for an unchanged size
    pub fn set_natural_size(&mut self, width: u32, height: u32) {
        self.natural = (width, height);
        self.recompute();
    }

    fn recompute(&mut self) {
        let (w, h) = self.natural;
        self.scale = if w > 0 {
            (f64::from(self.max_display_width) / f64::from(w)).min(1.0)
        } else {
            1.0
        };
        self.display = (
            (f64::from(w) * self.scale).round() as u32,
            (f64::from(h) * self.scale).round() as u32,
        );
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn inverse_scale(&self) -> f64 {
        1.0 / self.scale
    }

    #[must_use]
    pub fn natural_size(&self) -> (u32, u32) {
        self.natural
    }

    #[must_use]
    pub fn display_size(&self) -> (u32, u32) {
        self.display
    }

    #[must_use]
    pub fn max_display_width(&self) -> u32 {
        self.max_display_width
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.natural.0 == 0 || self.natural.1 == 0
    }

    /// Clamp a display point into the display rectangle
    #[must_use]
    pub fn clamp(&self, point: Point) -> Point {
        point.clamped(f64::from(self.display.0), f64::from(self.display.1))
    }

    #[must_use]
    pub fn to_natural(&self, point: Point) -> Point {
        point.scaled(self.inverse_scale())
    }

    #[must_use]
    pub fn to_display(&self, point: Point) -> Point {
        point.scaled(self.scale)
    }

    /// Target for on-screen preview rasters
    #[must_use]
    pub fn display_target(&self) -> RasterTarget {
        RasterTarget::new(self.display.0, self.display.1, 1.0)
    }

    /// Target for full-resolution exports
    #[must_use]
    pub fn natural_target(&self) -> RasterTarget {
        RasterTarget::new(self.natural.0, self.natural.1, self.inverse_scale())
    }
}
