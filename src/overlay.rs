//! On-screen highlight layers for the two capture surfaces
//!
//! Overlays are transparent display-resolution canvases with a translucent
//! fill and a 2 px outline per polygon. They never feed into exports.

use crate::composite::fit;
use crate::geometry::{Point, Polygon};
use crate::raster;
use crate::scaling::{RasterTarget, ScaleModel};
use crate::surface::{EditMode, LassoSurface, Selection};
use image::{GrayImage, Pixel, Rgba, RgbaImage};

/// Outline width in display pixels
pub const STROKE_WIDTH: f64 = 2.0;

/// Fill and outline colours of one polygon category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    pub fill: Rgba<u8>,
    pub stroke: Rgba<u8>,
}

impl OverlayStyle {
    /// Mask-drawing surface: purple
    pub const SELECTION: Self = Self {
        fill: Rgba([108, 92, 231, 64]),
        stroke: Rgba([108, 92, 231, 204]),
    };
    /// Include polygons: green
    pub const INCLUDE: Self = Self {
        fill: Rgba([0, 210, 160, 51]),
        stroke: Rgba([0, 210, 160, 204]),
    };
    /// Remove polygons: red
    pub const REMOVE: Self = Self {
        fill: Rgba([255, 83, 112, 51]),
        stroke: Rgba([255, 83, 112, 204]),
    };

    #[must_use]
    pub fn for_mode(mode: EditMode) -> Self {
        match mode {
            EditMode::Include => Self::INCLUDE,
            EditMode::Remove => Self::REMOVE,
        }
    }
}

/// Squared distance from `p` to segment `ab`
fn segment_distance_sq(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.x + t * dx - p.x, a.y + t * dy - p.y);
    cx * cx + cy * cy
}

/// Blend a filled, outlined closed path onto `canvas`
///
/// Paths with fewer than two points draw nothing. Each pixel receives the
/// outline colour at most once per path, so overlapping edges do not darken.
pub fn draw_path(canvas: &mut RgbaImage, path: &Polygon, style: OverlayStyle) {
    if path.len() < 2 {
        return;
    }
    let (width, height) = canvas.dimensions();
    let target = RasterTarget::new(width, height, 1.0);

    raster::for_each_span(path, target, |y, x0, x1| {
        for x in x0..x1 {
            canvas.get_pixel_mut(x, y).blend(&style.fill);
        }
    });

    let Some((lo, hi)) = path.bounds() else {
        return;
    };
    let radius = STROKE_WIDTH / 2.0;
    let x_start = (lo.x - radius).floor().max(0.0) as u32;
    let y_start = (lo.y - radius).floor().max(0.0) as u32;
    let x_end = ((hi.x + radius).ceil().max(0.0) as u32).min(width);
    let y_end = ((hi.y + radius).ceil().max(0.0) as u32).min(height);
    if x_start >= x_end || y_start >= y_end {
        return;
    }

    let box_width = (x_end - x_start) as usize;
    let mut outline = vec![false; box_width * (y_end - y_start) as usize];
    for (a, b) in path.edges() {
        let ex0 = ((a.x.min(b.x) - radius).floor().max(0.0) as u32).max(x_start);
        let ey0 = ((a.y.min(b.y) - radius).floor().max(0.0) as u32).max(y_start);
        let ex1 = ((a.x.max(b.x) + radius).ceil().max(0.0) as u32).min(x_end);
        let ey1 = ((a.y.max(b.y) + radius).ceil().max(0.0) as u32).min(y_end);
        for y in ey0..ey1 {
            for x in ex0..ex1 {
                let centre = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if segment_distance_sq(centre, a, b) <= radius * radius {
                    outline[(y - y_start) as usize * box_width + (x - x_start) as usize] = true;
                }
            }
        }
    }

    for (offset, _) in outline.iter().enumerate().filter(|(_, hit)| **hit) {
        let x = x_start + (offset % box_width) as u32;
        let y = y_start + (offset / box_width) as u32;
        canvas.get_pixel_mut(x, y).blend(&style.stroke);
    }
}

/// Highlight layer of the mask-drawing surface
#[must_use]
pub fn mask_overlay(surface: &LassoSurface<Selection>, scale: &ScaleModel) -> RgbaImage {
    let (width, height) = scale.display_size();
    let mut canvas = RgbaImage::new(width, height);
    for polygon in surface.list(Selection::Selected).polygons() {
        draw_path(&mut canvas, polygon, OverlayStyle::SELECTION);
    }
    if let Some((stroke, _)) = surface.in_progress() {
        draw_path(&mut canvas, stroke, OverlayStyle::SELECTION);
    }
    canvas
}

/// Highlight layer of the result-editing surface
///
/// The in-progress stroke is shown in the colour of `current_mode`, which
/// may differ from the category it will commit to.
#[must_use]
pub fn edit_overlay(surface: &LassoSurface<EditMode>, current_mode: EditMode, scale: &ScaleModel) -> RgbaImage {
    let (width, height) = scale.display_size();
    let mut canvas = RgbaImage::new(width, height);
    for &mode in [EditMode::Include, EditMode::Remove].iter() {
        for polygon in surface.list(mode).polygons() {
            draw_path(&mut canvas, polygon, OverlayStyle::for_mode(mode));
        }
    }
    if let Some((stroke, _)) = surface.in_progress() {
        draw_path(&mut canvas, stroke, OverlayStyle::for_mode(current_mode));
    }
    canvas
}

/// Full-resolution mask shrunk to the display size
#[must_use]
pub fn mask_preview(mask: &GrayImage, scale: &ScaleModel) -> GrayImage {
    fit(mask, scale.display_target()).into_owned()
}

/// Draw `preview` over the original image faded to `opacity`
///
/// Regions the preview clears show the original at that opacity; an opacity
/// of zero returns the preview unchanged.
#[must_use]
pub fn with_original_underlay(preview: &RgbaImage, original: &RgbaImage, opacity: f32) -> RgbaImage {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return preview.clone();
    }
    let target = RasterTarget::new(preview.width(), preview.height(), 1.0);
    let mut canvas = fit(original, target).into_owned();
    for pixel in canvas.pixels_mut() {
        pixel.0[3] = (f32::from(pixel.0[3]) * opacity).round() as u8;
    }
    for (under, over) in canvas.pixels_mut().zip(preview.pixels()) {
        under.blend(over);
    }
    canvas
}
