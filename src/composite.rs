//! Layer compositing for previews and exports
//!
//! Given a base result, the original image and the include/remove lists,
//! the compositor draws the base, copies original pixels under every
//! include polygon, then clears every remove polygon. Removes always run
//! after includes, so a remove stroke wins over an overlapping include no
//! matter which was drawn first.

use crate::geometry::PolygonList;
use crate::raster::{self, CLEAR, SELECTED, UNSELECTED};
use crate::scaling::{RasterTarget, ScaleModel};
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Pixel, RgbaImage};
use std::borrow::Cow;
use tracing::debug;

/// Include and remove polygon lists of the result-editing surface
#[derive(Debug, Clone, Copy)]
pub struct EditLayers<'a> {
    pub include: &'a PolygonList,
    pub remove: &'a PolygonList,
}

impl<'a> EditLayers<'a> {
    #[must_use]
    pub fn new(include: &'a PolygonList, remove: &'a PolygonList) -> Self {
        Self { include, remove }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.remove.is_empty()
    }
}

/// Resample `image` to the target size unless it already matches
pub(crate) fn fit<P>(image: &ImageBuffer<P, Vec<P::Subpixel>>, target: RasterTarget) -> Cow<'_, ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    if image.dimensions() == target.dimensions() {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(imageops::resize(
            image,
            target.width,
            target.height,
            FilterType::Triangle,
        ))
    }
}

/// Composite the edit layers over `base` at the target resolution
#[must_use]
pub fn composite(base: &RgbaImage, original: &RgbaImage, layers: EditLayers<'_>, target: RasterTarget) -> RgbaImage {
    let mut canvas = fit(base, target).into_owned();

    if !layers.include.is_empty() {
        let source = fit(original, target);
        for polygon in layers.include.polygons() {
            raster::copy_polygon(&mut canvas, &source, polygon, target);
        }
    }
    for polygon in layers.remove.polygons() {
        raster::fill_polygon(&mut canvas, polygon, target, CLEAR);
    }

    debug!(
        width = target.width,
        height = target.height,
        include = layers.include.len(),
        remove = layers.remove.len(),
        "composited result layers"
    );
    canvas
}

/// Display-resolution composite for the interactive preview
#[must_use]
pub fn preview(base: &RgbaImage, original: &RgbaImage, layers: EditLayers<'_>, scale: &ScaleModel) -> RgbaImage {
    composite(base, original, layers, scale.display_target())
}

/// Full-resolution composite, absent when there is nothing to apply
///
/// Callers fall back to the unmodified base for export.
#[must_use]
pub fn export_image(
    base: &RgbaImage,
    original: &RgbaImage,
    layers: EditLayers<'_>,
    scale: &ScaleModel,
) -> Option<RgbaImage> {
    if layers.is_empty() {
        return None;
    }
    Some(composite(base, original, layers, scale.natural_target()))
}

/// Full-resolution mask: refined mask, then include fills, then remove fills
///
/// Absent until a refined mask exists.
#[must_use]
pub fn export_mask(refined: Option<&GrayImage>, layers: EditLayers<'_>, scale: &ScaleModel) -> Option<GrayImage> {
    let refined = refined?;
    let target = scale.natural_target();
    if target.is_empty() {
        return None;
    }
    let mut mask = fit(refined, target).into_owned();
    for polygon in layers.include.polygons() {
        raster::fill_polygon(&mut mask, polygon, target, SELECTED);
    }
    for polygon in layers.remove.polygons() {
        raster::fill_polygon(&mut mask, polygon, target, UNSELECTED);
    }
    Some(mask)
}
