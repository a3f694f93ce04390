//! Polygon rasterization
//!
//! Polygons are scan-converted with the nonzero winding rule. A pixel is
//! covered when its centre lies inside the polygon after scaling to the
//! target resolution, so a fill never depends on the display scale beyond
//! the coordinate transform itself.

use crate::geometry::{Point, Polygon, PolygonList};
use crate::scaling::RasterTarget;
use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgba, RgbaImage};

/// Mask value of unselected pixels
pub const UNSELECTED: Luma<u8> = Luma([0]);
/// Mask value of selected pixels
pub const SELECTED: Luma<u8> = Luma([255]);
/// Fully transparent RGBA pixel
pub const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone, Copy)]
struct Crossing {
    x: f64,
    winding: i32,
}

/// Call `emit(y, x_start, x_end)` for every covered run of pixels
///
/// `x_end` is exclusive. Runs are clipped to the target rectangle and
/// degenerate polygons emit nothing.
pub fn for_each_span<F>(polygon: &Polygon, target: RasterTarget, mut emit: F)
where
    F: FnMut(u32, u32, u32),
{
    if polygon.is_degenerate() || target.is_empty() {
        return;
    }

    let scaled = Polygon::from_points(
        polygon
            .points()
            .iter()
            .map(|p| p.scaled(target.factor))
            .collect(),
    );
    let Some((lo, hi)) = scaled.bounds() else {
        return;
    };

    let first_row = lo.y.floor().max(0.0) as u32;
    let end_row = (hi.y.ceil().max(0.0) as u32).min(target.height);
    let width = f64::from(target.width);
    let column = |x: f64| (x - 0.5).ceil().clamp(0.0, width) as u32;

    let mut crossings: Vec<Crossing> = Vec::new();
    for y in first_row..end_row {
        let sample = Point::new(0.0, f64::from(y) + 0.5);
        crossings.clear();
        for (a, b) in scaled.edges() {
            if (a.y <= sample.y) == (b.y <= sample.y) {
                continue;
            }
            let t = (sample.y - a.y) / (b.y - a.y);
            crossings.push(Crossing {
                x: a.x + t * (b.x - a.x),
                winding: if b.y > a.y { 1 } else { -1 },
            });
        }
        crossings.sort_by(|l, r| l.x.total_cmp(&r.x));

        let mut winding = 0;
        let mut run_start = 0.0;
        for crossing in &crossings {
            let before = winding;
            winding += crossing.winding;
            if before == 0 && winding != 0 {
                run_start = crossing.x;
            } else if before != 0 && winding == 0 {
                let (x0, x1) = (column(run_start), column(crossing.x));
                if x0 < x1 {
                    emit(y, x0, x1);
                }
            }
        }
    }
}

/// Paint every covered pixel of `polygon` with `pixel`
pub fn fill_polygon<P>(
    image: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    polygon: &Polygon,
    target: RasterTarget,
    pixel: P,
) where
    P: Pixel,
{
    let (width, height) = image.dimensions();
    for_each_span(polygon, target, |y, x0, x1| {
        if y >= height {
            return;
        }
        for x in x0..x1.min(width) {
            image.put_pixel(x, y, pixel);
        }
    });
}

/// Copy `source` pixels into `image` wherever `polygon` covers them
///
/// Both images are expected at the target resolution; pixels outside either
/// image are skipped.
pub fn copy_polygon(image: &mut RgbaImage, source: &RgbaImage, polygon: &Polygon, target: RasterTarget) {
    let width = image.width().min(source.width());
    let height = image.height().min(source.height());
    for_each_span(polygon, target, |y, x0, x1| {
        if y >= height {
            return;
        }
        for x in x0..x1.min(width) {
            image.put_pixel(x, y, *source.get_pixel(x, y));
        }
    });
}

/// Number of pixels a polygon covers at the target resolution
#[must_use]
pub fn covered_pixels(polygon: &Polygon, target: RasterTarget) -> u64 {
    let mut total = 0;
    for_each_span(polygon, target, |_, x0, x1| total += u64::from(x1 - x0));
    total
}

/// Rasterize a polygon list into a black-and-white mask
///
/// Returns `None` when the list has no fillable polygon or the target is
/// empty: "no mask" is distinct from an all-black mask.
#[must_use]
pub fn rasterize_mask(list: &PolygonList, target: RasterTarget) -> Option<GrayImage> {
    if target.is_empty() || list.polygons().all(Polygon::is_degenerate) {
        return None;
    }
    let mut mask = GrayImage::from_pixel(target.width, target.height, UNSELECTED);
    for polygon in list.polygons() {
        fill_polygon(&mut mask, polygon, target, SELECTED);
    }
    Some(mask)
}
