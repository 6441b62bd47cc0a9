//! Shared geometry types and helpers.

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Snap a transformed cell-center coordinate back to an integer grid cell.
///
/// Element positions are transformed at the cell center (`x + 0.5`), so the
/// inverse shift is applied before rounding to recover the cell index.
#[inline]
pub fn snap_cell(v: f64) -> i32 {
    (v - 0.5).round() as i32
}
