//! Point ordering and rectangle math shared by the later stages.
//!
//! - [`order_quadrilateral`] arranges four detected corners into a fixed
//!   TL/TR/BR/BL order using the sum/difference heuristic.
//! - [`fractional_region`] converts frame-relative fractional bounds into a
//!   clamped, non-empty pixel rectangle.

use crate::layout::ColumnSpec;

/// A 2D point in pixel coordinates.
pub type Point = [f32; 2];

/// Four corners of a detected sheet in TL, TR, BR, BL order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub tl: Point,
    pub tr: Point,
    pub br: Point,
    pub bl: Point,
}

impl Quad {
    /// Corners as an array in TL, TR, BR, BL order.
    pub fn corners(&self) -> [Point; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }
}

/// Order four unordered corner points into TL/TR/BR/BL.
///
/// TL minimizes x+y, BR maximizes x+y, TR minimizes y−x, BL maximizes y−x.
/// O(1) per point and correct for convex quadrilaterals whose bounding box
/// is roughly axis-aligned. Known limitation: quadrilaterals rotated close
/// to 45° can come out mis-ordered. This bias is kept as-is; downstream
/// calibration depends on it.
pub fn order_quadrilateral(pts: [Point; 4]) -> Quad {
    let mut tl = pts[0];
    let mut tr = pts[0];
    let mut br = pts[0];
    let mut bl = pts[0];
    for &p in &pts {
        let sum = p[0] + p[1];
        let diff = p[1] - p[0];
        if sum < tl[0] + tl[1] {
            tl = p;
        }
        if sum > br[0] + br[1] {
            br = p;
        }
        if diff < tr[1] - tr[0] {
            tr = p;
        }
        if diff > bl[1] - bl[0] {
            bl = p;
        }
    }
    Quad { tl, tr, br, bl }
}

/// Integer pixel rectangle with exclusive end coordinates.
///
/// Invariant: `x0 < x1` and `y0 < y1`, both ends within the frame that
/// produced the rect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelRect {
    #[inline]
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Shrink the rectangle by `frac` of its size on every side, keeping at
    /// least one pixel in each dimension. Used to cut grid-line pixels off
    /// the border of a bubble cell.
    pub fn inset(&self, frac: f32) -> PixelRect {
        let dx = (self.width() as f32 * frac) as usize;
        let dy = (self.height() as f32 * frac) as usize;
        let x0 = self.x0 + dx;
        let y0 = self.y0 + dy;
        let x1 = (self.x1.saturating_sub(dx)).max(x0 + 1);
        let y1 = (self.y1.saturating_sub(dy)).max(y0 + 1);
        PixelRect { x0, y0, x1, y1 }
    }
}

/// Convert a column's fractional bounds into pixel bounds inside a
/// `frame_w × frame_h` frame.
///
/// The start is clamped into the frame and the end is clamped to at least
/// one pixel past the start, so the result is always non-empty and
/// in-bounds. Re-applying the conversion to an already clamped spec yields
/// the same rectangle.
pub fn fractional_region(frame_w: usize, frame_h: usize, spec: &ColumnSpec) -> PixelRect {
    debug_assert!(frame_w > 0 && frame_h > 0);
    let x0 = ((spec.start_x * frame_w as f32) as usize).min(frame_w - 1);
    let y0 = ((spec.start_y * frame_h as f32) as usize).min(frame_h - 1);
    let x1 = (((spec.start_x + spec.width) * frame_w as f32) as usize)
        .clamp(x0 + 1, frame_w);
    let y1 = (((spec.start_y + spec.height) * frame_h as f32) as usize)
        .clamp(y0 + 1, frame_h);
    PixelRect { x0, y0, x1, y1 }
}
