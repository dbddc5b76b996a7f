//! Four-point perspective transform onto the canonical frame.
//!
//! [`homography_to_quad`] solves the direct linear system for the
//! homography mapping canonical-frame coordinates onto the detected
//! quadrilateral, so the warp is a plain inverse lookup: every destination
//! pixel samples the source bilinearly. No forward splatting, no holes.

use crate::geometry::Quad;
use crate::image::GrayBuffer;
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Homography taking `(u, v)` in a `dst_w × dst_h` destination onto the
/// given source quadrilateral, destination corners in TL, TR, BR, BL
/// order. Returns `None` for degenerate (collinear-corner) quads.
pub fn homography_to_quad(quad: &Quad, dst_w: usize, dst_h: usize) -> Option<Matrix3<f64>> {
    let w = dst_w as f64;
    let h = dst_h as f64;
    let dst = [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]];
    let src = quad.corners();

    // A quad with (near-)collinear corners still admits an exact solve,
    // it just collapses the plane onto a line. Reject it up front.
    if crate::localizer::contours::polygon_area(&src) < 1.0 {
        return None;
    }

    // Eight equations in (a..h) with the homography's last entry fixed
    // to 1: x = (a·u + b·v + c) / (g·u + h·v + 1) and likewise for y.
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for i in 0..4 {
        let (u, v) = (dst[i][0], dst[i][1]);
        let (x, y) = (src[i][0] as f64, src[i][1] as f64);
        let rx = 2 * i;
        let ry = 2 * i + 1;
        a[(rx, 0)] = u;
        a[(rx, 1)] = v;
        a[(rx, 2)] = 1.0;
        a[(rx, 6)] = -u * x;
        a[(rx, 7)] = -v * x;
        b[rx] = x;
        a[(ry, 3)] = u;
        a[(ry, 4)] = v;
        a[(ry, 5)] = 1.0;
        a[(ry, 6)] = -u * y;
        a[(ry, 7)] = -v * y;
        b[ry] = y;
    }

    let coeffs = a.lu().solve(&b)?;
    Some(Matrix3::new(
        coeffs[0], coeffs[1], coeffs[2], coeffs[3], coeffs[4], coeffs[5], coeffs[6], coeffs[7],
        1.0,
    ))
}

/// Apply a homography to a single point.
pub fn apply_homography(h: &Matrix3<f64>, u: f64, v: f64) -> Option<(f64, f64)> {
    let p = h * Vector3::new(u, v, 1.0);
    let w = p[2];
    if !w.is_finite() || w.abs() <= 1e-9 {
        return None;
    }
    Some((p[0] / w, p[1] / w))
}

/// Resample `src` through `h_dst_to_src` into a `dst_w × dst_h` frame
/// with bilinear interpolation. Destination pixels mapping outside the
/// source are left black.
pub fn warp_perspective(
    src: &GrayBuffer,
    h_dst_to_src: &Matrix3<f64>,
    dst_w: usize,
    dst_h: usize,
) -> GrayBuffer {
    let mut out = GrayBuffer::new(dst_w, dst_h);
    if src.w == 0 || src.h == 0 {
        return out;
    }
    let max_x = src.w as f64 - 1.0;
    let max_y = src.h as f64 - 1.0;

    for v in 0..dst_h {
        let dst_row = out.row_mut(v);
        for (u, px) in dst_row.iter_mut().enumerate() {
            let Some((sx, sy)) = apply_homography(h_dst_to_src, u as f64, v as f64) else {
                continue;
            };
            if sx < 0.0 || sy < 0.0 || sx > max_x || sy > max_y {
                continue;
            }
            *px = sample_bilinear(src, sx, sy);
        }
    }
    out
}

#[inline]
fn sample_bilinear(src: &GrayBuffer, x: f64, y: f64) -> u8 {
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(src.w - 1);
    let y1 = (y0 + 1).min(src.h - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let tl = src.get(x0, y0) as f64;
    let tr = src.get(x1, y0) as f64;
    let bl = src.get(x0, y1) as f64;
    let br = src.get(x1, y1) as f64;
    let top = tl * (1.0 - fx) + tr * fx;
    let bottom = bl * (1.0 - fx) + br * fx;
    (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
}
