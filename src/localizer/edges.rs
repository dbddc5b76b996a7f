//! Canny-style edge mask: Sobel gradients, direction-aligned non-maximum
//! suppression and double-threshold hysteresis.
//!
//! The gradient pass convolves the 3×3 Sobel kernel pair with border
//! clamping and keeps the L1 magnitude `|gx| + |gy|`, which is what the
//! default hysteresis thresholds are calibrated against. NMS compares each
//! pixel against its two neighbors along the quantized gradient direction;
//! hysteresis keeps weak responses only when 8-connected to a strong one.

use crate::image::{BinaryMask, GrayBuffer};
use serde::Deserialize;

/// Hysteresis thresholds on the un-normalized Sobel L1 magnitude.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    pub low_thresh: f32,
    pub high_thresh: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low_thresh: 75.0,
            high_thresh: 200.0,
        }
    }
}

struct Gradients {
    gx: Vec<f32>,
    gy: Vec<f32>,
    mag: Vec<f32>,
}

const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

fn sobel_gradients(src: &GrayBuffer) -> Gradients {
    let (w, h) = (src.w, src.h);
    let mut gx = vec![0f32; w * h];
    let mut gy = vec![0f32; w * h];
    let mut mag = vec![0f32; w * h];
    if w == 0 || h == 0 {
        return Gradients { gx, gy, mag };
    }

    for y in 0..h {
        let rows = [
            src.row(y.saturating_sub(1)),
            src.row(y),
            src.row((y + 1).min(h - 1)),
        ];
        for x in 0..w {
            let xs = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, row) in rows.iter().enumerate() {
                for kx in 0..3 {
                    let v = row[xs[kx]] as f32;
                    sum_x += v * SOBEL_X[ky][kx];
                    sum_y += v * SOBEL_Y[ky][kx];
                }
            }
            let idx = y * w + x;
            gx[idx] = sum_x;
            gy[idx] = sum_y;
            mag[idx] = sum_x.abs() + sum_y.abs();
        }
    }
    Gradients { gx, gy, mag }
}

const TAN_22_5_DEG: f32 = 0.414_213_56;

/// Suppress gradient responses that are not local maxima along their own
/// direction. Returns a dense magnitude buffer with suppressed pixels
/// zeroed; the outermost 1-pixel frame is ignored.
fn suppress_non_maxima(grad: &Gradients, w: usize, h: usize, floor: f32) -> Vec<f32> {
    let mut out = vec![0f32; w * h];
    if w < 3 || h < 3 {
        return out;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let mag = grad.mag[idx];
            if mag < floor {
                continue;
            }
            let gx = grad.gx[idx];
            let gy = grad.gy[idx];
            let abs_gx = gx.abs();
            let abs_gy = gy.abs();
            let same_sign = (gx >= 0.0) == (gy >= 0.0);

            let (n1, n2) = if abs_gx >= abs_gy {
                if abs_gy <= abs_gx * TAN_22_5_DEG {
                    (grad.mag[idx - 1], grad.mag[idx + 1])
                } else if same_sign {
                    (grad.mag[idx - w + 1], grad.mag[idx + w - 1])
                } else {
                    (grad.mag[idx - w - 1], grad.mag[idx + w + 1])
                }
            } else if abs_gx <= abs_gy * TAN_22_5_DEG {
                (grad.mag[idx - w], grad.mag[idx + w])
            } else if same_sign {
                (grad.mag[idx - w + 1], grad.mag[idx + w - 1])
            } else {
                (grad.mag[idx - w - 1], grad.mag[idx + w + 1])
            };

            // `>=` against the leading neighbor so a two-pixel plateau
            // (perfectly symmetric step edge) keeps exactly one pixel.
            if mag >= n1 && mag > n2 {
                out[idx] = mag;
            }
        }
    }
    out
}

/// Build a binary edge mask from a (pre-blurred) grayscale frame.
pub fn detect_edges(src: &GrayBuffer, params: &EdgeParams) -> BinaryMask {
    let (w, h) = (src.w, src.h);
    let grad = sobel_gradients(src);
    let thinned = suppress_non_maxima(&grad, w, h, params.low_thresh);

    // Hysteresis: seed from strong pixels, grow over 8-connected weak ones.
    let mut mask = BinaryMask::new(w, h);
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if thinned[y * w + x] >= params.high_thresh && !mask.is_set(x, y) {
                mask.set(x, y);
                stack.push((x, y));
                while let Some((cx, cy)) = stack.pop() {
                    for (nx, ny) in neighbors8(cx, cy, w, h) {
                        if !mask.is_set(nx, ny) && thinned[ny * w + nx] >= params.low_thresh {
                            mask.set(nx, ny);
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }
    }
    mask
}

pub(crate) fn neighbors8(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) -> impl Iterator<Item = (usize, usize)> {
    const OFFSETS: [(isize, isize); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];
    OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        (nx >= 0 && ny >= 0 && (nx as usize) < w && (ny as usize) < h)
            .then_some((nx as usize, ny as usize))
    })
}
