//! Low-level raster filters shared by the localizer, binarizer and
//! metadata decoder.
//!
//! - [`gaussian_blur`]: separable 5-tap blur `[1, 4, 6, 4, 1] / 16` with
//!   border clamping; one pass ≈ σ 1.1, two passes for heavier smoothing.
//! - [`integral_image`]: summed-area table for O(1) windowed means.
//! - [`clahe`]: contrast-limited adaptive histogram equalization used to
//!   flatten illumination gradients before thresholding or QR decoding.

use crate::image::GrayBuffer;
use serde::Deserialize;

const GAUSS_TAPS: [u32; 5] = [1, 4, 6, 4, 1];

/// Apply `passes` rounds of separable 5-tap Gaussian blur.
pub fn gaussian_blur(src: &GrayBuffer, passes: usize) -> GrayBuffer {
    let mut current = src.clone();
    if src.w == 0 || src.h == 0 {
        return current;
    }
    let mut scratch = GrayBuffer::new(src.w, src.h);
    for _ in 0..passes {
        blur_horizontal(&current, &mut scratch);
        blur_vertical(&scratch, &mut current);
    }
    current
}

fn blur_horizontal(src: &GrayBuffer, dst: &mut GrayBuffer) {
    let w = src.w;
    for y in 0..src.h {
        let row = src.row(y);
        let out = dst.row_mut(y);
        for x in 0..w {
            let mut acc = 0u32;
            for (k, &tap) in GAUSS_TAPS.iter().enumerate() {
                let sx = clamp_offset(x, k as isize - 2, w);
                acc += tap * row[sx] as u32;
            }
            out[x] = (acc >> 4) as u8;
        }
    }
}

fn blur_vertical(src: &GrayBuffer, dst: &mut GrayBuffer) {
    let h = src.h;
    for y in 0..h {
        let rows: [&[u8]; 5] = [
            src.row(clamp_offset(y, -2, h)),
            src.row(clamp_offset(y, -1, h)),
            src.row(y),
            src.row(clamp_offset(y, 1, h)),
            src.row(clamp_offset(y, 2, h)),
        ];
        let out = dst.row_mut(y);
        for (x, px) in out.iter_mut().enumerate() {
            let mut acc = 0u32;
            for (k, &tap) in GAUSS_TAPS.iter().enumerate() {
                acc += tap * rows[k][x] as u32;
            }
            *px = (acc >> 4) as u8;
        }
    }
}

#[inline]
fn clamp_offset(base: usize, offset: isize, upper: usize) -> usize {
    let idx = base as isize + offset;
    idx.clamp(0, upper as isize - 1) as usize
}

/// Summed-area table with a zero row/column prefix: dimensions
/// `(w + 1) × (h + 1)`, entry `(x, y)` holding the sum over `[0, x) × [0, y)`.
pub struct IntegralImage {
    w: usize,
    data: Vec<i64>,
}

impl IntegralImage {
    pub fn build(src: &GrayBuffer) -> Self {
        let iw = src.w + 1;
        let mut data = vec![0i64; iw * (src.h + 1)];
        for y in 0..src.h {
            let row = src.row(y);
            let mut running = 0i64;
            for x in 0..src.w {
                running += row[x] as i64;
                data[(y + 1) * iw + (x + 1)] = running + data[y * iw + (x + 1)];
            }
        }
        Self { w: src.w, data }
    }

    /// Sum of pixels over the half-open window `[x0, x1) × [y0, y1)`.
    #[inline]
    pub fn window_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> i64 {
        let iw = self.w + 1;
        self.data[y1 * iw + x1] - self.data[y0 * iw + x1] - self.data[y1 * iw + x0]
            + self.data[y0 * iw + x0]
    }
}

/// CLAHE tiling and clip configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ClaheParams {
    pub tiles_x: usize,
    pub tiles_y: usize,
    pub clip_limit: f32,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            tiles_x: 8,
            tiles_y: 8,
            clip_limit: 3.0,
        }
    }
}

/// Contrast-limited adaptive histogram equalization.
///
/// Per-tile clipped histogram equalization with bilinear interpolation
/// between the four surrounding tile mappings, so tile boundaries do not
/// produce visible seams. Inputs too small to tile are returned unchanged.
pub fn clahe(src: &GrayBuffer, params: &ClaheParams) -> GrayBuffer {
    let (w, h) = (src.w, src.h);
    let (tiles_x, tiles_y) = (params.tiles_x, params.tiles_y);
    if w == 0 || h == 0 || tiles_x == 0 || tiles_y == 0 {
        return src.clone();
    }
    let tile_w = w / tiles_x;
    let tile_h = h / tiles_y;
    if tile_w == 0 || tile_h == 0 {
        return src.clone();
    }

    let mut luts = vec![[0u8; 256]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = if tx == tiles_x - 1 { w } else { x0 + tile_w };
            let y1 = if ty == tiles_y - 1 { h } else { y0 + tile_h };
            build_tile_lut(
                src,
                x0,
                y0,
                x1,
                y1,
                params.clip_limit,
                &mut luts[ty * tiles_x + tx],
            );
        }
    }

    let mut out = GrayBuffer::new(w, h);
    let tw = tile_w as f32;
    let th = tile_h as f32;
    for y in 0..h {
        let src_row = src.row(y);
        let dst_row = out.row_mut(y);
        let fy = (y as f32 + 0.5) / th - 0.5;
        let ty0 = (fy.floor() as i32).clamp(0, tiles_y as i32 - 1) as usize;
        let ty1 = (fy.floor() as i32 + 1).clamp(0, tiles_y as i32 - 1) as usize;
        let ay = fy - fy.floor();
        for x in 0..w {
            let fx = (x as f32 + 0.5) / tw - 0.5;
            let tx0 = (fx.floor() as i32).clamp(0, tiles_x as i32 - 1) as usize;
            let tx1 = (fx.floor() as i32 + 1).clamp(0, tiles_x as i32 - 1) as usize;
            let ax = fx - fx.floor();

            let px = src_row[x] as usize;
            let v00 = luts[ty0 * tiles_x + tx0][px] as f32;
            let v10 = luts[ty0 * tiles_x + tx1][px] as f32;
            let v01 = luts[ty1 * tiles_x + tx0][px] as f32;
            let v11 = luts[ty1 * tiles_x + tx1][px] as f32;
            let top = v00 * (1.0 - ax) + v10 * ax;
            let bottom = v01 * (1.0 - ax) + v11 * ax;
            dst_row[x] = (top * (1.0 - ay) + bottom * ay).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

fn build_tile_lut(
    src: &GrayBuffer,
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    clip_limit: f32,
    lut: &mut [u8; 256],
) {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for &px in &src.row(y)[x0..x1] {
            hist[px as usize] += 1;
        }
    }
    let tile_pixels = ((x1 - x0) * (y1 - y0)) as u32;

    // Clip the histogram and redistribute the excess uniformly.
    let clip = ((clip_limit * tile_pixels as f32 / 256.0) as u32).max(1);
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }
    let per_bin = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += per_bin + u32::from(i < remainder);
    }

    let mut cdf = 0u32;
    let mut cdf_min = 0u32;
    let mut seen_nonzero = false;
    let mut cdfs = [0u32; 256];
    for (i, &count) in hist.iter().enumerate() {
        cdf += count;
        cdfs[i] = cdf;
        if !seen_nonzero && count > 0 {
            cdf_min = cdf;
            seen_nonzero = true;
        }
    }
    let denom = cdfs[255].saturating_sub(cdf_min);
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = if denom == 0 {
            i as u8
        } else {
            let v = (cdfs[i].saturating_sub(cdf_min) as f32 / denom as f32) * 255.0;
            v.clamp(0.0, 255.0) as u8
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_preserves_dimensions_and_flat_regions() {
        let mut img = GrayBuffer::new(16, 16);
        img.data.fill(90);
        let blurred = gaussian_blur(&img, 2);
        assert_eq!((blurred.w, blurred.h), (16, 16));
        assert!(blurred.data.iter().all(|&v| v == 90));
    }

    #[test]
    fn blur_dampens_an_isolated_spike() {
        let mut img = GrayBuffer::new(9, 9);
        img.set(4, 4, 255);
        let blurred = gaussian_blur(&img, 1);
        assert!(blurred.get(4, 4) < 255);
        assert!(blurred.get(3, 4) > 0);
    }

    #[test]
    fn integral_window_sum_matches_naive() {
        let mut img = GrayBuffer::new(5, 4);
        for (i, v) in img.data.iter_mut().enumerate() {
            *v = (i * 7 % 251) as u8;
        }
        let integral = IntegralImage::build(&img);
        let mut naive = 0i64;
        for y in 1..3 {
            for x in 2..5 {
                naive += img.get(x, y) as i64;
            }
        }
        assert_eq!(integral.window_sum(2, 1, 5, 3), naive);
    }

    #[test]
    fn clahe_keeps_uniform_input_uniform() {
        let mut img = GrayBuffer::new(64, 64);
        img.data.fill(128);
        let out = clahe(&img, &ClaheParams::default());
        let first = out.data[0];
        assert!(out.data.iter().all(|&v| v == first));
    }

    #[test]
    fn clahe_raises_contrast_of_a_dim_gradient() {
        let mut img = GrayBuffer::new(64, 64);
        for y in 0..64 {
            for x in 0..64 {
                img.set(x, y, 100 + (x / 8) as u8);
            }
        }
        let out = clahe(&img, &ClaheParams::default());
        let min = *out.data.iter().min().unwrap();
        let max = *out.data.iter().max().unwrap();
        assert!(max - min > 8, "contrast did not expand: {min}..{max}");
    }
}
