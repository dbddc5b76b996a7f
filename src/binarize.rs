//! Adaptive binarization of the rectified frame.
//!
//! Pencil marks must survive uneven lighting, so the threshold is local:
//! each pixel is compared against the mean of its surrounding block
//! (integral-image windowed mean) minus a fixed offset. The output is
//! inverted, marks become foreground on a background of zeros. An
//! optional CLAHE pass flattens strong illumination gradients first.

use crate::filters::{clahe, gaussian_blur, ClaheParams, IntegralImage};
use crate::image::{BinaryMask, GrayBuffer};
use serde::Deserialize;

/// Adaptive threshold configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BinarizeParams {
    /// Optional contrast equalization before thresholding.
    pub clahe: Option<ClaheParams>,
    /// Gaussian blur passes before thresholding.
    pub blur_passes: usize,
    /// Side length of the local mean window, odd.
    pub block_size: usize,
    /// Subtracted from the local mean; larger values keep only darker marks.
    pub offset: i32,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            clahe: None,
            blur_passes: 1,
            block_size: 31,
            offset: 3,
        }
    }
}

/// Threshold a rectified grayscale frame into a mark mask.
///
/// A pixel becomes foreground when it is darker than its local block mean
/// by more than `offset`.
pub fn binarize(frame: &GrayBuffer, params: &BinarizeParams) -> BinaryMask {
    let (w, h) = (frame.w, frame.h);
    let mut mask = BinaryMask::new(w, h);
    if w == 0 || h == 0 {
        return mask;
    }

    let equalized = match &params.clahe {
        Some(cp) => clahe(frame, cp),
        None => frame.clone(),
    };
    let smoothed = gaussian_blur(&equalized, params.blur_passes);
    let integral = IntegralImage::build(&smoothed);

    let half = (params.block_size.max(3) | 1) / 2;
    for y in 0..h {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half + 1).min(h);
        let src_row = smoothed.row(y);
        let dst_row = mask.row_mut(y);
        for x in 0..w {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half + 1).min(w);
            let area = ((x1 - x0) * (y1 - y0)) as i64;
            let mean = integral.window_sum(x0, y0, x1, y1) / area;
            if (src_row[x] as i64) < mean - params.offset as i64 {
                dst_row[x] = 255;
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_frame_produces_an_empty_mask() {
        let mut frame = GrayBuffer::new(64, 64);
        frame.data.fill(200);
        let mask = binarize(&frame, &BinarizeParams::default());
        assert_eq!(mask.data.iter().filter(|&&v| v != 0).count(), 0);
    }

    #[test]
    fn dark_patch_on_light_background_becomes_foreground() {
        let mut frame = GrayBuffer::new(96, 96);
        frame.data.fill(220);
        for y in 40..56 {
            for x in 40..56 {
                frame.set(x, y, 30);
            }
        }
        let mask = binarize(&frame, &BinarizeParams::default());
        assert!(mask.is_set(48, 48));
        assert!(!mask.is_set(10, 10));
    }

    #[test]
    fn marks_survive_an_illumination_gradient() {
        // Background sloping 140..230 across the frame, with one dark
        // patch on each end. A global threshold would lose one of them.
        let mut frame = GrayBuffer::new(128, 64);
        for y in 0..64 {
            for x in 0..128 {
                frame.set(x, y, 140 + (x * 90 / 127) as u8);
            }
        }
        for y in 28..36 {
            for x in 10..18 {
                frame.set(x, y, 40);
            }
            for x in 110..118 {
                frame.set(x, y, 100);
            }
        }
        let mask = binarize(&frame, &BinarizeParams::default());
        assert!(mask.is_set(14, 32), "dark-side mark lost");
        assert!(mask.is_set(114, 32), "bright-side mark lost");
    }

    #[test]
    fn clahe_pass_is_accepted() {
        let mut frame = GrayBuffer::new(64, 64);
        frame.data.fill(180);
        for y in 30..34 {
            for x in 30..34 {
                frame.set(x, y, 20);
            }
        }
        let params = BinarizeParams {
            clahe: Some(ClaheParams::default()),
            ..BinarizeParams::default()
        };
        let mask = binarize(&frame, &params);
        assert!(mask.is_set(31, 31));
    }
}
