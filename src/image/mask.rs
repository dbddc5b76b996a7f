//! Binary mark/no-mark mask produced by the binarizer.

use super::gray::GrayBuffer;
use crate::geometry::PixelRect;

/// Owned binary image with the same dimensions as the frame it was
/// derived from. Foreground (marked) pixels are 255, background 0.
#[derive(Clone, Debug)]
pub struct BinaryMask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl BinaryMask {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0u8; w * h],
        }
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize) {
        self.data[y * self.w + x] = 255;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.w;
        let end = start + self.w;
        &mut self.data[start..end]
    }

    /// Count foreground pixels inside `rect` (which must lie within the
    /// mask bounds).
    pub fn count_in_rect(&self, rect: &PixelRect) -> usize {
        debug_assert!(rect.x1 <= self.w && rect.y1 <= self.h);
        let mut count = 0usize;
        for y in rect.y0..rect.y1 {
            let row = &self.row(y)[rect.x0..rect.x1];
            count += row.iter().filter(|&&v| v != 0).count();
        }
        count
    }

    /// Copy into a grayscale buffer, for debug sinks and mask inspection.
    pub fn to_gray(&self) -> GrayBuffer {
        GrayBuffer {
            w: self.w,
            h: self.h,
            data: self.data.clone(),
        }
    }
}
