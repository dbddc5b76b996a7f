/// Borrowed single-channel 8-bit image view.
///
/// The entry point for callers handing the pipeline a camera frame or a
/// decoded file without copying it first. `stride` is the number of bytes
/// between consecutive rows and may exceed `w` for padded buffers.
#[derive(Clone, Copy, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }

    /// True when the buffer holds no pixels or is too short for its
    /// declared dimensions.
    pub fn is_degenerate(&self) -> bool {
        self.w == 0
            || self.h == 0
            || self.stride < self.w
            || self.data.len() < (self.h - 1) * self.stride + self.w
    }
}
