//! Owned single-channel 8-bit image in row-major layout (stride == width).
//!
//! Every pipeline stage consumes buffers of this type and produces a new
//! one; stages never mutate another stage's output in place.

use super::u8::ImageU8;

#[derive(Clone, Debug)]
pub struct GrayBuffer {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage in row-major order, `w * h` bytes
    pub data: Vec<u8>,
}

/// Acquisition-time rotation of a frame, applied clockwise to bring the
/// buffer upright before analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl GrayBuffer {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0u8; w * h],
        }
    }

    /// Fallible construction for input-sized allocations. The per-call
    /// failure surface for resource exhaustion lives here; stage-internal
    /// buffers are bounded by the fixed canonical frame size.
    pub fn try_new(w: usize, h: usize) -> Result<Self, String> {
        let len = w * h;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| format!("cannot allocate {len} byte frame: {e}"))?;
        data.resize(len, 0);
        Ok(Self { w, h, data })
    }

    /// Copy a borrowed view into an owned, tightly packed buffer.
    pub fn from_view(view: ImageU8<'_>) -> Result<Self, String> {
        let mut out = Self::try_new(view.w, view.h)?;
        for y in 0..view.h {
            out.row_mut(y).copy_from_slice(view.row(y));
        }
        Ok(out)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.w + x] = v;
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

    /// Borrow as a read-only view.
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: &self.data,
        }
    }

    /// Return a copy rotated clockwise by the given amount. `Rotation::None`
    /// still copies so the caller always owns an upright, tightly packed
    /// frame.
    pub fn rotated(&self, rotation: Rotation) -> Result<GrayBuffer, String> {
        match rotation {
            Rotation::None => {
                let mut out = GrayBuffer::try_new(self.w, self.h)?;
                out.data.copy_from_slice(&self.data);
                Ok(out)
            }
            Rotation::Deg90 => {
                let mut out = GrayBuffer::try_new(self.h, self.w)?;
                for y in 0..self.h {
                    let src = self.row(y);
                    for x in 0..self.w {
                        out.set(self.h - 1 - y, x, src[x]);
                    }
                }
                Ok(out)
            }
            Rotation::Deg180 => {
                let mut out = GrayBuffer::try_new(self.w, self.h)?;
                for y in 0..self.h {
                    let src = self.row(y);
                    let dst = out.row_mut(self.h - 1 - y);
                    for x in 0..self.w {
                        dst[self.w - 1 - x] = src[x];
                    }
                }
                Ok(out)
            }
            Rotation::Deg270 => {
                let mut out = GrayBuffer::try_new(self.h, self.w)?;
                for y in 0..self.h {
                    let src = self.row(y);
                    for x in 0..self.w {
                        out.set(y, self.w - 1 - x, src[x]);
                    }
                }
                Ok(out)
            }
        }
    }
}

/// Convert interleaved RGB bytes to luma (ITU-R BT.601 weights).
pub fn luma_from_rgb(rgb: &[u8], w: usize, h: usize) -> Result<GrayBuffer, String> {
    luma_with_step(rgb, w, h, 3)
}

/// Convert interleaved RGBA bytes to luma, ignoring alpha.
pub fn luma_from_rgba(rgba: &[u8], w: usize, h: usize) -> Result<GrayBuffer, String> {
    luma_with_step(rgba, w, h, 4)
}

fn luma_with_step(px: &[u8], w: usize, h: usize, step: usize) -> Result<GrayBuffer, String> {
    let needed = w * h * step;
    if px.len() < needed {
        return Err(format!(
            "pixel buffer holds {} bytes, {needed} needed for {w}x{h}",
            px.len()
        ));
    }
    let mut out = GrayBuffer::try_new(w, h)?;
    for (i, dst) in out.data.iter_mut().enumerate() {
        let base = i * step;
        let r = px[base] as u32;
        let g = px[base + 1] as u32;
        let b = px[base + 2] as u32;
        // (77R + 150G + 29B) >> 8 approximates 0.299R + 0.587G + 0.114B
        *dst = ((77 * r + 150 * g + 29 * b) >> 8) as u8;
    }
    Ok(out)
}
