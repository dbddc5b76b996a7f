//! Sheet localization: find the answer sheet's outer boundary in a
//! photograph and rectify it to the canonical frame.
//!
//! Overview
//! - blur the grayscale input to kill sensor noise,
//! - run the Canny-style edge detector ([`edges`]),
//! - group edge pixels into contour candidates and simplify each hull
//!   with Douglas–Peucker at 2% of its perimeter ([`contours`]),
//! - accept the largest candidate that simplifies to exactly four
//!   vertices and covers enough of the image,
//! - order its corners and warp the quad onto the canonical frame
//!   ([`warp`]).
//!
//! Localization is best-effort: a frame with no sheet in it yields
//! `None`, never an error.

pub mod contours;
pub mod edges;
pub mod warp;

use crate::filters::gaussian_blur;
use crate::geometry::{order_quadrilateral, Quad};
use crate::image::GrayBuffer;
use edges::EdgeParams;
use serde::Deserialize;

/// Tuning knobs for sheet localization.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LocalizerParams {
    /// Gaussian blur passes before edge detection.
    pub blur_passes: usize,
    pub edge: EdgeParams,
    /// Douglas–Peucker tolerance as a fraction of the contour perimeter.
    pub approx_eps_frac: f32,
    /// Edge components smaller than this are treated as noise.
    pub min_component_pixels: usize,
    /// Candidates below this fraction of the input image area are noise
    /// blobs, not sheets. Small by design: a sheet photographed from a
    /// distance still has to clear it.
    pub min_quad_area_frac: f32,
    /// Canonical frame width in pixels.
    pub frame_width: usize,
    /// Canonical frame height in pixels.
    pub frame_height: usize,
}

impl Default for LocalizerParams {
    fn default() -> Self {
        Self {
            blur_passes: 1,
            edge: EdgeParams::default(),
            approx_eps_frac: 0.02,
            min_component_pixels: 64,
            min_quad_area_frac: 0.01,
            frame_width: 1200,
            frame_height: 1600,
        }
    }
}

/// Finds the sheet boundary and produces the rectified canonical frame.
pub struct SheetLocalizer {
    params: LocalizerParams,
}

impl SheetLocalizer {
    pub fn new(params: LocalizerParams) -> Self {
        let mut params = params;
        // A zero canonical frame from a bad config file must not take
        // down the downstream region math.
        params.frame_width = params.frame_width.max(1);
        params.frame_height = params.frame_height.max(1);
        Self { params }
    }

    /// Locate the sheet quad in `gray`, or `None` when no plausible
    /// boundary is present.
    pub fn locate(&self, gray: &GrayBuffer) -> Option<Quad> {
        let p = &self.params;
        let blurred = gaussian_blur(gray, p.blur_passes);
        let edge_mask = edges::detect_edges(&blurred, &p.edge);
        let candidates = contours::find_candidates(&edge_mask, p.min_component_pixels);
        log::debug!(
            "localizer: {} contour candidate(s) in {}x{} frame",
            candidates.len(),
            gray.w,
            gray.h
        );

        let min_area = p.min_quad_area_frac * (gray.w * gray.h) as f32;
        for cand in &candidates {
            if cand.area < min_area {
                // Sorted by area, nothing further can pass.
                break;
            }
            let poly = contours::approx_polygon(&cand.hull, p.approx_eps_frac * cand.perimeter());
            if poly.len() != 4 {
                log::debug!(
                    "localizer: candidate area {:.0} simplified to {} vertices, skipping",
                    cand.area,
                    poly.len()
                );
                continue;
            }
            let quad = order_quadrilateral([poly[0], poly[1], poly[2], poly[3]]);
            log::debug!(
                "localizer: accepted quad tl={:?} tr={:?} br={:?} bl={:?}",
                quad.tl,
                quad.tr,
                quad.br,
                quad.bl
            );
            return Some(quad);
        }
        None
    }

    /// Locate the sheet and warp it onto the canonical frame.
    pub fn locate_and_rectify(&self, gray: &GrayBuffer) -> Option<GrayBuffer> {
        let quad = self.locate(gray)?;
        self.rectify(gray, &quad)
    }

    /// Warp a known quad onto the canonical frame.
    pub fn rectify(&self, gray: &GrayBuffer, quad: &Quad) -> Option<GrayBuffer> {
        let p = &self.params;
        let h = warp::homography_to_quad(quad, p.frame_width, p.frame_height)?;
        Some(warp::warp_perspective(gray, &h, p.frame_width, p.frame_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_sheet(w: usize, h: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> GrayBuffer {
        let mut img = GrayBuffer::new(w, h);
        img.data.fill(40);
        for y in y0..y1 {
            for x in x0..x1 {
                img.set(x, y, 230);
            }
        }
        img
    }

    #[test]
    fn locates_a_bright_rectangle_on_dark_background() {
        let img = frame_with_sheet(200, 260, 30, 40, 170, 220);
        let localizer = SheetLocalizer::new(LocalizerParams::default());
        let quad = localizer.locate(&img).expect("sheet not found");
        assert!((quad.tl[0] - 30.0).abs() < 4.0, "tl={:?}", quad.tl);
        assert!((quad.tl[1] - 40.0).abs() < 4.0, "tl={:?}", quad.tl);
        assert!((quad.br[0] - 170.0).abs() < 4.0, "br={:?}", quad.br);
        assert!((quad.br[1] - 220.0).abs() < 4.0, "br={:?}", quad.br);
    }

    #[test]
    fn empty_frame_yields_none() {
        let mut img = GrayBuffer::new(200, 260);
        img.data.fill(128);
        let localizer = SheetLocalizer::new(LocalizerParams::default());
        assert!(localizer.locate(&img).is_none());
    }

    #[test]
    fn small_blob_is_rejected_by_the_area_gate() {
        // A 20x20 patch in a 200x260 frame is below 1% of the area.
        let img = frame_with_sheet(200, 260, 90, 110, 110, 130);
        let localizer = SheetLocalizer::new(LocalizerParams::default());
        assert!(localizer.locate(&img).is_none());
    }

    #[test]
    fn distant_sheet_covering_a_small_fraction_is_still_located() {
        // 150x200 sheet in a 600x800 photo, about 6% of the frame area.
        let img = frame_with_sheet(600, 800, 400, 500, 550, 700);
        let localizer = SheetLocalizer::new(LocalizerParams::default());
        let quad = localizer.locate(&img).expect("distant sheet not found");
        assert!((quad.tl[0] - 400.0).abs() < 4.0, "tl={:?}", quad.tl);
        assert!((quad.tl[1] - 500.0).abs() < 4.0, "tl={:?}", quad.tl);
        assert!((quad.br[0] - 550.0).abs() < 4.0, "br={:?}", quad.br);
        assert!((quad.br[1] - 700.0).abs() < 4.0, "br={:?}", quad.br);
    }

    #[test]
    fn zero_canonical_frame_is_clamped_at_construction() {
        let img = frame_with_sheet(200, 260, 30, 40, 170, 220);
        let params = LocalizerParams {
            frame_width: 0,
            frame_height: 0,
            ..LocalizerParams::default()
        };
        let localizer = SheetLocalizer::new(params);
        let frame = localizer.locate_and_rectify(&img).expect("sheet not found");
        assert_eq!((frame.w, frame.h), (1, 1));
    }

    #[test]
    fn rectification_of_a_flat_sheet_reproduces_its_content() {
        // Sheet occupying (40,60)..(240,320) with a dark patch covering
        // its central fifth. After rectification the patch must land on
        // the central fifth of the canonical frame.
        let mut img = frame_with_sheet(300, 400, 40, 60, 240, 320);
        for y in 164..216 {
            for x in 120..160 {
                img.set(x, y, 60);
            }
        }
        let params = LocalizerParams {
            frame_width: 200,
            frame_height: 260,
            ..LocalizerParams::default()
        };
        let localizer = SheetLocalizer::new(params);
        let frame = localizer.locate_and_rectify(&img).expect("sheet not found");

        assert!(frame.get(100, 130) < 100, "patch center not dark");
        assert!(frame.get(30, 30) > 180, "sheet background not bright");
        assert!(frame.get(170, 230) > 180, "sheet background not bright");
    }

    #[test]
    fn rectified_frame_has_canonical_dimensions() {
        let img = frame_with_sheet(200, 260, 30, 40, 170, 220);
        let params = LocalizerParams {
            frame_width: 300,
            frame_height: 400,
            ..LocalizerParams::default()
        };
        let localizer = SheetLocalizer::new(params);
        let frame = localizer.locate_and_rectify(&img).expect("sheet not found");
        assert_eq!((frame.w, frame.h), (300, 400));
        // Interior of the rectified frame is sheet-bright.
        assert!(frame.get(150, 200) > 180);
    }
}
