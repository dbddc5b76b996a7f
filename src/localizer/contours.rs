//! Contour candidates from a binary edge mask.
//!
//! Edge pixels are grouped into 8-connected components; each component's
//! convex hull stands in for its external contour. For the outer boundary
//! of a rectangular sheet the hull *is* the quadrilateral, and it is what
//! the polygon simplification runs on. Candidates are ranked by enclosed
//! hull area, largest first, the sheet being assumed to be the dominant
//! foreground object.

use super::edges::neighbors8;
use crate::geometry::Point;
use crate::image::BinaryMask;

/// One contour candidate: a convex hull in counter-clockwise order plus
/// its enclosed area.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub hull: Vec<Point>,
    pub area: f32,
}

impl Candidate {
    pub fn perimeter(&self) -> f32 {
        let n = self.hull.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| {
                let a = self.hull[i];
                let b = self.hull[(i + 1) % n];
                ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt()
            })
            .sum()
    }
}

/// Extract contour candidates from the edge mask, sorted by area
/// descending. Components with fewer than `min_pixels` edge pixels are
/// noise and skipped.
pub fn find_candidates(edges: &BinaryMask, min_pixels: usize) -> Vec<Candidate> {
    let (w, h) = (edges.w, edges.h);
    let mut visited = vec![false; w * h];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut component: Vec<[i64; 2]> = Vec::new();
    let mut candidates = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if !edges.is_set(x, y) || visited[y * w + x] {
                continue;
            }
            component.clear();
            visited[y * w + x] = true;
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                component.push([cx as i64, cy as i64]);
                for (nx, ny) in neighbors8(cx, cy, w, h) {
                    if edges.is_set(nx, ny) && !visited[ny * w + nx] {
                        visited[ny * w + nx] = true;
                        stack.push((nx, ny));
                    }
                }
            }
            if component.len() < min_pixels {
                continue;
            }
            let hull = convex_hull(&mut component);
            if hull.len() < 3 {
                continue;
            }
            let area = polygon_area(&hull);
            candidates.push(Candidate { hull, area });
        }
    }

    candidates.sort_by(|a, b| b.area.total_cmp(&a.area));
    candidates
}

/// Andrew's monotone chain over integer points, output counter-clockwise
/// in image coordinates (y growing downward).
fn convex_hull(points: &mut Vec<[i64; 2]>) -> Vec<Point> {
    points.sort_unstable();
    points.dedup();
    let n = points.len();
    if n < 3 {
        return points.iter().map(|p| [p[0] as f32, p[1] as f32]).collect();
    }

    let cross = |o: [i64; 2], a: [i64; 2], b: [i64; 2]| -> i64 {
        (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
    };

    let mut hull: Vec<[i64; 2]> = Vec::with_capacity(2 * n);
    for &p in points.iter() {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in points.iter().rev() {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull.iter().map(|p| [p[0] as f32, p[1] as f32]).collect()
}

/// Shoelace area of a simple polygon.
pub fn polygon_area(poly: &[Point]) -> f32 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0f32;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        acc += a[0] * b[1] - b[0] * a[1];
    }
    acc.abs() * 0.5
}

/// Simplify a closed polygon with Douglas–Peucker at tolerance `epsilon`.
///
/// The closed ring is split at its two mutually farthest vertices and each
/// open chain is simplified independently, so the result always retains
/// those two anchors.
pub fn approx_polygon(poly: &[Point], epsilon: f32) -> Vec<Point> {
    let n = poly.len();
    if n <= 3 {
        return poly.to_vec();
    }

    let (mut ia, mut ib) = (0usize, 1usize);
    let mut best = -1.0f32;
    for i in 0..n {
        for j in i + 1..n {
            let d = dist2(poly[i], poly[j]);
            if d > best {
                best = d;
                ia = i;
                ib = j;
            }
        }
    }

    let chain_a: Vec<Point> = (ia..=ib).map(|i| poly[i]).collect();
    let chain_b: Vec<Point> = (ib..n).chain(0..=ia).map(|i| poly[i]).collect();

    let mut out = Vec::new();
    simplify_chain(&chain_a, epsilon, &mut out);
    out.pop(); // chain_b starts where chain_a ends
    simplify_chain(&chain_b, epsilon, &mut out);
    out.pop(); // closing vertex duplicates the start
    out
}

fn simplify_chain(chain: &[Point], epsilon: f32, out: &mut Vec<Point>) {
    if chain.len() <= 2 {
        out.extend_from_slice(chain);
        return;
    }
    let (first, last) = (chain[0], chain[chain.len() - 1]);
    let mut max_dist = 0.0f32;
    let mut max_idx = 0usize;
    for (i, &p) in chain.iter().enumerate().skip(1).take(chain.len() - 2) {
        let d = point_segment_distance(p, first, last);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }
    if max_dist > epsilon {
        simplify_chain(&chain[..=max_idx], epsilon, out);
        out.pop();
        simplify_chain(&chain[max_idx..], epsilon, out);
    } else {
        out.push(first);
        out.push(last);
    }
}

fn point_segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    if len2 <= f32::EPSILON {
        return ap[0].hypot(ap[1]);
    }
    let t = ((ap[0] * ab[0] + ap[1] * ab[1]) / len2).clamp(0.0, 1.0);
    let proj = [a[0] + t * ab[0], a[1] + t * ab[1]];
    (p[0] - proj[0]).hypot(p[1] - proj[1])
}

#[inline]
fn dist2(a: Point, b: Point) -> f32 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_ring(x0: usize, y0: usize, x1: usize, y1: usize, mask: &mut BinaryMask) {
        for x in x0..=x1 {
            mask.set(x, y0);
            mask.set(x, y1);
        }
        for y in y0..=y1 {
            mask.set(x0, y);
            mask.set(x1, y);
        }
    }

    #[test]
    fn rectangle_ring_simplifies_to_four_corners() {
        let mut mask = BinaryMask::new(100, 100);
        rect_ring(10, 20, 80, 70, &mut mask);
        let candidates = find_candidates(&mask, 16);
        assert_eq!(candidates.len(), 1);

        let c = &candidates[0];
        assert!((c.area - (70.0 * 50.0)).abs() < 5.0, "area={}", c.area);

        let poly = approx_polygon(&c.hull, 0.02 * c.perimeter());
        assert_eq!(poly.len(), 4, "poly={poly:?}");
    }

    #[test]
    fn candidates_are_sorted_largest_first() {
        let mut mask = BinaryMask::new(120, 120);
        rect_ring(5, 5, 110, 110, &mut mask);
        rect_ring(40, 40, 60, 60, &mut mask);
        let candidates = find_candidates(&mask, 16);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].area > candidates[1].area);
    }

    #[test]
    fn tiny_components_are_dropped() {
        let mut mask = BinaryMask::new(50, 50);
        mask.set(10, 10);
        mask.set(11, 10);
        assert!(find_candidates(&mask, 16).is_empty());
    }

    #[test]
    fn shoelace_area_of_unit_square() {
        let square: Vec<Point> = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert!((polygon_area(&square) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn collinear_points_collapse_to_segment_ends() {
        let chain: Vec<Point> = (0..10).map(|i| [i as f32, 0.01 * i as f32]).collect();
        let mut out = Vec::new();
        simplify_chain(&chain, 0.5, &mut out);
        assert_eq!(out.len(), 2);
    }
}
