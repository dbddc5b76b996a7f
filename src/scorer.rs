//! Bubble-grid scoring over the binarized canonical frame.
//!
//! Each layout column is an independent bubble block split into a
//! `questions × choices` grid. A cell's score combines its foreground
//! fill ratio with the size of its largest connected blob, so a single
//! solid pencil mark outranks scattered speckle of the same pixel count.
//! Per question the scores decide between a winning choice, no mark
//! ([`NO_MARK`]) and several competing marks ([`MULTIPLE_MARKS`]).

use crate::geometry::{fractional_region, PixelRect};
use crate::image::BinaryMask;
use crate::layout::SheetLayout;
use crate::types::{DetectedAnswer, MULTIPLE_MARKS, NO_MARK};
use serde::Deserialize;

/// Mark classification thresholds.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ScorerParams {
    /// Fraction shaved off each cell edge before scoring, to keep grid
    /// lines and neighbor bleed out of the tally.
    pub cell_padding: f32,
    /// Questions whose best score stays below this are unanswered.
    pub score_floor: f32,
    /// The best score must exceed the row average by this factor,
    /// otherwise the row is uniform noise and counts as unanswered.
    pub min_fill_multiplier: f32,
    /// A runner-up above `best * dominance_ratio` makes the question
    /// ambiguous.
    pub dominance_ratio: f32,
}

impl Default for ScorerParams {
    fn default() -> Self {
        Self {
            cell_padding: 0.12,
            score_floor: 0.12,
            min_fill_multiplier: 1.1,
            dominance_ratio: 0.8,
        }
    }
}

/// Score every question cell in the layout and classify each question.
///
/// Produces exactly one answer per `(test_index, question_number)` pair,
/// question numbers 1-based within their column.
pub fn score_grid(
    mask: &BinaryMask,
    layout: &SheetLayout,
    params: &ScorerParams,
) -> Vec<DetectedAnswer> {
    let mut answers = Vec::with_capacity(layout.total_questions());
    let mut scores = vec![0f32; layout.choices_per_question];

    for (test_index, column) in layout.columns.iter().enumerate() {
        let region = fractional_region(mask.w, mask.h, column);
        for q in 0..layout.questions_per_column {
            for (c, score) in scores.iter_mut().enumerate() {
                let cell = question_cell(&region, layout, q, c).inset(params.cell_padding);
                *score = cell_score(mask, &cell);
            }
            let detected = classify_row(&scores, params);
            log::debug!(
                "scorer: element {} question {} scores {:?} -> {}",
                test_index,
                q + 1,
                scores,
                detected
            );
            answers.push(DetectedAnswer {
                test_index,
                question_number: q + 1,
                detected,
            });
        }
    }
    answers
}

/// Sub-rect of `region` for question row `q`, choice column `c`.
fn question_cell(region: &PixelRect, layout: &SheetLayout, q: usize, c: usize) -> PixelRect {
    let rows = layout.questions_per_column.max(1);
    let cols = layout.choices_per_question.max(1);
    let y0 = region.y0 + q * region.height() / rows;
    let y1 = region.y0 + (q + 1) * region.height() / rows;
    let x0 = region.x0 + c * region.width() / cols;
    let x1 = region.x0 + (c + 1) * region.width() / cols;
    PixelRect { x0, y0, x1, y1 }
}

/// Fill ratio plus largest-blob ratio for one padded cell.
fn cell_score(mask: &BinaryMask, cell: &PixelRect) -> f32 {
    let area = cell.area();
    if area == 0 {
        return 0.0;
    }
    let fill = mask.count_in_rect(cell) as f32 / area as f32;
    let blob = largest_component(mask, cell) as f32 / area as f32;
    fill + blob
}

/// Size in pixels of the largest 8-connected foreground component whose
/// pixels lie inside `cell`.
fn largest_component(mask: &BinaryMask, cell: &PixelRect) -> usize {
    let (cw, ch) = (cell.width(), cell.height());
    if cw == 0 || ch == 0 {
        return 0;
    }
    let mut visited = vec![false; cw * ch];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut best = 0usize;

    for ly in 0..ch {
        for lx in 0..cw {
            if visited[ly * cw + lx] || !mask.is_set(cell.x0 + lx, cell.y0 + ly) {
                continue;
            }
            visited[ly * cw + lx] = true;
            stack.push((lx, ly));
            let mut size = 0usize;
            while let Some((x, y)) = stack.pop() {
                size += 1;
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i32 + dx;
                        let ny = y as i32 + dy;
                        if nx < 0 || ny < 0 || nx as usize >= cw || ny as usize >= ch {
                            continue;
                        }
                        let (nx, ny) = (nx as usize, ny as usize);
                        if !visited[ny * cw + nx] && mask.is_set(cell.x0 + nx, cell.y0 + ny) {
                            visited[ny * cw + nx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }
            best = best.max(size);
        }
    }
    best
}

/// Classify one question row from its per-choice scores.
fn classify_row(scores: &[f32], params: &ScorerParams) -> i32 {
    if scores.is_empty() {
        return NO_MARK;
    }
    let mut best_idx = 0usize;
    let mut best = f32::MIN;
    let mut second = f32::MIN;
    let mut sum = 0f32;
    for (i, &s) in scores.iter().enumerate() {
        sum += s;
        if s > best {
            second = best;
            best = s;
            best_idx = i;
        } else if s > second {
            second = s;
        }
    }
    let avg = sum / scores.len() as f32;

    if best < params.score_floor {
        return NO_MARK;
    }
    if best < avg * params.min_fill_multiplier {
        return NO_MARK;
    }
    if scores.len() > 1 && second > best * params.dominance_ratio {
        return MULTIPLE_MARKS;
    }
    best_idx as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ColumnSpec;

    fn single_column_layout() -> SheetLayout {
        SheetLayout {
            columns: vec![ColumnSpec {
                start_x: 0.0,
                start_y: 0.0,
                width: 1.0,
                height: 1.0,
            }],
            questions_per_column: 5,
            choices_per_question: 4,
        }
    }

    /// Fill the center of cell `(q, c)` in a single-column mask.
    fn fill_cell(mask: &mut BinaryMask, layout: &SheetLayout, q: usize, c: usize) {
        let region = fractional_region(mask.w, mask.h, &layout.columns[0]);
        let cell = question_cell(&region, layout, q, c).inset(0.25);
        for y in cell.y0..cell.y1 {
            for x in cell.x0..cell.x1 {
                mask.set(x, y);
            }
        }
    }

    #[test]
    fn filled_cell_wins_its_question() {
        let layout = single_column_layout();
        let mut mask = BinaryMask::new(160, 200);
        for q in 0..5 {
            fill_cell(&mut mask, &layout, q, q % 4);
        }
        let answers = score_grid(&mask, &layout, &ScorerParams::default());
        assert_eq!(answers.len(), 5);
        for (q, ans) in answers.iter().enumerate() {
            assert_eq!(ans.test_index, 0);
            assert_eq!(ans.question_number, q + 1);
            assert_eq!(ans.detected, (q % 4) as i32, "question {}", q + 1);
        }
    }

    #[test]
    fn blank_rows_are_unanswered() {
        let layout = single_column_layout();
        let mask = BinaryMask::new(160, 200);
        let answers = score_grid(&mask, &layout, &ScorerParams::default());
        assert!(answers.iter().all(|a| a.detected == NO_MARK));
    }

    #[test]
    fn two_comparable_marks_are_ambiguous() {
        let layout = single_column_layout();
        let mut mask = BinaryMask::new(160, 200);
        fill_cell(&mut mask, &layout, 2, 0);
        fill_cell(&mut mask, &layout, 2, 3);
        let answers = score_grid(&mask, &layout, &ScorerParams::default());
        assert_eq!(answers[2].detected, MULTIPLE_MARKS);
        assert_eq!(answers[0].detected, NO_MARK);
    }

    #[test]
    fn faint_speckle_stays_unanswered() {
        let layout = single_column_layout();
        let mut mask = BinaryMask::new(160, 200);
        // A couple of isolated pixels per cell, well under the floor.
        let region = fractional_region(160, 200, &layout.columns[0]);
        for q in 0..5 {
            for c in 0..4 {
                let cell = question_cell(&region, &layout, q, c);
                mask.set(cell.x0 + 2, cell.y0 + 2);
            }
        }
        let answers = score_grid(&mask, &layout, &ScorerParams::default());
        assert!(answers.iter().all(|a| a.detected == NO_MARK));
    }

    #[test]
    fn solid_blob_outranks_equal_count_speckle() {
        let mut mask = BinaryMask::new(40, 40);
        let cell = PixelRect {
            x0: 0,
            y0: 0,
            x1: 20,
            y1: 20,
        };
        // 16 pixels as a 4x4 block.
        for y in 8..12 {
            for x in 8..12 {
                mask.set(x, y);
            }
        }
        let solid = cell_score(&mask, &cell);

        let mut speckle = BinaryMask::new(40, 40);
        // 16 isolated pixels spread out on a sparse lattice.
        for i in 0..4 {
            for j in 0..4 {
                speckle.set(2 + i * 5, 2 + j * 5);
            }
        }
        let sparse = cell_score(&speckle, &cell);
        assert!(solid > sparse, "solid={solid} sparse={sparse}");
    }

    #[test]
    fn classification_respects_dominance_ratio() {
        let params = ScorerParams::default();
        assert_eq!(classify_row(&[0.9, 0.1, 0.05, 0.0], &params), 0);
        assert_eq!(classify_row(&[0.9, 0.8, 0.05, 0.0], &params), MULTIPLE_MARKS);
        assert_eq!(classify_row(&[0.05, 0.04, 0.05, 0.0], &params), NO_MARK);
    }
}
