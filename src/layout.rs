//! Sheet template configuration.
//!
//! A layout describes where each test element's bubble block sits on the
//! canonical frame, as fractions of the frame dimensions. It is supplied
//! by the caller: a sheet template with a different number of questions,
//! choices or columns is a configuration change, not an algorithm change.

use serde::Deserialize;

/// One test element's bubble block as frame-relative fractions in [0, 1].
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ColumnSpec {
    pub start_x: f32,
    pub start_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Ordered list of bubble blocks plus the per-block sub-grid shape.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub columns: Vec<ColumnSpec>,
    pub questions_per_column: usize,
    pub choices_per_question: usize,
}

impl Default for SheetLayout {
    /// Four equal-width element columns spanning the full frame, 25
    /// questions of 4 choices each.
    fn default() -> Self {
        let columns = (0..4)
            .map(|i| ColumnSpec {
                start_x: i as f32 * 0.25,
                start_y: 0.0,
                width: 0.25,
                height: 1.0,
            })
            .collect();
        Self {
            columns,
            questions_per_column: 25,
            choices_per_question: 4,
        }
    }
}

impl SheetLayout {
    /// Total number of answers one analysis pass produces.
    pub fn total_questions(&self) -> usize {
        self.columns.len() * self.questions_per_column
    }
}
