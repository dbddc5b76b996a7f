use serde::Serialize;

/// Classification code for a question with no convincing mark.
pub const NO_MARK: i32 = -1;
/// Classification code for a question whose top two choices are too close to call.
pub const MULTIPLE_MARKS: i32 = -2;

/// One classified question on the sheet.
///
/// `detected` is either a choice index in `0..choices_per_question`,
/// [`NO_MARK`] or [`MULTIPLE_MARKS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DetectedAnswer {
    /// Index of the test element (column block) on the sheet, 0-based.
    pub test_index: usize,
    /// Question number within the element, 1-based.
    pub question_number: usize,
    pub detected: i32,
}

/// Sheet identity parsed from the QR payload. Fields absent from the
/// payload stay unset rather than defaulting to a guessed value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SheetMetadata {
    pub test_type: Option<String>,
    pub set_number: Option<i32>,
    pub seat_number: Option<i32>,
}

impl SheetMetadata {
    pub fn is_empty(&self) -> bool {
        self.test_type.is_none() && self.set_number.is_none() && self.seat_number.is_none()
    }
}

/// The pipeline's sole externally visible output: one record per
/// `analyze` call.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AnalysisResult {
    pub metadata: Option<SheetMetadata>,
    pub answers: Vec<DetectedAnswer>,
}
