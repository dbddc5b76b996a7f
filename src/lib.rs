#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod analyzer;
pub mod config;
pub mod image;
pub mod layout;
pub mod types;

// Stage modules – public for tools and tuning, but considered internals.
pub mod binarize;
pub mod filters;
pub mod geometry;
pub mod localizer;
pub mod metadata;
pub mod scorer;

// --- High-level re-exports -------------------------------------------------

// Main entry points: analyzer + results.
pub use crate::analyzer::{AnalyzeError, AnalyzerParams, SheetAnalyzer};
pub use crate::types::{AnalysisResult, DetectedAnswer, SheetMetadata, MULTIPLE_MARKS, NO_MARK};

// Diagnostics returned by the analyzer.
pub use crate::analyzer::{AnalysisReport, DebugSink, TimingBreakdown};

// Sheet geometry is configuration; callers build these directly.
pub use crate::layout::{ColumnSpec, SheetLayout};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use omr_scanner::prelude::*;
///
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let mut analyzer = SheetAnalyzer::new(AnalyzerParams::default());
/// let result = analyzer.analyze(img, Rotation::None).unwrap();
/// println!("answers={}", result.answers.len());
/// ```
pub mod prelude {
    pub use crate::image::{ImageU8, Rotation};
    pub use crate::{AnalysisResult, AnalyzerParams, SheetAnalyzer};
}
