//! Top-level analysis pipeline.
//!
//! Overview
//! - copy the borrowed input into an upright owned frame ([`Rotation`]),
//! - decode sheet metadata from the raw photograph ([`crate::metadata`]),
//! - localize and rectify the sheet ([`crate::localizer`]),
//! - binarize the canonical frame ([`crate::binarize`]),
//! - score the bubble grid ([`crate::scorer`]).
//!
//! A photograph without a recognizable sheet is a normal outcome: the
//! result simply carries no answers. Errors are reserved for unusable
//! input and resource exhaustion.

use crate::binarize::{binarize, BinarizeParams};
use crate::image::{GrayBuffer, ImageU8, Rotation};
use crate::layout::SheetLayout;
use crate::localizer::{LocalizerParams, SheetLocalizer};
use crate::metadata::{decode_metadata, MetadataParams};
use crate::scorer::{score_grid, ScorerParams};
use crate::types::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Pipeline failure. Absence of a sheet is not an error.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("input frame is empty or its buffer is shorter than its dimensions")]
    EmptyInput,
    #[error("frame allocation failed: {0}")]
    Allocation(String),
}

/// Full pipeline configuration, one section per stage.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzerParams {
    pub localizer: LocalizerParams,
    pub binarize: BinarizeParams,
    pub scorer: ScorerParams,
    pub metadata: MetadataParams,
    pub layout: SheetLayout,
}

/// Observer for intermediate frames, wired in for debugging runs.
pub trait DebugSink {
    fn emit(&mut self, stage: &str, frame: &GrayBuffer);
}

/// Per-stage wall-clock timings in milliseconds.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct TimingBreakdown {
    pub rotate_ms: f64,
    pub metadata_ms: f64,
    pub localize_ms: f64,
    pub binarize_ms: f64,
    pub score_ms: f64,
    pub total_ms: f64,
}

/// An [`AnalysisResult`] plus the timing trace that produced it.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub timing: TimingBreakdown,
}

/// The answer-sheet analyzer. Construct once, reuse across frames.
pub struct SheetAnalyzer {
    params: AnalyzerParams,
    localizer: SheetLocalizer,
    debug_sink: Option<Box<dyn DebugSink>>,
}

impl SheetAnalyzer {
    pub fn new(params: AnalyzerParams) -> Self {
        let localizer = SheetLocalizer::new(params.localizer.clone());
        Self {
            params,
            localizer,
            debug_sink: None,
        }
    }

    /// Attach a sink that receives every intermediate frame.
    pub fn with_debug_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    /// Analyze one photograph.
    pub fn analyze(
        &mut self,
        input: ImageU8<'_>,
        rotation: Rotation,
    ) -> Result<AnalysisResult, AnalyzeError> {
        self.analyze_with_diagnostics(input, rotation)
            .map(|report| report.result)
    }

    /// Analyze one photograph and report per-stage timings alongside the
    /// result.
    pub fn analyze_with_diagnostics(
        &mut self,
        input: ImageU8<'_>,
        rotation: Rotation,
    ) -> Result<AnalysisReport, AnalyzeError> {
        if input.is_degenerate() {
            return Err(AnalyzeError::EmptyInput);
        }
        let total_start = Instant::now();
        let mut timing = TimingBreakdown::default();

        let stage = Instant::now();
        let upright = GrayBuffer::from_view(input)
            .map_err(AnalyzeError::Allocation)?
            .rotated(rotation)
            .map_err(AnalyzeError::Allocation)?;
        timing.rotate_ms = ms_since(stage);
        self.emit("upright", &upright);

        let stage = Instant::now();
        let metadata = decode_metadata(&upright, &self.params.metadata);
        timing.metadata_ms = ms_since(stage);

        let stage = Instant::now();
        let rectified = self.localizer.locate_and_rectify(&upright);
        timing.localize_ms = ms_since(stage);

        let Some(frame) = rectified else {
            timing.total_ms = ms_since(total_start);
            log::debug!(
                "analyzer: no sheet found in {}x{} frame ({:.1} ms)",
                upright.w,
                upright.h,
                timing.total_ms
            );
            return Ok(AnalysisReport {
                result: AnalysisResult {
                    metadata,
                    answers: Vec::new(),
                },
                timing,
            });
        };
        self.emit("rectified", &frame);

        let stage = Instant::now();
        let mask = binarize(&frame, &self.params.binarize);
        timing.binarize_ms = ms_since(stage);
        if self.debug_sink.is_some() {
            let as_gray = mask.to_gray();
            self.emit("binarized", &as_gray);
        }

        let stage = Instant::now();
        let answers = score_grid(&mask, &self.params.layout, &self.params.scorer);
        timing.score_ms = ms_since(stage);

        timing.total_ms = ms_since(total_start);
        log::debug!(
            "analyzer: {} answers, metadata {} ({:.1} ms total)",
            answers.len(),
            if metadata.is_some() { "decoded" } else { "absent" },
            timing.total_ms
        );
        Ok(AnalysisReport {
            result: AnalysisResult { metadata, answers },
            timing,
        })
    }

    fn emit(&mut self, stage: &str, frame: &GrayBuffer) {
        if let Some(sink) = self.debug_sink.as_mut() {
            sink.emit(stage, frame);
        }
    }
}

fn ms_since(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_input_is_rejected() {
        let mut analyzer = SheetAnalyzer::new(AnalyzerParams::default());
        let empty = ImageU8 {
            w: 0,
            h: 0,
            stride: 0,
            data: &[],
        };
        assert!(matches!(
            analyzer.analyze(empty, Rotation::None),
            Err(AnalyzeError::EmptyInput)
        ));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let mut analyzer = SheetAnalyzer::new(AnalyzerParams::default());
        let data = [0u8; 10];
        let short = ImageU8 {
            w: 8,
            h: 8,
            stride: 8,
            data: &data,
        };
        assert!(matches!(
            analyzer.analyze(short, Rotation::None),
            Err(AnalyzeError::EmptyInput)
        ));
    }
}
