//! Runtime configuration for the demo binary.
//!
//! A single JSON file selects the input photograph, output locations and
//! the full set of pipeline parameters. Every section is optional and
//! falls back to the stage defaults.

use crate::analyzer::AnalyzerParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the demo binary writes its results.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Analysis result as pretty JSON; stdout when unset.
    pub json_out: Option<PathBuf>,
    /// Directory receiving intermediate stage frames as PNGs.
    pub debug_dir: Option<PathBuf>,
}

/// Top-level configuration file contents.
#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    /// Photograph to analyze.
    pub input_path: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analyzer: AnalyzerParams,
}

/// Load and parse a JSON configuration file.
pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("Invalid config {}: {e}", path.display()))
}
