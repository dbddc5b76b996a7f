//! I/O helpers for grayscale frames and JSON.
//!
//! - `load_gray`: read a PNG/JPEG/etc. into an owned 8-bit gray buffer.
//! - `save_gray`: write a [`GrayBuffer`] to a grayscale PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
//! - [`PngDebugSink`]: a [`DebugSink`] that drops every stage frame into a
//!   directory as numbered PNGs.

use super::gray::GrayBuffer;
use crate::analyzer::DebugSink;
use image::{GrayImage, ImageBuffer, Luma};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_gray(path: &Path) -> Result<GrayBuffer, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    let w = img.width() as usize;
    let h = img.height() as usize;
    Ok(GrayBuffer {
        w,
        h,
        data: img.into_raw(),
    })
}

/// Save an 8-bit grayscale buffer to a PNG.
pub fn save_gray(buffer: &GrayBuffer, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let img: ImageBuffer<Luma<u8>, Vec<u8>> =
        GrayImage::from_raw(buffer.w as u32, buffer.h as u32, buffer.data.clone())
            .ok_or_else(|| "Failed to create image buffer".to_string())?;
    img.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

/// Debug sink writing `NN_stage.png` files into a directory. Purely
/// observational; failures are logged and never affect the pipeline.
pub struct PngDebugSink {
    dir: PathBuf,
    counter: usize,
}

impl PngDebugSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: 0,
        }
    }
}

impl DebugSink for PngDebugSink {
    fn emit(&mut self, stage: &str, frame: &GrayBuffer) {
        self.counter += 1;
        let path = self.dir.join(format!("{:02}_{stage}.png", self.counter));
        if let Err(err) = save_gray(frame, &path) {
            log::debug!("debug sink failed for stage {stage}: {err}");
        }
    }
}
