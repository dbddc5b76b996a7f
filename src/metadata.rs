//! Sheet metadata from the QR code printed on the sheet.
//!
//! The payload is a `;`-delimited list of `KEY=VALUE` entries, with
//! `TYPE` (test variant), `SET` and `SEAT` (integers) recognized.
//! Decoding runs on the raw photograph before localization; when the
//! first pass finds nothing a contrast-equalized retry is attempted,
//! which recovers codes washed out by glare or shadow.

use crate::filters::{clahe, ClaheParams};
use crate::image::GrayBuffer;
use crate::types::SheetMetadata;
use serde::Deserialize;

/// QR decoding configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MetadataParams {
    /// Contrast equalization applied on the retry pass. `None` disables
    /// the retry.
    pub retry_clahe: Option<ClaheParams>,
}

impl Default for MetadataParams {
    fn default() -> Self {
        Self {
            retry_clahe: Some(ClaheParams::default()),
        }
    }
}

/// Decode sheet metadata from a grayscale photograph.
///
/// Returns `None` when no QR code is found, none decodes, or the decoded
/// payload is empty. A non-empty payload always yields `Some`, even when
/// it carries no known keys.
pub fn decode_metadata(gray: &GrayBuffer, params: &MetadataParams) -> Option<SheetMetadata> {
    let payload = decode_payload(gray).or_else(|| {
        let retry = params.retry_clahe.as_ref()?;
        log::debug!("metadata: first pass found no QR code, retrying with equalized contrast");
        decode_payload(&clahe(gray, retry))
    })?;
    if payload.trim().is_empty() {
        return None;
    }
    Some(parse_payload(&payload))
}

fn decode_payload(gray: &GrayBuffer) -> Option<String> {
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(gray.w, gray.h, |x, y| gray.get(x, y));
    for grid in prepared.detect_grids() {
        match grid.decode() {
            Ok((_, payload)) => {
                log::debug!("metadata: decoded QR payload {payload:?}");
                return Some(payload);
            }
            Err(err) => log::debug!("metadata: QR grid failed to decode: {err}"),
        }
    }
    None
}

/// Parse a `KEY=VALUE;KEY=VALUE` payload. Unknown keys and malformed
/// entries are skipped rather than failing the whole payload.
pub fn parse_payload(payload: &str) -> SheetMetadata {
    let mut meta = SheetMetadata::default();
    for entry in payload.split(';') {
        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };
        match key.trim() {
            "TYPE" => meta.test_type = Some(value.trim().to_string()),
            "SET" => meta.set_number = value.trim().parse().ok(),
            "SEAT" => meta.seat_number = value.trim().parse().ok(),
            other => log::debug!("metadata: ignoring unknown key {other:?}"),
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload_parses_every_field() {
        let meta = parse_payload("TYPE=C;SET=2;SEAT=17");
        assert_eq!(meta.test_type.as_deref(), Some("C"));
        assert_eq!(meta.set_number, Some(2));
        assert_eq!(meta.seat_number, Some(17));
    }

    #[test]
    fn empty_payload_yields_empty_metadata() {
        let meta = parse_payload("");
        assert!(meta.is_empty());
    }

    #[test]
    fn partial_payload_keeps_only_present_fields() {
        let meta = parse_payload("SET=2");
        assert_eq!(meta.set_number, Some(2));
        assert!(meta.test_type.is_none());
        assert!(meta.seat_number.is_none());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let meta = parse_payload("TYPE=A;garbage;SEAT=seventeen;SET=3");
        assert_eq!(meta.test_type.as_deref(), Some("A"));
        assert_eq!(meta.set_number, Some(3));
        assert!(meta.seat_number.is_none());
    }

    #[test]
    fn blank_image_decodes_nothing() {
        let gray = GrayBuffer::new(64, 64);
        assert!(decode_metadata(&gray, &MetadataParams::default()).is_none());
    }
}
