//! Magic-number detection for binary formats.

use super::detector::ContentDetector;
use super::sample::ContentSample;
use crate::mime;

const RIFF: &[u8] = b"RIFF";

const SIGNATURES: &[(&[u8], &str)] = &[
    (&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], mime::IMAGE_PNG),
    (&[0xFF, 0xD8, 0xFF], mime::IMAGE_JPEG),
    (b"GIF87a", mime::IMAGE_GIF),
    (b"GIF89a", mime::IMAGE_GIF),
    (b"BM", mime::IMAGE_BMP),
    (&[0x00, 0x00, 0x01, 0x00], mime::IMAGE_ICON),
    (&[0x00, 0x00, 0x02, 0x00], mime::IMAGE_ICON),
    (b"%PDF", mime::APPLICATION_PDF),
    (&[0x50, 0x4B, 0x03, 0x04], mime::APPLICATION_ZIP),
    (&[0x1F, 0x8B, 0x08], mime::APPLICATION_GZIP),
    (&[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x00], mime::APPLICATION_RAR),
    (&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C], mime::APPLICATION_7Z),
    (b"SQLite format 3\0", mime::APPLICATION_SQLITE),
];

/// Bytes of a ZIP archive inspected for Office Open XML markers.
const ZIP_PROBE_BYTES: usize = 2048;

/// Recognises binary formats by their leading signature bytes.
pub struct BinarySignatureDetector;

impl BinarySignatureDetector {
    /// Classify `bytes` by signature; `application/octet-stream` when nothing
    /// matches.
    pub fn signature_mime(bytes: &[u8]) -> &'static str {
        if bytes.starts_with(RIFF) {
            return riff_format(bytes);
        }
        SIGNATURES
            .iter()
            .find(|(signature, _)| bytes.starts_with(signature))
            .map_or(mime::OCTET_STREAM, |&(_, mime_type)| {
                if mime_type == mime::APPLICATION_ZIP {
                    zip_format(bytes)
                } else {
                    mime_type
                }
            })
    }
}

impl ContentDetector for BinarySignatureDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        if Self::signature_mime(sample.bytes()) == mime::OCTET_STREAM {
            0.0
        } else {
            0.95
        }
    }

    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str> {
        Some(Self::signature_mime(sample.bytes()))
    }
}

fn riff_format(bytes: &[u8]) -> &'static str {
    match bytes.get(8..12) {
        Some(b"WAVE") => mime::AUDIO_WAV,
        Some(b"WEBP") => mime::IMAGE_WEBP,
        _ => mime::OCTET_STREAM,
    }
}

fn zip_format(bytes: &[u8]) -> &'static str {
    let header = String::from_utf8_lossy(&bytes[..bytes.len().min(ZIP_PROBE_BYTES)]);
    if header.contains("[Content_Types].xml") && header.contains("_rels/.rels") {
        if header.contains("word/") {
            return mime::DOCX;
        }
        if header.contains("xl/") {
            return mime::XLSX;
        }
        if header.contains("ppt/") {
            return mime::PPTX;
        }
    }
    mime::APPLICATION_ZIP
}
