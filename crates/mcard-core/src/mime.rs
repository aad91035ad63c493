//! MIME type constants and the MIME to file-extension table.

pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";
pub const APPLICATION_YAML: &str = "application/x-yaml";
pub const TEXT_CSV: &str = "text/csv";
pub const TEXT_SQL: &str = "text/x-sql";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_MARKDOWN: &str = "text/markdown";
pub const IMAGE_SVG: &str = "image/svg+xml";

pub const TEXT_PYTHON: &str = "text/x-python";
pub const TEXT_JAVASCRIPT: &str = "text/javascript";
pub const TEXT_JSX: &str = "text/jsx";
pub const TEXT_TYPESCRIPT: &str = "text/typescript";
pub const TEXT_C: &str = "text/x-c";
pub const TEXT_CPP: &str = "text/x-c++";

pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_GIF: &str = "image/gif";
pub const IMAGE_BMP: &str = "image/bmp";
pub const IMAGE_ICON: &str = "image/x-icon";
pub const IMAGE_WEBP: &str = "image/webp";
pub const AUDIO_WAV: &str = "audio/wav";
pub const APPLICATION_PDF: &str = "application/pdf";
pub const APPLICATION_ZIP: &str = "application/zip";
pub const APPLICATION_GZIP: &str = "application/gzip";
pub const APPLICATION_RAR: &str = "application/x-rar-compressed";
pub const APPLICATION_7Z: &str = "application/x-7z-compressed";
pub const APPLICATION_SQLITE: &str = "application/x-sqlite3";
pub const APPLICATION_OBJ: &str = "application/3d-obj";

pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Extension used when a MIME type has no table entry.
pub const DEFAULT_EXTENSION: &str = ".txt";

const MIME_TO_EXTENSION: &[(&str, &str)] = &[
    (TEXT_PLAIN, ".txt"),
    (APPLICATION_JSON, ".json"),
    (TEXT_CSV, ".csv"),
    (TEXT_PYTHON, ".py"),
    (TEXT_JAVASCRIPT, ".js"),
    (TEXT_JSX, ".jsx"),
    (TEXT_TYPESCRIPT, ".ts"),
    (TEXT_C, ".c"),
    (TEXT_CPP, ".cpp"),
    (APPLICATION_XML, ".xml"),
    (TEXT_HTML, ".html"),
    (APPLICATION_YAML, ".yaml"),
    (TEXT_MARKDOWN, ".md"),
    (TEXT_SQL, ".sql"),
    (IMAGE_PNG, ".png"),
    (IMAGE_JPEG, ".jpg"),
    (IMAGE_GIF, ".gif"),
    (IMAGE_BMP, ".bmp"),
    (IMAGE_ICON, ".ico"),
    (IMAGE_WEBP, ".webp"),
    (IMAGE_SVG, ".svg"),
    (APPLICATION_PDF, ".pdf"),
    (APPLICATION_ZIP, ".zip"),
    (APPLICATION_GZIP, ".gz"),
    (APPLICATION_RAR, ".rar"),
    (APPLICATION_7Z, ".7z"),
    (APPLICATION_SQLITE, ".db"),
    (AUDIO_WAV, ".wav"),
];

/// Look up the canonical extension (with leading dot) for `mime_type`.
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    MIME_TO_EXTENSION
        .iter()
        .find(|(mime, _)| *mime == mime_type)
        .map(|(_, ext)| *ext)
}

/// Pick the extension to report for `mime_type`, honouring a caller hint.
///
/// A hint without a leading dot is read as if it had one. The hint wins when
/// it agrees with the table case-insensitively or when the table has nothing
/// for this MIME type. Otherwise the table entry is used, and `.txt` when
/// there is neither. The result always starts with a dot.
pub fn reconcile_extension(mime_type: &str, hint: Option<&str>) -> String {
    let hint = hint
        .filter(|h| !h.is_empty() && *h != ".")
        .map(|h| {
            if h.starts_with('.') {
                h.to_string()
            } else {
                format!(".{h}")
            }
        });
    match (extension_for(mime_type), hint) {
        (Some(ext), Some(hint)) => {
            if hint.eq_ignore_ascii_case(ext) {
                hint
            } else {
                ext.to_string()
            }
        }
        (Some(ext), None) => ext.to_string(),
        (None, Some(hint)) => hint,
        (None, None) => DEFAULT_EXTENSION.to_string(),
    }
}

/// Text-like MIME types are never treated as binary.
pub fn is_text_mime(mime_type: &str) -> bool {
    mime_type.starts_with("text/")
        || ["json", "xml", "javascript", "ecmascript"]
            .iter()
            .any(|marker| mime_type.contains(marker))
}
