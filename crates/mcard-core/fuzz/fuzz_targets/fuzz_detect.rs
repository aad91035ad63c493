//! Fuzz target for content-type detection.
//!
//! Properties validated:
//! - Detection never panics on arbitrary bytes or their lossy text form
//! - A MIME type and a dotted extension are always returned
//! - The binary heuristics accept any sample length

#![no_main]

use libfuzzer_sys::fuzz_target;
use mcard_core::{ContentTypeInterpreter, detect_content_type, is_binary_content};

fuzz_target!(|data: &[u8]| {
    let result = detect_content_type(data, None);
    assert!(!result.mime_type.is_empty());
    assert!(result.extension.starts_with('.'));

    let text = String::from_utf8_lossy(data);
    let _ = detect_content_type(&*text, Some(".json"));
    let hinted = detect_content_type(data, Some("json"));
    assert!(hinted.extension.starts_with('.'));
    let _ = is_binary_content(data, None);

    let interpreter = ContentTypeInterpreter::default();
    let _ = interpreter.is_unstructured_binary(data);
    let _ = interpreter.has_pathological_lines(data, false);
    let _ = ContentTypeInterpreter::quick_detect(data);
});
