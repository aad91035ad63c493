//! End-to-end detection behaviour through the public API.

use mcard_core::{
    ContentTypeInterpreter, GTime, MCard, compute_hash, detect_content_type, is_binary_content,
    validate, validate_handle,
};
use proptest::prelude::*;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

#[test]
fn well_formed_json_is_json() {
    let result = detect_content_type(r#"{"a": 1, "b": [2,3]}"#, None);
    assert_eq!(result.mime_type, "application/json");
    assert_eq!(result.extension, ".json");
}

#[test]
fn dotless_json_hint_reports_dotted_extension() {
    let result = detect_content_type(r#"{"a": 1}"#, Some("json"));
    assert_eq!(result.mime_type, "application/json");
    assert_eq!(result.extension, ".json");
}

#[test]
fn malformed_json_is_not_json() {
    assert_ne!(detect_content_type("{a: 1", None).mime_type, "application/json");
}

#[test]
fn python_main_guard() {
    let source = "if __name__ == \"__main__\":\n    print('hi')";
    let result = detect_content_type(source, None);
    assert_eq!(result.mime_type, "text/x-python");
    assert_eq!(result.extension, ".py");
}

#[test]
fn two_short_comma_lines_are_plain_text() {
    assert_eq!(
        detect_content_type("Hello, world\nGoodbye, friend", None).mime_type,
        "text/plain"
    );
}

#[test]
fn real_csv_is_csv() {
    let csv = "name,age,city\nalice,30,paris\nbob,25,berlin\ncarol,41,rome\n";
    assert_eq!(detect_content_type(csv, None).mime_type, "text/csv");
}

#[test]
fn markdown_document() {
    let doc = "# Title\n\nSome intro text.\n\n## Section\n\n- one\n- two\n\n```rust\nfn main() {}\n```\n";
    assert_eq!(detect_content_type(doc, None).mime_type, "text/markdown");
}

#[test]
fn null_heavy_sample_is_unstructured_binary() {
    let mut sample = vec![b'x'; 512];
    for byte in sample.iter_mut().take(60) {
        *byte = 0;
    }
    assert!(ContentTypeInterpreter::default().is_unstructured_binary(&sample));
}

#[test]
fn hash_validation_is_sha256_only() {
    // A SHA-512 digest never validates: validate always recomputes SHA-256.
    let sha512 = compute_hash("hello", "sha512");
    assert!(!validate("hello", &sha512));
    assert!(validate("hello", &compute_hash("hello", "sha256")));
}

#[test]
fn handle_examples() {
    assert!(validate_handle("").is_err());
    assert!(validate_handle("123abc").is_err());
    assert_eq!(validate_handle("文檔-v1").unwrap(), "文檔-v1");
}

#[test]
fn card_round_trips_through_stored_fields() {
    let card = MCard::create("stored content", "sha384").unwrap();
    let restored =
        MCard::from_data(card.content().to_vec(), card.hash(), card.g_time()).unwrap();
    assert_eq!(restored, card);
    assert!(restored.verify());
    assert_eq!(GTime::hash_algorithm(restored.g_time()).unwrap(), "sha384");
}

proptest! {
    #[test]
    fn detection_is_total(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let result = detect_content_type(bytes.as_slice(), None);
        prop_assert!(!result.mime_type.is_empty());
        prop_assert!(result.extension.starts_with('.'));
    }

    #[test]
    fn detection_is_total_for_text(text in "\\PC{0,400}") {
        let result = detect_content_type(text.as_str(), None);
        prop_assert!(!result.mime_type.is_empty());
        // Text input is never classified as binary without a MIME type.
        prop_assert!(!is_binary_content(text.as_str(), None));
    }

    #[test]
    fn extension_is_dotted_for_any_hint(
        text in "\\PC{0,200}",
        hint in prop::option::of("[.]?[a-zA-Z0-9]{0,6}"),
    ) {
        let result = detect_content_type(text.as_str(), hint.as_deref());
        prop_assert!(result.extension.starts_with('.'));
    }

    #[test]
    fn png_magic_wins_over_any_suffix(suffix in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&suffix);
        prop_assert_eq!(detect_content_type(bytes.as_slice(), None).mime_type, "image/png");
    }

    #[test]
    fn hashing_is_deterministic(
        bytes in proptest::collection::vec(any::<u8>(), 0..1024),
        algorithm in prop::sample::select(vec!["sha1", "sha224", "sha256", "sha384", "sha512", "bogus"]),
    ) {
        prop_assert_eq!(compute_hash(&bytes, algorithm), compute_hash(&bytes, algorithm));
    }

    #[test]
    fn hash_validates_its_own_content(bytes in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let digest = compute_hash(&bytes, "sha256");
        prop_assert!(validate(&bytes, &digest));

        let mut other = bytes.clone();
        other.push(0x2a);
        prop_assert!(!validate(&other, &digest));
    }

    #[test]
    fn handle_normalisation_is_idempotent(raw in "[a-zA-Zàéöß文檔][a-zA-Z0-9 _./-]{0,40}") {
        if let Ok(once) = validate_handle(&raw) {
            prop_assert_eq!(validate_handle(&once).unwrap(), once);
        }
    }
}
