//! Test that the shared detection types are Sync + Send

fn assert_sync_send<T: Sync + Send>() {}

#[test]
fn test_detector_registry_is_sync_send() {
    assert_sync_send::<mcard_core::DetectorRegistry>();
}

#[test]
fn test_interpreter_is_sync_send() {
    assert_sync_send::<mcard_core::ContentTypeInterpreter<'static>>();
}

#[test]
fn test_config_is_sync_send() {
    assert_sync_send::<mcard_core::McardConfig>();
}

#[test]
fn test_card_is_sync_send() {
    assert_sync_send::<mcard_core::MCard>();
}

#[test]
fn test_shared_registry_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let text = format!("{{\"worker\": {i}}}");
                mcard_core::detect_content_type(text.as_str(), None).mime_type
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "application/json");
    }
}
