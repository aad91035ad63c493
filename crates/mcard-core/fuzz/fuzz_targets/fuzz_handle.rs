//! Fuzz target for handle validation.
//!
//! Valid handles must survive a second pass unchanged.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mcard_core::validate_handle;

fuzz_target!(|data: &str| {
    if let Ok(handle) = validate_handle(data) {
        assert_eq!(validate_handle(&handle).as_deref(), Ok(handle.as_str()));
    }
});
