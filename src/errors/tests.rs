//! Unit tests for the error taxonomy, focused on message formats.

use super::errors::{state_repr, ScanError};

#[test]
fn test_state_repr() {
    assert_eq!(state_repr(None), "nil");
    assert_eq!(state_repr(Some("B")), ":B");
}

#[test]
fn test_scan_failure_message() {
    let err = ScanError::scan_failure(Some("B"), String::from("<input>"), "a");
    assert_eq!(err.to_string(), "can not match (:B) at <input>: 'a'");
    assert_eq!(err.name(), "ScanFailure");
}

#[test]
fn test_scan_failure_default_state_message() {
    let err = ScanError::scan_failure(None, String::from("test.txt:3"), "@rest");
    assert_eq!(err.to_string(), "can not match (nil) at test.txt:3: '@rest'");
}

#[test]
fn test_undefined_state_message() {
    let err = ScanError::undefined_state(Some("nope"), String::from("<input>"));
    assert_eq!(err.to_string(), "undefined state at <input>: ':nope'");
    assert_eq!(err.name(), "UndefinedState");
}

#[test]
fn test_bad_lexical_result_message() {
    let err = ScanError::bad_lexical_result(String::from("[:number]"), String::from("<input>"));
    assert_eq!(err.to_string(), "bad lexical result at <input>: [:number]");
    assert_eq!(err.name(), "MalformedResult");
}

#[test]
fn test_io_error_propagates_unwrapped() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err = ScanError::from(io);
    assert_eq!(err.name(), "Io");
    assert_eq!(err.to_string(), "gone");
}
