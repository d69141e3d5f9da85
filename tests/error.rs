//! Tests for error module

use traceclean::TraceError;

#[test]
fn test_validation_error_display() {
    let err = TraceError::Validation {
        field: "latitude",
        index: Some(3),
        reason: "must be within range [-90, 90], got 91".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains("latitude"));
    assert!(message.contains("ping 3"));
    assert!(message.contains("91"));
}

#[test]
fn test_validation_error_without_index() {
    let err = TraceError::Validation {
        field: "trace",
        index: None,
        reason: "trace cannot be an empty list".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains("trace"));
    assert!(!message.contains("ping"));
}

#[test]
fn test_order_error_display() {
    let err = TraceError::Order {
        index: 5,
        previous: 2000,
        current: 1000,
    };
    let message = err.to_string();
    assert!(message.contains("ping 5"));
    assert!(message.contains("2000"));
    assert!(message.contains("1000"));
}

#[test]
fn test_osrm_batch_error_display() {
    let err = TraceError::OsrmBatch {
        url: "http://127.0.0.1:5000/match/v1/driving/73,19".to_string(),
        reason: "HTTP 502".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains("127.0.0.1:5000"));
    assert!(message.contains("502"));
}

#[test]
fn test_precondition_error_display() {
    let err = TraceError::Precondition {
        operator: "interpolate",
        reason: "map_match must be run before interpolate".to_string(),
    };
    assert!(err.to_string().contains("interpolate"));
}
