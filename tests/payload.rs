//! Tests for payload validation and trace construction

use traceclean::{CleanTrace, PingInput, TraceError, TracePayload, UpdateStatus};

fn payload_of(pings: Vec<PingInput>) -> TracePayload {
    TracePayload {
        trace: pings,
        ..TracePayload::default()
    }
}

fn located(lat: f64, lng: f64, timestamp: i64) -> PingInput {
    PingInput::new(Some(lat), Some(lng), timestamp)
}

#[test]
fn test_build_initialises_cleaned_from_raw() {
    let trace = CleanTrace::new(payload_of(vec![
        located(19.0, 73.0, 0),
        located(19.001, 73.001, 1000),
    ]))
    .unwrap();

    assert_eq!(trace.len(), 2);
    for ping in trace.pings() {
        assert_eq!(ping.cleaned_latitude, ping.input_latitude);
        assert_eq!(ping.cleaned_longitude, ping.input_longitude);
        assert_eq!(ping.update_status, UpdateStatus::Unchanged);
        assert!(ping.last_updated_by.is_none());
        assert!(!ping.is_interpolated);
    }
}

#[test]
fn test_synthesized_ping_ids() {
    let trace = CleanTrace::new(payload_of(vec![
        located(19.0, 73.0, 0),
        located(19.001, 73.001, 1000),
        located(19.002, 73.002, 2000),
    ]))
    .unwrap();

    let ids: Vec<&str> = trace.pings().iter().map(|p| p.ping_id.as_str()).collect();
    assert_eq!(ids, vec!["p0", "p1", "p2"]);
}

#[test]
fn test_supplied_ping_ids_preserved() {
    let mut a = located(19.0, 73.0, 0);
    a.ping_id = Some("alpha".to_string());
    let mut b = located(19.001, 73.001, 1000);
    b.ping_id = Some("beta".to_string());

    let trace = CleanTrace::new(payload_of(vec![a, b])).unwrap();
    assert_eq!(trace.position_of("alpha"), Some(0));
    assert_eq!(trace.position_of("beta"), Some(1));
}

#[test]
fn test_mixed_ping_id_presence_rejected() {
    let mut a = located(19.0, 73.0, 0);
    a.ping_id = Some("alpha".to_string());
    let b = located(19.001, 73.001, 1000);

    let err = CleanTrace::new(payload_of(vec![a, b])).unwrap_err();
    assert!(matches!(err, TraceError::Validation { field: "ping_id", .. }));
}

#[test]
fn test_duplicate_ping_ids_rejected() {
    let mut a = located(19.0, 73.0, 0);
    a.ping_id = Some("same".to_string());
    let mut b = located(19.001, 73.001, 1000);
    b.ping_id = Some("same".to_string());

    let err = CleanTrace::new(payload_of(vec![a, b])).unwrap_err();
    assert!(matches!(err, TraceError::Validation { field: "ping_id", .. }));
}

#[test]
fn test_empty_trace_rejected() {
    let err = CleanTrace::new(payload_of(vec![])).unwrap_err();
    assert!(matches!(err, TraceError::Validation { field: "trace", .. }));
}

#[test]
fn test_all_null_coordinates_rejected() {
    let err = CleanTrace::new(payload_of(vec![
        PingInput::new(None, None, 0),
        PingInput::new(None, None, 1000),
    ]))
    .unwrap_err();
    assert!(matches!(err, TraceError::Validation { field: "trace", .. }));
}

#[test]
fn test_latitude_out_of_range_rejected() {
    let err = CleanTrace::new(payload_of(vec![located(91.0, 73.0, 0)])).unwrap_err();
    match err {
        TraceError::Validation { field, index, .. } => {
            assert_eq!(field, "latitude");
            assert_eq!(index, Some(0));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_longitude_out_of_range_rejected() {
    let err = CleanTrace::new(payload_of(vec![
        located(19.0, 73.0, 0),
        located(19.0, -180.5, 1000),
    ]))
    .unwrap_err();
    match err {
        TraceError::Validation { field, index, .. } => {
            assert_eq!(field, "longitude");
            assert_eq!(index, Some(1));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_negative_error_radius_rejected() {
    let mut ping = located(19.0, 73.0, 0);
    ping.error_radius = Some(-1.0);
    let err = CleanTrace::new(payload_of(vec![ping])).unwrap_err();
    assert!(matches!(err, TraceError::Validation { field: "error_radius", .. }));
}

#[test]
fn test_timestamp_out_of_range_rejected() {
    let err = CleanTrace::new(payload_of(vec![located(19.0, 73.0, -5)])).unwrap_err();
    assert!(matches!(err, TraceError::Validation { field: "timestamp", .. }));
}

#[test]
fn test_timestamp_inversion_rejected() {
    let err = CleanTrace::new(payload_of(vec![
        located(19.0, 73.0, 2000),
        located(19.001, 73.001, 1000),
    ]))
    .unwrap_err();
    match err {
        TraceError::Order { index, previous, current } => {
            assert_eq!(index, 1);
            assert_eq!(previous, 2000);
            assert_eq!(current, 1000);
        }
        other => panic!("expected order error, got {other:?}"),
    }
}

#[test]
fn test_equal_timestamps_allowed() {
    let trace = CleanTrace::new(payload_of(vec![
        located(19.0, 73.0, 1000),
        located(19.001, 73.001, 1000),
    ]))
    .unwrap();
    assert_eq!(trace.len(), 2);
}

#[test]
fn test_nonpositive_vehicle_speed_rejected() {
    let payload = TracePayload {
        trace: vec![located(19.0, 73.0, 0)],
        vehicle_speed: 0.0,
        ..TracePayload::default()
    };
    let err = CleanTrace::new(payload).unwrap_err();
    assert!(matches!(err, TraceError::Validation { field: "vehicle_speed", .. }));
}

#[test]
fn test_vehicle_defaults_echoed() {
    let mut trace = CleanTrace::new(payload_of(vec![located(19.0, 73.0, 0)])).unwrap();
    assert_eq!(trace.vehicle_type(), "car");
    assert_eq!(trace.vehicle_speed(), 25.0);

    let output = trace.build_output();
    assert_eq!(output.vehicle_type, "car");
    assert_eq!(output.vehicle_speed, 25.0);
}

#[test]
fn test_payload_deserializes_with_defaults() {
    let json = r#"{
        "trace": [
            {"latitude": 19.0, "longitude": 73.0, "timestamp": 0},
            {"latitude": null, "longitude": null, "timestamp": 1000, "force_retain": true}
        ]
    }"#;
    let payload: TracePayload = serde_json::from_str(json).unwrap();
    assert_eq!(payload.vehicle_type, "car");
    assert_eq!(payload.vehicle_speed, 25.0);
    assert!(payload.trace[1].force_retain);

    let trace = CleanTrace::new(payload).unwrap();
    assert_eq!(trace.len(), 2);
    assert!(trace.pings()[1].cleaned_point().is_none());
}

#[test]
fn test_metadata_carried_through() {
    let mut ping = located(19.0, 73.0, 0);
    ping.metadata
        .insert("driver".to_string(), serde_json::json!("d-42"));

    let trace = CleanTrace::new(payload_of(vec![ping])).unwrap();
    assert_eq!(
        trace.pings()[0].metadata.get("driver"),
        Some(&serde_json::json!("d-42"))
    );
}
