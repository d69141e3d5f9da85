//! Tests for the OSRM client configuration and error paths

use std::time::Duration;

use traceclean::osrm::{DEFAULT_MATCH_URL, DEFAULT_ROUTE_URL};
use traceclean::{GpsPoint, OsrmClient, OsrmConfig, OsrmService, TraceError};

#[test]
fn test_default_config_endpoints() {
    let config = OsrmConfig::default();
    assert_eq!(config.match_url, "http://127.0.0.1:5000/match/v1/driving/");
    assert_eq!(config.route_url, "http://127.0.0.1:5000/route/v1/driving/");
    assert_eq!(config.timeout, Duration::from_secs(10));
    assert_eq!(config.match_url, DEFAULT_MATCH_URL);
    assert_eq!(config.route_url, DEFAULT_ROUTE_URL);
}

#[test]
fn test_client_builds_with_defaults() {
    assert!(OsrmClient::with_defaults().is_ok());
}

#[test]
fn test_unreachable_server_yields_batch_error() {
    // Port 9 (discard) is unassigned locally: connection is refused
    let client = OsrmClient::new(OsrmConfig {
        match_url: "http://127.0.0.1:9/match/v1/driving/".to_string(),
        route_url: "http://127.0.0.1:9/route/v1/driving/".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let points = [GpsPoint::new(19.0, 73.0), GpsPoint::new(19.001, 73.0)];
    let err = client.match_batch(&points).unwrap_err();
    assert!(matches!(err, TraceError::OsrmBatch { .. }));

    let err = client.route(&points[0], &points[1]).unwrap_err();
    match err {
        TraceError::OsrmBatch { url, .. } => {
            // Bit-exact request shape: lon,lat pairs and geojson overview
            assert!(url.starts_with("http://127.0.0.1:9/route/v1/driving/73,19;73,19.001"));
            assert!(url.ends_with("?overview=full&geometries=geojson"));
        }
        other => panic!("expected OsrmBatch, got {other:?}"),
    }
}
