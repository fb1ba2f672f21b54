//! End-to-end tests for the data pipeline against a mock Socrata domain.
//!
//! These tests verify:
//! - Id resolution through child views and geo parents
//! - The single 400 -> migration -> retry path
//! - NotFound / Unreachable mapping of upstream statuses
//! - Graceful degradation when metadata or extent requests fail
//! - Query parameter translation as seen by the upstream server

use std::time::Duration;

use serde_json::Value;
use socrata_provider::{DataRequest, Model, ProviderConfig, ProviderError, QueryParams};
use test_utils::fixtures::{self, rings};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Test Helpers
// ============================================================================

/// Model whose default host is the mock server.
fn test_model(server: &MockServer) -> Model<socrata_provider::HttpClient> {
    let config = ProviderConfig {
        default_host: server.uri(),
        request_timeout_secs: 5,
        ..ProviderConfig::default()
    };
    Model::from_config(config).unwrap()
}

fn request(id: &str) -> DataRequest {
    DataRequest::new(id)
}

async fn mount_json(server: &MockServer, mock: wiremock::MockBuilder, body: Value) {
    mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_descriptor(server: &MockServer, id: &str, body: Value) {
    mount_json(
        server,
        Mock::given(method("GET")).and(path(format!("/api/views/{}.json", id))),
        body,
    )
    .await;
}

async fn mount_data(server: &MockServer, id: &str, body: Value) {
    mount_json(
        server,
        Mock::given(method("GET"))
            .and(path(format!("/resource/{}.geojson", id)))
            .and(query_param("$select", ":*,*")),
        body,
    )
    .await;
}

async fn mount_data_status(server: &MockServer, id: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/resource/{}.geojson", id)))
        .and(query_param("$select", ":*,*"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mount_columns(server: &MockServer, id: &str, columns: &[(&str, &str)]) {
    mount_json(
        server,
        Mock::given(method("GET"))
            .and(path("/api/views.json"))
            .and(query_param("method", "getByResourceName"))
            .and(query_param("name", id)),
        fixtures::column_listing(columns),
    )
    .await;
}

async fn mount_metadata(server: &MockServer, id: &str, name: &str) {
    mount_json(
        server,
        Mock::given(method("GET")).and(path(format!("/api/views/metadata/v1/{}.json", id))),
        fixtures::descriptive_metadata(name, "A test dataset", Some("Open Data Commons PDDL")),
    )
    .await;
}

async fn mount_extent(server: &MockServer, id: &str, field: &str, ring: &[[f64; 2]]) {
    mount_json(
        server,
        Mock::given(method("GET"))
            .and(path(format!("/resource/{}.geojson", id)))
            .and(query_param("$select", format!("extent({})", field))),
        fixtures::extent_response(field, ring),
    )
    .await;
}

/// A dataset that resolves to itself and answers every request.
async fn mount_healthy_dataset(server: &MockServer, id: &str) {
    mount_descriptor(server, id, fixtures::descriptor(id)).await;
    mount_data(server, id, fixtures::feature_collection(2)).await;
    mount_columns(server, id, &[("name", "text"), ("the_geom", "multipolygon")]).await;
    mount_metadata(server, id, "Analysis Neighborhoods").await;
    mount_extent(server, id, "the_geom", &rings::SAN_FRANCISCO).await;
}

// ============================================================================
// Success Paths
// ============================================================================

#[tokio::test]
async fn test_success_merges_metadata_and_extent() {
    let server = MockServer::start().await;
    mount_healthy_dataset(&server, "abcd-1234").await;

    let fc = test_model(&server).get_data(&request("abcd-1234")).await.unwrap();

    assert_eq!(fc.len(), 2);
    assert!(fc.extra.contains_key("crs"));

    let json = serde_json::to_value(&fc).unwrap();
    let metadata = &json["metadata"];
    assert_eq!(metadata["idField"], ":id");
    assert_eq!(metadata["name"], "Analysis Neighborhoods");
    assert_eq!(metadata["description"], "A test dataset");
    assert_eq!(
        metadata["copyrightText"],
        "This data licensed by the City and County of San Francisco under Open Data Commons PDDL"
    );
    assert_eq!(
        metadata["extent"],
        serde_json::json!([[-122.514, 37.708], [-122.357, 37.832]])
    );
}

#[tokio::test]
async fn test_child_view_and_geo_parent() {
    let server = MockServer::start().await;

    let mut descriptor = fixtures::descriptor_with_child_views("orig-0001", &["chld-0001"]);
    descriptor["privateMetadata"] = serde_json::json!({"geo": {"parentUid": "prnt-0001"}});
    mount_descriptor(&server, "orig-0001", descriptor).await;
    mount_data(&server, "chld-0001", fixtures::feature_collection(4)).await;
    mount_columns(&server, "chld-0001", &[("location", "point")]).await;
    mount_metadata(&server, "prnt-0001", "Parent Layer").await;
    mount_extent(&server, "chld-0001", "location", &rings::TRIANGLE).await;

    let fc = test_model(&server).get_data(&request("orig-0001")).await.unwrap();

    assert_eq!(fc.len(), 4);
    let metadata = fc.metadata.unwrap();
    assert_eq!(metadata.name.as_deref(), Some("Parent Layer"));
    assert_eq!(metadata.extent.unwrap().corners(), [[-1.0, 0.0], [2.0, 4.0]]);
}

#[tokio::test]
async fn test_query_parameters_reach_upstream() {
    let server = MockServer::start().await;
    mount_descriptor(&server, "abcd-1234", fixtures::descriptor("abcd-1234")).await;
    mount_columns(&server, "abcd-1234", &[("name", "text")]).await;
    mount_metadata(&server, "abcd-1234", "Filtered").await;

    Mock::given(method("GET"))
        .and(path("/resource/abcd-1234.geojson"))
        .and(query_param("$select", ":*,*"))
        .and(query_param("$where", "status = 'open' AND type = 'a&b'"))
        .and(query_param("$offset", "10"))
        .and(query_param("$limit", "5"))
        .and(query_param("$order", "name DESC,:id ASC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::feature_collection(5)))
        .expect(1)
        .mount(&server)
        .await;

    let query = QueryParams {
        where_clause: Some("status = 'open' AND type = 'a&b'".to_string()),
        result_offset: Some("10".to_string()),
        result_record_count: Some("5".to_string()),
        order_by_fields: Some("name DESC, :id".to_string()),
    };
    let fc = test_model(&server)
        .get_data(&request("abcd-1234").with_query(query))
        .await
        .unwrap();

    assert_eq!(fc.len(), 5);
}

// ============================================================================
// Migration Path
// ============================================================================

#[tokio::test]
async fn test_bad_request_follows_migration_once() {
    let server = MockServer::start().await;
    mount_descriptor(&server, "abc", fixtures::descriptor("abc")).await;
    mount_data_status(&server, "abc", 400).await;
    mount_columns(&server, "abc", &[]).await;

    Mock::given(method("GET"))
        .and(path("/api/migrations/abc.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(fixtures::migration_record("abc", "xyz")),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_data(&server, "xyz", fixtures::feature_collection(7)).await;
    mount_columns(&server, "xyz", &[("the_geom", "polygon")]).await;
    mount_metadata(&server, "abc", "Migrated").await;
    mount_extent(&server, "xyz", "the_geom", &rings::SINGLE_POINT).await;

    let fc = test_model(&server).get_data(&request("abc")).await.unwrap();

    assert_eq!(fc.len(), 7);
    let metadata = fc.metadata.unwrap();
    assert_eq!(metadata.name.as_deref(), Some("Migrated"));
    assert_eq!(metadata.extent.unwrap().corners(), [[5.0, 5.0], [5.0, 5.0]]);
}

#[tokio::test]
async fn test_second_bad_request_is_not_found() {
    let server = MockServer::start().await;
    mount_descriptor(&server, "abc", fixtures::descriptor("abc")).await;
    mount_data_status(&server, "abc", 400).await;
    mount_columns(&server, "abc", &[]).await;
    mount_data_status(&server, "xyz", 400).await;
    mount_columns(&server, "xyz", &[]).await;

    Mock::given(method("GET"))
        .and(path("/api/migrations/abc.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(fixtures::migration_record("abc", "xyz")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/migrations/xyz.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(fixtures::migration_record("xyz", "zzz")),
        )
        .expect(0)
        .mount(&server)
        .await;

    let err = test_model(&server).get_data(&request("abc")).await.unwrap_err();

    assert!(matches!(err, ProviderError::NotFound { ref id } if id == "xyz"));
    assert_eq!(err.to_string(), "404 - Dataset for id xyz not found on this domain");
}

#[tokio::test]
async fn test_slow_bad_request_beats_fast_column_not_found() {
    let server = MockServer::start().await;
    mount_descriptor(&server, "abc", fixtures::descriptor("abc")).await;

    Mock::given(method("GET"))
        .and(path("/resource/abc.geojson"))
        .and(query_param("$select", ":*,*"))
        .respond_with(ResponseTemplate::new(400).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/views.json"))
        .and(query_param("name", "abc"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/migrations/abc.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(fixtures::migration_record("abc", "xyz")),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_data(&server, "xyz", fixtures::feature_collection(2)).await;
    mount_columns(&server, "xyz", &[("the_geom", "polygon")]).await;
    mount_metadata(&server, "abc", "Migrated").await;
    mount_extent(&server, "xyz", "the_geom", &rings::TRIANGLE).await;

    let fc = test_model(&server).get_data(&request("abc")).await.unwrap();

    assert_eq!(fc.len(), 2);
    assert_eq!(fc.metadata.unwrap().name.as_deref(), Some("Migrated"));
}

// ============================================================================
// Terminal Failures
// ============================================================================

#[tokio::test]
async fn test_request_host_with_scheme_is_rejected() {
    let server = MockServer::start().await;
    mount_healthy_dataset(&server, "abcd-1234").await;

    let request = request("abcd-1234").with_host(server.uri());
    let err = test_model(&server).get_data(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::InvalidQuery { ref param, .. } if param == "host"));
    let received = server.received_requests().await.unwrap();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_missing_descriptor_makes_no_other_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/views/gone-0000.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut seen: Option<(Option<ProviderError>, bool)> = None;
    test_model(&server)
        .get_data_with_callback(&request("gone-0000"), |err, fc| {
            seen = Some((err, fc.is_some()));
        })
        .await;

    let (err, has_data) = seen.unwrap();
    assert!(!has_data);
    assert!(matches!(err, Some(ProviderError::NotFound { ref id }) if id == "gone-0000"));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_descriptor_server_error_is_unreachable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/views/abcd-1234.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = test_model(&server).get_data(&request("abcd-1234")).await.unwrap_err();

    assert!(matches!(err, ProviderError::Unreachable { status: Some(500) }));
    assert_eq!(err.to_string(), "500 - Unexpected problem, cannot reach server");
}

#[tokio::test]
async fn test_data_not_found() {
    let server = MockServer::start().await;
    mount_descriptor(&server, "abcd-1234", fixtures::descriptor("abcd-1234")).await;
    mount_data_status(&server, "abcd-1234", 404).await;
    mount_columns(&server, "abcd-1234", &[]).await;

    let err = test_model(&server).get_data(&request("abcd-1234")).await.unwrap_err();

    assert!(matches!(err, ProviderError::NotFound { ref id } if id == "abcd-1234"));
}

#[tokio::test]
async fn test_data_server_error_is_unreachable() {
    let server = MockServer::start().await;
    mount_descriptor(&server, "abcd-1234", fixtures::descriptor("abcd-1234")).await;
    mount_data_status(&server, "abcd-1234", 503).await;
    mount_columns(&server, "abcd-1234", &[]).await;

    let err = test_model(&server).get_data(&request("abcd-1234")).await.unwrap_err();

    assert!(matches!(err, ProviderError::Unreachable { status: Some(503) }));
}

// ============================================================================
// Graceful Degradation
// ============================================================================

#[tokio::test]
async fn test_metadata_failure_returns_raw_collection() {
    let server = MockServer::start().await;
    mount_descriptor(&server, "abcd-1234", fixtures::descriptor("abcd-1234")).await;
    mount_data(&server, "abcd-1234", fixtures::feature_collection(3)).await;
    mount_columns(&server, "abcd-1234", &[("the_geom", "multipolygon")]).await;
    mount_extent(&server, "abcd-1234", "the_geom", &rings::TRIANGLE).await;

    Mock::given(method("GET"))
        .and(path("/api/views/metadata/v1/abcd-1234.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut seen = None;
    test_model(&server)
        .get_data_with_callback(&request("abcd-1234"), |err, fc| {
            seen = Some((err.is_none(), fc));
        })
        .await;

    let (no_error, fc) = seen.unwrap();
    assert!(no_error);
    let json = serde_json::to_value(fc.unwrap()).unwrap();
    assert!(json.get("metadata").is_none());
    assert_eq!(json["features"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_extent_failure_keeps_metadata() {
    let server = MockServer::start().await;
    mount_descriptor(&server, "abcd-1234", fixtures::descriptor("abcd-1234")).await;
    mount_data(&server, "abcd-1234", fixtures::feature_collection(1)).await;
    mount_columns(&server, "abcd-1234", &[("the_geom", "multipolygon")]).await;
    mount_metadata(&server, "abcd-1234", "No Extent").await;

    Mock::given(method("GET"))
        .and(path("/resource/abcd-1234.geojson"))
        .and(query_param("$select", "extent(the_geom)"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fc = test_model(&server).get_data(&request("abcd-1234")).await.unwrap();

    let metadata = fc.metadata.unwrap();
    assert_eq!(metadata.name.as_deref(), Some("No Extent"));
    assert!(metadata.extent.is_none());
}

#[tokio::test]
async fn test_no_geometry_column_skips_extent_probe() {
    let server = MockServer::start().await;
    mount_descriptor(&server, "abcd-1234", fixtures::descriptor("abcd-1234")).await;
    mount_data(&server, "abcd-1234", fixtures::feature_collection(1)).await;
    mount_columns(&server, "abcd-1234", &[("name", "text"), ("count", "number")]).await;
    mount_metadata(&server, "abcd-1234", "Tabular").await;

    Mock::given(method("GET"))
        .and(path("/resource/abcd-1234.geojson"))
        .and(query_param("$select", "extent(name)"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fc = test_model(&server).get_data(&request("abcd-1234")).await.unwrap();

    let json = serde_json::to_value(&fc).unwrap();
    assert!(json["metadata"]["extent"].is_null());
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}
