// Integration tests for `DirectoryClient` using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lslmon_api::{DirectoryClient, Error, StreamRecord, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DirectoryClient) {
    let server = MockServer::start().await;
    let client = DirectoryClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

const EEG_INFO: &str = r#"<?xml version="1.0"?>
<info>
  <name>BioSemi</name>
  <type>EEG</type>
  <channel_count>2</channel_count>
</info>"#;

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_streams() {
    let (server, client) = setup().await;

    let body = json!([
        {
            "uid": "a1b2",
            "name": "BioSemi",
            "type": "EEG",
            "channel_count": 32,
            "nominal_srate": 512.0,
            "source_id": "biosemi-1",
            "hostname": "lab-pc"
        },
        { "uid": "c3d4", "name": "Markers" }
    ]);

    Mock::given(method("GET"))
        .and(path("/streams"))
        .and(query_param("wait", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let streams = client.list_streams(Duration::from_secs(1)).await.unwrap();

    assert_eq!(streams.len(), 2);
    assert_eq!(
        streams[0],
        StreamRecord {
            uid: "a1b2".into(),
            name: "BioSemi".into(),
            stream_type: "EEG".into(),
            channel_count: 32,
            nominal_srate: 512.0,
            source_id: "biosemi-1".into(),
            hostname: "lab-pc".into(),
        }
    );
    assert_eq!(streams[1].name, "Markers");
    assert_eq!(streams[1].stream_type, "");
    assert_eq!(streams[1].channel_count, 0);
}

#[tokio::test]
async fn test_list_streams_forwards_fractional_wait() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .and(query_param("wait", "0.25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let streams = client.list_streams(Duration::from_millis(250)).await.unwrap();
    assert!(streams.is_empty());
}

#[tokio::test]
async fn test_stream_info_returns_xml() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/streams/a1b2/info"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/xml")
                .set_body_string(EEG_INFO),
        )
        .mount(&server)
        .await;

    let xml = client.stream_info("a1b2").await.unwrap();
    assert!(xml.contains("<name>BioSemi</name>"));
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;
    let base = format!("{}/lsl/", server.uri());
    let client = DirectoryClient::from_reqwest(&base, reqwest::Client::new()).unwrap();

    Mock::given(method("GET"))
        .and(path("/lsl/streams/x%2Fy/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EEG_INFO))
        .mount(&server)
        .await;

    let xml = client.stream_info("x/y").await.unwrap();
    assert!(xml.starts_with("<?xml"));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        token: Some("s3cret".to_string().into()),
        ..TransportConfig::default()
    };
    let client = DirectoryClient::new(server.uri().parse().unwrap(), &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/streams"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.list_streams(Duration::ZERO).await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found_maps_to_directory_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/streams/gone/info"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown stream"))
        .mount(&server)
        .await;

    let err = client.stream_info("gone").await.unwrap_err();
    match err {
        Error::Directory { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "unknown stream");
        }
        other => panic!("expected Directory error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_directory_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.list_streams(Duration::ZERO).await.unwrap_err();
    assert!(matches!(err, Error::Directory { status: 503, .. }));
}

#[tokio::test]
async fn test_malformed_json_keeps_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.list_streams(Duration::ZERO).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

#[test]
fn test_rejects_non_base_url() {
    let result = DirectoryClient::from_reqwest("mailto:lab@example.com", reqwest::Client::new());
    assert!(matches!(result, Err(Error::InvalidBaseUrl(_))));
}
