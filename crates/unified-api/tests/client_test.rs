// Integration tests for the REST dispatcher using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use unified_api::types::{
    CameraId, DeviceActionRequest, DeviceId, FileType, RtspsStreamRequest, SiteId, StreamQuality,
    VoucherGenerateRequest,
};
use unified_api::{Client, ClientConfig, Error, Filter, PageArguments, Scheme, VendorError};

const API_KEY: &str = "test-api-key";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(API_KEY)
        .with_host(server.address().to_string())
        .with_scheme(Scheme::Plaintext);
    let client = Client::from_reqwest(config, reqwest::Client::new(), CancellationToken::new())
        .unwrap();
    (server, client)
}

fn network(p: &str) -> String {
    format!("/proxy/network/integration/v1/{p}")
}

fn protect(p: &str) -> String {
    format!("/proxy/protect/integration/v1/{p}")
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_device_details() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(network("sites/site-1/devices/device-9")))
        .and(header("X-Api-Key", API_KEY))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "device-9",
            "name": "AP1",
            "model": "U7PG2",
            "state": "ONLINE",
            "interfaces": { "radios": [{ "frequencyGHz": 2.4, "channel": 6 }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let device = client
        .network()
        .device_details(&SiteId::from("site-1"), &DeviceId::from("device-9"))
        .await
        .unwrap();

    assert_eq!(device.id, "device-9");
    assert_eq!(device.name, "AP1");
    assert_eq!(device.interfaces.radios[0].channel, 6);
}

#[tokio::test]
async fn test_list_sites_query_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(network("sites")))
        .and(query_param("filter", "name.eq('Main')"))
        .and(query_param("offset", "5"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "offset": 5, "limit": 10, "count": 1, "totalCount": 6,
            "data": [{ "id": "s-1", "name": "Main" }]
        })))
        .mount(&server)
        .await;

    let page = client
        .network()
        .sites(
            Some(&Filter::from("name.eq('Main')")),
            Some(&PageArguments { offset: 5, limit: 10 }),
        )
        .await
        .unwrap();

    assert_eq!(page.total_count, 6);
    assert_eq!(page.data[0].name, "Main");
}

#[tokio::test]
async fn test_empty_query_is_not_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(network("sites/s/clients")))
        .respond_with(|req: &Request| {
            assert_eq!(req.url.query(), None);
            ResponseTemplate::new(200).set_body_json(json!({ "data": [] }))
        })
        .mount(&server)
        .await;

    let page = client
        .network()
        .clients(&SiteId::from("s"), None, Some(&PageArguments::default()))
        .await
        .unwrap();
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_voucher_generate_expects_created() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(network("sites/s/hotspot/vouchers")))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "count": 1, "name": "guest", "timeLimitMinutes": 60 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "vouchers": [{ "id": "v-1", "code": "12345", "name": "guest" }]
        })))
        .mount(&server)
        .await;

    let vouchers = client
        .network()
        .voucher_generate(
            &SiteId::from("s"),
            &VoucherGenerateRequest {
                count: 1,
                name: "guest".into(),
                time_limit_minutes: 60,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(vouchers.len(), 1);
    assert_eq!(vouchers[0].code, "12345");
}

#[tokio::test]
async fn test_ok_is_rejected_where_created_is_expected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(network("sites/s/hotspot/vouchers")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vouchers": [] })))
        .mount(&server)
        .await;

    let err = client
        .network()
        .voucher_generate(&SiteId::from("s"), &VoucherGenerateRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(200));
}

#[tokio::test]
async fn test_device_action_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(network("sites/s/devices/d/actions")))
        .and(body_json(json!({ "action": "RESTART" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .network()
        .device_execute_action(
            &SiteId::from("s"),
            &DeviceId::from("d"),
            &DeviceActionRequest { action: "RESTART".into() },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rtsps_delete_uses_repeated_qualities() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(protect("cameras/cam-1/rtsps-stream")))
        .respond_with(|req: &Request| {
            assert_eq!(
                req.url.query(),
                Some("qualities%5B%5D=high&qualities%5B%5D=low")
            );
            ResponseTemplate::new(204)
        })
        .expect(1)
        .mount(&server)
        .await;

    client
        .protect()
        .camera_delete_rtsps_stream(
            &CameraId::from("cam-1"),
            &[StreamQuality::High, StreamQuality::Low],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rtsps_create() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(protect("cameras/cam-1/rtsps-stream")))
        .and(body_json(json!({ "qualities": ["high"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "high": "rtsps://unifi:7441/abc?enableSrtp"
        })))
        .mount(&server)
        .await;

    let streams = client
        .protect()
        .camera_create_rtsps_stream(
            &CameraId::from("cam-1"),
            &RtspsStreamRequest { qualities: vec![StreamQuality::High] },
        )
        .await
        .unwrap();
    assert_eq!(streams.high.as_deref(), Some("rtsps://unifi:7441/abc?enableSrtp"));
    assert!(streams.low.is_none());
}

#[tokio::test]
async fn test_snapshot_returns_raw_bytes() {
    let (server, client) = setup().await;
    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    Mock::given(method("GET"))
        .and(path(protect("cameras/cam-1/snapshot")))
        .and(query_param("highQuality", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(jpeg.clone(), "image/jpeg"))
        .mount(&server)
        .await;

    let body = client
        .protect()
        .camera_snapshot(&CameraId::from("cam-1"), true)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), jpeg.as_slice());
}

#[tokio::test]
async fn test_ptz_goto_expects_no_content() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(protect("cameras/cam-1/ptz/goto/2")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .protect()
        .camera_ptz_goto(&CameraId::from("cam-1"), 2)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_ptz_slot_out_of_range_is_not_sent() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .protect()
        .camera_ptz_patrol_start(&CameraId::from("cam-1"), 4)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SlotOutOfRange(4)));
}

#[tokio::test]
async fn test_file_upload_is_multipart() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(protect("files/animations")))
        .and(header_regex("Content-Type", "^multipart/form-data; boundary=[0-9a-f]+$"))
        .and(header("X-Api-Key", API_KEY))
        .respond_with(|req: &Request| {
            let body = String::from_utf8_lossy(&req.body);
            assert!(body.contains(r#"name="file"; filename="ring.gif""#));
            assert!(body.contains("Content-Type: image/gif"));
            assert!(body.contains("GIF89a"));
            ResponseTemplate::new(200)
        })
        .expect(1)
        .mount(&server)
        .await;

    client
        .protect()
        .file_upload(FileType::Animations, "assets/ring.gif", b"GIF89a")
        .await
        .unwrap();
}

// ── Error handling tests ────────────────────────────────────────────

#[tokio::test]
async fn test_non_json_error_body_is_classified() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(network("sites/s/devices/missing")))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>Not Found</html>"))
        .mount(&server)
        .await;

    let err = client
        .network()
        .device_details(&SiteId::from("s"), &DeviceId::from("missing"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::UnexpectedStatus { status, url, vendor } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/proxy/network/integration/v1/sites/s/devices/missing"));
            assert!(vendor.is_none());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_vendor_error_is_attached() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(network("info")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "statusName": "UNAUTHORIZED",
            "message": "Missing or invalid API key",
            "timestamp": "2026-01-01T00:00:00Z",
            "requestPath": "/integration/v1/info",
            "requestId": "req-1"
        })))
        .mount(&server)
        .await;

    let err = client.network().info().await.unwrap_err();
    assert!(err.is_unauthorized());
    let Error::UnexpectedStatus { vendor: Some(vendor), .. } = err else {
        panic!("expected vendor detail");
    };
    assert!(matches!(*vendor, VendorError::Api(_)));
    assert_eq!(vendor.message(), "Missing or invalid API key");
}

#[tokio::test]
async fn test_protect_validation_error_is_attached() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(protect("cameras/cam-1")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Bad Request",
            "name": "VALIDATION_ERROR",
            "entity": "camera",
            "issues": [{ "instancePath": "/micVolume", "message": "must be <= 100", "keyword": "maximum" }]
        })))
        .mount(&server)
        .await;

    let err = client
        .protect()
        .camera_patch(&CameraId::from("cam-1"), &Default::default())
        .await
        .unwrap_err();
    let Error::UnexpectedStatus { status: 400, vendor: Some(vendor), .. } = err else {
        panic!("expected validation detail");
    };
    let VendorError::Validation(detail) = *vendor else {
        panic!("expected validation shape");
    };
    assert_eq!(detail.issues[0].instance_path, "/micVolume");
}

#[tokio::test]
async fn test_malformed_success_body_is_a_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(protect("meta/info")))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.protect().info().await.unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_cancelled_client_sends_nothing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    client.cancellation_token().cancel();
    let err = client.network().info().await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_invalid_config_lists_every_reason() {
    let config = ClientConfig::new("")
        .with_host("")
        .with_keep_alive(std::time::Duration::from_millis(10));
    let err = Client::new(config, CancellationToken::new()).unwrap_err();
    let Error::InvalidConfig { reasons } = err else {
        panic!("expected invalid config");
    };
    assert_eq!(reasons.len(), 3);
}
