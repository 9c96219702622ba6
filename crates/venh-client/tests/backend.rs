//! Client tests against a mocked enhancement backend.

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use venh_client::{ClientConfig, ClientError, EnhanceClient, ErrorKind};
use venh_models::{BackendMethod, ProcessingRequest};

fn client_for(server: &MockServer) -> EnhanceClient {
    EnhanceClient::new(ClientConfig::default().with_base_url(format!("{}/api", server.uri())))
        .expect("client")
}

fn sample_request() -> ProcessingRequest {
    ProcessingRequest::new("night.mp4", b"fake-video-bytes".to_vec())
}

#[tokio::test]
async fn test_binary_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process_video/"))
        .and(body_string_contains("name=\"method\""))
        .and(body_string_contains("unet_selective"))
        .and(body_string_contains("filename=\"night.mp4\""))
        .and(body_string_contains("fake-video-bytes"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(b"enhanced".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .process_video(&sample_request(), BackendMethod::UnetSelective)
        .await
        .expect("process");

    assert_eq!(&result.video[..], b"enhanced");
    assert_eq!(result.content_type.as_deref(), Some("video/mp4"));
    assert!(result.metadata.is_none());
}

#[tokio::test]
async fn test_json_response_fetches_video() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process_video/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video_url": "/videos/processed_clahe_night.mp4",
            "metadata": {
                "process_category": "Low Light Enhancement",
                "model_used": "CLAHE",
                "video": { "total_frames": 120, "processed_frames": 120 },
                "performance": { "total_time": 4.2, "device_used": "CPU" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos/processed_clahe_night.mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(b"indirect-video".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .process_video(&sample_request(), BackendMethod::Clahe)
        .await
        .expect("process");

    assert_eq!(&result.video[..], b"indirect-video");
    let metadata = result.metadata.expect("metadata");
    assert_eq!(metadata.model_used.as_deref(), Some("CLAHE"));
    assert_eq!(metadata.total_frames, Some(120));
    assert_eq!(metadata.device_used.as_deref(), Some("CPU"));
}

async fn mount_indirect(server: &MockServer, metadata: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/process_video/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video_url": "/videos/out.mp4",
            "metadata": metadata
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos/out.mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(b"out-video".to_vec()),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_float_frame_count_still_fetches_video() {
    let server = MockServer::start().await;
    mount_indirect(&server, json!({ "video": { "total_frames": 240.0 } })).await;

    let result = client_for(&server)
        .process_video(&sample_request(), BackendMethod::Unet)
        .await
        .expect("process");

    assert_eq!(&result.video[..], b"out-video");
    assert_eq!(result.metadata.expect("metadata").total_frames, Some(240));
}

#[tokio::test]
async fn test_unreadable_usage_field_is_dropped() {
    let server = MockServer::start().await;
    mount_indirect(
        &server,
        json!({
            "model_used": "UNet",
            "performance": { "cpu_usage_percent": "n/a", "device_used": "GPU" }
        }),
    )
    .await;

    let result = client_for(&server)
        .process_video(&sample_request(), BackendMethod::Unet)
        .await
        .expect("process");

    assert_eq!(&result.video[..], b"out-video");
    let metadata = result.metadata.expect("metadata");
    assert_eq!(metadata.cpu_usage_percent, None);
    assert_eq!(metadata.model_used.as_deref(), Some("UNet"));
    assert_eq!(metadata.device_used.as_deref(), Some("GPU"));
}

#[tokio::test]
async fn test_server_error_carries_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process_video/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "oom" })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process_video(&sample_request(), BackendMethod::Unet)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BackendError);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "oom");
}

#[tokio::test]
async fn test_error_payload_with_ok_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process_video/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "Video processing failed or invalid method selected."
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process_video(&sample_request(), BackendMethod::Clahe)
        .await
        .unwrap_err();

    match err {
        ClientError::BackendError { status, message } => {
            assert_eq!(status, Some(200));
            assert_eq!(message, "Video processing failed or invalid method selected.");
        }
        other => panic!("Expected BackendError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unrecognized_json_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process_video/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "done" })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process_video(&sample_request(), BackendMethod::Clahe)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn test_empty_binary_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process_video/"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "video/mp4"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process_video(&sample_request(), BackendMethod::Clahe)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn test_failed_second_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process_video/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video_url": "/videos/missing.mp4",
            "metadata": {}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos/missing.mp4"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process_video(&sample_request(), BackendMethod::Clahe)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "Not Found");
}

#[tokio::test]
async fn test_empty_file_is_rejected_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .process_video(&ProcessingRequest::new("empty.mp4", Vec::new()), BackendMethod::Clahe)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_connection_refused_is_upload_failure() {
    // Nothing listens on the discard port.
    let client =
        EnhanceClient::new(ClientConfig::default().with_base_url("http://127.0.0.1:9/api")).unwrap();

    let err = client
        .process_video(&sample_request(), BackendMethod::Clahe)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UploadFailed);
}

#[tokio::test]
async fn test_metadata_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/video_metadata/night.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model_used": "UNet",
            "performance": { "gpu_usage_percent": 71.5 }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let metadata = client.video_metadata("night.mp4").await.expect("metadata");
    assert_eq!(metadata.model_used.as_deref(), Some("UNet"));
    assert_eq!(metadata.gpu_usage_percent, Some(71.5));

    assert!(client.video_metadata("unknown.mp4").await.is_none());
}

#[tokio::test]
async fn test_processing_status_and_health() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/status/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "progress": 42.0
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let status = client.processing_status("job-1").await.expect("status");
    assert_eq!(status.status, "processing");
    assert_eq!(status.progress, Some(42.0));

    let err = client.processing_status("job-2").await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
async fn test_truncated_body_is_malformed() {
    // Promises 100 bytes, sends 5, then hangs up.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&chunk[..n]);
            if received.ends_with(b"--\r\n") {
                break;
            }
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: video/mp4\r\ncontent-length: 100\r\n\r\nshort",
            )
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let client =
        EnhanceClient::new(ClientConfig::default().with_base_url(format!("http://{}/api", addr)))
            .unwrap();

    let err = client
        .process_video(&sample_request(), BackendMethod::Clahe)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}
