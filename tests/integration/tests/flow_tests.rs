//! Full request flows: SDK client -> gateway over TCP -> simulated vendors.

use serde_json::json;
use studio_config::StudioConfig;
use studio_integration_tests::{vendor_config, TestGateway};
use studio_sdk::{
    Error, GenerateAudioBody, GenerateImageBody, GenerateVideoBody, JobStatus, MuxVideoBody,
    OrchestratorBody,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KLING_TEXT: &str = "fal-ai/kling-video/v2.1/master/text-to-video";

async fn mount_kling(vendors: &MockServer, request_id: &str, pending: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/{KLING_TEXT}")))
        .and(header("authorization", "Key fal-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": request_id})))
        .mount(vendors)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/fal-ai/kling-video/requests/{request_id}/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "IN_PROGRESS"})))
        .up_to_n_times(pending)
        .mount(vendors)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/fal-ai/kling-video/requests/{request_id}/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "COMPLETED"})))
        .mount(vendors)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/fal-ai/kling-video/requests/{request_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video": {"url": format!("https://fal.media/{request_id}.mp4")}
        })))
        .mount(vendors)
        .await;
}

#[tokio::test]
async fn test_storyboard_shot_flow() {
    let vendors = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "A neon alley, rain."}]}}]
        })))
        .mount(&vendors)
        .await;
    Mock::given(method("POST"))
        .and(path("/fal-ai/flux-pro/v1.1-ultra"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [{"url": "https://fal.media/alley.jpg"}]
        })))
        .expect(1)
        .mount(&vendors)
        .await;
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .and(header("authorization", "Bearer sk-key"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3-line".to_vec()))
        .mount(&vendors)
        .await;
    mount_kling(&vendors, "shot-1", 2).await;

    let gateway = TestGateway::with_vendors(&vendors).await;
    let client = gateway.client();
    assert!(client.is_healthy().await);

    let description = client.generate_text("Describe shot 1").await.unwrap();
    assert_eq!(description, "A neon alley, rain.");

    let still = client
        .generate_image(&GenerateImageBody {
            prompt: Some(description.clone()),
            aspect_ratio: Some("16:9".into()),
            ..GenerateImageBody::default()
        })
        .await
        .unwrap();
    assert_eq!(still, "https://fal.media/alley.jpg");

    let video = client
        .orchestrate(&OrchestratorBody {
            kind: Some("video".into()),
            prompt: Some(description),
            tags: vec!["noir".into()],
            ..OrchestratorBody::default()
        })
        .await
        .unwrap();
    assert_eq!(video["status"], "completed");
    assert_eq!(video["model"], KLING_TEXT);
    assert_eq!(video["url"], "https://fal.media/shot-1.mp4");

    let line = client
        .generate_audio(&GenerateAudioBody {
            text: Some("Nobody walks here after midnight.".into()),
            voice: Some("onyx".into()),
            ..GenerateAudioBody::default()
        })
        .await
        .unwrap();
    assert_eq!(&line[..], b"ID3-line");

    // No audio tracks: the video URL comes back as-is
    let final_cut = client
        .mux_video(&MuxVideoBody {
            video_url: Some("https://fal.media/shot-1.mp4".into()),
            audio_url: Some(String::new()),
            bgm_url: None,
        })
        .await
        .unwrap();
    assert_eq!(final_cut, "https://fal.media/shot-1.mp4");

    gateway.stop().await;
}

#[tokio::test]
async fn test_queued_video_then_status_checks() {
    let vendors = MockServer::start().await;
    mount_kling(&vendors, "shot-2", 1).await;

    let gateway = TestGateway::with_vendors(&vendors).await;
    let client = gateway.client();

    let queued = client
        .orchestrate(&OrchestratorBody {
            kind: Some("video".into()),
            prompt: Some("slow dolly in".into()),
            wait: Some(false),
            ..OrchestratorBody::default()
        })
        .await
        .unwrap();
    assert_eq!(queued["status"], "queued");
    assert_eq!(queued["requestId"], "shot-2");

    let first = client.job_status("shot-2", KLING_TEXT).await.unwrap();
    assert_eq!(first.status, JobStatus::Running);
    assert_eq!(first.url, None);

    let second = client.job_status("shot-2", KLING_TEXT).await.unwrap();
    assert_eq!(second.status, JobStatus::Completed);
    assert_eq!(second.url.as_deref(), Some("https://fal.media/shot-2.mp4"));
}

#[tokio::test]
async fn test_poll_budget_exhausted() {
    let vendors = MockServer::start().await;
    mount_kling(&vendors, "stuck", 100).await;

    let mut config = vendor_config(&vendors);
    config.generation.polling.max_iterations = 3;
    let gateway = TestGateway::start(config).await;

    let err = gateway
        .client()
        .orchestrate(&OrchestratorBody {
            kind: Some("video".into()),
            prompt: Some("endless take".into()),
            ..OrchestratorBody::default()
        })
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message, .. } => {
            assert_eq!(status, 500);
            assert!(message.contains("timed out after 3 status checks"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_vendor_rate_limit_backed_off_by_client() {
    let vendors = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&vendors)
        .await;

    let gateway = TestGateway::with_vendors(&vendors).await;
    let err = gateway.client().generate_text("hello").await.unwrap_err();

    assert!(matches!(err, Error::RateLimited { attempts: 4, .. }));
}

#[tokio::test]
async fn test_missing_vendor_key() {
    let gateway = TestGateway::start(StudioConfig::default()).await;
    let err = gateway
        .client()
        .generate_image(&GenerateImageBody {
            prompt: Some("castle".into()),
            ..GenerateImageBody::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(401));
}

#[tokio::test]
async fn test_luma_passthrough() {
    let vendors = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generations"))
        .and(body_partial_json(json!({
            "model": "ray-2",
            "keyframes": {"frame0": {"type": "image", "url": "https://img/start.png"}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "g-7", "state": "queued"})))
        .expect(1)
        .mount(&vendors)
        .await;
    Mock::given(method("GET"))
        .and(path("/generations/g-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "g-7", "state": "dreaming"})))
        .mount(&vendors)
        .await;

    let gateway = TestGateway::with_vendors(&vendors).await;
    let client = gateway.client();

    let created = client
        .create_video(&GenerateVideoBody {
            prompt: Some("tide rolls in".into()),
            image_url: Some("https://img/start.png".into()),
            ..GenerateVideoBody::default()
        })
        .await
        .unwrap();
    assert_eq!(created, json!({"id": "g-7", "state": "queued"}));

    let status = client.video_status("g-7").await.unwrap();
    assert_eq!(status["state"], "dreaming");
}

#[tokio::test]
async fn test_proxy_repeated_fetches_match() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/frames/0001.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0, 7, 7]),
        )
        .mount(&origin)
        .await;

    let gateway = TestGateway::start(StudioConfig::default()).await;
    let client = gateway.client();
    let target = format!("{}/frames/0001.jpg", origin.uri());

    let first = client.proxy(&target).await.unwrap();
    let second = client.proxy(&target).await.unwrap();

    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(first.content_type, second.content_type);
}
