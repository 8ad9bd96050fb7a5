//! Media fetcher tests: Serper media endpoints plus HEAD link validation

use answer_engine::media::{LinkValidator, MediaFetcher};
use answer_engine::network::HttpClient;
use answer_engine::{Error, ImageResult, VideoResult};
use serde_json::{json, Value};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> MediaFetcher {
    MediaFetcher::new(
        HttpClient::new().unwrap(),
        Some("serper-key".to_string()),
        Duration::from_secs(2),
    )
    .with_base_url(server.uri())
}

async fn mount_head(server: &MockServer, route: &str, status: u16, content_type: &str) {
    Mock::given(method("HEAD"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(status).insert_header("content-type", content_type))
        .mount(server)
        .await;
}

async fn mount_media(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(format!("/{}", endpoint)))
        .and(header("X-API-KEY", "serper-key"))
        .and(body_json(json!({"q": "ferris"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_images_drop_dead_links_and_keep_order() {
    let server = MockServer::start().await;

    let images: Vec<Value> = (0..12)
        .map(|i| {
            json!({
                "title": format!("image {}", i),
                "imageUrl": format!("{}/img/{}", server.uri(), i),
            })
        })
        .collect();
    mount_media(&server, "images", json!({ "images": images })).await;

    for i in 0..12 {
        let route = format!("/img/{}", i);
        match i {
            2 => mount_head(&server, &route, 404, "image/png").await,
            5 => mount_head(&server, &route, 200, "text/html; charset=utf-8").await,
            7 => mount_head(&server, &route, 500, "image/jpeg").await,
            _ => mount_head(&server, &route, 200, "image/jpeg").await,
        }
    }

    let results = assert_ok!(fetcher(&server).get_images("ferris").await);

    let expected: Vec<ImageResult> = [0, 1, 3, 4, 6, 8, 9, 10, 11]
        .iter()
        .map(|i| ImageResult {
            title: format!("image {}", i),
            link: format!("{}/img/{}", server.uri(), i),
        })
        .collect();
    assert_eq!(results, expected);
}

#[tokio::test]
async fn test_images_capped_at_nine() {
    let server = MockServer::start().await;

    let images: Vec<Value> = (0..15)
        .map(|i| json!({"title": i.to_string(), "imageUrl": format!("{}/img/{}", server.uri(), i)}))
        .collect();
    mount_media(&server, "images", json!({ "images": images })).await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "Image/PNG"))
        .mount(&server)
        .await;

    let results = assert_ok!(fetcher(&server).get_images("ferris").await);

    assert_eq!(results.len(), 9);
    assert_eq!(results[0].title, "0");
    assert_eq!(results[8].title, "8");
}

#[tokio::test]
async fn test_images_missing_list_is_invalid_format() {
    let server = MockServer::start().await;
    mount_media(&server, "images", json!({"searchParameters": {"q": "ferris"}})).await;

    let err = assert_err!(fetcher(&server).get_images("ferris").await);
    assert!(matches!(err, Error::InvalidResponseFormat(_)));
}

#[tokio::test]
async fn test_images_provider_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = assert_err!(fetcher(&server).get_images("ferris").await);
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_videos_keep_live_thumbnails() {
    let server = MockServer::start().await;

    mount_media(
        &server,
        "videos",
        json!({"videos": [
            {"title": "one", "link": "https://video.example/1", "imageUrl": format!("{}/thumb/1", server.uri())},
            {"title": "two", "link": "https://video.example/2", "imageUrl": format!("{}/thumb/2", server.uri())},
            {"title": "three", "link": "https://video.example/3"}
        ]}),
    )
    .await;
    mount_head(&server, "/thumb/1", 200, "image/webp").await;
    mount_head(&server, "/thumb/2", 404, "text/plain").await;

    let videos = assert_ok!(fetcher(&server).get_videos("ferris").await);

    assert_eq!(
        videos,
        Some(vec![VideoResult {
            image_url: format!("{}/thumb/1", server.uri()),
            link: "https://video.example/1".to_string(),
        }])
    );
}

#[tokio::test]
async fn test_videos_missing_list_is_none() {
    let server = MockServer::start().await;
    mount_media(&server, "videos", json!({"credits": 1})).await;

    let videos = assert_ok!(fetcher(&server).get_videos("ferris").await);
    assert_eq!(videos, None);
}

fn cancel_after(millis: u64) -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        trigger.cancel();
    });
    token
}

#[tokio::test]
async fn test_images_cancelled_during_provider_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"images": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let token = cancel_after(50);
    let err = assert_err!(fetcher(&server).get_images_cancellable("ferris", &token).await);
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_videos_cancelled_during_link_validation() {
    let server = MockServer::start().await;

    mount_media(
        &server,
        "videos",
        json!({"videos": [
            {"link": "https://video.example/1", "imageUrl": format!("{}/thumb/slow", server.uri())}
        ]}),
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/thumb/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let fetcher = MediaFetcher::new(
        HttpClient::new().unwrap(),
        Some("serper-key".to_string()),
        Duration::from_secs(10),
    )
    .with_base_url(server.uri());

    let token = cancel_after(200);
    let err = assert_err!(fetcher.get_videos_cancellable("ferris", &token).await);
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_cancellable_completes_when_untouched() {
    let server = MockServer::start().await;
    mount_media(&server, "videos", json!({})).await;

    let token = CancellationToken::new();
    let videos = assert_ok!(fetcher(&server).get_videos_cancellable("ferris", &token).await);
    assert_eq!(videos, None);
    assert!(!token.is_cancelled());
}

#[tokio::test]
async fn test_validator_timeout_counts_as_dead() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let validator = LinkValidator::new(HttpClient::new().unwrap(), Duration::from_millis(100));
    assert!(!validator.is_live_image(&format!("{}/slow", server.uri())).await);
}

#[tokio::test]
async fn test_validator_unreachable_host() {
    let validator = LinkValidator::new(HttpClient::new().unwrap(), Duration::from_millis(500));
    assert!(!validator.is_live_image("http://127.0.0.1:1/nothing.png").await);
}
