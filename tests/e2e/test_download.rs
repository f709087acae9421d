use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::Value;
use test_context::test_context;

const BUILD_PATH: &str = "/scv/build-download/mp3/pli+en/Amy/thig1.1";

async fn start_build(ctx: &TestContext, path: &str) -> String {
    let response = ctx.client.get(path).await.unwrap();
    response.assert_status(StatusCode::OK);
    response.field("args/hash").as_str().unwrap().to_string()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_start_a_build_and_report_progress(ctx: &TestContext) {
    let response = ctx.client.get(BUILD_PATH).await.unwrap();
    response.assert_status(StatusCode::OK);

    assert_eq!(response.field("args/audioSuffix"), ".mp3");
    assert_eq!(response.field("args/langs"), &serde_json::json!(["pli", "en"]));
    assert_eq!(response.field("args/vtrans"), "Amy");
    assert_eq!(response.field("args/vroot"), "Aditi");
    assert_eq!(
        response.field("task/name"),
        "Create .mp3 audio download for:thig1.1"
    );

    let hash = response.field("args/hash").as_str().unwrap();
    let task = ctx.wait_for_task(hash).await;
    assert!(task.get("error").is_none(), "{:?}", task);
    assert_eq!(task.get("actionsDone"), task.get("actionsTotal"));
    assert_eq!(ctx.compositor.call_count(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_download_a_finished_build(ctx: &TestContext) {
    let hash = start_build(ctx, BUILD_PATH).await;
    ctx.wait_for_task(&hash).await;

    let response = ctx
        .client
        .get("/scv/download/mp3/pli+en/Amy/thig1.1")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    response.assert_header("content-type", "audio/mpeg");
    response.assert_header(
        "content-disposition",
        "attachment; filename=thig1.1_pli+en_Amy.mp3",
    );
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert!(body.contains("Amy|english text 1"), "{}", body);
    assert!(body.contains("Amy|english text 2"), "{}", body);
    assert!(body.contains("Aditi|"), "{}", body);
    // Served from the finished build
    assert_eq!(ctx.compositor.call_count(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_build_on_download_when_no_build_exists(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/scv/download/ogg/en/Amy/thig1.2")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    response.assert_header("content-type", "audio/ogg");
    assert_eq!(response.body_bytes, b"Amy|english text 1".to_vec());
    assert_eq!(ctx.compositor.call_count(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_insert_breaks_between_tracks(ctx: &TestContext) {
    let hash = start_build(ctx, "/scv/build-download/mp3/en/Amy/thig1.1-2").await;
    let task = ctx.wait_for_task(&hash).await;
    assert!(task.get("error").is_none(), "{:?}", task);

    let response = ctx
        .client
        .get("/scv/download/mp3/en/Amy/thig1.1-2")
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    response.assert_header(
        "content-disposition",
        "attachment; filename=thig1.1-2_en_Amy.mp3",
    );

    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(
        body,
        "Amy|english text 1+Amy|english text 2+silence|1+Amy|english text 1"
    );
    let metadata = ctx.compositor.last_metadata.lock().clone().unwrap();
    assert!(metadata.artist.starts_with("soma"), "{}", metadata.artist);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_share_one_build_between_concurrent_requests(ctx: &TestContext) {
    let mut futures = Vec::new();
    for _ in 0..5 {
        let client = ctx.client.clone();
        futures.push(async move { client.get(BUILD_PATH).await });
    }

    let hashes: Vec<Value> = futures::future::join_all(futures)
        .await
        .into_iter()
        .map(|r| r.unwrap().field("args/hash").clone())
        .collect();
    assert!(hashes.iter().all(|h| h == &hashes[0]));

    ctx.wait_for_task(hashes[0].as_str().unwrap()).await;
    // A finished build is reused as well
    start_build(ctx, BUILD_PATH).await;

    assert_eq!(ctx.compositor.call_count(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unsupported_audio_types(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/scv/build-download/wav/pli+en/Amy/thig1.1")
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("Unsupported audio type");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_non_numeric_max_results(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("{}?maxResults=lots", BUILD_PATH))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("Expected number for maxResults");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_task(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/scv/build-task/0123456789abcdef")
        .await
        .unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("no build task for 0123456789abcdef");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_failed_builds(ctx: &TestContext) {
    let hash = start_build(ctx, "/scv/build-download/mp3/pli+en/Amy/mn1").await;

    let task = ctx.wait_for_task(&hash).await;

    assert_eq!(
        task.get("summary").and_then(Value::as_str),
        Some("Cannot build audio download:mn1")
    );
    assert!(task.get("error").and_then(Value::as_str).is_some());
    assert_eq!(ctx.compositor.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_retry_a_failed_build(ctx: &TestContext) {
    ctx.tts.fail();
    let hash = start_build(ctx, BUILD_PATH).await;
    let failed = ctx.wait_for_task(&hash).await;
    let error = failed.get("error").and_then(Value::as_str).unwrap();
    assert!(error.contains("speech provider unavailable"), "{}", error);

    ctx.tts
        .failing
        .store(false, std::sync::atomic::Ordering::SeqCst);
    start_build(ctx, BUILD_PATH).await;
    let task = ctx.wait_for_task(&hash).await;

    assert!(task.get("error").is_none(), "{:?}", task);
    assert_eq!(ctx.compositor.call_count(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_speak_an_error_track_for_long_playlists(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/scv/download/mp3/pli+en/Amy/thig1.1?maxDuration=1")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert!(body.starts_with("Amy|"), "{}", body);
    assert!(body.contains("minutes long"), "{}", body);
    assert!(!body.contains('+'), "{}", body);
}
