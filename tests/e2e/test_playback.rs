use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::Value;
use test_context::test_context;

const SEGMENT_PATH: &str = "/scv/play/segment/thig1.1/en/soma/thig1.1:1.1";

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_play_a_segment_in_both_languages(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("{}/Amy", SEGMENT_PATH))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    assert_eq!(response.field("sutta_uid"), "thig1.1");
    assert_eq!(response.field("scid"), "thig1.1:1.1");
    assert_eq!(response.field("langTrans"), "en");
    assert_eq!(response.field("translator"), "soma");
    assert_eq!(response.field("title"), "Title of thig1.1");
    assert_eq!(response.field("iSegment"), 0);
    assert_eq!(response.field("nSections"), 1);
    assert_eq!(response.field("vnameTrans"), "Amy");
    assert_eq!(response.field("vnameRoot"), "Aditi");
    assert_eq!(response.field("segment/en"), "english text 1");

    let en_guid = response.field("segment/audio/en").as_str().unwrap();
    let pli_guid = response.field("segment/audio/pli").as_str().unwrap();
    assert_eq!(en_guid.len(), 32);
    assert_ne!(en_guid, pli_guid);
    assert!(response.body.as_ref().unwrap().get("error").is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_synthesize_a_segment_twice(ctx: &TestContext) {
    let path = format!("{}/Amy", SEGMENT_PATH);
    let first = ctx.client.get(&path).await.unwrap();
    let requests = ctx.tts.request_count();
    let second = ctx.client.get(&path).await.unwrap();

    assert_eq!(
        first.field("segment/audio/en"),
        second.field("segment/audio/en")
    );
    assert_eq!(ctx.tts.request_count(), requests);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_spoken_audio(ctx: &TestContext) {
    let played = ctx
        .client
        .get(&format!("{}/Amy", SEGMENT_PATH))
        .await
        .unwrap();
    let guid = played.field("segment/audio/en").as_str().unwrap();

    let response = ctx
        .client
        .get(&format!(
            "/scv/audio/thig1.1/en/soma/Amy/{}?filename=thig1.1_1.1.mp3",
            guid
        ))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    response.assert_header("content-type", "audio/mpeg");
    response.assert_header("accept-ranges", "bytes");
    response.assert_header("content-disposition", "attachment; filename=thig1.1_1.1.mp3");
    assert_eq!(response.body_bytes, b"Amy|english text 1".to_vec());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_audio(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/scv/audio/thig1.1/en/soma/Amy/0123456789abcdef0123456789abcdef")
        .await
        .unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_segment(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/scv/play/segment/thig1.1/en/soma/thig1.1:9.9/Amy")
        .await
        .unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("segment thig1.1:9.9 not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("{}/Russell", SEGMENT_PATH))
        .await
        .unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("Russell");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fall_back_to_machine_speech_without_recording(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("{}/Amy/sujato_pli", SEGMENT_PATH))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("vnameRoot"), "Aditi");
    assert!(response.field("segment/audio/pli").is_string());
    assert!(response.body.as_ref().unwrap().get("error").is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_prefer_human_recordings(ctx: &TestContext) {
    ctx.fixtures
        .create_recording("pli", "sujato", "thig1.1:1.1", b"recorded by sujato")
        .await
        .unwrap();

    let response = ctx
        .client
        .get(&format!("{}/Amy/sujato_pli", SEGMENT_PATH))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("vnameRoot"), "sujato");
    // Only the English translation needed the speech provider
    assert_eq!(ctx.tts.request_count(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_synthesis_failures_in_the_body(ctx: &TestContext) {
    ctx.tts.fail();

    let response = ctx
        .client
        .get(&format!("{}/Amy", SEGMENT_PATH))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let error = response.field("error").as_str().unwrap();
    assert!(error.contains("speech provider unavailable"), "{}", error);
    assert_eq!(response.field("segment/en"), "english text 1");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_share_cache_across_concurrent_players(ctx: &TestContext) {
    let path = format!("{}/Amy", SEGMENT_PATH);
    let mut futures = Vec::new();
    for _ in 0..5 {
        let client = ctx.client.clone();
        let path = path.clone();
        futures.push(async move { client.get(&path).await });
    }

    let results = futures::future::join_all(futures).await;

    let guids: Vec<Value> = results
        .into_iter()
        .map(|r| r.unwrap().field("segment/audio/en").clone())
        .collect();
    assert!(guids.iter().all(|g| g == &guids[0]));
}
