use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::Value;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_english_voices_first_and_pali_last(ctx: &TestContext) {
    let response = ctx.client.get("/scv/voices").await.unwrap();
    response.assert_status(StatusCode::OK);

    let voices = response.body.as_ref().and_then(Value::as_array).unwrap();
    let names: Vec<&str> = voices
        .iter()
        .filter_map(|v| v.get("name").and_then(Value::as_str))
        .collect();

    assert_eq!(names.first(), Some(&"Amy"));
    assert_eq!(names.last(), Some(&"sujato_pli"));
    let first_pali = names.iter().position(|n| *n == "Aditi").unwrap();
    assert!(names[first_pali..].iter().all(|n| *n == "Aditi" || *n == "sujato_pli"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_describe_each_voice(ctx: &TestContext) {
    let response = ctx.client.get("/scv/voices").await.unwrap();
    response.assert_status(StatusCode::OK);

    let voices = response.body.as_ref().and_then(Value::as_array).unwrap();
    let amy = &voices[0];
    assert_eq!(amy.get("label").and_then(Value::as_str), Some("Amy (UK)"));
    assert_eq!(amy.get("langTrans").and_then(Value::as_str), Some("en"));
    assert_eq!(amy.get("locale").and_then(Value::as_str), Some("en-GB"));
    assert_eq!(amy.get("gender").and_then(Value::as_str), Some("female"));
    assert_eq!(amy.get("iVoice").and_then(Value::as_u64), Some(0));
    assert_eq!(amy.get("service").and_then(Value::as_str), Some("aws-polly"));

    let sujato = voices
        .iter()
        .find(|v| v.get("name").and_then(Value::as_str) == Some("sujato_en"))
        .unwrap();
    assert_eq!(sujato.get("service").and_then(Value::as_str), Some("human-tts"));
}
