use datascribe::config::AppConfig;
use datascribe::dataset::{Column, Dataset};
use datascribe::narrative::{NarrativeClient, NarrativeError, FALLBACK_PREFIX};
use datascribe::profiler::{profile, ProfileSummary};

fn test_config(endpoint: String) -> AppConfig {
    AppConfig {
        llm_endpoint: endpoint,
        api_key: "test-key".into(),
        ..AppConfig::default()
    }
}

fn sample_profile() -> ProfileSummary {
    let ds = Dataset::new(vec![
        Column::infer(
            "amount".into(),
            vec![Some("1".into()), Some("2".into()), Some("3".into())],
        ),
        Column::infer(
            "region".into(),
            vec![Some("n".into()), Some("s".into()), Some("n".into())],
        ),
    ]);
    profile(&ds)
}

#[tokio::test]
async fn chat_returns_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "choices": [ { "message": { "content": "hello" } } ] }"#)
        .create_async()
        .await;

    let client = NarrativeClient::new(&test_config(server.url())).unwrap();
    let resp = client.chat("ping").await.unwrap();
    assert_eq!(resp, "hello");
    mock.assert_async().await;
}

#[tokio::test]
async fn chat_sends_model_and_two_messages() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::AllOf(vec![
            mockito::Matcher::PartialJson(serde_json::json!({ "model": "gpt-4o-mini" })),
            mockito::Matcher::Regex("data analysis assistant".into()),
            mockito::Matcher::Regex("Filename: sales.csv".into()),
        ]))
        .with_status(200)
        .with_body(r#"{ "choices": [ { "message": { "content": "ok" } } ] }"#)
        .create_async()
        .await;

    let client = NarrativeClient::new(&test_config(server.url())).unwrap();
    let narrative = client.synthesize("sales.csv", &sample_profile()).await;
    assert!(!narrative.degraded);
    assert_eq!(narrative.text, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_degrades_to_placeholder() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let client = NarrativeClient::new(&test_config(server.url())).unwrap();
    let narrative = client.synthesize("sales.csv", &sample_profile()).await;
    assert!(narrative.degraded);
    assert!(narrative.text.starts_with(FALLBACK_PREFIX));
}

#[tokio::test]
async fn malformed_payload_degrades_to_placeholder() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(r#"{ "choices": [] }"#)
        .create_async()
        .await;

    let config = test_config(server.url());
    let client = NarrativeClient::new(&config).unwrap();
    let err = client.chat("ping").await.unwrap_err();
    assert!(matches!(err, NarrativeError::InvalidResponse));

    let narrative = client.synthesize("sales.csv", &sample_profile()).await;
    assert!(narrative.degraded);
    assert!(narrative.text.starts_with(FALLBACK_PREFIX));
}

#[tokio::test]
async fn unreachable_endpoint_degrades_to_placeholder() {
    // closed port, nothing listens here
    let client = NarrativeClient::new(&test_config("http://127.0.0.1:9".into())).unwrap();
    let narrative = client.synthesize("sales.csv", &sample_profile()).await;
    assert!(narrative.degraded);
    assert!(narrative.text.starts_with(FALLBACK_PREFIX));
}
