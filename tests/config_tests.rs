use datascribe::config::{load_config, ConfigError, DEFAULT_LLM_ENDPOINT, DEFAULT_MODEL};

// Env mutation is process-global, so every scenario runs inside one test.
#[test]
fn defaults_env_and_flags_layer_in_order() {
    std::env::set_var("AIPROXY_TOKEN", "sekrit");
    std::env::remove_var("LLM_ENDPOINT");
    std::env::remove_var("LLM_MODEL");

    let cfg = load_config(&None, &None).unwrap();
    assert_eq!(cfg.llm_endpoint, DEFAULT_LLM_ENDPOINT);
    assert_eq!(cfg.model, DEFAULT_MODEL);
    assert_eq!(cfg.api_key, "sekrit");
    assert_eq!(cfg.request_timeout_secs, 60);
    assert_eq!(cfg.output_root, std::path::PathBuf::from("."));

    std::env::set_var("LLM_ENDPOINT", "http://localhost:9999/v1/chat");
    std::env::set_var("LLM_MODEL", "gpt-4o");
    let cfg = load_config(&None, &None).unwrap();
    assert_eq!(cfg.llm_endpoint, "http://localhost:9999/v1/chat");
    assert_eq!(cfg.model, "gpt-4o");

    let cfg = load_config(&Some("http://flag:1/v1".into()), &Some("tiny".into())).unwrap();
    assert_eq!(cfg.llm_endpoint, "http://flag:1/v1");
    assert_eq!(cfg.model, "tiny");

    std::env::remove_var("LLM_ENDPOINT");
    std::env::remove_var("LLM_MODEL");
    std::env::remove_var("AIPROXY_TOKEN");
    let err = load_config(&None, &None).unwrap_err();
    assert!(matches!(err, ConfigError::MissingToken));
    assert_eq!(
        err.to_string(),
        "AIPROXY_TOKEN environment variable is not set"
    );
}
