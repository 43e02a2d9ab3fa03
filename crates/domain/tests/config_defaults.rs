use vg_domain::config::Config;

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8000);
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 8080
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://localhost:*".to_string()));
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn full_config_parses() {
    let toml_str = r#"
[server]
port = 9001

[llm]
model = "gpt-4o-mini"
api_key_env = "MY_KEY"
max_retries = 5

[corpus]
path = "corpus/hidden_words.txt"

[composer]
history_window = 6
top_k = 1

[transcription]
base_url = "http://stt:9000/v1"

[observability]
otlp_endpoint = "http://otel:4317"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.port, 9001);
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.max_retries, 5);
    assert_eq!(config.composer.history_window, 6);
    assert_eq!(config.composer.top_k, 1);
    assert_eq!(config.transcription.base_url, "http://stt:9000/v1");
    assert_eq!(
        config.observability.otlp_endpoint.as_deref(),
        Some("http://otel:4317")
    );
}

#[test]
fn empty_config_uses_defaults_everywhere() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.llm.api_key_env, "VG_API_KEY");
    assert_eq!(config.composer.history_window, 10);
    assert_eq!(config.server.ws.keepalive_interval_sec, 30);
    assert_eq!(config.server.ws.idle_timeout_sec, 60);
}
