use super::*;

#[test]
fn default_server_config_has_sane_body_limit() {
    let config = ServerConfig::default();
    assert_eq!(config.port, 8080);
    assert!(config.max_webhook_body_bytes > 0);
}

#[test]
fn load_without_a_file_falls_back_to_the_environment() {
    let config = ServiceConfig::load(None).unwrap();
    assert_eq!(config.server.port, ServerConfig::default().port);
}

#[test]
fn load_with_a_missing_file_path_is_not_an_error() {
    let config = ServiceConfig::load(Some("/nonexistent/reactorcide.toml")).unwrap();
    assert_eq!(config.server.host, ServerConfig::default().host);
}
