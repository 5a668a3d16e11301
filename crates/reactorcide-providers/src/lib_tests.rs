use super::*;

#[test]
fn extract_form_payload_decodes_percent_and_plus() {
    let body = b"payload=%7B%22a%22%3A1%2C%22b%22%3A%22x+y%22%7D";
    let decoded = extract_form_payload(body).unwrap();
    assert_eq!(decoded, br#"{"a":1,"b":"x y"}"#);
}

#[test]
fn extract_form_payload_returns_none_without_payload_field() {
    assert!(extract_form_payload(br#"{"a":1}"#).is_none());
}

#[test]
fn webhook_request_header_lookup_is_case_insensitive() {
    let request = WebhookRequest {
        headers: std::collections::HashMap::from([("X-GitHub-Event".to_string(), "push".to_string())]),
        body: vec![],
    };
    assert_eq!(request.header("x-github-event"), Some("push"));
}
