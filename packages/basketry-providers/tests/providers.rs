use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};

use basketry_config::LlmProviderConfig;
use basketry_providers::{Error, chat};

fn provider() -> LlmProviderConfig {
	LlmProviderConfig {
		provider_id: "openai".to_string(),
		api_base: "http://127.0.0.1:9".to_string(),
		api_key: "secret".to_string(),
		path: "/v1/chat/completions".to_string(),
		model: "gpt-4o-mini".to_string(),
		temperature: 0.5,
		max_tokens: 500,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

#[test]
fn builds_bearer_auth_header() {
	let headers =
		basketry_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn default_headers_are_added() {
	let mut extra = Map::new();

	extra.insert("x-org".to_string(), Value::String("desk-7".to_string()));

	let headers =
		basketry_providers::auth_headers("secret", &extra).expect("Failed to build headers.");

	assert_eq!(headers.get("x-org").expect("Missing x-org header."), "desk-7");
}

#[test]
fn non_string_default_header_is_rejected() {
	let mut extra = Map::new();

	extra.insert("x-retries".to_string(), Value::from(3));

	let err = basketry_providers::auth_headers("secret", &extra).expect_err("Expected config error.");

	assert!(matches!(err, Error::InvalidConfig { .. }), "Unexpected error: {err:?}");
}

#[test]
fn request_body_carries_sampling_settings() {
	let messages = vec![serde_json::json!({ "role": "user", "content": "hi" })];
	let body = chat::request_body(&provider(), &messages);

	assert_eq!(body["model"], "gpt-4o-mini");
	assert_eq!(body["temperature"], 0.5);
	assert_eq!(body["max_tokens"], 500);
	assert_eq!(body["messages"][0]["content"], "hi");
}
