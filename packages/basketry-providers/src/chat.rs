//! OpenAI-compatible chat completions.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use basketry_config::LlmProviderConfig;

use crate::{Error, Result};

/// Sends one chat completion and returns the trimmed assistant content. No retries.
pub async fn complete(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base.trim_end_matches('/'), cfg.path);
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&request_body(cfg, messages))
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chat_content(&json)
}

pub fn request_body(cfg: &LlmProviderConfig, messages: &[Value]) -> Value {
	serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": messages,
	})
}

pub fn parse_chat_content(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing choices[0].message.content.".to_string(),
		})?
		.trim();

	if content.is_empty() {
		return Err(Error::InvalidResponse { message: "Chat response content is empty.".to_string() });
	}

	Ok(content.to_string())
}
