use log::debug;
use serde::{Deserialize, Serialize};

use super::prompt::{build_prompt, parse_labels};
use super::{LabelOracle, OracleError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Where label requests go and which model answers them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleConfig {
	pub base_url: String,
	pub model: String,
}

impl Default for OracleConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_owned(),
			model: DEFAULT_MODEL.to_owned(),
		}
	}
}

#[derive(Serialize)]
struct ChatRequest<'a> {
	model: &'a str,
	messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
	role: &'a str,
	content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
	#[serde(default)]
	choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
	message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
	content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
	error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
	message: String,
}

/// Chat-completions client.
#[derive(Clone, Debug)]
pub struct OpenAiOracle {
	client: reqwest::Client,
	config: OracleConfig,
}

impl OpenAiOracle {
	pub fn new(config: OracleConfig) -> Self {
		Self {
			client: reqwest::Client::new(),
			config,
		}
	}

	fn endpoint(&self) -> String {
		format!(
			"{}/chat/completions",
			self.config.base_url.trim_end_matches('/')
		)
	}
}

impl LabelOracle for OpenAiOracle {
	async fn request_labels(
		&self,
		api_key: &str,
		path: &[String],
	) -> Result<Vec<String>, OracleError> {
		let prompt = build_prompt(path);
		debug!("requesting labels for {path:?} from {}", self.config.model);

		let response = self
			.client
			.post(self.endpoint())
			.bearer_auth(api_key)
			.json(&ChatRequest {
				model: &self.config.model,
				messages: [ChatMessage {
					role: "user",
					content: &prompt,
				}],
			})
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			let message = serde_json::from_str::<ErrorEnvelope>(&body)
				.map(|envelope| envelope.error.message)
				.unwrap_or(body);
			return Err(OracleError::Service {
				status: status.as_u16(),
				message,
			});
		}

		let body: ChatResponse = response.json().await?;
		let content = body
			.choices
			.into_iter()
			.next()
			.and_then(|choice| choice.message)
			.and_then(|message| message.content)
			.ok_or_else(|| OracleError::MalformedBody("response has no message content".into()))?;
		debug!("completion: {content}");
		Ok(parse_labels(&content))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use wiremock::matchers::{body_partial_json, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;
	use crate::oracle::error_labels;

	fn oracle_for(server: &MockServer) -> OpenAiOracle {
		OpenAiOracle::new(OracleConfig {
			base_url: format!("{}/v1/", server.uri()),
			model: "test-model".into(),
		})
	}

	fn role_path() -> Vec<String> {
		vec!["Chef".into(), "Kitchen".into()]
	}

	#[tokio::test]
	async fn completion_bullets_become_labels() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v1/chat/completions"))
			.and(header("authorization", "Bearer sk-test"))
			.and(body_partial_json(json!({
				"model": "test-model",
				"messages": [{ "role": "user" }]
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"choices": [{ "message": { "role": "assistant", "content": "* Prep\n* Cook\n* Plate" } }]
			})))
			.expect(1)
			.mount(&server)
			.await;

		let labels = oracle_for(&server)
			.fetch_labels("sk-test", &role_path())
			.await;
		assert_eq!(labels, vec!["Prep", "Cook", "Plate"]);
	}

	#[tokio::test]
	async fn service_errors_carry_status_and_message() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(401).set_body_json(json!({
				"error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
			})))
			.mount(&server)
			.await;

		let oracle = oracle_for(&server);
		match oracle.request_labels("bad", &role_path()).await {
			Err(OracleError::Service { status, message }) => {
				assert_eq!(status, 401);
				assert_eq!(message, "Incorrect API key provided");
			}
			other => panic!("expected service error, got {other:?}"),
		}
		assert_eq!(oracle.fetch_labels("bad", &role_path()).await, error_labels());
	}

	#[tokio::test]
	async fn empty_choices_are_malformed() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
			.mount(&server)
			.await;

		let oracle = oracle_for(&server);
		assert!(matches!(
			oracle.request_labels("k", &role_path()).await,
			Err(OracleError::MalformedBody(_))
		));
	}

	#[tokio::test]
	async fn unreachable_service_yields_error_labels() {
		let server = MockServer::start().await;
		let oracle = oracle_for(&server);
		drop(server);

		assert_eq!(oracle.fetch_labels("k", &role_path()).await, error_labels());
	}
}
