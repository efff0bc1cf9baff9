//! Label oracle: asks a chat-completion service for three child labels.
//!
//! Callers go through [`LabelOracle::fetch_labels`], which never fails. Any
//! transport, service or parse error is logged and replaced by three
//! [`ERROR_LABEL`]s so the expansion can still be committed.

mod openai;
pub(crate) mod prompt;

use log::error;
use thiserror::Error;

pub use openai::{OpenAiOracle, OracleConfig};

/// Label written into every placeholder when a request fails.
pub const ERROR_LABEL: &str = "Error";

#[derive(Debug, Error)]
pub enum OracleError {
	/// The service answered with a non-success status.
	#[error("[error {status}] {message}")]
	Service { status: u16, message: String },

	#[error("label request failed: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("malformed completion: {0}")]
	MalformedBody(String),
}

/// The fixed result of a failed request.
pub fn error_labels() -> Vec<String> {
	vec![ERROR_LABEL.to_owned(); 3]
}

#[allow(async_fn_in_trait)]
pub trait LabelOracle {
	/// Asks for child labels of the last element of `path` (root first).
	async fn request_labels(
		&self,
		api_key: &str,
		path: &[String],
	) -> Result<Vec<String>, OracleError>;

	/// Like [`request_labels`](Self::request_labels), with failures collapsed
	/// into [`error_labels`].
	async fn fetch_labels(&self, api_key: &str, path: &[String]) -> Vec<String> {
		match self.request_labels(api_key, path).await {
			Ok(labels) => labels,
			Err(OracleError::Service { status, message }) => {
				error!("label service returned {status}: {message}");
				error_labels()
			}
			Err(e) => {
				error!("error with label service request: {e}");
				error_labels()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Failing;

	impl LabelOracle for Failing {
		async fn request_labels(
			&self,
			_api_key: &str,
			_path: &[String],
		) -> Result<Vec<String>, OracleError> {
			Err(OracleError::MalformedBody("connection refused".into()))
		}
	}

	#[tokio::test]
	async fn failures_become_the_error_sentinel() {
		let labels = Failing.fetch_labels("key", &["root".to_owned()]).await;
		assert_eq!(labels, vec!["Error", "Error", "Error"]);
	}
}
