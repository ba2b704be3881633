//! HTTP client for the evaluation service.
//!
//! Sends the outline as JSON to `POST {base_url}/process-bullet-points` and
//! reads back an [`EvaluationResponse`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::Evaluator;
use crate::config::EvaluatorConfig;
use crate::models::{BulletPointsRequest, EvaluationResponse};

const EVALUATE_PATH: &str = "/process-bullet-points";

/// Evaluation gateway errors. Every variant is a transport-class failure:
/// the pass is aborted and prior session state is kept.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Evaluator returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed evaluator response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Evaluator rejected the request ({status}): {message}")]
    Rejected { status: String, message: String },
}

/// HTTP client for the evaluation service.
#[derive(Debug, Clone)]
pub struct EvaluatorClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl EvaluatorClient {
    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    /// Create from evaluator configuration, applying its timeout.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with optional auth header.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Handle response, converting HTTP and payload errors to ClientError.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<EvaluationResponse, ClientError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Status { status, body }),
            };
        }

        let parsed: EvaluationResponse = serde_json::from_str(&body)?;
        if !parsed.is_success() {
            return Err(ClientError::Rejected {
                status: parsed.status,
                message: parsed.message,
            });
        }
        Ok(parsed)
    }

    /// Submit an outline for evaluation.
    pub async fn submit(
        &self,
        outline: &BulletPointsRequest,
    ) -> Result<EvaluationResponse, ClientError> {
        tracing::info!(
            "Submitting outline: {} summaries, {} messages, {} bodies",
            outline.summaries.len(),
            outline.message_count(),
            outline.body_count()
        );
        let response = self
            .request(reqwest::Method::POST, EVALUATE_PATH)
            .json(outline)
            .send()
            .await?;
        let evaluation = self.handle_response(response).await?;
        tracing::info!(
            "Evaluation returned {} findings (score {:?})",
            evaluation.results.len(),
            evaluation.score
        );
        Ok(evaluation)
    }
}

impl Evaluator for EvaluatorClient {
    async fn evaluate(
        &self,
        outline: &BulletPointsRequest,
    ) -> Result<EvaluationResponse, ClientError> {
        self.submit(outline).await
    }
}
