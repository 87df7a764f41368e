use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::TextGenerator;
use crate::config::types::GeminiConfig;
use crate::error::SentinelError;

/// Client for Google's `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, SentinelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(SentinelError::Http)?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.key.clone(),
        })
    }

    fn build_request_body(prompt: &str) -> serde_json::Value {
        json!({
            "contents": [
                {"parts": [{"text": prompt}]}
            ]
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

/// First candidate's first text part, if the model produced one.
fn extract_text(raw: &str) -> Result<Option<String>, SentinelError> {
    let api_resp: ApiResponse = serde_json::from_str(raw)?;
    Ok(api_resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, SentinelError> {
        let resp = self
            .client
            .post(&self.api_url)
            .header("X-goog-api-key", &self.api_key)
            .json(&Self::build_request_body(prompt))
            .send()
            .await
            .map_err(SentinelError::Http)?;

        if !resp.status().is_success() {
            let status = resp.status();
            if status.as_u16() == 429 {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(SentinelError::RateLimited {
                    retry_after_secs: retry_after,
                });
            }
            let body_text = resp.text().await.unwrap_or_default();
            return Err(SentinelError::CollaboratorUnavailable(format!(
                "Gemini API returned {status}: {body_text}"
            )));
        }

        let raw = resp.text().await.map_err(SentinelError::Http)?;
        extract_text(&raw)
    }
}
