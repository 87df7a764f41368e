use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::RepoHost;
use super::types::*;
use crate::config::types::GithubConfig;
use crate::error::SentinelError;
use crate::util::floor_char_boundary;

/// Maximum characters in a single comment (GitHub limit ~65536).
const MAX_COMMENT_CHARS: usize = 65000;

const ADD_DISCUSSION_COMMENT: &str = "mutation($discussionId: ID!, $body: String!) { addDiscussionComment(input: {discussionId: $discussionId, body: $body}) { comment { id } } }";

/// GitHub REST/GraphQL client authenticated with a personal or installation token.
///
/// Built once at startup and shared by every handler.
pub struct GithubClient {
    client: Client,
    /// Base URL for the REST API (supports Enterprise).
    base_url: String,
    token: String,
    ratelimit_retries: u32,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self, SentinelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent("pr-sentinel")
            .build()
            .map_err(|e| SentinelError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            ratelimit_retries: config.ratelimit_retries,
        })
    }

    /// GraphQL endpoint for the configured REST base.
    ///
    /// `https://api.github.com` → `https://api.github.com/graphql`,
    /// `https://ghe.example/api/v3` → `https://ghe.example/api/graphql`.
    fn graphql_url(&self) -> String {
        match self.base_url.strip_suffix("/v3") {
            Some(api_root) => format!("{api_root}/graphql"),
            None => format!("{}/graphql", self.base_url),
        }
    }

    /// Send an authenticated request, retrying on rate limits (429).
    ///
    /// Retries up to `ratelimit_retries` times with exponential backoff,
    /// respecting the `Retry-After` header when present.
    async fn request_with_retry(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, SentinelError> {
        for attempt in 0..=self.ratelimit_retries {
            let mut req = self
                .client
                .request(method.clone(), url)
                .bearer_auth(&self.token)
                .header("Accept", "application/vnd.github+json");

            if let Some(b) = body {
                req = req.json(b);
            }

            let resp = req.send().await.map_err(SentinelError::Http)?;

            if resp.status().as_u16() == 429 {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(2u64.pow(attempt + 1));

                if attempt < self.ratelimit_retries {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max = self.ratelimit_retries,
                        retry_after_secs = retry_after,
                        url,
                        "GitHub API rate limited, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(retry_after)).await;
                    continue;
                }
                return Err(SentinelError::RateLimited {
                    retry_after_secs: retry_after,
                });
            }

            return Ok(resp);
        }

        Err(SentinelError::CollaboratorUnavailable(
            "GitHub API rate limit retries exhausted".into(),
        ))
    }

    /// Check response status and map failures to `CollaboratorUnavailable`.
    async fn check_response(
        resp: reqwest::Response,
        method: &str,
    ) -> Result<reqwest::Response, SentinelError> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SentinelError::CollaboratorUnavailable(format!(
                "GitHub API {method} {status}: {body}"
            )));
        }
        Ok(resp)
    }

    async fn api_call(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, SentinelError> {
        let url = format!("{}/{}", self.base_url, path);
        let label = method.to_string();
        let resp = self.request_with_retry(method, &url, body).await?;
        let resp = Self::check_response(resp, &label).await?;
        resp.json().await.map_err(SentinelError::Http)
    }

    async fn api_get(&self, path: &str) -> Result<serde_json::Value, SentinelError> {
        self.api_call(reqwest::Method::GET, path, None).await
    }

    async fn api_post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, SentinelError> {
        self.api_call(reqwest::Method::POST, path, Some(body)).await
    }

    async fn api_patch(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, SentinelError> {
        self.api_call(reqwest::Method::PATCH, path, Some(body)).await
    }

    /// Run a GraphQL operation, surfacing the `errors` array as a failure.
    async fn graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, SentinelError> {
        let url = self.graphql_url();
        let payload = json!({"query": query, "variables": variables});
        let resp = self
            .request_with_retry(reqwest::Method::POST, &url, Some(&payload))
            .await?;
        let resp = Self::check_response(resp, "GRAPHQL").await?;
        let data: serde_json::Value = resp.json().await.map_err(SentinelError::Http)?;

        if let Some(errors) = data["errors"].as_array().filter(|e| !e.is_empty()) {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e["message"].as_str())
                .collect();
            return Err(SentinelError::CollaboratorUnavailable(format!(
                "GitHub GraphQL error: {}",
                messages.join("; ")
            )));
        }
        Ok(data["data"].clone())
    }
}

fn truncate_comment(text: &str) -> &str {
    &text[..floor_char_boundary(text, MAX_COMMENT_CHARS)]
}

#[async_trait]
impl RepoHost for GithubClient {
    async fn get_subject(&self, repo: &str, subject: &SubjectRef) -> Result<Subject, SentinelError> {
        let data = match subject {
            SubjectRef::Issue(n) => self.api_get(&format!("repos/{repo}/issues/{n}")).await?,
            SubjectRef::PullRequest(n) => self.api_get(&format!("repos/{repo}/pulls/{n}")).await?,
            SubjectRef::Discussion { .. } => {
                return Err(SentinelError::Unsupported(
                    "fetching discussions; the webhook payload carries title and body".into(),
                ));
            }
        };

        if data.is_null() {
            return Err(SentinelError::CollaboratorUnavailable(format!(
                "{subject} not found in {repo}"
            )));
        }

        Ok(Subject {
            title: data["title"].as_str().unwrap_or_default().to_string(),
            body: data["body"].as_str().unwrap_or_default().to_string(),
        })
    }

    async fn post_comment(
        &self,
        repo: &str,
        subject: &SubjectRef,
        text: &str,
    ) -> Result<(), SentinelError> {
        let body = truncate_comment(text);
        match subject {
            SubjectRef::Issue(n) | SubjectRef::PullRequest(n) => {
                self.api_post(
                    &format!("repos/{repo}/issues/{n}/comments"),
                    &json!({"body": body}),
                )
                .await?;
            }
            SubjectRef::Discussion { node_id, .. } => {
                self.graphql(
                    ADD_DISCUSSION_COMMENT,
                    json!({"discussionId": node_id, "body": body}),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn add_labels(
        &self,
        repo: &str,
        subject: &SubjectRef,
        labels: &[String],
    ) -> Result<(), SentinelError> {
        match subject {
            SubjectRef::Issue(n) | SubjectRef::PullRequest(n) => {
                self.api_post(
                    &format!("repos/{repo}/issues/{n}/labels"),
                    &json!({"labels": labels}),
                )
                .await?;
                Ok(())
            }
            SubjectRef::Discussion { .. } => Err(SentinelError::Unsupported(
                "labels on discussions".into(),
            )),
        }
    }

    async fn set_state(
        &self,
        repo: &str,
        subject: &SubjectRef,
        state: SubjectState,
    ) -> Result<(), SentinelError> {
        let path = match subject {
            SubjectRef::Issue(n) => format!("repos/{repo}/issues/{n}"),
            SubjectRef::PullRequest(n) => format!("repos/{repo}/pulls/{n}"),
            SubjectRef::Discussion { .. } => {
                return Err(SentinelError::Unsupported(
                    "changing discussion state".into(),
                ));
            }
        };
        self.api_patch(&path, &json!({"state": state.as_str()}))
            .await?;
        Ok(())
    }

    async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<u64, SentinelError> {
        let data = self
            .api_post(
                &format!("repos/{repo}/issues"),
                &json!({"title": title, "body": truncate_comment(body), "labels": labels}),
            )
            .await?;
        data["number"].as_u64().ok_or_else(|| {
            SentinelError::CollaboratorUnavailable("issue creation returned no number".into())
        })
    }

    async fn get_diff(&self, diff_url: &str) -> Result<String, SentinelError> {
        // diff_url points at github.com, not the API, so no token is attached.
        let resp = self
            .client
            .get(diff_url)
            .send()
            .await
            .map_err(SentinelError::Http)?;
        let resp = Self::check_response(resp, "GET").await?;
        resp.text().await.map_err(SentinelError::Http)
    }
}
