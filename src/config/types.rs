use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SentinelError;

/// Redact a secret string for Debug output. Shows "[REDACTED]" if non-empty, "[]" if empty.
fn redact(s: &str) -> &str {
    if s.is_empty() { "[]" } else { "[REDACTED]" }
}

// ── Top-level Settings ──────────────────────────────────────────────

/// Top-level configuration. Each field maps to a TOML `[section]`.
/// Uses `#[serde(default)]` so missing sections gracefully fall back.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub github: GithubConfig,
    pub gemini: GeminiConfig,
    pub checks: ChecksConfig,
    pub labels: LabelsConfig,
    pub prompts: PromptsConfig,
    pub templates: TemplatesConfig,
}

impl Settings {
    /// Ensure every secret the server needs is present.
    ///
    /// Called before `serve`; the CLI's offline commands skip it.
    pub fn validate(&self) -> Result<(), SentinelError> {
        let missing: Vec<&str> = [
            ("GITHUB_TOKEN", self.github.token.is_empty()),
            ("WEBHOOK_SECRET", self.github.webhook_secret.is_empty()),
            ("GEMINI_API_KEY", self.gemini.key.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, is_missing)| is_missing.then_some(name))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SentinelError::Other(format!(
                "required settings missing: {}",
                missing.join(", ")
            )))
        }
    }
}

// ── [server] ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted webhook body, in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            body_limit: 2 * 1024 * 1024,
        }
    }
}

// ── [github] ────────────────────────────────────────────────────────

#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GithubConfig {
    pub token: String,
    pub webhook_secret: String,
    pub base_url: String,
    pub ratelimit_retries: u32,
    pub request_timeout: u64,
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &redact(&self.token))
            .field("webhook_secret", &redact(&self.webhook_secret))
            .field("base_url", &self.base_url)
            .field("ratelimit_retries", &self.ratelimit_retries)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            webhook_secret: String::new(),
            base_url: "https://api.github.com".into(),
            ratelimit_retries: 5,
            request_timeout: 30,
        }
    }
}

// ── [gemini] ────────────────────────────────────────────────────────

#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub key: String,
    pub api_url: String,
    pub timeout: u64,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("key", &redact(&self.key))
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            api_url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent".into(),
            timeout: 60,
        }
    }
}

// ── [checks] ────────────────────────────────────────────────────────

/// Timeouts are in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChecksConfig {
    pub clone_timeout: u64,
    pub install_timeout: u64,
    pub lint_timeout: u64,
    pub audit_timeout: u64,
    pub max_concurrent_runs: usize,
    /// Tool output embedded in a fragment is cut to this many bytes.
    pub max_output_bytes: usize,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            clone_timeout: 120,
            install_timeout: 300,
            lint_timeout: 120,
            audit_timeout: 120,
            max_concurrent_runs: 4,
            max_output_bytes: 8 * 1024,
        }
    }
}

// ── [labels] ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub pull_request: String,
    pub issue: String,
    pub security: String,
    pub error: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            pull_request: "needs-review".into(),
            issue: "triage".into(),
            security: "security".into(),
            error: "error".into(),
        }
    }
}

// ── [prompts] ───────────────────────────────────────────────────────

/// minijinja templates for the text sent to the AI collaborator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Rendered with `diff`.
    pub pr_review: String,
    /// Rendered with `content`.
    pub reply: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            pr_review: "Review this PR diff for style, security, and quality:\n{{ diff }}".into(),
            reply: "Reply to the following GitHub Issue/Discussion:\n{{ content }}".into(),
        }
    }
}

// ── [templates] ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub auto_close_pr: String,
    pub auto_close_issue: String,
    /// Rendered with `alert_type`, `repository`, `severity`, `state`, `timestamp`.
    pub security_alert: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            auto_close_pr: "🤖 **Auto-closing:** This PR appears to be spam or unnecessary. If this was closed in error, please reopen with more details.".into(),
            auto_close_issue: "🤖 **Auto-closing:** This issue appears to be spam or unnecessary. If this was closed in error, please reopen with more details.".into(),
            security_alert: "## Security Alert Detected\n\n**Alert Type:** {{ alert_type }}\n**Repository:** {{ repository }}\n**Severity:** {{ severity }}\n**State:** {{ state }}\n**Timestamp:** {{ timestamp }}\n\nPlease review this security alert and take appropriate action.".into(),
        }
    }
}
