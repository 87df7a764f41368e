pub mod process;
pub mod project;
pub mod workspace;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use url::Url;

use crate::config::types::ChecksConfig;
use crate::error::SentinelError;
use crate::util::clip_output;

pub use process::{SystemToolRunner, ToolInvocation, ToolOutput, ToolRunner};
pub use project::ProjectKind;
pub use workspace::Workspace;

const ALLOWED_CLONE_SCHEMES: &[&str] = &["https", "http", "ssh", "git"];

pub const TIMEOUT_FRAGMENT: &str = "⏰ **Operation timed out.** Please try again later.";
pub const NO_LINT_ERRORS: &str = "✅ No lint errors.";
pub const NO_VULNERABILITIES: &str = "✅ No known security vulnerabilities.";
pub const VULNERABILITIES_FOUND: &str =
    "🔒 **Security risks detected.** Run `npm audit fix`.";

/// Clones a branch into a throwaway workspace and runs the quality tools
/// that fit the detected project type.
pub struct CheckRunner {
    tools: Arc<dyn ToolRunner>,
    config: ChecksConfig,
    permits: Semaphore,
}

impl CheckRunner {
    pub fn new(tools: Arc<dyn ToolRunner>, config: ChecksConfig) -> Self {
        let permits = Semaphore::new(config.max_concurrent_runs.max(1));
        Self {
            tools,
            config,
            permits,
        }
    }

    /// Upper bound on a whole run: the sum of every stage timeout.
    pub fn overall_deadline(&self) -> Duration {
        Duration::from_secs(
            self.config.clone_timeout
                + self.config.install_timeout
                + self.config.lint_timeout
                + self.config.audit_timeout,
        )
    }

    /// Run all checks for `branch` of `clone_url`.
    ///
    /// Never fails: every problem becomes a fragment. The workspace is gone
    /// by the time this returns.
    pub async fn run(&self, clone_url: &str, branch: &str) -> Vec<String> {
        let mut fragments = Vec::new();

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!(error = %e, "check runner semaphore closed");
                fragments.push(format!("❌ **Unexpected error:** {e}"));
                return fragments;
            }
        };

        let workspace = match Workspace::create() {
            Ok(ws) => ws,
            Err(e) => {
                tracing::error!(error = %e, "failed to create check workspace");
                fragments.push(format!("❌ **Unexpected error:** {e}"));
                return fragments;
            }
        };

        tracing::info!(
            clone_url,
            branch,
            workspace = %workspace.path().display(),
            "starting checks"
        );

        let outcome = tokio::time::timeout(
            self.overall_deadline(),
            self.run_stages(workspace.path(), clone_url, branch, &mut fragments),
        )
        .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => fragments.push(error_fragment(&e)),
            Err(_) => {
                tracing::warn!(
                    deadline_secs = self.overall_deadline().as_secs(),
                    "checks exceeded overall deadline"
                );
                fragments.push(TIMEOUT_FRAGMENT.to_string());
            }
        }

        workspace.close();
        tracing::info!(fragments = fragments.len(), "checks finished");
        fragments
    }

    async fn run_stages(
        &self,
        root: &Path,
        clone_url: &str,
        branch: &str,
        fragments: &mut Vec<String>,
    ) -> Result<(), SentinelError> {
        validate_clone_target(clone_url, branch)?;
        self.clone_branch(root, clone_url, branch).await?;

        let kind = ProjectKind::detect(root);
        tracing::debug!(project = kind.display_name(), "detected project type");
        if kind != ProjectKind::Node {
            fragments.push(kind.detection_fragment());
            return Ok(());
        }

        self.node_checks(root, fragments).await
    }

    async fn clone_branch(
        &self,
        root: &Path,
        clone_url: &str,
        branch: &str,
    ) -> Result<(), SentinelError> {
        let invocation = ToolInvocation::new("git", root, secs(self.config.clone_timeout))
            .args([
                "clone",
                "--depth",
                "1",
                "--branch",
                branch,
                "--single-branch",
                "--",
                clone_url,
                ".",
            ])
            .env("GIT_TERMINAL_PROMPT", "0");

        let output = self.tools.run(&invocation).await?;
        if !output.success() {
            return Err(SentinelError::ToolFailure {
                tool: invocation.label(),
                status: output.status_label(),
                detail: clip_output(&output.stderr, self.config.max_output_bytes),
            });
        }
        Ok(())
    }

    async fn node_checks(
        &self,
        root: &Path,
        fragments: &mut Vec<String>,
    ) -> Result<(), SentinelError> {
        let max = self.config.max_output_bytes;

        let install = ToolInvocation::new("npm", root, secs(self.config.install_timeout))
            .args(["install", "--ignore-scripts", "--no-audit", "--no-fund"]);
        let output = self.tools.run(&install).await?;
        if !output.success() {
            tracing::warn!(status = %output.status_label(), "npm install failed");
            fragments.push(format!(
                "⚠️ **npm install failed:**\n```\n{}\n```",
                clip_output(&output.stderr, max)
            ));
            return Ok(());
        }

        let lint = ToolInvocation::new("npx", root, secs(self.config.lint_timeout))
            .args(["eslint", "."]);
        let output = self.tools.run(&lint).await?;
        if output.success() {
            fragments.push(NO_LINT_ERRORS.to_string());
        } else {
            fragments.push(format!(
                "⚠️ **Lint errors:**\n```\n{}\n```",
                clip_output(&output.stdout, max)
            ));
        }

        let audit = ToolInvocation::new("npm", root, secs(self.config.audit_timeout))
            .args(["audit", "--json"]);
        let output = self.tools.run(&audit).await?;
        if audit_reports_vulnerabilities(&output) {
            fragments.push(VULNERABILITIES_FOUND.to_string());
        } else {
            fragments.push(NO_VULNERABILITIES.to_string());
        }

        Ok(())
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Reject anything that is not a plain remote URL, and branch names that
/// git would parse as options.
fn validate_clone_target(clone_url: &str, branch: &str) -> Result<(), SentinelError> {
    let url = Url::parse(clone_url)
        .map_err(|e| SentinelError::MalformedRequest(format!("invalid clone URL: {e}")))?;
    if !ALLOWED_CLONE_SCHEMES.contains(&url.scheme()) {
        return Err(SentinelError::MalformedRequest(format!(
            "unsupported clone URL scheme: {}",
            url.scheme()
        )));
    }
    if branch.is_empty() || branch.starts_with('-') {
        return Err(SentinelError::MalformedRequest(format!(
            "invalid branch name: {branch:?}"
        )));
    }
    Ok(())
}

/// npm audit exits non-zero when it finds anything; the JSON report is
/// consulted as well in case the exit code is swallowed.
fn audit_reports_vulnerabilities(output: &ToolOutput) -> bool {
    if !output.success() {
        return true;
    }
    match serde_json::from_str::<serde_json::Value>(&output.stdout) {
        Ok(report) => vulnerability_count(&report) > 0,
        Err(_) => false,
    }
}

fn vulnerability_count(report: &serde_json::Value) -> u64 {
    if let Some(counts) = report
        .pointer("/metadata/vulnerabilities")
        .and_then(|v| v.as_object())
    {
        return match counts.get("total").and_then(|t| t.as_u64()) {
            Some(total) => total,
            None => counts.values().filter_map(|v| v.as_u64()).sum(),
        };
    }
    report
        .get("vulnerabilities")
        .and_then(|v| v.as_object())
        .map(|v| v.len() as u64)
        .unwrap_or(0)
}

fn error_fragment(err: &SentinelError) -> String {
    match err {
        SentinelError::Timeout { .. } => {
            tracing::warn!(error = %err, "check step timed out");
            TIMEOUT_FRAGMENT.to_string()
        }
        SentinelError::ToolFailure { .. } | SentinelError::MalformedRequest(_) => {
            tracing::error!(error = %err, "check command failed");
            format!("❌ **Error running checks:** {err}")
        }
        _ => {
            tracing::error!(error = %err, "unexpected error while running checks");
            format!("❌ **Unexpected error:** {err}")
        }
    }
}
