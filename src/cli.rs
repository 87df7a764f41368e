use std::collections::HashMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::ai::GeminiClient;
use crate::checks::{CheckRunner, SystemToolRunner};
use crate::config::load_settings;
use crate::error::SentinelError;
use crate::github::GithubClient;
use crate::handlers::Dispatcher;

/// PR Sentinel: GitHub webhook assistant for pull requests, issues,
/// discussions and security alerts.
#[derive(Parser, Debug)]
#[command(name = "pr-sentinel", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Extra arguments passed as config overrides (--section.key=value).
    /// Place after `--` separator: `pr-sentinel serve -- --checks.lint_timeout=60`
    #[arg(last = true, allow_hyphen_values = true, global = true)]
    pub rest: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the webhook server.
    Serve,
    /// Check if the server is healthy (for Docker HEALTHCHECK).
    Health,
    /// Print the effective non-secret configuration.
    #[command(alias = "settings")]
    Config,
    /// Run the quality checks for one branch locally and print the results.
    Check {
        /// Repository clone URL.
        #[arg(long)]
        clone_url: String,
        /// Branch to check out.
        #[arg(long)]
        branch: String,
    },
}

/// Config keys that carry credentials or redirect outbound traffic.
pub const FORBIDDEN_OVERRIDE_KEYS: &[&str] = &[
    "token",
    "webhook_secret",
    "key",
    "base_url",
    "api_url",
];

/// Return `Some(matched_forbidden_key)` if `key` may not be overridden.
pub fn check_forbidden_key(key: &str) -> Option<&'static str> {
    let key_lower = key.to_lowercase();
    let segments: Vec<&str> = key_lower.split('.').collect();
    FORBIDDEN_OVERRIDE_KEYS
        .iter()
        .find(|&&forbidden| key_lower == forbidden || segments.contains(&forbidden))
        .copied()
}

/// Parse the `rest` args into a map of config overrides.
/// Format: `--section.key=value` or `--section__key=value`.
fn parse_config_overrides(rest: &[String]) -> Result<HashMap<String, String>, SentinelError> {
    let mut overrides = HashMap::new();

    for arg in rest {
        let stripped = arg.trim_start_matches('-');
        if stripped.is_empty() {
            continue;
        }

        let stripped = stripped.replace("__", ".");

        if let Some((key, value)) = stripped.split_once('=') {
            if let Some(forbidden) = check_forbidden_key(key) {
                return Err(SentinelError::Other(format!(
                    "forbidden CLI override: '{key}' (matches '{forbidden}')"
                )));
            }
            overrides.insert(key.to_string(), value.to_string());
        }
    }

    Ok(overrides)
}

pub async fn run() -> Result<(), SentinelError> {
    let cli = Cli::parse();

    // Runs before settings are loaded so it stays fast in a container probe.
    if cli.command == Command::Health {
        return health_check().await;
    }

    let config_overrides = parse_config_overrides(&cli.rest)?;
    let settings = load_settings(&config_overrides)?;

    tracing::debug!(
        command = ?cli.command,
        overrides = config_overrides.len(),
        "starting pr-sentinel"
    );

    match cli.command {
        Command::Serve => {
            settings.validate()?;
            let settings = Arc::new(settings);
            let host = Arc::new(GithubClient::new(&settings.github)?);
            let ai = Arc::new(GeminiClient::new(&settings.gemini)?);
            let checks = Arc::new(CheckRunner::new(
                Arc::new(SystemToolRunner),
                settings.checks.clone(),
            ));
            let dispatcher = Arc::new(Dispatcher::new(host, ai, checks, settings.clone()));
            crate::server::start_server(&settings, dispatcher).await?;
        }
        Command::Config => {
            println!("Listen address: {}:{}", settings.server.host, settings.server.port);
            println!("GitHub API: {}", settings.github.base_url);
            println!("AI endpoint: {}", settings.gemini.api_url);
            println!(
                "Timeouts (s): clone {}, install {}, lint {}, audit {}",
                settings.checks.clone_timeout,
                settings.checks.install_timeout,
                settings.checks.lint_timeout,
                settings.checks.audit_timeout
            );
            println!("Concurrent check runs: {}", settings.checks.max_concurrent_runs);
            println!(
                "Labels: pr={}, issue={}, security={}",
                settings.labels.pull_request, settings.labels.issue, settings.labels.security
            );
            println!(
                "Secrets configured: github token {}, webhook secret {}, AI key {}",
                yes_no(!settings.github.token.is_empty()),
                yes_no(!settings.github.webhook_secret.is_empty()),
                yes_no(!settings.gemini.key.is_empty())
            );
        }
        Command::Check { clone_url, branch } => {
            let runner = CheckRunner::new(Arc::new(SystemToolRunner), settings.checks.clone());
            for fragment in runner.run(&clone_url, &branch).await {
                println!("{fragment}\n");
            }
        }
        // Answered before settings were loaded.
        Command::Health => {}
    }

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Lightweight health check: GET http://127.0.0.1:$PORT/health with a 5s timeout.
///
/// Used by Docker HEALTHCHECK in distroless images where curl is unavailable.
async fn health_check() -> Result<(), SentinelError> {
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let url = format!("http://127.0.0.1:{port}/health");
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .map_err(|e| SentinelError::Other(format!("health check failed: {e}")))?;
    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| SentinelError::Other(format!("health check failed: {e}")))?;
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(SentinelError::Other(format!(
            "health check failed: status {}",
            resp.status()
        )))
    }
}
