use std::collections::HashMap;

use minijinja::Value;

use super::Dispatcher;
use crate::error::SentinelError;
use crate::events::SecurityAlertEvent;
use crate::template;
use crate::util::title_case;

const UNKNOWN: &str = "Unknown";

/// Open a tracking issue for a security alert.
///
/// Only the alert type, repository, severity, state and timestamp are copied;
/// secret values and locations stay on GitHub.
pub(super) async fn handle(d: &Dispatcher, event: &SecurityAlertEvent) {
    let repo = event.repository.full_name.as_str();
    let event_name = event.kind.event_name();

    if let Err(e) = process(d, event, repo).await {
        tracing::error!(repo, event = event_name, error = %e, "failed to process alert");
        let labels = [
            d.settings.labels.security.clone(),
            d.settings.labels.error.clone(),
        ];
        let body = format!("Error processing {event_name} alert: {e}");
        if let Err(e) = d
            .host
            .create_issue(repo, "Alert Processing Error", &body, &labels)
            .await
        {
            tracing::error!(repo, error = %e, "failed to create error issue for alert");
        }
    }
}

async fn process(
    d: &Dispatcher,
    event: &SecurityAlertEvent,
    repo: &str,
) -> Result<(), SentinelError> {
    let event_name = event.kind.event_name();
    let title = format!("{} detected", title_case(event_name));
    let body = render_body(&d.settings.templates.security_alert, event, repo)?;

    let number = d
        .host
        .create_issue(repo, &title, &body, &[d.settings.labels.security.clone()])
        .await?;

    tracing::info!(repo, event = event_name, issue = number, "created security issue");
    Ok(())
}

fn render_body(
    template_str: &str,
    event: &SecurityAlertEvent,
    repo: &str,
) -> Result<String, SentinelError> {
    let timestamp = event.timestamp().unwrap_or_else(|| UNKNOWN.to_string());

    let mut vars = HashMap::new();
    vars.insert("alert_type", Value::from(event.kind.event_name()));
    vars.insert("repository", Value::from(repo));
    vars.insert("severity", Value::from(event.severity().unwrap_or(UNKNOWN)));
    vars.insert("state", Value::from(event.state().unwrap_or(UNKNOWN)));
    vars.insert("timestamp", Value::from(timestamp));
    template::render("templates.security_alert", template_str, vars)
}
