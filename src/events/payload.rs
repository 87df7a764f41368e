use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{AlertKind, EventKind};
use crate::error::SentinelError;

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub full_name: String,
}

// ── pull_request ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    action: Option<String>,
    pub pull_request: PullRequest,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub diff_url: String,
    pub head: PullRequestHead,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestHead {
    #[serde(rename = "ref")]
    pub branch: String,
    /// `None` when the fork the PR came from has been deleted.
    #[serde(default)]
    pub repo: Option<HeadRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadRepository {
    pub clone_url: String,
}

impl PullRequestEvent {
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or("opened")
    }

    pub fn clone_url(&self) -> Option<&str> {
        self.pull_request
            .head
            .repo
            .as_ref()
            .map(|r| r.clone_url.as_str())
    }
}

// ── issues ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct IssueEvent {
    #[serde(default)]
    action: Option<String>,
    pub issue: Issue,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl IssueEvent {
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or("opened")
    }
}

// ── discussion ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionEvent {
    #[serde(default)]
    action: Option<String>,
    pub discussion: Discussion,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Discussion {
    pub number: u64,
    /// GraphQL node id, needed to comment on the discussion.
    pub node_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl DiscussionEvent {
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or("created")
    }
}

// ── *_alert ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityAlertEvent {
    #[serde(skip, default = "default_alert_kind")]
    pub kind: AlertKind,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    pub alert: Option<Alert>,
    pub repository: Repository,
}

fn default_alert_kind() -> AlertKind {
    AlertKind::CodeScanning
}

/// The subset of alert fields that is safe to copy into a public issue.
///
/// Secret values, locations and advisory text are never read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub security_advisory: Option<SeverityHolder>,
    #[serde(default)]
    pub rule: Option<AlertRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeverityHolder {
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertRule {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub security_severity_level: Option<String>,
}

impl SecurityAlertEvent {
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or("")
    }

    /// Severity as reported by whichever alert family sent the event.
    pub fn severity(&self) -> Option<&str> {
        let alert = self.alert.as_ref()?;
        alert
            .severity
            .as_deref()
            .or_else(|| {
                alert
                    .security_advisory
                    .as_ref()
                    .and_then(|a| a.severity.as_deref())
            })
            .or_else(|| {
                alert.rule.as_ref().and_then(|r| {
                    r.security_severity_level
                        .as_deref()
                        .or(r.severity.as_deref())
                })
            })
    }

    pub fn state(&self) -> Option<&str> {
        self.alert.as_ref().and_then(|a| a.state.as_deref())
    }

    /// Alert creation time, normalised to UTC when it parses as RFC 3339.
    pub fn timestamp(&self) -> Option<String> {
        let raw = self.alert.as_ref()?.created_at.as_deref()?;
        Some(match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => ts
                .with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            Err(_) => raw.to_string(),
        })
    }
}

// ── Tagged union ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum EventPayload {
    PullRequest(PullRequestEvent),
    Issue(IssueEvent),
    Discussion(DiscussionEvent),
    SecurityAlert(SecurityAlertEvent),
}

impl EventPayload {
    /// Parse a webhook body for an already classified event.
    pub fn parse(kind: EventKind, body: &[u8]) -> Result<Self, SentinelError> {
        fn decode<'a, T: Deserialize<'a>>(kind: EventKind, body: &'a [u8]) -> Result<T, SentinelError> {
            serde_json::from_slice(body).map_err(|e| {
                SentinelError::MalformedRequest(format!(
                    "invalid {} payload: {e}",
                    kind.event_name()
                ))
            })
        }

        Ok(match kind {
            EventKind::PullRequest => EventPayload::PullRequest(decode(kind, body)?),
            EventKind::Issue => EventPayload::Issue(decode(kind, body)?),
            EventKind::Discussion => EventPayload::Discussion(decode(kind, body)?),
            EventKind::SecurityAlert(alert_kind) => {
                let mut event: SecurityAlertEvent = decode(kind, body)?;
                event.kind = alert_kind;
                EventPayload::SecurityAlert(event)
            }
        })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::PullRequest(_) => EventKind::PullRequest,
            EventPayload::Issue(_) => EventKind::Issue,
            EventPayload::Discussion(_) => EventKind::Discussion,
            EventPayload::SecurityAlert(e) => EventKind::SecurityAlert(e.kind),
        }
    }

    pub fn action(&self) -> &str {
        match self {
            EventPayload::PullRequest(e) => e.action(),
            EventPayload::Issue(e) => e.action(),
            EventPayload::Discussion(e) => e.action(),
            EventPayload::SecurityAlert(e) => e.action(),
        }
    }

    pub fn repository(&self) -> &str {
        match self {
            EventPayload::PullRequest(e) => &e.repository.full_name,
            EventPayload::Issue(e) => &e.repository.full_name,
            EventPayload::Discussion(e) => &e.repository.full_name,
            EventPayload::SecurityAlert(e) => &e.repository.full_name,
        }
    }

    /// Subject number, when the event is about a numbered subject.
    pub fn number(&self) -> Option<u64> {
        match self {
            EventPayload::PullRequest(e) => Some(e.pull_request.number),
            EventPayload::Issue(e) => Some(e.issue.number),
            EventPayload::Discussion(e) => Some(e.discussion.number),
            EventPayload::SecurityAlert(_) => None,
        }
    }
}
