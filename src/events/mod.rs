pub mod payload;

pub use payload::{
    DiscussionEvent, EventPayload, IssueEvent, PullRequestEvent, SecurityAlertEvent,
};

/// Alert-family webhook events. All share one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    CodeScanning,
    SecretScanning,
    Dependabot,
}

impl AlertKind {
    pub fn event_name(&self) -> &'static str {
        match self {
            AlertKind::CodeScanning => "code_scanning_alert",
            AlertKind::SecretScanning => "secret_scanning_alert",
            AlertKind::Dependabot => "dependabot_alert",
        }
    }
}

/// The handling routine a webhook delivery is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PullRequest,
    Issue,
    Discussion,
    SecurityAlert(AlertKind),
}

impl EventKind {
    /// Map an `X-GitHub-Event` name to a handler. `None` means "not ours".
    pub fn classify(event_name: &str) -> Option<Self> {
        match event_name {
            "pull_request" => Some(EventKind::PullRequest),
            "issues" => Some(EventKind::Issue),
            "discussion" => Some(EventKind::Discussion),
            "code_scanning_alert" => Some(EventKind::SecurityAlert(AlertKind::CodeScanning)),
            "secret_scanning_alert" => Some(EventKind::SecurityAlert(AlertKind::SecretScanning)),
            "dependabot_alert" => Some(EventKind::SecurityAlert(AlertKind::Dependabot)),
            _ => None,
        }
    }

    /// Whether a delivery with `action` should be handled at all.
    pub fn accepts_action(&self, action: &str) -> bool {
        match self {
            EventKind::PullRequest => matches!(action, "opened" | "synchronize"),
            EventKind::Issue => action == "opened",
            EventKind::Discussion => action == "created",
            EventKind::SecurityAlert(_) => true,
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            EventKind::PullRequest => "pull_request",
            EventKind::Issue => "issues",
            EventKind::Discussion => "discussion",
            EventKind::SecurityAlert(alert) => alert.event_name(),
        }
    }
}
