//! Per-event orchestration: spam gate, checks, AI text and the GitHub
//! side effects for each supported webhook event.

mod alert;
mod discussion;
mod issue;
mod pull_request;

use std::sync::Arc;

use crate::ai::TextGenerator;
use crate::checks::CheckRunner;
use crate::config::types::Settings;
use crate::error::SentinelError;
use crate::events::EventPayload;
use crate::github::RepoHost;
use crate::github::types::{SubjectRef, SubjectState};

/// Routes a parsed event to its handler.
///
/// Holds every collaborator the handlers need; built once at startup and
/// shared by all webhook deliveries.
pub struct Dispatcher {
    host: Arc<dyn RepoHost>,
    ai: Arc<dyn TextGenerator>,
    checks: Arc<CheckRunner>,
    settings: Arc<Settings>,
}

impl Dispatcher {
    pub fn new(
        host: Arc<dyn RepoHost>,
        ai: Arc<dyn TextGenerator>,
        checks: Arc<CheckRunner>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            host,
            ai,
            checks,
            settings,
        }
    }

    /// Handle one event. Handlers are best-effort: failures are reported on
    /// GitHub where possible and logged, never returned.
    pub async fn dispatch(&self, payload: EventPayload) {
        let kind = payload.kind();
        let action = payload.action();
        if !kind.accepts_action(action) {
            tracing::debug!(
                event = kind.event_name(),
                action,
                "ignoring action"
            );
            return;
        }

        tracing::info!(
            event = kind.event_name(),
            action,
            repo = payload.repository(),
            number = ?payload.number(),
            "dispatching event"
        );

        match &payload {
            EventPayload::PullRequest(event) => pull_request::handle(self, event).await,
            EventPayload::Issue(event) => issue::handle(self, event).await,
            EventPayload::Discussion(event) => discussion::handle(self, event).await,
            EventPayload::SecurityAlert(event) => alert::handle(self, event).await,
        }
    }

    /// Post the auto-close notice and close the subject.
    async fn close_as_spam(
        &self,
        repo: &str,
        subject: &SubjectRef,
        notice: &str,
    ) -> Result<(), SentinelError> {
        self.host.post_comment(repo, subject, notice).await?;
        self.host
            .set_state(repo, subject, SubjectState::Closed)
            .await
    }

    /// Last-resort error comment; its own failure is only logged.
    async fn report_failure(&self, repo: &str, subject: &SubjectRef, text: &str) {
        if let Err(e) = self.host.post_comment(repo, subject, text).await {
            tracing::error!(repo, %subject, error = %e, "failed to post error comment");
        }
    }
}
