use super::Dispatcher;
use crate::ai;
use crate::error::SentinelError;
use crate::events::IssueEvent;
use crate::github::types::SubjectRef;
use crate::spam;

pub(super) async fn handle(d: &Dispatcher, event: &IssueEvent) {
    let repo = event.repository.full_name.as_str();
    let subject = SubjectRef::Issue(event.issue.number);

    if let Err(e) = process(d, repo, &subject).await {
        tracing::error!(repo, %subject, error = %e, "failed to process issue");
        d.report_failure(repo, &subject, &format!("❌ **Error processing issue:** {e}"))
            .await;
    }
}

async fn process(d: &Dispatcher, repo: &str, subject: &SubjectRef) -> Result<(), SentinelError> {
    let current = d.host.get_subject(repo, subject).await?;

    let verdict = spam::evaluate(&current.title, &current.body);
    if verdict.is_spam() {
        tracing::info!(repo, %subject, ?verdict, "closing issue as spam");
        return d
            .close_as_spam(repo, subject, &d.settings.templates.auto_close_issue)
            .await;
    }

    let reply = ai::reply_to(d.ai.as_ref(), &d.settings.prompts.reply, &current.content()).await;
    d.host.post_comment(repo, subject, &reply).await?;
    d.host
        .add_labels(repo, subject, &[d.settings.labels.issue.clone()])
        .await?;

    tracing::info!(repo, %subject, "issue processed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::SentinelError;
    use crate::events::{EventKind, EventPayload};
    use crate::github::types::{SubjectRef, SubjectState};
    use crate::handlers::test_support::harness;
    use crate::testing::fixtures;
    use crate::testing::mock_ai::MockTextGenerator;
    use crate::testing::mock_host::MockRepoHost;

    const ISSUE: SubjectRef = SubjectRef::Issue(fixtures::ISSUE_NUMBER);

    fn issue_opened() -> EventPayload {
        let raw = fixtures::issue_payload("opened", "Crash on startup", "Panics when config is missing");
        EventPayload::parse(EventKind::Issue, raw.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_reply_and_triage_label() {
        let host = MockRepoHost::new()
            .with_subject("Crash on startup", "Panics when config is missing");
        let h = harness(host, MockTextGenerator::new("Try creating the config file first."));
        h.dispatcher.dispatch(issue_opened()).await;

        assert_eq!(
            h.host.comments(),
            vec![(
                ISSUE,
                "🤖 **Gemini AI Reply:**\nTry creating the config file first.".to_string()
            )]
        );
        assert_eq!(h.host.labels(), vec![(ISSUE, vec!["triage".to_string()])]);
        assert_eq!(
            h.ai.prompts(),
            vec![
                "Reply to the following GitHub Issue/Discussion:\n\
                 Crash on startup\n\nPanics when config is missing"
                    .to_string()
            ]
        );
        assert!(h.tools.calls().is_empty());
    }

    #[tokio::test]
    async fn test_spam_closes_before_any_reply() {
        let host = MockRepoHost::new().with_subject("hello world", "");
        let h = harness(host, MockTextGenerator::new("unused"));
        h.dispatcher.dispatch(issue_opened()).await;

        let comments = h.host.comments();
        assert_eq!(comments.len(), 1);
        assert!(comments[0].1.starts_with("🤖 **Auto-closing:** This issue appears to be spam"));
        assert_eq!(h.host.states(), vec![(ISSUE, SubjectState::Closed)]);
        assert!(h.host.labels().is_empty());
        assert_eq!(h.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ai_outage_still_posts_and_labels() {
        let host = MockRepoHost::new()
            .with_subject("Crash on startup", "Panics when config is missing");
        let ai = MockTextGenerator::failing(SentinelError::CollaboratorUnavailable(
            "connect timeout".into(),
        ));
        let h = harness(host, ai);
        h.dispatcher.dispatch(issue_opened()).await;

        let comments = h.host.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(
            comments[0].1,
            "🤖 **Gemini AI Reply:** Unable to connect to AI service. Please try again later."
        );
        assert_eq!(h.host.labels().len(), 1);
    }

    #[tokio::test]
    async fn test_label_failure_reports_error() {
        let host = MockRepoHost::new()
            .with_subject("Crash on startup", "Panics when config is missing")
            .failing("add_labels");
        let h = harness(host, MockTextGenerator::new("Reply."));
        h.dispatcher.dispatch(issue_opened()).await;

        let comments = h.host.comments();
        assert_eq!(comments.len(), 2);
        assert!(comments[1].1.starts_with("❌ **Error processing issue:** "));
    }
}
