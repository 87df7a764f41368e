use super::Dispatcher;
use crate::ai;
use crate::error::SentinelError;
use crate::events::DiscussionEvent;
use crate::github::types::SubjectRef;
use crate::spam;

/// Discussions are never closed automatically; spam is left to maintainers.
/// Failures are logged only, since there is no reliable place to report them.
pub(super) async fn handle(d: &Dispatcher, event: &DiscussionEvent) {
    let repo = event.repository.full_name.as_str();
    let subject = SubjectRef::Discussion {
        number: event.discussion.number,
        node_id: event.discussion.node_id.clone(),
    };

    if let Err(e) = process(d, event, repo, &subject).await {
        tracing::error!(repo, %subject, error = %e, "failed to process discussion");
    }
}

async fn process(
    d: &Dispatcher,
    event: &DiscussionEvent,
    repo: &str,
    subject: &SubjectRef,
) -> Result<(), SentinelError> {
    let title = event.discussion.title.as_str();
    let body = event.discussion.body.as_deref().unwrap_or("");

    let verdict = spam::evaluate(title, body);
    if verdict.is_spam() {
        tracing::info!(repo, %subject, ?verdict, "discussion looks like spam, leaving it to maintainers");
        return Ok(());
    }

    let content = if body.is_empty() {
        title.to_string()
    } else {
        format!("{title}\n\n{body}")
    };
    let reply = ai::reply_to(d.ai.as_ref(), &d.settings.prompts.reply, &content).await;
    d.host.post_comment(repo, subject, &reply).await?;

    tracing::info!(repo, %subject, "discussion processed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::events::{EventKind, EventPayload};
    use crate::github::types::SubjectRef;
    use crate::handlers::test_support::harness;
    use crate::testing::fixtures;
    use crate::testing::mock_ai::MockTextGenerator;
    use crate::testing::mock_host::MockRepoHost;

    fn discussion(title: &str, body: &str) -> EventPayload {
        let raw = fixtures::discussion_payload("created", title, body);
        EventPayload::parse(EventKind::Discussion, raw.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_reply_posted_to_discussion() {
        let h = harness(MockRepoHost::new(), MockTextGenerator::new("It ships next month."));
        h.dispatcher
            .dispatch(discussion("Roadmap for version two", "When will the plugin API land?"))
            .await;

        let comments = h.host.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(
            comments[0].0,
            SubjectRef::Discussion {
                number: fixtures::DISCUSSION_NUMBER,
                node_id: fixtures::DISCUSSION_NODE_ID.to_string(),
            }
        );
        assert_eq!(comments[0].1, "🤖 **Gemini AI Reply:**\nIt ships next month.");
        assert!(h.host.labels().is_empty());
        assert!(h.host.states().is_empty());
    }

    #[tokio::test]
    async fn test_spam_is_left_alone() {
        let h = harness(MockRepoHost::new(), MockTextGenerator::new("unused"));
        h.dispatcher.dispatch(discussion("qwerty", "")).await;

        assert!(h.host.attempts().is_empty());
        assert_eq!(h.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_comment_failure_is_only_logged() {
        let host = MockRepoHost::new().failing("post_comment");
        let h = harness(host, MockTextGenerator::new("Reply."));
        h.dispatcher
            .dispatch(discussion("Roadmap for version two", "When will the plugin API land?"))
            .await;

        assert_eq!(h.host.attempts(), vec!["post_comment"]);
    }
}
