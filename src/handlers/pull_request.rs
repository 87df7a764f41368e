use super::Dispatcher;
use crate::ai;
use crate::error::SentinelError;
use crate::events::PullRequestEvent;
use crate::github::types::SubjectRef;
use crate::spam;

pub(super) async fn handle(d: &Dispatcher, event: &PullRequestEvent) {
    let repo = event.repository.full_name.as_str();
    let subject = SubjectRef::PullRequest(event.pull_request.number);

    if let Err(e) = process(d, event, repo, &subject).await {
        tracing::error!(repo, %subject, error = %e, "failed to process pull request");
        d.report_failure(repo, &subject, &format!("❌ **Error processing PR:** {e}"))
            .await;
    }
}

async fn process(
    d: &Dispatcher,
    event: &PullRequestEvent,
    repo: &str,
    subject: &SubjectRef,
) -> Result<(), SentinelError> {
    // The payload can be stale on synchronize; judge the live title/body.
    let current = d.host.get_subject(repo, subject).await?;
    let verdict = spam::evaluate(&current.title, &current.body);
    if verdict.is_spam() {
        tracing::info!(repo, %subject, ?verdict, "closing pull request as spam");
        return d
            .close_as_spam(repo, subject, &d.settings.templates.auto_close_pr)
            .await;
    }

    let branch = &event.pull_request.head.branch;
    let mut sections = match event.clone_url() {
        Some(clone_url) => {
            tracing::info!(repo, %subject, branch, "running checks");
            d.checks.run(clone_url, branch).await
        }
        None => {
            tracing::warn!(repo, %subject, "head repository is gone, skipping checks");
            vec!["❌ **Error running checks:** head repository is no longer available".to_string()]
        }
    };

    let review = match d.host.get_diff(&event.pull_request.diff_url).await {
        Ok(diff) => ai::review_diff(d.ai.as_ref(), &d.settings.prompts.pr_review, &diff).await,
        Err(e) => {
            tracing::error!(repo, %subject, error = %e, "failed to fetch diff");
            ai::review_unavailable()
        }
    };
    sections.push(review);

    d.host
        .post_comment(repo, subject, &sections.join("\n\n"))
        .await?;
    d.host
        .add_labels(repo, subject, &[d.settings.labels.pull_request.clone()])
        .await?;

    tracing::info!(repo, %subject, "pull request processed");
    Ok(())
}
