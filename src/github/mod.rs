pub mod client;
pub mod types;

use async_trait::async_trait;
use types::*;

use crate::error::SentinelError;

pub use client::GithubClient;

/// Repository-hosting collaborator.
///
/// The handlers only ever talk to GitHub through this trait, so tests can
/// swap in a recording mock.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Current title and body of an issue or pull request. Discussions are
    /// read from the webhook payload instead.
    async fn get_subject(&self, repo: &str, subject: &SubjectRef) -> Result<Subject, SentinelError>;

    /// Post a top-level comment on the subject.
    async fn post_comment(
        &self,
        repo: &str,
        subject: &SubjectRef,
        text: &str,
    ) -> Result<(), SentinelError>;

    /// Add labels to an issue or pull request.
    async fn add_labels(
        &self,
        repo: &str,
        subject: &SubjectRef,
        labels: &[String],
    ) -> Result<(), SentinelError>;

    /// Open or close an issue or pull request.
    async fn set_state(
        &self,
        repo: &str,
        subject: &SubjectRef,
        state: SubjectState,
    ) -> Result<(), SentinelError>;

    /// Open a new issue, returning its number.
    async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<u64, SentinelError>;

    /// Download a pull request's unified diff.
    async fn get_diff(&self, diff_url: &str) -> Result<String, SentinelError>;
}
