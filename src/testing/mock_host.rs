use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::SentinelError;
use crate::github::RepoHost;
use crate::github::types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    pub repo: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Successful calls made to the mock host, for test assertions.
#[derive(Debug, Default)]
pub struct HostCalls {
    /// Every attempted operation in order, including failed ones.
    pub attempts: Vec<&'static str>,
    pub comments: Vec<(SubjectRef, String)>,
    pub labels: Vec<(SubjectRef, Vec<String>)>,
    pub states: Vec<(SubjectRef, SubjectState)>,
    pub issues: Vec<CreatedIssue>,
    pub diffs: Vec<String>,
}

/// Failure budget for one operation.
#[derive(Debug, Clone, Copy)]
enum Failure {
    Always,
    Times(usize),
}

/// Recording GitHub stand-in with a configurable subject, diff and failures.
pub struct MockRepoHost {
    pub subject: Subject,
    pub diff: String,
    failures: Mutex<HashMap<&'static str, Failure>>,
    pub calls: Mutex<HostCalls>,
}

impl MockRepoHost {
    pub fn new() -> Self {
        Self {
            subject: Subject {
                title: "Add retry support to the HTTP client".into(),
                body: "Retries idempotent requests with exponential backoff.".into(),
            },
            diff: "diff --git a/src/http.js b/src/http.js\n+const retries = 3;\n".into(),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HostCalls::default()),
        }
    }

    pub fn with_subject(mut self, title: &str, body: &str) -> Self {
        self.subject = Subject {
            title: title.into(),
            body: body.into(),
        };
        self
    }

    pub fn with_diff(mut self, diff: &str) -> Self {
        self.diff = diff.into();
        self
    }

    /// Make every call to `op` fail.
    pub fn failing(self, op: &'static str) -> Self {
        self.failures.lock().unwrap().insert(op, Failure::Always);
        self
    }

    /// Make the first `n` calls to `op` fail.
    pub fn failing_times(self, op: &'static str, n: usize) -> Self {
        self.failures.lock().unwrap().insert(op, Failure::Times(n));
        self
    }

    pub fn attempts(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().attempts.clone()
    }

    pub fn comments(&self) -> Vec<(SubjectRef, String)> {
        self.calls.lock().unwrap().comments.clone()
    }

    pub fn labels(&self) -> Vec<(SubjectRef, Vec<String>)> {
        self.calls.lock().unwrap().labels.clone()
    }

    pub fn states(&self) -> Vec<(SubjectRef, SubjectState)> {
        self.calls.lock().unwrap().states.clone()
    }

    pub fn issues(&self) -> Vec<CreatedIssue> {
        self.calls.lock().unwrap().issues.clone()
    }

    /// Record the attempt, then fail it if a failure is configured.
    fn enter(&self, op: &'static str) -> Result<(), SentinelError> {
        self.calls.lock().unwrap().attempts.push(op);
        let mut failures = self.failures.lock().unwrap();
        let fail = match failures.get_mut(op) {
            Some(Failure::Always) => true,
            Some(Failure::Times(n)) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        };
        if fail {
            Err(SentinelError::CollaboratorUnavailable(format!(
                "GitHub API returned 502 Bad Gateway for {op}"
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RepoHost for MockRepoHost {
    async fn get_subject(&self, _repo: &str, _subject: &SubjectRef) -> Result<Subject, SentinelError> {
        self.enter("get_subject")?;
        Ok(self.subject.clone())
    }

    async fn post_comment(
        &self,
        _repo: &str,
        subject: &SubjectRef,
        text: &str,
    ) -> Result<(), SentinelError> {
        self.enter("post_comment")?;
        self.calls
            .lock()
            .unwrap()
            .comments
            .push((subject.clone(), text.to_string()));
        Ok(())
    }

    async fn add_labels(
        &self,
        _repo: &str,
        subject: &SubjectRef,
        labels: &[String],
    ) -> Result<(), SentinelError> {
        self.enter("add_labels")?;
        self.calls
            .lock()
            .unwrap()
            .labels
            .push((subject.clone(), labels.to_vec()));
        Ok(())
    }

    async fn set_state(
        &self,
        _repo: &str,
        subject: &SubjectRef,
        state: SubjectState,
    ) -> Result<(), SentinelError> {
        self.enter("set_state")?;
        self.calls
            .lock()
            .unwrap()
            .states
            .push((subject.clone(), state));
        Ok(())
    }

    async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<u64, SentinelError> {
        self.enter("create_issue")?;
        let mut calls = self.calls.lock().unwrap();
        calls.issues.push(CreatedIssue {
            repo: repo.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            labels: labels.to_vec(),
        });
        Ok(100 + calls.issues.len() as u64)
    }

    async fn get_diff(&self, diff_url: &str) -> Result<String, SentinelError> {
        self.enter("get_diff")?;
        self.calls.lock().unwrap().diffs.push(diff_url.to_string());
        Ok(self.diff.clone())
    }
}
