use std::fmt;

/// What a collaborator call is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectRef {
    Issue(u64),
    PullRequest(u64),
    Discussion { number: u64, node_id: String },
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectRef::Issue(n) => write!(f, "issue #{n}"),
            SubjectRef::PullRequest(n) => write!(f, "PR #{n}"),
            SubjectRef::Discussion { number, .. } => write!(f, "discussion #{number}"),
        }
    }
}

/// Title and body of an issue, pull request or discussion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub title: String,
    pub body: String,
}

impl Subject {
    /// Text handed to the AI collaborator: title, plus body when present.
    pub fn content(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n\n{}", self.title, self.body)
        }
    }
}

/// Target state for `RepoHost::set_state`. Only closing is ever requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectState {
    Closed,
}

impl SubjectState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectState::Closed => "closed",
        }
    }
}
