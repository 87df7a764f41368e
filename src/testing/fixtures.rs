use serde_json::json;

pub const REPO: &str = "octo/widgets";
pub const PR_NUMBER: u64 = 42;
pub const ISSUE_NUMBER: u64 = 7;
pub const DISCUSSION_NUMBER: u64 = 3;
pub const DISCUSSION_NODE_ID: &str = "D_kwDOAbc123";
pub const HEAD_BRANCH: &str = "feature/retry";
pub const HEAD_CLONE_URL: &str = "https://github.com/contrib/widgets.git";
pub const DIFF_URL: &str = "https://github.com/octo/widgets/pull/42.diff";

fn repository() -> serde_json::Value {
    json!({"full_name": REPO, "name": "widgets", "private": false})
}

pub fn pull_request_payload(action: &str, title: &str, body: &str) -> String {
    json!({
        "action": action,
        "number": PR_NUMBER,
        "pull_request": {
            "number": PR_NUMBER,
            "title": title,
            "body": body,
            "state": "open",
            "diff_url": DIFF_URL,
            "head": {
                "ref": HEAD_BRANCH,
                "sha": "9f2c1d0e",
                "repo": {"full_name": "contrib/widgets", "clone_url": HEAD_CLONE_URL}
            },
            "base": {"ref": "main"}
        },
        "repository": repository(),
        "sender": {"login": "contrib"}
    })
    .to_string()
}

pub fn issue_payload(action: &str, title: &str, body: &str) -> String {
    json!({
        "action": action,
        "issue": {"number": ISSUE_NUMBER, "title": title, "body": body, "state": "open"},
        "repository": repository(),
        "sender": {"login": "reporter"}
    })
    .to_string()
}

pub fn discussion_payload(action: &str, title: &str, body: &str) -> String {
    json!({
        "action": action,
        "discussion": {
            "number": DISCUSSION_NUMBER,
            "node_id": DISCUSSION_NODE_ID,
            "title": title,
            "body": body
        },
        "repository": repository()
    })
    .to_string()
}

pub fn dependabot_alert_payload() -> String {
    json!({
        "action": "created",
        "alert": {
            "number": 5,
            "state": "open",
            "created_at": "2024-05-01T12:30:00Z",
            "dependency": {"package": {"ecosystem": "npm", "name": "lodash"}},
            "security_advisory": {"ghsa_id": "GHSA-xxxx-yyyy-zzzz", "severity": "high"}
        },
        "repository": repository()
    })
    .to_string()
}

/// Carries a leaked token that must never be copied anywhere.
pub fn secret_scanning_alert_payload() -> String {
    json!({
        "action": "created",
        "alert": {
            "number": 2,
            "state": "open",
            "created_at": "2024-06-10T08:00:00+02:00",
            "secret_type": "github_personal_access_token",
            "secret": "ghp_LEAKEDTOKENVALUE1234567890",
            "locations_url": "https://api.github.com/repos/octo/widgets/secret-scanning/alerts/2/locations"
        },
        "repository": repository()
    })
    .to_string()
}
