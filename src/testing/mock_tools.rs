use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::checks::{ToolInvocation, ToolOutput, ToolRunner};
use crate::error::SentinelError;

/// Canned response for one tool, keyed by its label ("npm install").
pub enum Scripted {
    Output(ToolOutput),
    /// Report a per-step timeout.
    TimedOut,
    /// Never finish.
    Hang,
    /// Block until the gate is notified, then succeed with empty output.
    Gate(Arc<Notify>),
    /// Fail as if the process could not be started.
    Fail(String),
}

impl Scripted {
    pub fn ok(stdout: &str) -> Self {
        Self::exit(0, stdout, "")
    }

    pub fn exit(code: i32, stdout: &str, stderr: &str) -> Self {
        Scripted::Output(ToolOutput {
            status: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Whether `cwd` existed when the tool was invoked.
    pub cwd_existed: bool,
    pub timeout: Duration,
}

impl RecordedInvocation {
    pub fn label(&self) -> String {
        match self.args.first() {
            Some(sub) => format!("{} {sub}", self.program),
            None => self.program.clone(),
        }
    }
}

/// Tool runner that never spawns anything.
///
/// A successful `git clone` drops the configured marker files into the
/// invocation's working directory, standing in for the cloned repository.
/// Unscripted tools succeed with empty output.
pub struct ScriptedToolRunner {
    repo_files: Vec<String>,
    responses: HashMap<String, Scripted>,
    calls: Mutex<Vec<RecordedInvocation>>,
}

impl ScriptedToolRunner {
    pub fn new(repo_files: &[&str]) -> Self {
        Self {
            repo_files: repo_files.iter().map(|f| f.to_string()).collect(),
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, label: &str, response: Scripted) -> Self {
        self.responses.insert(label.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.calls().iter().map(RecordedInvocation::label).collect()
    }
}

#[async_trait]
impl ToolRunner for ScriptedToolRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, SentinelError> {
        let label = invocation.label();
        self.calls.lock().unwrap().push(RecordedInvocation {
            program: invocation.program.clone(),
            args: invocation.args.clone(),
            cwd: invocation.cwd.clone(),
            cwd_existed: invocation.cwd.is_dir(),
            timeout: invocation.timeout,
        });

        let output = match self.responses.get(&label) {
            None => ToolOutput {
                status: Some(0),
                ..ToolOutput::default()
            },
            Some(Scripted::Output(output)) => output.clone(),
            Some(Scripted::TimedOut) => {
                return Err(SentinelError::Timeout {
                    tool: label,
                    secs: invocation.timeout.as_secs(),
                });
            }
            Some(Scripted::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                return Err(SentinelError::Other("hung tool woke up".into()));
            }
            Some(Scripted::Gate(gate)) => {
                gate.notified().await;
                ToolOutput {
                    status: Some(0),
                    ..ToolOutput::default()
                }
            }
            Some(Scripted::Fail(msg)) => return Err(SentinelError::Other(msg.clone())),
        };

        if label == "git clone" && output.success() {
            for file in &self.repo_files {
                std::fs::write(invocation.cwd.join(file), "{}")?;
            }
        }
        Ok(output)
    }
}
