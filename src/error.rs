// Error types for the reporter and publish operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the host test runner
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("invalid reporter options: {0}")]
    InvalidOptions(String),

    #[error("failed to load ROX configuration: {0:#}")]
    Config(#[source] anyhow::Error),

    #[error("failed to start test run: {0:#}")]
    StartRun(#[source] anyhow::Error),

    #[error("failed to record result `{name}`: {source:#}")]
    Record {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no test run in progress")]
    NoActiveRun,

    #[error("publishing requires a Tokio runtime")]
    NoRuntime,

    #[error("failed to read host configuration {}: {message}", path.display())]
    HostConfig { path: PathBuf, message: String },

    #[error("unknown reporter: {0}")]
    UnknownReporter(String),

    #[error("reporter `{reporter}` requires `{dependency}` which the host does not provide")]
    MissingDependency { reporter: String, dependency: String },
}

/// Rejection of a publish operation.
///
/// Never propagated to the host; the reporter logs it as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PublishError {
    pub message: String,
    pub stack: Option<String>,
}

impl PublishError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Message and stack joined the way they are written to the log
    pub fn log_line(&self) -> String {
        match &self.stack {
            Some(stack) => format!("{}\n{}", self.message, stack),
            None => self.message.clone(),
        }
    }
}

impl From<anyhow::Error> for PublishError {
    fn from(err: anyhow::Error) -> Self {
        let stack = err
            .chain()
            .skip(1)
            .map(|cause| format!("    caused by: {}", cause))
            .collect::<Vec<_>>();

        let error = Self::new(err.to_string());
        if stack.is_empty() {
            error
        } else {
            error.with_stack(stack.join("\n"))
        }
    }
}
