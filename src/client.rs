// Publishing client contract
// The client owns configuration loading, result accumulation and the upload itself.

use crate::error::PublishError;
use anyhow::{Result, bail};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Client that stores test results in ROX Center
pub trait PublishClient: Send + Sync + 'static {
    /// Validated client configuration
    type Config: Send + Sync + 'static;

    /// Accumulator for one test run
    type Session: TestRunSession + Send + 'static;

    /// Load and validate the client configuration
    fn load_config(&self, path: Option<&Path>) -> Result<Self::Config>;

    /// Begin a new test run
    fn start_test_run(&self, config: &Self::Config) -> Result<Self::Session>;

    /// Upload an ended test run. The returned future must always settle.
    fn process(
        &self,
        session: Self::Session,
        config: &Self::Config,
    ) -> BoxFuture<'static, Result<PublishInfo, PublishError>>;
}

/// Results accumulated for one test run
pub trait TestRunSession {
    fn add(
        &mut self,
        key: Option<&str>,
        name: &str,
        passed: bool,
        duration_ms: u64,
        options: ResultOptions,
    ) -> Result<()>;

    /// No more results will be added
    fn end(&mut self);

    fn results(&self) -> &[RecordedResult];
}

/// Optional details attached to a result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResultOptions {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedResult {
    pub key: Option<String>,
    pub name: String,
    pub passed: bool,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordedResult {
    /// Only keyed results can be matched to a ROX Center test
    pub fn has_key(&self) -> bool {
        self.key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

/// Outcome reported by a settled publish operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishInfo {
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

impl PublishInfo {
    pub fn published() -> Self {
        Self {
            errors: Vec::new(),
            published: true,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// In-memory test run
#[derive(Debug, Clone, Default)]
pub struct TestRun {
    results: Vec<RecordedResult>,
    ended: bool,
}

impl TestRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn keyed_count(&self) -> usize {
        self.results.iter().filter(|result| result.has_key()).count()
    }
}

impl TestRunSession for TestRun {
    fn add(
        &mut self,
        key: Option<&str>,
        name: &str,
        passed: bool,
        duration_ms: u64,
        options: ResultOptions,
    ) -> Result<()> {
        if self.ended {
            bail!("test run already ended, cannot add `{}`", name);
        }

        self.results.push(RecordedResult {
            key: key.map(str::to_string),
            name: name.to_string(),
            passed,
            duration_ms,
            message: options.message,
        });
        Ok(())
    }

    fn end(&mut self) {
        self.ended = true;
    }

    fn results(&self) -> &[RecordedResult] {
        &self.results
    }
}
