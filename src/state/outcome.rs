// Spec outcomes as delivered by the host test runner

use serde::{Deserialize, Serialize};

/// Execution context that ran a spec (a browser, a worker, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One finished spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecOutcome {
    pub suite: Vec<String>,
    pub description: String,
    pub success: bool,
    /// Elapsed time in milliseconds
    pub time: u64,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub log: Vec<String>,
}

impl SpecOutcome {
    /// Create a passed outcome
    pub fn pass<S: Into<String>>(
        suite: impl IntoIterator<Item = S>,
        description: impl Into<String>,
        time: u64,
    ) -> Self {
        Self {
            suite: suite.into_iter().map(Into::into).collect(),
            description: description.into(),
            success: true,
            time,
            skipped: false,
            log: Vec::new(),
        }
    }

    /// Create a failed outcome
    pub fn fail<S: Into<String>>(
        suite: impl IntoIterator<Item = S>,
        description: impl Into<String>,
        time: u64,
        log: Vec<String>,
    ) -> Self {
        Self {
            success: false,
            log,
            ..Self::pass(suite, description, time)
        }
    }

    /// Create a skipped outcome
    pub fn skip<S: Into<String>>(
        suite: impl IntoIterator<Item = S>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            skipped: true,
            ..Self::pass(suite, description, 0)
        }
    }

    /// Suite path and description separated by spaces
    pub fn full_name(&self) -> String {
        format!("{} {}", self.suite.join(" "), self.description)
    }

    /// Diagnostic for a failed spec, `None` when it passed
    pub fn failure_message(&self, environment: &Environment) -> Option<String> {
        if self.success {
            return None;
        }
        Some(format!("{}: {}", environment.name, self.log.join("\n")))
    }
}
