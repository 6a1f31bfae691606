// Report module - host lifecycle contract and reporter registration

pub mod registry;
pub mod rox;

use crate::state::{Environment, SpecOutcome};
use anyhow::Result;
use futures::future::BoxFuture;

pub use registry::{Injector, ReporterFactory, ReporterRegistry};
pub use rox::ResultReporter;

/// Invoked exactly once when a reporter allows the host to shut down
pub type ExitSignal = Box<dyn FnOnce() + Send>;

/// Reporter trait
pub trait Reporter: Send {
    /// Called before the first spec of a run
    fn on_run_start(&mut self) -> Result<()>;

    /// Called when a spec finishes, in the order the host observed them
    fn on_spec_complete(&mut self, environment: &Environment, outcome: &SpecOutcome)
    -> Result<()>;

    /// Called after the last spec of a run
    fn on_run_complete(&mut self) -> Result<()>;

    /// Called at shutdown; `done` releases the host once outstanding work settled.
    ///
    /// `done` runs from the returned future: the host must await or spawn it,
    /// dropping it unpolled never releases the host.
    fn on_exit(&self, done: ExitSignal) -> BoxFuture<'static, ()>;
}

/// How a reporter is known to the host's plugin loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Identifier the host configuration refers to
    pub id: &'static str,
    /// Dependencies handed to the factory, by name
    pub inject: &'static [&'static str],
}
