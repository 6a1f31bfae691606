pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod state;

pub use client::{PublishClient, PublishInfo, RecordedResult, ResultOptions, TestRun, TestRunSession};
pub use config::{HostConfig, ReporterOptions};
pub use error::{PublishError, ReporterError};
pub use report::rox::{REGISTRATION, register};
pub use report::{ExitSignal, Injector, Reporter, ReporterRegistry, ResultReporter};
pub use state::{Environment, SpecOutcome};
