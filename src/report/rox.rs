// ROX reporter - forwards spec outcomes to a ROX Center test run and publishes it

use super::registry::{LOGGER_DEPENDENCY, ReporterRegistry};
use super::{ExitSignal, Registration, Reporter};
use crate::client::{PublishClient, PublishInfo, RecordedResult, ResultOptions, TestRunSession};
use crate::config::ReporterOptions;
use crate::error::ReporterError;
use crate::logging::{Logger, LoggerFactory};
use crate::state::{Environment, PendingUploads, SpecOutcome};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;

pub const REPORTER_ID: &str = "reporter:rox";
pub const CONFIG_DEPENDENCY: &str = "config.rox";
pub const LOGGER_NAME: &str = "reporter.rox";

pub const REGISTRATION: Registration = Registration {
    id: REPORTER_ID,
    inject: &[LOGGER_DEPENDENCY, CONFIG_DEPENDENCY],
};

/// Reporter publishing every non-skipped spec to ROX Center
pub struct ResultReporter<C: PublishClient> {
    log: Arc<dyn Logger>,
    options: ReporterOptions,
    client: Arc<C>,
    config: Option<C::Config>,
    test_run: Option<C::Session>,
    uploads: PendingUploads,
}

impl<C: PublishClient> ResultReporter<C> {
    /// Create new ROX reporter
    pub fn new(
        loggers: &dyn LoggerFactory,
        options: ReporterOptions,
        client: Arc<C>,
    ) -> Result<Self, ReporterError> {
        options.validate()?;

        Ok(Self {
            log: loggers.create(LOGGER_NAME),
            options,
            client,
            config: None,
            test_run: None,
            uploads: PendingUploads::new(),
        })
    }

    pub fn options(&self) -> &ReporterOptions {
        &self.options
    }

    pub fn test_run(&self) -> Option<&C::Session> {
        self.test_run.as_ref()
    }

    pub fn pending_uploads(&self) -> usize {
        self.uploads.len()
    }

    /// Load the client configuration and start a fresh test run
    pub fn on_run_start(&mut self) -> Result<(), ReporterError> {
        let config = self
            .client
            .load_config(self.options.config.as_deref())
            .map_err(ReporterError::Config)?;
        let test_run = self
            .client
            .start_test_run(&config)
            .map_err(ReporterError::StartRun)?;

        self.config = Some(config);
        self.test_run = Some(test_run);
        self.uploads.clear();
        Ok(())
    }

    pub fn on_spec_complete(
        &mut self,
        environment: &Environment,
        outcome: &SpecOutcome,
    ) -> Result<(), ReporterError> {
        if outcome.skipped {
            return Ok(());
        }

        let test_run = self.test_run.as_mut().ok_or(ReporterError::NoActiveRun)?;

        let name = outcome.full_name();
        let options = ResultOptions {
            message: outcome.failure_message(environment),
        };

        test_run
            .add(None, &name, outcome.success, outcome.time, options)
            .map_err(|source| ReporterError::Record { name, source })
    }

    /// End the test run and start publishing it in the background.
    ///
    /// Without a Tokio runtime the test run is left untouched and
    /// `NoRuntime` is returned, so a later call can still publish it.
    pub fn on_run_complete(&mut self) -> Result<(), ReporterError> {
        let runtime = Handle::try_current().map_err(|_| ReporterError::NoRuntime)?;
        let mut test_run = self.test_run.take().ok_or(ReporterError::NoActiveRun)?;
        let config = self.config.as_ref().ok_or(ReporterError::NoActiveRun)?;

        test_run.end();
        log_summary(self.log.as_ref(), test_run.results());

        let started = Instant::now();
        let publish = self.client.process(test_run, config);

        let log = Arc::clone(&self.log);
        let upload = self.uploads.track(&runtime, async move {
            match publish.await {
                Ok(info) => log_publish_info(log.as_ref(), &info, started.elapsed()),
                Err(err) => log.warn(&err.log_line()),
            }
        });
        tracing::debug!(upload = %upload, "publishing test results");

        Ok(())
    }

    /// Wait for uploads pending now, then call `done`
    pub fn on_exit<F>(&self, done: F) -> BoxFuture<'static, ()>
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.uploads.is_empty() {
            self.log
                .info("Waiting on test results to be published to ROX Center...");
        }

        let settled = self.uploads.settle_all();
        async move {
            settled.await;
            done();
        }
        .boxed()
    }
}

fn log_summary(log: &dyn Logger, results: &[RecordedResult]) {
    let total = results.len();
    if total == 0 {
        return;
    }

    let keyed = results.iter().filter(|result| result.has_key()).count();
    let found = if keyed > 0 {
        keyed.to_string()
    } else {
        "no".to_string()
    };
    log.info(&format!(
        "Found {} results to send to ROX Center ({} results in total)",
        found, total
    ));
}

fn log_publish_info(log: &dyn Logger, info: &PublishInfo, elapsed: Duration) {
    if !info.errors.is_empty() {
        for error in &info.errors {
            log.warn(error);
        }
    } else if !info.published {
        log.info("Publishing disabled");
    } else {
        let seconds = elapsed.as_millis() as f64 / 1000.0;
        log.info(&format!(
            "Test results successfully published in {}s",
            seconds
        ));
    }
}

impl<C: PublishClient> Reporter for ResultReporter<C> {
    fn on_run_start(&mut self) -> anyhow::Result<()> {
        Ok(ResultReporter::on_run_start(self)?)
    }

    fn on_spec_complete(
        &mut self,
        environment: &Environment,
        outcome: &SpecOutcome,
    ) -> anyhow::Result<()> {
        Ok(ResultReporter::on_spec_complete(self, environment, outcome)?)
    }

    fn on_run_complete(&mut self) -> anyhow::Result<()> {
        Ok(ResultReporter::on_run_complete(self)?)
    }

    fn on_exit(&self, done: ExitSignal) -> BoxFuture<'static, ()> {
        ResultReporter::on_exit(self, done)
    }
}

/// Register the ROX reporter so hosts can build it from `reporter:rox`
pub fn register<C: PublishClient>(registry: &mut ReporterRegistry, client: Arc<C>) {
    registry.register(REGISTRATION, move |injector| {
        let loggers =
            injector
                .logger_factory()
                .ok_or_else(|| ReporterError::MissingDependency {
                    reporter: REPORTER_ID.to_string(),
                    dependency: LOGGER_DEPENDENCY.to_string(),
                })?;
        let options = injector.reporter_options(CONFIG_DEPENDENCY)?;

        let reporter = ResultReporter::new(loggers.as_ref(), options, Arc::clone(&client))?;
        Ok(Box::new(reporter) as Box<dyn Reporter>)
    });
}
