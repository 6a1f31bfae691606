// Logger contract and the tracing-backed console output

use chrono::Local;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Named logger handed to reporters by the host
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Creates named loggers (`logger` dependency of a reporter)
pub trait LoggerFactory: Send + Sync {
    fn create(&self, name: &str) -> Arc<dyn Logger>;
}

/// Logger writing through `tracing`, tagged with its name
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: String,
}

impl TracingLogger {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(logger = %self.name, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(logger = %self.name, "{}", message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLoggerFactory;

impl LoggerFactory for TracingLoggerFactory {
    fn create(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(TracingLogger::new(name))
    }
}

/// Console event format: `INFO [12:00:00] [reporter.rox]: message`
pub struct ConsoleFormatter;

#[derive(Default)]
struct EventFields {
    message: String,
    logger: Option<String>,
    extra: String,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "logger" => self.logger = Some(value.to_string()),
            name => {
                let _ = write!(self.extra, " {}={}", name, value);
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "logger" => self.logger = Some(format!("{:?}", value)),
            name => {
                let _ = write!(self.extra, " {}={:?}", name, value);
            }
        }
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = match *event.metadata().level() {
            tracing::Level::TRACE => "TRACE",
            tracing::Level::DEBUG => "DEBUG",
            tracing::Level::INFO => "INFO",
            tracing::Level::WARN => "WARN",
            tracing::Level::ERROR => "ERROR",
        };
        let timestamp = Local::now().format("%H:%M:%S");

        let mut fields = EventFields::default();
        event.record(&mut fields);

        let logger = fields
            .logger
            .unwrap_or_else(|| event.metadata().target().to_string());

        writeln!(
            writer,
            "{} [{}] [{}]: {}{}",
            level, timestamp, logger, fields.message, fields.extra
        )
    }
}

/// Install the console subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        "rox_reporter=debug,warn"
    } else {
        "rox_reporter=info,warn"
    };

    // A host may already own the global subscriber
    let _ = tracing_subscriber::fmt()
        .event_format(ConsoleFormatter)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .try_init();
}
