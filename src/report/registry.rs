// Reporter registry - resolves declared dependencies and builds reporters by id

use super::{Registration, Reporter};
use crate::config::{HostConfig, ReporterOptions};
use crate::error::ReporterError;
use crate::logging::LoggerFactory;
use std::collections::HashMap;
use std::sync::Arc;

/// Dependency name of the logger factory
pub const LOGGER_DEPENDENCY: &str = "logger";

/// Prefix of configuration section dependencies (`config.<section>`)
pub const CONFIG_DEPENDENCY_PREFIX: &str = "config.";

pub type ReporterFactory =
    Box<dyn Fn(&Injector) -> Result<Box<dyn Reporter>, ReporterError> + Send + Sync>;

/// Dependencies the host can hand to reporter factories
#[derive(Clone, Default)]
pub struct Injector {
    loggers: Option<Arc<dyn LoggerFactory>>,
    host_config: HostConfig,
}

impl Injector {
    pub fn new(host_config: HostConfig) -> Self {
        Self {
            loggers: None,
            host_config,
        }
    }

    /// Injector over the host configuration found in the default locations,
    /// or an empty one when no file exists
    pub fn from_default_config() -> Result<Self, ReporterError> {
        Ok(Self::new(HostConfig::load()?.unwrap_or_default()))
    }

    pub fn with_logger_factory(mut self, loggers: Arc<dyn LoggerFactory>) -> Self {
        self.loggers = Some(loggers);
        self
    }

    pub fn provides(&self, dependency: &str) -> bool {
        if dependency == LOGGER_DEPENDENCY {
            return self.loggers.is_some();
        }
        dependency
            .strip_prefix(CONFIG_DEPENDENCY_PREFIX)
            .is_some_and(|section| !section.is_empty())
    }

    pub fn logger_factory(&self) -> Option<Arc<dyn LoggerFactory>> {
        self.loggers.clone()
    }

    /// Reporter options for a `config.<section>` dependency
    pub fn reporter_options(&self, dependency: &str) -> Result<ReporterOptions, ReporterError> {
        match dependency.strip_prefix(CONFIG_DEPENDENCY_PREFIX) {
            Some(section) if !section.is_empty() => self.host_config.section_options(section),
            _ => Err(ReporterError::InvalidOptions(format!(
                "`{}` is not a configuration dependency",
                dependency
            ))),
        }
    }
}

/// Manager to register and instantiate reporters
#[derive(Default)]
pub struct ReporterRegistry {
    reporters: HashMap<&'static str, (Registration, ReporterFactory)>,
}

impl ReporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; a later registration under the same id replaces it
    pub fn register<F>(&mut self, registration: Registration, factory: F)
    where
        F: Fn(&Injector) -> Result<Box<dyn Reporter>, ReporterError> + Send + Sync + 'static,
    {
        tracing::debug!(reporter = registration.id, "registering reporter");
        self.reporters
            .insert(registration.id, (registration, Box::new(factory)));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.reporters.contains_key(id)
    }

    pub fn registration(&self, id: &str) -> Option<Registration> {
        self.reporters.get(id).map(|(registration, _)| *registration)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.reporters.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Build a reporter once every declared dependency is available
    pub fn instantiate(
        &self,
        id: &str,
        injector: &Injector,
    ) -> Result<Box<dyn Reporter>, ReporterError> {
        let (registration, factory) = self
            .reporters
            .get(id)
            .ok_or_else(|| ReporterError::UnknownReporter(id.to_string()))?;

        if let Some(missing) = registration
            .inject
            .iter()
            .find(|dependency| !injector.provides(dependency))
        {
            return Err(ReporterError::MissingDependency {
                reporter: registration.id.to_string(),
                dependency: missing.to_string(),
            });
        }

        factory(injector)
    }
}
