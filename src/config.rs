// Configuration file handling

use crate::error::ReporterError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Host configuration file names, searched in the current and home directories
pub const HOST_CONFIG_FILE: &str = ".roxrc.toml";

/// Section of the host configuration read by the ROX reporter
pub const ROX_SECTION: &str = "rox";

/// Options of the `[rox]` section, forwarded to the client's config loader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReporterOptions {
    /// Path to the ROX client configuration file
    #[serde(default)]
    pub config: Option<PathBuf>,
}

impl ReporterOptions {
    pub fn with_config(path: impl Into<PathBuf>) -> Self {
        Self {
            config: Some(path.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ReporterError> {
        match &self.config {
            Some(path) if path.as_os_str().is_empty() => Err(ReporterError::InvalidOptions(
                "`config` must not be an empty path".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Resolve a relative `config` path against the directory of the host configuration
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        if let Some(path) = self.config.take() {
            self.config = Some(if path.is_relative() && !path.as_os_str().is_empty() {
                base.join(path)
            } else {
                path
            });
        }
        self
    }
}

/// Parsed host configuration, one table per registered component
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    table: toml::Table,
    base_dir: Option<PathBuf>,
}

impl HostConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Option<Self>, ReporterError> {
        // Check locations in order:
        // 1. .roxrc.toml (current directory)
        // 2. ~/.roxrc.toml (home directory)
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(HOST_CONFIG_FILE));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(HOST_CONFIG_FILE));
        }

        match paths.iter().find(|path| path.exists()) {
            Some(path) => Self::load_from_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ReporterError> {
        let content = std::fs::read_to_string(path).map_err(|e| ReporterError::HostConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::parse(&content).map_err(|e| match e {
            ReporterError::HostConfig { message, .. } => ReporterError::HostConfig {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ReporterError> {
        let table = toml::from_str(content).map_err(|e: toml::de::Error| {
            ReporterError::HostConfig {
                path: PathBuf::new(),
                message: e.message().to_string(),
            }
        })?;

        Ok(Self {
            table,
            base_dir: None,
        })
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Deserialize a named section, or its default when absent
    pub fn section<T>(&self, name: &str) -> Result<T, ReporterError>
    where
        T: DeserializeOwned + Default,
    {
        match self.table.get(name) {
            Some(value) => value
                .clone()
                .try_into()
                .map_err(|e: toml::de::Error| ReporterError::InvalidOptions(format!(
                    "[{}] {}",
                    name,
                    e.message()
                ))),
            None => Ok(T::default()),
        }
    }

    /// Reporter options from the `[rox]` section, validated
    pub fn reporter_options(&self) -> Result<ReporterOptions, ReporterError> {
        self.section_options(ROX_SECTION)
    }

    /// Reporter options from a named section, validated
    pub fn section_options(&self, name: &str) -> Result<ReporterOptions, ReporterError> {
        let options: ReporterOptions = self.section(name)?;
        options.validate()?;
        Ok(match &self.base_dir {
            Some(base) => options.resolve_relative_to(base),
            None => options,
        })
    }
}
