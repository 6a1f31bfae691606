// Tests for reporter registration and host-driven lifecycle

mod common;

use common::{CaptureLoggers, MockClient};
use rox_reporter::report::rox::{CONFIG_DEPENDENCY, REPORTER_ID};
use rox_reporter::{
    Environment, HostConfig, Injector, REGISTRATION, Reporter, ReporterError, ReporterRegistry,
    SpecOutcome, register,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;

fn host_config(content: &str) -> HostConfig {
    HostConfig::parse(content).expect("Failed to parse host config")
}

#[test]
fn test_registration_metadata() {
    assert_eq!(REGISTRATION.id, REPORTER_ID);
    assert_eq!(REGISTRATION.inject, &["logger", CONFIG_DEPENDENCY]);
}

#[test]
fn test_register_rox_reporter() {
    // Arrange
    let mut registry = ReporterRegistry::new();

    // Act
    register(&mut registry, MockClient::new());

    // Assert
    assert!(registry.contains("reporter:rox"));
    assert_eq!(registry.ids(), vec!["reporter:rox"]);
    assert_eq!(registry.registration("reporter:rox"), Some(REGISTRATION));
}

#[test]
fn test_instantiate_requires_logger() {
    // Arrange
    let mut registry = ReporterRegistry::new();
    register(&mut registry, MockClient::new());
    let injector = Injector::new(HostConfig::default());

    // Act
    let err = registry.instantiate("reporter:rox", &injector).err().unwrap();

    // Assert
    assert!(matches!(
        err,
        ReporterError::MissingDependency { ref dependency, .. } if dependency == "logger"
    ));
}

#[test]
fn test_instantiate_rejects_invalid_section() {
    // Arrange
    let mut registry = ReporterRegistry::new();
    register(&mut registry, MockClient::new());
    let injector = Injector::new(host_config("[rox]\nconfig = \"\"\n"))
        .with_logger_factory(Arc::new(CaptureLoggers::default()));

    // Act
    let err = registry.instantiate("reporter:rox", &injector).err().unwrap();

    // Assert
    assert!(matches!(err, ReporterError::InvalidOptions(_)));
}

#[tokio::test]
async fn test_host_drives_registered_reporter() {
    // Arrange
    let client = MockClient::new();
    let loggers = CaptureLoggers::default();
    let mut registry = ReporterRegistry::new();
    register(&mut registry, Arc::clone(&client));
    let injector = Injector::new(host_config("[rox]\nconfig = \"/etc/rox.yml\"\n"))
        .with_logger_factory(Arc::new(loggers.clone()));
    let mut reporter: Box<dyn Reporter> = registry
        .instantiate("reporter:rox", &injector)
        .expect("Failed to instantiate reporter");

    // Act
    reporter.on_run_start().unwrap();
    reporter
        .on_spec_complete(
            &Environment::new("Chrome"),
            &SpecOutcome::pass(["Login"], "succeeds", 120),
        )
        .unwrap();
    reporter.on_run_complete().unwrap();

    let (done_tx, done_rx) = oneshot::channel();
    reporter
        .on_exit(Box::new(move || {
            let _ = done_tx.send(());
        }))
        .await;

    // Assert
    assert!(done_rx.await.is_ok());
    let state = client.state.lock().unwrap();
    assert_eq!(state.loaded, vec![Some(PathBuf::from("/etc/rox.yml"))]);
    assert_eq!(state.processed.len(), 1);
    assert!(
        loggers
            .infos()
            .iter()
            .any(|line| line.starts_with("Test results successfully published in"))
    );
}

#[tokio::test]
async fn test_trait_errors_keep_reporter_error() {
    // Arrange
    let mut registry = ReporterRegistry::new();
    register(&mut registry, MockClient::new());
    let injector =
        Injector::new(HostConfig::default()).with_logger_factory(Arc::new(CaptureLoggers::default()));
    let mut reporter = registry.instantiate("reporter:rox", &injector).unwrap();

    // Act
    let err = reporter.on_run_complete().unwrap_err();

    // Assert
    assert!(matches!(
        err.downcast_ref::<ReporterError>(),
        Some(ReporterError::NoActiveRun)
    ));
}
