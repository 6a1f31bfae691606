// Shared fakes for integration tests
#![allow(dead_code)]

use futures::FutureExt;
use futures::future::BoxFuture;
use rox_reporter::logging::{Logger, LoggerFactory};
use rox_reporter::{
    PublishClient, PublishError, PublishInfo, RecordedResult, ResultOptions, TestRun,
    TestRunSession,
};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub logger: String,
    pub level: Level,
    pub message: String,
}

/// Logger factory keeping every line in memory
#[derive(Clone, Default)]
pub struct CaptureLoggers {
    lines: Arc<Mutex<Vec<Line>>>,
}

struct CaptureLogger {
    name: String,
    lines: Arc<Mutex<Vec<Line>>>,
}

impl CaptureLogger {
    fn push(&self, level: Level, message: &str) {
        self.lines.lock().unwrap().push(Line {
            logger: self.name.clone(),
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for CaptureLogger {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }
}

impl LoggerFactory for CaptureLoggers {
    fn create(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(CaptureLogger {
            name: name.to_string(),
            lines: Arc::clone(&self.lines),
        })
    }
}

impl CaptureLoggers {
    pub fn lines(&self) -> Vec<Line> {
        self.lines.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(Level::Info)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::Warn)
    }

    fn messages(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.level == level)
            .map(|line| line.message)
            .collect()
    }
}

/// Session recording every call made by the reporter
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    pub run: TestRun,
    pub options: Vec<ResultOptions>,
    pub end_calls: usize,
    keys: HashMap<String, String>,
}

impl TestRunSession for RecordingSession {
    fn add(
        &mut self,
        key: Option<&str>,
        name: &str,
        passed: bool,
        duration_ms: u64,
        options: ResultOptions,
    ) -> anyhow::Result<()> {
        self.options.push(options.clone());
        let key = key.or_else(|| self.keys.get(name).map(String::as_str));
        let key = key.map(str::to_string);
        self.run
            .add(key.as_deref(), name, passed, duration_ms, options)
    }

    fn end(&mut self) {
        self.end_calls += 1;
        self.run.end();
    }

    fn results(&self) -> &[RecordedResult] {
        self.run.results()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    pub path: Option<PathBuf>,
}

/// Scripted answer of one `process` call
pub enum Publish {
    Resolve(PublishInfo, Duration),
    Reject(PublishError),
    Wait(oneshot::Receiver<Result<PublishInfo, PublishError>>),
}

#[derive(Default)]
pub struct ClientState {
    pub loaded: Vec<Option<PathBuf>>,
    pub runs_started: usize,
    pub processed: Vec<RecordingSession>,
    pub fail_config: Option<String>,
    pub fail_start: Option<String>,
    pub keys: HashMap<String, String>,
    pub script: VecDeque<Publish>,
}

#[derive(Clone, Default)]
pub struct MockClient {
    pub state: Arc<Mutex<ClientState>>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, publish: Publish) {
        self.state.lock().unwrap().script.push_back(publish);
    }

    /// Results named `name` get `key` assigned by the session
    pub fn key(&self, name: &str, key: &str) {
        self.state
            .lock()
            .unwrap()
            .keys
            .insert(name.to_string(), key.to_string());
    }

    pub fn processed(&self) -> Vec<RecordingSession> {
        self.state.lock().unwrap().processed.clone()
    }
}

impl PublishClient for MockClient {
    type Config = MockConfig;
    type Session = RecordingSession;

    fn load_config(&self, path: Option<&Path>) -> anyhow::Result<MockConfig> {
        let mut state = self.state.lock().unwrap();
        state.loaded.push(path.map(Path::to_path_buf));
        if let Some(message) = &state.fail_config {
            anyhow::bail!("{}", message);
        }
        Ok(MockConfig {
            path: path.map(Path::to_path_buf),
        })
    }

    fn start_test_run(&self, _config: &MockConfig) -> anyhow::Result<RecordingSession> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.fail_start {
            anyhow::bail!("{}", message);
        }
        state.runs_started += 1;
        Ok(RecordingSession {
            keys: state.keys.clone(),
            ..RecordingSession::default()
        })
    }

    fn process(
        &self,
        session: RecordingSession,
        _config: &MockConfig,
    ) -> BoxFuture<'static, Result<PublishInfo, PublishError>> {
        let mut state = self.state.lock().unwrap();
        state.processed.push(session);

        match state.script.pop_front() {
            Some(Publish::Resolve(info, delay)) => async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(info)
            }
            .boxed(),
            Some(Publish::Reject(err)) => async move { Err(err) }.boxed(),
            Some(Publish::Wait(rx)) => async move {
                rx.await
                    .unwrap_or_else(|_| Err(PublishError::new("publish dropped")))
            }
            .boxed(),
            None => async { Ok(PublishInfo::published()) }.boxed(),
        }
    }
}
