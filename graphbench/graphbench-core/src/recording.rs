//! In-memory recording driver
//!
//! Journals every driver call and answers statements from a scripted
//! responder, so the benchmark flow can be exercised without a server.
//! Available in all builds for integration tests and benches.

use crate::driver::{Connection, Driver, ResultStream};
use crate::error::{BenchError, Result};
use crate::query::{Record, Statement};
use crate::target::ConnectTarget;
use crate::value::Value;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// A submitted statement as the driver saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RunCall {
    pub text: String,
    pub params: Vec<(String, Value)>,
}

impl RunCall {
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// One journaled driver call
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    Init,
    Connect { address: String },
    /// A statement was accepted and a stream opened
    Run(RunCall),
    /// A statement was rejected; no stream was opened
    RunRejected(RunCall),
    Fetch,
    /// A stream was drained and its work committed
    Finish,
    CloseResults,
    CloseConnection,
    Cleanup,
}

/// Shared, append-only call log
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<DriverEvent>>>,
}

impl Journal {
    fn push(&self, event: DriverEvent) {
        self.events.lock().push(event);
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<DriverEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: &DriverEvent) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    /// Accepted statements in submission order
    pub fn runs(&self) -> Vec<RunCall> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Run(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of statements submitted, accepted or not
    pub fn attempted_runs(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, DriverEvent::Run(_) | DriverEvent::RunRejected(_)))
            .count()
    }

    pub fn opened_streams(&self) -> usize {
        self.runs().len()
    }

    pub fn closed_streams(&self) -> usize {
        self.count(&DriverEvent::CloseResults)
    }

    /// Streams whose work was committed before they were closed
    pub fn finished_streams(&self) -> usize {
        self.count(&DriverEvent::Finish)
    }

    fn accepted_matching(&self, pattern: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, DriverEvent::Run(call) if call.text.contains(pattern)))
            .count()
    }
}

type Responder = dyn Fn(&Statement) -> Result<Vec<Record>> + Send + Sync;

#[derive(Clone)]
struct RunFailure {
    pattern: String,
    succeed_first: usize,
}

#[derive(Clone)]
struct Script {
    init_error: Option<String>,
    connect_error: Option<String>,
    run_failures: Vec<RunFailure>,
    fetch_failures: Vec<String>,
    responder: Arc<Responder>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            init_error: None,
            connect_error: None,
            run_failures: Vec::new(),
            fetch_failures: Vec::new(),
            responder: Arc::new(zero_row),
        }
    }
}

/// One row with every declared column set to zero
fn zero_row(statement: &Statement) -> Result<Vec<Record>> {
    let columns = statement.columns().to_vec();
    let values = vec![Value::Integer(0); columns.len()];
    Ok(vec![Record::new(columns, values)?])
}

/// Scriptable driver that records every call
#[derive(Clone, Default)]
pub struct RecordingDriver {
    journal: Journal,
    script: Script,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `init` fail
    pub fn fail_init(mut self, msg: impl Into<String>) -> Self {
        self.script.init_error = Some(msg.into());
        self
    }

    /// Make `connect` fail
    pub fn fail_connect(mut self, msg: impl Into<String>) -> Self {
        self.script.connect_error = Some(msg.into());
        self
    }

    /// Reject every statement whose text contains `pattern`
    pub fn fail_run_matching(self, pattern: impl Into<String>) -> Self {
        self.fail_run_after(pattern, 0)
    }

    /// Accept the first `n` statements containing `pattern`, reject the rest
    pub fn fail_run_after(mut self, pattern: impl Into<String>, n: usize) -> Self {
        self.script.run_failures.push(RunFailure {
            pattern: pattern.into(),
            succeed_first: n,
        });
        self
    }

    /// Make fetches, and draining on finish, fail on streams of statements
    /// containing `pattern`
    pub fn fail_fetch_matching(mut self, pattern: impl Into<String>) -> Self {
        self.script.fetch_failures.push(pattern.into());
        self
    }

    /// Answer statements with `responder`; an error rejects the statement
    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: Fn(&Statement) -> Result<Vec<Record>> + Send + Sync + 'static,
    {
        self.script.responder = Arc::new(responder);
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    fn name(&self) -> &str {
        "recording"
    }

    fn init(&self) -> Result<()> {
        self.journal.push(DriverEvent::Init);
        match &self.script.init_error {
            Some(msg) => Err(BenchError::driver(msg.clone())),
            None => Ok(()),
        }
    }

    async fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn Connection>> {
        self.journal.push(DriverEvent::Connect {
            address: target.address(),
        });

        if let Some(msg) = &self.script.connect_error {
            return Err(BenchError::connection(msg.clone()));
        }

        debug!("Recording connection opened to {}", target);
        Ok(Box::new(RecordingConnection {
            journal: self.journal.clone(),
            script: self.script.clone(),
            closed: false,
        }))
    }

    fn cleanup(&self) {
        self.journal.push(DriverEvent::Cleanup);
    }
}

struct RecordingConnection {
    journal: Journal,
    script: Script,
    closed: bool,
}

impl RecordingConnection {
    fn rejection(&self, statement: &Statement) -> Option<String> {
        let text = statement.text();
        self.script
            .run_failures
            .iter()
            .find(|f| {
                text.contains(&f.pattern)
                    && self.journal.accepted_matching(&f.pattern) >= f.succeed_first
            })
            .map(|f| format!("statement matching '{}' rejected", f.pattern))
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    async fn run(&mut self, statement: &Statement) -> Result<Box<dyn ResultStream>> {
        let call = RunCall {
            text: statement.text().to_string(),
            params: statement.params().to_vec(),
        };

        if self.closed {
            self.journal.push(DriverEvent::RunRejected(call));
            return Err(BenchError::query("connection is closed"));
        }

        if let Some(msg) = self.rejection(statement) {
            self.journal.push(DriverEvent::RunRejected(call));
            return Err(BenchError::query(msg));
        }

        let rows = match (self.script.responder)(statement) {
            Ok(rows) => rows,
            Err(e) => {
                self.journal.push(DriverEvent::RunRejected(call));
                return Err(e);
            }
        };

        let fetch_error = self
            .script
            .fetch_failures
            .iter()
            .find(|p| statement.text().contains(p.as_str()))
            .map(|p| format!("fetch on statement matching '{}' failed", p));

        self.journal.push(DriverEvent::Run(call));
        Ok(Box::new(RecordingStream {
            journal: self.journal.clone(),
            rows: rows.into(),
            fetch_error,
        }))
    }

    fn close(&mut self) {
        self.closed = true;
        self.journal.push(DriverEvent::CloseConnection);
    }
}

struct RecordingStream {
    journal: Journal,
    rows: VecDeque<Record>,
    fetch_error: Option<String>,
}

#[async_trait]
impl ResultStream for RecordingStream {
    async fn fetch_next(&mut self) -> Result<Option<Record>> {
        self.journal.push(DriverEvent::Fetch);
        match &self.fetch_error {
            Some(msg) => Err(BenchError::fetch(msg.clone())),
            None => Ok(self.rows.pop_front()),
        }
    }

    async fn finish(&mut self) -> Result<()> {
        if let Some(msg) = &self.fetch_error {
            return Err(BenchError::fetch(msg.clone()));
        }
        self.rows.clear();
        self.journal.push(DriverEvent::Finish);
        Ok(())
    }

    fn close(&mut self) {
        self.journal.push(DriverEvent::CloseResults);
    }
}
