//! The seam between the benchmark and a graph database driver.
//!
//! A [`Driver`] opens [`Connection`]s, which submit [`Statement`]s and hand back
//! [`ResultStream`]s. Every stream and connection must be released exactly
//! once; the [`Results`], [`Session`] and [`DriverScope`] guards make that hold
//! on early returns as well as on the success path.
//!
//! A stream's work only takes effect once it is finished. A stream released
//! without [`Results::finish`] is abandoned and its work discarded.

use crate::error::{BenchError, Result};
use crate::query::{Record, Statement};
use crate::target::ConnectTarget;
use async_trait::async_trait;
use tracing::{debug, warn};

/// A client library able to open connections.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Library-wide initialisation, called before any connection attempt
    fn init(&self) -> Result<()>;

    /// Open a connection
    async fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn Connection>>;

    /// Library-wide teardown, called after every connection is closed
    fn cleanup(&self);
}

/// An open connection.
#[async_trait]
pub trait Connection: Send {
    /// Submit a statement and return its result stream
    async fn run(&mut self, statement: &Statement) -> Result<Box<dyn ResultStream>>;

    /// Release the connection
    fn close(&mut self);
}

/// Rows produced by one statement.
#[async_trait]
pub trait ResultStream: Send {
    /// Next row, or `None` when the stream is exhausted
    async fn fetch_next(&mut self) -> Result<Option<Record>>;

    /// Discard any unread rows and commit the statement's work
    async fn finish(&mut self) -> Result<()>;

    /// Release server-side resources held by the stream
    fn close(&mut self);
}

/// Guard over an open result stream; closes it exactly once.
#[must_use = "results are discarded unless finished"]
pub struct Results {
    stream: Option<Box<dyn ResultStream>>,
}

impl Results {
    pub fn new(stream: Box<dyn ResultStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub async fn fetch_next(&mut self) -> Result<Option<Record>> {
        match self.stream.as_mut() {
            Some(stream) => stream.fetch_next().await,
            None => Err(BenchError::fetch("result stream already closed")),
        }
    }

    /// Discard unread rows, commit, then close the stream
    pub async fn finish(mut self) -> Result<()> {
        let finished = match self.stream.as_mut() {
            Some(stream) => stream.finish().await,
            None => Err(BenchError::fetch("result stream already closed")),
        };
        self.release();
        finished
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
    }
}

impl Drop for Results {
    fn drop(&mut self) {
        self.release();
    }
}

/// An open connection plus the bookkeeping the benchmark reports.
pub struct Session {
    connection: Option<Box<dyn Connection>>,
    statements_run: usize,
}

impl Session {
    pub fn new(connection: Box<dyn Connection>) -> Self {
        Self {
            connection: Some(connection),
            statements_run: 0,
        }
    }

    /// Submit a statement; the returned guard owns the stream
    pub async fn run(&mut self, statement: &Statement) -> Result<Results> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| BenchError::driver("connection already closed"))?;

        debug!("Running statement: {}", statement);
        let stream = connection.run(statement).await?;
        self.statements_run += 1;
        Ok(Results::new(stream))
    }

    /// Submit a statement and discard its result
    pub async fn execute(&mut self, statement: &Statement) -> Result<()> {
        self.run(statement).await?.finish().await
    }

    /// Submit a statement and fetch exactly one row
    pub async fn single(&mut self, statement: &Statement) -> Result<Record> {
        let mut results = self.run(statement).await?;
        let record = results.fetch_next().await?.ok_or_else(|| {
            BenchError::fetch(format!("no record returned by '{}'", statement.text().trim()))
        })?;
        results.finish().await?;
        Ok(record)
    }

    /// Number of statements submitted successfully
    pub fn statements_run(&self) -> usize {
        self.statements_run
    }

    /// Close the connection now
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            debug!(
                "Closing connection after {} statements",
                self.statements_run
            );
            connection.close();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.connection.is_some() {
            warn!("Session dropped without explicit close");
        }
        self.release();
    }
}

/// Calls [`Driver::init`] on creation and [`Driver::cleanup`] on drop.
///
/// Declare it before the [`Session`] so the connection is released first.
pub struct DriverScope<'a> {
    driver: &'a dyn Driver,
}

impl<'a> DriverScope<'a> {
    pub fn init(driver: &'a dyn Driver) -> Result<Self> {
        debug!("Initialising driver {}", driver.name());
        driver.init()?;
        Ok(Self { driver })
    }

    /// Connect through the scoped driver
    pub async fn connect(&self, target: &ConnectTarget) -> Result<Session> {
        let connection = self.driver.connect(target).await?;
        Ok(Session::new(connection))
    }
}

impl Drop for DriverScope<'_> {
    fn drop(&mut self) {
        debug!("Cleaning up driver {}", self.driver.name());
        self.driver.cleanup();
    }
}
