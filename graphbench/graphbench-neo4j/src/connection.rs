//! `neo4rs` implementation of the driver seam.

use crate::convert::{to_query, to_record};
use async_trait::async_trait;
use graphbench_core::driver::{Connection, Driver, ResultStream};
use graphbench_core::error::{BenchError, Result};
use graphbench_core::query::{Record, Statement};
use graphbench_core::target::{ConnectTarget, TlsMode};
use neo4rs::{ConfigBuilder, Graph, RowStream, Txn};
use tracing::{debug, info};

/// Driver backed by `neo4rs`
#[derive(Debug, Default, Clone)]
pub struct Neo4jDriver;

impl Neo4jDriver {
    pub fn new() -> Self {
        Self
    }
}

/// URI handed to `neo4rs`, with the scheme carrying the TLS choice.
///
/// `neo4rs` selects transport security from the scheme: `neo4j`/`bolt` are
/// plain, `+s` verifies certificates, `+ssc` accepts self-signed ones.
pub fn driver_uri(target: &ConnectTarget) -> Result<String> {
    let (base, security) = match target.scheme.split_once('+') {
        Some((base, security)) => (base, Some(security)),
        None => (target.scheme.as_str(), None),
    };

    if base != "neo4j" && base != "bolt" {
        return Err(BenchError::connection(format!(
            "Unsupported scheme '{}', expected neo4j or bolt",
            target.scheme
        )));
    }

    let scheme = match (target.tls, security) {
        (TlsMode::Insecure, _) => base.to_string(),
        (TlsMode::Secure, Some(security @ ("s" | "ssc"))) => format!("{}+{}", base, security),
        (TlsMode::Secure, Some(other)) => {
            return Err(BenchError::connection(format!(
                "Unsupported security suffix '+{}'",
                other
            )));
        }
        (TlsMode::Secure, None) => format!("{}+s", base),
    };

    Ok(format!("{}://{}", scheme, target.address()))
}

#[async_trait]
impl Driver for Neo4jDriver {
    fn name(&self) -> &str {
        "neo4rs"
    }

    // neo4rs keeps no library-global state; init and cleanup are bookkeeping only.
    fn init(&self) -> Result<()> {
        debug!("neo4rs driver ready");
        Ok(())
    }

    async fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn Connection>> {
        let uri = driver_uri(target)?;
        info!("Connecting to {}", uri);

        let mut builder = ConfigBuilder::default()
            .uri(uri)
            .user(target.username.clone().unwrap_or_default())
            .password(target.password.clone().unwrap_or_default())
            .fetch_size(target.fetch_size)
            .max_connections(target.max_connections);

        if let Some(database) = &target.database {
            builder = builder.db(database.as_str());
        }

        let config = builder
            .build()
            .map_err(|e| BenchError::connection(format!("Invalid driver config: {}", e)))?;

        let graph = Graph::connect(config)
            .await
            .map_err(|e| BenchError::connection(e.to_string()))?;

        // Building the pool does not contact the server; an empty transaction does.
        graph
            .start_txn()
            .await
            .map_err(|e| BenchError::connection(e.to_string()))?
            .rollback()
            .await
            .map_err(|e| BenchError::connection(e.to_string()))?;
        debug!("Server reachable at {}", target.address());

        Ok(Box::new(Neo4jConnection { graph: Some(graph) }))
    }

    fn cleanup(&self) {
        debug!("neo4rs driver released");
    }
}

/// An open `neo4rs` graph handle.
///
/// Every statement runs in its own explicit transaction. `Graph::run` and
/// `Graph::execute` retry with backoff; transactions are never retried.
pub struct Neo4jConnection {
    graph: Option<Graph>,
}

#[async_trait]
impl Connection for Neo4jConnection {
    async fn run(&mut self, statement: &Statement) -> Result<Box<dyn ResultStream>> {
        let graph = self
            .graph
            .as_ref()
            .ok_or_else(|| BenchError::query("connection is closed"))?;

        let mut txn = graph
            .start_txn()
            .await
            .map_err(|e| BenchError::query(e.to_string()))?;

        let rows = txn
            .execute(to_query(statement))
            .await
            .map_err(|e| BenchError::query(e.to_string()))?;

        Ok(Box::new(Neo4jResults {
            open: Some(OpenStream { txn, rows }),
            columns: statement.columns().to_vec(),
        }))
    }

    fn close(&mut self) {
        if self.graph.take().is_some() {
            debug!("Graph handle dropped");
        }
    }
}

struct OpenStream {
    txn: Txn,
    rows: RowStream,
}

/// Rows of one executed statement, with the transaction they run in
pub struct Neo4jResults {
    open: Option<OpenStream>,
    columns: Vec<String>,
}

#[async_trait]
impl ResultStream for Neo4jResults {
    async fn fetch_next(&mut self) -> Result<Option<Record>> {
        let open = self
            .open
            .as_mut()
            .ok_or_else(|| BenchError::fetch("result stream is closed"))?;

        match open
            .rows
            .next(&mut open.txn)
            .await
            .map_err(|e| BenchError::fetch(e.to_string()))?
        {
            Some(row) => to_record(&row, &self.columns).map(Some),
            None => Ok(None),
        }
    }

    async fn finish(&mut self) -> Result<()> {
        let Some(mut open) = self.open.take() else {
            return Err(BenchError::fetch("result stream is closed"));
        };

        while open
            .rows
            .next(&mut open.txn)
            .await
            .map_err(|e| BenchError::fetch(e.to_string()))?
            .is_some()
        {}

        open.txn
            .commit()
            .await
            .map_err(|e| BenchError::query(format!("Commit failed: {}", e)))
    }

    // Dropping an uncommitted transaction hands its connection back to the
    // pool, which resets it and so rolls the statement back.
    fn close(&mut self) {
        if self.open.take().is_some() {
            debug!("Result stream abandoned without commit");
        }
    }
}
