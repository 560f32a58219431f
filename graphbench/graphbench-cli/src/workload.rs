//! The benchmark procedures.
//!
//! Each procedure builds its statements, binds at most two integer parameters,
//! and reads back at most one integer field per call. Result streams are
//! finished, committing their work, before they are closed; the
//! [`Results`](graphbench_core::Results) guard closes them on failed fetches
//! too.

use crate::output::Reporter;
use graphbench_core::config::{CalculateConfig, CleanConfig, PopulateConfig};
use graphbench_core::error::{BenchError, Result};
use graphbench_core::{Session, Statement};
use tracing::{debug, info};

pub const INDEX_STATEMENTS: [&str; 2] = [
    "CREATE INDEX ON :parent(value)",
    "CREATE INDEX ON :child(value)",
];

pub const POPULATE_QUERY: &str = "CALL example.populate($s, $i) YIELD out AS o RETURN o";

pub const CALCULATE_SAVE_QUERY: &str =
    "CALL example.calculate.save($i, $j) YIELD out AS o RETURN o";

/// Column every procedure projects
pub const OUT_COLUMN: &str = "o";

/// Column of the cleanup statements
pub const DELETED_COLUMN: &str = "deleted";

/// `(low, high)` regardless of argument order
pub fn ordered(a: i64, b: i64) -> (i64, i64) {
    if a > b { (b, a) } else { (a, b) }
}

pub fn populate_statement(step: i64, index: i64) -> Statement {
    Statement::new(POPULATE_QUERY)
        .param("s", step)
        .param("i", index)
        .column(OUT_COLUMN)
}

pub fn calculate_statement(start: i64, end: i64) -> Statement {
    Statement::new(CALCULATE_SAVE_QUERY)
        .param("i", start)
        .param("j", end)
        .column(OUT_COLUMN)
}

/// Issue both index statements, discarding their results
pub async fn create_indexes(session: &mut Session, reporter: &Reporter) -> Result<usize> {
    reporter.step("creating indexes ...");

    for text in INDEX_STATEMENTS {
        session.execute(&Statement::new(text)).await?;
    }

    Ok(INDEX_STATEMENTS.len())
}

/// Call the populate procedure once per index in `[start, end)` and sum the
/// node counts it reports
pub async fn populate_graph(
    session: &mut Session,
    config: &PopulateConfig,
    reporter: &Reporter,
) -> Result<i64> {
    reporter.step("populating graph ...");

    let (start, end) = ordered(config.start, config.end);
    let calls = start.abs_diff(end);
    let bar = reporter.progress(calls, "populate");

    let mut count: i64 = 0;
    for index in start..end {
        let record = session.single(&populate_statement(config.step, index)).await?;
        count = count
            .checked_add(record.field_i64(0)?)
            .ok_or_else(|| BenchError::fetch("populate count overflowed"))?;
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!("Populate created {} nodes over {} calls", count, calls);
    reporter.step(format!(" created {} nodes", count));
    Ok(count)
}

/// Run the calculate-and-save procedure over `[start, end)`; returns the
/// number of nodes it saved into the cache
pub async fn calculate_save(
    session: &mut Session,
    config: &CalculateConfig,
    reporter: &Reporter,
) -> Result<i64> {
    reporter.step("loading and saving ...");
    reporter.step("  * start ...");

    let (start, end) = ordered(config.start, config.end);
    let statement = calculate_statement(start, end);
    let mut results = session.run(&statement).await?;

    reporter.step("  * fetching result ...");
    let record = results
        .fetch_next()
        .await?
        .ok_or_else(|| BenchError::fetch("calculate.save returned no record"))?;
    results.finish().await?;

    let saved = record.field_i64(0)?;
    reporter.step(format!("  -> saved {} nodes in cache", saved));
    Ok(saved)
}

/// What one cleanup pass deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Relationship(&'static str),
    Label(&'static str),
    Everything,
}

/// Cleanup order: relationships first, then labelled nodes, then the rest
pub const DELETE_TARGETS: [DeleteTarget; 8] = [
    DeleteTarget::Relationship("BELONGS"),
    DeleteTarget::Relationship("v_BELONGS"),
    DeleteTarget::Label("parent"),
    DeleteTarget::Label("v_parent"),
    DeleteTarget::Label("child"),
    DeleteTarget::Label("v_child"),
    DeleteTarget::Label("v_cache"),
    DeleteTarget::Everything,
];

impl DeleteTarget {
    /// One batched delete returning how many items it removed
    pub fn statement(&self, config: &CleanConfig) -> Statement {
        let text = match self {
            Self::Relationship(rel) => format!(
                "MATCH ()-[r:{}]->() WITH r LIMIT {} DELETE r RETURN count(*) AS {}",
                rel, config.relationship_batch, DELETED_COLUMN
            ),
            Self::Label(label) => format!(
                "MATCH (n:{}) WITH n LIMIT {} DETACH DELETE n RETURN count(*) AS {}",
                label, config.node_batch, DELETED_COLUMN
            ),
            Self::Everything => format!(
                "MATCH (n) WITH n LIMIT {} DETACH DELETE n RETURN count(*) AS {}",
                config.sweep_batch, DELETED_COLUMN
            ),
        };
        Statement::new(text).column(DELETED_COLUMN)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Relationship(rel) => format!("relationships :{}", rel),
            Self::Label(label) => format!("nodes :{}", label),
            Self::Everything => "all remaining nodes".to_string(),
        }
    }
}

/// Delete every benchmark artefact in batches; returns the total removed
pub async fn cleanup(session: &mut Session, config: &CleanConfig, reporter: &Reporter) -> Result<u64> {
    reporter.step("cleaning up ...");

    let mut total: u64 = 0;
    for target in DELETE_TARGETS {
        let statement = target.statement(config);
        let mut removed: u64 = 0;

        loop {
            let deleted = session.single(&statement).await?.field_i64(0)?;
            if deleted <= 0 {
                break;
            }
            removed = removed.saturating_add(deleted.unsigned_abs());
            total = total.saturating_add(deleted.unsigned_abs());
            reporter.step(format!(
                "  * cumulative deletes: {} last result: {}",
                total, deleted
            ));
        }

        debug!("Removed {} {}", removed, target.describe());
    }

    reporter.step(format!("  -> deleted {} items", total));
    Ok(total)
}
