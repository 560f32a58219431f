//! The benchmark run: connect, run the enabled stages in order, release.

use crate::output::Reporter;
use crate::workload;
use chrono::{DateTime, Utc};
use graphbench_core::config::{BenchConfig, WorkloadConfig};
use graphbench_core::error::Result;
use graphbench_core::{timed, Driver, DriverScope, Session, Stopwatch, Timing};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

pub const STAGE_CREATE_INDEXES: &str = "create_indexes";
pub const STAGE_POPULATE: &str = "populate_graph";
pub const STAGE_CALCULATE: &str = "calculate_save";
pub const STAGE_CLEANUP: &str = "cleanup";

/// Outcome of one stage
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub name: String,
    /// Statements issued, nodes created, nodes saved or items deleted
    pub count: i64,
    /// Present for timed stages
    pub timing: Option<Timing>,
}

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub driver: String,
    pub target: String,
    pub stages: Vec<StageReport>,
    pub statements: usize,
    pub total: Timing,
}

impl BenchReport {
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.name == name)
    }
}

/// Run the configured benchmark against `driver`.
///
/// The driver is initialised first and cleaned up last on every path; the
/// session is closed even when a stage fails, and the first stage error is
/// returned.
pub async fn run_benchmark(
    driver: &dyn Driver,
    config: &BenchConfig,
    reporter: &Reporter,
) -> Result<BenchReport> {
    let target = config.connection.target()?;
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let total = Stopwatch::start("total");

    info!("Starting run {} with driver {} against {}", run_id, driver.name(), target);

    let scope = DriverScope::init(driver)?;
    reporter.step(format!("connecting to {} ...", target));
    let mut session = scope.connect(&target).await.inspect_err(|e| {
        error!("Connection to {} failed: {}", target, e);
    })?;

    let stages = run_stages(&mut session, &config.workload, reporter).await;
    let statements = session.statements_run();
    session.close();
    drop(scope);

    let stages = stages?;
    let total = total.stop();
    info!("Run {} finished in {:.3} ms", run_id, total.millis());

    Ok(BenchReport {
        run_id,
        started_at,
        driver: driver.name().to_string(),
        target: target.display_uri(),
        stages,
        statements,
        total,
    })
}

/// Run every enabled stage in order, stopping at the first failure
pub async fn run_stages(
    session: &mut Session,
    workload: &WorkloadConfig,
    reporter: &Reporter,
) -> Result<Vec<StageReport>> {
    let mut stages = Vec::new();

    if workload.create_indexes {
        let issued = workload::create_indexes(session, reporter).await?;
        stages.push(StageReport {
            name: STAGE_CREATE_INDEXES.to_string(),
            count: issued as i64,
            timing: None,
        });
    }

    if workload.populate.enabled {
        let (created, timing) = timed(
            STAGE_POPULATE,
            workload::populate_graph(session, &workload.populate, reporter),
        )
        .await;
        stages.push(timed_stage(created, timing, reporter)?);
    }

    if workload.calculate.enabled {
        let (saved, timing) = timed(
            STAGE_CALCULATE,
            workload::calculate_save(session, &workload.calculate, reporter),
        )
        .await;
        stages.push(timed_stage(saved, timing, reporter)?);
    }

    if workload.clean.enabled {
        let (deleted, timing) = timed(
            STAGE_CLEANUP,
            workload::cleanup(session, &workload.clean, reporter),
        )
        .await;
        let deleted = deleted.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        stages.push(timed_stage(deleted, timing, reporter)?);
    } else {
        reporter.step("cleaning up ... skipped");
    }

    Ok(stages)
}

/// Print the timing line whatever the stage returned, then report it
fn timed_stage(count: Result<i64>, timing: Timing, reporter: &Reporter) -> Result<StageReport> {
    reporter.timing(&timing);
    Ok(StageReport {
        name: timing.name.clone(),
        count: count?,
        timing: Some(timing),
    })
}
