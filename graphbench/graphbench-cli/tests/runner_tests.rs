//! End-to-end runs against the recording driver.

use graphbench_cli::output::Reporter;
use graphbench_cli::runner::{
    run_benchmark, STAGE_CALCULATE, STAGE_CLEANUP, STAGE_CREATE_INDEXES, STAGE_POPULATE,
};
use graphbench_core::config::BenchConfig;
use graphbench_core::recording::{DriverEvent, Journal, RecordingDriver};
use graphbench_core::{Record, Value};

fn full_config() -> BenchConfig {
    let mut config = BenchConfig::default();
    config.workload.create_indexes = true;
    config.workload.populate.enabled = true;
    config.workload.populate.end = 5;
    config.workload.clean.enabled = true;
    config
}

/// Init first, cleanup last, and the connection closed right before cleanup
fn assert_bracketed(journal: &Journal) {
    let events = journal.events();
    assert_eq!(events.first(), Some(&DriverEvent::Init));
    assert_eq!(events.last(), Some(&DriverEvent::Cleanup));
    assert_eq!(journal.count(&DriverEvent::Cleanup), 1);
    assert_eq!(
        events.get(events.len().saturating_sub(2)),
        Some(&DriverEvent::CloseConnection)
    );
}

#[tokio::test]
async fn test_default_run_only_calculates() {
    let driver = RecordingDriver::new().respond_with(|stmt| {
        Ok(vec![Record::single(stmt.columns()[0].clone(), Value::Integer(80))])
    });

    let report = run_benchmark(&driver, &BenchConfig::default(), &Reporter::silent())
        .await
        .unwrap();

    let journal = driver.journal();
    assert_eq!(journal.runs().len(), 1);
    assert_eq!(journal.opened_streams(), 1);
    assert_eq!(journal.closed_streams(), 1);
    assert_bracketed(&journal);

    assert_eq!(report.driver, "recording");
    assert_eq!(report.statements, 1);
    assert_eq!(report.stages.len(), 1);
    let calculate = report.stage(STAGE_CALCULATE).unwrap();
    assert_eq!(calculate.count, 80);
    assert!(calculate.timing.is_some());
    assert!(!report.target.contains("neo4j1"));
}

#[tokio::test]
async fn test_full_run_stage_order() {
    let driver = RecordingDriver::new();

    let report = run_benchmark(&driver, &full_config(), &Reporter::silent())
        .await
        .unwrap();

    let names: Vec<&str> = report.stages.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![STAGE_CREATE_INDEXES, STAGE_POPULATE, STAGE_CALCULATE, STAGE_CLEANUP]
    );
    assert!(report.stage(STAGE_CREATE_INDEXES).unwrap().timing.is_none());

    let journal = driver.journal();
    // 2 indexes + 5 populate calls + 1 calculate + 8 empty cleanup passes
    assert_eq!(journal.runs().len(), 16);
    assert_eq!(report.statements, 16);
    assert_eq!(journal.opened_streams(), journal.closed_streams());
    assert_bracketed(&journal);
}

#[tokio::test]
async fn test_connect_failure_runs_nothing() {
    let driver = RecordingDriver::new().fail_connect("connection refused");

    let err = run_benchmark(&driver, &full_config(), &Reporter::silent())
        .await
        .unwrap_err();
    assert!(err.is_connection());

    let events = driver.journal().events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], DriverEvent::Init);
    assert!(matches!(events[1], DriverEvent::Connect { .. }));
    assert_eq!(events[2], DriverEvent::Cleanup);
}

#[tokio::test]
async fn test_init_failure_never_connects() {
    let driver = RecordingDriver::new().fail_init("library unavailable");

    let err = run_benchmark(&driver, &BenchConfig::default(), &Reporter::silent())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("library unavailable"));
    assert_eq!(driver.journal().events(), vec![DriverEvent::Init]);
}

#[tokio::test]
async fn test_query_failure_aborts_remaining_stages() {
    let driver = RecordingDriver::new().fail_run_matching("example.calculate.save");

    let err = run_benchmark(&driver, &full_config(), &Reporter::silent())
        .await
        .unwrap_err();
    assert!(err.is_query());

    let journal = driver.journal();
    assert!(journal.runs().iter().all(|r| !r.text.contains("DELETE")));
    assert_eq!(journal.opened_streams(), journal.closed_streams());
    assert_bracketed(&journal);
}

#[tokio::test]
async fn test_fetch_failure_still_releases_everything() {
    let driver = RecordingDriver::new().fail_fetch_matching("example.populate");

    let err = run_benchmark(&driver, &full_config(), &Reporter::silent())
        .await
        .unwrap_err();
    assert!(err.is_fetch());

    let journal = driver.journal();
    assert_eq!(journal.opened_streams(), 3);
    assert_eq!(journal.closed_streams(), 3);
    assert_bracketed(&journal);
}

#[tokio::test]
async fn test_disabled_stages_issue_nothing() {
    let mut config = BenchConfig::default();
    config.workload.calculate.enabled = false;
    let driver = RecordingDriver::new();

    let report = run_benchmark(&driver, &config, &Reporter::silent())
        .await
        .unwrap();

    assert!(report.stages.is_empty());
    assert!(driver.journal().runs().is_empty());
    assert_bracketed(&driver.journal());
}

#[tokio::test]
async fn test_report_serializes() {
    let driver = RecordingDriver::new();
    let report = run_benchmark(&driver, &BenchConfig::default(), &Reporter::silent())
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stages"][0]["name"], STAGE_CALCULATE);
    assert!(json["total"]["elapsed"].is_number());
    assert!(json["run_id"].is_string());
}

#[tokio::test]
async fn test_failed_stage_still_prints_its_timing() {
    let driver = RecordingDriver::new().fail_fetch_matching("example.calculate.save");
    let reporter = Reporter::capturing();

    let err = run_benchmark(&driver, &full_config(), &reporter)
        .await
        .unwrap_err();
    assert!(err.is_fetch());

    let lines = reporter.lines();
    let timings: Vec<&String> = lines.iter().filter(|l| l.contains("took about ms #")).collect();
    assert_eq!(timings.len(), 2);
    assert!(timings[0].starts_with(&format!("[{}]", STAGE_POPULATE)));
    assert!(timings[1].starts_with(&format!("[{}]", STAGE_CALCULATE)));
    assert!(!lines.iter().any(|l| l.starts_with(&format!("[{}]", STAGE_CLEANUP))));
}

#[tokio::test]
async fn test_successful_run_prints_every_timing() {
    let driver = RecordingDriver::new();
    let reporter = Reporter::capturing();

    run_benchmark(&driver, &full_config(), &reporter).await.unwrap();

    let lines = reporter.lines();
    assert!(lines[0].starts_with("connecting to "));
    for stage in [STAGE_POPULATE, STAGE_CALCULATE, STAGE_CLEANUP] {
        let prefix = format!("[{}] took about ms # ", stage);
        assert_eq!(lines.iter().filter(|l| l.starts_with(&prefix)).count(), 1);
    }
}
