//! Test: failure handling - abort-on-first-failure and cancellation

use crate::helpers::*;
use opsrun::core::config::Config;
use opsrun::core::report::{OperationOutcome, RunStatus, SkipReason};
use opsrun::execution::runner::Runner;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_failure_marks_the_rest_skipped() {
    let (registry, log) = recording_registry(&[
        ("create_database", &[], false),
        ("migrate", &["create_database"], true),
        ("seed_data", &["migrate"], false),
    ]);
    let runner = Runner::new(registry);

    let report = runner.run_all(&Config::empty()).await.unwrap();

    assert_eq!(report.status, RunStatus::Failed);
    assert_succeeded(&report, "create_database");
    assert_failed(&report, "migrate");
    assert_skipped(&report, "seed_data");

    // the skipped operation was never attempted
    assert_eq!(invocations(&log), vec!["create_database", "migrate"]);
}

#[tokio::test]
async fn test_skip_names_the_failed_predecessor() {
    let (registry, _log) = recording_registry(&[
        ("migrate", &[], true),
        ("seed_data", &["migrate"], false),
    ]);
    let runner = Runner::new(registry);

    let report = runner.run_all(&Config::empty()).await.unwrap();

    match &report.result("seed_data").unwrap().outcome {
        OperationOutcome::Skipped {
            reason: SkipReason::FailedPredecessor { failed },
        } => assert_eq!(failed, "migrate"),
        other => panic!("expected failed-predecessor skip, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failure_detail_carries_the_underlying_cause() {
    let (registry, _log) = recording_registry(&[("migrate", &[], true)]);
    let runner = Runner::new(registry);

    let report = runner.run_all(&Config::empty()).await.unwrap();

    match &report.result("migrate").unwrap().outcome {
        OperationOutcome::Failed { error, .. } => {
            assert!(error.contains("operation 'migrate' failed"));
            assert!(error.contains("migrate blew up"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_one_failure_never_crashes_report_collection() {
    let (registry, _log) = recording_registry(&[
        ("a", &[], true),
        ("b", &[], false),
        ("c", &[], false),
    ]);
    let runner = Runner::new(registry);

    let report = runner.run_all(&Config::empty()).await.unwrap();

    // every planned operation still has a result
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 2);
}

#[tokio::test]
async fn test_cancellation_skips_rather_than_fails() {
    let (registry, log) = recording_registry(&[
        ("a", &[], false),
        ("b", &[], false),
    ]);
    let runner = Runner::new(registry);
    runner.cancellation_flag().store(true, Ordering::SeqCst);

    let report = runner.run_all(&Config::empty()).await.unwrap();

    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(report.failed(), 0);
    for result in &report.results {
        assert!(matches!(
            result.outcome,
            OperationOutcome::Skipped {
                reason: SkipReason::Cancelled
            }
        ));
    }
    assert!(invocations(&log).is_empty());
}

#[tokio::test]
async fn test_runs_are_independent() {
    let (registry, log) = recording_registry(&[("a", &[], false)]);
    let runner = Runner::new(registry);

    let first = runner.run_all(&Config::empty()).await.unwrap();
    let second = runner.run_all(&Config::empty()).await.unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert!(second.is_success());
    assert_eq!(invocations(&log), vec!["a", "a"]);
}
