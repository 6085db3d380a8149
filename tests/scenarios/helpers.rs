//! Test utility functions for opsrun scenarios

use anyhow::Result;
use async_trait::async_trait;
use opsrun::core::config::Config;
use opsrun::core::operation::{Operation, OperationAction};
use opsrun::core::registry::OperationRegistry;
use opsrun::core::report::RunReport;
use std::sync::{Arc, Mutex};

/// Action that records its invocation order and optionally fails
pub struct RecordingAction {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl OperationAction for RecordingAction {
    async fn run(&self, _config: &Config) -> Result<()> {
        self.log.lock().unwrap().push(self.name.clone());
        if self.fail {
            anyhow::bail!("{} blew up", self.name);
        }
        Ok(())
    }
}

/// Build a registry of recording operations plus the shared invocation log
///
/// Each entry is `(name, dependencies, fails)`.
pub fn recording_registry(
    ops: &[(&str, &[&str], bool)],
) -> (OperationRegistry, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = OperationRegistry::new();
    for (name, deps, fail) in ops {
        registry
            .register(Operation::new(
                *name,
                format!("{} description", name),
                deps.iter().copied(),
                Box::new(RecordingAction {
                    name: name.to_string(),
                    log: Arc::clone(&log),
                    fail: *fail,
                }),
            ))
            .expect("registration should succeed");
    }
    (registry, log)
}

pub fn invocations(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn assert_succeeded(report: &RunReport, name: &str) {
    let result = report
        .result(name)
        .unwrap_or_else(|| panic!("no result for '{}'", name));
    assert!(
        result.outcome.is_success(),
        "expected '{}' to succeed, got {:?}",
        name,
        result.outcome
    );
}

pub fn assert_failed(report: &RunReport, name: &str) {
    let result = report
        .result(name)
        .unwrap_or_else(|| panic!("no result for '{}'", name));
    assert!(
        result.outcome.is_failure(),
        "expected '{}' to fail, got {:?}",
        name,
        result.outcome
    );
}

pub fn assert_skipped(report: &RunReport, name: &str) {
    let result = report
        .result(name)
        .unwrap_or_else(|| panic!("no result for '{}'", name));
    assert!(
        result.outcome.is_skipped(),
        "expected '{}' to be skipped, got {:?}",
        name,
        result.outcome
    );
}

/// Assert `earlier` ran before `later` in the invocation log
pub fn assert_ran_before(log: &[String], earlier: &str, later: &str) {
    let a = log
        .iter()
        .position(|n| n == earlier)
        .unwrap_or_else(|| panic!("'{}' never ran", earlier));
    let b = log
        .iter()
        .position(|n| n == later)
        .unwrap_or_else(|| panic!("'{}' never ran", later));
    assert!(a < b, "'{}' should run before '{}'", earlier, later);
}
