//! Runner - drives operations through a resolved plan

use crate::core::config::Config;
use crate::core::error::{error_chain, RunnerError};
use crate::core::registry::OperationRegistry;
use crate::core::report::{OperationOutcome, RunReport, RunStatus, SkipReason};
use crate::execution::resolver::{self, RunRequest};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        run_id: Uuid,
        plan: Vec<String>,
    },
    OperationStarted {
        name: String,
        position: usize,
        total: usize,
    },
    OperationSucceeded {
        name: String,
        duration_ms: u64,
    },
    OperationFailed {
        name: String,
        error: String,
    },
    OperationSkipped {
        name: String,
        reason: SkipReason,
    },
    RunCompleted {
        run_id: Uuid,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&RunEvent) + Send + Sync>;

/// Sequences operations through a plan and reports per-operation outcomes
///
/// Execution is strictly sequential: no operation starts before all of its
/// plan-predecessors have finished. The runner owns no operation side
/// effects and imposes no per-operation timeout.
pub struct Runner {
    registry: OperationRegistry,
    cancel: Arc<AtomicBool>,
    handlers: Vec<EventHandler>,
}

impl Runner {
    pub fn new(registry: OperationRegistry) -> Self {
        Self {
            registry,
            cancel: Arc::new(AtomicBool::new(false)),
            handlers: Vec::new(),
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Shared flag that requests cancellation between operations
    ///
    /// Setting it never interrupts the operation currently executing;
    /// operations that have not started yet are marked skipped.
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Add an event handler; handlers run synchronously in-order
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&RunEvent) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    fn emit(&self, event: RunEvent) {
        for handler in &self.handlers {
            handler(&event);
        }
    }

    /// Every registered operation as `(name, description)`, in registration
    /// order; loads no configuration and executes nothing
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.registry
            .iter()
            .map(|op| (op.name.as_str(), op.description.as_str()))
            .collect()
    }

    /// Run every registered operation
    pub async fn run_all(&self, config: &Config) -> Result<RunReport, RunnerError> {
        self.run(&RunRequest::All, config).await
    }

    /// Plan the requested operations and execute them in plan order
    ///
    /// Planning failures (unknown name, cycle) abort before any operation
    /// executes. An operation failure is caught at the operation boundary,
    /// recorded, and marks every later plan member skipped.
    pub async fn run(
        &self,
        request: &RunRequest,
        config: &Config,
    ) -> Result<RunReport, RunnerError> {
        let plan = resolver::plan(request, &self.registry)?;

        let mut report = RunReport::begin();
        info!(
            run_id = %report.run_id,
            operations = plan.len(),
            "starting run: {}",
            plan.names().join(", ")
        );
        self.emit(RunEvent::RunStarted {
            run_id: report.run_id,
            plan: plan.names().to_vec(),
        });

        let total = plan.len();
        let mut first_failure: Option<String> = None;
        let mut cancelled = false;

        for (position, name) in plan.names().iter().enumerate() {
            if !cancelled && self.cancel.load(Ordering::SeqCst) {
                warn!("cancellation requested, skipping remaining operations");
                cancelled = true;
            }

            if cancelled {
                let reason = SkipReason::Cancelled;
                self.emit(RunEvent::OperationSkipped {
                    name: name.clone(),
                    reason: reason.clone(),
                });
                report.push(name.clone(), OperationOutcome::Skipped { reason });
                continue;
            }

            if let Some(failed) = &first_failure {
                let reason = SkipReason::FailedPredecessor {
                    failed: failed.clone(),
                };
                self.emit(RunEvent::OperationSkipped {
                    name: name.clone(),
                    reason: reason.clone(),
                });
                report.push(name.clone(), OperationOutcome::Skipped { reason });
                continue;
            }

            let operation = self.registry.get(name)?;

            info!(operation = %name, "processing");
            self.emit(RunEvent::OperationStarted {
                name: name.clone(),
                position,
                total,
            });

            let started = Instant::now();
            match operation.invoke(config).await {
                Ok(()) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    info!(operation = %name, duration_ms, "finished");
                    self.emit(RunEvent::OperationSucceeded {
                        name: name.clone(),
                        duration_ms,
                    });
                    report.push(name.clone(), OperationOutcome::Succeeded { duration_ms });
                }
                Err(source) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    let failure = RunnerError::Execution {
                        name: name.clone(),
                        source,
                    };
                    let detail = error_chain(&failure);
                    error!(operation = %name, "{}", detail);
                    self.emit(RunEvent::OperationFailed {
                        name: name.clone(),
                        error: detail.clone(),
                    });
                    report.push(
                        name.clone(),
                        OperationOutcome::Failed {
                            error: detail,
                            duration_ms,
                        },
                    );
                    first_failure = Some(name.clone());
                }
            }
        }

        report.finish(cancelled);
        info!(run_id = %report.run_id, status = ?report.status, "run finished");
        self.emit(RunEvent::RunCompleted {
            run_id: report.run_id,
            status: report.status,
        });

        Ok(report)
    }
}
