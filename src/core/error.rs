//! Error types shared across the runner core

use crate::core::config::ConfigError;
use thiserror::Error;

/// Everything that can abort a run or fail a single operation
///
/// The first four variants abort the whole run before any operation
/// executes. `Execution` is caught at the operation boundary inside the
/// runner, recorded in the report, and only halts the remainder of the plan.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("operation '{0}' is already registered")]
    DuplicateOperation(String),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("cyclic dependency between operations: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    #[error("operation '{name}' failed")]
    Execution {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Render an error with its full source chain on one line
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
