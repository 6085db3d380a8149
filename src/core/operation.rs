//! Operation domain model

use crate::core::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// The executable part of an operation
///
/// One implementor per concrete operation. The action receives the effective
/// configuration read-only and owns its own side effects (schema creation,
/// file I/O, ...); the runner only sequences and reports. An action that
/// needs a timeout or retry policy implements it itself.
#[async_trait]
pub trait OperationAction: Send + Sync {
    async fn run(&self, config: &Config) -> Result<()>;
}

/// A named, independently invocable unit of setup work
///
/// Declared once at registry-build time and immutable thereafter.
/// Dependencies are names, not resolved objects; they may reference
/// operations registered later and are validated at plan time.
pub struct Operation {
    /// Unique operation name
    pub name: String,

    /// Human-readable description, shown by listing mode
    pub description: String,

    /// Names of operations that must complete first
    pub dependencies: Vec<String>,

    action: Box<dyn OperationAction>,
}

impl Operation {
    pub fn new<N, D, I, S>(name: N, description: D, dependencies: I, action: Box<dyn OperationAction>) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            action,
        }
    }

    /// Invoke the action with the effective configuration
    pub async fn invoke(&self, config: &Config) -> Result<()> {
        self.action.run(config).await
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

struct FnAction<F>(F);

#[async_trait]
impl<F> OperationAction for FnAction<F>
where
    F: Fn(&Config) -> Result<()> + Send + Sync,
{
    async fn run(&self, config: &Config) -> Result<()> {
        (self.0)(config)
    }
}

/// Wrap a synchronous closure as an [`OperationAction`]
pub fn action_fn<F>(f: F) -> Box<dyn OperationAction>
where
    F: Fn(&Config) -> Result<()> + Send + Sync + 'static,
{
    Box::new(FnAction(f))
}
