//! Dependency resolution into an execution plan

use crate::core::error::RunnerError;
use crate::core::registry::OperationRegistry;
use std::collections::HashMap;

/// What the caller asked to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunRequest {
    /// Every registered operation
    All,
    /// The named operations plus their transitive dependencies
    Selected(Vec<String>),
}

impl RunRequest {
    pub fn selected<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RunRequest::Selected(names.into_iter().map(Into::into).collect())
    }
}

/// A dependency-respecting order over operation names
///
/// Invariants: every transitive dependency of a member appears earlier in
/// the same plan, no name appears twice, and every requested name appears
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    order: Vec<String>,
}

impl ExecutionPlan {
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// Compute the execution plan for a request against a registry
///
/// Depth-first traversal with per-node visiting/visited marks. Operations
/// with no ordering constraint between them come out in registration order,
/// so identical registries always plan identically. Fails with
/// `UnknownOperation` when a requested or declared name is not registered,
/// and with `CyclicDependency` (naming the cycle's members) when the
/// declarations loop.
pub fn plan(
    request: &RunRequest,
    registry: &OperationRegistry,
) -> Result<ExecutionPlan, RunnerError> {
    let seeds: Vec<&str> = match request {
        RunRequest::All => registry.names().collect(),
        RunRequest::Selected(names) => {
            let mut seeds = Vec::with_capacity(names.len());
            for name in names {
                // surface a bad --run NAME before touching the graph
                seeds.push(registry.get(name)?.name.as_str());
            }
            seeds
        }
    };

    let mut order = Vec::new();
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut trail: Vec<&str> = Vec::new();

    for seed in seeds {
        visit(seed, registry, &mut marks, &mut trail, &mut order)?;
    }

    Ok(ExecutionPlan { order })
}

fn visit<'r>(
    name: &'r str,
    registry: &'r OperationRegistry,
    marks: &mut HashMap<&'r str, Mark>,
    trail: &mut Vec<&'r str>,
    order: &mut Vec<String>,
) -> Result<(), RunnerError> {
    match marks.get(name) {
        Some(Mark::Visited) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = trail.iter().position(|n| *n == name).unwrap_or(0);
            let members = trail[start..].iter().map(|n| n.to_string()).collect();
            return Err(RunnerError::CyclicDependency(members));
        }
        None => {}
    }

    marks.insert(name, Mark::Visiting);
    trail.push(name);

    let operation = registry.get(name)?;
    for dependency in &operation.dependencies {
        // a declared dependency that was never registered fails here
        let dependency = registry.get(dependency)?.name.as_str();
        visit(dependency, registry, marks, trail, order)?;
    }

    trail.pop();
    marks.insert(name, Mark::Visited);
    order.push(name.to_string());
    Ok(())
}
