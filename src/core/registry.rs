//! Operation registry

use crate::core::error::RunnerError;
use crate::core::operation::Operation;
use std::collections::HashMap;

/// The set of declared operations, in registration order
///
/// Built once at startup, append-only while building, read-only for the
/// lifetime of a run. Constructed as an explicit value and passed by
/// reference so tests can build isolated registries.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: Vec<Operation>,
    index: HashMap<String, usize>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation; names must be unique
    pub fn register(&mut self, operation: Operation) -> Result<(), RunnerError> {
        if self.index.contains_key(&operation.name) {
            return Err(RunnerError::DuplicateOperation(operation.name.clone()));
        }
        self.index
            .insert(operation.name.clone(), self.operations.len());
        self.operations.push(operation);
        Ok(())
    }

    /// Look up an operation by name
    pub fn get(&self, name: &str) -> Result<&Operation, RunnerError> {
        self.index
            .get(name)
            .map(|&i| &self.operations[i])
            .ok_or_else(|| RunnerError::UnknownOperation(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|op| op.name.as_str())
    }

    /// All registered operations, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
