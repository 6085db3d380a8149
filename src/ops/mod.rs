//! Built-in setup operations
//!
//! These are ordinary operations to the core: the runner knows nothing about
//! what they do. The binary registers them at startup; library users can
//! build their own registry instead.

#[cfg(feature = "postgres")]
pub mod database;
pub mod datadir;

use crate::core::error::RunnerError;
use crate::core::operation::Operation;
use crate::core::registry::OperationRegistry;

/// Reserved name for the database bootstrap operation
pub const CREATE_DATABASE: &str = "create_database";

/// Build the registry of built-in operations
pub fn builtin_registry() -> Result<OperationRegistry, RunnerError> {
    let mut registry = OperationRegistry::new();

    #[cfg(feature = "postgres")]
    {
        registry.register(Operation::new(
            CREATE_DATABASE,
            "create the project database on a local PostgreSQL instance",
            Vec::<String>::new(),
            Box::new(database::CreateDatabase),
        ))?;
        registry.register(Operation::new(
            "create_schema",
            "create the SQL schema inside the project database",
            [CREATE_DATABASE],
            Box::new(database::CreateSchema),
        ))?;
    }

    registry.register(Operation::new(
        "init_datadir",
        "create the data directory for result files",
        Vec::<String>::new(),
        Box::new(datadir::InitDatadir),
    ))?;

    Ok(registry)
}
