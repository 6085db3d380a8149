//! Data directory preparation

use crate::core::config::Config;
use crate::core::operation::OperationAction;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

/// Creates the directory named by the `datadir` config key
///
/// Idempotent: an existing directory is left untouched.
pub struct InitDatadir;

#[async_trait]
impl OperationAction for InitDatadir {
    async fn run(&self, config: &Config) -> Result<()> {
        let datadir = config.require_str("datadir")?;
        let path = Path::new(datadir);

        if path.is_dir() {
            debug!(path = %path.display(), "data directory already exists");
            return Ok(());
        }

        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create data directory {}", path.display()))?;
        info!(path = %path.display(), "created data directory");
        Ok(())
    }
}
