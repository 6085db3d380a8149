//! Test: layered configuration reaches operations read-only

use anyhow::Result;
use async_trait::async_trait;
use opsrun::core::config::{Config, ConfigStore};
use opsrun::core::operation::{Operation, OperationAction};
use opsrun::core::registry::OperationRegistry;
use opsrun::execution::runner::Runner;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

fn temp_config_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("opsrun-scenario-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_local_layer_overrides_a_single_leaf() {
    let dir = temp_config_dir();
    std::fs::write(
        dir.join("project.yaml"),
        "datadir: /var/lib/proj\npostgres:\n  database: proj\n  credentials:\n    host: localhost\n    user: app\n    password: CHANGEME\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("local.yaml"),
        "postgres:\n  credentials:\n    password: hunter2\n",
    )
    .unwrap();

    let config = ConfigStore::new()
        .with_layer(dir.join("project.yaml"))
        .with_layer(dir.join("local.yaml"))
        .load()
        .unwrap();

    // only the overridden leaf changed
    assert_eq!(config.get_str("postgres.credentials.password"), Some("hunter2"));
    assert_eq!(config.get_str("postgres.credentials.host"), Some("localhost"));
    assert_eq!(config.get_str("postgres.credentials.user"), Some("app"));
    assert_eq!(config.get_str("datadir"), Some("/var/lib/proj"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_extra_layers_take_highest_precedence() {
    let dir = temp_config_dir();
    std::fs::write(dir.join("project.yaml"), "datadir: /var/lib/proj\n").unwrap();
    std::fs::write(dir.join("local.yaml"), "datadir: /home/me/proj\n").unwrap();
    std::fs::write(dir.join("ci.yaml"), "datadir: /tmp/ci\n").unwrap();

    let config = ConfigStore::new()
        .with_layer(dir.join("project.yaml"))
        .with_layer(dir.join("local.yaml"))
        .with_layer(dir.join("ci.yaml"))
        .load()
        .unwrap();

    assert_eq!(config.get_str("datadir"), Some("/tmp/ci"));

    std::fs::remove_dir_all(&dir).ok();
}

/// Action that captures the configuration value it was handed
struct CapturePassword {
    seen: Arc<Mutex<Option<String>>>,
}

#[async_trait]
impl OperationAction for CapturePassword {
    async fn run(&self, config: &Config) -> Result<()> {
        *self.seen.lock().unwrap() = config
            .get_str("postgres.credentials.password")
            .map(str::to_string);
        Ok(())
    }
}

#[tokio::test]
async fn test_operations_receive_the_merged_configuration() {
    let dir = temp_config_dir();
    std::fs::write(
        dir.join("project.yaml"),
        "postgres:\n  credentials:\n    password: CHANGEME\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("local.yaml"),
        "postgres:\n  credentials:\n    password: hunter2\n",
    )
    .unwrap();

    let config = ConfigStore::new()
        .with_layer(dir.join("project.yaml"))
        .with_layer(dir.join("local.yaml"))
        .load()
        .unwrap();

    let seen = Arc::new(Mutex::new(None));
    let mut registry = OperationRegistry::new();
    registry
        .register(Operation::new(
            "check_password",
            "capture the effective password",
            Vec::<String>::new(),
            Box::new(CapturePassword {
                seen: Arc::clone(&seen),
            }),
        ))
        .unwrap();

    let runner = Runner::new(registry);
    let report = runner.run_all(&config).await.unwrap();

    assert!(report.is_success());
    assert_eq!(seen.lock().unwrap().as_deref(), Some("hunter2"));

    std::fs::remove_dir_all(&dir).ok();
}
