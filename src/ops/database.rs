//! PostgreSQL bootstrap operations

use crate::core::config::Config;
use crate::core::operation::OperationAction;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, Connection, Executor, PgConnection};
use tracing::{debug, info};

const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1"];

fn is_local(host: &str) -> bool {
    LOCAL_HOSTS.contains(&host)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Connection options for the configured server, targeting `database`
fn connect_options(config: &Config, database: &str) -> Result<PgConnectOptions> {
    let host = config.require_str("postgres.credentials.host")?;
    let user = config.require_str("postgres.credentials.user")?;
    let password = config.require_str("postgres.credentials.password")?;
    let port = match config.get_u64("postgres.credentials.port")? {
        Some(port) => u16::try_from(port)
            .with_context(|| format!("postgres.credentials.port {} out of range", port))?,
        None => 5432,
    };

    Ok(PgConnectOptions::new()
        .host(host)
        .port(port)
        .username(user)
        .password(password)
        .database(database))
}

/// Bootstraps a fresh database instance
///
/// Only acts when the configured host is local; creating databases on a
/// remote server is someone else's job. Idempotent: an existing database is
/// left alone.
pub struct CreateDatabase;

#[async_trait]
impl OperationAction for CreateDatabase {
    async fn run(&self, config: &Config) -> Result<()> {
        let host = config.require_str("postgres.credentials.host")?;
        if !is_local(host) {
            bail!("refusing to create a database on remote host '{}'", host);
        }

        let database = config.require_str("postgres.database")?;
        let maintenance = config
            .get_str("postgres.maintenance_database")
            .unwrap_or("postgres");

        let options = connect_options(config, maintenance)?;
        let mut conn: PgConnection = options
            .connect()
            .await
            .with_context(|| format!("failed to connect to maintenance database '{}'", maintenance))?;

        let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM pg_database WHERE datname = $1")
            .bind(database)
            .fetch_optional(&mut conn)
            .await
            .context("failed to check for existing database")?;

        if exists.is_some() {
            debug!(database = %database, "database already exists");
        } else {
            info!(database = %database, "creating database");
            let stmt = format!("CREATE DATABASE {}", quote_ident(database));
            conn.execute(stmt.as_str())
                .await
                .with_context(|| format!("failed to create database '{}'", database))?;
        }

        conn.close().await.ok();
        Ok(())
    }
}

/// Creates the configured SQL schema inside the project database
pub struct CreateSchema;

#[async_trait]
impl OperationAction for CreateSchema {
    async fn run(&self, config: &Config) -> Result<()> {
        let database = config.require_str("postgres.database")?;
        let schema = config.require_str("postgres.schema")?;

        let options = connect_options(config, database)?;
        let mut conn: PgConnection = options
            .connect()
            .await
            .with_context(|| format!("failed to connect to database '{}'", database))?;

        let stmt = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema));
        conn.execute(stmt.as_str())
            .await
            .with_context(|| format!("failed to create schema '{}'", schema))?;
        info!(schema = %schema, database = %database, "schema ready");

        conn.close().await.ok();
        Ok(())
    }
}
