use anyhow::{Context, Result};
use opsrun::cli::output::{self, style};
use opsrun::cli::Cli;
use opsrun::core::config::ConfigStore;
use opsrun::execution::runner::{RunEvent, Runner};
use opsrun::ops;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const RUN_LOG: &str = "run.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Listing mode prints and exits before any logging or config I/O
    let registry = ops::builtin_registry()?;
    let mut runner = Runner::new(registry);

    if cli.list {
        list_operations(&runner, cli.json)?;
        return Ok(());
    }

    init_logging(cli.verbose, cli.quiet)?;

    // defaults first, then the local override, then any --config extras
    let mut store = ConfigStore::discover(&["project", "local"]);
    for layer in &cli.config {
        store.push_layer(layer);
    }
    let config = store.load().context("failed to load configuration")?;

    // Ctrl-C lets the running operation finish, then skips the rest
    let cancel = runner.cancellation_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("cancellation requested; finishing the current operation");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let progress = (!cli.json).then(|| output::create_progress_bar(0));
    if let Some(pb) = &progress {
        let pb = pb.clone();
        runner.add_event_handler(move |event| {
            match event {
                RunEvent::RunStarted { plan, .. } => pb.set_length(plan.len() as u64),
                RunEvent::OperationStarted { name, .. } => pb.set_message(name.clone()),
                RunEvent::OperationSucceeded { .. }
                | RunEvent::OperationFailed { .. }
                | RunEvent::OperationSkipped { .. } => pb.inc(1),
                RunEvent::RunCompleted { .. } => {}
            }
            pb.println(output::format_run_event(event));
        });
    }

    let report = runner.run(&cli.request(), &config).await?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", output::format_report(&report));
    }

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn list_operations(runner: &Runner, json: bool) -> Result<()> {
    if json {
        let entries: Vec<_> = runner
            .list()
            .into_iter()
            .map(|(name, description)| {
                serde_json::json!({ "name": name, "description": description })
            })
            .collect();
        let data = serde_json::json!({ "operations": entries });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        for (name, description) in runner.list() {
            println!("{:<24} {}", style(name).bold(), description);
        }
    }
    Ok(())
}

fn init_logging(verbose: u8, quiet: u8) -> Result<()> {
    // keep the previous run's log around, the way the original tooling did
    if Path::new(RUN_LOG).exists() {
        std::fs::rename(RUN_LOG, format!("{}.0", RUN_LOG)).context("failed to rotate run.log")?;
    }
    let file = std::fs::File::create(RUN_LOG).context("failed to open run.log")?;

    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_level(verbose, quiet)));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(stderr_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .with_filter(LevelFilter::INFO),
        )
        .init();
    Ok(())
}

/// Map `-v`/`-q` counts to a default level: WARN, raised toward TRACE or
/// lowered toward ERROR
fn verbosity_level(verbose: u8, quiet: u8) -> &'static str {
    let level = 1 + i16::from(verbose) - i16::from(quiet);
    match level.clamp(0, 4) {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}
