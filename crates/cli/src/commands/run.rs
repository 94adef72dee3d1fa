//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let plan = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        master = %plan.broker.master.host,
        slave = %plan.broker.slave.host,
        bindings = plan.bindings.len(),
        fast_store = %plan.fast_store.name,
        authoritative_store = %plan.authoritative_store.name,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&plan);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        plan,
        message_count: args.message_count,
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        messages_dispatched = stats.messages_dispatched,
                        deliveries_acked = stats.deliveries_acked,
                        duration_secs = stats.duration.as_secs_f64(),
                        throughput = format!("{:.2}", stats.throughput()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("MQ Dispatcher finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(plan: &contracts::DispatchPlan) {
    println!("\n=== Configuration Summary ===\n");
    println!("Broker clusters:");
    println!(
        "  master: {}:{}",
        plan.broker.master.host, plan.broker.master.port
    );
    println!(
        "  slave:  {}:{}",
        plan.broker.slave.host, plan.broker.slave.port
    );

    println!("\nBindings ({}):", plan.bindings.len());
    for binding in &plan.bindings {
        println!(
            "  - {}/{} -> {}",
            binding.app_id, binding.queue_code, binding.callback_key
        );
    }

    println!("\nStores:");
    println!(
        "  fast:          {} ({:?})",
        plan.fast_store.name, plan.fast_store.store_type
    );
    println!(
        "  authoritative: {} ({:?})",
        plan.authoritative_store.name, plan.authoritative_store.store_type
    );

    println!();
}
