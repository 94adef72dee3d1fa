//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    master_host: String,
    slave_host: String,
    binding_count: usize,
    fast_store: String,
    authoritative_store: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(plan) => {
            let warnings = collect_warnings(&plan);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", plan.version),
                    master_host: plan.broker.master.host.clone(),
                    slave_host: plan.broker.slave.host.clone(),
                    binding_count: plan.bindings.len(),
                    fast_store: plan.fast_store.name.clone(),
                    authoritative_store: plan.authoritative_store.name.clone(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(plan: &contracts::DispatchPlan) -> Vec<String> {
    use contracts::StoreType;

    let mut warnings = Vec::new();

    // A log-tier fast store accepts everything and persists nothing
    if plan.fast_store.store_type == StoreType::Log {
        warnings.push("fast_store is a log store - writes are not durable".to_string());
    }

    if plan.authoritative_store.store_type == StoreType::Memory {
        warnings
            .push("authoritative_store is in-memory - fallback writes vanish on restart".to_string());
    }

    // Both clusters on the same endpoint defeats the redundancy
    if plan.broker.master.host == plan.broker.slave.host
        && plan.broker.master.port == plan.broker.slave.port
    {
        warnings.push(format!(
            "master and slave clusters share endpoint {}:{}",
            plan.broker.master.host, plan.broker.master.port
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Master: {}", summary.master_host);
            println!("  Slave: {}", summary.slave_host);
            println!("  Bindings: {}", summary.binding_count);
            println!("  Fast store: {}", summary.fast_store);
            println!("  Authoritative store: {}", summary.authoritative_store);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
