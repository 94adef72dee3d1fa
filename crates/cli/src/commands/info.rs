//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    broker: BrokerInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bindings: Vec<BindingInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stores: Vec<StoreInfo>,
}

#[derive(Serialize)]
struct BrokerInfo {
    master: String,
    slave: String,
}

#[derive(Serialize)]
struct BindingInfo {
    app_id: String,
    queue_code: String,
    callback_key: String,
}

#[derive(Serialize)]
struct StoreInfo {
    tier: String,
    name: String,
    store_type: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let plan = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&plan, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&plan, args);
    }

    Ok(())
}

fn build_config_info(plan: &contracts::DispatchPlan, args: &InfoArgs) -> ConfigInfo {
    let bindings = if args.bindings {
        plan.bindings
            .iter()
            .map(|b| BindingInfo {
                app_id: b.app_id.clone(),
                queue_code: b.queue_code.clone(),
                callback_key: b.callback_key.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let stores = if args.stores {
        vec![
            StoreInfo {
                tier: "fast".to_string(),
                name: plan.fast_store.name.clone(),
                store_type: format!("{:?}", plan.fast_store.store_type),
                params: plan.fast_store.params.clone(),
            },
            StoreInfo {
                tier: "authoritative".to_string(),
                name: plan.authoritative_store.name.clone(),
                store_type: format!("{:?}", plan.authoritative_store.store_type),
                params: plan.authoritative_store.params.clone(),
            },
        ]
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", plan.version),
        broker: BrokerInfo {
            master: format!("{}:{}", plan.broker.master.host, plan.broker.master.port),
            slave: format!("{}:{}", plan.broker.slave.host, plan.broker.slave.port),
        },
        bindings,
        stores,
    }
}

fn print_config_info(plan: &contracts::DispatchPlan, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               MQ Dispatcher Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Broker info
    println!("🐇 Broker Clusters");
    println!("   ├─ Version: {:?}", plan.version);
    println!(
        "   ├─ Master: {}:{} (vhost {})",
        plan.broker.master.host, plan.broker.master.port, plan.broker.master.vhost
    );
    println!(
        "   └─ Slave: {}:{} (vhost {})",
        plan.broker.slave.host, plan.broker.slave.port, plan.broker.slave.vhost
    );

    // Bindings
    println!("\n📬 Bindings ({})", plan.bindings.len());
    for (i, binding) in plan.bindings.iter().enumerate() {
        let is_last = i == plan.bindings.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };

        if args.bindings {
            println!(
                "   {} {}/{} -> callback '{}'",
                prefix, binding.app_id, binding.queue_code, binding.callback_key
            );
        } else {
            println!("   {} {}/{}", prefix, binding.app_id, binding.queue_code);
        }
    }

    // Stores
    println!("\n💾 Stores");
    if args.stores && !plan.fast_store.params.is_empty() {
        println!(
            "   ├─ Fast: {} ({:?}, params {:?})",
            plan.fast_store.name, plan.fast_store.store_type, plan.fast_store.params
        );
    } else {
        println!(
            "   ├─ Fast: {} ({:?})",
            plan.fast_store.name, plan.fast_store.store_type
        );
    }
    if args.stores && !plan.authoritative_store.params.is_empty() {
        println!(
            "   └─ Authoritative: {} ({:?}, params {:?})",
            plan.authoritative_store.name,
            plan.authoritative_store.store_type,
            plan.authoritative_store.params
        );
    } else {
        println!(
            "   └─ Authoritative: {} ({:?})",
            plan.authoritative_store.name, plan.authoritative_store.store_type
        );
    }

    println!();
}
