//! Configuration validation
//!
//! Rules:
//! - at least one binding
//! - binding fields non-empty, (app_id, queue_code) unique
//! - endpoint hosts non-empty, ports non-zero
//! - store names non-empty and distinct between tiers
//! - file stores carry a path param

use std::collections::HashSet;

use contracts::{ClusterTag, ContractError, DispatchPlan, StoreConfig, StoreType};

/// Validate a DispatchPlan
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(plan: &DispatchPlan) -> Result<(), ContractError> {
    validate_broker(plan)?;
    validate_bindings(plan)?;
    validate_stores(plan)?;
    Ok(())
}

/// Validate cluster endpoints
fn validate_broker(plan: &DispatchPlan) -> Result<(), ContractError> {
    for cluster in [ClusterTag::Master, ClusterTag::Slave] {
        let endpoint = plan.broker.endpoint(cluster);
        if endpoint.host.is_empty() {
            return Err(ContractError::config_validation(
                format!("broker.{cluster}.host"),
                "host cannot be empty",
            ));
        }
        if endpoint.port == 0 {
            return Err(ContractError::config_validation(
                format!("broker.{cluster}.port"),
                "port cannot be 0",
            ));
        }
    }
    Ok(())
}

/// Validate queue bindings
fn validate_bindings(plan: &DispatchPlan) -> Result<(), ContractError> {
    if plan.bindings.is_empty() {
        return Err(ContractError::config_validation(
            "bindings",
            "at least one binding is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, binding) in plan.bindings.iter().enumerate() {
        for (field, value) in [
            ("app_id", &binding.app_id),
            ("queue_code", &binding.queue_code),
            ("callback_key", &binding.callback_key),
        ] {
            if value.is_empty() {
                return Err(ContractError::config_validation(
                    format!("bindings[{idx}].{field}"),
                    format!("{field} cannot be empty"),
                ));
            }
        }

        if !seen.insert((binding.app_id.as_str(), binding.queue_code.as_str())) {
            return Err(ContractError::config_validation(
                format!("bindings[{idx}]"),
                format!(
                    "duplicate binding for app '{}' queue '{}'",
                    binding.app_id, binding.queue_code
                ),
            ));
        }
    }
    Ok(())
}

/// Validate the two store tiers
fn validate_stores(plan: &DispatchPlan) -> Result<(), ContractError> {
    validate_store("fast_store", &plan.fast_store)?;
    validate_store("authoritative_store", &plan.authoritative_store)?;

    if plan.fast_store.name == plan.authoritative_store.name {
        return Err(ContractError::config_validation(
            "authoritative_store.name",
            format!(
                "store name '{}' is already used by the fast tier",
                plan.authoritative_store.name
            ),
        ));
    }
    Ok(())
}

fn validate_store(field: &str, config: &StoreConfig) -> Result<(), ContractError> {
    if config.name.is_empty() {
        return Err(ContractError::config_validation(
            format!("{field}.name"),
            "store name cannot be empty",
        ));
    }

    if config.store_type == StoreType::File && !config.params.contains_key("path") {
        return Err(ContractError::config_validation(
            format!("{field}.params.path"),
            "file store requires a path param",
        ));
    }
    Ok(())
}
