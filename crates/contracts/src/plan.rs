//! DispatchPlan - Config Loader output
//!
//! Describes the full dispatch-tier configuration: broker clusters, queue
//! bindings, and the two durability tiers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ClusterTag;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Full dispatch-tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchPlan {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Broker cluster settings
    pub broker: BrokerConfig,

    /// Logical queue subscriptions, one consumer each
    pub bindings: Vec<QueueBinding>,

    /// Preferred low-latency tier
    pub fast_store: StoreConfig,

    /// Fallback tier of record
    pub authoritative_store: StoreConfig,
}

/// Broker configuration: one endpoint per cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Master cluster endpoint
    pub master: ClusterEndpoint,

    /// Slave cluster endpoint
    pub slave: ClusterEndpoint,
}

impl BrokerConfig {
    /// Endpoint for a cluster
    pub fn endpoint(&self, cluster: ClusterTag) -> &ClusterEndpoint {
        match cluster {
            ClusterTag::Master => &self.master,
            ClusterTag::Slave => &self.slave,
        }
    }
}

/// One broker cluster endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterEndpoint {
    /// Broker host
    pub host: String,

    /// Broker port
    #[serde(default = "default_broker_port")]
    pub port: u16,

    /// Virtual host
    #[serde(default = "default_vhost")]
    pub vhost: String,
}

fn default_broker_port() -> u16 {
    5672
}

fn default_vhost() -> String {
    "/".to_string()
}

/// One logical queue subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueBinding {
    /// Application id
    pub app_id: String,

    /// Queue code consumed on both clusters
    pub queue_code: String,

    /// Callback endpoint key for dequeued messages
    pub callback_key: String,
}

/// Store tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store name
    pub name: String,

    /// Store type
    pub store_type: StoreType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Store type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Append-only file store
    File,
    /// Log-and-accept store (debugging)
    Log,
    /// Bounded in-memory store
    Memory,
}
