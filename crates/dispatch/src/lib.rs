//! # Dispatch
//!
//! Tiered-durability write path.
//!
//! Responsibilities:
//! - Accept one `Message` at a time from the ingress side
//! - Write to the fast store, fall back to the authoritative store
//! - Return a single boolean verdict, never a storage error

pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod stores;

pub use contracts::{Message, MessageStore};
pub use error::DispatchError;
pub use metrics::{PipelineMetrics, PipelineSnapshot};
pub use pipeline::{create_pipeline, DispatchPipeline};
pub use stores::{create_store, AnyStore, FileStore, LogStore, MemoryStore};
