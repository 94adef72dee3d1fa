//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - Delivery tags are channel-scoped: a tag is only meaningful on the
//!   channel that issued it
//! - The cluster-origin tag travels on the delivery itself

mod callback;
mod channel;
mod cluster;
mod delivery;
mod error;
mod message;
mod plan;
mod store;

pub use callback::{CallbackDispatcher, CallbackMessage};
pub use channel::{ClusterChannel, ShutdownCallback};
pub use cluster::ClusterTag;
pub use delivery::{DeliveryCallback, RawDelivery};
pub use error::*;
pub use message::Message;
pub use plan::*;
pub use store::*;
