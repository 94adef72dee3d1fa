//! MessageStore trait - durability tier interface
//!
//! Defines the abstract interface for the fast and authoritative stores.

use crate::{ContractError, Message};

/// Durable write trait
///
/// Both durability tiers implement this trait. A write reports ordinary
/// rejection by returning `Ok(false)` (capacity, backpressure); `Err` is
/// reserved for infrastructure failure inside the store.
#[trait_variant::make(MessageStore: Send)]
pub trait LocalMessageStore {
    /// Store name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one message
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&self, message: &Message) -> Result<bool, ContractError>;
}
