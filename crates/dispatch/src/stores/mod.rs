//! Store implementations
//!
//! Contains FileStore, LogStore, and MemoryStore, plus config-driven
//! construction.

mod file;
mod log;
mod memory;

pub use self::file::FileStore;
pub use self::log::LogStore;
pub use self::memory::MemoryStore;

use contracts::{ContractError, Message, MessageStore, StoreConfig, StoreType};
use tracing::instrument;

use crate::error::DispatchError;

/// A store of any configured type
pub enum AnyStore {
    File(FileStore),
    Log(LogStore),
    Memory(MemoryStore),
}

impl MessageStore for AnyStore {
    fn name(&self) -> &str {
        match self {
            AnyStore::File(store) => store.name(),
            AnyStore::Log(store) => store.name(),
            AnyStore::Memory(store) => store.name(),
        }
    }

    async fn write(&self, message: &Message) -> Result<bool, ContractError> {
        match self {
            AnyStore::File(store) => store.write(message).await,
            AnyStore::Log(store) => store.write(message).await,
            AnyStore::Memory(store) => store.write(message).await,
        }
    }
}

/// Create a store from configuration
#[instrument(
    name = "dispatch_create_store",
    skip(config),
    fields(store = %config.name, store_type = ?config.store_type)
)]
pub fn create_store(config: &StoreConfig) -> Result<AnyStore, DispatchError> {
    match config.store_type {
        StoreType::File => {
            let store = FileStore::from_params(&config.name, &config.params)
                .map_err(|e| DispatchError::store_creation(&config.name, e.to_string()))?;
            Ok(AnyStore::File(store))
        }
        StoreType::Log => Ok(AnyStore::Log(LogStore::new(&config.name))),
        StoreType::Memory => Ok(AnyStore::Memory(MemoryStore::from_params(
            &config.name,
            &config.params,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn file_store_requires_path() {
        let config = StoreConfig {
            name: "filedb".into(),
            store_type: StoreType::File,
            params: HashMap::new(),
        };

        let result = create_store(&config);
        assert!(matches!(result, Err(DispatchError::StoreCreation { .. })));
    }

    #[test]
    fn log_and_memory_need_no_params() {
        for store_type in [StoreType::Log, StoreType::Memory] {
            let config = StoreConfig {
                name: "tier".into(),
                store_type,
                params: HashMap::new(),
            };
            assert!(create_store(&config).is_ok());
        }
    }
}
