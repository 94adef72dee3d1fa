//! FileStore - append-only JSON-lines store

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use contracts::{ContractError, Message, MessageStore};
use tracing::{debug, error, instrument};

/// Configuration for FileStore
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Target file path
    pub path: PathBuf,

    /// Capacity in bytes, 0 = unlimited
    ///
    /// A write that would grow the file past this limit is rejected with
    /// `Ok(false)`, the ordinary fast-tier rejection.
    pub max_bytes: u64,
}

impl FileStoreConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .ok_or_else(|| ContractError::config_validation("params.path", "path is required"))?;

        let max_bytes = match params.get("max_bytes") {
            Some(raw) => raw.parse().map_err(|_| {
                ContractError::config_validation(
                    "params.max_bytes",
                    format!("not a byte count: {raw}"),
                )
            })?,
            None => 0,
        };

        Ok(Self { path, max_bytes })
    }
}

/// Store that appends messages as JSON lines
pub struct FileStore {
    name: String,
    config: FileStoreConfig,
    file: Mutex<File>,
    bytes_written: AtomicU64,
}

impl FileStore {
    /// Create a new FileStore
    pub fn new(name: impl Into<String>, config: FileStoreConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;
        let existing = file.metadata()?.len();

        Ok(Self {
            name: name.into(),
            config,
            file: Mutex::new(file),
            bytes_written: AtomicU64::new(existing),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let config = FileStoreConfig::from_params(params)?;
        Ok(Self::new(name, config)?)
    }

    /// Bytes currently on disk
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    fn append_line(&self, line: &[u8]) -> std::io::Result<()> {
        let mut file = self.file.lock().unwrap();
        file.write_all(line)?;
        file.write_all(b"\n")?;
        file.flush()
    }
}

impl MessageStore for FileStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_store_write",
        skip(self, message),
        fields(store = %self.name, message_id = %message.id)
    )]
    async fn write(&self, message: &Message) -> Result<bool, ContractError> {
        let line = serde_json::to_vec(message)
            .map_err(|e| ContractError::store_write(&self.name, e.to_string()))?;

        let projected = self.bytes_written() + line.len() as u64 + 1;
        if self.config.max_bytes > 0 && projected > self.config.max_bytes {
            debug!(
                store = %self.name,
                projected,
                max_bytes = self.config.max_bytes,
                "capacity reached, rejecting write"
            );
            return Ok(false);
        }

        self.append_line(&line).map_err(|e| {
            error!(store = %self.name, message_id = %message.id, error = %e, "write failed");
            ContractError::store_write(&self.name, e.to_string())
        })?;

        self.bytes_written
            .fetch_add(line.len() as u64 + 1, Ordering::Relaxed);
        Ok(true)
    }
}
