//! Storage layer: named slots in a durable key-value store.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Slot names as constants.
pub mod slots {
    pub const WORKOUTS: &str = "workouts";
}

/// A durable key-value store holding one string value per named slot.
pub trait SlotStorage: Send + Sync {
    /// Read a slot, `None` if it has never been written or was removed.
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Write a slot, overwriting any previous value.
    fn write(&self, slot: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a slot. Removing an absent slot is not an error.
    fn remove(&self, slot: &str) -> Result<(), StorageError>;
}

/// Errors from slot storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid slot name: {0:?}")]
    InvalidSlot(String),

    #[error("Failed to access slot {slot}: {source}")]
    Io {
        slot: String,
        #[source]
        source: std::io::Error,
    },
}
