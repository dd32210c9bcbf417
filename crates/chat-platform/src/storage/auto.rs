//! Pick the storage backend named by the configuration.
//!
//! `Auto` prefers `localStorage` and falls back to memory; an explicit
//! `LocalStorage` that cannot be opened also degrades to memory, since
//! persistence is best-effort.

use std::rc::Rc;
use chat_core::ports::StoragePort;
use chat_types::config::StorageBackendType;
use super::{LocalStorage, MemoryStorage};

/// Returns a trait object so callers are backend-agnostic.
pub fn auto_detect_storage(backend: &StorageBackendType) -> Rc<dyn StoragePort> {
    if *backend == StorageBackendType::Memory {
        log::info!("Storage backend: memory (configured)");
        return Rc::new(MemoryStorage::new());
    }

    match LocalStorage::open() {
        Ok(local) => {
            log::info!("Storage backend: localStorage");
            Rc::new(local)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryStorage::new())
        }
    }
}
