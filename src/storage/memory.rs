//! 内存键值存储
//!
//! 进程结束即丢失，用于测试和 `:memory:` 配置。

use std::collections::HashMap;
use std::sync::Mutex;

use crate::storage::{KeyValueStore, StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前所有键值的快照
    pub fn snapshot(&self) -> StorageResult<HashMap<String, String>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
