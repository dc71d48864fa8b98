//! 本地存储模块
//!
//! 进度以字符串键值对的形式保存在本地，支持：
//! - SQLite 持久化存储（`kv_store` 表，带版本迁移）
//! - 内存存储（测试与无磁盘场景）
//! - 进度状态的序列化网关，容忍缺失或损坏的数据

// ============================================================
// 子模块声明
// ============================================================

pub mod gateway;
pub mod memory;
pub mod migrations;
pub mod sqlite;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use gateway::{keys, NameChange, ProgressGateway};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

// ============================================================
// 错误类型定义
// ============================================================

/// 存储模块错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("迁移错误: {0}")]
    Migration(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("持久化数据损坏 ({key}): {reason}")]
    MalformedPersistedState { key: &'static str, reason: String },

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================
// KeyValueStore - 键值存储抽象
// ============================================================

/// 字符串键值存储
///
/// 写入是同步的，后写覆盖先写。
pub trait KeyValueStore {
    /// 读取键值，不存在时返回 None
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// 写入或覆盖键值
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// 批量写入
    ///
    /// 默认逐条写入；支持事务的后端应整体提交。
    fn set_items(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.set_item(key, value)?;
        }
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn set_items(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        (**self).set_items(entries)
    }
}
