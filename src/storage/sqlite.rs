//! SQLite 键值存储
//!
//! 单表 `kv_store(key, value, updated_at)`，打开时自动运行迁移。

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};

use crate::storage::{migrations, KeyValueStore, StorageError, StorageResult};

/// SQLite 键值存储
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// 打开（必要时创建）数据库文件
    ///
    /// 启用 WAL 模式并运行迁移，父目录不存在时会先创建。
    pub fn new<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let connection = Connection::open(path)?;
        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;

        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize()?;

        tracing::debug!(path = %path.display(), "sqlite store opened");
        Ok(store)
    }

    /// 创建内存数据库（用于测试）
    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;

        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize()?;

        Ok(store)
    }

    /// 运行迁移
    pub fn initialize(&self) -> StorageResult<()> {
        let mut conn = self.get_connection()?;
        migrations::run_migrations(&mut conn)?;
        Ok(())
    }

    /// 获取数据库连接的锁
    pub fn get_connection(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }

    /// 执行事务
    pub fn transaction<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let mut conn = self.get_connection()?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }

    fn upsert(conn: &Connection, key: &str, value: &str) -> StorageResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.get_connection()?;

        let result = conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.get_connection()?;
        Self::upsert(&conn, key, value)
    }

    fn set_items(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        self.transaction(|conn| {
            for (key, value) in entries {
                Self::upsert(conn, key, value)?;
            }
            Ok(())
        })
    }
}
