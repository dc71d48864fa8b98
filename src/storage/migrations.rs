//! kv_store 的 schema 版本管理
//!
//! 版本号保存在 SQLite 自带的 `user_version` 中。第 N 个步骤对应版本 N，
//! 每一步的 SQL 与版本号更新在同一个事务里提交，失败时整步回滚。

use rusqlite::{Connection, TransactionBehavior};

use crate::storage::{StorageError, StorageResult};

/// 按版本顺序排列的 `(名称, SQL)`
const STEPS: &[(&str, &str)] = &[(
    "键值存储表",
    r#"
    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
)];

/// 程序支持的 schema 版本
pub const CURRENT_SCHEMA_VERSION: u32 = STEPS.len() as u32;

/// 数据库当前的 schema 版本，新库为 0
pub fn schema_version(conn: &Connection) -> StorageResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// 把数据库升级到 `CURRENT_SCHEMA_VERSION`，返回升级前的版本
///
/// 由更新版本的程序创建的数据库会被拒绝，不做降级。
pub fn run_migrations(conn: &mut Connection) -> StorageResult<u32> {
    let found = schema_version(conn)?;
    if found > CURRENT_SCHEMA_VERSION {
        return Err(StorageError::Migration(format!(
            "数据库版本 {} 高于程序支持的 {}",
            found, CURRENT_SCHEMA_VERSION
        )));
    }

    for (version, &(name, sql)) in (1u32..).zip(STEPS).skip(found as usize) {
        tracing::info!(version, name, "applying schema migration");

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(sql).map_err(|e| {
            StorageError::Migration(format!("v{} ({}) 执行失败: {}", version, name, e))
        })?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
    }

    Ok(found)
}
