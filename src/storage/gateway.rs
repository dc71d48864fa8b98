//! 进度持久化网关
//!
//! 把 `ProgressState` 写入字符串键值存储并读回。读取时任一字段缺失或损坏
//! 都按字段替换为默认值，只记录警告，不向调用方报错。

use serde::de::DeserializeOwned;

use crate::progress::{HistoryEntry, ProgressState, INITIAL_STAGE};
use crate::storage::{KeyValueStore, StorageError, StorageResult};
use crate::vocabulary::QuestionRecord;

/// 存储键名
pub mod keys {
    pub const STAGE: &str = "userStage";
    pub const TOTAL_XP: &str = "totalXP";
    pub const MISTAKE_BANK: &str = "mistakeBank";
    pub const HISTORY_BANK: &str = "historyBank";
    pub const USER_NAME: &str = "userName";
}

/// 修改用户名的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameChange {
    /// 新名字与已保存的相同，什么都没做
    Unchanged,
    /// 调用方拒绝确认，名字和进度都未改变
    Declined,
    /// 名字已更新，进度已重置
    Reset,
}

pub struct ProgressGateway<S> {
    store: S,
}

impl<S: KeyValueStore> ProgressGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 写入完整进度
    pub fn save(&self, state: &ProgressState) -> StorageResult<()> {
        self.store.set_items(&progress_entries(state)?)
    }

    /// 读取进度，缺失或损坏的字段使用默认值
    pub fn load(&self) -> ProgressState {
        let stage = self
            .read(keys::STAGE, parse_stage)
            .unwrap_or(INITIAL_STAGE);
        let total_xp = self.read(keys::TOTAL_XP, parse_xp).unwrap_or(0);
        let mistakes: Vec<QuestionRecord> = self
            .read(keys::MISTAKE_BANK, |raw| parse_json(keys::MISTAKE_BANK, raw))
            .unwrap_or_default();
        let history: Vec<HistoryEntry> = self
            .read(keys::HISTORY_BANK, |raw| parse_json(keys::HISTORY_BANK, raw))
            .unwrap_or_default();

        let state = ProgressState::from_parts(stage, total_xp, mistakes, history);
        tracing::debug!(
            stage = state.stage(),
            total_xp = state.total_xp(),
            mistakes = state.mistakes().len(),
            history = state.history().len(),
            "progress loaded"
        );
        state
    }

    /// 读取并解析单个字段；键不存在返回 None，读取或解析失败记录警告后返回 None
    fn read<T>(
        &self,
        key: &'static str,
        parse: impl FnOnce(&str) -> StorageResult<T>,
    ) -> Option<T> {
        let raw = match self.store.get_item(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read persisted value, using default");
                return None;
            }
        };

        match parse(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "malformed persisted value, using default");
                None
            }
        }
    }

    // ========== 用户名 ==========

    /// 已保存的显示名
    pub fn user_name(&self) -> StorageResult<Option<String>> {
        self.store.get_item(keys::USER_NAME)
    }

    /// 修改显示名
    ///
    /// 新名字与已保存的不同时，需要 `confirm` 返回 true 才会保存新名字并
    /// 重置全部进度；拒绝时不做任何修改。
    pub fn change_user_name(
        &self,
        state: &mut ProgressState,
        new_name: &str,
        confirm: impl FnOnce() -> bool,
    ) -> StorageResult<NameChange> {
        let current = self.user_name()?;
        if current.as_deref() == Some(new_name) {
            return Ok(NameChange::Unchanged);
        }

        if !confirm() {
            tracing::debug!("user name change declined");
            return Ok(NameChange::Declined);
        }

        // 名字与重置后的进度同批写入，名字排在最后
        let reset = ProgressState::default();
        let mut entries = progress_entries(&reset)?;
        entries.push((keys::USER_NAME, new_name.to_string()));
        self.store.set_items(&entries)?;

        *state = reset;
        tracing::info!(user_name = new_name, "user name changed, progress reset");
        Ok(NameChange::Reset)
    }
}

fn progress_entries(state: &ProgressState) -> StorageResult<Vec<(&'static str, String)>> {
    let mistakes = serde_json::to_string(state.mistakes())
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let history = serde_json::to_string(state.history())
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    Ok(vec![
        (keys::STAGE, state.stage().to_string()),
        (keys::TOTAL_XP, state.total_xp().to_string()),
        (keys::MISTAKE_BANK, mistakes),
        (keys::HISTORY_BANK, history),
    ])
}

fn parse_stage(raw: &str) -> StorageResult<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|stage| *stage >= INITIAL_STAGE)
        .ok_or_else(|| StorageError::MalformedPersistedState {
            key: keys::STAGE,
            reason: format!("不是正整数: {:?}", raw),
        })
}

fn parse_xp(raw: &str) -> StorageResult<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| StorageError::MalformedPersistedState {
            key: keys::TOTAL_XP,
            reason: format!("不是非负整数: {:?}", raw),
        })
}

fn parse_json<T: DeserializeOwned>(key: &'static str, raw: &str) -> StorageResult<T> {
    serde_json::from_str(raw).map_err(|e| StorageError::MalformedPersistedState {
        key,
        reason: e.to_string(),
    })
}
