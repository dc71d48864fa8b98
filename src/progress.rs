//! 学习进度
//!
//! 关卡、经验、错题本与订正记录。所有修改都经由这里的方法完成，
//! 以保证错题本 id 唯一、经验只按固定步长增长、关卡只前进。

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::rank::{self, RankTier};
use crate::vocabulary::QuestionRecord;

/// 顺序模式答对一题获得的经验
pub const XP_PER_CORRECT: u32 = 10;

/// 初始关卡
pub const INITIAL_STAGE: u32 = 1;

// ============================================================
// HistoryEntry - 订正记录
// ============================================================

/// 复习模式中订正成功的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 订正时间（毫秒时间戳），同时作为记录的唯一标识
    pub id: i64,
    #[serde(rename = "w")]
    pub prompt: String,
    #[serde(rename = "c")]
    pub correct_answer: String,
}

// ============================================================
// ProgressState - 进度状态
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    stage: u32,
    total_xp: u32,
    mistake_bank: VecDeque<QuestionRecord>,
    history_bank: VecDeque<HistoryEntry>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            stage: INITIAL_STAGE,
            total_xp: 0,
            mistake_bank: VecDeque::new(),
            history_bank: VecDeque::new(),
        }
    }
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由已校验的字段组装（仅供持久化网关使用）
    ///
    /// 错题本中重复的 id 只保留第一次出现的那条。
    pub(crate) fn from_parts(
        stage: u32,
        total_xp: u32,
        mistakes: Vec<QuestionRecord>,
        history: Vec<HistoryEntry>,
    ) -> Self {
        let mut state = Self {
            stage: stage.max(INITIAL_STAGE),
            total_xp,
            mistake_bank: VecDeque::with_capacity(mistakes.len()),
            history_bank: history.into(),
        };
        for question in &mistakes {
            state.record_mistake(question);
        }
        state
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn total_xp(&self) -> u32 {
        self.total_xp
    }

    pub fn level(&self) -> u32 {
        rank::level(self.total_xp)
    }

    pub fn xp_within_level(&self) -> u32 {
        rank::xp_within_level(self.total_xp)
    }

    pub fn rank(&self) -> RankTier {
        rank::rank(self.total_xp)
    }

    /// 错题本，按首次答错的顺序
    pub fn mistakes(&self) -> &VecDeque<QuestionRecord> {
        &self.mistake_bank
    }

    /// 订正记录，最新的在前
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history_bank
    }

    pub fn has_mistake(&self, id: u32) -> bool {
        self.mistake_bank.iter().any(|q| q.id == id)
    }

    // ========== 顺序模式 ==========

    /// 记录错题，按 id 幂等；返回是否新加入
    pub fn record_mistake(&mut self, question: &QuestionRecord) -> bool {
        if self.has_mistake(question.id) {
            return false;
        }
        self.mistake_bank.push_back(question.clone());
        true
    }

    /// 答对：经验 +10，关卡 +1
    pub fn award_correct(&mut self) {
        self.total_xp = self.total_xp.saturating_add(XP_PER_CORRECT);
        self.stage = self.stage.saturating_add(1);
    }

    /// "不知道"：记入错题本并前进一关，不加经验
    pub fn skip(&mut self, question: &QuestionRecord) -> bool {
        let inserted = self.record_mistake(question);
        self.stage = self.stage.saturating_add(1);
        inserted
    }

    // ========== 复习模式 ==========

    pub fn review_head(&self) -> Option<&QuestionRecord> {
        self.mistake_bank.front()
    }

    /// 订正错题本队首：出队并在订正记录最前面插入一条
    ///
    /// 同一毫秒内的多次订正会顺延 id，保证记录 id 唯一。
    pub fn resolve_review_head(&mut self, now_ms: i64) -> Option<HistoryEntry> {
        let head = self.mistake_bank.pop_front()?;
        let id = match self.history_bank.iter().map(|h| h.id).max() {
            Some(newest) if newest >= now_ms => newest.saturating_add(1),
            _ => now_ms,
        };
        let entry = HistoryEntry {
            id,
            prompt: head.prompt,
            correct_answer: head.correct_answer,
        };
        self.history_bank.push_front(entry.clone());
        Some(entry)
    }

    // ========== 订正记录管理 ==========

    /// 按 id 删除一条订正记录
    pub fn delete_history_entry(&mut self, id: i64) -> bool {
        let before = self.history_bank.len();
        self.history_bank.retain(|h| h.id != id);
        self.history_bank.len() != before
    }

    /// 清空订正记录，返回删除条数
    pub fn clear_history(&mut self) -> usize {
        let removed = self.history_bank.len();
        self.history_bank.clear();
        removed
    }
}
