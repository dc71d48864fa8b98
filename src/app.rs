//! 应用上下文
//!
//! `QuizApp` 独占词库、进度、持久化网关和当前会话，是界面层唯一的入口。
//! 每次修改进度后都会在返回前同步写回存储。

use std::collections::VecDeque;

use serde::Serialize;

use crate::error::QuizResult;
use crate::progress::{HistoryEntry, ProgressState};
use crate::rank::RankTier;
use crate::session::{
    AnswerOutcome, Pacing, QuizController, ReplayRange, ReplaySession, ReviewSession, Screen,
    SequentialSession, Session, SessionContext, SessionMode,
};
use crate::storage::{KeyValueStore, NameChange, ProgressGateway};
use crate::vocabulary::{QuestionRecord, VocabularyStore};

/// 状态面板数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub user_name: Option<String>,
    pub stage: u32,
    pub total_xp: u32,
    pub level: u32,
    pub xp_within_level: u32,
    pub rank: RankTier,
    pub rank_name: &'static str,
    pub rank_code: &'static str,
    pub mistake_count: usize,
    pub history_count: usize,
}

pub struct QuizApp<S> {
    vocabulary: VocabularyStore,
    progress: ProgressState,
    gateway: ProgressGateway<S>,
    session: Session,
    pacing: Pacing,
}

impl<S: KeyValueStore> QuizApp<S> {
    /// 从存储加载进度并进入顺序模式
    pub fn new(vocabulary: VocabularyStore, store: S, pacing: Pacing) -> Self {
        let gateway = ProgressGateway::new(store);
        let progress = gateway.load();
        tracing::info!(
            stage = progress.stage(),
            total_xp = progress.total_xp(),
            questions = vocabulary.len(),
            "quiz session ready"
        );

        Self {
            vocabulary,
            progress,
            gateway,
            session: Session::Sequential(SequentialSession::new(pacing.advance_delay)),
            pacing,
        }
    }

    pub fn vocabulary(&self) -> &VocabularyStore {
        &self.vocabulary
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn gateway(&self) -> &ProgressGateway<S> {
        &self.gateway
    }

    pub fn mode(&self) -> SessionMode {
        self.session.mode()
    }

    pub fn summary(&self) -> ProgressSummary {
        let user_name = self.gateway.user_name().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read user name");
            None
        });
        let rank = self.progress.rank();

        ProgressSummary {
            user_name,
            stage: self.progress.stage(),
            total_xp: self.progress.total_xp(),
            level: self.progress.level(),
            xp_within_level: self.progress.xp_within_level(),
            rank,
            rank_name: rank.name(),
            rank_code: rank.code(),
            mistake_count: self.progress.mistakes().len(),
            history_count: self.progress.history().len(),
        }
    }

    pub fn current_display(&self) -> Screen {
        self.session.display(&self.vocabulary, &self.progress)
    }

    // ============================================================
    // 作答
    // ============================================================

    /// 向当前会话提交答案
    pub fn submit_answer(&mut self, choice: &str) -> QuizResult<AnswerOutcome> {
        let mut ctx = SessionContext {
            vocabulary: &self.vocabulary,
            progress: &mut self.progress,
            now_ms: chrono::Utc::now().timestamp_millis(),
        };
        let outcome = self.session.apply_answer(&mut ctx, choice)?;
        self.commit(outcome)
    }

    /// "不知道"，仅顺序模式支持
    pub fn skip_current(&mut self) -> QuizResult<AnswerOutcome> {
        let mut ctx = SessionContext {
            vocabulary: &self.vocabulary,
            progress: &mut self.progress,
            now_ms: chrono::Utc::now().timestamp_millis(),
        };
        let outcome = self.session.skip(&mut ctx)?;
        self.commit(outcome)
    }

    /// 持久化作答结果
    ///
    /// 写入失败时调用方拿不到 `advance_after`，因此这里直接完成挂起的显示切换，
    /// 会话不会停在过渡状态。内存中的进度保留，下一次成功写入会一并落盘。
    fn commit(&mut self, outcome: AnswerOutcome) -> QuizResult<AnswerOutcome> {
        if !outcome.progress_changed {
            return Ok(outcome);
        }

        if let Err(err) = self.persist() {
            tracing::error!(error = %err, "failed to persist progress");
            if outcome.advance_after.is_some() {
                self.session.advance_display(&self.vocabulary, &self.progress);
            }
            return Err(err);
        }
        Ok(outcome)
    }

    /// 执行调用方排定的显示切换
    ///
    /// 复习模式下错题本已清空时，再次调用即自动退出复习。
    pub fn advance_display(&mut self) -> Screen {
        if let Session::Review(review) = &self.session {
            if review.is_cleared(&self.progress) {
                return self.exit_review();
            }
        }
        self.session.advance_display(&self.vocabulary, &self.progress)
    }

    // ============================================================
    // 模式切换
    // ============================================================

    pub fn start_review(&mut self) -> Screen {
        tracing::debug!(mistakes = self.progress.mistakes().len(), "review started");
        self.session = Session::Review(ReviewSession::new(
            self.pacing.advance_delay,
            self.pacing.review_exit_delay,
        ));
        self.current_display()
    }

    /// 退出复习回到顺序模式；不在复习模式时不做任何事
    pub fn exit_review(&mut self) -> Screen {
        if self.mode() == SessionMode::Review {
            self.enter_sequential();
        }
        self.current_display()
    }

    /// 开始区间重玩；范围无效时当前会话保持不变
    pub fn start_replay(&mut self, from: i64, to: i64) -> QuizResult<Screen> {
        let range = ReplayRange::new(from, to)?;
        self.start_replay_range(range)
    }

    /// 以用户输入的文本开始区间重玩
    pub fn start_replay_text(&mut self, from: &str, to: &str) -> QuizResult<Screen> {
        let range = ReplayRange::parse(from, to)?;
        self.start_replay_range(range)
    }

    fn start_replay_range(&mut self, range: ReplayRange) -> QuizResult<Screen> {
        let session = ReplaySession::start(&self.vocabulary, range, self.pacing.replay_delay)?;
        self.session = Session::Replay(session);
        Ok(self.current_display())
    }

    /// 退出重玩，丢弃当前位置
    pub fn exit_replay(&mut self) -> Screen {
        if self.mode() == SessionMode::Replay {
            self.enter_sequential();
        }
        self.current_display()
    }

    fn enter_sequential(&mut self) {
        self.session = Session::Sequential(SequentialSession::new(self.pacing.advance_delay));
    }

    // ============================================================
    // 错题本与订正记录
    // ============================================================

    pub fn mistakes(&self) -> &VecDeque<QuestionRecord> {
        self.progress.mistakes()
    }

    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        self.progress.history()
    }

    /// 按 id 删除订正记录，返回是否删除
    pub fn delete_history_entry(&mut self, id: i64) -> QuizResult<bool> {
        let removed = self.progress.delete_history_entry(id);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// 清空订正记录，需要调用方确认；返回删除条数
    pub fn clear_all_history(&mut self, confirm: impl FnOnce() -> bool) -> QuizResult<usize> {
        if !confirm() {
            return Ok(0);
        }
        let removed = self.progress.clear_history();
        self.persist()?;
        tracing::info!(removed, "history cleared");
        Ok(removed)
    }

    // ============================================================
    // 用户名与搜索
    // ============================================================

    /// 修改用户名；确认后重置全部进度并回到顺序模式
    pub fn change_username(
        &mut self,
        new_name: &str,
        confirm: impl FnOnce() -> bool,
    ) -> QuizResult<NameChange> {
        let change = self
            .gateway
            .change_user_name(&mut self.progress, new_name, confirm)?;
        if change == NameChange::Reset {
            self.enter_sequential();
        }
        Ok(change)
    }

    pub fn search_vocabulary(&self, query: &str) -> Vec<&QuestionRecord> {
        self.vocabulary.search(query)
    }

    fn persist(&self) -> QuizResult<()> {
        self.gateway.save(&self.progress)?;
        Ok(())
    }
}
