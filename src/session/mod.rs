//! 测验会话控制器
//!
//! 三种模式（顺序、复习、区间重玩）共用同一套接口。每次作答分两步：
//! `apply_answer` 同步修改进度并决定是否需要持久化，调用方在
//! `AnswerOutcome::advance_after` 指定的延迟之后再调用 `advance_display`
//! 切换到下一题的显示。

pub mod replay;
pub mod review;
pub mod sequential;

pub use replay::{ReplayRange, ReplaySession};
pub use review::ReviewSession;
pub use sequential::SequentialSession;

use std::time::Duration;

use serde::Serialize;

use crate::error::{QuizError, QuizResult};
use crate::progress::ProgressState;
use crate::vocabulary::{QuestionRecord, VocabularyStore};

// ============================================================
// 节奏配置
// ============================================================

/// 仅影响显示的延迟
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// 顺序/复习模式答对后切换下一题的延迟
    pub advance_delay: Duration,
    /// 重玩模式答对后切换下一题的延迟
    pub replay_delay: Duration,
    /// 错题本清空后自动退出复习的延迟
    pub review_exit_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            advance_delay: Duration::from_millis(600),
            replay_delay: Duration::from_millis(500),
            review_exit_delay: Duration::from_millis(1500),
        }
    }
}

// ============================================================
// 显示状态与作答结果
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionMode {
    Sequential,
    Review,
    Replay,
}

impl SessionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            SessionMode::Sequential => "sequential",
            SessionMode::Review => "review",
            SessionMode::Replay => "replay",
        }
    }
}

/// 一道题的展示内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    /// 进度标签，如重玩模式的 `Level 3 (1/5)`
    pub label: Option<String>,
}

impl QuestionView {
    pub fn of(question: &QuestionRecord) -> Self {
        Self {
            id: question.id,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// 当前应显示的内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Screen {
    Question(QuestionView),
    /// 顺序模式已没有当前关卡对应的题目
    Idle,
    /// 错题本已清空，`exit_after` 之后自动退出复习
    ReviewCleared { exit_after: Duration },
    /// 重玩队列全部答完
    ReplayComplete,
}

impl Screen {
    pub fn question(&self) -> Option<&QuestionView> {
        match self {
            Screen::Question(view) => Some(view),
            _ => None,
        }
    }
}

/// 一次作答（或跳过）的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// 进度是否被修改（需要持久化）
    pub progress_changed: bool,
    /// 需要在此延迟后调用 `advance_display`；None 表示显示已是最新
    pub advance_after: Option<Duration>,
}

impl AnswerOutcome {
    pub(crate) fn correct(progress_changed: bool, delay: Duration) -> Self {
        Self {
            correct: true,
            progress_changed,
            advance_after: Some(delay),
        }
    }

    pub(crate) fn incorrect(progress_changed: bool) -> Self {
        Self {
            correct: false,
            progress_changed,
            advance_after: None,
        }
    }
}

/// 修改性操作所需的上下文
pub struct SessionContext<'a> {
    pub vocabulary: &'a VocabularyStore,
    pub progress: &'a mut ProgressState,
    /// 当前时间（毫秒时间戳），用作订正记录 id
    pub now_ms: i64,
}

// ============================================================
// QuizController - 会话控制器接口
// ============================================================

pub trait QuizController {
    fn mode(&self) -> SessionMode;

    /// 当前应显示的内容
    fn display(&self, vocabulary: &VocabularyStore, progress: &ProgressState) -> Screen;

    /// 提交答案，同步完成所有状态修改
    fn apply_answer(
        &mut self,
        ctx: &mut SessionContext<'_>,
        choice: &str,
    ) -> QuizResult<AnswerOutcome>;

    /// "不知道"，默认不支持
    fn skip(&mut self, _ctx: &mut SessionContext<'_>) -> QuizResult<AnswerOutcome> {
        Err(QuizError::SkipUnsupported(self.mode().as_str()))
    }

    /// 完成答对后的显示切换
    fn advance_display(
        &mut self,
        vocabulary: &VocabularyStore,
        progress: &ProgressState,
    ) -> Screen;

    /// 是否正等待 `advance_display`
    fn is_pending(&self) -> bool;
}

// ============================================================
// Session - 当前激活的会话
// ============================================================

#[derive(Debug, Clone)]
pub enum Session {
    Sequential(SequentialSession),
    Review(ReviewSession),
    Replay(ReplaySession),
}

impl Session {
    fn controller(&self) -> &dyn QuizController {
        match self {
            Session::Sequential(s) => s,
            Session::Review(s) => s,
            Session::Replay(s) => s,
        }
    }

    fn controller_mut(&mut self) -> &mut dyn QuizController {
        match self {
            Session::Sequential(s) => s,
            Session::Review(s) => s,
            Session::Replay(s) => s,
        }
    }
}

impl QuizController for Session {
    fn mode(&self) -> SessionMode {
        self.controller().mode()
    }

    fn display(&self, vocabulary: &VocabularyStore, progress: &ProgressState) -> Screen {
        self.controller().display(vocabulary, progress)
    }

    fn apply_answer(
        &mut self,
        ctx: &mut SessionContext<'_>,
        choice: &str,
    ) -> QuizResult<AnswerOutcome> {
        self.controller_mut().apply_answer(ctx, choice)
    }

    fn skip(&mut self, ctx: &mut SessionContext<'_>) -> QuizResult<AnswerOutcome> {
        self.controller_mut().skip(ctx)
    }

    fn advance_display(
        &mut self,
        vocabulary: &VocabularyStore,
        progress: &ProgressState,
    ) -> Screen {
        self.controller_mut().advance_display(vocabulary, progress)
    }

    fn is_pending(&self) -> bool {
        self.controller().is_pending()
    }
}
