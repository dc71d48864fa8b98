use std::time::Duration;

use crate::error::{QuizError, QuizResult};
use crate::progress::ProgressState;
use crate::session::{
    AnswerOutcome, QuestionView, QuizController, Screen, SessionContext, SessionMode,
};
use crate::vocabulary::{QuestionRecord, VocabularyStore};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Presenting,
    Advancing { resolved: QuestionRecord },
}

/// 错题复习：按先进先出顺序出错题本队首，答对才出队
#[derive(Debug, Clone)]
pub struct ReviewSession {
    phase: Phase,
    advance_delay: Duration,
    exit_delay: Duration,
}

impl ReviewSession {
    pub fn new(advance_delay: Duration, exit_delay: Duration) -> Self {
        Self {
            phase: Phase::Presenting,
            advance_delay,
            exit_delay,
        }
    }

    /// 错题本已清空且没有待完成的过渡
    pub fn is_cleared(&self, progress: &ProgressState) -> bool {
        self.phase == Phase::Presenting && progress.mistakes().is_empty()
    }
}

impl QuizController for ReviewSession {
    fn mode(&self) -> SessionMode {
        SessionMode::Review
    }

    fn display(&self, _vocabulary: &VocabularyStore, progress: &ProgressState) -> Screen {
        match &self.phase {
            Phase::Advancing { resolved } => Screen::Question(QuestionView::of(resolved)),
            Phase::Presenting => match progress.review_head() {
                Some(head) => Screen::Question(QuestionView::of(head)),
                None => Screen::ReviewCleared {
                    exit_after: self.exit_delay,
                },
            },
        }
    }

    fn apply_answer(
        &mut self,
        ctx: &mut SessionContext<'_>,
        choice: &str,
    ) -> QuizResult<AnswerOutcome> {
        if self.is_pending() {
            return Err(QuizError::TransitionPending);
        }

        let head = ctx
            .progress
            .review_head()
            .cloned()
            .ok_or(QuizError::NoActiveQuestion)?;

        if !head.is_correct(choice) {
            return Ok(AnswerOutcome::incorrect(false));
        }

        if let Some(entry) = ctx.progress.resolve_review_head(ctx.now_ms) {
            tracing::debug!(
                id = head.id,
                history_id = entry.id,
                remaining = ctx.progress.mistakes().len(),
                "mistake corrected"
            );
        }
        self.phase = Phase::Advancing { resolved: head };
        Ok(AnswerOutcome::correct(true, self.advance_delay))
    }

    fn advance_display(
        &mut self,
        vocabulary: &VocabularyStore,
        progress: &ProgressState,
    ) -> Screen {
        self.phase = Phase::Presenting;
        self.display(vocabulary, progress)
    }

    fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Advancing { .. })
    }
}
