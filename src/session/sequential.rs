use std::time::Duration;

use crate::error::{QuizError, QuizResult};
use crate::progress::ProgressState;
use crate::session::{
    AnswerOutcome, QuestionView, QuizController, Screen, SessionContext, SessionMode,
};
use crate::vocabulary::VocabularyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingAnswer,
    Advancing { answered: u32 },
}

/// 顺序闯关：始终出当前关卡 `stage` 对应的题目
#[derive(Debug, Clone)]
pub struct SequentialSession {
    phase: Phase,
    advance_delay: Duration,
}

impl SequentialSession {
    pub fn new(advance_delay: Duration) -> Self {
        Self {
            phase: Phase::AwaitingAnswer,
            advance_delay,
        }
    }
}

impl QuizController for SequentialSession {
    fn mode(&self) -> SessionMode {
        SessionMode::Sequential
    }

    fn display(&self, vocabulary: &VocabularyStore, progress: &ProgressState) -> Screen {
        let id = match self.phase {
            Phase::AwaitingAnswer => progress.stage(),
            Phase::Advancing { answered } => answered,
        };
        vocabulary
            .find_by_id(id)
            .map(|q| Screen::Question(QuestionView::of(q)))
            .unwrap_or(Screen::Idle)
    }

    fn apply_answer(
        &mut self,
        ctx: &mut SessionContext<'_>,
        choice: &str,
    ) -> QuizResult<AnswerOutcome> {
        if self.is_pending() {
            return Err(QuizError::TransitionPending);
        }

        let vocabulary = ctx.vocabulary;
        let question = vocabulary
            .find_by_id(ctx.progress.stage())
            .ok_or(QuizError::NoActiveQuestion)?;

        if question.is_correct(choice) {
            ctx.progress.award_correct();
            self.phase = Phase::Advancing {
                answered: question.id,
            };
            tracing::debug!(id = question.id, stage = ctx.progress.stage(), "correct answer");
            Ok(AnswerOutcome::correct(true, self.advance_delay))
        } else {
            let inserted = ctx.progress.record_mistake(question);
            tracing::debug!(id = question.id, inserted, "wrong answer");
            Ok(AnswerOutcome::incorrect(inserted))
        }
    }

    fn skip(&mut self, ctx: &mut SessionContext<'_>) -> QuizResult<AnswerOutcome> {
        if self.is_pending() {
            return Err(QuizError::TransitionPending);
        }

        let vocabulary = ctx.vocabulary;
        let question = vocabulary
            .find_by_id(ctx.progress.stage())
            .ok_or(QuizError::NoActiveQuestion)?;

        ctx.progress.skip(question);
        tracing::debug!(id = question.id, stage = ctx.progress.stage(), "question skipped");
        Ok(AnswerOutcome::incorrect(true))
    }

    fn advance_display(
        &mut self,
        vocabulary: &VocabularyStore,
        progress: &ProgressState,
    ) -> Screen {
        self.phase = Phase::AwaitingAnswer;
        self.display(vocabulary, progress)
    }

    fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Advancing { .. })
    }
}
