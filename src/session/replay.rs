use std::time::Duration;

use crate::error::{QuizError, QuizResult};
use crate::progress::ProgressState;
use crate::session::{
    AnswerOutcome, QuestionView, QuizController, Screen, SessionContext, SessionMode,
};
use crate::vocabulary::{QuestionRecord, VocabularyStore};

/// 重玩区间 `[from, to]`，两端都是正整数且 `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayRange {
    from: u32,
    to: u32,
}

impl ReplayRange {
    pub fn new(from: i64, to: i64) -> QuizResult<Self> {
        let positive = |v: i64| u32::try_from(v).ok().filter(|v| *v >= 1);
        match (positive(from), positive(to)) {
            (Some(from), Some(to)) if from <= to => Ok(Self { from, to }),
            (Some(_), Some(_)) => Err(QuizError::InvalidRange(format!(
                "结束关卡 {} 小于起始关卡 {}",
                to, from
            ))),
            _ => Err(QuizError::InvalidRange(format!(
                "关卡必须是正整数: {}..={}",
                from, to
            ))),
        }
    }

    /// 解析用户输入的文本
    pub fn parse(from: &str, to: &str) -> QuizResult<Self> {
        let number = |raw: &str| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| QuizError::InvalidRange(format!("不是整数: {:?}", raw)))
        };
        Self::new(number(from)?, number(to)?)
    }

}

/// 区间重玩：只读的练习队列，不修改进度
#[derive(Debug, Clone)]
pub struct ReplaySession {
    queue: Vec<QuestionRecord>,
    index: usize,
    advancing: bool,
    advance_delay: Duration,
}

impl ReplaySession {
    pub fn start(
        vocabulary: &VocabularyStore,
        range: ReplayRange,
        advance_delay: Duration,
    ) -> QuizResult<Self> {
        let queue = vocabulary.in_range(range.from, range.to);
        if queue.is_empty() {
            return Err(QuizError::EmptyRange {
                from: range.from,
                to: range.to,
            });
        }

        tracing::debug!(from = range.from, to = range.to, len = queue.len(), "replay started");
        Ok(Self {
            queue,
            index: 0,
            advancing: false,
            advance_delay,
        })
    }

    fn is_complete(&self) -> bool {
        self.index >= self.queue.len()
    }

    fn current(&self) -> Option<&QuestionRecord> {
        self.queue.get(self.index)
    }
}

impl QuizController for ReplaySession {
    fn mode(&self) -> SessionMode {
        SessionMode::Replay
    }

    fn display(&self, _vocabulary: &VocabularyStore, _progress: &ProgressState) -> Screen {
        match self.current() {
            Some(q) => Screen::Question(QuestionView::of(q).with_label(format!(
                "Level {} ({}/{})",
                q.id,
                self.index + 1,
                self.queue.len()
            ))),
            None => Screen::ReplayComplete,
        }
    }

    fn apply_answer(
        &mut self,
        _ctx: &mut SessionContext<'_>,
        choice: &str,
    ) -> QuizResult<AnswerOutcome> {
        if self.advancing {
            return Err(QuizError::TransitionPending);
        }
        let question = self.current().ok_or(QuizError::NoActiveQuestion)?;

        if question.is_correct(choice) {
            self.advancing = true;
            Ok(AnswerOutcome::correct(false, self.advance_delay))
        } else {
            Ok(AnswerOutcome::incorrect(false))
        }
    }

    fn advance_display(
        &mut self,
        vocabulary: &VocabularyStore,
        progress: &ProgressState,
    ) -> Screen {
        if self.advancing {
            self.advancing = false;
            self.index += 1;
            if self.is_complete() {
                tracing::info!(len = self.queue.len(), "replay marathon complete");
            }
        }
        self.display(vocabulary, progress)
    }

    fn is_pending(&self) -> bool {
        self.advancing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ids: &[u32]) -> VocabularyStore {
        let records = ids
            .iter()
            .map(|id| {
                QuestionRecord::new(
                    *id,
                    format!("word{}", id),
                    vec!["benar".into(), "salah".into()],
                    "benar",
                )
            })
            .collect();
        VocabularyStore::from_records(records).unwrap()
    }

    #[test]
    fn test_range_validation() {
        assert!(matches!(ReplayRange::new(5, 3), Err(QuizError::InvalidRange(_))));
        assert!(matches!(ReplayRange::new(0, 3), Err(QuizError::InvalidRange(_))));
        assert!(matches!(ReplayRange::new(-1, 3), Err(QuizError::InvalidRange(_))));
        assert!(ReplayRange::new(3, 3).is_ok());

        let range = ReplayRange::parse(" 2 ", "9").unwrap();
        assert_eq!(range, ReplayRange::new(2, 9).unwrap());
        assert!(matches!(ReplayRange::parse("dua", "9"), Err(QuizError::InvalidRange(_))));
        assert!(matches!(ReplayRange::parse("1.5", "9"), Err(QuizError::InvalidRange(_))));
    }

    #[test]
    fn test_empty_range() {
        let vocabulary = store(&[5, 6, 7]);
        let range = ReplayRange::new(1, 2).unwrap();
        assert!(matches!(
            ReplaySession::start(&vocabulary, range, Duration::ZERO),
            Err(QuizError::EmptyRange { from: 1, to: 2 })
        ));
    }

    #[test]
    fn test_marathon_runs_to_completion_without_touching_progress() {
        let vocabulary = store(&[4, 1, 2, 9, 3]);
        let mut progress = ProgressState::new();
        progress.award_correct();
        let before = progress.clone();

        let range = ReplayRange::new(1, 4).unwrap();
        let mut session =
            ReplaySession::start(&vocabulary, range, Duration::from_millis(500)).unwrap();

        let screen = session.display(&vocabulary, &progress);
        assert_eq!(screen.question().unwrap().label.as_deref(), Some("Level 4 (1/4)"));

        // 答错不前进
        let mut ctx = SessionContext {
            vocabulary: &vocabulary,
            progress: &mut progress,
            now_ms: 0,
        };
        let wrong = session.apply_answer(&mut ctx, "salah").unwrap();
        assert!(!wrong.correct);
        let screen = session.display(ctx.vocabulary, ctx.progress);
        assert_eq!(screen.question().unwrap().id, 4);

        let mut seen = Vec::new();
        for step in 1..=4 {
            let screen = session.display(ctx.vocabulary, ctx.progress);
            let view = screen.question().unwrap();
            assert_eq!(view.label, Some(format!("Level {} ({}/4)", view.id, step)));
            seen.push(view.id);

            let outcome = session.apply_answer(&mut ctx, "benar").unwrap();
            assert!(outcome.correct);
            assert!(!outcome.progress_changed);
            assert_eq!(outcome.advance_after, Some(Duration::from_millis(500)));
            session.advance_display(ctx.vocabulary, ctx.progress);
        }

        assert_eq!(seen, vec![4, 1, 2, 3]);
        assert_eq!(session.display(&vocabulary, &progress), Screen::ReplayComplete);
        assert_eq!(progress, before);
    }

    #[test]
    fn test_pending_transition_rejects_answers() {
        let vocabulary = store(&[1, 2]);
        let mut progress = ProgressState::new();
        let range = ReplayRange::new(1, 2).unwrap();
        let mut session = ReplaySession::start(&vocabulary, range, Duration::ZERO).unwrap();
        let mut ctx = SessionContext {
            vocabulary: &vocabulary,
            progress: &mut progress,
            now_ms: 0,
        };

        session.apply_answer(&mut ctx, "benar").unwrap();
        assert!(session.is_pending());
        assert!(matches!(
            session.apply_answer(&mut ctx, "benar"),
            Err(QuizError::TransitionPending)
        ));
        assert!(matches!(
            session.skip(&mut ctx),
            Err(QuizError::SkipUnsupported("replay"))
        ));
    }
}
