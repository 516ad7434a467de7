use std::sync::Arc;

use serde::Serialize;

use learn_core::model::{CourseId, LessonId};

use super::session::{QuizGrade, QuizSession};
use crate::error::QuizError;
use crate::progress_store::{ProgressStore, QuizRecord};

/// Result of submitting a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOutcome {
    pub grade: QuizGrade,
    pub record: QuizRecord,
}

/// Starts quiz sessions and persists their scores.
#[derive(Clone)]
pub struct QuizService {
    store: Arc<ProgressStore>,
}

impl QuizService {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>) -> Self {
        Self { store }
    }

    /// Start a quiz for the given lesson.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownCourse` or `QuizError::NoQuestions` when
    /// there is nothing to quiz on.
    pub fn start(&self, course: CourseId, lesson: LessonId) -> Result<QuizSession, QuizError> {
        QuizSession::start(self.store.catalog(), course, lesson)
    }

    /// Grade a session and record its score for the lesson.
    ///
    /// Retaking a quiz means starting a new session; its score replaces the
    /// earlier one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Incomplete` if any question is unanswered, or
    /// `QuizError::Store` if the score cannot be persisted.
    pub async fn submit(&self, session: &QuizSession) -> Result<QuizOutcome, QuizError> {
        let total = session.questions().len();
        let answered = session.answered_count();
        if answered < total {
            return Err(QuizError::Incomplete { answered, total });
        }

        let grade = session.grade();
        let record = self
            .store
            .record_quiz_score(
                session.course().clone(),
                session.lesson(),
                grade.score,
                grade.max_score,
            )
            .await?;
        Ok(QuizOutcome { grade, record })
    }

    /// Start a quiz, answer every question in order, and submit it.
    ///
    /// # Errors
    ///
    /// Returns any error from [`QuizService::start`], selecting an answer,
    /// or [`QuizService::submit`]. Fewer answers than questions yields
    /// `QuizError::Incomplete` and more yields `QuizError::TooManyAnswers`,
    /// both without recording anything.
    pub async fn take(
        &self,
        course: CourseId,
        lesson: LessonId,
        answers: &[usize],
    ) -> Result<QuizOutcome, QuizError> {
        let mut session = self.start(course, lesson)?;
        let total = session.questions().len();
        if answers.len() > total {
            return Err(QuizError::TooManyAnswers {
                given: answers.len(),
                total,
            });
        }
        for &answer in answers {
            session.select(answer)?;
            session.advance()?;
        }
        self.submit(&session).await
    }
}
