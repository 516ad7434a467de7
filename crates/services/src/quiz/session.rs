use std::fmt;

use serde::Serialize;

use learn_core::Catalog;
use learn_core::model::{CourseId, LessonId, QuestionId, QuizQuestion, percentage};
use learn_core::stats::{ScoreBand, score_band};

use crate::error::QuizError;

//
// ─── GRADING ───────────────────────────────────────────────────────────────────
//

/// How one question was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub explanation: String,
}

/// Result of grading a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizGrade {
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub band: ScoreBand,
    pub reviews: Vec<QuestionReview>,
}

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub current: usize,
    pub is_finished: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One pass through the questions of a lesson quiz.
///
/// Questions are visited in catalog order. An answer must be selected before
/// moving to the next question; a selection may be changed until then.
#[derive(Clone)]
pub struct QuizSession {
    course: CourseId,
    lesson: LessonId,
    questions: Vec<QuizQuestion>,
    answers: Vec<Option<usize>>,
    current: usize,
    finished: bool,
}

impl QuizSession {
    /// Start a quiz over the questions the catalog holds for a lesson.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownCourse` if the course is not in the catalog
    /// and `QuizError::NoQuestions` if the lesson has no quiz.
    pub fn start(catalog: &Catalog, course: CourseId, lesson: LessonId) -> Result<Self, QuizError> {
        if catalog.course(&course).is_none() {
            return Err(QuizError::UnknownCourse(course));
        }
        let questions: Vec<QuizQuestion> = catalog
            .questions(&course, lesson)
            .into_iter()
            .cloned()
            .collect();
        if questions.is_empty() {
            return Err(QuizError::NoQuestions { course, lesson });
        }

        Ok(Self {
            course,
            lesson,
            answers: vec![None; questions.len()],
            questions,
            current: 0,
            finished: false,
        })
    }

    #[must_use]
    pub fn course(&self) -> &CourseId {
        &self.course
    }

    #[must_use]
    pub fn lesson(&self) -> LessonId {
        self.lesson
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Zero-based index of the question being shown.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.finished {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    /// Answer selected for the current question.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.answers.get(self.current).copied().flatten()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            total: self.questions.len(),
            answered: self.answered_count(),
            current: self.current,
            is_finished: self.finished,
        }
    }

    /// Select an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Finished` once the last question has been passed
    /// and `QuizError::AnswerOutOfRange` for an index outside the options.
    pub fn select(&mut self, answer: usize) -> Result<(), QuizError> {
        let Some(question) = self.current_question() else {
            return Err(QuizError::Finished);
        };
        let options = question.options.len();
        if answer >= options {
            return Err(QuizError::AnswerOutOfRange {
                index: answer,
                options,
            });
        }
        self.answers[self.current] = Some(answer);
        Ok(())
    }

    /// Move past the current question. Returns true once every question has
    /// been passed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoAnswerSelected` if the current question has no
    /// answer and `QuizError::Finished` if the quiz is already over.
    pub fn advance(&mut self) -> Result<bool, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        if self.selected().is_none() {
            return Err(QuizError::NoAnswerSelected);
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
        } else {
            self.finished = true;
        }
        Ok(self.finished)
    }

    /// Score the answers given so far. Unanswered questions count as wrong.
    #[must_use]
    pub fn grade(&self) -> QuizGrade {
        let reviews: Vec<QuestionReview> = self
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(question, selected)| QuestionReview {
                question_id: question.id,
                question: question.question.clone(),
                options: question.options.clone(),
                selected: *selected,
                correct_answer: question.correct_answer,
                is_correct: selected.is_some_and(|a| question.is_correct(a)),
                explanation: question.explanation.clone(),
            })
            .collect();

        let score = u32::try_from(reviews.iter().filter(|r| r.is_correct).count())
            .unwrap_or(u32::MAX);
        let max_score = u32::try_from(reviews.len()).unwrap_or(u32::MAX);
        let percentage = percentage(score, max_score);

        QuizGrade {
            score,
            max_score,
            percentage,
            band: score_band(percentage),
            reviews,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("course", &self.course)
            .field("lesson", &self.lesson)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answered_count())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn html_quiz() -> QuizSession {
        QuizSession::start(&Catalog::builtin(), CourseId::new("html"), LessonId::new(1)).unwrap()
    }

    #[test]
    fn start_rejects_unknown_course_and_missing_quiz() {
        let catalog = Catalog::builtin();
        let err = QuizSession::start(&catalog, CourseId::new("rust"), LessonId::new(1)).unwrap_err();
        assert!(matches!(err, QuizError::UnknownCourse(_)));

        let err = QuizSession::start(&catalog, CourseId::new("html"), LessonId::new(2)).unwrap_err();
        assert!(matches!(err, QuizError::NoQuestions { .. }));
    }

    #[test]
    fn advance_requires_a_selection() {
        let mut quiz = html_quiz();
        assert!(matches!(quiz.advance(), Err(QuizError::NoAnswerSelected)));

        quiz.select(0).unwrap();
        assert!(!quiz.advance().unwrap());
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.selected(), None);
    }

    #[test]
    fn select_validates_option_index() {
        let mut quiz = html_quiz();
        let err = quiz.select(4).unwrap_err();
        assert!(matches!(err, QuizError::AnswerOutOfRange { index: 4, options: 4 }));
        assert_eq!(quiz.selected(), None);
    }

    #[test]
    fn selection_can_change_before_advancing() {
        let mut quiz = html_quiz();
        quiz.select(0).unwrap();
        quiz.select(1).unwrap();
        assert_eq!(quiz.selected(), Some(1));
    }

    #[test]
    fn finished_quiz_grades_answers() {
        let mut quiz = html_quiz();
        quiz.select(1).unwrap();
        quiz.advance().unwrap();
        quiz.select(3).unwrap();
        assert!(quiz.advance().unwrap());

        assert!(quiz.is_finished());
        assert!(quiz.current_question().is_none());
        assert!(matches!(quiz.select(0), Err(QuizError::Finished)));
        assert!(matches!(quiz.advance(), Err(QuizError::Finished)));

        let grade = quiz.grade();
        assert_eq!(grade.score, 1);
        assert_eq!(grade.max_score, 2);
        assert_eq!(grade.percentage, 50);
        assert_eq!(grade.band, ScoreBand::Low);
        assert!(grade.reviews[0].is_correct);
        assert!(!grade.reviews[1].is_correct);
        assert_eq!(grade.reviews[1].correct_answer, 1);
    }

    #[test]
    fn progress_tracks_answers() {
        let mut quiz = html_quiz();
        quiz.select(1).unwrap();
        let progress = quiz.progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.current, 0);
        assert!(!progress.is_finished);
    }
}
