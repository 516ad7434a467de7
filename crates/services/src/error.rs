//! Shared error types for the services crate.

use thiserror::Error;

use learn_core::CatalogError;
use learn_core::model::{CourseId, LessonId, ProgressError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProgressStoreError {
    /// True when the stored document exists but could not be decoded.
    #[must_use]
    pub fn is_corrupt_record(&self) -> bool {
        matches!(self, ProgressStoreError::Storage(e) if e.is_corrupt_record())
    }
}

/// Errors emitted by the quiz workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("unknown course `{0}`")]
    UnknownCourse(CourseId),
    #[error("lesson {lesson} of `{course}` has no quiz questions")]
    NoQuestions { course: CourseId, lesson: LessonId },
    #[error("answer {index} is out of range for a question with {options} options")]
    AnswerOutOfRange { index: usize, options: usize },
    #[error("select an answer before moving on")]
    NoAnswerSelected,
    #[error("quiz already finished")]
    Finished,
    #[error("quiz incomplete: {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
    #[error("{given} answers given for a quiz with {total} questions")]
    TooManyAnswers { given: usize, total: usize },
    #[error(transparent)]
    Store(#[from] ProgressStoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Progress(#[from] ProgressStoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
