mod badge;
mod course;
mod ids;
mod key;
mod progress;

pub use ids::{BadgeId, CourseId, LessonId, ParseIdError, QuestionId};
pub use key::{KEY_SEPARATOR, LessonKey, LessonKeyError};

pub use badge::{BadgeCondition, BadgeDefinition};
pub use course::{Course, Difficulty, Lesson, QuestionError, QuizQuestion};
pub use progress::{
    LESSON_COMPLETION_POINTS, LanguageProgress, PERFECT_QUIZ_BONUS, ProgressDocument,
    ProgressError, QuizScore, QuizScoreUpdate, QuizScores, SCHEMA_VERSION, lesson_key, percentage,
};
