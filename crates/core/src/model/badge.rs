use serde::{Deserialize, Serialize};

use crate::model::ids::{BadgeId, CourseId};
use crate::model::progress::ProgressDocument;

/// Unlock rule for a badge, evaluated against the live progress document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BadgeCondition {
    /// At least `count` lessons completed in `course`.
    #[serde(rename_all = "camelCase")]
    LessonsCompleted { course: CourseId, count: u32 },
    /// At least `count` quizzes whose latest attempt was perfect.
    PerfectQuizzes { count: u32 },
    /// At least `count` courses with one or more completed lessons.
    CoursesStarted { count: u32 },
}

impl BadgeCondition {
    #[must_use]
    pub fn is_satisfied(&self, progress: &ProgressDocument) -> bool {
        match self {
            BadgeCondition::LessonsCompleted { course, count } => {
                progress.lessons_completed_in(course) >= *count
            }
            BadgeCondition::PerfectQuizzes { count } => {
                progress.perfect_quiz_count() >= *count as usize
            }
            BadgeCondition::CoursesStarted { count } => {
                progress.courses_started() >= *count as usize
            }
        }
    }
}

/// Static description of an achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub condition: BadgeCondition,
}
