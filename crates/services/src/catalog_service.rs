use std::sync::Arc;

use serde::Serialize;

use learn_core::Catalog;
use learn_core::model::{Course, CourseId, Lesson, LessonId, LessonKey, ProgressDocument, QuizQuestion};
use learn_core::stats::completion_percentage;

/// A lesson as listed on a course page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonEntry {
    pub lesson: Lesson,
    pub completed: bool,
    pub has_quiz: bool,
}

/// A course together with the learner's progress through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseOverview {
    pub course: Course,
    pub lessons: Vec<LessonEntry>,
    pub completed: u32,
    pub percentage: u32,
}

/// Read-only access to courses, lessons and quiz questions.
///
/// Lookups of unknown ids return `None` or an empty list.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<Catalog>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        self.catalog.courses()
    }

    #[must_use]
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.catalog.course(id)
    }

    #[must_use]
    pub fn lessons(&self, course: &CourseId) -> &[Lesson] {
        self.catalog.lessons(course)
    }

    #[must_use]
    pub fn lesson(&self, course: &CourseId, lesson: LessonId) -> Option<&Lesson> {
        self.catalog.lesson(course, lesson)
    }

    #[must_use]
    pub fn next_lesson(&self, course: &CourseId, lesson: LessonId) -> Option<&Lesson> {
        self.catalog.next_lesson(course, lesson)
    }

    #[must_use]
    pub fn questions(&self, course: &CourseId, lesson: LessonId) -> Vec<&QuizQuestion> {
        self.catalog.questions(course, lesson)
    }

    /// Course page data for `id`, or `None` for an unknown course.
    #[must_use]
    pub fn overview(&self, progress: &ProgressDocument, id: &CourseId) -> Option<CourseOverview> {
        let course = self.catalog.course(id)?;
        let lessons = self
            .catalog
            .lessons(id)
            .iter()
            .map(|lesson| LessonEntry {
                completed: progress
                    .is_lesson_completed(&LessonKey::new(id.clone(), lesson.id)),
                has_quiz: self.catalog.has_quiz(id, lesson.id),
                lesson: lesson.clone(),
            })
            .collect();

        Some(CourseOverview {
            course: course.clone(),
            lessons,
            completed: progress.lessons_completed_in(id),
            percentage: completion_percentage(progress.language_progress_for(id)),
        })
    }
}
