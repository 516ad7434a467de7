//! Static course content: courses, lessons, quiz questions and badges.
//!
//! The catalog is read-only. It seeds course totals in the progress document
//! and feeds the lesson, quiz and dashboard views.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::model::{
    BadgeDefinition, BadgeId, Course, CourseId, Lesson, LessonId, QuestionError, QuestionId,
    QuizQuestion,
};

mod builtin;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate course id: {0}")]
    DuplicateCourse(CourseId),

    #[error("duplicate lesson {lesson} in course {course}")]
    DuplicateLesson { course: CourseId, lesson: LessonId },

    #[error("content listed for unknown course: {0}")]
    UnknownCourse(CourseId),

    #[error("question {question} in course {course} references missing lesson {lesson}")]
    DanglingQuestion {
        course: CourseId,
        question: QuestionId,
        lesson: LessonId,
    },

    #[error("invalid question {question} in course {course}: {source}")]
    InvalidQuestion {
        course: CourseId,
        question: QuestionId,
        #[source]
        source: QuestionError,
    },

    #[error("duplicate badge id: {0}")]
    DuplicateBadge(BadgeId),

    #[error("catalog file could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Validated course catalog.
///
/// Lessons of each course are kept sorted by id, which is also the order the
/// learner is expected to follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    courses: Vec<Course>,
    #[serde(default)]
    lessons: BTreeMap<CourseId, Vec<Lesson>>,
    #[serde(default)]
    quizzes: BTreeMap<CourseId, Vec<QuizQuestion>>,
    #[serde(default)]
    badges: Vec<BadgeDefinition>,
}

impl Catalog {
    /// Build and validate a catalog from its parts.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when ids collide, content points at unknown
    /// courses or lessons, or a question is malformed.
    pub fn new(
        courses: Vec<Course>,
        lessons: BTreeMap<CourseId, Vec<Lesson>>,
        quizzes: BTreeMap<CourseId, Vec<QuizQuestion>>,
        badges: Vec<BadgeDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            courses,
            lessons,
            quizzes,
            badges,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The content shipped with the application.
    #[must_use]
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    /// Parse and validate a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` for malformed input, or a validation error.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let mut catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise the
    /// errors of [`Catalog::from_json`].
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&mut self) -> Result<(), CatalogError> {
        let mut course_ids = HashSet::new();
        for course in &self.courses {
            if !course_ids.insert(course.id.clone()) {
                return Err(CatalogError::DuplicateCourse(course.id.clone()));
            }
        }

        for (course, lessons) in &mut self.lessons {
            if !course_ids.contains(course) {
                return Err(CatalogError::UnknownCourse(course.clone()));
            }
            lessons.sort_by_key(|lesson| lesson.id);
            if let Some(pair) = lessons.windows(2).find(|pair| pair[0].id == pair[1].id) {
                return Err(CatalogError::DuplicateLesson {
                    course: course.clone(),
                    lesson: pair[0].id,
                });
            }
        }

        for (course, questions) in &self.quizzes {
            if !course_ids.contains(course) {
                return Err(CatalogError::UnknownCourse(course.clone()));
            }
            let lessons = self.lessons.get(course).map_or(&[][..], Vec::as_slice);
            for question in questions {
                question
                    .validate()
                    .map_err(|source| CatalogError::InvalidQuestion {
                        course: course.clone(),
                        question: question.id,
                        source,
                    })?;
                if !lessons.iter().any(|lesson| lesson.id == question.lesson_id) {
                    return Err(CatalogError::DanglingQuestion {
                        course: course.clone(),
                        question: question.id,
                        lesson: question.lesson_id,
                    });
                }
            }
        }

        let mut badge_ids = HashSet::new();
        for badge in &self.badges {
            if !badge_ids.insert(badge.id.clone()) {
                return Err(CatalogError::DuplicateBadge(badge.id.clone()));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|course| &course.id == id)
    }

    /// Advertised lesson count, used to seed per-course totals.
    #[must_use]
    pub fn total_lessons(&self, id: &CourseId) -> Option<u32> {
        self.course(id).map(|course| course.total_lessons)
    }

    /// Authored lessons of a course in order. Empty for unknown courses.
    #[must_use]
    pub fn lessons(&self, course: &CourseId) -> &[Lesson] {
        self.lessons.get(course).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn lesson(&self, course: &CourseId, lesson: LessonId) -> Option<&Lesson> {
        self.lessons(course).iter().find(|l| l.id == lesson)
    }

    /// The lesson following `lesson` in course order, if any.
    #[must_use]
    pub fn next_lesson(&self, course: &CourseId, lesson: LessonId) -> Option<&Lesson> {
        let lessons = self.lessons(course);
        let index = lessons.iter().position(|l| l.id == lesson)?;
        lessons.get(index + 1)
    }

    /// Questions attached to one lesson, in catalog order.
    #[must_use]
    pub fn questions(&self, course: &CourseId, lesson: LessonId) -> Vec<&QuizQuestion> {
        self.quizzes
            .get(course)
            .map(|questions| questions.iter().filter(|q| q.lesson_id == lesson).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_quiz(&self, course: &CourseId, lesson: LessonId) -> bool {
        self.quizzes
            .get(course)
            .is_some_and(|questions| questions.iter().any(|q| q.lesson_id == lesson))
    }

    #[must_use]
    pub fn badges(&self) -> &[BadgeDefinition] {
        &self.badges
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
