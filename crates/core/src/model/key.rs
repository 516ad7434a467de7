use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId};

/// Separator between the course and lesson parts of a rendered key.
pub const KEY_SEPARATOR: char = '_';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonKeyError {
    #[error("lesson key is missing the `_` separator: {0}")]
    MissingSeparator(String),

    #[error("lesson key has an empty course part: {0}")]
    EmptyCourse(String),

    #[error("lesson key has an invalid lesson part: {0}")]
    InvalidLesson(String),
}

/// Composite key indexing per-lesson progress and quiz records.
///
/// Rendered as `<course>_<lesson>` (for example `html_1`). Parsing splits at
/// the last separator so the lesson part is always numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LessonKey {
    course: CourseId,
    lesson: LessonId,
}

impl LessonKey {
    #[must_use]
    pub fn new(course: CourseId, lesson: LessonId) -> Self {
        Self { course, lesson }
    }

    #[must_use]
    pub fn course(&self) -> &CourseId {
        &self.course
    }

    #[must_use]
    pub fn lesson(&self) -> LessonId {
        self.lesson
    }

    /// True when the key belongs to the given course.
    #[must_use]
    pub fn is_in(&self, course: &CourseId) -> bool {
        &self.course == course
    }
}

impl fmt::Display for LessonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.course, self.lesson)
    }
}

impl FromStr for LessonKey {
    type Err = LessonKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (course, lesson) = s
            .rsplit_once(KEY_SEPARATOR)
            .ok_or_else(|| LessonKeyError::MissingSeparator(s.to_owned()))?;
        if course.trim().is_empty() {
            return Err(LessonKeyError::EmptyCourse(s.to_owned()));
        }
        let lesson = lesson
            .parse::<u32>()
            .map_err(|_| LessonKeyError::InvalidLesson(s.to_owned()))?;
        Ok(Self::new(CourseId::new(course), LessonId::new(lesson)))
    }
}

impl Serialize for LessonKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LessonKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = LessonKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a lesson key such as `html_1`")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LessonKey, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_course_and_lesson() {
        let key = LessonKey::new(CourseId::new("html"), LessonId::new(1));
        assert_eq!(key.to_string(), "html_1");
    }

    #[test]
    fn parses_at_last_separator() {
        let key: LessonKey = "intro_to_rust_7".parse().unwrap();
        assert_eq!(key.course().as_str(), "intro_to_rust");
        assert_eq!(key.lesson(), LessonId::new(7));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!(
            "html".parse::<LessonKey>(),
            Err(LessonKeyError::MissingSeparator(_))
        ));
        assert!(matches!(
            "_3".parse::<LessonKey>(),
            Err(LessonKeyError::EmptyCourse(_))
        ));
        assert!(matches!(
            "html_x".parse::<LessonKey>(),
            Err(LessonKeyError::InvalidLesson(_))
        ));
    }

    #[test]
    fn json_form_is_the_rendered_string() {
        let key = LessonKey::new(CourseId::new("css"), LessonId::new(4));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"css_4\"");
        let back: LessonKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn json_rejects_invalid_key() {
        let err = serde_json::from_str::<LessonKey>("\"css-4\"").unwrap_err();
        assert!(err.to_string().contains("separator"));
    }
}
