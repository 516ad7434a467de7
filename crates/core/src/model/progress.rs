use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::model::badge::BadgeDefinition;
use crate::model::ids::{BadgeId, CourseId, LessonId};
use crate::model::key::LessonKey;

/// Current layout version of the persisted progress document.
pub const SCHEMA_VERSION: u32 = 1;

/// Points awarded the first time a lesson is completed.
pub const LESSON_COMPLETION_POINTS: u32 = 10;

/// Bonus awarded for a quiz submission where every answer is correct.
pub const PERFECT_QUIZ_BONUS: u32 = 5;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("score {score} exceeds max score {max_score}")]
    ScoreExceedsMax { score: u32, max_score: u32 },

    #[error("course id must not be blank: {0:?}")]
    InvalidCourse(CourseId),
}

/// Key for a lesson of `course`, refusing course ids that would not survive
/// a save and reload.
///
/// # Errors
///
/// Returns `ProgressError::InvalidCourse` if the course id is blank.
pub fn lesson_key(course: CourseId, lesson: LessonId) -> Result<LessonKey, ProgressError> {
    if course.as_str().trim().is_empty() {
        return Err(ProgressError::InvalidCourse(course));
    }
    Ok(LessonKey::new(course, lesson))
}

/// Rounded percentage of `part` over `whole`, half rounding up.
///
/// A zero `whole` yields `0` instead of an undefined value.
#[must_use]
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part);
    let whole = u64::from(whole);
    let rounded = (200 * part + whole) / (2 * whole);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

//
// ─── QUIZ SCORE ────────────────────────────────────────────────────────────────
//

/// Latest recorded attempt for one lesson quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
}

impl QuizScore {
    /// Build a score and derive its percentage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ScoreExceedsMax` if `score > max_score`.
    pub fn new(score: u32, max_score: u32) -> Result<Self, ProgressError> {
        if score > max_score {
            return Err(ProgressError::ScoreExceedsMax { score, max_score });
        }
        Ok(Self {
            score,
            max_score,
            percentage: percentage(score, max_score),
        })
    }

    /// Every question answered correctly. An empty quiz is never perfect.
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.max_score > 0 && self.score == self.max_score
    }
}

/// Quiz scores keyed by lesson, kept in first-submission order.
///
/// Re-submitting a quiz replaces the entry in place, so the position of a key
/// never moves. Serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizScores {
    entries: Vec<(LessonKey, QuizScore)>,
}

impl QuizScores {
    #[must_use]
    pub fn get(&self, key: &LessonKey) -> Option<&QuizScore> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    /// Insert or overwrite the score for `key`, returning the replaced one.
    pub fn insert(&mut self, key: LessonKey, score: QuizScore) -> Option<QuizScore> {
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, score));
        }
        self.entries.push((key, score));
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LessonKey, &QuizScore)> {
        self.entries.iter().map(|(k, s)| (k, s))
    }

    /// Scores whose key belongs to `course`.
    pub fn for_course<'a>(
        &'a self,
        course: &'a CourseId,
    ) -> impl Iterator<Item = (&'a LessonKey, &'a QuizScore)> + 'a {
        self.iter().filter(move |(k, _)| k.is_in(course))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for QuizScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, score) in &self.entries {
            map.serialize_entry(key, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QuizScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = QuizScores;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of lesson keys to quiz scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<QuizScores, A::Error> {
                let mut scores = QuizScores::default();
                while let Some((key, score)) = access.next_entry::<LessonKey, QuizScore>()? {
                    scores.insert(key, score);
                }
                Ok(scores)
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}

//
// ─── LANGUAGE PROGRESS ─────────────────────────────────────────────────────────
//

/// Completed versus total lessons for one course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProgress {
    pub completed: u32,
    pub total: u32,
}

impl LanguageProgress {
    /// Completion percentage; `0` when the course total is unknown.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.completed, self.total)
    }
}

//
// ─── DOCUMENT ──────────────────────────────────────────────────────────────────
//

/// Result of applying a quiz submission to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScoreUpdate {
    pub score: QuizScore,
    pub previous: Option<QuizScore>,
    pub bonus_points: u32,
}

/// The single persisted record of a learner's progress.
///
/// Every field has a zero default, and deserialization fills whatever a stored
/// record is missing. Mutations go through methods so the counters stay in
/// step with `completed_lessons`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressDocument {
    completed_lessons: Vec<LessonKey>,
    quiz_scores: QuizScores,
    earned_badges: Vec<BadgeId>,
    current_streak: u32,
    total_points: u32,
    language_progress: BTreeMap<CourseId, LanguageProgress>,
    schema_version: u32,
}

impl Default for ProgressDocument {
    fn default() -> Self {
        Self {
            completed_lessons: Vec::new(),
            quiz_scores: QuizScores::default(),
            earned_badges: Vec::new(),
            current_streak: 0,
            total_points: 0,
            language_progress: BTreeMap::new(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

impl ProgressDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed lesson keys in completion order.
    #[must_use]
    pub fn completed_lessons(&self) -> &[LessonKey] {
        &self.completed_lessons
    }

    #[must_use]
    pub fn quiz_scores(&self) -> &QuizScores {
        &self.quiz_scores
    }

    #[must_use]
    pub fn earned_badges(&self) -> &[BadgeId] {
        &self.earned_badges
    }

    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn language_progress(&self) -> &BTreeMap<CourseId, LanguageProgress> {
        &self.language_progress
    }

    #[must_use]
    pub fn language_progress_for(&self, course: &CourseId) -> Option<&LanguageProgress> {
        self.language_progress.get(course)
    }

    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    #[must_use]
    pub fn is_lesson_completed(&self, key: &LessonKey) -> bool {
        self.completed_lessons.contains(key)
    }

    #[must_use]
    pub fn has_badge(&self, badge: &BadgeId) -> bool {
        self.earned_badges.contains(badge)
    }

    /// Completed lessons recorded for `course`.
    #[must_use]
    pub fn lessons_completed_in(&self, course: &CourseId) -> u32 {
        self.language_progress
            .get(course)
            .map_or(0, |progress| progress.completed)
    }

    /// Number of quizzes whose latest attempt was perfect.
    #[must_use]
    pub fn perfect_quiz_count(&self) -> usize {
        self.quiz_scores
            .iter()
            .filter(|(_, score)| score.is_perfect())
            .count()
    }

    /// Number of courses with at least one completed lesson.
    #[must_use]
    pub fn courses_started(&self) -> usize {
        self.language_progress
            .values()
            .filter(|progress| progress.completed > 0)
            .count()
    }

    /// Mark a lesson complete and return the points awarded.
    ///
    /// Completion is a set insertion: a key that is already present leaves the
    /// document untouched and awards nothing. `catalog_total` seeds the course
    /// total the first time the course is touched; unknown courses get `0`.
    pub fn complete_lesson(&mut self, key: LessonKey, catalog_total: Option<u32>) -> u32 {
        if self.is_lesson_completed(&key) {
            return 0;
        }

        let entry = self
            .language_progress
            .entry(key.course().clone())
            .or_insert_with(|| LanguageProgress {
                completed: 0,
                total: catalog_total.unwrap_or(0),
            });
        entry.completed = entry.completed.saturating_add(1);

        self.completed_lessons.push(key);
        self.total_points = self.total_points.saturating_add(LESSON_COMPLETION_POINTS);
        LESSON_COMPLETION_POINTS
    }

    /// Record the latest quiz attempt for a lesson, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ScoreExceedsMax` if `score > max_score`; the
    /// document is left unchanged.
    pub fn record_quiz_score(
        &mut self,
        key: LessonKey,
        score: u32,
        max_score: u32,
    ) -> Result<QuizScoreUpdate, ProgressError> {
        let score = QuizScore::new(score, max_score)?;
        let previous = self.quiz_scores.insert(key, score);

        let bonus_points = if score.is_perfect() {
            PERFECT_QUIZ_BONUS
        } else {
            0
        };
        self.total_points = self.total_points.saturating_add(bonus_points);

        Ok(QuizScoreUpdate {
            score,
            previous,
            bonus_points,
        })
    }

    /// Append every badge whose condition now holds and that is not yet earned.
    ///
    /// Returns the newly earned ids in definition order. Badges are never
    /// revoked.
    pub fn award_badges(&mut self, definitions: &[BadgeDefinition]) -> Vec<BadgeId> {
        let newly: Vec<BadgeId> = definitions
            .iter()
            .filter(|def| !self.has_badge(&def.id) && def.condition.is_satisfied(self))
            .map(|def| def.id.clone())
            .collect();
        self.earned_badges.extend(newly.iter().cloned());
        newly
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::badge::BadgeCondition;

    fn key(course: &str, lesson: u32) -> LessonKey {
        LessonKey::new(CourseId::new(course), LessonId::new(lesson))
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(2, 12), 17);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn percentage_of_zero_whole_is_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn lesson_key_refuses_blank_course() {
        assert!(matches!(
            lesson_key(CourseId::new(""), LessonId::new(1)),
            Err(ProgressError::InvalidCourse(_))
        ));
        assert!(lesson_key(CourseId::new("  "), LessonId::new(1)).is_err());
        assert_eq!(lesson_key(CourseId::new("html"), LessonId::new(1)).unwrap(), key("html", 1));
    }

    #[test]
    fn default_document_is_empty() {
        let doc = ProgressDocument::new();
        assert!(doc.completed_lessons().is_empty());
        assert!(doc.quiz_scores().is_empty());
        assert!(doc.earned_badges().is_empty());
        assert_eq!(doc.total_points(), 0);
        assert_eq!(doc.current_streak(), 0);
        assert_eq!(doc.schema_version(), SCHEMA_VERSION);
    }

    #[test]
    fn completing_a_lesson_awards_points_once() {
        let mut doc = ProgressDocument::new();
        assert_eq!(doc.complete_lesson(key("html", 1), Some(12)), 10);
        let after_first = doc.clone();
        assert_eq!(doc.complete_lesson(key("html", 1), Some(12)), 0);

        assert_eq!(doc, after_first);
        assert_eq!(doc.total_points(), 10);
        assert_eq!(doc.completed_lessons(), &[key("html", 1)]);
    }

    #[test]
    fn language_progress_tracks_completed_lessons() {
        let mut doc = ProgressDocument::new();
        doc.complete_lesson(key("html", 1), Some(12));
        doc.complete_lesson(key("html", 2), Some(12));

        let progress = doc.language_progress_for(&CourseId::new("html")).unwrap();
        assert_eq!(*progress, LanguageProgress { completed: 2, total: 12 });
        assert_eq!(progress.percentage(), 17);
    }

    #[test]
    fn unknown_course_gets_zero_total() {
        let mut doc = ProgressDocument::new();
        doc.complete_lesson(key("cobol", 1), None);

        let progress = doc.language_progress_for(&CourseId::new("cobol")).unwrap();
        assert_eq!(progress.total, 0);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.percentage(), 0);
    }

    #[test]
    fn catalog_total_only_seeds_new_entries() {
        let mut doc = ProgressDocument::new();
        doc.complete_lesson(key("css", 1), Some(15));
        doc.complete_lesson(key("css", 2), Some(99));
        assert_eq!(doc.language_progress_for(&CourseId::new("css")).unwrap().total, 15);
    }

    #[test]
    fn quiz_score_stores_rounded_percentage() {
        let mut doc = ProgressDocument::new();
        let update = doc.record_quiz_score(key("html", 1), 1, 2).unwrap();
        assert_eq!(update.score.percentage, 50);
        assert_eq!(update.bonus_points, 0);
        assert_eq!(doc.total_points(), 0);
    }

    #[test]
    fn perfect_quiz_awards_bonus_every_time() {
        let mut doc = ProgressDocument::new();
        doc.record_quiz_score(key("html", 1), 2, 2).unwrap();
        assert_eq!(doc.total_points(), 5);
        doc.record_quiz_score(key("html", 1), 2, 2).unwrap();
        assert_eq!(doc.total_points(), 10);
    }

    #[test]
    fn resubmission_overwrites_in_place() {
        let mut doc = ProgressDocument::new();
        doc.record_quiz_score(key("html", 1), 1, 2).unwrap();
        doc.record_quiz_score(key("javascript", 1), 0, 1).unwrap();
        let update = doc.record_quiz_score(key("html", 1), 2, 2).unwrap();

        assert_eq!(update.previous.map(|s| s.score), Some(1));
        assert_eq!(doc.quiz_scores().len(), 2);
        assert_eq!(doc.quiz_scores().get(&key("html", 1)).unwrap().score, 2);
        let order: Vec<String> = doc.quiz_scores().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["html_1", "javascript_1"]);
    }

    #[test]
    fn empty_quiz_scores_zero_without_bonus() {
        let mut doc = ProgressDocument::new();
        let update = doc.record_quiz_score(key("html", 1), 0, 0).unwrap();
        assert_eq!(update.score.percentage, 0);
        assert_eq!(update.bonus_points, 0);
        assert_eq!(doc.total_points(), 0);
    }

    #[test]
    fn score_above_max_is_rejected_without_changes() {
        let mut doc = ProgressDocument::new();
        let err = doc.record_quiz_score(key("html", 1), 3, 2).unwrap_err();
        assert_eq!(err, ProgressError::ScoreExceedsMax { score: 3, max_score: 2 });
        assert_eq!(doc, ProgressDocument::new());
    }

    #[test]
    fn badges_are_awarded_once() {
        let starter = BadgeDefinition {
            id: BadgeId::new("html_starter"),
            name: "HTML Beginner".into(),
            description: "First HTML lesson completed".into(),
            icon: "🌱".into(),
            condition: BadgeCondition::LessonsCompleted {
                course: CourseId::new("html"),
                count: 1,
            },
        };
        let defs = vec![starter];
        let mut doc = ProgressDocument::new();
        assert!(doc.award_badges(&defs).is_empty());

        doc.complete_lesson(key("html", 1), Some(12));
        assert_eq!(doc.award_badges(&defs), vec![BadgeId::new("html_starter")]);
        assert!(doc.award_badges(&defs).is_empty());
        assert_eq!(doc.earned_badges().len(), 1);
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let mut doc = ProgressDocument::new();
        doc.complete_lesson(key("html", 1), Some(12));
        doc.record_quiz_score(key("html", 1), 1, 2).unwrap();

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["completedLessons"], serde_json::json!(["html_1"]));
        assert_eq!(
            value["quizScores"]["html_1"],
            serde_json::json!({"score": 1, "maxScore": 2, "percentage": 50})
        );
        assert_eq!(
            value["languageProgress"]["html"],
            serde_json::json!({"completed": 1, "total": 12})
        );
        assert_eq!(value["totalPoints"], 10);
        assert_eq!(value["earnedBadges"], serde_json::json!([]));
        assert_eq!(value["currentStreak"], 0);
        assert_eq!(value["schemaVersion"], 1);
    }

    #[test]
    fn missing_fields_are_filled_with_defaults() {
        let doc: ProgressDocument = serde_json::from_str(r#"{"totalPoints": 7}"#).unwrap();
        assert_eq!(doc.total_points(), 7);
        assert!(doc.completed_lessons().is_empty());
        assert!(doc.quiz_scores().is_empty());
        assert_eq!(doc.schema_version(), SCHEMA_VERSION);
    }

    #[test]
    fn legacy_record_loads_and_keeps_quiz_order() {
        let json = r#"{
            "completedLessons": ["html_1", "javascript_1"],
            "quizScores": {
                "javascript_1": {"score": 1, "maxScore": 1, "percentage": 100},
                "html_1": {"score": 1, "maxScore": 2, "percentage": 50}
            },
            "earnedBadges": [],
            "currentStreak": 3,
            "totalPoints": 25,
            "languageProgress": {
                "html": {"completed": 1, "total": 12},
                "javascript": {"completed": 1, "total": 20}
            }
        }"#;
        let doc: ProgressDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.current_streak(), 3);
        assert_eq!(doc.courses_started(), 2);
        assert_eq!(doc.perfect_quiz_count(), 1);
        let order: Vec<String> = doc.quiz_scores().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["javascript_1", "html_1"]);
    }

    #[test]
    fn malformed_values_fail_to_deserialize() {
        assert!(serde_json::from_str::<ProgressDocument>(r#"{"totalPoints": "lots"}"#).is_err());
        assert!(serde_json::from_str::<ProgressDocument>(r#"{"completedLessons": ["nope"]}"#).is_err());
        assert!(serde_json::from_str::<ProgressDocument>("{not json").is_err());
    }
}
