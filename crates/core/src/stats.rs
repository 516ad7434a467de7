//! Statistics derived from the progress document.
//!
//! Nothing here is persisted; every value is recomputed from the document and
//! the catalog when a view needs it.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::model::{
    BadgeDefinition, CourseId, Difficulty, LanguageProgress, LessonKey, ProgressDocument,
    percentage,
};

/// Lesson completions included in the activity feed.
pub const RECENT_LESSONS: usize = 5;
/// Quiz results included in the activity feed.
pub const RECENT_QUIZZES: usize = 3;
/// Maximum length of the activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 8;

pub const HIGH_SCORE_THRESHOLD: u32 = 80;
pub const MEDIUM_SCORE_THRESHOLD: u32 = 60;

//
// ─── PERCENTAGES ───────────────────────────────────────────────────────────────
//

/// Coarse grading of a quiz percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

#[must_use]
pub fn score_band(percentage: u32) -> ScoreBand {
    if percentage >= HIGH_SCORE_THRESHOLD {
        ScoreBand::High
    } else if percentage >= MEDIUM_SCORE_THRESHOLD {
        ScoreBand::Medium
    } else {
        ScoreBand::Low
    }
}

/// Course completion percentage; `0` for an untouched course or a zero total.
#[must_use]
pub fn completion_percentage(progress: Option<&LanguageProgress>) -> u32 {
    progress.map_or(0, LanguageProgress::percentage)
}

/// Rounded mean of the quiz percentages recorded for `course`.
#[must_use]
pub fn average_quiz_percentage(doc: &ProgressDocument, course: &CourseId) -> u32 {
    let (sum, count) = doc
        .quiz_scores()
        .for_course(course)
        .fold((0_u32, 0_u32), |(sum, count), (_, score)| {
            (sum.saturating_add(score.percentage), count.saturating_add(1))
        });
    // round(100 * sum / (100 * count)) is the rounded mean; zero entries give 0.
    percentage(sum, count.saturating_mul(100))
}

//
// ─── COURSE STATS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseStats {
    pub course_id: CourseId,
    pub name: String,
    pub icon: String,
    pub difficulty: Difficulty,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
    pub quizzes_taken: usize,
    pub average_quiz_percentage: u32,
}

/// Per-course statistics for every catalog course, in catalog order.
#[must_use]
pub fn course_stats(doc: &ProgressDocument, catalog: &Catalog) -> Vec<CourseStats> {
    catalog
        .courses()
        .iter()
        .map(|course| {
            let progress = doc
                .language_progress_for(&course.id)
                .copied()
                .unwrap_or(LanguageProgress {
                    completed: 0,
                    total: course.total_lessons,
                });
            CourseStats {
                course_id: course.id.clone(),
                name: course.name.clone(),
                icon: course.icon.clone(),
                difficulty: course.difficulty,
                completed: progress.completed,
                total: progress.total,
                percentage: progress.percentage(),
                quizzes_taken: doc.quiz_scores().for_course(&course.id).count(),
                average_quiz_percentage: average_quiz_percentage(doc, &course.id),
            }
        })
        .collect()
}

//
// ─── BADGES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeStatus {
    pub badge: BadgeDefinition,
    pub earned: bool,
}

/// Every catalog badge with its earned flag.
///
/// A badge counts as earned when it is recorded in the document or when its
/// condition holds now, so records written before badges were persisted still
/// show what they unlocked.
#[must_use]
pub fn badge_statuses(doc: &ProgressDocument, catalog: &Catalog) -> Vec<BadgeStatus> {
    catalog
        .badges()
        .iter()
        .map(|badge| BadgeStatus {
            earned: doc.has_badge(&badge.id) || badge.condition.is_satisfied(doc),
            badge: badge.clone(),
        })
        .collect()
}

//
// ─── ACTIVITY ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Activity {
    LessonCompleted {
        key: LessonKey,
        course_name: Option<String>,
    },
    QuizTaken {
        key: LessonKey,
        course_name: Option<String>,
        percentage: u32,
        band: ScoreBand,
    },
}

impl Activity {
    #[must_use]
    pub fn key(&self) -> &LessonKey {
        match self {
            Activity::LessonCompleted { key, .. } | Activity::QuizTaken { key, .. } => key,
        }
    }
}

/// Activity feed with the default window sizes.
#[must_use]
pub fn recent_activity(doc: &ProgressDocument, catalog: &Catalog) -> Vec<Activity> {
    recent_activity_with(
        doc,
        catalog,
        RECENT_LESSONS,
        RECENT_QUIZZES,
        RECENT_ACTIVITY_LIMIT,
    )
}

/// The last `lessons` completions followed by the last `quizzes` quiz
/// results, trimmed to the final `limit` entries. Oldest first.
#[must_use]
pub fn recent_activity_with(
    doc: &ProgressDocument,
    catalog: &Catalog,
    lessons: usize,
    quizzes: usize,
    limit: usize,
) -> Vec<Activity> {
    let course_name = |key: &LessonKey| catalog.course(key.course()).map(|c| c.name.clone());

    let completed = doc.completed_lessons();
    let lesson_items = completed[completed.len().saturating_sub(lessons)..]
        .iter()
        .map(|key| Activity::LessonCompleted {
            key: key.clone(),
            course_name: course_name(key),
        });

    let scores = doc.quiz_scores();
    let quiz_items = scores
        .iter()
        .skip(scores.len().saturating_sub(quizzes))
        .map(|(key, score)| Activity::QuizTaken {
            key: key.clone(),
            course_name: course_name(key),
            percentage: score.percentage,
            band: score_band(score.percentage),
        });

    let mut feed: Vec<Activity> = lesson_items.chain(quiz_items).collect();
    let excess = feed.len().saturating_sub(limit);
    feed.drain(..excess);
    feed
}

//
// ─── TOTALS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardTotals {
    pub lessons_completed: usize,
    pub quizzes_completed: usize,
    pub badges_earned: usize,
    pub total_points: u32,
    pub current_streak: u32,
}

/// Headline counters. `badges_earned` uses the same earned rule as
/// [`badge_statuses`].
#[must_use]
pub fn dashboard_totals(doc: &ProgressDocument, catalog: &Catalog) -> DashboardTotals {
    DashboardTotals {
        lessons_completed: doc.completed_lessons().len(),
        quizzes_completed: doc.quiz_scores().len(),
        badges_earned: badge_statuses(doc, catalog)
            .iter()
            .filter(|status| status.earned)
            .count(),
        total_points: doc.total_points(),
        current_streak: doc.current_streak(),
    }
}
