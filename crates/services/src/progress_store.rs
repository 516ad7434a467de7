use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use learn_core::Catalog;
use learn_core::model::{
    BadgeId, CourseId, LessonId, LessonKey, ProgressDocument, QuizScore, lesson_key,
};
use storage::repository::ProgressRepository;

use crate::Clock;
use crate::error::ProgressStoreError;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Outcome of marking a lesson complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonCompletion {
    pub progress: ProgressDocument,
    pub key: LessonKey,
    /// False when the lesson had already been completed.
    pub newly_completed: bool,
    pub points_awarded: u32,
    pub new_badges: Vec<BadgeId>,
}

/// Outcome of recording a quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizRecord {
    pub progress: ProgressDocument,
    pub key: LessonKey,
    pub score: QuizScore,
    pub bonus_points: u32,
    pub new_badges: Vec<BadgeId>,
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Owner of the persisted progress document.
///
/// Every operation is one read-modify-write cycle against the repository.
/// Cycles issued through the same store (or its clones) never interleave.
#[derive(Clone)]
pub struct ProgressStore {
    clock: Clock,
    catalog: Arc<Catalog>,
    progress: Arc<dyn ProgressRepository>,
    cycle: Arc<Mutex<()>>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            catalog,
            progress,
            cycle: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Read the stored document, seeding and persisting the default one when
    /// nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Storage` if the backend fails or the
    /// stored record cannot be decoded.
    pub async fn load(&self) -> Result<ProgressDocument, ProgressStoreError> {
        let _guard = self.cycle.lock().await;
        self.load_locked().await
    }

    /// Like [`ProgressStore::load`], but replaces an undecodable record with
    /// the default document. The flag is true when that happened.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Storage` for backend failures other than
    /// a corrupt record.
    pub async fn load_or_reset(&self) -> Result<(ProgressDocument, bool), ProgressStoreError> {
        let _guard = self.cycle.lock().await;
        match self.load_locked().await {
            Ok(progress) => Ok((progress, false)),
            Err(err) if err.is_corrupt_record() => {
                tracing::warn!(error = %err, "progress unavailable, resetting");
                let progress = ProgressDocument::new();
                self.save(&progress).await?;
                Ok((progress, true))
            }
            Err(err) => Err(err),
        }
    }

    /// Overwrite the stored document with a fresh default one.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Storage` if the write fails.
    pub async fn reset(&self) -> Result<ProgressDocument, ProgressStoreError> {
        let _guard = self.cycle.lock().await;
        tracing::warn!("resetting progress to defaults");
        let progress = ProgressDocument::new();
        self.save(&progress).await?;
        Ok(progress)
    }

    /// Mark a lesson complete. Completing the same lesson again changes
    /// nothing and awards no points.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Progress` for a blank course id, before
    /// anything is read or written, or `ProgressStoreError::Storage` if
    /// loading or saving fails.
    pub async fn complete_lesson(
        &self,
        course: CourseId,
        lesson: LessonId,
    ) -> Result<LessonCompletion, ProgressStoreError> {
        let key = lesson_key(course, lesson)?;
        let _guard = self.cycle.lock().await;
        let mut progress = self.load_locked().await?;

        let catalog_total = self.catalog.total_lessons(key.course());
        if catalog_total.is_none() {
            tracing::warn!(course = %key.course(), "completing lesson of unknown course");
        }

        let points_awarded = progress.complete_lesson(key.clone(), catalog_total);
        let newly_completed = points_awarded > 0;
        if newly_completed {
            tracing::info!(
                lesson = %key,
                points = points_awarded,
                total = progress.total_points(),
                "lesson completed"
            );
        }

        let new_badges = self.award_badges(&mut progress);
        self.save(&progress).await?;

        Ok(LessonCompletion {
            progress,
            key,
            newly_completed,
            points_awarded,
            new_badges,
        })
    }

    /// Record the latest quiz attempt for a lesson, replacing any previous
    /// attempt. A perfect score earns a bonus on every submission.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Progress` for a blank course id or if
    /// `score > max_score`, before anything is written, or
    /// `ProgressStoreError::Storage` if loading or saving fails.
    pub async fn record_quiz_score(
        &self,
        course: CourseId,
        lesson: LessonId,
        score: u32,
        max_score: u32,
    ) -> Result<QuizRecord, ProgressStoreError> {
        let key = lesson_key(course, lesson)?;
        let _guard = self.cycle.lock().await;
        let mut progress = self.load_locked().await?;

        let update = progress.record_quiz_score(key.clone(), score, max_score)?;
        tracing::info!(
            lesson = %key,
            percentage = update.score.percentage,
            bonus = update.bonus_points,
            replaced = update.previous.is_some(),
            "quiz score recorded"
        );

        let new_badges = self.award_badges(&mut progress);
        self.save(&progress).await?;

        Ok(QuizRecord {
            progress,
            key,
            score: update.score,
            bonus_points: update.bonus_points,
            new_badges,
        })
    }

    async fn load_locked(&self) -> Result<ProgressDocument, ProgressStoreError> {
        if let Some(progress) = self.progress.load_progress().await? {
            return Ok(progress);
        }
        tracing::debug!("no stored progress, seeding defaults");
        let progress = ProgressDocument::new();
        self.save(&progress).await?;
        Ok(progress)
    }

    async fn save(&self, progress: &ProgressDocument) -> Result<(), ProgressStoreError> {
        self.progress
            .save_progress(progress, self.clock.now())
            .await?;
        Ok(())
    }

    fn award_badges(&self, progress: &mut ProgressDocument) -> Vec<BadgeId> {
        let new_badges = progress.award_badges(self.catalog.badges());
        for badge in &new_badges {
            tracing::info!(badge = %badge, "badge earned");
        }
        new_badges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use learn_core::model::ProgressError;
    use learn_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    fn store_with(repo: &InMemoryRepository) -> ProgressStore {
        ProgressStore::new(
            fixed_clock(),
            Arc::new(Catalog::builtin()),
            Arc::new(repo.clone()),
        )
    }

    fn html() -> CourseId {
        CourseId::new("html")
    }

    #[tokio::test]
    async fn first_load_seeds_and_persists_default() {
        let repo = InMemoryRepository::new();
        let store = store_with(&repo);

        let progress = store.load().await.unwrap();
        assert_eq!(progress, ProgressDocument::new());

        let raw = repo.raw().unwrap().expect("default persisted");
        assert_eq!(raw.updated_at, fixed_now());
    }

    #[tokio::test]
    async fn load_returns_stored_document() {
        let repo = InMemoryRepository::new();
        repo.put_raw(r#"{"totalPoints": 7}"#, fixed_now()).unwrap();
        let store = store_with(&repo);

        let progress = store.load().await.unwrap();
        assert_eq!(progress.total_points(), 7);
        assert!(progress.completed_lessons().is_empty());
    }

    #[tokio::test]
    async fn complete_lesson_awards_points_and_badge_once() {
        let repo = InMemoryRepository::new();
        let store = store_with(&repo);

        let first = store.complete_lesson(html(), LessonId::new(1)).await.unwrap();
        assert!(first.newly_completed);
        assert_eq!(first.points_awarded, 10);
        assert_eq!(first.progress.total_points(), 10);
        assert_eq!(first.key.to_string(), "html_1");
        assert_eq!(first.new_badges, vec![BadgeId::new("html_starter")]);

        let again = store.complete_lesson(html(), LessonId::new(1)).await.unwrap();
        assert!(!again.newly_completed);
        assert_eq!(again.points_awarded, 0);
        assert!(again.new_badges.is_empty());
        assert_eq!(again.progress, first.progress);
    }

    #[tokio::test]
    async fn unknown_course_is_recorded_with_zero_total() {
        let repo = InMemoryRepository::new();
        let store = store_with(&repo);

        let done = store
            .complete_lesson(CourseId::new("rust"), LessonId::new(3))
            .await
            .unwrap();
        let entry = done
            .progress
            .language_progress_for(&CourseId::new("rust"))
            .copied()
            .unwrap();
        assert_eq!(entry.completed, 1);
        assert_eq!(entry.total, 0);
        assert_eq!(entry.percentage(), 0);
    }

    #[tokio::test]
    async fn quiz_score_overwrites_and_awards_bonus_on_perfect() {
        let repo = InMemoryRepository::new();
        let store = store_with(&repo);

        let half = store
            .record_quiz_score(html(), LessonId::new(1), 1, 2)
            .await
            .unwrap();
        assert_eq!(half.score.percentage, 50);
        assert_eq!(half.bonus_points, 0);

        let perfect = store
            .record_quiz_score(html(), LessonId::new(1), 2, 2)
            .await
            .unwrap();
        assert_eq!(perfect.score.percentage, 100);
        assert_eq!(perfect.bonus_points, 5);
        assert_eq!(perfect.progress.total_points(), 5);
        assert_eq!(perfect.progress.quiz_scores().len(), 1);
    }

    #[tokio::test]
    async fn score_above_max_is_rejected_without_writing() {
        let repo = InMemoryRepository::new();
        let store = store_with(&repo);
        store.load().await.unwrap();
        let before = repo.raw().unwrap();

        let err = store
            .record_quiz_score(html(), LessonId::new(1), 3, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressStoreError::Progress(_)));
        assert_eq!(repo.raw().unwrap(), before);
    }

    #[tokio::test]
    async fn blank_course_is_rejected_without_writing() {
        let repo = InMemoryRepository::new();
        let store = store_with(&repo);
        store.complete_lesson(html(), LessonId::new(1)).await.unwrap();
        let before = repo.raw().unwrap();

        for course in ["", "   "] {
            let err = store
                .complete_lesson(CourseId::new(course), LessonId::new(1))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ProgressStoreError::Progress(ProgressError::InvalidCourse(_))
            ));

            let err = store
                .record_quiz_score(CourseId::new(course), LessonId::new(1), 1, 1)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ProgressStoreError::Progress(ProgressError::InvalidCourse(_))
            ));
        }

        assert_eq!(repo.raw().unwrap(), before);
        assert_eq!(store.load().await.unwrap().total_points(), 10);
    }

    #[tokio::test]
    async fn saves_are_stamped_with_the_store_clock() {
        let repo = InMemoryRepository::new();
        store_with(&repo)
            .complete_lesson(html(), LessonId::new(1))
            .await
            .unwrap();
        assert_eq!(repo.raw().unwrap().unwrap().updated_at, fixed_now());

        let mut later = fixed_clock();
        later.advance(Duration::hours(2));
        let store = ProgressStore::new(later, Arc::new(Catalog::builtin()), Arc::new(repo.clone()));
        store.complete_lesson(html(), LessonId::new(2)).await.unwrap();

        let raw = repo.raw().unwrap().unwrap();
        assert_eq!(raw.updated_at, fixed_now() + Duration::hours(2));
    }

    #[tokio::test]
    async fn corrupt_record_fails_load_and_is_reset_on_request() {
        let repo = InMemoryRepository::new();
        repo.put_raw("{ not json", fixed_now()).unwrap();
        let store = store_with(&repo);

        let err = store.load().await.unwrap_err();
        assert!(err.is_corrupt_record());

        let (progress, was_reset) = store.load_or_reset().await.unwrap();
        assert!(was_reset);
        assert_eq!(progress, ProgressDocument::new());

        let (_, reset_again) = store.load_or_reset().await.unwrap();
        assert!(!reset_again);
    }

    #[tokio::test]
    async fn reset_discards_progress() {
        let repo = InMemoryRepository::new();
        let store = store_with(&repo);
        store.complete_lesson(html(), LessonId::new(1)).await.unwrap();

        let progress = store.reset().await.unwrap();
        assert_eq!(progress, ProgressDocument::new());
        assert_eq!(store.load().await.unwrap(), ProgressDocument::new());
    }
}
