use std::sync::Arc;

use serde::Serialize;

use learn_core::model::ProgressDocument;
use learn_core::stats::{
    Activity, BadgeStatus, CourseStats, DashboardTotals, badge_statuses, course_stats,
    dashboard_totals, recent_activity,
};

use crate::error::ProgressStoreError;
use crate::progress_store::ProgressStore;

/// Everything the dashboard page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub totals: DashboardTotals,
    pub courses: Vec<CourseStats>,
    pub badges: Vec<BadgeStatus>,
    pub earned_count: usize,
    pub badge_count: usize,
    pub recent_activity: Vec<Activity>,
}

impl Dashboard {
    #[must_use]
    pub fn build(progress: &ProgressDocument, catalog: &learn_core::Catalog) -> Self {
        let badges = badge_statuses(progress, catalog);
        let totals = dashboard_totals(progress, catalog);
        Self {
            totals,
            courses: course_stats(progress, catalog),
            earned_count: totals.badges_earned,
            badge_count: badges.len(),
            badges,
            recent_activity: recent_activity(progress, catalog),
        }
    }
}

/// Derives dashboard data from the stored progress.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<ProgressStore>,
}

impl DashboardService {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>) -> Self {
        Self { store }
    }

    /// Load the progress document and derive the dashboard from it.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError` if the document cannot be loaded.
    pub async fn snapshot(&self) -> Result<Dashboard, ProgressStoreError> {
        let progress = self.store.load().await?;
        Ok(Dashboard::build(&progress, self.store.catalog()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use learn_core::Catalog;
    use learn_core::model::{CourseId, LessonId};
    use learn_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn snapshot_reflects_store_mutations() {
        let store = Arc::new(ProgressStore::new(
            fixed_clock(),
            Arc::new(Catalog::builtin()),
            Arc::new(InMemoryRepository::new()),
        ));
        let html = CourseId::new("html");
        store
            .complete_lesson(html.clone(), LessonId::new(1))
            .await
            .unwrap();
        store
            .record_quiz_score(html.clone(), LessonId::new(1), 2, 2)
            .await
            .unwrap();

        let dashboard = DashboardService::new(Arc::clone(&store))
            .snapshot()
            .await
            .unwrap();

        assert_eq!(dashboard.totals.lessons_completed, 1);
        assert_eq!(dashboard.totals.quizzes_completed, 1);
        assert_eq!(dashboard.totals.total_points, 15);
        assert_eq!(dashboard.earned_count, 1);
        assert_eq!(dashboard.totals.badges_earned, 1);
        assert_eq!(dashboard.badge_count, 4);
        assert_eq!(dashboard.courses.len(), 6);
        assert_eq!(dashboard.recent_activity.len(), 2);

        let html_stats = dashboard
            .courses
            .iter()
            .find(|c| c.course_id == html)
            .unwrap();
        assert_eq!(html_stats.percentage, 8);
        assert_eq!(html_stats.average_quiz_percentage, 100);
    }

    #[tokio::test]
    async fn snapshot_serializes_to_json() {
        let store = Arc::new(ProgressStore::new(
            fixed_clock(),
            Arc::new(Catalog::builtin()),
            Arc::new(InMemoryRepository::new()),
        ));
        let dashboard = DashboardService::new(store).snapshot().await.unwrap();
        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["totals"]["total_points"], 0);
        assert_eq!(json["badge_count"], 4);
    }
}
