use std::path::PathBuf;
use std::sync::Arc;

use learn_core::Catalog;
use storage::repository::{ProgressRepository, Storage};

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::progress_store::ProgressStore;
use crate::quiz::QuizService;

/// Where course content comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogSource {
    #[default]
    Builtin,
    File(PathBuf),
}

impl CatalogSource {
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or fails validation.
    pub fn load(&self) -> Result<Catalog, learn_core::CatalogError> {
        match self {
            CatalogSource::Builtin => Ok(Catalog::builtin()),
            CatalogSource::File(path) => Catalog::from_path(path),
        }
    }
}

/// Assembles app-facing services around one progress store.
#[derive(Clone)]
pub struct AppServices {
    progress_was_reset: bool,
    progress_store: Arc<ProgressStore>,
    catalog_service: Arc<CatalogService>,
    quiz_service: Arc<QuizService>,
    dashboard_service: Arc<DashboardService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage under `storage_key`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog cannot be loaded or storage
    /// initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        storage_key: &str,
        catalog: &CatalogSource,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let catalog = catalog.load()?;
        let storage = Storage::sqlite(db_url, storage_key).await?;
        Self::with_storage(&storage, catalog, clock).await
    }

    /// Build services over a fresh in-memory slot.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if seeding the default document fails.
    pub async fn in_memory(catalog: Catalog, clock: Clock) -> Result<Self, AppServicesError> {
        Self::with_storage(&Storage::in_memory(), catalog, clock).await
    }

    /// Build services over existing storage, resetting an unreadable
    /// progress document to defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the document cannot be loaded or reset.
    pub async fn with_storage(
        storage: &Storage,
        catalog: Catalog,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(catalog);
        let progress: Arc<dyn ProgressRepository> = Arc::clone(&storage.progress);
        let progress_store = Arc::new(ProgressStore::new(clock, Arc::clone(&catalog), progress));
        let (_, progress_was_reset) = progress_store.load_or_reset().await?;

        Ok(Self {
            progress_was_reset,
            catalog_service: Arc::new(CatalogService::new(catalog)),
            quiz_service: Arc::new(QuizService::new(Arc::clone(&progress_store))),
            dashboard_service: Arc::new(DashboardService::new(Arc::clone(&progress_store))),
            progress_store,
        })
    }

    /// True when the stored progress was unreadable and got replaced with
    /// defaults during startup.
    #[must_use]
    pub fn progress_was_reset(&self) -> bool {
        self.progress_was_reset
    }

    #[must_use]
    pub fn progress_store(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress_store)
    }

    #[must_use]
    pub fn catalog_service(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog_service)
    }

    #[must_use]
    pub fn quiz_service(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz_service)
    }

    #[must_use]
    pub fn dashboard_service(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard_service)
    }
}
