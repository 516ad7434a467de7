#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod dashboard_service;
pub mod error;
pub mod progress_store;
pub mod quiz;

pub use learn_core::Clock;

pub use app_services::{AppServices, CatalogSource};
pub use catalog_service::{CatalogService, CourseOverview, LessonEntry};
pub use dashboard_service::{Dashboard, DashboardService};
pub use error::{AppServicesError, ProgressStoreError, QuizError};
pub use progress_store::{LessonCompletion, ProgressStore, QuizRecord};
pub use quiz::{QuestionReview, QuizGrade, QuizOutcome, QuizProgress, QuizService, QuizSession};
