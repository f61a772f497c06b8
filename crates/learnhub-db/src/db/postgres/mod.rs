//! PostgreSQL repositories

mod assignment;
mod catalog;
mod course_request;
mod directory;
mod progress;
mod statistics;

pub use assignment::PostgresAssignmentRepository;
pub use catalog::PostgresCatalogRepository;
pub use course_request::PostgresCourseRequestRepository;
pub use directory::PostgresDirectoryRepository;
pub use progress::PostgresProgressRepository;
pub use statistics::PostgresStatisticsRepository;

use learnhub_core::AppError;

/// Turn a unique-constraint violation into a conflict; pass anything else through.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}
