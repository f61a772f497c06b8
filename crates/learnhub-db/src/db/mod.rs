//! Database repositories for the data access layer
//!
//! `traits` declares one repository per aggregate; `postgres` and `memory` provide
//! the two backends. [`Repositories`] bundles a full backend behind trait objects.

pub mod memory;
pub mod postgres;
pub mod traits;
pub mod transaction;

use std::sync::Arc;

use sqlx::PgPool;

pub use memory::MemoryStore;
pub use postgres::{
    PostgresAssignmentRepository, PostgresCatalogRepository, PostgresCourseRequestRepository,
    PostgresDirectoryRepository, PostgresProgressRepository, PostgresStatisticsRepository,
};
pub use traits::{
    AssignmentRepository, CatalogRepository, CourseRequestRepository, DirectoryRepository,
    EnrollmentScope, ProgressRepository, RequestFilter, StatisticsRepository,
};

/// One complete persistence backend
#[derive(Clone)]
pub struct Repositories {
    pub directory: Arc<dyn DirectoryRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub requests: Arc<dyn CourseRequestRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub statistics: Arc<dyn StatisticsRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        tracing::info!("Initializing PostgreSQL repositories");
        Self {
            directory: Arc::new(PostgresDirectoryRepository::new(pool.clone())),
            assignments: Arc::new(PostgresAssignmentRepository::new(pool.clone())),
            requests: Arc::new(PostgresCourseRequestRepository::new(pool.clone())),
            catalog: Arc::new(PostgresCatalogRepository::new(pool.clone())),
            progress: Arc::new(PostgresProgressRepository::new(pool.clone())),
            statistics: Arc::new(PostgresStatisticsRepository::new(pool)),
        }
    }

    /// All repositories backed by one shared in-process store
    pub fn memory(store: MemoryStore) -> Self {
        Self {
            directory: Arc::new(store.clone()),
            assignments: Arc::new(store.clone()),
            requests: Arc::new(store.clone()),
            catalog: Arc::new(store.clone()),
            progress: Arc::new(store.clone()),
            statistics: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        tracing::info!("Initializing in-memory repositories");
        Self::memory(MemoryStore::new())
    }
}
