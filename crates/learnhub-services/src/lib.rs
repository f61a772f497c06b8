//! LearnHub Services Layer
//!
//! Business operations over the repository traits: course availability, purchase
//! requests, catalog authoring, content tracking, quiz grading, reporting and the
//! organization directory. Every operation takes the caller's [`Actor`] and performs
//! its own authorization; HTTP concerns stay in learnhub-api.
//!
//! [`Actor`]: learnhub_core::Actor

pub mod availability;
pub mod catalog;
pub mod content_tracking;
pub mod course_requests;
pub mod directory;
pub mod quiz;
pub mod statistics;

pub use availability::CourseAvailabilityService;
pub use catalog::CatalogService;
pub use content_tracking::ContentTrackingService;
pub use course_requests::CourseRequestService;
pub use directory::DirectoryService;
pub use quiz::QuizService;
pub use statistics::StatisticsService;

use learnhub_core::AppError;
use learnhub_db::Repositories;

/// Every service wired to one persistence backend
#[derive(Clone)]
pub struct LearnHubServices {
    pub availability: CourseAvailabilityService,
    pub requests: CourseRequestService,
    pub catalog: CatalogService,
    pub tracking: ContentTrackingService,
    pub quizzes: QuizService,
    pub statistics: StatisticsService,
    pub directory: DirectoryService,
}

impl LearnHubServices {
    pub fn new(repos: &Repositories) -> Self {
        let availability = CourseAvailabilityService::new(repos);
        let catalog = CatalogService::new(repos);
        let tracking = ContentTrackingService::new(repos, availability.clone(), catalog.clone());

        Self {
            requests: CourseRequestService::new(repos),
            quizzes: QuizService::new(repos, availability.clone(), tracking.clone()),
            statistics: StatisticsService::new(repos),
            directory: DirectoryService::new(repos),
            availability,
            catalog,
            tracking,
        }
    }
}

pub(crate) fn found<T>(value: Option<T>, what: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::NotFound(format!("{} not found", what)))
}
