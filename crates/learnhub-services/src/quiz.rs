//! Quiz delivery and grading for learners.

use learnhub_core::grading::grade;
use learnhub_core::models::{
    EmployeeQuizQuestion, EmployeeQuizView, Interaction, QuizOutcome, QuizResult, QuizSubmission,
};
use learnhub_core::{Actor, AppError};
use learnhub_db::Repositories;
use uuid::Uuid;

use crate::{CatalogService, ContentTrackingService, CourseAvailabilityService};

#[derive(Clone)]
pub struct QuizService {
    catalog: CatalogService,
    availability: CourseAvailabilityService,
    tracking: ContentTrackingService,
}

impl QuizService {
    pub fn new(
        repos: &Repositories,
        availability: CourseAvailabilityService,
        tracking: ContentTrackingService,
    ) -> Self {
        Self {
            catalog: CatalogService::new(repos),
            availability,
            tracking,
        }
    }

    /// Questions and options without correctness flags
    pub async fn employee_quiz(
        &self,
        actor: &Actor,
        content_id: Uuid,
    ) -> Result<EmployeeQuizView, AppError> {
        let location = self.catalog.quiz_location(content_id).await?;
        self.availability
            .ensure_course_access(actor, location.course_id)
            .await?;

        let questions = self.catalog.questions(content_id).await?;
        Ok(EmployeeQuizView {
            content_id,
            title: location.content.title,
            questions: questions.iter().map(EmployeeQuizQuestion::from).collect(),
        })
    }

    /// Grade a submission, record it as the learner's latest quiz interaction and
    /// complete the module when it passes.
    #[tracing::instrument(skip(self, actor, submission), fields(actor = %actor.username, content_id = %content_id))]
    pub async fn submit(
        &self,
        actor: &Actor,
        content_id: Uuid,
        submission: QuizSubmission,
    ) -> Result<QuizResult, AppError> {
        actor.require_employee()?;
        let location = self.catalog.quiz_location(content_id).await?;
        self.availability
            .ensure_course_access(actor, location.course_id)
            .await?;

        let questions = self.catalog.questions(content_id).await?;
        let result = grade(&questions, &submission.answers)?;

        let interaction = Interaction::QuizCompleted(QuizOutcome {
            passed: result.passed,
            score: Some(result.score),
            percentage: Some(result.percentage),
        });
        let outcome = self
            .tracking
            .track(actor.user_id, &location, &interaction)
            .await?;

        tracing::info!(
            score = result.score,
            total_questions = result.total_questions,
            percentage = result.percentage,
            passed = result.passed,
            module_auto_completed = outcome.module_auto_completed,
            "Quiz submitted"
        );
        Ok(result)
    }
}
