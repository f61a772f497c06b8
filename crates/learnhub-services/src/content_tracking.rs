//! Content interactions and module auto-completion
//!
//! Every interaction is stored as the latest state for (user, content). When it
//! meets its completion threshold the owning module is marked complete once on
//! the caller's course progress, creating the progress record on first use.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use learnhub_core::models::{
    CompletionTarget, ContentLocation, ContentType, EmployeeContentView, EmployeeCourseDetail,
    Interaction, InteractionOutcome, InteractionType, ModuleProgressMap, RecordInteractionRequest,
};
use learnhub_core::{Actor, AppError};
use learnhub_db::{CatalogRepository, ProgressRepository, Repositories};
use uuid::Uuid;

use crate::{found, CatalogService, CourseAvailabilityService};

/// Progress events must match the item they report on. Quiz items only
/// complete through grading.
fn ensure_applies_to(
    interaction_type: InteractionType,
    content_type: ContentType,
) -> Result<(), AppError> {
    let applies = match interaction_type {
        InteractionType::VideoProgress => content_type == ContentType::Video,
        InteractionType::PdfProgress => content_type == ContentType::Pdf,
        InteractionType::ContentComplete => content_type != ContentType::Quiz,
        InteractionType::QuizCompleted => content_type == ContentType::Quiz,
    };
    if applies {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "{} does not apply to {} content",
            interaction_type, content_type
        )))
    }
}

#[derive(Clone)]
pub struct ContentTrackingService {
    catalog_repo: Arc<dyn CatalogRepository>,
    progress: Arc<dyn ProgressRepository>,
    availability: CourseAvailabilityService,
    catalog: CatalogService,
}

impl ContentTrackingService {
    pub fn new(
        repos: &Repositories,
        availability: CourseAvailabilityService,
        catalog: CatalogService,
    ) -> Self {
        Self {
            catalog_repo: repos.catalog.clone(),
            progress: repos.progress.clone(),
            availability,
            catalog,
        }
    }

    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username, content_id = %content_id))]
    pub async fn record_interaction(
        &self,
        actor: &Actor,
        content_id: Uuid,
        request: RecordInteractionRequest,
    ) -> Result<InteractionOutcome, AppError> {
        actor.require_employee()?;
        let interaction_type = InteractionType::from_str(request.interaction_type.trim())
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        if interaction_type == InteractionType::QuizCompleted {
            return Err(AppError::InvalidInput(
                "Quiz results are recorded by submitting the quiz".to_string(),
            ));
        }

        let location = found(
            self.catalog_repo.get_content_location(content_id).await?,
            "Content",
        )?;
        self.availability
            .ensure_course_access(actor, location.course_id)
            .await?;
        ensure_applies_to(interaction_type, location.content.content_type)?;

        let interaction = Interaction::from_parts(interaction_type, request.data)?;
        self.track(actor.user_id, &location, &interaction).await
    }

    /// Store `interaction` and run auto-completion for its module.
    pub(crate) async fn track(
        &self,
        user_id: Uuid,
        location: &ContentLocation,
        interaction: &Interaction,
    ) -> Result<InteractionOutcome, AppError> {
        let now = Utc::now();
        let content_id = location.content.id;
        let target = interaction.completes_content().then_some(CompletionTarget {
            course_id: location.course_id,
            module_id: location.content.module_id,
        });

        let recorded = self
            .progress
            .record_interaction(user_id, content_id, interaction, target, now)
            .await?;

        let Some(outcome) = recorded.completion else {
            return Ok(InteractionOutcome {
                recorded: true,
                content_id,
                interaction_type: interaction.interaction_type(),
                module_auto_completed: false,
                progress: None,
            });
        };

        if outcome.newly_completed {
            tracing::info!(
                user_id = %user_id,
                course_id = %location.course_id,
                module_id = %location.content.module_id,
                completed_modules = outcome.progress.completed_modules,
                total_modules = outcome.progress.total_modules,
                "Module auto-completed"
            );
            if outcome.progress.completion_date == Some(now) {
                tracing::info!(user_id = %user_id, course_id = %location.course_id, "Course completed");
            }
        }

        Ok(InteractionOutcome {
            recorded: true,
            content_id,
            interaction_type: interaction.interaction_type(),
            module_auto_completed: outcome.newly_completed,
            progress: Some(outcome.progress.snapshot()),
        })
    }

    /// A single item of a course the caller may open
    pub async fn content(
        &self,
        actor: &Actor,
        content_id: Uuid,
    ) -> Result<EmployeeContentView, AppError> {
        let location = found(
            self.catalog_repo.get_content_location(content_id).await?,
            "Content",
        )?;
        self.availability
            .ensure_course_access(actor, location.course_id)
            .await?;

        let question_count = if location.content.content_type == ContentType::Quiz {
            Some(self.catalog.questions(content_id).await?.len())
        } else {
            None
        };
        Ok(EmployeeContentView {
            content: location.content,
            course_id: location.course_id,
            question_count,
        })
    }

    /// Course structure with the caller's module completion map
    pub async fn course_detail(
        &self,
        actor: &Actor,
        course_id: Uuid,
    ) -> Result<EmployeeCourseDetail, AppError> {
        found(self.catalog_repo.get_course(course_id).await?, "Course")?;
        self.availability.ensure_course_access(actor, course_id).await?;

        let detail = self.catalog.course_detail(course_id).await?;
        let progress = self.progress.get_progress(actor.user_id, course_id).await?;

        Ok(EmployeeCourseDetail {
            detail,
            module_progress: progress
                .as_ref()
                .map(|p| p.module_progress.clone())
                .unwrap_or_else(ModuleProgressMap::default),
            progress: progress.map(|p| p.snapshot()),
        })
    }
}
