//! Course catalog authoring: courses, modules, content items and quiz questions.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use learnhub_core::grading::validate_options;
use learnhub_core::models::{
    AdminQuizQuestion, AdminQuizView, ContentLocation, ContentType, Course, CourseDetail,
    CourseStatus, CourseSummary, CreateContentRequest, CreateCourseRequest, CreateModuleRequest,
    CreateQuestionRequest, Module, ModuleContent, ModuleDetail, NewContent, NewQuestion,
    QuestionType, QuestionWithOptions, ReplaceOptionsRequest,
};
use learnhub_core::{Actor, AppError};
use learnhub_db::{CatalogRepository, Repositories};
use uuid::Uuid;

use crate::found;

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse<T: FromStr<Err = anyhow::Error>>(value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|e| AppError::InvalidInput(e.to_string()))
}

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            catalog: repos.catalog.clone(),
        }
    }

    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username))]
    pub async fn create_course(
        &self,
        actor: &Actor,
        request: CreateCourseRequest,
    ) -> Result<Course, AppError> {
        actor.require_admin()?;
        let status = match request.status.as_deref() {
            Some(s) => parse::<CourseStatus>(s)?,
            None => CourseStatus::Draft,
        };
        let title = request.title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Course title is required".to_string()));
        }

        let description = non_empty(request.description);
        let course = self
            .catalog
            .create_course(title, description.as_deref(), status)
            .await?;

        tracing::info!(course_id = %course.id, status = %course.status, "Course created");
        Ok(course)
    }

    pub async fn list_courses(&self, actor: &Actor) -> Result<Vec<CourseSummary>, AppError> {
        actor.require_admin()?;
        self.catalog.list_courses(None).await
    }

    /// Course with modules and contents in display order. No authorization check.
    pub async fn course_detail(&self, course_id: Uuid) -> Result<CourseDetail, AppError> {
        let course = found(self.catalog.get_course(course_id).await?, "Course")?;
        let modules = self.catalog.list_modules(course_id).await?;

        let mut by_module: HashMap<Uuid, Vec<ModuleContent>> = HashMap::new();
        for content in self.catalog.list_course_contents(course_id).await? {
            by_module.entry(content.module_id).or_default().push(content);
        }

        Ok(CourseDetail {
            course,
            modules: modules
                .into_iter()
                .map(|module| ModuleDetail {
                    contents: by_module.remove(&module.id).unwrap_or_default(),
                    module,
                })
                .collect(),
        })
    }

    pub async fn get_course(&self, actor: &Actor, course_id: Uuid) -> Result<CourseDetail, AppError> {
        actor.require_admin()?;
        self.course_detail(course_id).await
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn delete_course(&self, actor: &Actor, course_id: Uuid) -> Result<(), AppError> {
        actor.require_admin()?;
        if !self.catalog.delete_course(course_id).await? {
            return Err(AppError::NotFound("Course not found".to_string()));
        }
        tracing::info!(course_id = %course_id, "Course deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username))]
    pub async fn create_module(
        &self,
        actor: &Actor,
        course_id: Uuid,
        request: CreateModuleRequest,
    ) -> Result<Module, AppError> {
        actor.require_admin()?;
        found(self.catalog.get_course(course_id).await?, "Course")?;

        let title = request.title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Module title is required".to_string()));
        }
        let description = non_empty(request.description);

        let module = self
            .catalog
            .create_module(course_id, title, description.as_deref(), request.position)
            .await?;
        tracing::info!(course_id = %course_id, module_id = %module.id, position = module.position, "Module created");
        Ok(module)
    }

    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username))]
    pub async fn create_content(
        &self,
        actor: &Actor,
        module_id: Uuid,
        request: CreateContentRequest,
    ) -> Result<ModuleContent, AppError> {
        actor.require_admin()?;
        found(self.catalog.get_module(module_id).await?, "Module")?;

        let content_type = parse::<ContentType>(&request.content_type)?;
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Content title is required".to_string()));
        }
        let file_path = non_empty(request.file_path);
        match (content_type.requires_file(), file_path.is_some()) {
            (true, false) => {
                return Err(AppError::InvalidInput(format!(
                    "{} content requires a file",
                    content_type
                )))
            }
            (false, true) => {
                return Err(AppError::InvalidInput(
                    "Quiz content cannot carry a file".to_string(),
                ))
            }
            _ => {}
        }

        let content = self
            .catalog
            .create_content(NewContent {
                module_id,
                title,
                content_type,
                file_path,
                body: non_empty(request.body),
                position: request.position,
            })
            .await?;
        tracing::info!(module_id = %module_id, content_id = %content.id, content_type = %content.content_type, "Content created");
        Ok(content)
    }

    /// Content item that must be a quiz
    pub async fn quiz_location(&self, content_id: Uuid) -> Result<ContentLocation, AppError> {
        let location = found(
            self.catalog.get_content_location(content_id).await?,
            "Quiz",
        )?;
        if location.content.content_type != ContentType::Quiz {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }
        Ok(location)
    }

    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username))]
    pub async fn create_question(
        &self,
        actor: &Actor,
        content_id: Uuid,
        request: CreateQuestionRequest,
    ) -> Result<AdminQuizQuestion, AppError> {
        actor.require_admin()?;
        let location = found(
            self.catalog.get_content_location(content_id).await?,
            "Content",
        )?;
        if location.content.content_type != ContentType::Quiz {
            return Err(AppError::InvalidInput(
                "Questions can only be added to quiz content".to_string(),
            ));
        }

        let question_type = parse::<QuestionType>(&request.question_type)?;
        let question_text = request.question_text.trim().to_string();
        if question_text.is_empty() {
            return Err(AppError::InvalidInput("Question text is required".to_string()));
        }
        validate_options(question_type, &request.options)?;

        let created = self
            .catalog
            .create_question(NewQuestion {
                content_id,
                question_text,
                question_type,
                position: request.position,
                options: request.options,
            })
            .await?;
        tracing::info!(content_id = %content_id, question_id = %created.question.id, "Quiz question created");
        Ok(AdminQuizQuestion::from(&created))
    }

    /// Swap a question's whole option set in one step.
    #[tracing::instrument(skip(self, actor, request), fields(actor = %actor.username))]
    pub async fn replace_question_options(
        &self,
        actor: &Actor,
        question_id: Uuid,
        request: ReplaceOptionsRequest,
    ) -> Result<AdminQuizQuestion, AppError> {
        actor.require_admin()?;
        let question = found(self.catalog.get_question(question_id).await?, "Question")?;
        validate_options(question.question_type, &request.options)?;

        let updated: QuestionWithOptions = found(
            self.catalog
                .replace_question_options(question_id, &request.options)
                .await?,
            "Question",
        )?;
        tracing::info!(question_id = %question_id, option_count = updated.options.len(), "Quiz options replaced");
        Ok(AdminQuizQuestion::from(&updated))
    }

    pub async fn admin_quiz(&self, actor: &Actor, content_id: Uuid) -> Result<AdminQuizView, AppError> {
        actor.require_admin()?;
        let location = self.quiz_location(content_id).await?;
        let questions = self.catalog.list_questions(content_id).await?;

        Ok(AdminQuizView {
            content_id,
            title: location.content.title,
            questions: questions.iter().map(AdminQuizQuestion::from).collect(),
        })
    }

    pub async fn questions(&self, content_id: Uuid) -> Result<Vec<QuestionWithOptions>, AppError> {
        self.catalog.list_questions(content_id).await
    }
}
