use chrono::Utc;
use learnhub_core::models::{
    ContentLocation, Course, CourseStatus, CourseSummary, Module, ModuleContent, NewContent,
    NewQuestion, QuestionWithOptions, QuizOption, QuizOptionInput, QuizQuestion,
};
use learnhub_core::AppError;
use uuid::Uuid;

use super::{next_position, MemoryState, MemoryStore};
use crate::db::traits::CatalogRepository;

fn build_options(question_id: Uuid, options: &[QuizOptionInput]) -> Vec<QuizOption> {
    options
        .iter()
        .map(|option| QuizOption {
            id: Uuid::new_v4(),
            question_id,
            option_text: option.option_text.trim().to_string(),
            is_correct: option.is_correct,
        })
        .collect()
}

fn with_options(state: &MemoryState, question: &QuizQuestion) -> QuestionWithOptions {
    QuestionWithOptions {
        question: question.clone(),
        options: state.options.get(&question.id).cloned().unwrap_or_default(),
    }
}

fn sorted_modules(state: &MemoryState, course_id: Uuid) -> Vec<Module> {
    let mut modules: Vec<Module> = state
        .modules
        .values()
        .filter(|m| m.course_id == course_id)
        .cloned()
        .collect();
    modules.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then(a.created_at.cmp(&b.created_at))
    });
    modules
}

#[async_trait::async_trait]
impl CatalogRepository for MemoryStore {
    async fn create_course(
        &self,
        title: &str,
        description: Option<&str>,
        status: CourseStatus,
    ) -> Result<Course, AppError> {
        let course = Course {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.map(str::to_string),
            status,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .courses
            .insert(course.id, course.clone());
        Ok(course)
    }

    async fn get_course(&self, course_id: Uuid) -> Result<Option<Course>, AppError> {
        Ok(self.state.read().await.courses.get(&course_id).cloned())
    }

    async fn list_courses(
        &self,
        status: Option<CourseStatus>,
    ) -> Result<Vec<CourseSummary>, AppError> {
        let state = self.state.read().await;
        let mut courses: Vec<CourseSummary> = state
            .courses
            .values()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .map(|course| CourseSummary {
                module_count: state
                    .modules
                    .values()
                    .filter(|m| m.course_id == course.id)
                    .count() as i64,
                course: course.clone(),
            })
            .collect();
        courses.sort_by(|a, b| {
            b.course
                .created_at
                .cmp(&a.course.created_at)
                .then(a.course.id.cmp(&b.course.id))
        });
        Ok(courses)
    }

    async fn delete_course(&self, course_id: Uuid) -> Result<bool, AppError> {
        Ok(self.state.write().await.remove_course(course_id))
    }

    async fn create_module(
        &self,
        course_id: Uuid,
        title: &str,
        description: Option<&str>,
        position: Option<i32>,
    ) -> Result<Module, AppError> {
        let mut state = self.state.write().await;
        if !state.courses.contains_key(&course_id) {
            return Err(AppError::NotFound("Course not found".to_string()));
        }

        let position = position.unwrap_or_else(|| {
            next_position(
                state
                    .modules
                    .values()
                    .filter(|m| m.course_id == course_id)
                    .map(|m| m.position),
            )
        });
        let module = Module {
            id: Uuid::new_v4(),
            course_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            position,
            created_at: Utc::now(),
        };
        state.modules.insert(module.id, module.clone());
        Ok(module)
    }

    async fn get_module(&self, module_id: Uuid) -> Result<Option<Module>, AppError> {
        Ok(self.state.read().await.modules.get(&module_id).cloned())
    }

    async fn list_modules(&self, course_id: Uuid) -> Result<Vec<Module>, AppError> {
        Ok(sorted_modules(&*self.state.read().await, course_id))
    }

    async fn count_modules(&self, course_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state
            .modules
            .values()
            .filter(|m| m.course_id == course_id)
            .count() as i64)
    }

    async fn create_content(&self, content: NewContent) -> Result<ModuleContent, AppError> {
        let mut state = self.state.write().await;
        if !state.modules.contains_key(&content.module_id) {
            return Err(AppError::NotFound("Module not found".to_string()));
        }

        let position = content.position.unwrap_or_else(|| {
            next_position(
                state
                    .contents
                    .values()
                    .filter(|c| c.module_id == content.module_id)
                    .map(|c| c.position),
            )
        });
        let created = ModuleContent {
            id: Uuid::new_v4(),
            module_id: content.module_id,
            title: content.title,
            content_type: content.content_type,
            file_path: content.file_path,
            body: content.body,
            position,
            created_at: Utc::now(),
        };
        state.contents.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_course_contents(&self, course_id: Uuid) -> Result<Vec<ModuleContent>, AppError> {
        let state = self.state.read().await;
        let mut ordered = Vec::new();
        for module in sorted_modules(&state, course_id) {
            let mut contents: Vec<ModuleContent> = state
                .contents
                .values()
                .filter(|c| c.module_id == module.id)
                .cloned()
                .collect();
            contents.sort_by(|a, b| {
                a.position
                    .cmp(&b.position)
                    .then(a.created_at.cmp(&b.created_at))
            });
            ordered.extend(contents);
        }
        Ok(ordered)
    }

    async fn get_content_location(
        &self,
        content_id: Uuid,
    ) -> Result<Option<ContentLocation>, AppError> {
        let state = self.state.read().await;
        Ok(state.contents.get(&content_id).and_then(|content| {
            state
                .course_of_module(content.module_id)
                .map(|course_id| ContentLocation {
                    content: content.clone(),
                    course_id,
                })
        }))
    }

    async fn create_question(
        &self,
        question: NewQuestion,
    ) -> Result<QuestionWithOptions, AppError> {
        let mut state = self.state.write().await;
        if !state.contents.contains_key(&question.content_id) {
            return Err(AppError::NotFound("Content not found".to_string()));
        }

        let position = question.position.unwrap_or_else(|| {
            next_position(
                state
                    .questions
                    .values()
                    .filter(|q| q.content_id == question.content_id)
                    .map(|q| q.position),
            )
        });
        let created = QuizQuestion {
            id: Uuid::new_v4(),
            content_id: question.content_id,
            question_text: question.question_text,
            question_type: question.question_type,
            position,
        };
        let options = build_options(created.id, &question.options);

        state.questions.insert(created.id, created.clone());
        state.options.insert(created.id, options.clone());
        Ok(QuestionWithOptions {
            question: created,
            options,
        })
    }

    async fn get_question(&self, question_id: Uuid) -> Result<Option<QuizQuestion>, AppError> {
        Ok(self.state.read().await.questions.get(&question_id).cloned())
    }

    async fn replace_question_options(
        &self,
        question_id: Uuid,
        options: &[QuizOptionInput],
    ) -> Result<Option<QuestionWithOptions>, AppError> {
        let mut state = self.state.write().await;
        let Some(question) = state.questions.get(&question_id).cloned() else {
            return Ok(None);
        };

        let options = build_options(question_id, options);
        state.options.insert(question_id, options.clone());
        Ok(Some(QuestionWithOptions { question, options }))
    }

    async fn list_questions(&self, content_id: Uuid) -> Result<Vec<QuestionWithOptions>, AppError> {
        let state = self.state.read().await;
        let mut questions: Vec<&QuizQuestion> = state
            .questions
            .values()
            .filter(|q| q.content_id == content_id)
            .collect();
        questions.sort_by(|a, b| a.position.cmp(&b.position).then(a.id.cmp(&b.id)));
        Ok(questions
            .into_iter()
            .map(|q| with_options(&state, q))
            .collect())
    }
}
