use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "kebab-case"))]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
}

impl QuestionType {
    /// Whether the question accepts exactly one selected option
    pub fn is_single_answer(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::TrueFalse)
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            QuestionType::SingleChoice => write!(f, "single-choice"),
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::TrueFalse => write!(f, "true-false"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-choice" => Ok(QuestionType::SingleChoice),
            "multiple-choice" => Ok(QuestionType::MultipleChoice),
            "true-false" => Ok(QuestionType::TrueFalse),
            _ => Err(anyhow::anyhow!(
                "Invalid question type: {}. Must be one of: single-choice, multiple-choice, true-false",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QuizQuestion {
    pub id: Uuid,
    pub content_id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QuizOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub option_text: String,
    pub is_correct: bool,
}

/// A question with its full option set, including correctness flags
#[derive(Debug, Clone)]
pub struct QuestionWithOptions {
    pub question: QuizQuestion,
    pub options: Vec<QuizOption>,
}

impl QuestionWithOptions {
    pub fn correct_option_ids(&self) -> Vec<Uuid> {
        self.options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.id)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminQuizOption {
    pub id: Uuid,
    pub option_text: String,
    pub is_correct: bool,
}

/// Learner-facing option. Correctness is deliberately absent from this type.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeQuizOption {
    pub id: Uuid,
    pub option_text: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminQuizQuestion {
    pub id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub position: i32,
    pub options: Vec<AdminQuizOption>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeQuizQuestion {
    pub id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub position: i32,
    pub options: Vec<EmployeeQuizOption>,
}

impl From<&QuestionWithOptions> for AdminQuizQuestion {
    fn from(q: &QuestionWithOptions) -> Self {
        AdminQuizQuestion {
            id: q.question.id,
            question_text: q.question.question_text.clone(),
            question_type: q.question.question_type,
            position: q.question.position,
            options: q
                .options
                .iter()
                .map(|o| AdminQuizOption {
                    id: o.id,
                    option_text: o.option_text.clone(),
                    is_correct: o.is_correct,
                })
                .collect(),
        }
    }
}

impl From<&QuestionWithOptions> for EmployeeQuizQuestion {
    fn from(q: &QuestionWithOptions) -> Self {
        EmployeeQuizQuestion {
            id: q.question.id,
            question_text: q.question.question_text.clone(),
            question_type: q.question.question_type,
            position: q.question.position,
            options: q
                .options
                .iter()
                .map(|o| EmployeeQuizOption {
                    id: o.id,
                    option_text: o.option_text.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminQuizView {
    pub content_id: Uuid,
    pub title: String,
    pub questions: Vec<AdminQuizQuestion>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeQuizView {
    pub content_id: Uuid,
    pub title: String,
    pub questions: Vec<EmployeeQuizQuestion>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuizOptionInput {
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, message = "Question text is required"))]
    pub question_text: String,
    pub question_type: String,
    pub options: Vec<QuizOptionInput>,
    #[serde(default)]
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceOptionsRequest {
    pub options: Vec<QuizOptionInput>,
}

/// Insert payload for a question with its options
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub content_id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub position: Option<i32>,
    pub options: Vec<QuizOptionInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    #[serde(default)]
    pub selected_option_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuizSubmission {
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionResult {
    pub question_id: Uuid,
    pub question_text: String,
    pub selected_option_ids: Vec<Uuid>,
    pub correct_option_ids: Vec<Uuid>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizResult {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub passed: bool,
    pub question_results: Vec<QuestionResult>,
}
