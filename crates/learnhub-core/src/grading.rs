//! Quiz option validation and grading

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use crate::constants::QUIZ_PASS_THRESHOLD_PERCENT;
use crate::error::AppError;
use crate::models::{
    QuestionResult, QuestionType, QuestionWithOptions, QuizOptionInput, QuizResult,
    SubmittedAnswer,
};
use crate::stats::round2;

/// Check the structural rules for a question's option set.
pub fn validate_options(
    question_type: QuestionType,
    options: &[QuizOptionInput],
) -> Result<(), AppError> {
    if options.len() < 2 {
        return Err(AppError::InvalidInput(
            "A question needs at least 2 options".to_string(),
        ));
    }

    if options.iter().any(|o| o.option_text.trim().is_empty()) {
        return Err(AppError::InvalidInput(
            "Option text cannot be empty".to_string(),
        ));
    }

    let correct = options.iter().filter(|o| o.is_correct).count();
    if correct == 0 {
        return Err(AppError::InvalidInput(
            "At least one option must be marked correct".to_string(),
        ));
    }
    if question_type.is_single_answer() && correct > 1 {
        return Err(AppError::InvalidInput(format!(
            "{} questions must have exactly one correct option",
            question_type
        )));
    }

    Ok(())
}

pub fn is_passing(percentage: f64) -> bool {
    percentage >= QUIZ_PASS_THRESHOLD_PERCENT
}

/// Single-answer questions look at the raw submission, so a repeated id is
/// two selections.
fn is_answer_correct(
    question_type: QuestionType,
    submitted: &[Uuid],
    correct: &BTreeSet<Uuid>,
) -> bool {
    if question_type.is_single_answer() {
        matches!(submitted, [only] if correct.contains(only))
    } else {
        submitted.iter().copied().collect::<BTreeSet<Uuid>>() == *correct
    }
}

/// Grade `answers` against `questions`. Answers for questions outside the set are
/// ignored; an unanswered question counts as an empty selection.
pub fn grade(
    questions: &[QuestionWithOptions],
    answers: &[SubmittedAnswer],
) -> Result<QuizResult, AppError> {
    if questions.is_empty() {
        return Err(AppError::NotFound(
            "No questions found for this quiz".to_string(),
        ));
    }

    let submitted: HashMap<Uuid, &Vec<Uuid>> = answers
        .iter()
        .map(|a| (a.question_id, &a.selected_option_ids))
        .collect();

    let question_results: Vec<QuestionResult> = questions
        .iter()
        .map(|q| {
            let raw: &[Uuid] = submitted
                .get(&q.question.id)
                .map(|ids| ids.as_slice())
                .unwrap_or_default();
            let selected: BTreeSet<Uuid> = raw.iter().copied().collect();
            let correct: BTreeSet<Uuid> = q.correct_option_ids().into_iter().collect();

            QuestionResult {
                question_id: q.question.id,
                question_text: q.question.question_text.clone(),
                is_correct: is_answer_correct(q.question.question_type, raw, &correct),
                selected_option_ids: selected.into_iter().collect(),
                correct_option_ids: correct.into_iter().collect(),
            }
        })
        .collect();

    let total = question_results.len() as u32;
    let score = question_results.iter().filter(|r| r.is_correct).count() as u32;
    let raw_percentage = (score * 100) as f64 / total as f64;

    Ok(QuizResult {
        score,
        total_questions: total,
        percentage: round2(raw_percentage),
        passed: is_passing(raw_percentage),
        question_results,
    })
}
