use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::constants::{
    PDF_COMPLETION_THRESHOLD, PDF_MIN_TIME_THRESHOLD_SECS, PDF_PAGES_WEIGHT,
    PDF_SECONDS_PER_PAGE, PDF_TIME_WEIGHT, VIDEO_COMPLETION_THRESHOLD,
};
use crate::error::AppError;
use crate::models::ProgressSnapshot;
use crate::stats::round2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    VideoProgress,
    PdfProgress,
    QuizCompleted,
    ContentComplete,
}

impl Display for InteractionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            InteractionType::VideoProgress => write!(f, "video_progress"),
            InteractionType::PdfProgress => write!(f, "pdf_progress"),
            InteractionType::QuizCompleted => write!(f, "quiz_completed"),
            InteractionType::ContentComplete => write!(f, "content_complete"),
        }
    }
}

impl FromStr for InteractionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video_progress" => Ok(InteractionType::VideoProgress),
            "pdf_progress" => Ok(InteractionType::PdfProgress),
            "quiz_completed" => Ok(InteractionType::QuizCompleted),
            "content_complete" => Ok(InteractionType::ContentComplete),
            _ => Err(anyhow::anyhow!("Invalid interaction type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoProgress {
    pub current_time: f64,
    pub duration: f64,
    pub progress_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfProgress {
    pub pages_viewed: Vec<u32>,
    pub total_pages: u32,
    pub time_spent_seconds: f64,
    pub scroll_percentage: f64,
    pub pages_completion: f64,
    pub time_threshold: f64,
    pub time_completion: f64,
    pub overall_completion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// A decoded interaction event. Payload shape is fixed by the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    VideoProgress(VideoProgress),
    PdfProgress(PdfProgress),
    QuizCompleted(QuizOutcome),
    ContentComplete,
}

#[derive(Debug, Default, Deserialize)]
struct RawVideoProgress {
    #[serde(default)]
    current_time: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    progress_percentage: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPdfProgress {
    #[serde(default)]
    pages_viewed: Vec<u32>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    time_spent_seconds: f64,
    #[serde(default)]
    scroll_percentage: f64,
}

fn ensure_finite_non_negative(name: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "{} must be a non-negative number",
            name
        )));
    }
    Ok(())
}

fn decode<T: serde::de::DeserializeOwned + Default>(
    kind: InteractionType,
    data: serde_json::Value,
) -> Result<T, AppError> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|e| {
        AppError::InvalidInput(format!("Invalid {} payload: {}", kind, e))
    })
}

impl VideoProgress {
    fn from_raw(raw: RawVideoProgress) -> Result<Self, AppError> {
        ensure_finite_non_negative("current_time", raw.current_time)?;
        ensure_finite_non_negative("duration", raw.duration)?;

        let supplied = raw.progress_percentage.filter(|p| *p > 0.0);
        let progress_percentage = match supplied {
            Some(p) => {
                ensure_finite_non_negative("progress_percentage", p)?;
                p
            }
            None if raw.duration > 0.0 => round2(raw.current_time / raw.duration * 100.0),
            None => 0.0,
        };

        Ok(VideoProgress {
            current_time: raw.current_time,
            duration: raw.duration,
            progress_percentage,
        })
    }
}

impl PdfProgress {
    fn from_raw(raw: RawPdfProgress) -> Result<Self, AppError> {
        ensure_finite_non_negative("time_spent_seconds", raw.time_spent_seconds)?;
        ensure_finite_non_negative("scroll_percentage", raw.scroll_percentage)?;

        let pages_viewed: Vec<u32> = raw
            .pages_viewed
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let pages_completion = if raw.total_pages > 0 {
            (pages_viewed.len() as f64 / raw.total_pages as f64 * 100.0).min(100.0)
        } else {
            0.0
        };
        let time_threshold =
            PDF_MIN_TIME_THRESHOLD_SECS.max(raw.total_pages as f64 * PDF_SECONDS_PER_PAGE);
        let time_completion = (raw.time_spent_seconds / time_threshold * 100.0).min(100.0);
        let overall_completion =
            PDF_PAGES_WEIGHT * pages_completion + PDF_TIME_WEIGHT * time_completion;

        Ok(PdfProgress {
            pages_viewed,
            total_pages: raw.total_pages,
            time_spent_seconds: raw.time_spent_seconds,
            scroll_percentage: raw.scroll_percentage,
            pages_completion: round2(pages_completion),
            time_threshold,
            time_completion: round2(time_completion),
            overall_completion: round2(overall_completion),
        })
    }
}

impl Interaction {
    /// Decode a client-supplied payload for `kind`, deriving computed metrics.
    pub fn from_parts(kind: InteractionType, data: serde_json::Value) -> Result<Self, AppError> {
        match kind {
            InteractionType::VideoProgress => Ok(Interaction::VideoProgress(
                VideoProgress::from_raw(decode(kind, data)?)?,
            )),
            InteractionType::PdfProgress => Ok(Interaction::PdfProgress(PdfProgress::from_raw(
                decode(kind, data)?,
            )?)),
            InteractionType::QuizCompleted => {
                let outcome: QuizOutcome = serde_json::from_value(data).map_err(|e| {
                    AppError::InvalidInput(format!("Invalid {} payload: {}", kind, e))
                })?;
                Ok(Interaction::QuizCompleted(outcome))
            }
            InteractionType::ContentComplete => Ok(Interaction::ContentComplete),
        }
    }

    pub fn interaction_type(&self) -> InteractionType {
        match self {
            Interaction::VideoProgress(_) => InteractionType::VideoProgress,
            Interaction::PdfProgress(_) => InteractionType::PdfProgress,
            Interaction::QuizCompleted(_) => InteractionType::QuizCompleted,
            Interaction::ContentComplete => InteractionType::ContentComplete,
        }
    }

    /// Whether this event crosses the completion threshold for its content
    pub fn completes_content(&self) -> bool {
        match self {
            Interaction::VideoProgress(v) => v.progress_percentage >= VIDEO_COMPLETION_THRESHOLD,
            Interaction::PdfProgress(p) => p.overall_completion >= PDF_COMPLETION_THRESHOLD,
            Interaction::QuizCompleted(q) => q.passed,
            Interaction::ContentComplete => true,
        }
    }

    /// Normalized payload as persisted
    pub fn to_data(&self) -> serde_json::Value {
        let value = match self {
            Interaction::VideoProgress(v) => serde_json::to_value(v),
            Interaction::PdfProgress(p) => serde_json::to_value(p),
            Interaction::QuizCompleted(q) => serde_json::to_value(q),
            Interaction::ContentComplete => Ok(serde_json::json!({})),
        };
        value.unwrap_or_else(|_| serde_json::json!({}))
    }
}

/// Latest interaction of a user with a content item
#[derive(Debug, Clone, Serialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ContentInteraction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub interaction_type: InteractionType,
    #[schema(value_type = Object)]
    pub interaction_data: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RecordInteractionRequest {
    #[validate(length(min = 1, message = "interaction_type is required"))]
    pub interaction_type: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InteractionOutcome {
    pub recorded: bool,
    pub content_id: Uuid,
    pub interaction_type: InteractionType,
    pub module_auto_completed: bool,
    pub progress: Option<ProgressSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pdf_completion_formula() {
        let interaction = Interaction::from_parts(
            InteractionType::PdfProgress,
            json!({"pages_viewed": [1, 2, 3, 4, 5, 6, 7, 8], "total_pages": 10, "time_spent_seconds": 80}),
        )
        .unwrap();

        let Interaction::PdfProgress(pdf) = &interaction else {
            panic!("expected pdf progress");
        };
        assert_eq!(pdf.pages_completion, 80.0);
        assert_eq!(pdf.time_threshold, 100.0);
        assert_eq!(pdf.time_completion, 80.0);
        assert_eq!(pdf.overall_completion, 80.0);
        assert!(interaction.completes_content());
    }

    #[test]
    fn test_pdf_duplicate_pages_count_once() {
        let interaction = Interaction::from_parts(
            InteractionType::PdfProgress,
            json!({"pages_viewed": [1, 1, 1, 2], "total_pages": 4, "time_spent_seconds": 300}),
        )
        .unwrap();

        let Interaction::PdfProgress(pdf) = &interaction else {
            panic!("expected pdf progress");
        };
        assert_eq!(pdf.pages_viewed, vec![1, 2]);
        assert_eq!(pdf.pages_completion, 50.0);
        // short documents still need at least 30 seconds of reading
        assert_eq!(pdf.time_threshold, 30.0);
        assert_eq!(pdf.time_completion, 100.0);
        assert_eq!(pdf.overall_completion, 70.0);
        assert!(!interaction.completes_content());
    }

    #[test]
    fn test_video_percentage_derived_from_timestamps() {
        let interaction = Interaction::from_parts(
            InteractionType::VideoProgress,
            json!({"current_time": 91.0, "duration": 100.0}),
        )
        .unwrap();
        let Interaction::VideoProgress(video) = &interaction else {
            panic!("expected video progress");
        };
        assert_eq!(video.progress_percentage, 91.0);
        assert!(interaction.completes_content());

        let partial = Interaction::from_parts(
            InteractionType::VideoProgress,
            json!({"current_time": 89.994, "duration": 100.0, "progress_percentage": 0}),
        )
        .unwrap();
        assert!(!partial.completes_content());
    }

    #[test]
    fn test_video_supplied_percentage_wins() {
        let interaction = Interaction::from_parts(
            InteractionType::VideoProgress,
            json!({"current_time": 10.0, "duration": 100.0, "progress_percentage": 95.0}),
        )
        .unwrap();
        assert!(interaction.completes_content());
    }

    #[test]
    fn test_video_without_duration_is_zero_progress() {
        let interaction =
            Interaction::from_parts(InteractionType::VideoProgress, json!({"current_time": 50}))
                .unwrap();
        assert!(!interaction.completes_content());
    }

    #[test]
    fn test_quiz_completion_requires_pass() {
        let failed =
            Interaction::from_parts(InteractionType::QuizCompleted, json!({"passed": false}))
                .unwrap();
        assert!(!failed.completes_content());

        let passed =
            Interaction::from_parts(InteractionType::QuizCompleted, json!({"passed": true}))
                .unwrap();
        assert!(passed.completes_content());

        assert!(Interaction::from_parts(InteractionType::QuizCompleted, json!({})).is_err());
    }

    #[test]
    fn test_content_complete_always_completes() {
        let interaction =
            Interaction::from_parts(InteractionType::ContentComplete, serde_json::Value::Null)
                .unwrap();
        assert!(interaction.completes_content());
        assert_eq!(interaction.to_data(), json!({}));
    }

    #[test]
    fn test_negative_values_rejected() {
        let err = Interaction::from_parts(
            InteractionType::VideoProgress,
            json!({"current_time": -1.0, "duration": 100.0}),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
