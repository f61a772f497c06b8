use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::ContentInteraction;
use crate::stats::round2;

/// Completion state of one module inside a course progress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModuleCompletion {
    pub completed: bool,
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_completed: bool,
}

/// Per-module completion map, keyed by module id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleProgressMap(pub BTreeMap<Uuid, ModuleCompletion>);

impl ModuleProgressMap {
    /// Decode the stored JSON form. A malformed blob yields an empty map so that
    /// one corrupt record never fails the whole read.
    pub fn from_stored(value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed module progress map, treating as empty");
                ModuleProgressMap::default()
            }
        }
    }

    pub fn to_stored(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    pub fn is_completed(&self, module_id: &Uuid) -> bool {
        self.0.get(module_id).map(|m| m.completed).unwrap_or(false)
    }

    pub fn get(&self, module_id: &Uuid) -> Option<&ModuleCompletion> {
        self.0.get(module_id)
    }
}

/// Progress of one user through one course
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub completed_modules: i32,
    pub total_modules: i32,
    pub progress_percentage: f64,
    #[schema(value_type = Object)]
    pub module_progress: ModuleProgressMap,
    pub last_activity: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
    pub risk_score: i32,
    pub created_at: DateTime<Utc>,
}

impl CourseProgress {
    /// Fresh record for a course the user has just entered
    pub fn new(user_id: Uuid, course_id: Uuid, total_modules: i32, now: DateTime<Utc>) -> Self {
        CourseProgress {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            completed_modules: 0,
            total_modules,
            progress_percentage: 0.0,
            module_progress: ModuleProgressMap::default(),
            last_activity: now,
            completion_date: None,
            risk_score: 0,
            created_at: now,
        }
    }

    /// Mark `module_id` as auto-completed. Returns false, leaving the record
    /// untouched, when the module was already complete.
    pub fn record_module_completion(&mut self, module_id: Uuid, now: DateTime<Utc>) -> bool {
        if self.module_progress.is_completed(&module_id) {
            return false;
        }

        self.module_progress.0.insert(
            module_id,
            ModuleCompletion {
                completed: true,
                completion_date: Some(now),
                auto_completed: true,
            },
        );
        self.completed_modules += 1;
        self.progress_percentage = completion_percentage(self.completed_modules, self.total_modules);
        self.last_activity = now;

        if self.total_modules > 0
            && self.completed_modules >= self.total_modules
            && self.completion_date.is_none()
        {
            self.completion_date = Some(now);
            self.risk_score = 0;
        }

        true
    }

    pub fn is_completed(&self) -> bool {
        self.completion_date.is_some()
    }

    pub fn is_at_risk(&self) -> bool {
        self.risk_score > crate::constants::AT_RISK_THRESHOLD
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            course_id: self.course_id,
            completed_modules: self.completed_modules,
            total_modules: self.total_modules,
            progress_percentage: self.progress_percentage,
            is_completed: self.is_completed(),
            completion_date: self.completion_date,
        }
    }
}

fn completion_percentage(completed: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2((completed as f64 / total as f64 * 100.0).min(100.0))
}

/// Condensed progress returned after an interaction completes a module
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgressSnapshot {
    pub course_id: Uuid,
    pub completed_modules: i32,
    pub total_modules: i32,
    pub progress_percentage: f64,
    pub is_completed: bool,
    pub completion_date: Option<DateTime<Utc>>,
}

/// Outcome of an atomic module completion
#[derive(Debug, Clone)]
pub struct ModuleCompletionOutcome {
    pub newly_completed: bool,
    pub progress: CourseProgress,
}

/// Module to check-and-mark complete alongside an interaction write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionTarget {
    pub course_id: Uuid,
    pub module_id: Uuid,
}

/// Stored interaction plus the completion applied in the same write
#[derive(Debug, Clone)]
pub struct RecordedInteraction {
    pub interaction: ContentInteraction,
    pub completion: Option<ModuleCompletionOutcome>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetRiskScoreRequest {
    #[validate(range(min = 0, max = 100, message = "Risk score must be between 0 and 100"))]
    pub risk_score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(total: i32) -> CourseProgress {
        CourseProgress::new(Uuid::new_v4(), Uuid::new_v4(), total, Utc::now())
    }

    #[test]
    fn test_record_module_completion_is_idempotent() {
        let mut p = progress(3);
        let module = Uuid::new_v4();

        assert!(p.record_module_completion(module, Utc::now()));
        for _ in 0..5 {
            assert!(!p.record_module_completion(module, Utc::now()));
        }

        assert_eq!(p.completed_modules, 1);
        assert_eq!(p.progress_percentage, 33.33);
        assert!(p.module_progress.get(&module).unwrap().auto_completed);
    }

    #[test]
    fn test_completion_stamps_date_and_resets_risk() {
        let mut p = progress(2);
        p.risk_score = 85;
        assert!(p.is_at_risk());

        p.record_module_completion(Uuid::new_v4(), Utc::now());
        assert_eq!(p.progress_percentage, 50.0);
        assert!(p.completion_date.is_none());
        assert_eq!(p.risk_score, 85);

        p.record_module_completion(Uuid::new_v4(), Utc::now());
        assert_eq!(p.completed_modules, 2);
        assert_eq!(p.progress_percentage, 100.0);
        assert!(p.completion_date.is_some());
        assert_eq!(p.risk_score, 0);
    }

    #[test]
    fn test_completion_date_is_stamped_once() {
        let mut p = progress(1);
        let first = Utc::now();
        p.record_module_completion(Uuid::new_v4(), first);
        p.record_module_completion(Uuid::new_v4(), first + chrono::Duration::hours(1));

        assert_eq!(p.completion_date, Some(first));
        assert_eq!(p.progress_percentage, 100.0);
    }

    #[test]
    fn test_zero_total_modules_never_divides() {
        let mut p = progress(0);
        p.record_module_completion(Uuid::new_v4(), Utc::now());
        assert_eq!(p.progress_percentage, 0.0);
        assert!(p.completion_date.is_none());
    }

    #[test]
    fn test_malformed_module_map_decodes_empty() {
        let map = ModuleProgressMap::from_stored(serde_json::json!("not a map"));
        assert!(map.0.is_empty());

        let map = ModuleProgressMap::from_stored(serde_json::json!({"bogus": {"completed": true}}));
        assert!(map.0.is_empty());
    }

    #[test]
    fn test_module_map_round_trips_through_storage() {
        let mut p = progress(2);
        let module = Uuid::new_v4();
        p.record_module_completion(module, Utc::now());

        let restored = ModuleProgressMap::from_stored(p.module_progress.to_stored());
        assert!(restored.is_completed(&module));
    }
}
