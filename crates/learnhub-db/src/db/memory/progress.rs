use chrono::{DateTime, Utc};
use learnhub_core::models::{
    CompletionTarget, ContentInteraction, CourseProgress, Interaction, ModuleCompletionOutcome,
    RecordedInteraction,
};
use learnhub_core::AppError;
use uuid::Uuid;

use super::{MemoryState, MemoryStore};
use crate::db::traits::ProgressRepository;

fn complete_module(
    state: &mut MemoryState,
    user_id: Uuid,
    target: CompletionTarget,
    now: DateTime<Utc>,
) -> Result<ModuleCompletionOutcome, AppError> {
    let key = (user_id, target.course_id);
    if !state.progress.contains_key(&key) {
        let total_modules = state
            .modules
            .values()
            .filter(|m| m.course_id == target.course_id)
            .count() as i32;
        state.progress.insert(
            key,
            CourseProgress::new(user_id, target.course_id, total_modules, now),
        );
    }

    let progress = state.progress.get_mut(&key).ok_or_else(|| {
        AppError::Internal("Progress record vanished after insert".to_string())
    })?;
    let newly_completed = progress.record_module_completion(target.module_id, now);

    Ok(ModuleCompletionOutcome {
        newly_completed,
        progress: progress.clone(),
    })
}

#[async_trait::async_trait]
impl ProgressRepository for MemoryStore {
    async fn record_interaction(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        interaction: &Interaction,
        completion: Option<CompletionTarget>,
        now: DateTime<Utc>,
    ) -> Result<RecordedInteraction, AppError> {
        let mut state = self.state.write().await;

        // completion is computed first so a failure leaves the interaction untouched
        let completion = completion
            .map(|target| complete_module(&mut state, user_id, target, now))
            .transpose()?;

        let stored = state
            .interactions
            .entry((user_id, content_id))
            .and_modify(|existing| {
                existing.interaction_type = interaction.interaction_type();
                existing.interaction_data = interaction.to_data();
                existing.updated_at = now;
            })
            .or_insert_with(|| ContentInteraction {
                id: Uuid::new_v4(),
                user_id,
                content_id,
                interaction_type: interaction.interaction_type(),
                interaction_data: interaction.to_data(),
                updated_at: now,
            })
            .clone();

        Ok(RecordedInteraction {
            interaction: stored,
            completion,
        })
    }

    async fn get_interaction(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<ContentInteraction>, AppError> {
        let state = self.state.read().await;
        Ok(state.interactions.get(&(user_id, content_id)).cloned())
    }

    async fn get_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CourseProgress>, AppError> {
        let state = self.state.read().await;
        Ok(state.progress.get(&(user_id, course_id)).cloned())
    }

    async fn list_progress_for_users(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<CourseProgress>, AppError> {
        let state = self.state.read().await;
        let mut rows: Vec<CourseProgress> = state
            .progress
            .values()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn set_risk_score(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        risk_score: i32,
    ) -> Result<Option<CourseProgress>, AppError> {
        let mut state = self.state.write().await;
        Ok(state.progress.get_mut(&(user_id, course_id)).map(|p| {
            p.risk_score = risk_score;
            p.clone()
        }))
    }
}
