//! Service wiring and startup data

use anyhow::{Context, Result};
use learnhub_core::Config;
use learnhub_db::Repositories;
use learnhub_services::LearnHubServices;
use std::sync::Arc;

use crate::state::AppState;

/// Wire every service to the repositories and seed the bootstrap admin
pub async fn initialize_services(config: &Config, repos: &Repositories) -> Result<Arc<AppState>> {
    let services = LearnHubServices::new(repos);

    if let Some(admin) = config.bootstrap_admin() {
        let user = services
            .directory
            .ensure_admin(&admin.username, &admin.email)
            .await
            .context("Failed to create bootstrap admin")?;
        tracing::info!(user_id = %user.id, username = %user.username, "Bootstrap admin ready");
    }

    Ok(Arc::new(AppState::new(config.clone(), services)))
}
