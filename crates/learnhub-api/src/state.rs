//! Application state shared by every handler.

use learnhub_core::Config;
use learnhub_services::LearnHubServices;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub services: LearnHubServices,
}

impl AppState {
    pub fn new(config: Config, services: LearnHubServices) -> Self {
        Self { config, services }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
