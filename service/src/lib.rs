use config::Config;
use directory::{RecipientResolver, RoleDirectory};
use log::info;
use snowflake::IdGenerator;
use std::sync::Arc;

pub mod config;
pub mod directory;
pub mod logging;
pub mod snowflake;

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sse_manager: Arc<sse::Manager>,
    pub id_generator: Arc<IdGenerator>,
    pub recipient_resolver: Arc<dyn RecipientResolver>,
}

impl AppState {
    pub fn new(app_config: Config) -> Self {
        let role_directory = RoleDirectory::from_members(&app_config.role_members);
        info!(
            "Notification service config: worker_id={}, roles={}, keep_alive={}s, connection_timeout={}s",
            app_config.snowflake_worker_id,
            role_directory.role_count(),
            app_config.sse_keep_alive_secs,
            app_config.sse_connection_timeout_secs,
        );

        Self {
            id_generator: Arc::new(IdGenerator::new(app_config.snowflake_worker_id)),
            sse_manager: Arc::new(sse::Manager::new()),
            recipient_resolver: Arc::new(role_directory),
            config: app_config,
        }
    }

}
