use std::sync::Arc;

use actix_web::web;
use chrono::Duration;

use crate::auth::{AuthenticationService, IdentityExtractor, PasswordHasher, TokenCodec};
use crate::config::Config;
use crate::store::{CredentialStore, MemoryCredentialStore, MemoryTaskStore, TaskStore};
use crate::tasks::TaskService;

/// Shared services, built once and handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthenticationService>,
    pub tasks: web::Data<TaskService>,
    pub identity: web::Data<IdentityExtractor>,
}

impl AppState {
    pub fn new(
        config: &Config,
        credentials: Arc<dyn CredentialStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Self {
        let codec = TokenCodec::new(
            config.jwt_secret.as_bytes(),
            Duration::hours(config.jwt_ttl_hours),
        );
        let hasher = PasswordHasher::new(config.bcrypt_cost);

        Self {
            auth: web::Data::new(AuthenticationService::new(
                credentials,
                hasher,
                codec.clone(),
            )),
            tasks: web::Data::new(TaskService::new(tasks)),
            identity: web::Data::new(IdentityExtractor::new(codec)),
        }
    }

    pub fn in_memory(config: &Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryTaskStore::new()),
        )
    }

    /// Registers the services as app data. Call from each `App` built for this state.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.tasks.clone())
            .app_data(self.identity.clone());
    }
}
