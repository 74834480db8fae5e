//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use super::middleware::RateLimits;
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Database};
use crate::jobs::Mailer;
use crate::services::{
    AuthService, ChatService, ChatbotService, DashboardService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub chatbot_service: Arc<dyn ChatbotService>,
    pub dashboard_service: Arc<dyn DashboardService>,
    pub chat_service: Arc<dyn ChatService>,
    pub rate_limits: RateLimits,
    /// Redis cache (health)
    pub cache: Arc<Cache>,
    /// Database connection (health)
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from the shared infrastructure and config.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> AppResult<Self> {
        let rate_limits = RateLimits::new(cache.clone(), config.trust_proxy_headers);
        let services = Services::from_connection(
            database.get_connection(),
            cache.clone(),
            mailer,
            config,
        )?;

        Ok(Self::new(&services, rate_limits, cache, database))
    }

    /// Create application state from an already built service container.
    pub fn new(
        services: &impl ServiceContainer,
        rate_limits: RateLimits,
        cache: Arc<Cache>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            chatbot_service: services.chatbots(),
            dashboard_service: services.dashboard(),
            chat_service: services.chat(),
            rate_limits,
            cache,
            database,
        }
    }
}
