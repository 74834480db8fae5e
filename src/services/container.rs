//! Service Container - Centralized service access.
//!
//! Builds every service from the shared infrastructure once at startup and
//! hands out `Arc`s to the handlers.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, ChatService, ChatbotManager, ChatbotService, DashboardService,
    MockDashboard, WidgetChat,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{
    clients::build_http_client, AgentClient, ChatbotApiClient, ChatbotBackend, CooldownStore,
    GoogleIdentityClient, Persistence, ScraperClient,
};
use crate::jobs::Mailer;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn chatbots(&self) -> Arc<dyn ChatbotService>;

    fn dashboard(&self) -> Arc<dyn DashboardService>;

    fn chat(&self) -> Arc<dyn ChatService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    chatbot_service: Arc<dyn ChatbotService>,
    dashboard_service: Arc<dyn DashboardService>,
    chat_service: Arc<dyn ChatService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        chatbot_service: Arc<dyn ChatbotService>,
        dashboard_service: Arc<dyn DashboardService>,
        chat_service: Arc<dyn ChatService>,
    ) -> Self {
        Self {
            auth_service,
            chatbot_service,
            dashboard_service,
            chat_service,
        }
    }

    /// Wire the production services: Postgres accounts, Redis cooldowns,
    /// the mail queue and the HTTP clients for the external services.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        cooldowns: Arc<dyn CooldownStore>,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> AppResult<Self> {
        let http = build_http_client(config.http_timeout_seconds)?;

        let backend: Arc<dyn ChatbotBackend> =
            Arc::new(ChatbotApiClient::new(http.clone(), &config.chatbot_api_url));
        let scraper = Arc::new(ScraperClient::new(http.clone(), &config.scraper_api_url));
        let agent = Arc::new(AgentClient::new(http.clone(), &config.agent_api_url));
        let google = Arc::new(GoogleIdentityClient::new(
            http,
            &config.google_tokeninfo_url,
            config.google_client_id.clone(),
        ));

        let chatbot_service = Arc::new(ChatbotManager::new(
            backend.clone(),
            scraper,
            &config.widget_script_url,
        ));
        let chat_service = Arc::new(WidgetChat::new(backend, agent));

        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow, cooldowns, mailer, google, config));

        Ok(Self::new(
            auth_service,
            chatbot_service,
            Arc::new(MockDashboard::new()),
            chat_service,
        ))
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn chatbots(&self) -> Arc<dyn ChatbotService> {
        self.chatbot_service.clone()
    }

    fn dashboard(&self) -> Arc<dyn DashboardService> {
        self.dashboard_service.clone()
    }

    fn chat(&self) -> Arc<dyn ChatService> {
        self.chat_service.clone()
    }
}
