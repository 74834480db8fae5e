//! HTTP clients for the services GenBotAI delegates to.

pub mod agent;
pub mod chatbot_api;
pub mod google;
pub mod http;
pub mod scraper;

pub use agent::{AgentApi, AgentClient};
pub use chatbot_api::{ChatbotApiClient, ChatbotBackend};
pub use google::{GoogleIdentity, GoogleIdentityClient, GoogleVerifier};
pub use http::{build_http_client, JsonClient};
pub use scraper::{Scraper, ScraperClient};
