//! Client for the chatbot configuration service (basic info and appearance).

use async_trait::async_trait;
use reqwest::Client;

use super::http::{path_segment, JsonClient};
use crate::domain::{Appearance, BasicInfo, ChatbotConfig};
use crate::errors::AppResult;

/// Chatbot configuration storage owned by the external backend.
#[async_trait]
pub trait ChatbotBackend: Send + Sync {
    async fn save_basic_info(&self, company_id: &str, info: &BasicInfo) -> AppResult<()>;

    async fn save_appearance(&self, company_id: &str, appearance: &Appearance) -> AppResult<()>;

    /// `None` when the company has not configured anything yet
    async fn fetch_config(&self, company_id: &str) -> AppResult<Option<ChatbotConfig>>;
}

#[derive(Debug, Clone)]
pub struct ChatbotApiClient {
    client: JsonClient,
}

impl ChatbotApiClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            client: JsonClient::new("chatbot service", http, base_url),
        }
    }
}

#[async_trait]
impl ChatbotBackend for ChatbotApiClient {
    async fn save_basic_info(&self, company_id: &str, info: &BasicInfo) -> AppResult<()> {
        let path = format!("/companies/{}/basic-info", path_segment(company_id)?);
        self.client.put(&path, info).await
    }

    async fn save_appearance(&self, company_id: &str, appearance: &Appearance) -> AppResult<()> {
        let path = format!("/companies/{}/appearance", path_segment(company_id)?);
        self.client.put(&path, appearance).await
    }

    async fn fetch_config(&self, company_id: &str) -> AppResult<Option<ChatbotConfig>> {
        let path = format!("/companies/{}", path_segment(company_id)?);
        let config: Option<ChatbotConfig> = self.client.get_optional(&path).await?;

        // The backend may omit the id in its body; the path is authoritative
        Ok(config.map(|mut config| {
            config.company_id = company_id.to_string();
            config
        }))
    }
}
