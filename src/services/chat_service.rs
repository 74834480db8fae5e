//! Chat widget service: public, addressed by company id.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    is_valid_company_id, AgentRequest, ChatChannel, ChatReply, WidgetConfig,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{AgentApi, ChatbotBackend};

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Appearance the widget renders with; defaults until one is saved
    async fn widget_config(&self, company_id: &str) -> AppResult<WidgetConfig>;

    /// Relay a visitor message to the agent. A session is opened when
    /// `session_id` is absent.
    async fn send_message(
        &self,
        company_id: &str,
        message: String,
        session_id: Option<Uuid>,
        channel: ChatChannel,
    ) -> AppResult<ChatReply>;
}

fn ensure_company_id(company_id: &str) -> AppResult<()> {
    if is_valid_company_id(company_id) {
        Ok(())
    } else {
        Err(AppError::validation("Invalid company id"))
    }
}

pub struct WidgetChat {
    backend: Arc<dyn ChatbotBackend>,
    agent: Arc<dyn AgentApi>,
}

impl WidgetChat {
    pub fn new(backend: Arc<dyn ChatbotBackend>, agent: Arc<dyn AgentApi>) -> Self {
        Self { backend, agent }
    }
}

#[async_trait]
impl ChatService for WidgetChat {
    async fn widget_config(&self, company_id: &str) -> AppResult<WidgetConfig> {
        ensure_company_id(company_id)?;

        let config = self.backend.fetch_config(company_id).await?;
        let (company_name, appearance) = match config {
            Some(config) => (
                config.basic_info.map(|info| info.company_name),
                config.appearance.unwrap_or_default(),
            ),
            None => (None, Default::default()),
        };

        Ok(WidgetConfig {
            company_id: company_id.to_string(),
            company_name,
            appearance,
        })
    }

    async fn send_message(
        &self,
        company_id: &str,
        message: String,
        session_id: Option<Uuid>,
        channel: ChatChannel,
    ) -> AppResult<ChatReply> {
        ensure_company_id(company_id)?;

        let message = message.trim().to_string();
        if message.is_empty() {
            return Err(AppError::validation("Message must not be empty"));
        }

        let session_id = session_id.unwrap_or_else(Uuid::new_v4);
        let request = AgentRequest {
            company_id: company_id.to_string(),
            session_id,
            message,
            channel,
        };

        let reply = self.agent.chat(&request).await?;

        Ok(ChatReply {
            session_id,
            reply: reply.reply.trim().to_string(),
            channel,
        })
    }
}
