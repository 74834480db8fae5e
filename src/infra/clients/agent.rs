//! Client for the agent chat API that answers widget visitors.

use async_trait::async_trait;
use reqwest::Client;

use super::http::JsonClient;
use crate::domain::{AgentReply, AgentRequest};
use crate::errors::AppResult;

#[async_trait]
pub trait AgentApi: Send + Sync {
    async fn chat(&self, request: &AgentRequest) -> AppResult<AgentReply>;
}

#[derive(Debug, Clone)]
pub struct AgentClient {
    client: JsonClient,
}

impl AgentClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            client: JsonClient::new("agent", http, base_url),
        }
    }
}

#[async_trait]
impl AgentApi for AgentClient {
    async fn chat(&self, request: &AgentRequest) -> AppResult<AgentReply> {
        tracing::debug!(
            company_id = %request.company_id,
            session_id = %request.session_id,
            "Forwarding message to agent"
        );
        self.client.post("/chat", request).await
    }
}
