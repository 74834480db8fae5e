//! Chat widget service tests.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::{mock, predicate::eq};
use uuid::Uuid;

use genbot_api::domain::{
    AgentReply, AgentRequest, Appearance, BasicInfo, ChatChannel, ChatbotConfig,
};
use genbot_api::errors::{AppError, AppResult};
use genbot_api::infra::{AgentApi, ChatbotBackend};
use genbot_api::services::{ChatService, WidgetChat};

mock! {
    pub Backend {}

    #[async_trait]
    impl ChatbotBackend for Backend {
        async fn save_basic_info(&self, company_id: &str, info: &BasicInfo) -> AppResult<()>;
        async fn save_appearance(&self, company_id: &str, appearance: &Appearance) -> AppResult<()>;
        async fn fetch_config(&self, company_id: &str) -> AppResult<Option<ChatbotConfig>>;
    }
}

mock! {
    pub Agent {}

    #[async_trait]
    impl AgentApi for Agent {
        async fn chat(&self, request: &AgentRequest) -> AppResult<AgentReply>;
    }
}

const COMPANY: &str = "cmp_acme";

fn chat(backend: MockBackend, agent: MockAgent) -> WidgetChat {
    WidgetChat::new(Arc::new(backend), Arc::new(agent))
}

#[tokio::test]
async fn test_send_message_opens_session() {
    let mut agent = MockAgent::new();
    agent
        .expect_chat()
        .withf(|req| {
            req.company_id == COMPANY
                && req.message == "Do you ship to Canada?"
                && req.channel == ChatChannel::Text
        })
        .times(1)
        .returning(|_| {
            Ok(AgentReply {
                reply: " Yes, we ship to Canada. \n".into(),
            })
        });
    let service = chat(MockBackend::new(), agent);

    let reply = service
        .send_message(COMPANY, "  Do you ship to Canada? ".into(), None, ChatChannel::Text)
        .await
        .unwrap();

    assert_eq!(reply.reply, "Yes, we ship to Canada.");
    assert!(!reply.session_id.is_nil());
}

#[tokio::test]
async fn test_send_message_keeps_session_and_channel() {
    let session_id = Uuid::new_v4();

    let mut agent = MockAgent::new();
    agent
        .expect_chat()
        .withf(move |req| req.session_id == session_id && req.channel == ChatChannel::Voice)
        .returning(|_| Ok(AgentReply { reply: "Sure.".into() }));
    let service = chat(MockBackend::new(), agent);

    let reply = service
        .send_message(COMPANY, "What are your hours".into(), Some(session_id), ChatChannel::Voice)
        .await
        .unwrap();

    assert_eq!(reply.session_id, session_id);
    assert_eq!(reply.channel, ChatChannel::Voice);
}

#[tokio::test]
async fn test_blank_message_never_reaches_agent() {
    let mut agent = MockAgent::new();
    agent.expect_chat().never();
    let service = chat(MockBackend::new(), agent);

    let result = service
        .send_message(COMPANY, " \n\t ".into(), None, ChatChannel::Text)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_invalid_company_id_rejected() {
    let mut agent = MockAgent::new();
    agent.expect_chat().never();
    let mut backend = MockBackend::new();
    backend.expect_fetch_config().never();
    let service = chat(backend, agent);

    let message = service
        .send_message("../admin", "hi".into(), None, ChatChannel::Text)
        .await;
    let config = service.widget_config("has space").await;

    assert!(matches!(message, Err(AppError::Validation(_))));
    assert!(matches!(config, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_agent_outage_surfaces_as_upstream_error() {
    let mut agent = MockAgent::new();
    agent
        .expect_chat()
        .returning(|_| Err(AppError::upstream("agent timed out")));
    let service = chat(MockBackend::new(), agent);

    let result = service
        .send_message(COMPANY, "hello".into(), None, ChatChannel::Text)
        .await;

    assert!(matches!(result, Err(AppError::Upstream(_))));
}

#[tokio::test]
async fn test_widget_config_defaults_when_unconfigured() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_config()
        .with(eq(COMPANY))
        .returning(|_| Ok(None));
    let service = chat(backend, MockAgent::new());

    let config = service.widget_config(COMPANY).await.unwrap();

    assert_eq!(config.company_id, COMPANY);
    assert_eq!(config.company_name, None);
    assert_eq!(config.appearance, Appearance::default());
}

#[tokio::test]
async fn test_widget_config_uses_saved_appearance() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_config().returning(|company_id| {
        Ok(Some(ChatbotConfig {
            company_id: company_id.to_string(),
            basic_info: Some(BasicInfo {
                company_name: "Acme".into(),
                website_url: "https://acme.com".into(),
                description: None,
                industry: None,
            }),
            appearance: Some(Appearance {
                bot_name: "Ava".into(),
                ..Appearance::default()
            }),
            trained: true,
        }))
    });
    let service = chat(backend, MockAgent::new());

    let config = service.widget_config(COMPANY).await.unwrap();

    assert_eq!(config.company_name.as_deref(), Some("Acme"));
    assert_eq!(config.appearance.bot_name, "Ava");
}
