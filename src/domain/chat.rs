//! Messages exchanged through the chat widget.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::chatbot::Appearance;

/// How the visitor produced the message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatChannel {
    #[default]
    Text,
    /// Transcript from the browser's speech recognition; replies are read aloud
    Voice,
}

/// Payload forwarded to the agent API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRequest {
    pub company_id: String,
    pub session_id: Uuid,
    pub message: String,
    pub channel: ChatChannel,
}

/// Agent API reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentReply {
    /// Some agent deployments answer with `response` instead of `reply`
    #[serde(alias = "response")]
    pub reply: String,
}

/// Reply returned to the widget
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChatReply {
    pub session_id: Uuid,
    pub reply: String,
    pub channel: ChatChannel,
}

/// What the widget needs to render itself on a customer's page
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WidgetConfig {
    pub company_id: String,
    /// Absent until the company completed the basic info step
    pub company_name: Option<String>,
    pub appearance: Appearance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_reply_accepts_alias() {
        let a: AgentReply = serde_json::from_str(r#"{"reply":"hi"}"#).unwrap();
        let b: AgentReply = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_channel_defaults_to_text() {
        assert_eq!(ChatChannel::default(), ChatChannel::Text);
        assert_eq!(serde_json::to_string(&ChatChannel::Voice).unwrap(), "\"voice\"");
    }
}
