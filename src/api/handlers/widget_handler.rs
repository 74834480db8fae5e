//! Public chat widget handlers, addressed by company id.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{ChatChannel, ChatReply, WidgetConfig};
use crate::errors::AppResult;

/// Visitor message
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    #[schema(example = "Do you ship to Canada?")]
    pub message: String,
    /// Omit on the first message; reuse the returned id afterwards
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub channel: ChatChannel,
}

pub fn widget_routes() -> Router<AppState> {
    Router::new()
        .route("/:company_id/config", get(get_widget_config))
        .route("/:company_id/messages", post(send_message))
}

/// Appearance the widget renders with
#[utoipa::path(
    get,
    path = "/widget/{company_id}/config",
    tag = "Widget",
    params(("company_id" = String, Path, description = "Company the widget belongs to")),
    responses(
        (status = 200, description = "Widget configuration", body = WidgetConfig),
        (status = 400, description = "Malformed company id")
    )
)]
pub async fn get_widget_config(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> AppResult<Json<WidgetConfig>> {
    let config = state.chat_service.widget_config(&company_id).await?;
    Ok(Json(config))
}

/// Send a visitor message to the company's agent
#[utoipa::path(
    post,
    path = "/widget/{company_id}/messages",
    tag = "Widget",
    params(("company_id" = String, Path, description = "Company the widget belongs to")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Agent reply", body = ChatReply),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Agent unavailable")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<SendMessageRequest>,
) -> AppResult<Json<ChatReply>> {
    let reply = state
        .chat_service
        .send_message(
            &company_id,
            payload.message,
            payload.session_id,
            payload.channel,
        )
        .await?;
    Ok(Json(reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_defaults_to_text_channel() {
        let req: SendMessageRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(req.channel, ChatChannel::Text);
        assert!(req.session_id.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_message_length_bounds() {
        let req = SendMessageRequest {
            message: "x".repeat(2001),
            session_id: None,
            channel: ChatChannel::Voice,
        };
        assert!(req.validate().is_err());

        let empty = SendMessageRequest {
            message: String::new(),
            session_id: None,
            channel: ChatChannel::Text,
        };
        assert!(empty.validate().is_err());
    }
}
