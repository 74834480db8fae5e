//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    account_handler, auth_handler, chatbot_handler, dashboard_handler, widget_handler,
};
use crate::domain::{
    Appearance, BasicInfo, ChatChannel, ChatReply, ChatbotConfig, DailyCount, DashboardStats,
    EmbedSnippet, Lead, LeadStatus, ScrapeJob, ScrapeState, UserResponse, WidgetConfig,
    WidgetPosition, WizardProgress, WizardStep,
};
use crate::services::TokenResponse;
use crate::types::{MessageResponse, PaginatedLeads, PaginationMeta};

/// OpenAPI documentation for the GenBotAI API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "GenBotAI API",
        version = "0.1.0",
        description = "Accounts, chatbot setup wizard, dashboard and the public chat widget",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "GenBotAI Support", email = "support@genbotai.com")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::signup,
        auth_handler::verify_otp,
        auth_handler::resend_otp,
        auth_handler::login,
        auth_handler::forgot_password,
        auth_handler::reset_password,
        auth_handler::google_sign_in,
        account_handler::get_current_user,
        chatbot_handler::save_basic_info,
        chatbot_handler::start_scrape,
        chatbot_handler::scrape_status,
        chatbot_handler::save_appearance,
        chatbot_handler::get_config,
        chatbot_handler::wizard_progress,
        chatbot_handler::embed_snippet,
        dashboard_handler::get_stats,
        dashboard_handler::list_leads,
        widget_handler::get_widget_config,
        widget_handler::send_message,
    ),
    components(
        schemas(
            UserResponse,
            TokenResponse,
            MessageResponse,
            auth_handler::SignupRequest,
            auth_handler::SignupResponse,
            auth_handler::VerifyOtpRequest,
            auth_handler::EmailRequest,
            auth_handler::LoginRequest,
            auth_handler::ResetPasswordRequest,
            auth_handler::GoogleSignInRequest,
            BasicInfo,
            Appearance,
            WidgetPosition,
            ChatbotConfig,
            WizardStep,
            WizardProgress,
            ScrapeState,
            ScrapeJob,
            EmbedSnippet,
            chatbot_handler::BasicInfoRequest,
            chatbot_handler::ScrapeRequest,
            chatbot_handler::AppearanceRequest,
            DashboardStats,
            DailyCount,
            Lead,
            LeadStatus,
            PaginatedLeads,
            PaginationMeta,
            WidgetConfig,
            ChatChannel,
            ChatReply,
            widget_handler::SendMessageRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, verification, login and password reset"),
        (name = "Account", description = "The signed-in account"),
        (name = "Chatbot", description = "Chatbot setup wizard"),
        (name = "Dashboard", description = "Conversation figures and leads"),
        (name = "Widget", description = "Public endpoints used by the embedded chat widget")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
