//! Chatbot wizard handlers. Every route acts on the caller's own company.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::validation::{validate_hex_color, validate_http_url};
use crate::api::AppState;
use crate::domain::{
    Appearance, BasicInfo, ChatbotConfig, EmbedSnippet, ScrapeJob, WidgetPosition,
    WizardProgress,
};
use crate::errors::AppResult;

/// Wizard step 1: company details
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BasicInfoRequest {
    #[validate(length(min = 1, max = 100, message = "Company name must be 1-100 characters"))]
    #[schema(example = "Acme Inc.")]
    pub company_name: String,
    #[validate(custom(function = "validate_http_url"))]
    #[schema(example = "https://acme.com")]
    pub website_url: String,
    #[validate(length(max = 1000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(length(max = 100, message = "Industry is too long"))]
    #[schema(example = "Retail")]
    pub industry: Option<String>,
}

impl From<BasicInfoRequest> for BasicInfo {
    fn from(req: BasicInfoRequest) -> Self {
        Self {
            company_name: req.company_name,
            website_url: req.website_url,
            description: req.description,
            industry: req.industry,
        }
    }
}

/// Wizard step 2: train on the company website
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScrapeRequest {
    #[validate(custom(function = "validate_http_url"))]
    #[schema(example = "https://acme.com")]
    pub website_url: String,
    /// Upper bound on pages crawled; the scraper picks one when absent
    #[validate(range(min = 1, max = 500, message = "max_pages must be between 1 and 500"))]
    #[schema(example = 50)]
    pub max_pages: Option<u32>,
}

/// Wizard step 3: widget look
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AppearanceRequest {
    #[validate(length(min = 1, max = 50, message = "Bot name must be 1-50 characters"))]
    #[schema(example = "Acme Assistant")]
    pub bot_name: String,
    #[validate(custom(function = "validate_hex_color"))]
    #[schema(example = "#4F46E5")]
    pub primary_color: String,
    #[validate(length(min = 1, max = 500, message = "Welcome message must be 1-500 characters"))]
    #[schema(example = "Hi! How can I help you today?")]
    pub welcome_message: String,
    #[serde(default)]
    pub position: WidgetPosition,
    #[validate(custom(function = "validate_http_url"))]
    pub avatar_url: Option<String>,
}

impl From<AppearanceRequest> for Appearance {
    fn from(req: AppearanceRequest) -> Self {
        Self {
            bot_name: req.bot_name,
            primary_color: req.primary_color,
            welcome_message: req.welcome_message,
            position: req.position,
            avatar_url: req.avatar_url,
        }
    }
}

pub fn chatbot_routes() -> Router<AppState> {
    Router::new()
        .route("/basic-info", put(save_basic_info))
        .route("/scrape", post(start_scrape))
        .route("/scrape/:job_id", get(scrape_status))
        .route("/appearance", put(save_appearance))
        .route("/config", get(get_config))
        .route("/wizard", get(wizard_progress))
        .route("/embed", get(embed_snippet))
}

/// Save company details
#[utoipa::path(
    put,
    path = "/chatbots/basic-info",
    tag = "Chatbot",
    security(("bearer_auth" = [])),
    request_body = BasicInfoRequest,
    responses(
        (status = 200, description = "Saved", body = BasicInfo),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Chatbot service unavailable")
    )
)]
pub async fn save_basic_info(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<BasicInfoRequest>,
) -> AppResult<Json<BasicInfo>> {
    let info = state
        .chatbot_service
        .save_basic_info(&user.company_id, payload.into())
        .await?;
    Ok(Json(info))
}

/// Start scraping the company website
#[utoipa::path(
    post,
    path = "/chatbots/scrape",
    tag = "Chatbot",
    security(("bearer_auth" = [])),
    request_body = ScrapeRequest,
    responses(
        (status = 202, description = "Scrape queued", body = ScrapeJob),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Scraper unavailable")
    )
)]
pub async fn start_scrape(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ScrapeRequest>,
) -> AppResult<(StatusCode, Json<ScrapeJob>)> {
    let job = state
        .chatbot_service
        .start_scrape(&user.company_id, payload.website_url, payload.max_pages)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// Poll a scrape job
#[utoipa::path(
    get,
    path = "/chatbots/scrape/{job_id}",
    tag = "Chatbot",
    security(("bearer_auth" = [])),
    params(("job_id" = String, Path, description = "Job id returned when the scrape started")),
    responses(
        (status = 200, description = "Job status", body = ScrapeJob),
        (status = 404, description = "Unknown job")
    )
)]
pub async fn scrape_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(job_id): Path<String>,
) -> AppResult<Json<ScrapeJob>> {
    let job = state
        .chatbot_service
        .scrape_status(&user.company_id, &job_id)
        .await?;
    Ok(Json(job))
}

/// Save widget appearance
#[utoipa::path(
    put,
    path = "/chatbots/appearance",
    tag = "Chatbot",
    security(("bearer_auth" = [])),
    request_body = AppearanceRequest,
    responses(
        (status = 200, description = "Saved", body = Appearance),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Chatbot service unavailable")
    )
)]
pub async fn save_appearance(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AppearanceRequest>,
) -> AppResult<Json<Appearance>> {
    let appearance = state
        .chatbot_service
        .save_appearance(&user.company_id, payload.into())
        .await?;
    Ok(Json(appearance))
}

/// Saved chatbot configuration
#[utoipa::path(
    get,
    path = "/chatbots/config",
    tag = "Chatbot",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Configuration, empty when nothing saved yet", body = ChatbotConfig))
)]
pub async fn get_config(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ChatbotConfig>> {
    let config = state.chatbot_service.get_config(&user.company_id).await?;
    Ok(Json(config))
}

/// Wizard progress derived from the saved configuration
#[utoipa::path(
    get,
    path = "/chatbots/wizard",
    tag = "Chatbot",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Current and completed steps", body = WizardProgress))
)]
pub async fn wizard_progress(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<WizardProgress>> {
    let progress = state
        .chatbot_service
        .wizard_progress(&user.company_id)
        .await?;
    Ok(Json(progress))
}

/// Script tag to paste into the customer's site
#[utoipa::path(
    get,
    path = "/chatbots/embed",
    tag = "Chatbot",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Embed snippet", body = EmbedSnippet))
)]
pub async fn embed_snippet(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<EmbedSnippet> {
    Json(state.chatbot_service.embed_snippet(&user.company_id))
}
