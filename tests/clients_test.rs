//! External service clients against in-process stand-in servers.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use genbot_api::domain::{
    AgentRequest, Appearance, BasicInfo, ChatChannel, ScrapeState,
};
use genbot_api::errors::AppError;
use genbot_api::infra::clients::build_http_client;
use genbot_api::infra::{
    AgentApi, AgentClient, ChatbotApiClient, ChatbotBackend, GoogleIdentityClient,
    GoogleVerifier, Scraper, ScraperClient,
};

const CLIENT_ID: &str = "test-client-id.apps.googleusercontent.com";

/// Serve the router on an ephemeral port and return its base URL.
async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn http() -> reqwest::Client {
    build_http_client(5).unwrap()
}

// ============================================================================
// Agent
// ============================================================================

async fn agent_chat(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match body["message"].as_str() {
        Some("overload") => return (StatusCode::TOO_MANY_REQUESTS, Json(json!({}))),
        Some("unknown company") => {
            return (StatusCode::NOT_FOUND, Json(json!({ "detail": "no agent" })))
        }
        _ => {}
    }
    // Answers with `response`, as some agent deployments do
    (
        StatusCode::OK,
        Json(json!({
            "response": format!("{} via {}", body["message"].as_str().unwrap_or_default(), body["channel"].as_str().unwrap_or_default())
        })),
    )
}

fn agent_request(message: &str) -> AgentRequest {
    AgentRequest {
        company_id: "cmp_acme".into(),
        session_id: Uuid::new_v4(),
        message: message.into(),
        channel: ChatChannel::Voice,
    }
}

#[tokio::test]
async fn test_agent_client_posts_message() {
    let base = spawn(Router::new().route("/chat", post(agent_chat))).await;
    // Trailing slash is tolerated
    let client = AgentClient::new(http(), format!("{}/", base));

    let reply = client.chat(&agent_request("hello")).await.unwrap();

    assert_eq!(reply.reply, "hello via voice");
}

#[tokio::test]
async fn test_agent_errors_are_upstream_failures() {
    let base = spawn(Router::new().route("/chat", post(agent_chat))).await;
    let client = AgentClient::new(http(), base);

    let throttled = client.chat(&agent_request("overload")).await;
    let missing = client.chat(&agent_request("unknown company")).await;

    // Widget visitors see 502, never the agent's own 429 or 404
    assert!(matches!(throttled, Err(AppError::Upstream(_))));
    assert!(matches!(missing, Err(AppError::Upstream(_))));
}

#[tokio::test]
async fn test_unreachable_service_is_upstream_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = AgentClient::new(http(), format!("http://{}", addr));

    let result = client.chat(&agent_request("hello")).await;

    assert!(matches!(result, Err(AppError::Upstream(_))));
}

// ============================================================================
// Scraper
// ============================================================================

async fn scrape_start(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "job_id": format!("job-{}", body["company_id"].as_str().unwrap_or_default()),
        "status": "pending",
        // Report back whether a limit was sent
        "pages_scraped": body.get("max_pages").and_then(Value::as_u64).unwrap_or(0),
    }))
}

async fn scrape_status(
    Path(job_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if query.get("company_id").map(String::as_str) != Some("cmp_acme") {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "unknown job" })));
    }
    (
        StatusCode::OK,
        Json(json!({ "job_id": job_id, "status": "completed", "pages_scraped": 12 })),
    )
}

fn scraper_router() -> Router {
    Router::new()
        .route("/scrape", post(scrape_start))
        .route("/scrape/:job_id", get(scrape_status))
}

#[tokio::test]
async fn test_scraper_start_and_status() {
    let client = ScraperClient::new(http(), spawn(scraper_router()).await);

    let job = client
        .start("cmp_acme", "https://acme.com", Some(40))
        .await
        .unwrap();
    assert_eq!(job.job_id, "job-cmp_acme");
    assert_eq!(job.status, ScrapeState::Pending);
    assert_eq!(job.pages_scraped, 40);

    let job = client.status("cmp_acme", &job.job_id).await.unwrap();
    assert_eq!(job.status, ScrapeState::Completed);
    assert_eq!(job.pages_scraped, 12);
}

#[tokio::test]
async fn test_scraper_status_scoped_to_company() {
    let client = ScraperClient::new(http(), spawn(scraper_router()).await);

    let result = client.status("cmp_other", "job-cmp_acme").await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_scraper_rejects_unsafe_job_id() {
    let client = ScraperClient::new(http(), spawn(scraper_router()).await);

    let result = client.status("cmp_acme", "../admin").await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

// ============================================================================
// Chatbot configuration service
// ============================================================================

async fn company_config(Path(company_id): Path<String>) -> (StatusCode, Json<Value>) {
    match company_id.as_str() {
        "cmp_new" => return (StatusCode::NOT_FOUND, Json(json!({}))),
        "cmp_broken" => return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))),
        _ => {}
    }
    (
        StatusCode::OK,
        Json(json!({
            "basic_info": {
                "company_name": "Acme",
                "website_url": "https://acme.com"
            },
            "trained": true
        })),
    )
}

async fn save_basic_info(Json(body): Json<Value>) -> StatusCode {
    if body["company_name"].as_str().unwrap_or_default().is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::NO_CONTENT
    }
}

fn chatbot_router() -> Router {
    Router::new()
        .route("/companies/:company_id", get(company_config))
        .route("/companies/:company_id/basic-info", put(save_basic_info))
        .route(
            "/companies/:company_id/appearance",
            put(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
}

#[tokio::test]
async fn test_chatbot_config_fetch() {
    let client = ChatbotApiClient::new(http(), spawn(chatbot_router()).await);

    let config = client.fetch_config("cmp_acme").await.unwrap().unwrap();
    assert_eq!(config.company_id, "cmp_acme");
    assert!(config.trained);
    assert!(config.appearance.is_none());

    assert!(client.fetch_config("cmp_new").await.unwrap().is_none());
    assert!(matches!(
        client.fetch_config("cmp_broken").await,
        Err(AppError::Upstream(_))
    ));
}

#[tokio::test]
async fn test_chatbot_basic_info_save() {
    let client = ChatbotApiClient::new(http(), spawn(chatbot_router()).await);
    let mut info = BasicInfo {
        company_name: "Acme".into(),
        website_url: "https://acme.com".into(),
        description: None,
        industry: None,
    };

    client.save_basic_info("cmp_acme", &info).await.unwrap();

    info.company_name = String::new();
    let rejected = client.save_basic_info("cmp_acme", &info).await;
    assert!(matches!(rejected, Err(AppError::Upstream(_))));
}

#[tokio::test]
async fn test_chatbot_server_error_is_upstream() {
    let client = ChatbotApiClient::new(http(), spawn(chatbot_router()).await);

    let result = client
        .save_appearance("cmp_acme", &Appearance::default())
        .await;

    assert!(matches!(result, Err(AppError::Upstream(_))));
}

// ============================================================================
// Google tokeninfo
// ============================================================================

async fn tokeninfo(Query(query): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    match query.get("id_token").map(String::as_str) {
        Some("good") => (
            StatusCode::OK,
            Json(json!({
                "aud": CLIENT_ID,
                "iss": "https://accounts.google.com",
                "sub": "110169484474386276334",
                "email": "owner@acme.com",
                "email_verified": "true",
                "name": "Jane Owner"
            })),
        ),
        Some("other-app") => (
            StatusCode::OK,
            Json(json!({
                "aud": "someone-else.apps.googleusercontent.com",
                "sub": "1",
                "email": "owner@acme.com",
                "email_verified": true
            })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error_description": "Invalid Value" })),
        ),
    }
}

async fn google_client(client_id: Option<&str>) -> GoogleIdentityClient {
    let base = spawn(Router::new().route("/tokeninfo", get(tokeninfo))).await;
    GoogleIdentityClient::new(
        http(),
        format!("{}/tokeninfo", base),
        client_id.map(str::to_string),
    )
}

#[tokio::test]
async fn test_google_token_verified() {
    let client = google_client(Some(CLIENT_ID)).await;

    let identity = client.verify_id_token("good").await.unwrap();

    assert_eq!(identity.subject, "110169484474386276334");
    assert_eq!(identity.email, "owner@acme.com");
    assert_eq!(identity.name.as_deref(), Some("Jane Owner"));
}

#[tokio::test]
async fn test_google_token_rejections() {
    let client = google_client(Some(CLIENT_ID)).await;

    let expired = client.verify_id_token("expired").await;
    let foreign = client.verify_id_token("other-app").await;

    assert!(matches!(expired, Err(AppError::InvalidCredentials)));
    assert!(matches!(foreign, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_google_sign_in_unconfigured() {
    let client = google_client(None).await;

    let result = client.verify_id_token("good").await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}
