//! Dashboard handlers.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{DashboardStats, Lead};
use crate::types::{Paginated, PaginatedLeads, PaginationParams};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/leads", get(list_leads))
}

/// Headline figures for the caller's chatbot
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Dashboard figures", body = DashboardStats))
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<DashboardStats> {
    Json(state.dashboard_service.stats(&user.company_id))
}

/// Leads captured by the widget, newest first
#[utoipa::path(
    get,
    path = "/dashboard/leads",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "A page of leads", body = PaginatedLeads))
)]
pub async fn list_leads(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> Json<Paginated<Lead>> {
    Json(state.dashboard_service.leads(&user.company_id, &params))
}
