//! Dashboard figures shown to chatbot owners.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Headline numbers
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_conversations: u64,
    pub total_leads: u64,
    /// Percentage of conversations that produced a lead
    pub conversion_rate: f64,
    pub avg_response_time_ms: u64,
    pub conversations_by_day: Vec<DailyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyCount {
    #[schema(value_type = String, example = "2026-10-19")]
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
}

/// Visitor who left contact details in the widget
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Lead {
    #[schema(example = "lead_0001")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: LeadStatus,
    /// First visitor message of the conversation
    pub message: String,
    pub captured_at: DateTime<Utc>,
}
